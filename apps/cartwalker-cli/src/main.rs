use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod session;

use cartwalker_controller::ControllerConfig;
use session::{Session, SessionSummary};

#[derive(Parser)]
#[command(name = "cartwalker-cli", about = "CLI tool for cartwalker sessions")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and default tuning
    Info,
    /// Run the scripted power-on, walk and fire session headlessly
    Simulate {
        /// YAML config overriding the default tuning
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Simulated display refresh rate
        #[arg(long, default_value = "60")]
        fps: u32,
        /// Seconds to keep running after the script ends
        #[arg(long, default_value = "6")]
        tail: u64,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
        /// Print the scene listing when the session ends
        #[arg(long)]
        dump: bool,
    },
    /// Print the default config as YAML
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let config = ControllerConfig::default();
            println!("cartwalker-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "power-on: {} ms to interaction",
                config.cascade.total().as_millis()
            );
            println!(
                "locomotion: accel={} inertia={} max_velocity={}",
                config.locomotion.acceleration,
                config.locomotion.inertia,
                config.locomotion.max_velocity
            );
            println!(
                "projectile: lifetime={} ms cooldown={} ms",
                config.projectile.lifetime_ms, config.projectile.cooldown_ms
            );
            println!("clips: {}", cartwalker_anim::names::all().count());
        }
        Commands::Simulate {
            config,
            fps,
            tail,
            json,
            dump,
        } => {
            if fps == 0 {
                anyhow::bail!("--fps must be greater than zero");
            }
            let config = match config {
                Some(path) => ControllerConfig::load(&path)?,
                None => ControllerConfig::default(),
            };
            let mut session = Session::new(config, fps)?;
            let summary = session.run(std::time::Duration::from_secs(tail))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
            if dump {
                print!("{}", session.dump());
            }
        }
        Commands::Config => {
            print!("{}", ControllerConfig::default().to_yaml()?);
        }
    }

    Ok(())
}

fn print_summary(summary: &SessionSummary) {
    println!(
        "Session: frames={}, elapsed={} ms",
        summary.frames, summary.elapsed_ms
    );
    match summary.interaction_at_ms {
        Some(at) => println!("Power-on complete at {at} ms"),
        None => println!("Power-on incomplete"),
    }
    println!(
        "Fired: {} (requests={}), expired: {}, live: {}",
        summary.fired, summary.fire_requests, summary.expired, summary.live_projectiles
    );
    let [x, y, z] = summary.position;
    println!(
        "Root: position=({x:.4}, {y:.4}, {z:.4}) yaw={:.4} velocity={:.5}",
        summary.yaw, summary.velocity
    );
    println!("Max speed: {:.5}", summary.max_speed);
}
