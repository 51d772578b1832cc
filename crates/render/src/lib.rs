//! Read-only views of the scene.
//!
//! No GPU backend lives here; `DebugTextRenderer` is what the CLI prints.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};
