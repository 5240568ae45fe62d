//! Loads a single predetermined glTF scene with embedded buffers and draws
//! its meshes every frame with one shader program.

pub mod assets;
pub mod config;
pub mod error;
pub mod render_loop;
pub mod renderer;

pub use assets::{AssetDir, AssetSource, EmbeddedAssets};
pub use config::RendererConfig;
pub use error::{DocumentError, IndexError, RecordError, RenderError, ResolveError};
pub use render_loop::{ContextProvider, RenderEvent, RenderLoop};
pub use renderer::FrameRenderer;
