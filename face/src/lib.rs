//! Rendering shell for the mascot watchface
//!
//! CPU-side frame composition with tiny-skia and cosmic-text, plus the
//! PNG-backed skin image provider. The host owns the pixel buffer; we only
//! ever draw into it.

pub mod compose;
pub mod images;
pub mod renderer;
pub mod utils;

pub use compose::render_face;
pub use images::PngImageProvider;
pub use renderer::Renderer;
