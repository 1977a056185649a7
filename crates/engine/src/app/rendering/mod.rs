mod canvas;
mod renderer;
mod text;

pub use canvas::{Canvas, Rgba8};
pub use renderer::Renderer;
pub use text::{text_width, GLYPH_HEIGHT, GLYPH_WIDTH};
