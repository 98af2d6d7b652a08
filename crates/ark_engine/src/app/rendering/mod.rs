mod canvas;
mod font;
mod renderer;
mod store;

pub use renderer::Renderer;

pub(crate) use font::{GLYPH_ADVANCE, LINE_ADVANCE};
