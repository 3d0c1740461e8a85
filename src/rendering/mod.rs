mod png_encoder;
mod text_overlay;

pub use png_encoder::encode_png;
pub use text_overlay::{Anchor, TextCompositor};
