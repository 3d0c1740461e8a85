use std::io::Cursor;
use tiny_skia::Pixmap;

use crate::error::RenderError;

/// Encode a composed pixmap as an RGBA8 PNG.
///
/// Pixels are demultiplied first. Compression and filter settings are fixed,
/// so the same pixmap always produces the same bytes.
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, RenderError> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Default);
        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(&rgba)
            .map_err(|e| RenderError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Pixmap {
        let mut pixmap = Pixmap::new(16, 8).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(200, 100, 50, 128));
        pixmap
    }

    #[test]
    fn test_output_is_png_with_dimensions() {
        let bytes = encode_png(&sample()).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let decoder = png::Decoder::new(Cursor::new(bytes));
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        assert_eq!((info.width, info.height), (16, 8));
        assert_eq!(info.color_type, png::ColorType::Rgba);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let pixmap = sample();
        assert_eq!(encode_png(&pixmap).unwrap(), encode_png(&pixmap).unwrap());
    }

    #[test]
    fn test_alpha_is_demultiplied() {
        let bytes = encode_png(&sample()).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        let [r, g, b, a] = decoded.get_pixel(0, 0).0;
        assert_eq!(a, 128);
        assert!((r as i32 - 200).abs() <= 2);
        assert!((g as i32 - 100).abs() <= 2);
        assert!((b as i32 - 50).abs() <= 2);
    }
}
