//! Test fixtures and constants.

use tiny_skia::{Color, Pixmap};

/// Hackathon ids used across tests
pub mod hackathons {
    pub const SPRING: &str = "h1";
    pub const AUTUMN: &str = "h2";
}

/// Size of the embedded builtin default template
pub const BUILTIN_SIZE: (u32, u32) = (1000, 700);

/// Solid-color PNG of the given size
pub fn png_template(width: u32, height: u32, rgb: (u8, u8, u8)) -> Vec<u8> {
    let mut pixmap = Pixmap::new(width, height).expect("Invalid fixture size");
    pixmap.fill(Color::from_rgba8(rgb.0, rgb.1, rgb.2, 255));
    pixmap.encode_png().expect("Failed to encode fixture")
}

/// Per-type settings record key
pub fn settings_key(hackathon_id: &str, certificate_type: &str) -> String {
    format!("certificate_settings_{hackathon_id}_{certificate_type}")
}

/// A legacy settings document with every style field set
pub fn full_legacy_settings() -> serde_json::Value {
    serde_json::json!({
        "namePositionX": 0.25,
        "namePositionY": 0.6,
        "nameFont": "italic 32px Georgia",
        "nameColor": "#333333",
        "textAlign": "left"
    })
}

/// Pixels that differ between two PNGs of the same size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ink {
    pub count: usize,
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
}

impl Ink {
    pub fn centre_x(&self) -> f32 {
        (self.min_x + self.max_x) as f32 / 2.0
    }
}

/// Compare a rendered certificate against the same template without a name
pub fn ink_between(blank_png: &[u8], drawn_png: &[u8]) -> Ink {
    let blank = image::load_from_memory(blank_png)
        .expect("Failed to decode blank PNG")
        .to_rgba8();
    let drawn = image::load_from_memory(drawn_png)
        .expect("Failed to decode drawn PNG")
        .to_rgba8();
    assert_eq!(blank.dimensions(), drawn.dimensions(), "size mismatch");

    let mut ink = Ink {
        count: 0,
        min_x: u32::MAX,
        max_x: 0,
        min_y: u32::MAX,
        max_y: 0,
    };
    for (x, y, pixel) in drawn.enumerate_pixels() {
        if blank.get_pixel(x, y) != pixel {
            ink.count += 1;
            ink.min_x = ink.min_x.min(x);
            ink.max_x = ink.max_x.max(x);
            ink.min_y = ink.min_y.min(y);
            ink.max_y = ink.max_y.max(y);
        }
    }
    ink
}
