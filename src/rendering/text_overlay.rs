use resvg::usvg;
use std::fmt::Write as _;
use std::sync::Arc;
use tiny_skia::{Pixmap, Transform};

use crate::error::RenderError;
use crate::models::{FontDescriptor, HexColor, StyleConfig};
use crate::services::FontRegistry;

/// Pixel position the name is anchored at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

impl Anchor {
    /// Scale fractional positions to the template's pixel size
    pub fn for_style(style: &StyleConfig, width: u32, height: u32) -> Self {
        Self {
            x: width as f32 * style.name_position_x,
            y: height as f32 * style.name_position_y,
        }
    }
}

/// Draws the participant name onto a template pixmap.
///
/// The name is laid out as a single SVG `<text>` element the size of the
/// template and rasterized by resvg straight onto the template pixels, on the
/// alphabetic baseline at the anchor. No wrapping is done.
pub struct TextCompositor {
    fonts: Arc<FontRegistry>,
}

impl TextCompositor {
    pub fn new(fonts: Arc<FontRegistry>) -> Self {
        Self { fonts }
    }

    pub fn composite(
        &self,
        pixmap: &mut Pixmap,
        style: &StyleConfig,
        name: &str,
    ) -> Result<Anchor, RenderError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RenderError::EmptyName);
        }

        let anchor = Anchor::for_style(style, pixmap.width(), pixmap.height());
        let svg = self.overlay_svg(pixmap.width(), pixmap.height(), anchor, style, name)?;

        let options = usvg::Options {
            fontdb: self.fonts.fontdb(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&svg, &options)
            .map_err(|e| RenderError::Overlay(e.to_string()))?;

        resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

        tracing::debug!(
            x = anchor.x,
            y = anchor.y,
            font = %style.name_font,
            color = %style.name_color,
            align = ?style.text_align,
            "Name composited"
        );

        Ok(anchor)
    }

    /// Build the overlay document. Font and color are validated here.
    pub fn overlay_svg(
        &self,
        width: u32,
        height: u32,
        anchor: Anchor,
        style: &StyleConfig,
        name: &str,
    ) -> Result<String, RenderError> {
        let font = FontDescriptor::parse(&style.name_font)?;
        let color = HexColor::parse(&style.name_color)?;

        let families = self
            .fonts
            .family_list(&font.families)
            .iter()
            .map(|f| quote_family(f))
            .collect::<Vec<_>>()
            .join(", ");

        let mut svg = String::new();
        // Writing to a String cannot fail
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );
        let _ = write!(
            svg,
            r#"<text x="{x}" y="{y}" font-family="{families}" font-size="{size}" font-weight="{weight}" font-style="{font_style}" fill="{fill}" fill-opacity="{opacity}" text-anchor="{text_anchor}" xml:space="preserve">{text}</text>"#,
            x = anchor.x,
            y = anchor.y,
            families = escape_xml(&families),
            size = font.size_px,
            weight = font.weight,
            font_style = font.style.as_str(),
            fill = color.rgb_hex(),
            opacity = color.opacity(),
            text_anchor = style.text_align.text_anchor(),
            text = escape_xml(name),
        );
        svg.push_str("</svg>");
        Ok(svg)
    }
}

fn quote_family(family: &str) -> String {
    match family {
        "serif" | "sans-serif" | "monospace" | "cursive" | "fantasy" => family.to_string(),
        _ => format!("'{}'", family.replace('\'', "")),
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}
