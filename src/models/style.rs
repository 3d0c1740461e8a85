use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::RenderError;

pub const DEFAULT_NAME_POSITION_X: f32 = 0.50;
pub const DEFAULT_NAME_POSITION_Y: f32 = 0.52;
pub const DEFAULT_NAME_FONT: &str = "bold 48px Arial";
pub const DEFAULT_NAME_COLOR: &str = "#000000";

/// Horizontal alignment of the name relative to its anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(TextAlign::Left),
            "center" | "centre" | "middle" => Some(TextAlign::Center),
            "right" | "end" => Some(TextAlign::Right),
            _ => None,
        }
    }

    /// SVG `text-anchor` value for this alignment
    pub fn text_anchor(&self) -> &'static str {
        match self {
            TextAlign::Left => "start",
            TextAlign::Center => "middle",
            TextAlign::Right => "end",
        }
    }
}

/// Fully resolved text style for the participant name.
///
/// Positions are fractions of the template's width and height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StyleConfig {
    pub name_position_x: f32,
    pub name_position_y: f32,
    pub name_font: String,
    pub name_color: String,
    pub text_align: TextAlign,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            name_position_x: DEFAULT_NAME_POSITION_X,
            name_position_y: DEFAULT_NAME_POSITION_Y,
            name_font: DEFAULT_NAME_FONT.to_string(),
            name_color: DEFAULT_NAME_COLOR.to_string(),
            text_align: TextAlign::Center,
        }
    }
}

/// Style values contributed by a single configuration tier.
///
/// Any field may be missing; the style resolver fills gaps from lower tiers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialStyle {
    pub name_position_x: Option<f32>,
    pub name_position_y: Option<f32>,
    pub name_font: Option<String>,
    pub name_color: Option<String>,
    pub text_align: Option<TextAlign>,
}

impl PartialStyle {
    /// Extract style fields from a settings record.
    ///
    /// Empty strings, nulls and values of the wrong shape count as missing.
    /// Positions may be stored as numbers or numeric strings.
    pub fn from_record(record: &serde_json::Value) -> Self {
        Self {
            name_position_x: record.get("namePositionX").and_then(fraction_value),
            name_position_y: record.get("namePositionY").and_then(fraction_value),
            name_font: record.get("nameFont").and_then(non_empty_string),
            name_color: record.get("nameColor").and_then(non_empty_string),
            text_align: record
                .get("textAlign")
                .and_then(non_empty_string)
                .and_then(|s| TextAlign::parse(&s)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name_position_x.is_none()
            && self.name_position_y.is_none()
            && self.name_font.is_none()
            && self.name_color.is_none()
            && self.text_align.is_none()
    }

    /// Fill fields that are still missing from `lower`
    pub fn or(self, lower: PartialStyle) -> PartialStyle {
        PartialStyle {
            name_position_x: self.name_position_x.or(lower.name_position_x),
            name_position_y: self.name_position_y.or(lower.name_position_y),
            name_font: self.name_font.or(lower.name_font),
            name_color: self.name_color.or(lower.name_color),
            text_align: self.text_align.or(lower.text_align),
        }
    }

    /// Complete the style with builtin defaults for anything still missing
    pub fn finish(self) -> StyleConfig {
        let defaults = StyleConfig::default();
        StyleConfig {
            name_position_x: self.name_position_x.unwrap_or(defaults.name_position_x),
            name_position_y: self.name_position_y.unwrap_or(defaults.name_position_y),
            name_font: self.name_font.unwrap_or(defaults.name_font),
            name_color: self.name_color.unwrap_or(defaults.name_color),
            text_align: self.text_align.unwrap_or(defaults.text_align),
        }
    }
}

fn fraction_value(value: &serde_json::Value) -> Option<f32> {
    let v = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !v.is_finite() {
        return None;
    }
    Some(v.clamp(0.0, 1.0) as f32)
}

fn non_empty_string(value: &serde_json::Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parsed form of a CSS-like font shorthand such as `"bold 48px Arial"`.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    pub style: FontStyle,
    pub weight: u16,
    pub size_px: f32,
    /// Family list as written, e.g. `"Noto Sans", Arial`
    pub families: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
            FontStyle::Oblique => "oblique",
        }
    }
}

impl FontDescriptor {
    /// Parse `[style] [weight] <size>(px|pt) <family...>`.
    pub fn parse(descriptor: &str) -> Result<Self, RenderError> {
        let invalid = || RenderError::InvalidFont(descriptor.to_string());

        let mut style = FontStyle::Normal;
        let mut weight = 400u16;
        let mut size_px = None;
        let mut rest = descriptor.trim();

        while let Some((token, tail)) = split_token(rest) {
            let lower = token.to_ascii_lowercase();
            match lower.as_str() {
                "normal" => {}
                "italic" => style = FontStyle::Italic,
                "oblique" => style = FontStyle::Oblique,
                "bold" | "bolder" => weight = 700,
                "lighter" => weight = 300,
                "small-caps" => {}
                _ => {
                    if let Some(w) = lower
                        .parse::<u16>()
                        .ok()
                        .filter(|w| w % 100 == 0 && (100..=900).contains(w))
                    {
                        weight = w;
                    } else {
                        size_px = Some(parse_size(&lower).ok_or_else(invalid)?);
                        rest = tail;
                        break;
                    }
                }
            }
            rest = tail;
        }

        let size_px = size_px.ok_or_else(invalid)?;
        let families: Vec<String> = rest
            .split(',')
            .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\'').trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        if families.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            style,
            weight,
            size_px,
            families,
        })
    }
}

fn split_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(idx) => Some((&s[..idx], &s[idx..])),
        None => Some((s, "")),
    }
}

/// Font size in pixels; `48px`, `36pt` or a bare number. `size/line-height` is accepted.
fn parse_size(token: &str) -> Option<f32> {
    let token = token.split('/').next()?;
    let (number, points) = if let Some(n) = token.strip_suffix("px") {
        (n, false)
    } else if let Some(n) = token.strip_suffix("pt") {
        (n, true)
    } else {
        (token, false)
    };
    let value = number.parse::<f32>().ok()?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    Some(if points { value * 96.0 / 72.0 } else { value })
}

/// An sRGB fill color parsed from `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl HexColor {
    pub fn parse(s: &str) -> Result<Self, RenderError> {
        let invalid = || RenderError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);

        let parsed = match hex.len() {
            3 => (nibble(0), nibble(1), nibble(2), Ok(255)),
            4 => (nibble(0), nibble(1), nibble(2), nibble(3)),
            6 => (byte(0), byte(2), byte(4), Ok(255)),
            8 => (byte(0), byte(2), byte(4), byte(6)),
            _ => return Err(invalid()),
        };

        match parsed {
            (Ok(r), Ok(g), Ok(b), Ok(a)) => Ok(Self { r, g, b, a }),
            _ => Err(invalid()),
        }
    }

    /// Opaque `#rrggbb` form used for SVG `fill`
    pub fn rgb_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn opacity(&self) -> f32 {
        self.a as f32 / 255.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}
