//! Color specifications accepted by the visual: names, hex strings or RGBA

use crate::visual::{VisualError, VisualResult};
use glam::Vec4;
use std::str::FromStr;

pub const WHITE: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);
pub const BLACK: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);
pub const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
pub const GREEN: Vec4 = Vec4::new(0.0, 0.5, 0.0, 1.0);
pub const BLUE: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);
pub const YELLOW: Vec4 = Vec4::new(1.0, 1.0, 0.0, 1.0);
pub const CYAN: Vec4 = Vec4::new(0.0, 1.0, 1.0, 1.0);
pub const MAGENTA: Vec4 = Vec4::new(1.0, 0.0, 1.0, 1.0);
pub const GRAY: Vec4 = Vec4::new(0.5, 0.5, 0.5, 1.0);
pub const ORANGE: Vec4 = Vec4::new(1.0, 0.647, 0.0, 1.0);
pub const PURPLE: Vec4 = Vec4::new(0.5, 0.0, 0.5, 1.0);

/// Look up a color by (case-insensitive) name
pub fn named(name: &str) -> Option<Vec4> {
    let color = match name.trim().to_ascii_lowercase().as_str() {
        "white" => WHITE,
        "black" => BLACK,
        "red" => RED,
        "green" => GREEN,
        "lime" => Vec4::new(0.0, 1.0, 0.0, 1.0),
        "blue" => BLUE,
        "yellow" => YELLOW,
        "cyan" => CYAN,
        "magenta" => MAGENTA,
        "gray" | "grey" => GRAY,
        "lightgray" | "lightgrey" => Vec4::new(0.827, 0.827, 0.827, 1.0),
        "orange" => ORANGE,
        "purple" => PURPLE,
        "transparent" => Vec4::ZERO,
        _ => return None,
    };
    Some(color)
}

/// Parse `#rrggbb` or `#rrggbbaa`, the leading `#` being optional
pub fn parse_hex(hex: &str) -> VisualResult<Vec4> {
    let digits = hex.trim().trim_start_matches('#');
    if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
        return Err(VisualError::InvalidArgument(format!(
            "malformed hex color {:?}",
            hex
        )));
    }

    let channel = |i: usize| -> VisualResult<f32> {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map(|v| v as f32 / 255.0)
            .map_err(|_| VisualError::InvalidArgument(format!("malformed hex color {:?}", hex)))
    };

    let alpha = if digits.len() == 8 { channel(6)? } else { 1.0 };
    Ok(Vec4::new(channel(0)?, channel(2)?, channel(4)?, alpha))
}

/// A color as the host specifies it
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpec {
    Rgba(Vec4),
    Named(String),
    Hex(String),
}

impl ColorSpec {
    /// Resolve to linear RGBA
    pub fn to_rgba(&self) -> VisualResult<Vec4> {
        match self {
            ColorSpec::Rgba(rgba) => Ok(*rgba),
            ColorSpec::Hex(hex) => parse_hex(hex),
            ColorSpec::Named(name) => named(name).ok_or_else(|| {
                VisualError::InvalidArgument(format!("unknown color name {:?}", name))
            }),
        }
    }
}

impl Default for ColorSpec {
    fn default() -> Self {
        ColorSpec::Rgba(WHITE)
    }
}

impl FromStr for ColorSpec {
    type Err = VisualError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = if s.trim_start().starts_with('#') {
            ColorSpec::Hex(s.to_string())
        } else {
            ColorSpec::Named(s.to_string())
        };
        spec.to_rgba()?;
        Ok(spec)
    }
}

impl From<Vec4> for ColorSpec {
    fn from(rgba: Vec4) -> Self {
        ColorSpec::Rgba(rgba)
    }
}

impl From<[f32; 4]> for ColorSpec {
    fn from(rgba: [f32; 4]) -> Self {
        ColorSpec::Rgba(Vec4::from_array(rgba))
    }
}

impl From<[f32; 3]> for ColorSpec {
    fn from(rgb: [f32; 3]) -> Self {
        ColorSpec::Rgba(Vec4::new(rgb[0], rgb[1], rgb[2], 1.0))
    }
}
