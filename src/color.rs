//! Color resolution for `bgcolor` and `void-color` values
//!
//! A color is either six hexadecimal digits (optionally prefixed with `#` or
//! `0x`) or a case-insensitive W3C color keyword. Keywords are looked up in a
//! [`ColorTable`] that is built once and handed to the [`ColorResolver`].
//!
//! Style documents use full CSS color syntax instead; see [`parse_css_color`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use lightningcss::traits::Parse;
use lightningcss::values::color::{CssColor, FloatColor};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("color value is empty")]
    Empty,

    #[error("unresolvable color '{0}': neither 6-digit hex nor a known color name")]
    Unresolvable(String),

    #[error("invalid CSS color '{value}': {reason}")]
    Css { value: String, reason: String },
}

/// A 24-bit RGB value laid out as `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct Rgb24(u32);

impl Rgb24 {
    pub const WHITE: Rgb24 = Rgb24(0xFFFFFF);
    pub const BLACK: Rgb24 = Rgb24(0x000000);

    /// Build from a packed integer; bits above 24 are discarded.
    pub const fn new(value: u32) -> Self {
        Self(value & 0xFFFFFF)
    }

    pub const fn from_channels(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn channels(self) -> (u8, u8, u8) {
        ((self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8)
    }
}

impl fmt::Display for Rgb24 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

impl From<Rgb24> for String {
    fn from(rgb: Rgb24) -> Self {
        rgb.to_string()
    }
}

/// W3C extended color keywords (CSS Color Module Level 4).
const W3C_COLOR_KEYWORDS: &[(&str, u32)] = &[
    ("ALICEBLUE", 0xF0F8FF),
    ("ANTIQUEWHITE", 0xFAEBD7),
    ("AQUA", 0x00FFFF),
    ("AQUAMARINE", 0x7FFFD4),
    ("AZURE", 0xF0FFFF),
    ("BEIGE", 0xF5F5DC),
    ("BISQUE", 0xFFE4C4),
    ("BLACK", 0x000000),
    ("BLANCHEDALMOND", 0xFFEBCD),
    ("BLUE", 0x0000FF),
    ("BLUEVIOLET", 0x8A2BE2),
    ("BROWN", 0xA52A2A),
    ("BURLYWOOD", 0xDEB887),
    ("CADETBLUE", 0x5F9EA0),
    ("CHARTREUSE", 0x7FFF00),
    ("CHOCOLATE", 0xD2691E),
    ("CORAL", 0xFF7F50),
    ("CORNFLOWERBLUE", 0x6495ED),
    ("CORNSILK", 0xFFF8DC),
    ("CRIMSON", 0xDC143C),
    ("CYAN", 0x00FFFF),
    ("DARKBLUE", 0x00008B),
    ("DARKCYAN", 0x008B8B),
    ("DARKGOLDENROD", 0xB8860B),
    ("DARKGRAY", 0xA9A9A9),
    ("DARKGREEN", 0x006400),
    ("DARKGREY", 0xA9A9A9),
    ("DARKKHAKI", 0xBDB76B),
    ("DARKMAGENTA", 0x8B008B),
    ("DARKOLIVEGREEN", 0x556B2F),
    ("DARKORANGE", 0xFF8C00),
    ("DARKORCHID", 0x9932CC),
    ("DARKRED", 0x8B0000),
    ("DARKSALMON", 0xE9967A),
    ("DARKSEAGREEN", 0x8FBC8F),
    ("DARKSLATEBLUE", 0x483D8B),
    ("DARKSLATEGRAY", 0x2F4F4F),
    ("DARKSLATEGREY", 0x2F4F4F),
    ("DARKTURQUOISE", 0x00CED1),
    ("DARKVIOLET", 0x9400D3),
    ("DEEPPINK", 0xFF1493),
    ("DEEPSKYBLUE", 0x00BFFF),
    ("DIMGRAY", 0x696969),
    ("DIMGREY", 0x696969),
    ("DODGERBLUE", 0x1E90FF),
    ("FIREBRICK", 0xB22222),
    ("FLORALWHITE", 0xFFFAF0),
    ("FORESTGREEN", 0x228B22),
    ("FUCHSIA", 0xFF00FF),
    ("GAINSBORO", 0xDCDCDC),
    ("GHOSTWHITE", 0xF8F8FF),
    ("GOLD", 0xFFD700),
    ("GOLDENROD", 0xDAA520),
    ("GRAY", 0x808080),
    ("GREEN", 0x008000),
    ("GREENYELLOW", 0xADFF2F),
    ("GREY", 0x808080),
    ("HONEYDEW", 0xF0FFF0),
    ("HOTPINK", 0xFF69B4),
    ("INDIANRED", 0xCD5C5C),
    ("INDIGO", 0x4B0082),
    ("IVORY", 0xFFFFF0),
    ("KHAKI", 0xF0E68C),
    ("LAVENDER", 0xE6E6FA),
    ("LAVENDERBLUSH", 0xFFF0F5),
    ("LAWNGREEN", 0x7CFC00),
    ("LEMONCHIFFON", 0xFFFACD),
    ("LIGHTBLUE", 0xADD8E6),
    ("LIGHTCORAL", 0xF08080),
    ("LIGHTCYAN", 0xE0FFFF),
    ("LIGHTGOLDENRODYELLOW", 0xFAFAD2),
    ("LIGHTGRAY", 0xD3D3D3),
    ("LIGHTGREEN", 0x90EE90),
    ("LIGHTGREY", 0xD3D3D3),
    ("LIGHTPINK", 0xFFB6C1),
    ("LIGHTSALMON", 0xFFA07A),
    ("LIGHTSEAGREEN", 0x20B2AA),
    ("LIGHTSKYBLUE", 0x87CEFA),
    ("LIGHTSLATEGRAY", 0x778899),
    ("LIGHTSLATEGREY", 0x778899),
    ("LIGHTSTEELBLUE", 0xB0C4DE),
    ("LIGHTYELLOW", 0xFFFFE0),
    ("LIME", 0x00FF00),
    ("LIMEGREEN", 0x32CD32),
    ("LINEN", 0xFAF0E6),
    ("MAGENTA", 0xFF00FF),
    ("MAROON", 0x800000),
    ("MEDIUMAQUAMARINE", 0x66CDAA),
    ("MEDIUMBLUE", 0x0000CD),
    ("MEDIUMORCHID", 0xBA55D3),
    ("MEDIUMPURPLE", 0x9370DB),
    ("MEDIUMSEAGREEN", 0x3CB371),
    ("MEDIUMSLATEBLUE", 0x7B68EE),
    ("MEDIUMSPRINGGREEN", 0x00FA9A),
    ("MEDIUMTURQUOISE", 0x48D1CC),
    ("MEDIUMVIOLETRED", 0xC71585),
    ("MIDNIGHTBLUE", 0x191970),
    ("MINTCREAM", 0xF5FFFA),
    ("MISTYROSE", 0xFFE4E1),
    ("MOCCASIN", 0xFFE4B5),
    ("NAVAJOWHITE", 0xFFDEAD),
    ("NAVY", 0x000080),
    ("OLDLACE", 0xFDF5E6),
    ("OLIVE", 0x808000),
    ("OLIVEDRAB", 0x6B8E23),
    ("ORANGE", 0xFFA500),
    ("ORANGERED", 0xFF4500),
    ("ORCHID", 0xDA70D6),
    ("PALEGOLDENROD", 0xEEE8AA),
    ("PALEGREEN", 0x98FB98),
    ("PALETURQUOISE", 0xAFEEEE),
    ("PALEVIOLETRED", 0xDB7093),
    ("PAPAYAWHIP", 0xFFEFD5),
    ("PEACHPUFF", 0xFFDAB9),
    ("PERU", 0xCD853F),
    ("PINK", 0xFFC0CB),
    ("PLUM", 0xDDA0DD),
    ("POWDERBLUE", 0xB0E0E6),
    ("PURPLE", 0x800080),
    ("REBECCAPURPLE", 0x663399),
    ("RED", 0xFF0000),
    ("ROSYBROWN", 0xBC8F8F),
    ("ROYALBLUE", 0x4169E1),
    ("SADDLEBROWN", 0x8B4513),
    ("SALMON", 0xFA8072),
    ("SANDYBROWN", 0xF4A460),
    ("SEAGREEN", 0x2E8B57),
    ("SEASHELL", 0xFFF5EE),
    ("SIENNA", 0xA0522D),
    ("SILVER", 0xC0C0C0),
    ("SKYBLUE", 0x87CEEB),
    ("SLATEBLUE", 0x6A5ACD),
    ("SLATEGRAY", 0x708090),
    ("SLATEGREY", 0x708090),
    ("SNOW", 0xFFFAFA),
    ("SPRINGGREEN", 0x00FF7F),
    ("STEELBLUE", 0x4682B4),
    ("TAN", 0xD2B48C),
    ("TEAL", 0x008080),
    ("THISTLE", 0xD8BFD8),
    ("TOMATO", 0xFF6347),
    ("TURQUOISE", 0x40E0D0),
    ("VIOLET", 0xEE82EE),
    ("WHEAT", 0xF5DEB3),
    ("WHITE", 0xFFFFFF),
    ("WHITESMOKE", 0xF5F5F5),
    ("YELLOW", 0xFFFF00),
    ("YELLOWGREEN", 0x9ACD32),
];

/// Immutable lookup table from upper-cased color names to RGB values.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    names: HashMap<String, Rgb24>,
}

impl ColorTable {
    /// The full W3C extended keyword table.
    pub fn w3c() -> Self {
        let names = W3C_COLOR_KEYWORDS
            .iter()
            .map(|(name, value)| (name.to_string(), Rgb24::new(*value)))
            .collect();
        Self { names }
    }

    /// Add or replace a named color. Names are stored upper-cased.
    pub fn with_color(mut self, name: &str, rgb: Rgb24) -> Self {
        self.names.insert(name.trim().to_uppercase(), rgb);
        self
    }

    pub fn lookup(&self, name: &str) -> Option<Rgb24> {
        self.names.get(&name.trim().to_uppercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Resolves color literals against a shared [`ColorTable`].
#[derive(Debug, Clone)]
pub struct ColorResolver {
    table: Arc<ColorTable>,
}

impl Default for ColorResolver {
    fn default() -> Self {
        Self::new(Arc::new(ColorTable::w3c()))
    }
}

impl ColorResolver {
    pub fn new(table: Arc<ColorTable>) -> Self {
        Self { table }
    }

    /// Resolve a hex literal (`RRGGBB`, `#RRGGBB`, `0xRRGGBB`) or a color name.
    ///
    /// Hex digits and names are both case-insensitive. Anything else is an
    /// error; there is no fallback color.
    pub fn resolve(&self, input: &str) -> Result<Rgb24, ColorError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ColorError::Empty);
        }

        if let Some(rgb) = parse_hex(strip_hex_prefix(trimmed)) {
            return Ok(rgb);
        }

        self.table
            .lookup(trimmed)
            .ok_or_else(|| ColorError::Unresolvable(input.to_string()))
    }
}

fn strip_hex_prefix(value: &str) -> &str {
    if let Some(rest) = value.strip_prefix('#') {
        return rest;
    }
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

fn parse_hex(digits: &str) -> Option<Rgb24> {
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok().map(Rgb24::new)
}

/// Parse a CSS color value as written in a style document (`rgb()`,
/// `rgba()`, `hsl()`, `#rgb`, `#rrggbb`, keywords). Alpha is dropped.
pub fn parse_css_color(input: &str) -> Result<Rgb24, ColorError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ColorError::Empty);
    }

    let css_error = |reason: String| ColorError::Css {
        value: input.to_string(),
        reason,
    };

    let color = CssColor::parse_string(trimmed).map_err(|e| css_error(e.to_string()))?;
    let color = color
        .to_rgb()
        .map_err(|_| css_error("cannot convert color to RGB".to_string()))?;

    match color {
        CssColor::RGBA(rgba) => Ok(Rgb24::from_channels(rgba.red, rgba.green, rgba.blue)),
        CssColor::Float(float_color) => match float_color.as_ref() {
            FloatColor::RGB(rgb) => Ok(Rgb24::from_channels(
                unit_to_channel(rgb.r),
                unit_to_channel(rgb.g),
                unit_to_channel(rgb.b),
            )),
            _ => Err(css_error("unexpected float color format".to_string())),
        },
        _ => Err(css_error("color conversion did not produce RGB".to_string())),
    }
}

fn unit_to_channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
