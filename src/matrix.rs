//! Parameter combinations exercised by the background conformance tests
//!
//! Every [`ParameterCase`] carries its own query parameters, the extent it is
//! requested over, how the response is sampled and which assertions apply, so a
//! case can be executed on its own and in any order.

use std::fmt;

use serde::Serialize;

use crate::inspect::SamplingMode;

/// Hex background color used across the matrix (purple).
pub const TEST_BG_HEX: &str = "CC00CC";
/// Mixed-case W3C name, checks case-insensitive handling.
pub const TEST_BG_NAMED: &str = "NaVy";
/// Background color used by the transparent definition cases (magenta).
pub const TEST_TRANSPARENT_BG: &str = "FF00FF";
/// Hex void color (lime).
pub const TEST_VOID_HEX: &str = "00FF00";
/// Mixed-case W3C name for void-color.
pub const TEST_VOID_NAMED: &str = "nAvY";
/// Void color paired with void-transparent cases (magenta).
pub const TEST_VOID_TRANSPARENT_COLOR: &str = "FF00FF";

/// W3C names requested by the bgcolor definition test, in request order.
pub const BGCOLOR_NAMES: &[&str] = &["NAVY", "NaVy", "WHITE", "ReD", "LiMe", "BLUE"];

/// A color as written on the query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ColorParam {
    Hex(String),
    Named(String),
}

impl ColorParam {
    pub fn hex(value: impl Into<String>) -> Self {
        ColorParam::Hex(value.into())
    }

    pub fn named(value: impl Into<String>) -> Self {
        ColorParam::Named(value.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            ColorParam::Hex(v) | ColorParam::Named(v) => v,
        }
    }
}

/// Which request template a case is issued against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Extent {
    /// Bounding box inside the valid area of the CRS.
    Valid,
    /// Bounding box exceeding the CRS so corners fall in void areas.
    Void,
}

/// Part of the map an assertion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Background,
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Rgb,
    Alpha,
}

/// One assertion applied to a case's sampled pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Check {
    pub region: Region,
    pub channel: Channel,
}

impl Check {
    pub const BACKGROUND_RGB: Check = Check::new(Region::Background, Channel::Rgb);
    pub const BACKGROUND_ALPHA: Check = Check::new(Region::Background, Channel::Alpha);
    pub const VOID_RGB: Check = Check::new(Region::Void, Channel::Rgb);
    pub const VOID_ALPHA: Check = Check::new(Region::Void, Channel::Alpha);

    pub const fn new(region: Region, channel: Channel) -> Self {
        Self { region, channel }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let region = match self.region {
            Region::Background => "background",
            Region::Void => "void",
        };
        let channel = match self.channel {
            Channel::Rgb => "RGB",
            Channel::Alpha => "alpha",
        };
        write!(f, "{} {}", region, channel)
    }
}

/// Optional parameters whose support is probed before cases depending on
/// them are run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    VoidColor,
    VoidTransparent,
}

impl Capability {
    pub fn param_name(self) -> &'static str {
        match self {
            Capability::VoidColor => "void-color",
            Capability::VoidTransparent => "void-transparent",
        }
    }

    /// Value sent with the probe request.
    pub fn probe_value(self) -> &'static str {
        match self {
            Capability::VoidColor => TEST_VOID_HEX,
            Capability::VoidTransparent => "true",
        }
    }
}

/// A style requested by id, with the background color it declares (if any).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StyleParam {
    pub id: String,
    pub background: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterCase {
    pub label: String,
    pub extent: Extent,
    pub transparent: Option<bool>,
    pub bgcolor: Option<ColorParam>,
    pub void_color: Option<ColorParam>,
    pub void_transparent: Option<bool>,
    pub style: Option<StyleParam>,
    pub checks: Vec<Check>,
    pub sampling: SamplingMode,
    pub requires: Vec<Capability>,
}

impl ParameterCase {
    pub fn new(label: impl Into<String>, extent: Extent) -> Self {
        Self {
            label: label.into(),
            extent,
            transparent: None,
            bgcolor: None,
            void_color: None,
            void_transparent: None,
            style: None,
            checks: Vec::new(),
            sampling: SamplingMode::Corners,
            requires: Vec::new(),
        }
    }

    pub fn with_transparent(mut self, transparent: Option<bool>) -> Self {
        self.transparent = transparent;
        self
    }

    pub fn with_bgcolor(mut self, bgcolor: Option<ColorParam>) -> Self {
        self.bgcolor = bgcolor;
        self
    }

    pub fn with_void_color(mut self, void_color: Option<ColorParam>) -> Self {
        self.void_color = void_color;
        self
    }

    pub fn with_void_transparent(mut self, void_transparent: Option<bool>) -> Self {
        self.void_transparent = void_transparent;
        self
    }

    pub fn with_style(mut self, style: StyleParam) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_checks(mut self, checks: &[Check]) -> Self {
        self.checks = checks.to_vec();
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingMode) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn requiring(mut self, capability: Capability) -> Self {
        self.requires.push(capability);
        self
    }

    /// Optional query parameters in wire form. Booleans are lowercase.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(transparent) = self.transparent {
            pairs.push(("transparent", transparent.to_string()));
        }
        if let Some(bgcolor) = &self.bgcolor {
            pairs.push(("bgcolor", bgcolor.as_str().to_string()));
        }
        if let Some(void_color) = &self.void_color {
            pairs.push(("void-color", void_color.as_str().to_string()));
        }
        if let Some(void_transparent) = self.void_transparent {
            pairs.push(("void-transparent", void_transparent.to_string()));
        }
        if let Some(style) = &self.style {
            pairs.push(("style", style.id.clone()));
        }
        pairs
    }

    /// Query fragment used in logs and reports, e.g. `transparent=true&bgcolor=FF00FF`.
    pub fn query_string(&self) -> String {
        let pairs = self.query_pairs();
        if pairs.is_empty() {
            return "(no optional parameters)".to_string();
        }
        pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Identity of the request this case issues.
    pub fn key(&self) -> (Extent, String) {
        (self.extent, self.query_string())
    }
}

/// Enumerates the cases for each background abstract test.
#[derive(Debug, Clone, Copy)]
pub struct ParameterMatrixGenerator {
    inset: u32,
}

impl Default for ParameterMatrixGenerator {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ParameterMatrixGenerator {
    /// `inset` is the pixel margin used by cases sampled away from the corners.
    pub fn new(inset: u32) -> Self {
        Self { inset }
    }

    /// transparent {absent, false, true} x bgcolor {absent, hex, named} on the
    /// valid extent, asserting background RGB and alpha.
    pub fn background_matrix(&self) -> Vec<ParameterCase> {
        let transparent_variants = [None, Some(false), Some(true)];
        let bgcolor_variants = [
            None,
            Some(ColorParam::hex(TEST_BG_HEX)),
            Some(ColorParam::named(TEST_BG_NAMED)),
        ];

        let mut cases = Vec::with_capacity(9);
        for transparent in transparent_variants {
            for bgcolor in &bgcolor_variants {
                let label = format!(
                    "transparent={}, bgcolor={}",
                    describe_bool(transparent),
                    bgcolor.as_ref().map(ColorParam::as_str).unwrap_or("(absent)")
                );
                cases.push(
                    ParameterCase::new(label, Extent::Valid)
                        .with_transparent(transparent)
                        .with_bgcolor(bgcolor.clone())
                        .with_checks(&[Check::BACKGROUND_ALPHA, Check::BACKGROUND_RGB]),
                );
            }
        }
        cases
    }

    /// Void-area cases of the map-success test, each gated on the capability
    /// it exercises.
    pub fn background_void_cases(&self) -> Vec<ParameterCase> {
        vec![
            ParameterCase::new("void-color defaults to bgcolor", Extent::Void)
                .with_bgcolor(Some(ColorParam::hex(TEST_BG_HEX)))
                .with_transparent(Some(false))
                .with_checks(&[Check::VOID_RGB])
                .requiring(Capability::VoidColor),
            ParameterCase::new("explicit void-color", Extent::Void)
                .with_bgcolor(Some(ColorParam::hex(TEST_BG_HEX)))
                .with_void_color(Some(ColorParam::hex(TEST_VOID_HEX)))
                .with_transparent(Some(false))
                .with_checks(&[Check::VOID_RGB])
                .requiring(Capability::VoidColor),
            ParameterCase::new("void-transparent defaults to transparent", Extent::Void)
                .with_transparent(Some(true))
                .with_checks(&[Check::VOID_ALPHA])
                .requiring(Capability::VoidTransparent),
            ParameterCase::new("explicit void-transparent=false", Extent::Void)
                .with_transparent(Some(true))
                .with_void_transparent(Some(false))
                .with_checks(&[Check::VOID_ALPHA])
                .requiring(Capability::VoidTransparent),
        ]
    }

    /// Hex value, each W3C name, then either the style-priority case or the
    /// default-white case. All opaque, sampled at the inset points.
    pub fn bgcolor_definition(&self, style: Option<StyleParam>) -> Vec<ParameterCase> {
        let sampling = SamplingMode::Inset(self.inset);
        let mut cases = vec![
            ParameterCase::new(format!("hex bgcolor {}", TEST_BG_HEX), Extent::Valid)
                .with_bgcolor(Some(ColorParam::hex(TEST_BG_HEX)))
                .with_transparent(Some(false)),
        ];

        for name in BGCOLOR_NAMES {
            cases.push(
                ParameterCase::new(format!("W3C bgcolor {}", name), Extent::Valid)
                    .with_bgcolor(Some(ColorParam::named(*name)))
                    .with_transparent(Some(false)),
            );
        }

        match style {
            Some(style) if style.background.is_some() => cases.push(
                ParameterCase::new(format!("style '{}' background", style.id), Extent::Valid)
                    .with_style(style)
                    .with_transparent(Some(false)),
            ),
            _ => cases.push(
                ParameterCase::new("default white background", Extent::Valid)
                    .with_transparent(Some(false)),
            ),
        }

        cases
            .into_iter()
            .map(|c| c.with_checks(&[Check::BACKGROUND_RGB]).with_sampling(sampling))
            .collect()
    }

    /// transparent {absent, false, true} x bgcolor {absent, present}, alpha only.
    pub fn transparent_definition(&self) -> Vec<ParameterCase> {
        let mut cases = Vec::with_capacity(6);
        for transparent in [None, Some(false), Some(true)] {
            for bgcolor in [None, Some(ColorParam::hex(TEST_TRANSPARENT_BG))] {
                let label = format!(
                    "transparent={}, bgcolor={}",
                    describe_bool(transparent),
                    bgcolor.as_ref().map(ColorParam::as_str).unwrap_or("(absent)")
                );
                cases.push(
                    ParameterCase::new(label, Extent::Valid)
                        .with_transparent(transparent)
                        .with_bgcolor(bgcolor)
                        .with_checks(&[Check::BACKGROUND_ALPHA]),
                );
            }
        }
        cases
    }

    /// void-color as hex, as a W3C name, and absent (falls back to bgcolor).
    pub fn void_color_definition(&self) -> Vec<ParameterCase> {
        vec![
            ParameterCase::new("hex void-color", Extent::Void)
                .with_void_color(Some(ColorParam::hex(TEST_VOID_HEX))),
            ParameterCase::new("W3C void-color", Extent::Void)
                .with_void_color(Some(ColorParam::named(TEST_VOID_NAMED))),
            ParameterCase::new("void-color absent, bgcolor given", Extent::Void)
                .with_bgcolor(Some(ColorParam::hex(TEST_BG_HEX))),
        ]
        .into_iter()
        .map(|c| c.with_checks(&[Check::VOID_RGB]))
        .collect()
    }

    /// void-transparent absent/false/true crossed with transparent and
    /// void-color, asserting void alpha.
    pub fn void_transparent_definition(&self) -> Vec<ParameterCase> {
        let void_color = || Some(ColorParam::hex(TEST_VOID_TRANSPARENT_COLOR));
        vec![
            ParameterCase::new("A1: all absent", Extent::Void),
            ParameterCase::new("A1b: bgcolor only", Extent::Void)
                .with_bgcolor(Some(ColorParam::named("red"))),
            ParameterCase::new("A2: transparent=false", Extent::Void)
                .with_transparent(Some(false))
                .with_void_color(void_color()),
            ParameterCase::new("A3: transparent=true", Extent::Void).with_transparent(Some(true)),
            ParameterCase::new("B1: transparent=true, void-transparent=false", Extent::Void)
                .with_transparent(Some(true))
                .with_void_transparent(Some(false)),
            ParameterCase::new("B2: transparent=false, void-transparent=true", Extent::Void)
                .with_transparent(Some(false))
                .with_void_transparent(Some(true))
                .with_void_color(void_color()),
            ParameterCase::new("B3: void-transparent=false with void-color", Extent::Void)
                .with_void_transparent(Some(false))
                .with_void_color(void_color()),
            ParameterCase::new("B4: void-transparent=true", Extent::Void)
                .with_void_transparent(Some(true)),
        ]
        .into_iter()
        .map(|c| c.with_checks(&[Check::VOID_ALPHA]))
        .collect()
    }
}

fn describe_bool(value: Option<bool>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "(absent)".to_string())
}
