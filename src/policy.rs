//! Default resolution for the background and void rendering parameters
//!
//! Rules, evaluated top to bottom:
//! - `transparent` defaults to `true` without `bgcolor` and `false` with one.
//! - The background color is `bgcolor`, else the requested style's declared
//!   background, else white.
//! - `void-transparent` defaults to the effective `transparent`.
//! - `void-color` defaults to the effective background color.

use serde::Serialize;

use crate::color::{ColorError, ColorResolver, Rgb24};
use crate::matrix::{ParameterCase, Region};

pub const OPAQUE: u8 = 255;
pub const TRANSPARENT: u8 = 0;

pub fn effective_transparent(transparent: Option<bool>, has_bgcolor: bool) -> bool {
    transparent.unwrap_or(!has_bgcolor)
}

pub fn effective_bg_rgb(bgcolor: Option<Rgb24>, style_background: Option<Rgb24>) -> Rgb24 {
    bgcolor.or(style_background).unwrap_or(Rgb24::WHITE)
}

pub fn effective_void_transparent(void_transparent: Option<bool>, effective_transparent: bool) -> bool {
    void_transparent.unwrap_or(effective_transparent)
}

pub fn effective_void_rgb(void_color: Option<Rgb24>, effective_bg_rgb: Rgb24) -> Rgb24 {
    void_color.unwrap_or(effective_bg_rgb)
}

pub fn alpha_for(transparent: bool) -> u8 {
    if transparent { TRANSPARENT } else { OPAQUE }
}

/// What a compliant server must render for one [`ParameterCase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpectedOutcome {
    pub transparent: bool,
    pub void_transparent: bool,
    pub bg_rgb: Rgb24,
    pub void_rgb: Rgb24,
    /// `bgcolor` was on the request.
    pub bgcolor_given: bool,
    /// `void-color` was on the request.
    pub void_color_given: bool,
}

impl ExpectedOutcome {
    pub fn bg_alpha(&self) -> u8 {
        alpha_for(self.transparent)
    }

    pub fn void_alpha(&self) -> u8 {
        alpha_for(self.void_transparent)
    }

    pub fn rgb(&self, region: Region) -> Rgb24 {
        match region {
            Region::Background => self.bg_rgb,
            Region::Void => self.void_rgb,
        }
    }

    pub fn alpha(&self, region: Region) -> u8 {
        match region {
            Region::Background => self.bg_alpha(),
            Region::Void => self.void_alpha(),
        }
    }

    /// RGB of a fully transparent pixel carries no meaning unless a color
    /// was asked for explicitly.
    pub fn rgb_asserted(&self, region: Region) -> bool {
        match region {
            Region::Background => !self.transparent || self.bgcolor_given,
            Region::Void => !self.void_transparent || self.void_color_given || self.bgcolor_given,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DefaultPolicyResolver {
    colors: ColorResolver,
}

impl DefaultPolicyResolver {
    pub fn new(colors: ColorResolver) -> Self {
        Self { colors }
    }

    /// Compute the expected outcome of a case. A color that cannot be resolved
    /// is a defect in the case itself and is reported as such.
    pub fn expected(&self, case: &ParameterCase) -> Result<ExpectedOutcome, ColorError> {
        let bgcolor = case
            .bgcolor
            .as_ref()
            .map(|c| self.colors.resolve(c.as_str()))
            .transpose()?;
        let void_color = case
            .void_color
            .as_ref()
            .map(|c| self.colors.resolve(c.as_str()))
            .transpose()?;
        let style_background = case
            .style
            .as_ref()
            .and_then(|s| s.background.as_deref())
            .map(|c| self.colors.resolve(c))
            .transpose()?;

        let transparent = effective_transparent(case.transparent, bgcolor.is_some());
        let bg_rgb = effective_bg_rgb(bgcolor, style_background);

        Ok(ExpectedOutcome {
            transparent,
            void_transparent: effective_void_transparent(case.void_transparent, transparent),
            bg_rgb,
            void_rgb: effective_void_rgb(void_color, bg_rgb),
            bgcolor_given: bgcolor.is_some(),
            void_color_given: void_color.is_some(),
        })
    }
}
