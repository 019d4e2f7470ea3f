//! Pixel sampling of decoded map images
use std::fmt;

use image::RgbaImage;
use serde::Serialize;

use crate::color::Rgb24;

/// Where pixels are read from a map image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "mode", content = "margin", rename_all = "lowercase")]
pub enum SamplingMode {
    /// The four extreme corners.
    Corners,
    /// Points inset by a pixel margin from each corner, away from
    /// anti-aliased edges.
    Inset(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampledPixel {
    pub x: u32,
    pub y: u32,
    pub rgb: Rgb24,
    pub alpha: u8,
}

impl fmt::Display for SampledPixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})={} a={}", self.x, self.y, self.rgb, self.alpha)
    }
}

/// A decoded map response, normalized to 8-bit RGBA.
#[derive(Debug, Clone)]
pub struct MapImage {
    pixels: RgbaImage,
}

impl MapImage {
    /// Decode PNG or JPEG bytes. Formats without alpha read as opaque.
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let decoded = image::load_from_memory(bytes)?;
        Ok(Self {
            pixels: decoded.to_rgba8(),
        })
    }

    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn sample_rgb(&self, x: u32, y: u32) -> Rgb24 {
        let [r, g, b, _] = self.pixels.get_pixel(x, y).0;
        Rgb24::from_channels(r, g, b)
    }

    pub fn sample_alpha(&self, x: u32, y: u32) -> u8 {
        self.pixels.get_pixel(x, y).0[3]
    }

    pub fn sample_at(&self, x: u32, y: u32) -> SampledPixel {
        SampledPixel {
            x,
            y,
            rgb: self.sample_rgb(x, y),
            alpha: self.sample_alpha(x, y),
        }
    }

    /// Sample points for a mode, ordered top-left, top-right, bottom-left,
    /// bottom-right. Inset points that fall outside a small image are dropped.
    pub fn sample_points(&self, mode: SamplingMode) -> Vec<(u32, u32)> {
        let (w, h) = (self.width(), self.height());
        if w == 0 || h == 0 {
            return Vec::new();
        }
        let margin = match mode {
            SamplingMode::Corners => 0,
            SamplingMode::Inset(margin) => margin,
        };

        let (Some(right), Some(bottom)) = ((w - 1).checked_sub(margin), (h - 1).checked_sub(margin)) else {
            return Vec::new();
        };
        let left = margin;
        let top = margin;

        vec![(left, top), (right, top), (left, bottom), (right, bottom)]
    }

    pub fn sample(&self, mode: SamplingMode) -> Vec<SampledPixel> {
        self.sample_points(mode)
            .into_iter()
            .map(|(x, y)| self.sample_at(x, y))
            .collect()
    }
}
