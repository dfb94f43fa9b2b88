//! In-memory framebuffer.

use crate::Color;
use glint_math::Interval;

/// Width x height grid of display-ready (gamma-corrected) colours.
///
/// Row 0 is the top of the image.
#[derive(Debug, Clone, PartialEq)]
pub struct Film {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Film {
    /// Create a new film filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Row-major pixel storage, for handing disjoint rows to workers.
    pub(crate) fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Convert to packed 8-bit RGB, row 0 first.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let rgb: Vec<[u8; 3]> = self.pixels.iter().map(|c| color_to_rgb(*c)).collect();
        bytemuck::cast_slice(&rgb).to_vec()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Quantize a display-ready colour to 8-bit RGB, clamping to `[0, 1]` first.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let quantize = |c: f64| (255.0 * Interval::UNIT.clamp(c)) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}
