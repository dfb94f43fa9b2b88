//! Surface textures.

use crate::{Color, Vec3};

/// Colour as a function of surface position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Texture {
    Solid(Color),
    /// 3D checkerboard: `sin(10x) sin(10y) sin(10z) < 0` selects `odd`.
    Checker { even: Color, odd: Color },
}

impl Texture {
    pub fn checker(even: Color, odd: Color) -> Self {
        Texture::Checker { even, odd }
    }

    pub fn value(&self, _u: f64, _v: f64, p: Vec3) -> Color {
        match *self {
            Texture::Solid(color) => color,
            Texture::Checker { even, odd } => {
                let sines = (10.0 * p.x).sin() * (10.0 * p.y).sin() * (10.0 * p.z).sin();
                if sines < 0.0 {
                    odd
                } else {
                    even
                }
            }
        }
    }
}

impl From<Color> for Texture {
    fn from(color: Color) -> Self {
        Texture::Solid(color)
    }
}
