//! Analytic lights for the direct-lighting integrator.

use crate::{Color, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Uniform light added once per camera ray.
    Ambient { color: Color },
    /// Light arriving from infinitely far away along `direction` (unit).
    Directional { direction: Vec3, color: Color },
    /// Light at `position` whose intensity falls off as `distance^-falloff`.
    Point {
        position: Vec3,
        color: Color,
        falloff: i32,
    },
}

impl Light {
    pub fn ambient(color: Color) -> Self {
        Light::Ambient { color }
    }

    /// `direction` is the way the light travels; it is normalized here.
    pub fn directional(direction: Vec3, color: Color) -> Self {
        Light::Directional {
            direction: direction.normalize_or_zero(),
            color,
        }
    }

    pub fn point(position: Vec3, color: Color, falloff: i32) -> Self {
        Light::Point {
            position,
            color,
            falloff,
        }
    }

    pub fn is_ambient(&self) -> bool {
        matches!(self, Light::Ambient { .. })
    }

    /// Unit vector from `p` toward the light and the distance a shadow ray
    /// must travel. `None` for ambient light, which casts no shadows.
    pub fn direction(&self, p: Vec3) -> Option<(Vec3, f64)> {
        match *self {
            Light::Ambient { .. } => None,
            Light::Directional { direction, .. } => Some((-direction, f64::INFINITY)),
            Light::Point { position, .. } => {
                let offset = position - p;
                let distance = offset.length();
                (distance > 0.0).then(|| (offset / distance, distance))
            }
        }
    }

    /// Colour arriving at `p`, after distance falloff.
    pub fn intensity(&self, p: Vec3) -> Color {
        match *self {
            Light::Ambient { color } | Light::Directional { color, .. } => color,
            Light::Point {
                position,
                color,
                falloff,
            } => {
                if falloff == 0 {
                    return color;
                }
                color / (position - p).length().powi(falloff)
            }
        }
    }

    pub fn falloff(&self) -> i32 {
        match *self {
            Light::Point { falloff, .. } => falloff,
            _ => 0,
        }
    }
}
