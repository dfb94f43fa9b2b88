//! Recursive radiance estimators.
//!
//! [`PathTracer`] follows material scattering until the ray escapes, is
//! absorbed, or the depth bound is reached. [`DirectLighting`] evaluates each
//! material's local illumination model against the scene's analytic lights,
//! with one shadow ray per light, and only recurses along mirror reflections.

use crate::{reflect, Color, Scene};
use glint_math::{Interval, Ray, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Radiance for rays that leave the scene.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// White-to-blue gradient by ray elevation.
    #[default]
    Sky,
    Solid(Color),
}

impl Background {
    pub fn value(&self, ray: &Ray) -> Color {
        match *self {
            Background::Sky => {
                let unit_direction = ray.direction().normalize_or_zero();
                let t = 0.5 * (unit_direction.y + 1.0);
                (1.0 - t) * Color::ONE + t * Color::new(0.5, 0.7, 1.0)
            }
            Background::Solid(color) => color,
        }
    }
}

/// Which integrator a render uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorKind {
    #[default]
    PathTrace,
    DirectLighting,
}

/// Estimates the radiance carried back along a ray.
pub trait Integrator: Send + Sync {
    /// `depth` is the number of bounces already taken; camera rays start at 0.
    fn shade(&self, ray: &Ray, scene: &Scene, depth: u32, rng: &mut dyn RngCore) -> Color;
}

/// Recursive Monte Carlo path tracer.
#[derive(Debug, Clone)]
pub struct PathTracer {
    pub max_depth: u32,
    pub t_min: f64,
    pub background: Background,
}

impl Integrator for PathTracer {
    fn shade(&self, ray: &Ray, scene: &Scene, depth: u32, rng: &mut dyn RngCore) -> Color {
        let Some(rec) = scene.hit(ray, Interval::new(self.t_min, f64::INFINITY)) else {
            return self.background.value(ray);
        };

        let emitted = rec.material.emitted(rec.u, rec.v, rec.p);
        if depth >= self.max_depth {
            return emitted;
        }

        match rec.material.scatter(ray, &rec, rng) {
            Some(s) => emitted + s.attenuation * self.shade(&s.scattered, scene, depth + 1, rng),
            None => emitted,
        }
    }
}

/// Local illumination with shadow rays.
#[derive(Debug, Clone)]
pub struct DirectLighting {
    pub max_depth: u32,
    pub t_min: f64,
    pub background: Background,
}

impl DirectLighting {
    /// Is anything between `p` and the light within `distance`?
    fn occluded(&self, scene: &Scene, p: Vec3, to_light: Vec3, distance: f64, time: f64) -> bool {
        let shadow = Ray::new(p, to_light, time);
        scene
            .hit(&shadow, Interval::new(self.t_min, distance))
            .is_some()
    }
}

impl Integrator for DirectLighting {
    fn shade(&self, ray: &Ray, scene: &Scene, depth: u32, rng: &mut dyn RngCore) -> Color {
        let Some(rec) = scene.hit(ray, Interval::new(self.t_min, f64::INFINITY)) else {
            return self.background.value(ray);
        };

        let material = rec.material;
        let normal = rec.facing_normal(ray);
        let view = -ray.direction().normalize();

        let mut color = material.emitted(rec.u, rec.v, rec.p);
        for light in scene.lights() {
            if light.is_ambient() {
                // Once per camera ray, not per bounce
                if depth == 0 {
                    color += material.shade_ambient(&rec, light.intensity(rec.p));
                }
                continue;
            }

            // A point light sitting on the surface has no direction to it
            let Some((to_light, distance)) = light.direction(rec.p) else {
                continue;
            };
            if normal.dot(to_light) <= 0.0
                || self.occluded(scene, rec.p, to_light, distance, ray.time())
            {
                continue;
            }
            let intensity = light.intensity(rec.p);
            color += material.shade_light(&rec, normal, view, to_light, intensity);
        }

        if depth < self.max_depth {
            if let Some(weight) = material.reflectivity() {
                let reflected = Ray::new(rec.p, reflect(-view, normal), ray.time());
                color += weight * self.shade(&reflected, scene, depth + 1, rng);
            }
        }

        color
    }
}
