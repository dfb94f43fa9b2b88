//! Sphere primitive for ray tracing.

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use glint_math::{Aabb, Interval, Ray, Vec3};
use std::f64::consts::PI;
use std::sync::Arc;

/// A static sphere.
pub struct Sphere {
    center: Vec3,
    radius: f64,
    material: Arc<dyn Material>,
}

impl Sphere {
    /// Create a new sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f64, material: Arc<dyn Material>) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }
}

/// Nearest root of `|o + t d - center|^2 = r^2` strictly inside `ray_t`.
///
/// Uses the textbook `a t^2 + b t + c` form. A zero or negative discriminant
/// is a miss, so grazing rays are rejected.
pub(crate) fn sphere_root(center: Vec3, radius: f64, ray: &Ray, ray_t: Interval) -> Option<f64> {
    let oc = ray.origin() - center;
    let a = ray.direction().dot(ray.direction());
    let b = 2.0 * oc.dot(ray.direction());
    let c = oc.dot(oc) - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant <= 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();
    let near = (-b - sqrtd) / (2.0 * a);
    if ray_t.surrounds(near) {
        return Some(near);
    }
    let far = (-b + sqrtd) / (2.0 * a);
    if ray_t.surrounds(far) {
        return Some(far);
    }
    None
}

/// Fill a hit record for a sphere hit at `t`.
pub(crate) fn sphere_hit<'a>(
    center: Vec3,
    radius: f64,
    ray: &Ray,
    t: f64,
    material: &'a dyn Material,
) -> HitRecord<'a> {
    let p = ray.at(t);
    let normal = (p - center) / radius;
    let (u, v) = sphere_uv(normal);
    HitRecord {
        t,
        u,
        v,
        p,
        normal,
        material,
    }
}

/// Spherical (u, v) of a point on the unit sphere.
///
/// `u` runs around the Y axis starting at -X, `v` from the south pole (0)
/// to the north pole (1).
pub(crate) fn sphere_uv(p: Vec3) -> (f64, f64) {
    let phi = p.z.atan2(p.x);
    let theta = p.y.clamp(-1.0, 1.0).asin();
    let u = 1.0 - (phi + PI) / (2.0 * PI);
    let v = (theta + PI / 2.0) / PI;
    (u, v)
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let t = sphere_root(self.center, self.radius, ray, ray_t)?;
        Some(sphere_hit(self.center, self.radius, ray, t, &*self.material))
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> Option<Aabb> {
        let rvec = Vec3::splat(self.radius);
        Some(Aabb::new(self.center - rvec, self.center + rvec))
    }
}
