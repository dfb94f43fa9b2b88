//! Sphere whose centre moves linearly during the shutter interval.

use crate::{
    hittable::{HitRecord, Hittable},
    sphere::{sphere_hit, sphere_root},
    Material,
};
use glint_math::{Aabb, Interval, Ray, Vec3};
use std::sync::Arc;

/// A sphere travelling from `center0` at `time0` to `center1` at `time1`.
pub struct MovingSphere {
    center0: Vec3,
    center1: Vec3,
    time0: f64,
    time1: f64,
    radius: f64,
    material: Arc<dyn Material>,
}

impl MovingSphere {
    pub fn new(
        center0: Vec3,
        center1: Vec3,
        time0: f64,
        time1: f64,
        radius: f64,
        material: Arc<dyn Material>,
    ) -> Self {
        Self {
            center0,
            center1,
            time0,
            time1,
            radius: radius.max(0.0),
            material,
        }
    }

    /// Centre at `time`, linearly interpolated (and extrapolated) from the
    /// two key positions.
    pub fn center(&self, time: f64) -> Vec3 {
        let span = self.time1 - self.time0;
        if span == 0.0 {
            return self.center0;
        }
        self.center0 + (self.center1 - self.center0) * ((time - self.time0) / span)
    }
}

impl Hittable for MovingSphere {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let center = self.center(ray.time());
        let t = sphere_root(center, self.radius, ray, ray_t)?;
        Some(sphere_hit(center, self.radius, ray, t, &*self.material))
    }

    /// Union of the boxes at both ends of the interval.
    fn bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb> {
        let rvec = Vec3::splat(self.radius);
        let c0 = self.center(time0);
        let c1 = self.center(time1);
        let box0 = Aabb::new(c0 - rvec, c0 + rvec);
        let box1 = Aabb::new(c1 - rvec, c1 + rvec);
        Some(Aabb::surrounding(&box0, &box1))
    }
}
