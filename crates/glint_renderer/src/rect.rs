//! Axis-aligned rectangles.

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use glint_math::{Aabb, Interval, Ray, Vec3};
use std::sync::Arc;

/// Thickness given to the otherwise flat bounding box.
const BOX_PADDING: f64 = 0.0001;

/// The coordinate plane a rectangle lies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    XY,
    XZ,
    YZ,
}

impl Plane {
    /// Axis indices `(a, b, normal)`: the two in-plane axes and the one the
    /// plane is perpendicular to.
    fn axes(self) -> (usize, usize, usize) {
        match self {
            Plane::XY => (0, 1, 2),
            Plane::XZ => (0, 2, 1),
            Plane::YZ => (1, 2, 0),
        }
    }
}

/// Rectangle `[a0, a1] x [b0, b1]` in `plane`, offset `k` along the plane's
/// normal axis. The outward normal is the positive normal axis.
pub struct Rect {
    plane: Plane,
    a0: f64,
    a1: f64,
    b0: f64,
    b1: f64,
    k: f64,
    material: Arc<dyn Material>,
}

impl Rect {
    /// Edge coordinates may be given in either order.
    pub fn new(
        plane: Plane,
        (a0, a1): (f64, f64),
        (b0, b1): (f64, f64),
        k: f64,
        material: Arc<dyn Material>,
    ) -> Self {
        Self {
            plane,
            a0: a0.min(a1),
            a1: a0.max(a1),
            b0: b0.min(b1),
            b1: b0.max(b1),
            k,
            material,
        }
    }

    pub fn xy(x: (f64, f64), y: (f64, f64), z: f64, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::XY, x, y, z, material)
    }

    pub fn xz(x: (f64, f64), z: (f64, f64), y: f64, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::XZ, x, z, y, material)
    }

    pub fn yz(y: (f64, f64), z: (f64, f64), x: f64, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::YZ, y, z, x, material)
    }
}

impl Hittable for Rect {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let (a_axis, b_axis, n_axis) = self.plane.axes();
        let origin = ray.origin();
        let direction = ray.direction();

        let t = (self.k - origin[n_axis]) / direction[n_axis];
        if !ray_t.surrounds(t) {
            return None;
        }

        let a = origin[a_axis] + t * direction[a_axis];
        let b = origin[b_axis] + t * direction[b_axis];
        if a < self.a0 || a > self.a1 || b < self.b0 || b > self.b1 {
            return None;
        }

        let mut normal = Vec3::ZERO;
        normal[n_axis] = 1.0;

        Some(HitRecord {
            t,
            u: (a - self.a0) / (self.a1 - self.a0),
            v: (b - self.b0) / (self.b1 - self.b0),
            p: ray.at(t),
            normal,
            material: &*self.material,
        })
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> Option<Aabb> {
        let (a_axis, b_axis, n_axis) = self.plane.axes();
        let mut min = Vec3::ZERO;
        let mut max = Vec3::ZERO;
        min[a_axis] = self.a0;
        max[a_axis] = self.a1;
        min[b_axis] = self.b0;
        max[b_axis] = self.b1;
        min[n_axis] = self.k;
        max[n_axis] = self.k;
        Some(Aabb::new(min, max).pad(BOX_PADDING))
    }
}
