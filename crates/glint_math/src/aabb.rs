use crate::{Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box used by the BVH.
///
/// Invariant: `min[i] <= max[i]` on every axis. Constructors normalize their
/// input so the invariant always holds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB from two opposite corners, in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest box containing every point. `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// Grow any axis thinner than `delta` to exactly `delta`, centred on the
    /// original extent. Flat primitives (rectangles, axis-aligned triangles)
    /// otherwise produce zero-width slabs.
    pub fn pad(&self, delta: f64) -> Self {
        let mut min = self.min;
        let mut max = self.max;
        for axis in 0..3 {
            let size = max[axis] - min[axis];
            if size < delta {
                let padded = Interval::new(min[axis], max[axis]).expand(delta - size);
                min[axis] = padded.min;
                max[axis] = padded.max;
            }
        }
        Self { min, max }
    }

    /// Slab test: does the ray pass through the box within `ray_t`?
    ///
    /// A zero direction component gives `±inf` for `1/d`, and the comparisons
    /// below are written so that the resulting infinities (and the NaN of
    /// `0 * inf` for an origin lying on a slab plane) never wrongly narrow the
    /// interval.
    pub fn hit(&self, r: &Ray, ray_t: Interval) -> bool {
        let mut t_min = ray_t.min;
        let mut t_max = ray_t.max;

        for axis in 0..3 {
            let inv_d = 1.0 / r.direction[axis];
            let mut t0 = (self.min[axis] - r.origin[axis]) * inv_d;
            let mut t1 = (self.max[axis] - r.origin[axis]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            if t0 > t_min {
                t_min = t0;
            }
            if t1 < t_max {
                t_max = t1;
            }
            if t_max < t_min {
                return false;
            }
        }

        true
    }

    /// Surface area, the cost measure for the SAH split.
    pub fn area(&self) -> f64 {
        let d = self.max - self.min;
        2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
    }

    /// Index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    ///
    /// Ties prefer X over Y over Z.
    pub fn longest_axis(&self) -> usize {
        let d = self.max - self.min;

        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }
}
