//! Hittable trait and HitRecord for ray-object intersection.

use crate::{BvhError, BvhNode, Material};
use glint_math::{Aabb, Interval, Ray, Vec3};

/// Record of a ray-object intersection.
///
/// `normal` is the unit-length outward geometric normal; it is not flipped to
/// face the ray. Materials that care about the side that was hit compare it
/// against the incoming direction themselves.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: f64,
    /// Surface parametrisation at the hit point
    pub u: f64,
    pub v: f64,
    /// Point of intersection
    pub p: Vec3,
    /// Outward surface normal (unit length)
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a dyn Material,
}

impl<'a> HitRecord<'a> {
    /// True when the ray arrives from the side the outward normal points to.
    #[inline]
    pub fn front_face(&self, ray: &Ray) -> bool {
        ray.direction().dot(self.normal) < 0.0
    }

    /// The normal flipped, if needed, to point back against the ray.
    #[inline]
    pub fn facing_normal(&self, ray: &Ray) -> Vec3 {
        if self.front_face(ray) {
            self.normal
        } else {
            -self.normal
        }
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Closest intersection with `ray` strictly inside `ray_t`, if any.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>>;

    /// Box enclosing the object over the shutter interval `[time0, time1]`.
    ///
    /// `None` means the object has no finite bounds.
    fn bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb>;
}

/// An ordered list of hittable objects.
///
/// Serves both as the flat scene container and as the input to the BVH build.
#[derive(Default)]
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            objects: Vec::with_capacity(capacity),
        }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: impl Hittable + 'static) {
        self.objects.push(Box::new(object));
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Consume the list and build a BVH over its contents.
    pub fn into_bvh(self, time0: f64, time1: f64) -> Result<BvhNode, BvhError> {
        BvhNode::new(self.objects, time0, time1)
    }
}

impl From<Vec<Box<dyn Hittable>>> for HittableList {
    fn from(objects: Vec<Box<dyn Hittable>>) -> Self {
        Self { objects }
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord<'_>> = None;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            if let Some(rec) = object.hit(ray, ray_t.with_max(closest_so_far)) {
                closest_so_far = rec.t;
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb> {
        let (first, rest) = self.objects.split_first()?;
        let mut bbox = first.bounding_box(time0, time1)?;
        for object in rest {
            bbox = Aabb::surrounding(&bbox, &object.bounding_box(time0, time1)?);
        }
        Some(bbox)
    }
}
