//! A fully constructed, read-only scene.

use crate::{
    hittable::{HitRecord, Hittable, HittableList},
    BvhError, Camera, Light,
};
use glint_math::{Interval, Ray};
use std::time::Instant;

/// Root object, camera and lights. Immutable once built and shared by
/// reference across every render worker.
pub struct Scene {
    root: Box<dyn Hittable>,
    camera: Camera,
    lights: Vec<Light>,
    /// Known only when the scene was assembled from a list
    primitive_count: Option<usize>,
}

impl Scene {
    /// Use `root` as-is. The primitive count is unknown.
    pub fn new(root: Box<dyn Hittable>, camera: Camera, lights: Vec<Light>) -> Self {
        Self {
            root,
            camera,
            lights,
            primitive_count: None,
        }
    }

    /// Build a scene from a flat list, optionally accelerated by a BVH built
    /// over the camera's shutter interval.
    pub fn from_list(
        list: HittableList,
        camera: Camera,
        lights: Vec<Light>,
        accelerate: bool,
    ) -> Result<Self, BvhError> {
        let primitive_count = list.len();

        let root: Box<dyn Hittable> = if accelerate {
            let (time0, time1) = camera.shutter();
            let start = Instant::now();
            let bvh = list.into_bvh(time0, time1)?;
            log::info!(
                "BVH over {} primitives: {} leaves, depth {}, built in {:.2?}",
                primitive_count,
                bvh.leaf_count(),
                bvh.depth(),
                start.elapsed()
            );
            Box::new(bvh)
        } else {
            log::info!("Flat object list with {} primitives", primitive_count);
            Box::new(list)
        };

        Ok(Self {
            root,
            camera,
            lights,
            primitive_count: Some(primitive_count),
        })
    }

    /// Closest hit against the root object.
    #[inline]
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        self.root.hit(ray, ray_t)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn primitive_count(&self) -> Option<usize> {
        self.primitive_count
    }
}
