//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use glint_math::{Aabb, Interval, Ray, Vec3};
use std::sync::Arc;

/// Determinant threshold below which the ray counts as parallel to the plane.
const PARALLEL_EPSILON: f64 = 1e-5;

/// Padding for the bounding box of axis-aligned triangles.
const BOX_PADDING: f64 = 0.0001;

/// A triangle primitive.
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Face normal, `(v1 - v0) x (v2 - v0)` normalized
    normal: Vec3,
    /// Per-vertex normals for smooth shading
    vertex_normals: Option<[Vec3; 3]>,
    material: Arc<dyn Material>,
}

impl Triangle {
    /// Create a new flat-shaded triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<dyn Material>) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();

        Self {
            v0,
            v1,
            v2,
            normal,
            vertex_normals: None,
            material,
        }
    }

    /// Create a triangle whose shading normal is interpolated from
    /// per-vertex normals.
    pub fn with_vertex_normals(
        v0: Vec3,
        v1: Vec3,
        v2: Vec3,
        normals: [Vec3; 3],
        material: Arc<dyn Material>,
    ) -> Self {
        let mut triangle = Self::new(v0, v1, v2, material);
        triangle.vertex_normals = Some(normals.map(|n| n.normalize_or_zero()));
        triangle
    }
}

impl Hittable for Triangle {
    /// Möller-Trumbore, two-sided: only near-parallel rays are rejected.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction().cross(edge2);
        let det = edge1.dot(h);
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin() - self.v0;
        let u = inv_det * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = inv_det * ray.direction().dot(q);
        if !(0.0..=1.0).contains(&v) || u + v > 1.0 {
            return None;
        }

        let t = inv_det * edge2.dot(q);
        if !ray_t.surrounds(t) {
            return None;
        }

        let normal = match &self.vertex_normals {
            Some([n0, n1, n2]) => {
                let w = 1.0 - u - v;
                (*n0 * w + *n1 * u + *n2 * v)
                    .try_normalize()
                    .unwrap_or(self.normal)
            }
            None => self.normal,
        };

        Some(HitRecord {
            t,
            u,
            v,
            p: ray.at(t),
            normal,
            material: &*self.material,
        })
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> Option<Aabb> {
        Aabb::from_points([self.v0, self.v1, self.v2]).map(|bbox| bbox.pad(BOX_PADDING))
    }
}
