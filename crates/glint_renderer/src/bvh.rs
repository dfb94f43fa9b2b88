//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Binary tree built once per scene with a greedy surface-area-heuristic
//! split. Each branch exclusively owns its two children; single primitives are
//! stored directly as leaves.

use crate::hittable::{HitRecord, Hittable};
use glint_math::{Aabb, Interval, Ray};
use thiserror::Error;

/// Errors raised while building a BVH.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BvhError {
    #[error("cannot build a BVH over zero primitives")]
    Empty,

    #[error("primitive {index} has no bounding box")]
    Unbounded { index: usize },
}

/// BVH node - either a branch with two children or a single primitive.
pub enum BvhNode {
    /// Internal node. `bbox` is the union of everything below it.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// A single primitive.
    Leaf { object: Box<dyn Hittable>, bbox: Aabb },
}

impl BvhNode {
    /// Build a BVH over `objects`, bounding moving primitives over the shutter
    /// interval `[time0, time1]`.
    pub fn new(objects: Vec<Box<dyn Hittable>>, time0: f64, time1: f64) -> Result<Self, BvhError> {
        if objects.is_empty() {
            return Err(BvhError::Empty);
        }

        let items = objects
            .into_iter()
            .enumerate()
            .map(|(index, object)| {
                object
                    .bounding_box(time0, time1)
                    .map(|bbox| (bbox, object))
                    .ok_or(BvhError::Unbounded { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::build(items))
    }

    /// Recursive SAH construction over a non-empty working set.
    fn build(mut items: Vec<(Aabb, Box<dyn Hittable>)>) -> Self {
        if items.len() == 1 {
            let (bbox, object) = items.remove(0);
            return BvhNode::Leaf { object, bbox };
        }

        let bbox = items
            .iter()
            .skip(1)
            .fold(items[0].0, |acc, (b, _)| Aabb::surrounding(&acc, b));

        let axis = bbox.longest_axis();
        items.sort_by(|(a, _), (b, _)| a.min[axis].total_cmp(&b.min[axis]));

        let split = sah_split(&items);
        let right_items = items.split_off(split + 1);

        BvhNode::Branch {
            left: Box::new(Self::build(items)),
            right: Box::new(Self::build(right_items)),
            bbox,
        }
    }

    pub fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => *bbox,
        }
    }

    /// Longest root-to-leaf path, counted in nodes.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}

/// Index `i` of the last element of the left half minimising
/// `i * area(left[0..=i]) + (n - i - 1) * area(right[i+1..n])`.
///
/// Items must already be sorted along the split axis. The first minimum wins.
fn sah_split(items: &[(Aabb, Box<dyn Hittable>)]) -> usize {
    let n = items.len();

    let mut left_area = Vec::with_capacity(n);
    let mut acc = items[0].0;
    for (bbox, _) in items {
        acc = Aabb::surrounding(&acc, bbox);
        left_area.push(acc.area());
    }

    let mut right_area = vec![0.0; n];
    let mut acc = items[n - 1].0;
    for (i, (bbox, _)) in items.iter().enumerate().rev() {
        acc = Aabb::surrounding(&acc, bbox);
        right_area[i] = acc.area();
    }

    let mut best = 0;
    let mut best_cost = f64::INFINITY;
    for i in 0..n - 1 {
        let cost = i as f64 * left_area[i] + (n - i - 1) as f64 * right_area[i + 1];
        if cost < best_cost {
            best_cost = cost;
            best = i;
        }
    }
    best
}

impl Hittable for BvhNode {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        match self {
            BvhNode::Leaf { object, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }
                object.hit(ray, ray_t)
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit(ray, ray_t);

                // Only check right up to closest hit; an equal t keeps the left
                let right_t = hit_left.map_or(ray_t, |rec| ray_t.with_max(rec.t));
                let hit_right = right.hit(ray, right_t);

                hit_right.or(hit_left)
            }
        }
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> Option<Aabb> {
        Some(self.bbox())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, HittableList, Lambertian, Material, Sphere, Vec3};
    use std::sync::Arc;

    fn grey() -> Arc<dyn Material> {
        Arc::new(Lambertian::solid(Color::splat(0.5)))
    }

    fn spheres(centers: &[Vec3], material: &Arc<dyn Material>) -> Vec<Box<dyn Hittable>> {
        centers
            .iter()
            .map(|&c| Box::new(Sphere::new(c, 0.5, material.clone())) as Box<dyn Hittable>)
            .collect()
    }

    struct Unbounded;

    impl Hittable for Unbounded {
        fn hit(&self, _ray: &Ray, _ray_t: Interval) -> Option<HitRecord<'_>> {
            None
        }

        fn bounding_box(&self, _time0: f64, _time1: f64) -> Option<Aabb> {
            None
        }
    }

    #[test]
    fn test_bvh_empty() {
        let result = BvhNode::new(vec![], 0.0, 1.0);
        assert_eq!(result.err(), Some(BvhError::Empty));
    }

    #[test]
    fn test_bvh_unbounded_primitive() {
        let mut objects = spheres(&[Vec3::ZERO], &grey());
        objects.push(Box::new(Unbounded));

        let result = BvhNode::new(objects, 0.0, 1.0);
        assert_eq!(result.err(), Some(BvhError::Unbounded { index: 1 }));
    }

    #[test]
    fn test_bvh_single_sphere() {
        let bvh = BvhNode::new(spheres(&[Vec3::new(0.0, 0.0, -1.0)], &grey()), 0.0, 1.0).unwrap();

        // Should create a leaf
        assert!(matches!(bvh, BvhNode::Leaf { .. }));

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(bvh.hit(&ray, Interval::new(0.001, f64::INFINITY)).is_some());
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let centers: Vec<Vec3> = (0..10).map(|i| Vec3::new(i as f64, 0.0, -5.0)).collect();
        let bvh = BvhNode::new(spheres(&centers, &grey()), 0.0, 1.0).unwrap();

        assert_eq!(bvh.leaf_count(), 10);
        assert!(bvh.depth() <= 10);

        // Test ray that hits sphere at x=5
        let ray = Ray::new_simple(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = bvh.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();

        // Hit point should be at z = -4.5 (sphere at z=-5, radius 0.5)
        assert!((rec.p.z - (-4.5)).abs() < 1e-9);
    }

    #[test]
    fn test_root_box_is_union_of_children() {
        let centers = [
            Vec3::new(-3.0, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 0.0),
            Vec3::new(0.0, -4.0, 2.0),
        ];
        let bvh = BvhNode::new(spheres(&centers, &grey()), 0.0, 1.0).unwrap();

        let bbox = bvh.bbox();
        assert_eq!(bbox.min, Vec3::new(-3.5, -4.5, -0.5));
        assert_eq!(bbox.max, Vec3::new(2.5, 1.5, 2.5));
    }

    #[test]
    fn test_bvh_matches_list_on_overlapping_spheres() {
        let near = grey();
        let far: Arc<dyn Material> = Arc::new(Lambertian::solid(Color::ONE));

        let mut objects = spheres(&[Vec3::new(0.0, 0.0, -3.0)], &near);
        objects.extend(spheres(
            &[Vec3::new(0.0, 0.0, -3.4), Vec3::new(0.2, 0.0, -6.0)],
            &far,
        ));
        let bvh = BvhNode::new(objects, 0.0, 1.0).unwrap();

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = bvh.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();

        assert!((rec.t - 2.5).abs() < 1e-9);
        assert!(std::ptr::addr_eq(rec.material, Arc::as_ptr(&near)));
    }

    #[test]
    fn test_equal_t_keeps_left() {
        let left = grey();
        let right: Arc<dyn Material> = Arc::new(Lambertian::solid(Color::ONE));

        // Two coincident spheres: sorted order is stable, so the first one
        // lands on the left
        let mut objects = spheres(&[Vec3::new(0.0, 0.0, -3.0)], &left);
        objects.extend(spheres(&[Vec3::new(0.0, 0.0, -3.0)], &right));
        let bvh = BvhNode::new(objects, 0.0, 1.0).unwrap();

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = bvh.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();
        assert!(std::ptr::addr_eq(rec.material, Arc::as_ptr(&left)));
    }

    #[test]
    fn test_ray_missing_root_box() {
        let centers: Vec<Vec3> = (0..8).map(|i| Vec3::new(i as f64, 0.0, -5.0)).collect();
        let bvh = BvhNode::new(spheres(&centers, &grey()), 0.0, 1.0).unwrap();

        let ray = Ray::new_simple(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(bvh.hit(&ray, Interval::new(0.001, f64::INFINITY)).is_none());
    }

    #[test]
    fn test_sah_split_separates_clusters() {
        // Two tight clusters far apart: the cheapest split is between them
        let mut centers: Vec<Vec3> = (0..3).map(|i| Vec3::new(i as f64 * 0.1, 0.0, 0.0)).collect();
        centers.extend((0..5).map(|i| Vec3::new(100.0 + i as f64 * 0.1, 0.0, 0.0)));

        let items: Vec<(Aabb, Box<dyn Hittable>)> = spheres(&centers, &grey())
            .into_iter()
            .map(|o| (o.bounding_box(0.0, 1.0).unwrap(), o))
            .collect();

        assert_eq!(sah_split(&items), 2);
    }

    #[test]
    fn test_into_bvh_from_list() {
        let mut list = HittableList::new();
        list.add(Sphere::new(Vec3::new(0.0, 0.0, -2.0), 0.5, grey()));
        list.add(Sphere::new(Vec3::new(2.0, 0.0, -2.0), 0.5, grey()));

        let bvh = list.into_bvh(0.0, 1.0).unwrap();
        assert_eq!(bvh.leaf_count(), 2);
        assert_eq!(bvh.depth(), 2);
    }
}
