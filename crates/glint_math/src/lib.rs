//! Glint math - vectors, rays and bounding volumes.
//!
//! Everything is double precision. `Vec3` is glam's `DVec3`, re-exported under
//! the name the rest of the workspace uses.

pub use glam;
pub use glam::DVec3 as Vec3;

mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
