//! Glint renderer - CPU Monte Carlo path tracing.
//!
//! Scenes are built from primitives (spheres, moving spheres, triangles,
//! axis-aligned rectangles) that share materials by `Arc`. The root object is
//! either a flat [`HittableList`] or a SAH-split [`BvhNode`]. A frame is
//! rendered by the [`render`] driver, which hands image rows to a rayon pool
//! and runs one of two [`Integrator`]s per sample.

mod bvh;
mod camera;
mod film;
mod hittable;
mod integrator;
mod light;
mod material;
mod moving_sphere;
mod output;
mod rect;
mod renderer;
pub mod sampling;
mod scene;
mod sphere;
mod texture;
mod triangle;

pub use bvh::{BvhError, BvhNode};
pub use camera::Camera;
pub use film::{color_to_rgb, linear_to_gamma, Film};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use integrator::{Background, DirectLighting, Integrator, IntegratorKind, PathTracer};
pub use light::Light;
pub use material::{
    reflect, refract, schlick, BlinnPhong, Color, Dielectric, DiffuseLight, Lambertian, Material,
    Metal, ScatterRecord,
};
pub use moving_sphere::MovingSphere;
pub use output::{save_film, ImageFormat, OutputError};
pub use rect::{Plane, Rect};
pub use renderer::{
    dispatch_rows, render, render_pixel, Frame, FrameState, RenderConfig, RenderError,
    RenderStats,
};
pub use scene::Scene;
pub use sphere::Sphere;
pub use texture::Texture;
pub use triangle::Triangle;

/// Re-export Vec3 and common math types from glint_math
pub use glint_math::{Aabb, Interval, Ray, Vec3};
