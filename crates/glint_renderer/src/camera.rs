//! Camera for ray generation.

use crate::sampling::{gen_f64, random_in_unit_disk};
use glint_math::{Ray, Vec3};
use rand::RngCore;

/// Thin-lens camera mapping normalized film coordinates to rays.
///
/// `(u, v) = (0, 0)` is the lower-left corner of the image, `(1, 1)` the
/// upper-right.
#[derive(Debug, Clone)]
pub struct Camera {
    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    // Lens settings
    vfov: f64,       // Vertical field of view in degrees
    aspect: f64,     // Width / height
    aperture: f64,   // Lens diameter, 0 for a pinhole
    focus_dist: f64, // Distance from camera to plane of perfect focus

    // Shutter
    time0: f64,
    time1: f64,
    motion_blur: bool,

    // Cached computed values (set by initialize())
    lower_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f64,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        let mut camera = Self {
            look_from: Vec3::new(0.0, 0.0, 10.0),
            look_at: Vec3::ZERO,
            vup: Vec3::Y,
            vfov: 20.0,
            aspect: 1.0,
            aperture: 0.0,
            focus_dist: 1.0,
            time0: 0.0,
            time1: 1.0,
            motion_blur: false,
            lower_left: Vec3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            lens_radius: 0.0,
        };
        camera.initialize();
        camera
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f64, aperture: f64, focus_dist: f64) -> Self {
        self.vfov = vfov;
        self.aperture = aperture.max(0.0);
        self.focus_dist = focus_dist;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect: f64) -> Self {
        self.aspect = aspect;
        self
    }

    /// Set the shutter interval rays are time-stamped within.
    pub fn with_shutter(mut self, time0: f64, time1: f64) -> Self {
        self.time0 = time0;
        self.time1 = time1;
        self
    }

    /// With motion blur off every ray is stamped `time0`.
    pub fn with_motion_blur(mut self, enabled: bool) -> Self {
        self.motion_blur = enabled;
        self
    }

    /// Recompute the cached basis. The builder methods leave the cache stale,
    /// so call this once after configuring.
    pub fn initialize(&mut self) {
        let theta = self.vfov.to_radians();
        let half_height = (theta / 2.0).tan();
        let half_width = self.aspect * half_height;

        // Calculate camera basis vectors
        self.w = (self.look_from - self.look_at).normalize_or_zero();
        self.u = self.vup.cross(self.w).normalize_or_zero();
        self.v = self.w.cross(self.u);

        self.lower_left = self.look_from
            - half_width * self.focus_dist * self.u
            - half_height * self.focus_dist * self.v
            - self.focus_dist * self.w;
        self.horizontal = 2.0 * half_width * self.focus_dist * self.u;
        self.vertical = 2.0 * half_height * self.focus_dist * self.v;
        self.lens_radius = self.aperture / 2.0;
    }

    /// Generate the ray through film position `(s, t)`.
    pub fn get_ray(&self, s: f64, t: f64, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3::ZERO
        };

        let time = if self.motion_blur {
            self.time0 + gen_f64(rng) * (self.time1 - self.time0)
        } else {
            self.time0
        };

        let origin = self.look_from + offset;
        let target = self.lower_left + s * self.horizontal + t * self.vertical;
        Ray::new(origin, target - origin, time)
    }

    /// The shutter interval `(time0, time1)`.
    pub fn shutter(&self) -> (f64, f64) {
        (self.time0, self.time1)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
