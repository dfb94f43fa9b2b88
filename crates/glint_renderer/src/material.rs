//! Material trait for surface scattering.

use crate::{hittable::HitRecord, sampling, Texture};
use glint_math::{Ray, Vec3};
use rand::RngCore;

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// A continuation ray and the colour it is weighted by.
#[derive(Debug, Clone, Copy)]
pub struct ScatterRecord {
    pub attenuation: Color,
    pub scattered: Ray,
}

/// Trait for materials that describe how light interacts with surfaces.
///
/// `scatter` and `emitted` drive the path tracer. The `shade_*` and
/// `reflectivity` hooks drive the direct-lighting integrator; they default to
/// "no response" so purely physical materials need not implement them.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore)
        -> Option<ScatterRecord>;

    /// Light emitted at the given surface point. Black for most materials.
    fn emitted(&self, _u: f64, _v: f64, _p: Vec3) -> Color {
        Color::ZERO
    }

    /// Response to one unoccluded light.
    ///
    /// `normal` faces the viewer, `view` points from the surface toward the
    /// eye and `to_light` toward the light; all three are unit length.
    fn shade_light(
        &self,
        _rec: &HitRecord,
        _normal: Vec3,
        _view: Vec3,
        _to_light: Vec3,
        _intensity: Color,
    ) -> Color {
        Color::ZERO
    }

    /// Response to ambient light.
    fn shade_ambient(&self, _rec: &HitRecord, _intensity: Color) -> Color {
        Color::ZERO
    }

    /// Weight of the mirror-reflection ray, if the surface reflects at all.
    fn reflectivity(&self) -> Option<Color> {
        None
    }
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Texture,
}

impl Lambertian {
    pub fn new(albedo: Texture) -> Self {
        Self { albedo }
    }

    /// Create a new Lambertian material with a uniform albedo color.
    pub fn solid(albedo: Color) -> Self {
        Self::new(Texture::Solid(albedo))
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        let normal = rec.facing_normal(ray_in);
        let mut scatter_direction = normal + sampling::random_in_unit_sphere(rng);

        // Catch degenerate scatter direction
        if scatter_direction.length_squared() < 1e-8 {
            scatter_direction = normal;
        }

        Some(ScatterRecord {
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
            scattered: Ray::new(rec.p, scatter_direction, ray_in.time()),
        })
    }

    fn shade_light(
        &self,
        rec: &HitRecord,
        normal: Vec3,
        _view: Vec3,
        to_light: Vec3,
        intensity: Color,
    ) -> Color {
        self.albedo.value(rec.u, rec.v, rec.p) * intensity * normal.dot(to_light).max(0.0)
    }

    fn shade_ambient(&self, rec: &HitRecord, intensity: Color) -> Color {
        self.albedo.value(rec.u, rec.v, rec.p) * intensity
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone)]
pub struct Metal {
    albedo: Color,
    fuzz: f64,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f64) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn fuzz(&self) -> f64 {
        self.fuzz
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        let normal = rec.facing_normal(ray_in);
        let reflected = reflect(ray_in.direction().normalize(), normal);
        let direction = reflected + self.fuzz * sampling::random_in_unit_sphere(rng);

        // Fuzz must not push the ray below the surface
        if direction.dot(normal) > 0.0 {
            Some(ScatterRecord {
                attenuation: self.albedo,
                scattered: Ray::new(rec.p, direction, ray_in.time()),
            })
        } else {
            None
        }
    }

    fn reflectivity(&self) -> Option<Color> {
        Some(self.albedo)
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone)]
pub struct Dielectric {
    /// Index of refraction
    ior: f64,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f64) -> Self {
        Self { ior }
    }

    /// Probability of taking the reflection branch for `ray_in`.
    ///
    /// Schlick reflectance when refraction is possible, 1 on total internal
    /// reflection.
    pub fn reflect_probability(&self, ray_in: &Ray, rec: &HitRecord) -> f64 {
        self.split(ray_in, rec).0
    }

    /// `(reflect probability, refracted direction)`.
    fn split(&self, ray_in: &Ray, rec: &HitRecord) -> (f64, Option<Vec3>) {
        let direction = ray_in.direction();
        let d_dot_n = direction.dot(rec.normal);

        let (outward_normal, ni_over_nt, cosine) = if d_dot_n > 0.0 {
            // Leaving the medium
            let cos_i = d_dot_n / direction.length();
            let cosine = (1.0 - self.ior * self.ior * (1.0 - cos_i * cos_i)).sqrt();
            (-rec.normal, self.ior, cosine)
        } else {
            (rec.normal, 1.0 / self.ior, -d_dot_n / direction.length())
        };

        match refract(direction, outward_normal, ni_over_nt) {
            Some(refracted) => (schlick(cosine, self.ior), Some(refracted)),
            None => (1.0, None),
        }
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        let (reflect_prob, refracted) = self.split(ray_in, rec);

        let direction = match refracted {
            Some(refracted) if sampling::gen_f64(rng) >= reflect_prob => refracted,
            _ => reflect(ray_in.direction(), rec.normal),
        };

        Some(ScatterRecord {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p, direction, ray_in.time()),
        })
    }
}

/// Diffuse light emitter.
#[derive(Debug, Clone)]
pub struct DiffuseLight {
    emit: Texture,
}

impl DiffuseLight {
    pub fn new(emit: Texture) -> Self {
        Self { emit }
    }

    /// Create a new diffuse light with a uniform emission color.
    pub fn solid(emit: Color) -> Self {
        Self::new(Texture::Solid(emit))
    }
}

impl Material for DiffuseLight {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        // Lights don't scatter rays
        None
    }

    fn emitted(&self, u: f64, v: f64, p: Vec3) -> Color {
        self.emit.value(u, v, p)
    }
}

/// Blinn-Phong local illumination.
///
/// Under the direct-lighting integrator the surface colour is
/// `ambient * Ia + sum(diffuse * I * max(0, N.L) + specular * I * max(0, V.R)^phong)`
/// with `R` the light direction mirrored about `N`, plus a mirror bounce
/// weighted by `specular` when that is non-black. Under the path tracer it
/// scatters diffusely with the `diffuse` colour.
#[derive(Debug, Clone)]
pub struct BlinnPhong {
    ambient: Color,
    diffuse: Color,
    specular: Color,
    phong: f64,
}

impl BlinnPhong {
    pub fn new(ambient: Color, diffuse: Color, specular: Color, phong: f64) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            phong,
        }
    }
}

impl Material for BlinnPhong {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        let normal = rec.facing_normal(ray_in);
        let mut direction = normal + sampling::random_in_unit_sphere(rng);
        if direction.length_squared() < 1e-8 {
            direction = normal;
        }
        Some(ScatterRecord {
            attenuation: self.diffuse,
            scattered: Ray::new(rec.p, direction, ray_in.time()),
        })
    }

    fn shade_light(
        &self,
        _rec: &HitRecord,
        normal: Vec3,
        view: Vec3,
        to_light: Vec3,
        intensity: Color,
    ) -> Color {
        let mirrored = 2.0 * to_light.dot(normal) * normal - to_light;
        let diffuse = self.diffuse * intensity * normal.dot(to_light).max(0.0);
        let specular = self.specular * intensity * view.dot(mirrored).max(0.0).powf(self.phong);
        diffuse + specular
    }

    fn shade_ambient(&self, _rec: &HitRecord, intensity: Color) -> Color {
        self.ambient * intensity
    }

    fn reflectivity(&self) -> Option<Color> {
        (self.specular != Color::ZERO).then_some(self.specular)
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract `v` through a surface with normal `n` (pointing against `v`) by
/// Snell's law. `None` on total internal reflection.
pub fn refract(v: Vec3, n: Vec3, ni_over_nt: f64) -> Option<Vec3> {
    let uv = v.normalize();
    let dt = uv.dot(n);
    let discriminant = 1.0 - ni_over_nt * ni_over_nt * (1.0 - dt * dt);
    if discriminant > 0.0 {
        Some(ni_over_nt * (uv - n * dt) - n * discriminant.sqrt())
    } else {
        None
    }
}

/// Schlick's approximation for reflectance
#[inline]
pub fn schlick(cosine: f64, ior: f64) -> f64 {
    let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
