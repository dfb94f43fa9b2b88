//! Built-in scenes.

use clap::ValueEnum;
use glint_renderer::{
    Background, BlinnPhong, Color, Dielectric, DiffuseLight, HittableList, IntegratorKind,
    Lambertian, Light, Material, Metal, MovingSphere, Rect, Sphere, Texture, Triangle, Vec3,
};
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScenePreset {
    /// Ground plane covered in small random spheres, plus three large ones
    RandomSpheres,
    /// Spheres lit only by emissive rectangles
    LitRectangles,
    /// Blinn-Phong surfaces under ambient, directional and point lights
    PhongLights,
}

/// Where the camera sits and how its lens is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,
    pub vfov: f64,
    pub aperture: f64,
    pub focus_dist: f64,
}

/// Everything a preset contributes to a render.
pub struct SceneDescription {
    pub objects: HittableList,
    pub lights: Vec<Light>,
    pub view: View,
    pub background: Background,
    pub integrator: IntegratorKind,
}

impl ScenePreset {
    pub fn build(self, rng: &mut StdRng) -> SceneDescription {
        match self {
            ScenePreset::RandomSpheres => random_spheres(rng),
            ScenePreset::LitRectangles => lit_rectangles(),
            ScenePreset::PhongLights => phong_lights(),
        }
    }
}

fn random_color(rng: &mut StdRng) -> Color {
    Color::new(
        rng.gen::<f64>() * rng.gen::<f64>(),
        rng.gen::<f64>() * rng.gen::<f64>(),
        rng.gen::<f64>() * rng.gen::<f64>(),
    )
}

/// The closing scene of "Ray Tracing in One Weekend", with half of the
/// diffuse spheres bouncing upward during the shutter.
pub fn random_spheres(rng: &mut StdRng) -> SceneDescription {
    let mut objects = HittableList::with_capacity(500);

    objects.add(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::solid(Color::splat(0.5))),
    ));

    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = rng.gen::<f64>();
            let center = Vec3::new(
                a as f64 + 0.9 * rng.gen::<f64>(),
                0.2,
                b as f64 + 0.9 * rng.gen::<f64>(),
            );

            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                let material = Arc::new(Lambertian::solid(random_color(rng)));
                if rng.gen::<f64>() < 0.5 {
                    let rise = Vec3::new(0.0, 0.5 * (1.0 + rng.gen::<f64>()), 0.0);
                    objects.add(MovingSphere::new(center, center + rise, 0.0, 1.0, 0.2, material));
                } else {
                    objects.add(Sphere::new(center, 0.2, material));
                }
            } else if choose_mat < 0.95 {
                let albedo = Color::new(
                    0.5 * (1.0 + rng.gen::<f64>()),
                    0.5 * (1.0 + rng.gen::<f64>()),
                    0.5 * (1.0 + rng.gen::<f64>()),
                );
                let fuzz = 0.5 * rng.gen::<f64>();
                objects.add(Sphere::new(center, 0.2, Arc::new(Metal::new(albedo, fuzz))));
            } else {
                objects.add(Sphere::new(center, 0.2, glass.clone()));
            }
        }
    }

    objects.add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, glass));
    objects.add(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Lambertian::solid(Color::new(0.4, 0.2, 0.1))),
    ));
    objects.add(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    ));

    SceneDescription {
        objects,
        lights: Vec::new(),
        view: View {
            look_from: Vec3::new(13.0, 2.0, 3.0),
            look_at: Vec3::ZERO,
            vup: Vec3::Y,
            vfov: 20.0,
            aperture: 0.1,
            focus_dist: 10.0,
        },
        background: Background::Sky,
        integrator: IntegratorKind::PathTrace,
    }
}

/// Checkered ground and two spheres in the dark, lit by a wall panel and a
/// ceiling panel.
pub fn lit_rectangles() -> SceneDescription {
    let mut objects = HittableList::new();

    let checker = Texture::checker(Color::new(0.2, 0.3, 0.1), Color::splat(0.9));
    objects.add(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::new(checker)),
    ));
    objects.add(Sphere::new(
        Vec3::new(0.0, 2.0, 0.0),
        2.0,
        Arc::new(Lambertian::solid(Color::new(0.7, 0.3, 0.3))),
    ));
    objects.add(Sphere::new(
        Vec3::new(-3.5, 1.0, 1.5),
        1.0,
        Arc::new(Metal::new(Color::new(0.8, 0.8, 0.9), 0.05)),
    ));

    let panel: Arc<dyn Material> = Arc::new(DiffuseLight::solid(Color::splat(4.0)));
    objects.add(Rect::xy((3.0, 5.0), (1.0, 3.0), -2.0, panel.clone()));
    objects.add(Rect::xz((-1.0, 1.0), (-1.0, 1.0), 7.0, panel));

    SceneDescription {
        objects,
        lights: Vec::new(),
        view: View {
            look_from: Vec3::new(26.0, 3.0, 6.0),
            look_at: Vec3::new(0.0, 2.0, 0.0),
            vup: Vec3::Y,
            vfov: 20.0,
            aperture: 0.0,
            focus_dist: 10.0,
        },
        background: Background::Solid(Color::ZERO),
        integrator: IntegratorKind::PathTrace,
    }
}

/// Local-illumination test scene for the direct-lighting integrator.
pub fn phong_lights() -> SceneDescription {
    let mut objects = HittableList::new();

    let red: Arc<dyn Material> = Arc::new(BlinnPhong::new(
        Color::new(0.2, 0.05, 0.05),
        Color::new(0.8, 0.2, 0.2),
        Color::splat(0.3),
        32.0,
    ));
    let matte: Arc<dyn Material> = Arc::new(BlinnPhong::new(
        Color::splat(0.1),
        Color::new(0.5, 0.7, 1.0),
        Color::ZERO,
        1.0,
    ));
    let floor: Arc<dyn Material> = Arc::new(BlinnPhong::new(
        Color::splat(0.1),
        Color::splat(0.6),
        Color::ZERO,
        1.0,
    ));

    objects.add(Sphere::new(Vec3::new(-0.4, 0.0, 0.0), 0.6, red));
    objects.add(Sphere::new(
        Vec3::new(0.8, -0.25, 0.6),
        0.35,
        Arc::new(Metal::new(Color::splat(0.8), 0.0)),
    ));
    objects.add(Triangle::new(
        Vec3::new(-1.6, -0.6, -1.0),
        Vec3::new(1.6, -0.6, -1.0),
        Vec3::new(0.0, 1.6, -1.5),
        matte,
    ));
    objects.add(Rect::xz((-3.0, 3.0), (-3.0, 3.0), -0.6, floor));

    SceneDescription {
        objects,
        lights: vec![
            Light::ambient(Color::splat(0.3)),
            Light::directional(Vec3::new(-1.0, -1.0, -1.0), Color::splat(0.6)),
            Light::point(Vec3::new(2.0, 3.0, 3.0), Color::splat(10.0), 2),
        ],
        view: View {
            look_from: Vec3::new(0.0, 0.5, 10.0),
            look_at: Vec3::ZERO,
            vup: Vec3::Y,
            vfov: 20.0,
            aperture: 0.0,
            focus_dist: 10.0,
        },
        background: Background::Solid(Color::splat(0.05)),
        integrator: IntegratorKind::DirectLighting,
    }
}
