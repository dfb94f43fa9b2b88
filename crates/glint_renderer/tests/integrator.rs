//! Recursion truncation and Fresnel convergence.

use glint_renderer::{
    reflect, schlick, Background, Camera, Color, Dielectric, HitRecord, HittableList, Integrator,
    Material, PathTracer, Ray, Rect, ScatterRecord, Scene, Vec3,
};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Perfect mirror that counts how often it is asked to scatter.
struct CountingMirror {
    calls: Arc<AtomicUsize>,
}

impl Material for CountingMirror {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let normal = rec.facing_normal(ray_in);
        Some(ScatterRecord {
            attenuation: Color::splat(0.5),
            scattered: Ray::new(rec.p, reflect(ray_in.direction(), normal), ray_in.time()),
        })
    }

    fn emitted(&self, _u: f64, _v: f64, _p: Vec3) -> Color {
        Color::splat(1.0)
    }
}

/// Two facing mirrors; a ray fired between them never escapes.
fn hall_of_mirrors(calls: &Arc<AtomicUsize>) -> Scene {
    let material: Arc<dyn Material> = Arc::new(CountingMirror {
        calls: calls.clone(),
    });
    let mut list = HittableList::new();
    list.add(Rect::xy((-5.0, 5.0), (-5.0, 5.0), 0.0, material.clone()));
    list.add(Rect::xy((-5.0, 5.0), (-5.0, 5.0), -1.0, material));
    Scene::from_list(list, Camera::new(), vec![], true).unwrap()
}

#[test]
fn recursion_stops_at_max_depth() {
    for max_depth in [0, 1, 5, 50] {
        let calls = Arc::new(AtomicUsize::new(0));
        let scene = hall_of_mirrors(&calls);
        let tracer = PathTracer {
            max_depth,
            t_min: 0.001,
            background: Background::Sky,
        };
        let mut rng = StdRng::seed_from_u64(0);

        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, -0.5), Vec3::new(0.0, 0.0, -1.0));
        let color = tracer.shade(&ray, &scene, 0, &mut rng);

        assert_eq!(calls.load(Ordering::SeqCst), max_depth as usize);

        // emit + 0.5 * (emit + 0.5 * (...)) over max_depth + 1 surfaces
        let expected = (0..=max_depth).map(|k| 0.5f64.powi(k as i32)).sum::<f64>();
        assert!((color.x - expected).abs() < 1e-9, "depth {max_depth}: {color}");
    }
}

#[test]
fn shade_at_max_depth_returns_emission_only() {
    let calls = Arc::new(AtomicUsize::new(0));
    let scene = hall_of_mirrors(&calls);
    let tracer = PathTracer {
        max_depth: 10,
        t_min: 0.001,
        background: Background::Sky,
    };
    let mut rng = StdRng::seed_from_u64(0);

    let ray = Ray::new_simple(Vec3::new(0.0, 0.0, -0.5), Vec3::new(0.0, 0.0, 1.0));
    assert_eq!(tracer.shade(&ray, &scene, 10, &mut rng), Color::ONE);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

fn surface(material: &dyn Material) -> HitRecord<'_> {
    HitRecord {
        t: 1.0,
        u: 0.0,
        v: 0.0,
        p: Vec3::ZERO,
        normal: Vec3::Y,
        material,
    }
}

/// Fraction of scattered rays that come back out on the incident side.
fn reflected_fraction(ray: &Ray, samples: usize, seed: u64) -> f64 {
    let glass = Dielectric::new(1.5);
    let rec = surface(&glass);
    let incident_side = -ray.direction().y.signum();
    let mut rng = StdRng::seed_from_u64(seed);

    let reflected = (0..samples)
        .filter(|_| {
            let s = glass.scatter(ray, &rec, &mut rng).unwrap();
            s.scattered.direction().y * incident_side > 0.0
        })
        .count();
    reflected as f64 / samples as f64
}

#[test]
fn dielectric_split_converges_to_schlick() {
    // Entering at 60 degrees from the normal: cos = 0.5
    let angle = 60f64.to_radians();
    let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(angle.sin(), -angle.cos(), 0.0));

    let expected = schlick(0.5, 1.5);
    let fraction = reflected_fraction(&ray, 200_000, 17);
    assert!(
        (fraction - expected).abs() < 0.005,
        "reflected {fraction}, expected {expected}"
    );
}

#[test]
fn dielectric_split_matches_reflect_probability_at_many_angles() {
    let glass = Dielectric::new(1.5);
    let rec = surface(&glass);

    for degrees in [0.0f64, 20.0, 45.0, 75.0, 85.0] {
        let angle = degrees.to_radians();
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(angle.sin(), -angle.cos(), 0.0));

        let expected = glass.reflect_probability(&ray, &rec);
        let fraction = reflected_fraction(&ray, 100_000, 23);
        assert!(
            (fraction - expected).abs() < 0.01,
            "{degrees} deg: reflected {fraction}, expected {expected}"
        );
    }
}

#[test]
fn dielectric_total_internal_reflection_always_reflects() {
    // Leaving the glass at 60 degrees: beyond the critical angle of ~41.8
    let angle = 60f64.to_radians();
    let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(angle.sin(), angle.cos(), 0.0));

    assert_eq!(reflected_fraction(&ray, 1000, 5), 1.0);
}
