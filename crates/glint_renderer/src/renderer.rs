//! Parallel frame driver.
//!
//! A frame moves through `Idle -> Dispatching -> WorkersRunning -> Joined ->
//! Saved`. Image rows are handed to a rayon pool; each row is owned by exactly
//! one worker, which writes every pixel in it exactly once, so the film needs
//! no locking. Each row draws from its own RNG seeded from `(seed, row)`, so
//! the image does not depend on the thread count.

use crate::{
    film::linear_to_gamma, output::save_film, Background, Color, DirectLighting, Film,
    ImageFormat, Integrator, IntegratorKind, OutputError, PathTracer, Scene,
};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Samples per pixel axis; each pixel takes `samples * samples` samples
    pub samples: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Hits closer than this are ignored to avoid self-intersection
    pub t_min: f64,
    pub background: Background,
    pub integrator: IntegratorKind,
    /// Worker count; `None` uses every available core
    pub threads: Option<usize>,
    /// Base seed for the per-row random streams
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            samples: 8,
            max_depth: 50,
            t_min: 0.001,
            background: Background::Sky,
            integrator: IntegratorKind::PathTrace,
            threads: None,
            seed: 0,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }

    /// Instantiate the configured integrator.
    pub fn integrator(&self) -> Box<dyn Integrator> {
        match self.integrator {
            IntegratorKind::PathTrace => Box::new(PathTracer {
                max_depth: self.max_depth,
                t_min: self.t_min,
                background: self.background,
            }),
            IntegratorKind::DirectLighting => Box::new(DirectLighting {
                max_depth: self.max_depth,
                t_min: self.t_min,
                background: self.background,
            }),
        }
    }
}

/// Lifecycle of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Idle,
    Dispatching,
    WorkersRunning,
    Joined,
    Saved,
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("frame is {found:?}, expected {expected:?}")]
    InvalidState {
        expected: FrameState,
        found: FrameState,
    },

    #[error("failed to write image: {0}")]
    Output(#[from] OutputError),
}

/// Counters collected while rendering a frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderStats {
    pub elapsed: Duration,
    /// Camera samples traced
    pub samples: u64,
    /// Samples whose colour was NaN or infinite and replaced by black
    pub discarded: u64,
}

/// A rendered (or in-flight) frame.
#[derive(Debug)]
pub struct Frame {
    film: Film,
    state: FrameState,
    stats: RenderStats,
}

impl Frame {
    fn new(width: u32, height: u32) -> Self {
        Self {
            film: Film::new(width, height),
            state: FrameState::Idle,
            stats: RenderStats::default(),
        }
    }

    fn transition(&mut self, next: FrameState) {
        log::debug!("frame {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    pub fn film(&self) -> &Film {
        &self.film
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    /// Encode the film to `dir/stem.<ext>`. Only a joined frame can be saved.
    pub fn save(&mut self, dir: &Path, stem: &str, format: ImageFormat) -> Result<PathBuf, RenderError> {
        if self.state != FrameState::Joined {
            return Err(RenderError::InvalidState {
                expected: FrameState::Joined,
                found: self.state,
            });
        }

        let path = save_film(&self.film, dir, stem, format)?;
        self.transition(FrameState::Saved);
        log::info!("Wrote {}", path.display());
        Ok(path)
    }
}

/// Random stream for one image row.
fn row_rng(seed: u64, row: u32) -> StdRng {
    StdRng::seed_from_u64(seed ^ (row as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn shade_rows<F>(film: &mut Film, seed: u64, shade_pixel: &F)
where
    F: Fn(u32, u32, &mut dyn RngCore) -> Color + Sync,
{
    let width = film.width() as usize;
    if width == 0 {
        return;
    }

    film.pixels_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as u32;
            let mut rng = row_rng(seed, y);
            for (x, pixel) in row.iter_mut().enumerate() {
                *pixel = shade_pixel(x as u32, y, &mut rng);
            }
        });
}

/// Fill every pixel of `film` with `shade_pixel(x, y, rng)`, in parallel by
/// row. Blocks until all workers have finished.
///
/// `threads: None` runs on rayon's global pool; `Some(n)` builds a dedicated
/// pool of `n` workers for this call.
pub fn dispatch_rows<F>(
    film: &mut Film,
    threads: Option<usize>,
    seed: u64,
    shade_pixel: F,
) -> Result<(), RenderError>
where
    F: Fn(u32, u32, &mut dyn RngCore) -> Color + Sync,
{
    match threads {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
            pool.install(|| shade_rows(film, seed, &shade_pixel));
        }
        None => shade_rows(film, seed, &shade_pixel),
    }
    Ok(())
}

/// Render one pixel with `ns * ns` stratified samples.
///
/// `pixel` counts rows from the top of the image; film `v` runs upward. With
/// `ns == 1` the single sample is taken at the pixel centre. Returns the
/// gamma-corrected average and the number of non-finite samples dropped.
pub fn render_pixel(
    scene: &Scene,
    integrator: &dyn Integrator,
    (width, height): (u32, u32),
    (x, y): (u32, u32),
    ns: u32,
    rng: &mut dyn RngCore,
) -> (Color, u64) {
    let ns = ns.max(1);
    let camera = scene.camera();
    let j = height - 1 - y;
    let mut pixel_color = Color::ZERO;
    let mut discarded = 0;

    for sy in 0..ns {
        for sx in 0..ns {
            let (du, dv) = if ns == 1 {
                (0.5, 0.5)
            } else {
                (
                    (sx as f64 + crate::sampling::gen_f64(rng)) / ns as f64,
                    (sy as f64 + crate::sampling::gen_f64(rng)) / ns as f64,
                )
            };
            let u = (x as f64 + du) / width as f64;
            let v = (j as f64 + dv) / height as f64;

            let ray = camera.get_ray(u, v, rng);
            let sample = integrator.shade(&ray, scene, 0, rng);
            if sample.is_finite() {
                pixel_color += sample;
            } else {
                discarded += 1;
            }
        }
    }

    let c = pixel_color / (ns as f64 * ns as f64);
    (
        Color::new(linear_to_gamma(c.x), linear_to_gamma(c.y), linear_to_gamma(c.z)),
        discarded,
    )
}

/// Render `scene` with `config` and return the joined frame.
pub fn render(scene: &Scene, config: &RenderConfig) -> Result<Frame, RenderError> {
    let (width, height) = (config.width, config.height);
    let ns = config.samples.max(1);
    let samples_per_pixel = ns as u64 * ns as u64;
    let mut frame = Frame::new(width, height);

    frame.transition(FrameState::Dispatching);
    match scene.primitive_count() {
        Some(count) => log::info!(
            "Rendering {}x{}: {} primitives, {} lights",
            width,
            height,
            count,
            scene.lights().len()
        ),
        None => log::info!("Rendering {}x{}: {} lights", width, height, scene.lights().len()),
    }
    let integrator = config.integrator();
    let discarded = AtomicU64::new(0);
    let start = Instant::now();

    frame.transition(FrameState::WorkersRunning);
    dispatch_rows(&mut frame.film, config.threads, config.seed, |x, y, rng| {
        let (color, dropped) =
            render_pixel(scene, integrator.as_ref(), (width, height), (x, y), ns, rng);
        if dropped > 0 {
            discarded.fetch_add(dropped, Ordering::Relaxed);
        }
        color
    })?;
    frame.transition(FrameState::Joined);

    frame.stats = RenderStats {
        elapsed: start.elapsed(),
        samples: width as u64 * height as u64 * samples_per_pixel,
        discarded: discarded.into_inner(),
    };

    let secs = frame.stats.elapsed.as_secs_f64();
    log::info!(
        "Rendered {}x{} at {} samples/pixel in {:.2?} ({:.0} samples/s)",
        width,
        height,
        samples_per_pixel,
        frame.stats.elapsed,
        if secs > 0.0 { frame.stats.samples as f64 / secs } else { 0.0 }
    );
    if frame.stats.discarded > 0 {
        log::warn!(
            "{} non-finite samples replaced with black",
            frame.stats.discarded
        );
    }

    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Camera, HittableList, Lambertian, Ray, Sphere, Vec3};
    use std::sync::Arc;

    /// Maps the ray direction into `[0, 1]^3`.
    struct DirectionProbe;

    impl Integrator for DirectionProbe {
        fn shade(&self, ray: &Ray, _scene: &Scene, _depth: u32, _rng: &mut dyn RngCore) -> Color {
            (ray.direction().normalize() + Vec3::ONE) * 0.5
        }
    }

    struct NotANumber;

    impl Integrator for NotANumber {
        fn shade(&self, _ray: &Ray, _scene: &Scene, _depth: u32, _rng: &mut dyn RngCore) -> Color {
            Color::splat(f64::NAN)
        }
    }

    fn empty_scene() -> Scene {
        let mut camera = Camera::new()
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0);
        camera.initialize();
        Scene::new(Box::new(HittableList::new()), camera, vec![])
    }

    fn sphere_scene() -> Scene {
        let mut list = HittableList::new();
        list.add(Sphere::new(
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            Arc::new(Lambertian::solid(Color::splat(0.5))),
        ));
        let mut camera = Camera::new()
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(60.0, 0.0, 1.0)
            .with_aspect_ratio(1.5);
        camera.initialize();
        Scene::from_list(list, camera, vec![], true).unwrap()
    }

    fn small_config(threads: usize) -> RenderConfig {
        RenderConfig {
            width: 12,
            height: 8,
            samples: 2,
            max_depth: 8,
            threads: Some(threads),
            seed: 11,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = RenderConfig::default();
        assert_eq!((config.width, config.height), (500, 500));
        assert_eq!(config.samples, 8);
        assert_eq!(config.max_depth, 50);
        assert_eq!(config.t_min, 0.001);
        assert_eq!(config.background, Background::Sky);
        assert_eq!(config.integrator, IntegratorKind::PathTrace);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: RenderConfig = serde_json::from_str(
            r#"{ "width": 64, "integrator": "direct_lighting", "background": { "solid": [0.0, 0.0, 0.0] } }"#,
        )
        .unwrap();

        assert_eq!(config.width, 64);
        assert_eq!(config.height, 500);
        assert_eq!(config.integrator, IntegratorKind::DirectLighting);
        assert_eq!(config.background, Background::Solid(Color::ZERO));
    }

    #[test]
    fn test_single_sample_hits_pixel_centre() {
        let scene = empty_scene();
        let mut rng_a = StdRng::seed_from_u64(1);
        let mut rng_b = StdRng::seed_from_u64(2);

        let (a, _) = render_pixel(&scene, &DirectionProbe, (2, 2), (0, 0), 1, &mut rng_a);
        let (b, _) = render_pixel(&scene, &DirectionProbe, (2, 2), (0, 0), 1, &mut rng_b);
        assert_eq!(a, b);

        // Top-left pixel of a 2x2 image is centred at film (0.25, 0.75)
        let ray = scene.camera().get_ray(0.25, 0.75, &mut rng_a);
        let linear = DirectionProbe.shade(&ray, &scene, 0, &mut rng_a);
        let expected = Color::new(
            linear_to_gamma(linear.x),
            linear_to_gamma(linear.y),
            linear_to_gamma(linear.z),
        );
        assert!((a - expected).length() < 1e-12);
    }

    #[test]
    fn test_non_finite_samples_are_dropped() {
        let scene = empty_scene();
        let mut rng = StdRng::seed_from_u64(1);

        let (color, discarded) = render_pixel(&scene, &NotANumber, (4, 4), (1, 1), 3, &mut rng);
        assert_eq!(color, Color::ZERO);
        assert_eq!(discarded, 9);
    }

    #[test]
    fn test_render_reaches_joined() {
        let scene = sphere_scene();
        let frame = render(&scene, &small_config(2)).unwrap();

        assert_eq!(frame.state(), FrameState::Joined);
        assert_eq!(frame.stats().samples, 12 * 8 * 4);
        assert_eq!(frame.stats().discarded, 0);
        // Centre pixel sees the sphere, which is darker than the sky
        let centre = frame.film().get(6, 4);
        assert!(centre.x < 1.0 && centre.x > 0.0);
    }

    #[test]
    fn test_image_independent_of_thread_count() {
        let scene = sphere_scene();
        let one = render(&scene, &small_config(1)).unwrap();
        let four = render(&scene, &small_config(4)).unwrap();

        assert_eq!(one.film(), four.film());
    }

    #[test]
    fn test_save_requires_joined_frame() {
        let mut frame = Frame::new(2, 2);
        let dir = std::env::temp_dir().join(format!("glint_unjoined_{}", std::process::id()));

        let result = frame.save(&dir, "frame", ImageFormat::Ppm);
        assert!(matches!(
            result,
            Err(RenderError::InvalidState {
                expected: FrameState::Joined,
                found: FrameState::Idle
            })
        ));
        assert!(!dir.exists());
    }

    #[test]
    fn test_save_moves_to_saved() {
        let scene = sphere_scene();
        let mut frame = render(&scene, &small_config(2)).unwrap();
        let dir = std::env::temp_dir().join(format!("glint_saved_{}", std::process::id()));

        let path = frame.save(&dir, "frame", ImageFormat::Ppm).unwrap();
        assert!(path.exists());
        assert_eq!(frame.state(), FrameState::Saved);

        // A saved frame cannot be saved again
        assert!(frame.save(&dir, "frame", ImageFormat::Ppm).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
