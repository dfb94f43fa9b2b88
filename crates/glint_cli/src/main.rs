//! `glint` - render a built-in scene to an image file.

mod scenes;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use glint_renderer::{render, Camera, ImageFormat, IntegratorKind, RenderConfig, Scene};
use rand::rngs::StdRng;
use rand::SeedableRng;
use scenes::ScenePreset;
use std::path::{Path, PathBuf};

/// Keeps `samples * samples` within a `u32`.
const MAX_SAMPLES: u32 = u16::MAX as u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Png,
    Ppm,
}

impl From<Format> for ImageFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Png => ImageFormat::Png,
            Format::Ppm => ImageFormat::Ppm,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "glint", version, about = "Monte Carlo path tracer")]
struct Args {
    /// Image width in pixels
    #[arg(short = 'x', long)]
    width: Option<u32>,

    /// Image height in pixels
    #[arg(short = 'y', long)]
    height: Option<u32>,

    /// Samples per pixel axis; each pixel takes samples^2 samples
    #[arg(long, visible_alias = "aa")]
    samples: Option<u32>,

    /// Scene to render
    #[arg(long, value_enum, default_value_t = ScenePreset::RandomSpheres)]
    scene: ScenePreset,

    /// Output file name, without extension
    #[arg(short, long, default_value = "output")]
    output: String,

    #[arg(long, value_enum, default_value_t = Format::Png)]
    format: Format,

    /// Directory the image is written to (created if missing)
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,

    /// Worker threads (defaults to all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Seed for scene generation and sampling
    #[arg(long)]
    seed: Option<u64>,

    /// JSON render settings; flags given on the command line win
    #[arg(long)]
    config: Option<PathBuf>,

    /// Spread ray times over the shutter to blur moving objects
    #[arg(long)]
    blur: bool,

    /// Vertical field of view in degrees
    #[arg(long)]
    vfov: Option<f64>,

    /// Lens aperture; 0 is a pinhole
    #[arg(long)]
    aperture: Option<f64>,

    /// Distance to the plane of perfect focus
    #[arg(long)]
    focus_dist: Option<f64>,

    /// Intersect against a flat list instead of building a BVH
    #[arg(long)]
    flat: bool,

    /// Use the direct-lighting integrator
    #[arg(long)]
    direct: bool,
}

fn load_config(path: &Path) -> Result<RenderConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse config {}", path.display()))
}

/// Config file (or the preset's defaults without one), then flag overrides.
fn resolve_config(args: &Args, preset_defaults: &scenes::SceneDescription) -> Result<RenderConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => RenderConfig {
            background: preset_defaults.background,
            integrator: preset_defaults.integrator,
            ..RenderConfig::default()
        },
    };

    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(samples) = args.samples {
        config.samples = samples;
    }
    if let Some(threads) = args.threads {
        config.threads = Some(threads);
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.direct {
        config.integrator = IntegratorKind::DirectLighting;
    }

    anyhow::ensure!(
        config.width > 0 && config.height > 0,
        "Image dimensions must be positive, got {}x{}",
        config.width,
        config.height
    );
    anyhow::ensure!(
        config.samples <= MAX_SAMPLES,
        "Samples per axis must be at most {MAX_SAMPLES}, got {}",
        config.samples
    );
    Ok(config)
}

/// `(vfov, aperture, focus_dist)`: the preset's lens with flag overrides.
fn resolve_lens(args: &Args, view: &scenes::View) -> Result<(f64, f64, f64)> {
    let vfov = args.vfov.unwrap_or(view.vfov);
    let aperture = args.aperture.unwrap_or(view.aperture);
    let focus_dist = args.focus_dist.unwrap_or(view.focus_dist);

    anyhow::ensure!(
        vfov > 0.0 && vfov < 180.0,
        "Field of view must be between 0 and 180 degrees, got {vfov}"
    );
    anyhow::ensure!(aperture >= 0.0, "Aperture must not be negative, got {aperture}");
    anyhow::ensure!(focus_dist > 0.0, "Focus distance must be positive, got {focus_dist}");
    Ok((vfov, aperture, focus_dist))
}

fn run(args: Args) -> Result<()> {
    let seed = args.seed.unwrap_or_default();
    let description = args.scene.build(&mut StdRng::seed_from_u64(seed));
    let config = resolve_config(&args, &description)?;

    let view = description.view;
    let (vfov, aperture, focus_dist) = resolve_lens(&args, &view)?;
    let mut camera = Camera::new()
        .with_position(view.look_from, view.look_at, view.vup)
        .with_lens(vfov, aperture, focus_dist)
        .with_aspect_ratio(config.aspect_ratio())
        .with_shutter(0.0, 1.0)
        .with_motion_blur(args.blur);
    camera.initialize();

    log::info!("Scene {:?} with the {:?} integrator", args.scene, config.integrator);

    let scene = Scene::from_list(description.objects, camera, description.lights, !args.flat)
        .context("Failed to build scene")?;

    let mut frame = render(&scene, &config).context("Render failed")?;
    frame
        .save(&args.out_dir, &args.output, args.format.into())
        .context("Failed to save image")?;

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Starting glint");

    if let Err(err) = run(args) {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_aliases() {
        let args = Args::try_parse_from([
            "glint", "-x", "64", "-y", "32", "--aa", "2", "--scene", "phong-lights", "--format",
            "ppm", "--flat",
        ])
        .unwrap();

        assert_eq!(args.width, Some(64));
        assert_eq!(args.height, Some(32));
        assert_eq!(args.samples, Some(2));
        assert_eq!(args.scene, ScenePreset::PhongLights);
        assert_eq!(args.format, Format::Ppm);
        assert!(args.flat);
        assert_eq!(args.out_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_flags_override_preset_defaults() {
        let args = Args::try_parse_from(["glint", "--scene", "phong-lights", "--samples", "3"]).unwrap();
        let description = scenes::phong_lights();

        let config = resolve_config(&args, &description).unwrap();
        assert_eq!(config.samples, 3);
        assert_eq!(config.integrator, IntegratorKind::DirectLighting);
        assert_eq!(config.width, 500);
    }

    #[test]
    fn test_config_file_then_flags() {
        let path = std::env::temp_dir().join(format!("glint_cli_config_{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "width": 40, "height": 30, "seed": 5 }"#).unwrap();

        let config_path = path.to_str().unwrap();
        let args = Args::try_parse_from([
            "glint",
            "--config",
            config_path,
            "--height",
            "20",
            "--direct",
        ])
        .unwrap();
        let config = resolve_config(&args, &scenes::lit_rectangles()).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!((config.width, config.height), (40, 20));
        assert_eq!(config.seed, 5);
        assert_eq!(config.integrator, IntegratorKind::DirectLighting);
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let args = Args::try_parse_from(["glint", "--width", "0"]).unwrap();
        assert!(resolve_config(&args, &scenes::lit_rectangles()).is_err());
    }

    #[test]
    fn test_sample_count_is_bounded() {
        let args = Args::try_parse_from(["glint", "--samples", "65535"]).unwrap();
        assert!(resolve_config(&args, &scenes::lit_rectangles()).is_ok());

        let args = Args::try_parse_from(["glint", "--samples", "65536"]).unwrap();
        assert!(resolve_config(&args, &scenes::lit_rectangles()).is_err());
    }

    #[test]
    fn test_lens_overrides_and_validation() {
        let view = scenes::lit_rectangles().view;

        let args = Args::try_parse_from(["glint", "--vfov", "40", "--aperture", "0.5"]).unwrap();
        assert_eq!(resolve_lens(&args, &view).unwrap(), (40.0, 0.5, view.focus_dist));

        for bad in ["--vfov=0", "--vfov=180", "--focus-dist=0", "--aperture=-1"] {
            let args = Args::try_parse_from(["glint", bad]).unwrap();
            assert!(resolve_lens(&args, &view).is_err(), "{bad:?}");
        }
    }
}
