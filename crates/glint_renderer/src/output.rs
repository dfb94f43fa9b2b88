//! Image output (PNG and plain-text PPM).

use crate::Film;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while writing an image.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
}

pub type OutputResult<T> = Result<T, OutputError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    /// ASCII `P3` portable pixmap.
    Ppm,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Ppm => "ppm",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "ppm" => Ok(ImageFormat::Ppm),
            other => Err(OutputError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Write `film` to `dir/stem.<ext>`, creating `dir` if needed. Returns the
/// path written.
pub fn save_film(film: &Film, dir: &Path, stem: &str, format: ImageFormat) -> OutputResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{stem}.{}", format.extension()));

    match format {
        ImageFormat::Png => {
            let image = image::RgbImage::from_raw(film.width(), film.height(), film.to_rgb8())
                .ok_or_else(|| {
                    OutputError::Io(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        "framebuffer size does not match its dimensions",
                    ))
                })?;
            image.save_with_format(&path, image::ImageFormat::Png)?;
        }
        ImageFormat::Ppm => fs::write(&path, encode_ppm(film))?,
    }

    Ok(path)
}

/// Encode as ASCII PPM, one image row per line.
fn encode_ppm(film: &Film) -> String {
    let mut out = format!("P3\n{} {}\n255\n", film.width(), film.height());
    for row in film.to_rgb8().chunks(film.width().max(1) as usize * 3) {
        let line: Vec<String> = row.iter().map(u8::to_string).collect();
        // Writing to a String cannot fail
        let _ = writeln!(out, "{}", line.join(" "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("glint_output_{name}_{}", std::process::id()))
    }

    fn two_by_one() -> Film {
        let mut film = Film::new(2, 1);
        film.set(0, 0, Color::new(1.0, 0.0, 0.0));
        film.set(1, 0, Color::ONE);
        film
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("png".parse::<ImageFormat>().unwrap(), ImageFormat::Png);
        assert_eq!("PPM".parse::<ImageFormat>().unwrap(), ImageFormat::Ppm);
        assert!(matches!(
            "tga".parse::<ImageFormat>(),
            Err(OutputError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_encode_ppm() {
        assert_eq!(encode_ppm(&two_by_one()), "P3\n2 1\n255\n255 0 0 255 255 255\n");
    }

    #[test]
    fn test_save_ppm_creates_directory() {
        let dir = scratch_dir("ppm").join("nested");
        let path = save_film(&two_by_one(), &dir, "frame", ImageFormat::Ppm).unwrap();

        assert_eq!(path, dir.join("frame.ppm"));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("P3\n2 1\n255\n"));

        let _ = fs::remove_dir_all(scratch_dir("ppm"));
    }

    #[test]
    fn test_save_png_round_trips_pixels() {
        let dir = scratch_dir("png");
        let path = save_film(&two_by_one(), &dir, "frame", ImageFormat::Png).unwrap();

        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (2, 1));
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(decoded.get_pixel(1, 0).0, [255, 255, 255]);

        let _ = fs::remove_dir_all(&dir);
    }
}
