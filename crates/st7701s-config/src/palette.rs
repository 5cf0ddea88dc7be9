//! Palette generation for the 8-bit indexed color modes.

use crate::panel::PaletteMode;
use crate::quantize::median_cut;
use crate::{ConfigError, Result};
use image::{DynamicImage, Rgb, RgbImage};
use st7701s_driver::{Palette, PALETTE_ENTRIES};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Side length in pixels of one swatch in a palette preview.
const SWATCH_SIZE: u32 = 8;

/// Builds the palette for `mode`, or `None` for direct color.
///
/// Relative image paths resolve against `base_dir`.
pub fn generate(mode: &PaletteMode, base_dir: &Path) -> Result<Option<Palette>> {
    match mode {
        PaletteMode::None => Ok(None),
        PaletteMode::Grayscale => grayscale().map(Some),
        PaletteMode::ImageAdaptive { images } => {
            let images = load_images(images, base_dir)?;
            adaptive(&images).map(Some)
        }
    }
}

/// A 256-step grey ramp: entry i is (i, i, i).
pub fn grayscale() -> Result<Palette> {
    let entries: Vec<[u8; 3]> = (0..=255u8).map(|i| [i, i, i]).collect();
    to_palette(&entries)
}

/// Opens every image, failing on the first that cannot be read or decoded.
pub fn load_images(paths: &[PathBuf], base_dir: &Path) -> Result<Vec<DynamicImage>> {
    paths
        .iter()
        .map(|path| {
            let path = if path.is_relative() {
                base_dir.join(path)
            } else {
                path.clone()
            };
            let image = image::open(&path).map_err(|source| ConfigError::ImageLoad {
                path: path.clone(),
                source,
            })?;
            debug!(
                "Loaded palette image {} ({}x{})",
                path.display(),
                image.width(),
                image.height()
            );
            Ok(image)
        })
        .collect()
}

/// Lays images out left to right on a black RGB canvas as wide as all of
/// them and as tall as the tallest.
pub fn compose(images: &[DynamicImage]) -> Result<RgbImage> {
    let (total_width, max_height) =
        canvas_size(images.iter().map(|i| (i.width(), i.height())))?;

    let mut canvas = RgbImage::new(total_width, max_height);
    let mut x = 0i64;
    for image in images {
        image::imageops::replace(&mut canvas, &image.to_rgb8(), x, 0);
        x += i64::from(image.width());
    }
    Ok(canvas)
}

/// Size of the composite canvas for images of the given sizes.
fn canvas_size(sizes: impl IntoIterator<Item = (u32, u32)>) -> Result<(u32, u32)> {
    sizes
        .into_iter()
        .try_fold((0u32, 0u32), |(width, height), (w, h)| {
            width
                .checked_add(w)
                .map(|width| (width, height.max(h)))
                .ok_or_else(|| {
                    ConfigError::InvalidDimensions(
                        "palette images are too wide to compose".to_string(),
                    )
                })
        })
}

/// Quantizes the composite of `images` to a 256-entry adaptive palette.
pub fn adaptive(images: &[DynamicImage]) -> Result<Palette> {
    if images.is_empty() {
        return Err(ConfigError::AdaptivePaletteWithoutImages);
    }
    let reference = compose(images)?;
    let mut entries = median_cut(reference.pixels().map(|p| p.0), PALETTE_ENTRIES);
    info!(
        "Reduced {}x{} reference image to {} colors",
        reference.width(),
        reference.height(),
        entries.len()
    );
    if entries.len() < PALETTE_ENTRIES {
        entries.resize(PALETTE_ENTRIES, [0, 0, 0]);
    }
    to_palette(&entries)
}

/// Renders the palette as a 16x16 grid of swatches, index 0 at top left.
pub fn preview(palette: &Palette) -> RgbImage {
    let side = 16 * SWATCH_SIZE;
    RgbImage::from_fn(side, side, |x, y| {
        let index = (y / SWATCH_SIZE) * 16 + x / SWATCH_SIZE;
        Rgb(palette.entry(index as u8))
    })
}

fn to_palette(entries: &[[u8; 3]]) -> Result<Palette> {
    Palette::from_entries(entries).map_err(|_| ConfigError::PaletteSize {
        actual: entries.len() * 3,
    })
}
