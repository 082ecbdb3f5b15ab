//! Contains the high level pipeline builder API and the plain entry points built on it.

mod palette_pipeline;

pub use palette_pipeline::PalettePipeline;

use crate::{ImageInput, PaletteSize, Result};
use std::path::Path;

/// Runs the default pipeline, validating `palette_size` before touching the input.
fn dominant_palette(input: ImageInput<'_>, palette_size: usize) -> Result<Vec<u32>> {
    let k = PaletteSize::try_from(palette_size)?;
    let pipeline = PalettePipeline::new();

    #[cfg(feature = "threads")]
    let palette = pipeline.palette_par(input, k)?;
    #[cfg(not(feature = "threads"))]
    let palette = pipeline.palette(input, k)?;

    tracing::debug!(len = palette.len(), "Computed dominant palette");

    Ok(palette.packed())
}

/// Computes the dominant palette of the image file at `path`.
///
/// Returns at most `palette_size` colors packed as `0xRRGGBB`, most dominant first.
///
/// # Errors
/// - [`Error::InvalidArgument`](crate::Error::InvalidArgument) if `palette_size` is `0`.
/// - [`Error::Io`](crate::Error::Io) if the file cannot be read.
/// - [`Error::Decode`](crate::Error::Decode) if the file is not a supported image.
/// - [`Error::EmptyImage`](crate::Error::EmptyImage) if the image has no pixels.
pub fn get_dominant_palette_from_image_path(
    path: impl AsRef<Path>,
    palette_size: usize,
) -> Result<Vec<u32>> {
    dominant_palette(ImageInput::Path(path.as_ref()), palette_size)
}

/// Computes the dominant palette of the encoded image in `bytes`.
///
/// Returns at most `palette_size` colors packed as `0xRRGGBB`, most dominant first.
///
/// # Errors
/// - [`Error::InvalidArgument`](crate::Error::InvalidArgument) if `palette_size` is `0`.
/// - [`Error::Decode`](crate::Error::Decode) if the bytes are not a supported image.
/// - [`Error::EmptyImage`](crate::Error::EmptyImage) if the image has no pixels.
pub fn get_dominant_palette_from_image_bytes(
    bytes: &[u8],
    palette_size: usize,
) -> Result<Vec<u32>> {
    dominant_palette(ImageInput::Bytes(bytes), palette_size)
}
