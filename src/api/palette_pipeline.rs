//! Contains the [`PalettePipeline`] builder struct for the high level API.

use crate::{
    median_cut, ranker, BucketBits, DecoderConfig, Histogram, ImageInput, Palette, PaletteSize,
    PixelBuffer, PixelSource, Result,
};

/// A builder struct to specify options for extracting a dominant palette from an image.
///
/// The pipeline runs four stages in sequence:
/// the image is loaded into a [`PixelBuffer`], binned into a [`Histogram`],
/// clustered by [median cut](crate::median_cut), and finally [ranked](crate::ranker::rank).
///
/// # Examples
/// ```no_run
/// # use domcol::{PalettePipeline, PaletteSize, DecoderConfig, AlphaMode, ImageInput};
/// # use std::path::Path;
/// # fn main() -> domcol::Result<()> {
/// let pipeline = PalettePipeline::new()
///     .decoder(DecoderConfig::new().alpha(AlphaMode::SkipTranslucent));
///
/// let palette = pipeline.palette(ImageInput::Path(Path::new("cover.jpg")), PaletteSize::try_from(5)?)?;
/// println!("{palette}");
/// # Ok(())
/// # }
/// ```
///
/// Or, in parallel across multiple threads (needs the `threads` feature):
/// ```no_run
/// # use domcol::{PalettePipeline, PaletteSize};
/// # fn main() -> domcol::Result<()> {
/// # let bytes: &[u8] = &[];
/// let palette = PalettePipeline::new().palette_par(bytes, PaletteSize::try_from(5)?)?;
/// # Ok(())
/// # }
/// ```
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct PalettePipeline {
    /// Loads the input image.
    source: PixelSource,
    /// The histogram depth.
    bucket_bits: BucketBits,
}

impl PalettePipeline {
    /// Creates a new [`PalettePipeline`] with default decoder options and histogram depth.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the options used to decode the input image.
    pub fn decoder(mut self, config: DecoderConfig) -> Self {
        self.source = PixelSource::new(config);
        self
    }

    /// Sets the number of bits per channel kept in the histogram.
    ///
    /// The default is [`BucketBits::DEFAULT`].
    pub fn bucket_bits(mut self, bits: BucketBits) -> Self {
        self.bucket_bits = bits;
        self
    }

    /// Computes the dominant palette of the input image.
    ///
    /// # Errors
    /// Returns any error from [`PixelSource::load`].
    pub fn palette<'a>(&self, input: impl Into<ImageInput<'a>>, k: PaletteSize) -> Result<Palette> {
        let hist = {
            let buffer = self.source.load(input.into())?;
            Histogram::build(&buffer, self.bucket_bits)
        };
        Ok(quantize(&hist, k))
    }

    /// Computes the dominant palette of an already loaded [`PixelBuffer`].
    #[must_use]
    pub fn palette_from_buffer(&self, buffer: &PixelBuffer, k: PaletteSize) -> Palette {
        quantize(&Histogram::build(buffer, self.bucket_bits), k)
    }
}

#[cfg(feature = "threads")]
impl PalettePipeline {
    /// Computes the dominant palette of the input image,
    /// building the histogram in parallel.
    ///
    /// The result is identical to [`PalettePipeline::palette`].
    ///
    /// # Errors
    /// Returns any error from [`PixelSource::load`].
    pub fn palette_par<'a>(
        &self,
        input: impl Into<ImageInput<'a>>,
        k: PaletteSize,
    ) -> Result<Palette> {
        let hist = {
            let buffer = self.source.load(input.into())?;
            Histogram::build_par(&buffer, self.bucket_bits)
        };
        Ok(quantize(&hist, k))
    }

    /// Computes the dominant palette of an already loaded [`PixelBuffer`],
    /// building the histogram in parallel.
    #[must_use]
    pub fn palette_from_buffer_par(&self, buffer: &PixelBuffer, k: PaletteSize) -> Palette {
        quantize(&Histogram::build_par(buffer, self.bucket_bits), k)
    }
}

/// Clusters and ranks a histogram.
fn quantize(hist: &Histogram, k: PaletteSize) -> Palette {
    tracing::debug!(
        buckets = hist.len(),
        pixels = hist.total_count(),
        "Built histogram"
    );

    let clusters = median_cut::cluster(hist, k);
    tracing::debug!(clusters = clusters.len(), %k, "Clustered histogram");

    ranker::rank(clusters)
}
