//! Turns image files, encoded bytes, or already decoded images into a [`PixelBuffer`].

use crate::{Error, Result};
use image::{DynamicImage, ImageFormat, ImageReader, Limits};
use palette::{cast, Srgb};
use std::{io::Cursor, path::Path};

/// An owned, immutable buffer of opaque sRGB samples in row-major order.
///
/// The buffer is created once per quantization call and only read afterwards.
/// Unless translucent pixels were skipped during decoding (see [`AlphaMode`]),
/// the buffer holds exactly `width * height` samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// The image width in pixels.
    width: u32,
    /// The image height in pixels.
    height: u32,
    /// The samples, one per (kept) pixel.
    pixels: Vec<Srgb<u8>>,
}

impl PixelBuffer {
    /// Creates a [`PixelBuffer`] from raw pixels.
    ///
    /// # Errors
    /// Returns [`Error::EmptyImage`] if `width` or `height` is zero
    /// and [`Error::InvalidArgument`] if `pixels.len() != width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<Srgb<u8>>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage { width, height });
        }
        if pixels.len() as u64 != u64::from(width) * u64::from(height) {
            return Err(Error::InvalidArgument(
                "pixel buffer length does not match its dimensions",
            ));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// The image width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// The image height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The samples in row-major order.
    #[must_use]
    pub fn pixels(&self) -> &[Srgb<u8>] {
        &self.pixels
    }

    /// The number of samples in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Whether the buffer holds no samples.
    ///
    /// This can only happen if every pixel was skipped by [`AlphaMode::SkipTranslucent`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Returns an iterator over the rows of the image.
    ///
    /// If translucent pixels were skipped, the chunks no longer line up
    /// with the source rows, but they still partition the buffer.
    pub fn rows(&self) -> std::slice::Chunks<'_, Srgb<u8>> {
        self.pixels.chunks(self.width as usize)
    }
}

/// How the alpha channel of decoded images is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlphaMode {
    /// Drop the alpha channel and keep every pixel.
    #[default]
    Ignore,
    /// Exclude every pixel whose alpha is below `255`.
    SkipTranslucent,
}

/// Options forwarded to the image decoder.
///
/// # Examples
/// ```
/// # use domcol::{AlphaMode, DecoderConfig};
/// let config = DecoderConfig::new()
///     .max_dimensions(4096, 4096)
///     .alpha(AlphaMode::SkipTranslucent);
/// ```
#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Decode as this format instead of guessing from the content.
    format: Option<ImageFormat>,
    /// The maximum accepted image width.
    max_width: Option<u32>,
    /// The maximum accepted image height.
    max_height: Option<u32>,
    /// The maximum number of bytes the decoder may allocate.
    max_alloc: Option<u64>,
    /// The alpha channel treatment.
    alpha: AlphaMode,
}

impl DecoderConfig {
    /// Creates a [`DecoderConfig`] that guesses formats and uses the decoder's default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces the given format instead of guessing it from the content.
    pub fn format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Rejects images wider than `width` or taller than `height` with [`Error::Decode`].
    pub fn max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_width = Some(width);
        self.max_height = Some(height);
        self
    }

    /// Limits the number of bytes the decoder may allocate.
    pub fn max_alloc(mut self, bytes: u64) -> Self {
        self.max_alloc = Some(bytes);
        self
    }

    /// Sets how the alpha channel is treated. The default is [`AlphaMode::Ignore`].
    pub fn alpha(mut self, alpha: AlphaMode) -> Self {
        self.alpha = alpha;
        self
    }

    /// The decoder limits described by this config.
    fn limits(&self) -> Limits {
        let mut limits = Limits::default();
        limits.max_image_width = self.max_width;
        limits.max_image_height = self.max_height;
        if self.max_alloc.is_some() {
            limits.max_alloc = self.max_alloc;
        }
        limits
    }
}

/// The image to extract a palette from.
#[derive(Debug, Clone, Copy)]
pub enum ImageInput<'a> {
    /// An image file on disk.
    Path(&'a Path),
    /// The encoded bytes of an image.
    Bytes(&'a [u8]),
    /// An image that was already decoded.
    Image(&'a DynamicImage),
}

impl<'a> From<&'a Path> for ImageInput<'a> {
    fn from(path: &'a Path) -> Self {
        Self::Path(path)
    }
}

impl<'a> From<&'a [u8]> for ImageInput<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a> From<&'a DynamicImage> for ImageInput<'a> {
    fn from(image: &'a DynamicImage) -> Self {
        Self::Image(image)
    }
}

/// Loads [`PixelBuffer`]s using an explicit [`DecoderConfig`].
#[derive(Debug, Clone, Default)]
pub struct PixelSource {
    /// The decoder options.
    config: DecoderConfig,
}

impl PixelSource {
    /// Creates a [`PixelSource`] with the given decoder options.
    #[must_use]
    pub const fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// The decoder options used by this source.
    #[must_use]
    pub const fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes (if needed) the given input into a [`PixelBuffer`].
    ///
    /// # Errors
    /// - [`Error::Io`] if a path cannot be read.
    /// - [`Error::Decode`] if the bytes are not a supported, valid image within the configured limits.
    /// - [`Error::EmptyImage`] if the image has zero width or height.
    pub fn load(&self, input: ImageInput<'_>) -> Result<PixelBuffer> {
        let buffer = match input {
            ImageInput::Path(path) => {
                tracing::trace!(path = %path.display(), "Reading image file");
                let bytes = std::fs::read(path)?;
                let hint = ImageFormat::from_path(path).ok();
                self.to_buffer(&self.decode(&bytes, hint)?)
            }
            ImageInput::Bytes(bytes) => self.to_buffer(&self.decode(bytes, None)?),
            ImageInput::Image(image) => self.to_buffer(image),
        }?;

        tracing::debug!(
            width = buffer.width,
            height = buffer.height,
            samples = buffer.len(),
            "Loaded pixel buffer"
        );

        Ok(buffer)
    }

    /// Decodes encoded image bytes.
    ///
    /// An explicitly configured format always wins.
    /// Otherwise the format is sniffed from the content, falling back to `hint`.
    fn decode(&self, bytes: &[u8], hint: Option<ImageFormat>) -> Result<DynamicImage> {
        let mut reader = ImageReader::new(Cursor::new(bytes));
        if let Some(format) = self.config.format {
            reader.set_format(format);
        } else {
            reader = reader
                .with_guessed_format()
                .map_err(|e| Error::Decode(e.into()))?;
            if reader.format().is_none() {
                if let Some(format) = hint {
                    reader.set_format(format);
                }
            }
        }
        reader.limits(self.config.limits());
        reader.decode().map_err(Error::Decode)
    }

    /// Converts a decoded image to opaque sRGB samples.
    fn to_buffer(&self, image: &DynamicImage) -> Result<PixelBuffer> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage { width, height });
        }

        let pixels = match self.config.alpha {
            AlphaMode::Ignore => {
                let rgb = image.to_rgb8();
                let len = rgb.pixels().len() * 3;
                cast::from_component_slice::<Srgb<u8>>(&rgb.as_raw()[..len]).to_vec()
            }
            AlphaMode::SkipTranslucent => image
                .to_rgba8()
                .pixels()
                .filter(|p| p.0[3] == u8::MAX)
                .map(|p| Srgb::new(p.0[0], p.0[1], p.0[2]))
                .collect(),
        };

        Ok(PixelBuffer {
            width,
            height,
            pixels,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn raw_buffer_validation() {
        let pixels = vec![Srgb::new(1, 2, 3); 6];
        let buffer = PixelBuffer::new(3, 2, pixels.clone()).unwrap();
        assert_eq!(buffer.len(), 6);
        assert_eq!(buffer.rows().count(), 2);

        assert!(matches!(
            PixelBuffer::new(4, 2, pixels.clone()),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            PixelBuffer::new(0, 2, Vec::new()),
            Err(Error::EmptyImage { width, height }) if (width, height) == (0, 2)
        ));
    }

    #[test]
    fn decodes_png_bytes_in_row_major_order() {
        let colors = [
            Srgb::new(255, 0, 0),
            Srgb::new(0, 255, 0),
            Srgb::new(0, 0, 255),
            Srgb::new(7, 8, 9),
        ];
        let bytes = encode_png(2, 2, &colors);

        let buffer = PixelSource::default()
            .load(ImageInput::Bytes(&bytes))
            .unwrap();
        assert_eq!((buffer.width(), buffer.height()), (2, 2));
        assert_eq!(buffer.pixels(), colors);
    }

    #[test]
    fn empty_bytes_fail_to_decode() {
        let result = PixelSource::default().load(ImageInput::Bytes(&[]));
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn corrupt_bytes_fail_to_decode() {
        let mut bytes = encode_png(4, 4, &[Srgb::new(10, 20, 30); 16]);
        bytes.truncate(bytes.len() / 2);
        let result = PixelSource::default().load(ImageInput::Bytes(&bytes));
        assert!(matches!(result, Err(Error::Decode(_))));

        let result = PixelSource::default().load(ImageInput::Bytes(b"definitely not an image"));
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn missing_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.png");
        let result = PixelSource::default().load(ImageInput::Path(&path));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn reads_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.png");
        std::fs::write(&path, encode_png(1, 3, &[Srgb::new(1, 1, 1); 3])).unwrap();

        let buffer = PixelSource::default()
            .load(ImageInput::Path(&path))
            .unwrap();
        assert_eq!((buffer.width(), buffer.height()), (1, 3));
    }

    #[test]
    fn zero_sized_decoded_image_is_empty() {
        let image = DynamicImage::new_rgb8(0, 5);
        let result = PixelSource::default().load(ImageInput::Image(&image));
        assert!(matches!(
            result,
            Err(Error::EmptyImage { width, height }) if (width, height) == (0, 5)
        ));
    }

    #[test]
    fn alpha_modes() {
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([10, 20, 30, 255]));
        image.put_pixel(1, 0, Rgba([40, 50, 60, 0]));
        let image = DynamicImage::ImageRgba8(image);

        let all = PixelSource::default().load((&image).into()).unwrap();
        assert_eq!(all.pixels(), [Srgb::new(10, 20, 30), Srgb::new(40, 50, 60)]);

        let opaque = PixelSource::new(DecoderConfig::new().alpha(AlphaMode::SkipTranslucent))
            .load((&image).into())
            .unwrap();
        assert_eq!(opaque.pixels(), [Srgb::new(10, 20, 30)]);
        assert_eq!((opaque.width(), opaque.height()), (2, 1));
    }

    #[test]
    fn dimension_limits_reject_large_images() {
        let bytes = encode_png(8, 8, &[Srgb::new(0, 0, 0); 64]);
        let source = PixelSource::new(DecoderConfig::new().max_dimensions(4, 4));
        assert!(matches!(
            source.load(ImageInput::Bytes(&bytes)),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn forced_format_mismatch_fails() {
        let bytes = encode_png(1, 1, &[Srgb::new(0, 0, 0)]);
        let source = PixelSource::new(DecoderConfig::new().format(ImageFormat::Jpeg));
        assert!(matches!(
            source.load(ImageInput::Bytes(&bytes)),
            Err(Error::Decode(_))
        ));
    }
}
