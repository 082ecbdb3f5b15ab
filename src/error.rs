//! The error type shared by every stage of the palette pipeline.

use thiserror::Error;

/// An error returned when a dominant palette could not be computed.
///
/// No stage recovers from a failure: the first error aborts the call
/// and no partial palette is produced.
#[derive(Debug, Error)]
pub enum Error {
    /// The image file could not be read.
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes do not hold a supported or valid raster image,
    /// or the decoder rejected them because of the configured limits.
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// The decoded image has no pixels.
    #[error("image dimensions cannot be zero, got {width}x{height}")]
    EmptyImage {
        /// The decoded width.
        width: u32,
        /// The decoded height.
        height: u32,
    },

    /// An argument was outside of its supported range.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// A `Result` alias using [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
