//! A library for extracting a small, ranked palette of dominant colors from an image,
//! e.g. to derive accent colors from album art or avatars.
//!
//! The palette is computed in four stages:
//! 1. the image is decoded into a [`PixelBuffer`] of opaque sRGB samples ([`PixelSource`]);
//! 2. the samples are binned into a fixed-size [`Histogram`], optionally in parallel;
//! 3. the histogram buckets are grouped into at most `k` clusters by [median cut](median_cut);
//! 4. the clusters are [ranked](ranker::rank) by pixel count into a [`Palette`].
//!
//! Every stage is deterministic: the same image and palette size always give the same palette.
//!
//! # Features
//! - `threads`: builds histograms in parallel via [`rayon`].
//!
//! # Examples
//! The plain entry points return colors packed as `0xRRGGBB`:
//! ```no_run
//! # fn main() -> domcol::Result<()> {
//! let colors = domcol::get_dominant_palette_from_image_path("cover.jpg", 5)?;
//! for color in colors {
//!     println!("{}", domcol::hex_string(color));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! For more control, see [`PalettePipeline`].

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod api;
mod error;
mod histogram;
mod source;
mod types;

pub mod median_cut;
pub mod ranker;

pub use api::*;
pub use error::{Error, Result};
pub use histogram::{Binner, Bucket, Histogram};
pub use source::{AlphaMode, DecoderConfig, ImageInput, PixelBuffer, PixelSource};
pub use types::*;
