//! Contains various types needed across the crate.

use crate::Error;
use palette::Srgb;
use std::{
    fmt::{Display, Write},
    num::NonZeroUsize,
    ops::Deref,
};

/// Packs a color into a 24-bit integer of the form `0xRRGGBB`.
#[must_use]
pub const fn pack_rgb(color: Srgb<u8>) -> u32 {
    ((color.red as u32) << 16) | ((color.green as u32) << 8) | (color.blue as u32)
}

/// Unpacks a `0xRRGGBB` integer into a color. Bits above the lower 24 are ignored.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn unpack_rgb(packed: u32) -> Srgb<u8> {
    Srgb::new(
        ((packed >> 16) & 0xFF) as u8,
        ((packed >> 8) & 0xFF) as u8,
        (packed & 0xFF) as u8,
    )
}

/// Formats a packed color as an uppercase `#RRGGBB` string.
#[must_use]
pub fn hex_string(packed: u32) -> String {
    format!("#{:06X}", packed & 0x00FF_FFFF)
}

/// This type is used to specify the maximum number of colors to include in a palette.
///
/// This is a simple new type wrapper around [`NonZeroUsize`]:
/// a palette size of `0` is rejected with [`Error::InvalidArgument`].
///
/// # Examples
/// ```
/// # use domcol::PaletteSize;
/// # fn main() -> domcol::Result<()> {
/// let size = PaletteSize::try_from(5)?;
/// assert_eq!(size.into_inner(), 5);
/// assert!(PaletteSize::try_from(0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PaletteSize(NonZeroUsize);

impl PaletteSize {
    /// Gets the inner value as a `usize`.
    #[must_use]
    pub const fn into_inner(self) -> usize {
        self.0.get()
    }
}

impl From<NonZeroUsize> for PaletteSize {
    fn from(value: NonZeroUsize) -> Self {
        Self(value)
    }
}

impl TryFrom<usize> for PaletteSize {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        NonZeroUsize::new(value)
            .map(Self)
            .ok_or(Error::InvalidArgument(
                "palette size must be greater than zero",
            ))
    }
}

impl From<PaletteSize> for usize {
    fn from(val: PaletteSize) -> Self {
        val.into_inner()
    }
}

impl Display for PaletteSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.into_inner())
    }
}

/// The number of significant bits kept per channel when binning colors into the histogram.
///
/// With `n` bits the histogram has at most `2^(3n)` buckets.
/// The default of `5` bits (`32768` buckets) trades a little palette fidelity for speed.
/// Values must be in `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct BucketBits(u8);

impl BucketBits {
    /// The smallest supported depth.
    pub const MIN: Self = Self(1);

    /// The largest supported depth.
    pub const MAX: Self = Self(6);

    /// The default depth of `5` bits per channel.
    pub const DEFAULT: Self = Self(5);

    /// Gets the inner `u8` value.
    #[must_use]
    pub const fn into_inner(self) -> u8 {
        self.0
    }

    /// The number of histogram buckets this depth produces.
    #[must_use]
    pub const fn num_buckets(self) -> usize {
        1 << (3 * self.0 as usize)
    }
}

impl Default for BucketBits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for BucketBits {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidArgument(
                "bucket bits must be between 1 and 6",
            ))
        }
    }
}

/// A representative color and the number of pixels it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    /// The representative color.
    pub color: Srgb<u8>,
    /// The number of source pixels assigned to this color.
    pub weight: u64,
}

impl Swatch {
    /// The color packed as `0xRRGGBB`.
    #[must_use]
    pub const fn packed(&self) -> u32 {
        pack_rgb(self.color)
    }
}

/// An ordered list of [`Swatch`]es, most dominant first.
///
/// Swatches are sorted by descending weight.
/// Equal weights are ordered by ascending packed color.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette(Vec<Swatch>);

impl Palette {
    /// Wraps swatches that are already in ranked order.
    pub(crate) fn new_unchecked(swatches: Vec<Swatch>) -> Self {
        Self(swatches)
    }

    /// The colors packed as `0xRRGGBB` integers.
    #[must_use]
    pub fn packed(&self) -> Vec<u32> {
        self.0.iter().map(Swatch::packed).collect()
    }

    /// The colors formatted as `#RRGGBB` strings.
    #[must_use]
    pub fn hex_strings(&self) -> Vec<String> {
        self.0.iter().map(|s| hex_string(s.packed())).collect()
    }

    /// The sum of all swatch weights, i.e. the number of pixels that were quantized.
    #[must_use]
    pub fn total_weight(&self) -> u64 {
        self.0.iter().map(|s| s.weight).sum()
    }

    /// The share of the total weight held by each swatch, in palette order.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn proportions(&self) -> Vec<f64> {
        let total = self.total_weight();
        if total == 0 {
            return vec![0.0; self.0.len()];
        }
        self.0
            .iter()
            .map(|s| s.weight as f64 / total as f64)
            .collect()
    }

    /// Consumes the palette, returning the swatches.
    #[must_use]
    pub fn into_inner(self) -> Vec<Swatch> {
        self.0
    }
}

impl Deref for Palette {
    type Target = [Swatch];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Palette> for Vec<u32> {
    fn from(val: Palette) -> Self {
        val.packed()
    }
}

impl Display for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for swatch in &self.0 {
            if !first {
                f.write_char(' ')?;
            }
            first = false;
            f.write_str(&hex_string(swatch.packed()))?;
        }
        Ok(())
    }
}
