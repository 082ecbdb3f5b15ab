//! Reduces a pixel buffer to a weighted histogram over a coarser color space.
//!
//! Each color is binned by keeping the top [`BucketBits`] bits of every channel.
//! Bins keep full-precision channel sums, so the exact average color of any
//! group of bins can be recovered later.
//!
//! Histograms over disjoint parts of an image can be [merged](Histogram::merge)
//! by summing bins. The merge is associative and commutative, which is what makes
//! [`Histogram::build_par`] produce the same result as [`Histogram::build`].

use crate::{BucketBits, PixelBuffer};
use num_traits::Zero;
use palette::Srgb;
use std::ops::{Add, AddAssign};

#[cfg(feature = "threads")]
use rayon::prelude::*;

/// The number of color channels.
const N: usize = 3;

/// Statistics for a histogram bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bucket {
    /// The number of pixels assigned to the bucket.
    pub count: u64,
    /// The channel-wise sum of the full-precision colors assigned to the bucket.
    pub sums: [u64; N],
}

impl Bucket {
    /// Adds a single pixel to the bucket.
    #[inline]
    fn add_color(&mut self, color: [u8; N]) {
        self.count += 1;
        for (sum, c) in self.sums.iter_mut().zip(color) {
            *sum += u64::from(c);
        }
    }
}

impl Add for Bucket {
    type Output = Self;

    #[inline]
    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl AddAssign for Bucket {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.count += rhs.count;
        for i in 0..N {
            self.sums[i] += rhs.sums[i];
        }
    }
}

impl Zero for Bucket {
    fn zero() -> Self {
        Self {
            count: 0,
            sums: [0; N],
        }
    }

    fn is_zero(&self) -> bool {
        self.count == 0 && self.sums.iter().all(Zero::is_zero)
    }
}

/// Maps colors to quantized bucket keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binner {
    /// The number of bits kept per channel.
    bits: u8,
}

impl Binner {
    /// Creates a binner keeping `bits` bits per channel.
    #[must_use]
    pub const fn new(bits: BucketBits) -> Self {
        Self {
            bits: bits.into_inner(),
        }
    }

    /// The quantized value of each channel.
    #[inline]
    #[must_use]
    pub const fn coords(&self, color: [u8; N]) -> [u8; N] {
        let shift = 8 - self.bits;
        [color[0] >> shift, color[1] >> shift, color[2] >> shift]
    }

    /// Concatenates quantized channels into a single key, red being the most significant.
    #[inline]
    #[must_use]
    pub const fn key_of_coords(&self, coords: [u8; N]) -> u32 {
        let bits = self.bits as u32;
        ((coords[0] as u32) << (2 * bits)) | ((coords[1] as u32) << bits) | (coords[2] as u32)
    }

    /// Splits a key back into its quantized channels.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn coords_of_key(&self, key: u32) -> [u8; N] {
        let bits = self.bits as u32;
        let mask = (1 << bits) - 1;
        [
            ((key >> (2 * bits)) & mask) as u8,
            ((key >> bits) & mask) as u8,
            (key & mask) as u8,
        ]
    }

    /// The bucket key for a color.
    #[inline]
    #[must_use]
    pub const fn key(&self, color: [u8; N]) -> u32 {
        self.key_of_coords(self.coords(color))
    }
}

/// A dense color histogram indexed by quantized key.
#[derive(Clone, PartialEq, Eq)]
pub struct Histogram {
    /// The binner that produced the keys.
    binner: Binner,
    /// One bucket per possible key.
    buckets: Box<[Bucket]>,
}

impl std::fmt::Debug for Histogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Histogram")
            .field("binner", &self.binner)
            .field("len", &self.len())
            .field("total_count", &self.total_count())
            .finish_non_exhaustive()
    }
}

impl Histogram {
    /// Creates an empty histogram with `bits` bits per channel.
    #[must_use]
    pub fn new(bits: BucketBits) -> Self {
        Self {
            binner: Binner::new(bits),
            buckets: vec![Bucket::zero(); bits.num_buckets()].into_boxed_slice(),
        }
    }

    /// The binner used by this histogram.
    #[must_use]
    pub const fn binner(&self) -> &Binner {
        &self.binner
    }

    /// Adds the given colors to the histogram.
    pub fn add_colors(&mut self, colors: &[Srgb<u8>]) {
        let binner = self.binner;
        for color in colors {
            let color: [u8; N] = color.into_components().into();
            self.buckets[binner.key(color) as usize].add_color(color);
        }
    }

    /// Builds the histogram of a pixel buffer in a single pass.
    #[must_use]
    pub fn build(buffer: &PixelBuffer, bits: BucketBits) -> Self {
        let mut hist = Self::new(bits);
        hist.add_colors(buffer.pixels());
        hist
    }

    /// Builds the histogram of a pixel buffer in parallel.
    ///
    /// The rows of the image are divided into one contiguous range per thread.
    /// Each worker fills its own partial histogram,
    /// and the partial histograms are then merged together.
    #[cfg(feature = "threads")]
    #[must_use]
    pub fn build_par(buffer: &PixelBuffer, bits: BucketBits) -> Self {
        let width = (buffer.width() as usize).max(1);
        let rows = buffer.len().div_ceil(width);
        let rows_per_worker = rows.div_ceil(rayon::current_num_threads()).max(1);

        buffer
            .pixels()
            .par_chunks(rows_per_worker * width)
            .map(|pixels| {
                let mut hist = Self::new(bits);
                hist.add_colors(pixels);
                tracing::trace!(
                    pixels = pixels.len(),
                    buckets = hist.len(),
                    "Built partial histogram"
                );
                hist
            })
            .reduce_with(Self::merge)
            .unwrap_or_else(|| Self::new(bits))
    }

    /// Merges two histograms by summing their buckets.
    ///
    /// # Panics
    /// Panics if the histograms were built with different [`BucketBits`].
    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn merge(mut self, other: Self) -> Self {
        assert_eq!(
            self.binner, other.binner,
            "histograms must use the same bucket depth"
        );
        for (a, &b) in self.buckets.iter_mut().zip(other.buckets.iter()) {
            *a += b;
        }
        self
    }

    /// Returns the bucket for the given key, if the key is in range.
    #[must_use]
    pub fn get(&self, key: u32) -> Option<&Bucket> {
        self.buckets.get(key as usize)
    }

    /// Returns an iterator over the non-empty buckets and their keys, in ascending key order.
    #[allow(clippy::cast_possible_truncation)]
    pub fn buckets(&self) -> impl Iterator<Item = (u32, &Bucket)> + '_ {
        self.buckets
            .iter()
            .enumerate()
            .filter(|(_, bucket)| bucket.count > 0)
            .map(|(key, bucket)| (key as u32, bucket))
    }

    /// The number of non-empty buckets (distinct quantized colors).
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets
            .iter()
            .filter(|bucket| bucket.count > 0)
            .count()
    }

    /// Whether every bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|bucket| bucket.count == 0)
    }

    /// The total number of pixels in the histogram.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.buckets.iter().map(|bucket| bucket.count).sum()
    }
}
