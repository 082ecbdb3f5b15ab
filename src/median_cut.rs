//! Median cut over histogram buckets.
//!
//! Starting from a single box holding every non-empty bucket, the heaviest box
//! (by pixel count) is repeatedly split in two. The split is made along the channel
//! with the widest range of quantized values, at the weighted median of that channel.
//! Boxes holding a single bucket cannot be split and are retired.
//! Splitting stops once there are `k` boxes or nothing is left to split.
//!
//! All ties are broken by a fixed order, so the same histogram and palette size
//! always produce the same boxes:
//! - equal box weights: the box containing the lowest bucket key is split first;
//! - equal channel ranges: red wins over green, which wins over blue;
//! - equal channel values during sorting: ascending bucket key.

use crate::{
    histogram::{Bucket, Histogram},
    PaletteSize, Swatch,
};
use num_traits::Zero;
use palette::Srgb;
use std::{cmp::Ordering, collections::BinaryHeap, ops::Range};

/// The number of color channels.
const N: usize = 3;

/// A group of histogram buckets and the color representing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cluster {
    /// The weighted average color of the member buckets.
    pub color: Srgb<u8>,
    /// The total number of pixels in the member buckets.
    pub weight: u64,
}

impl Cluster {
    /// Creates a [`Cluster`] from the summed statistics of its buckets.
    fn from_stats(stats: Bucket) -> Self {
        let Bucket { count, sums } = stats;
        debug_assert!(count > 0);
        let [r, g, b] = sums.map(|sum| rounded_mean(sum, count));
        Self {
            color: Srgb::new(r, g, b),
            weight: count,
        }
    }
}

impl From<Cluster> for Swatch {
    fn from(cluster: Cluster) -> Self {
        Self {
            color: cluster.color,
            weight: cluster.weight,
        }
    }
}

/// The mean of a channel, rounded to the nearest integer with halves rounded up.
#[inline]
fn rounded_mean(sum: u64, count: u64) -> u8 {
    u8::try_from((2 * sum + count) / (2 * count)).unwrap_or(u8::MAX)
}

/// A non-empty bucket of the histogram.
#[derive(Debug, Clone, Copy)]
struct Entry {
    /// The bucket key.
    key: u32,
    /// The quantized channel values encoded by `key`.
    coords: [u8; N],
    /// The bucket statistics.
    stats: Bucket,
}

/// A contiguous range of entries.
#[derive(Debug, Clone)]
struct ColorBox {
    /// The entries belonging to the box.
    range: Range<usize>,
    /// The total count of the entries.
    weight: u64,
    /// The smallest key among the entries, used to break ties.
    min_key: u32,
}

impl ColorBox {
    /// Creates a box over the given range of entries.
    fn new(entries: &[Entry], range: Range<usize>) -> Self {
        let members = &entries[range.clone()];
        Self {
            weight: members.iter().map(|e| e.stats.count).sum(),
            min_key: members.iter().map(|e| e.key).min().unwrap_or(u32::MAX),
            range,
        }
    }

    /// Whether the box holds more than one bucket.
    fn can_split(&self) -> bool {
        self.range.len() > 1
    }

    /// Splits the box at the weighted median of its widest channel.
    ///
    /// Reorders the entries of this box in place. Both halves are non-empty.
    fn split(self, entries: &mut [Entry]) -> (Self, Self) {
        debug_assert!(self.can_split());

        let Range { start, end } = self.range;
        let members = &mut entries[start..end];

        let channel = widest_channel(members);
        members.sort_unstable_by_key(|e| (e.coords[channel], e.key));

        let mid = start + median_index(members, self.weight);
        let lower = Self::new(entries, start..mid);
        let upper = Self::new(entries, mid..end);

        tracing::trace!(
            channel,
            index = mid,
            lower = lower.weight,
            upper = upper.weight,
            "Split box"
        );

        (lower, upper)
    }

    /// Sums the member buckets into a [`Cluster`].
    fn cluster(&self, entries: &[Entry]) -> Cluster {
        let stats = entries[self.range.clone()]
            .iter()
            .fold(Bucket::zero(), |sum, e| sum + e.stats);

        Cluster::from_stats(stats)
    }
}

impl Ord for ColorBox {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .cmp(&other.weight)
            .then_with(|| other.min_key.cmp(&self.min_key))
    }
}

impl PartialOrd for ColorBox {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ColorBox {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ColorBox {}

/// Returns the channel with the greatest range of quantized values.
fn widest_channel(members: &[Entry]) -> usize {
    let mut min = [u8::MAX; N];
    let mut max = [u8::MIN; N];
    for entry in members {
        for c in 0..N {
            min[c] = min[c].min(entry.coords[c]);
            max[c] = max[c].max(entry.coords[c]);
        }
    }

    let mut widest = 0;
    for c in 1..N {
        if max[c] - min[c] > max[widest] - min[widest] {
            widest = c;
        }
    }
    widest
}

/// Returns the number of sorted `members` in the lower half of a split.
///
/// The lower half ends with the first member at which the cumulative count reaches
/// half of `weight`. The result is clamped to `1..members.len()`.
fn median_index(members: &[Entry], weight: u64) -> usize {
    let len = members.len();
    let mut cumulative = 0;
    let mut at = len - 1;
    for (i, entry) in members.iter().enumerate() {
        cumulative += entry.stats.count;
        if 2 * cumulative >= weight {
            at = i + 1;
            break;
        }
    }
    at.clamp(1, len - 1)
}

/// Returns the disjoint boxes resulting from median cut.
fn boxes(entries: &mut [Entry], k: usize) -> Vec<ColorBox> {
    let mut queue = BinaryHeap::with_capacity(k);
    let mut retired = Vec::new();
    queue.push(ColorBox::new(entries, 0..entries.len()));

    while queue.len() + retired.len() < k {
        let Some(heaviest) = queue.pop() else {
            break;
        };

        if heaviest.can_split() {
            let (lower, upper) = heaviest.split(entries);
            queue.push(lower);
            queue.push(upper);
        } else {
            retired.push(heaviest);
        }
    }

    retired.extend(queue.into_vec());
    retired
}

/// Groups the non-empty buckets of `hist` into at most `k` clusters.
///
/// If there are no more than `k` non-empty buckets, each one becomes its own cluster.
/// The weights of the returned clusters always sum to the total count of the histogram.
/// The order of the returned clusters is deterministic but otherwise unspecified;
/// see [`rank`](crate::ranker::rank) to order them.
#[must_use]
pub fn cluster(hist: &Histogram, k: PaletteSize) -> Vec<Cluster> {
    let k = k.into_inner();
    let binner = *hist.binner();

    let mut entries = hist
        .buckets()
        .map(|(key, &stats)| Entry {
            key,
            coords: binner.coords_of_key(key),
            stats,
        })
        .collect::<Vec<_>>();

    if entries.len() <= k {
        return entries
            .iter()
            .map(|e| Cluster::from_stats(e.stats))
            .collect();
    }

    boxes(&mut entries, k)
        .iter()
        .map(|b| b.cluster(&entries))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{tests::*, BucketBits, PixelBuffer};

    fn size(k: usize) -> PaletteSize {
        PaletteSize::try_from(k).unwrap()
    }

    fn histogram(colors: &[(Srgb<u8>, usize)]) -> Histogram {
        let pixels = colors
            .iter()
            .flat_map(|&(color, n)| std::iter::repeat(color).take(n))
            .collect::<Vec<_>>();
        #[allow(clippy::cast_possible_truncation)]
        let buffer = PixelBuffer::new(pixels.len() as u32, 1, pixels).unwrap();
        Histogram::build(&buffer, BucketBits::DEFAULT)
    }

    fn sorted(clusters: Vec<Cluster>) -> Vec<(u64, [u8; 3])> {
        let mut clusters = clusters
            .into_iter()
            .map(|c| (c.weight, <[u8; 3]>::from(c.color.into_components())))
            .collect::<Vec<_>>();
        clusters.sort_unstable();
        clusters
    }

    #[test]
    fn median_index_balances_weight() {
        let entries = |counts: &[u64]| {
            counts
                .iter()
                .zip(0..)
                .map(|(&count, key)| Entry {
                    key,
                    coords: [0; N],
                    stats: Bucket {
                        count,
                        sums: [0; N],
                    },
                })
                .collect::<Vec<_>>()
        };

        assert_eq!(median_index(&entries(&[1, 1]), 2), 1);
        assert_eq!(median_index(&entries(&[1, 1, 10, 1]), 13), 3);
        assert_eq!(median_index(&entries(&[1, 1, 1, 1]), 4), 2);
        // a dominant first member still leaves the upper half non-empty
        assert_eq!(median_index(&entries(&[100, 1, 1]), 102), 1);
        // a dominant last member still leaves the lower half non-empty
        assert_eq!(median_index(&entries(&[1, 1, 100]), 102), 2);
    }

    #[test]
    fn empty_histogram() {
        let hist = Histogram::new(BucketBits::DEFAULT);
        assert!(cluster(&hist, size(4)).is_empty());
    }

    #[test]
    fn not_enough_colors() {
        let hist = histogram(&[
            (Srgb::new(255, 0, 0), 4),
            (Srgb::new(0, 255, 0), 2),
            (Srgb::new(0, 0, 255), 1),
        ]);

        let actual = sorted(cluster(&hist, size(5)));
        assert_eq!(
            actual,
            vec![(1, [0, 0, 255]), (2, [0, 255, 0]), (4, [255, 0, 0])]
        );
    }

    #[test]
    fn representative_color_rounds_half_up() {
        let hist = histogram(&[(Srgb::new(0, 10, 3), 1), (Srgb::new(1, 11, 4), 1)]);
        let clusters = cluster(&hist, size(1));
        let expected = Cluster {
            color: Srgb::new(1, 11, 4),
            weight: 2,
        };
        assert_eq!(clusters, vec![expected]);
    }

    #[test]
    fn splits_at_weighted_median() {
        let hist = histogram(&[
            (Srgb::new(0, 0, 0), 1),
            (Srgb::new(64, 0, 0), 1),
            (Srgb::new(128, 0, 0), 10),
            (Srgb::new(255, 0, 0), 1),
        ]);

        let actual = sorted(cluster(&hist, size(2)));
        assert_eq!(actual, vec![(1, [255, 0, 0]), (12, [112, 0, 0])]);
    }

    #[test]
    fn equal_weights_split_lowest_key_first() {
        let hist = histogram(&[
            (Srgb::new(0, 0, 0), 1),
            (Srgb::new(85, 0, 0), 1),
            (Srgb::new(170, 0, 0), 1),
            (Srgb::new(255, 0, 0), 1),
        ]);

        let actual = sorted(cluster(&hist, size(3)));
        assert_eq!(
            actual,
            vec![(1, [0, 0, 0]), (1, [85, 0, 0]), (2, [213, 0, 0])]
        );
    }

    #[test]
    fn single_bucket_boxes_are_retired() {
        let hist = histogram(&[
            (Srgb::new(0, 0, 0), 100),
            (Srgb::new(255, 0, 0), 1),
            (Srgb::new(255, 255, 0), 1),
            (Srgb::new(255, 0, 255), 1),
        ]);

        let actual = sorted(cluster(&hist, size(3)));
        assert_eq!(
            actual,
            vec![(1, [255, 255, 0]), (2, [255, 0, 128]), (100, [0, 0, 0])]
        );
    }

    #[test]
    fn green_and_blue_share_a_box() {
        let hist = histogram(&[
            (Srgb::new(255, 0, 0), 2),
            (Srgb::new(0, 255, 0), 1),
            (Srgb::new(0, 0, 255), 1),
        ]);

        let actual = sorted(cluster(&hist, size(2)));
        assert_eq!(actual, vec![(2, [0, 128, 128]), (2, [255, 0, 0])]);
    }

    #[test]
    fn weight_is_conserved_and_length_bounded() {
        let buffer = random_buffer(61, 41, 4);
        let hist = Histogram::build(&buffer, BucketBits::DEFAULT);

        for k in [1, 2, 3, 8, 16, 100, 255, 4096] {
            let clusters = cluster(&hist, size(k));
            assert_eq!(clusters.len(), k.min(hist.len()));
            assert_eq!(
                clusters.iter().map(|c| c.weight).sum::<u64>(),
                buffer.len() as u64
            );
        }
    }

    #[test]
    fn deterministic() {
        let buffer = random_buffer(50, 50, 5);
        let hist = Histogram::build(&buffer, BucketBits::DEFAULT);
        for k in [1, 5, 16, 64] {
            assert_eq!(cluster(&hist, size(k)), cluster(&hist.clone(), size(k)));
        }
    }
}
