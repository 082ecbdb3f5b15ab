//! Orders clusters into a [`Palette`].

use crate::{median_cut::Cluster, Palette, Swatch};

/// Sorts clusters by descending weight into a [`Palette`].
///
/// Clusters of equal weight are ordered by ascending packed color,
/// so the result does not depend on the order of `clusters`.
#[must_use]
pub fn rank(clusters: Vec<Cluster>) -> Palette {
    let mut swatches = clusters.into_iter().map(Swatch::from).collect::<Vec<_>>();

    swatches.sort_unstable_by(|a, b| {
        b.weight
            .cmp(&a.weight)
            .then_with(|| a.packed().cmp(&b.packed()))
    });

    Palette::new_unchecked(swatches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette::Srgb;

    fn cluster(packed: u32, weight: u64) -> Cluster {
        Cluster {
            color: crate::unpack_rgb(packed),
            weight,
        }
    }

    #[test]
    fn empty() {
        assert!(rank(Vec::new()).is_empty());
    }

    #[test]
    fn descending_weight_then_ascending_color() {
        let clusters = vec![
            cluster(0x00FF00, 1),
            cluster(0xFF0000, 2),
            cluster(0x0000FF, 1),
            cluster(0x123456, 7),
        ];

        let palette = rank(clusters.clone());
        assert_eq!(
            palette.packed(),
            vec![0x123456, 0xFF0000, 0x0000FF, 0x00FF00]
        );
        assert_eq!(
            palette.iter().map(|s| s.weight).collect::<Vec<_>>(),
            vec![7, 2, 1, 1]
        );

        let reversed = rank(clusters.into_iter().rev().collect());
        assert_eq!(palette, reversed);
    }

    #[test]
    fn keeps_duplicate_colors() {
        let palette = rank(vec![cluster(0x101010, 3), cluster(0x101010, 3)]);
        assert_eq!(palette.len(), 2);
        assert_eq!(palette[0].color, Srgb::new(0x10, 0x10, 0x10));
    }
}
