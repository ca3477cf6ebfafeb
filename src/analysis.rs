//! Single-pass analyses over a raster: per-channel histograms and the
//! unique-color palette.

use crate::{PixelBuffer, CHANNEL_VALUES};
use ordered_float::OrderedFloat;
use palette::{Srgb, Srgba};
use std::{cmp::Reverse, collections::HashSet};

/// Per-channel frequency counts over a raster.
///
/// Each array holds, for every possible channel value, the number of pixels
/// carrying that value, so each array sums to the pixel count. A histogram
/// describes one buffer state; it is rebuilt from scratch after every
/// pipeline run rather than updated incrementally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    /// Counts for the red channel.
    pub red: Box<[u32; CHANNEL_VALUES]>,
    /// Counts for the green channel.
    pub green: Box<[u32; CHANNEL_VALUES]>,
    /// Counts for the blue channel.
    pub blue: Box<[u32; CHANNEL_VALUES]>,
}

impl Histogram {
    /// Counts every pixel of `buffer` in a single forward pass.
    #[must_use]
    pub fn build(buffer: &PixelBuffer) -> Self {
        let mut histogram = Self {
            red: Box::new([0; CHANNEL_VALUES]),
            green: Box::new([0; CHANNEL_VALUES]),
            blue: Box::new([0; CHANNEL_VALUES]),
        };
        for pixel in buffer.pixels() {
            histogram.red[usize::from(pixel.red)] += 1;
            histogram.green[usize::from(pixel.green)] += 1;
            histogram.blue[usize::from(pixel.blue)] += 1;
        }
        histogram
    }
}

/// The perceptual luminance of a color: `0.2126 R + 0.7152 G + 0.0722 B`.
#[must_use]
pub fn luminance(color: Srgb<u8>) -> f64 {
    0.2126 * f64::from(color.red) + 0.7152 * f64::from(color.green) + 0.0722 * f64::from(color.blue)
}

/// Collects the unique colors of a raster, brightest first.
///
/// Each pixel contributes its `(R, G, B)` with alpha forced to opaque, so
/// colors differing only in alpha collapse to one entry. The result is
/// sorted descending by [`luminance`], with equal-luminance colors ordered
/// by their channel values to keep the output deterministic.
///
/// This walks every pixel and sorts the unique set, which is the expensive
/// analysis; build it on demand, not per edit.
#[must_use]
pub fn build_palette(buffer: &PixelBuffer) -> Vec<Srgba<u8>> {
    let mut seen = HashSet::new();
    let mut colors = Vec::new();
    for pixel in buffer.pixels() {
        let key = [pixel.red, pixel.green, pixel.blue];
        if seen.insert(key) {
            colors.push(Srgba::new(pixel.red, pixel.green, pixel.blue, 255));
        }
    }
    colors.sort_unstable_by_key(|color| {
        (
            Reverse(OrderedFloat(luminance(color.color))),
            color.red,
            color.green,
            color.blue,
        )
    });
    colors
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::tests::test_buffer;

    #[test]
    fn channel_sums_equal_the_pixel_count() {
        let buffer = test_buffer(37, 23);
        let histogram = Histogram::build(&buffer);

        let count = buffer.pixel_count() as u32;
        assert_eq!(histogram.red.iter().sum::<u32>(), count);
        assert_eq!(histogram.green.iter().sum::<u32>(), count);
        assert_eq!(histogram.blue.iter().sum::<u32>(), count);
    }

    #[test]
    fn counts_land_on_the_right_values() {
        let buffer =
            PixelBuffer::new(3, 1, vec![5, 0, 9, 255, 5, 9, 0, 255, 0, 9, 9, 255]).unwrap();
        let histogram = Histogram::build(&buffer);

        assert_eq!(histogram.red[5], 2);
        assert_eq!(histogram.red[0], 1);
        assert_eq!(histogram.green[9], 2);
        assert_eq!(histogram.green[0], 1);
        assert_eq!(histogram.blue[9], 2);
        assert_eq!(histogram.blue[0], 1);
    }

    #[test]
    fn rebuilding_is_reproducible() {
        let buffer = test_buffer(16, 16);
        assert_eq!(Histogram::build(&buffer), Histogram::build(&buffer));
    }

    #[test]
    fn palette_deduplicates_and_ignores_alpha() {
        let buffer = PixelBuffer::new(2, 2, vec![
            10, 20, 30, 255,
            10, 20, 30, 7, // same color, different alpha
            10, 20, 30, 255,
            200, 20, 30, 0,
        ])
        .unwrap();

        let palette = build_palette(&buffer);
        assert_eq!(
            palette,
            vec![Srgba::new(200, 20, 30, 255), Srgba::new(10, 20, 30, 255)]
        );
    }

    #[test]
    fn palette_sorts_brightest_first() {
        let buffer = PixelBuffer::new(5, 1, vec![
            0, 0, 255, 255, // blue
            255, 255, 255, 255, // white
            0, 0, 0, 255, // black
            255, 0, 0, 255, // red
            0, 255, 0, 255, // green
        ])
        .unwrap();

        let palette = build_palette(&buffer);
        let expected = [
            Srgba::new(255, 255, 255, 255),
            Srgba::new(0, 255, 0, 255),
            Srgba::new(255, 0, 0, 255),
            Srgba::new(0, 0, 255, 255),
            Srgba::new(0, 0, 0, 255),
        ];
        assert_eq!(palette, expected);
    }

    #[test]
    fn luminance_weighs_green_heaviest() {
        assert!(luminance(Srgb::new(0, 255, 0)) > luminance(Srgb::new(255, 0, 0)));
        assert!(luminance(Srgb::new(255, 0, 0)) > luminance(Srgb::new(0, 0, 255)));
        assert!((luminance(Srgb::new(255, 255, 255)) - 255.0).abs() < 1e-9);
    }
}
