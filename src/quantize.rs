//! Band quantization and the lookup-table cache behind it.

use crate::{PixelBuffer, CHANNEL_VALUES};

/// Quantizes an 8-bit channel value into `bands` evenly spaced bands,
/// snapping the value down to its band's floor.
///
/// The band width is `255 / (bands + 1)` with integer truncation. Two band
/// counts are special cased: `0` collapses every value to `0`, and `1` is a
/// passthrough. Band counts high enough to produce a zero band width
/// (`255` is the only one) are also a passthrough.
///
/// This is the canonical formula. Per-pixel passes must go through a
/// [`QuantizeLut`] table instead of calling this in a loop.
#[must_use]
pub fn quantize(bands: u8, value: u8) -> u8 {
    match bands {
        0 => 0,
        1 => value,
        _ => {
            let width = 255 / (u16::from(bands) + 1);
            if width == 0 {
                value
            } else {
                #[allow(clippy::cast_possible_truncation)]
                {
                    // flooring to a band keeps the result within u8 range
                    (u16::from(value) / width * width) as u8
                }
            }
        }
    }
}

/// Builds the full 256-entry table for one band count.
#[allow(clippy::cast_possible_truncation)]
fn build_table(bands: u8) -> Box<[u8; CHANNEL_VALUES]> {
    let mut table = Box::new([0; CHANNEL_VALUES]);
    for (value, slot) in table.iter_mut().enumerate() {
        *slot = quantize(bands, value as u8);
    }
    table
}

/// A cache of quantization tables, keyed by band count.
///
/// Each table maps every input byte to [`quantize`]`(bands, input)` and is
/// built on first use, so the hot path of the quantizer and ditherer is a
/// single indexed load per channel. The cache is owned by the component
/// performing quantization (see [`Pipeline`](crate::Pipeline)) rather than
/// living in process-wide state, and can be dropped or
/// [`invalidate`](QuantizeLut::invalidate)d explicitly.
#[derive(Debug, Clone)]
pub struct QuantizeLut {
    /// One lazily built table per possible band count.
    tables: [Option<Box<[u8; CHANNEL_VALUES]>>; CHANNEL_VALUES],
}

impl QuantizeLut {
    /// Creates an empty cache. No tables are built until requested.
    #[must_use]
    pub fn new() -> Self {
        Self { tables: std::array::from_fn(|_| None) }
    }

    /// The quantization table for `bands`, building it on first use.
    pub fn table(&mut self, bands: u8) -> &[u8; CHANNEL_VALUES] {
        self.tables[usize::from(bands)].get_or_insert_with(|| build_table(bands))
    }

    /// Drops every cached table.
    ///
    /// Needed only if the canonical formula's inputs could have changed out
    /// from under the cache; stale entries are a correctness bug.
    pub fn invalidate(&mut self) {
        self.tables = std::array::from_fn(|_| None);
    }

    /// The number of band counts with a built table.
    #[must_use]
    pub fn built_tables(&self) -> usize {
        self.tables.iter().filter(|t| t.is_some()).count()
    }
}

impl Default for QuantizeLut {
    fn default() -> Self {
        Self::new()
    }
}

/// Quantizes the R, G, and B channels of every pixel in `working` into
/// `bands` bands, reading the cached table.
///
/// The alpha channel is never quantized: it is copied back from the pristine
/// `source` buffer at the same pixel, undoing whatever earlier passes left
/// there.
pub fn band_quantize(
    working: &mut PixelBuffer,
    source: &PixelBuffer,
    bands: u8,
    lut: &mut QuantizeLut,
) {
    let table = lut.table(bands);
    for (pixel, original) in working.pixels_mut().iter_mut().zip(source.pixels()) {
        pixel.red = table[usize::from(pixel.red)];
        pixel.green = table[usize::from(pixel.green)];
        pixel.blue = table[usize::from(pixel.blue)];
        pixel.alpha = original.alpha;
    }
}
