//! Contains the error-diffusion dither pass.

use crate::{PixelBuffer, QuantizeLut};
use palette::Srgba;

/// The neighbor offsets and weights error is diffused over, in application
/// order: right, below-left, below, below-right.
const DIFFUSION: [(i64, i64, f32); 4] = [
    (1, 0, 7.0 / 16.0),
    (-1, 1, 3.0 / 16.0),
    (0, 1, 5.0 / 16.0),
    (1, 1, 1.0 / 16.0),
];

/// Floyd–Steinberg dithering against a quantized channel range.
///
/// Each pixel's R, G, and B are snapped into the configured number of
/// quantization buckets, and the rounding error is pushed onto neighbors
/// that have not been visited yet so gradients survive the reduced range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloydSteinberg(u8);

impl FloydSteinberg {
    /// Creates a ditherer that quantizes channels into `buckets` buckets.
    #[must_use]
    pub const fn new(buckets: u8) -> Self {
        Self(buckets)
    }

    /// The configured bucket count.
    #[must_use]
    pub const fn buckets(&self) -> u8 {
        self.0
    }

    /// Dithers the buffer in place.
    ///
    /// Pixels are visited in strict row-major order, top to bottom and left
    /// to right. That order is load bearing: error lands on pixels that are
    /// read later in the same scan, so a different traversal produces a
    /// different image. Every visited pixel and every error write leaves
    /// alpha forced to opaque.
    ///
    /// Deterministic: re-running on the same input with the same bucket
    /// count reproduces the output byte for byte.
    pub fn dither(&self, buffer: &mut PixelBuffer, lut: &mut QuantizeLut) {
        let table = lut.table(self.0);
        let (width, height) = (buffer.width(), buffer.height());

        for y in 0..height {
            for x in 0..width {
                let old = buffer.get(x, y);
                let new = Srgba::new(
                    table[usize::from(old.red)],
                    table[usize::from(old.green)],
                    table[usize::from(old.blue)],
                    255,
                );
                buffer.set(x, y, new);

                // quantization floors, so the error is never negative
                let err = [old.red - new.red, old.green - new.green, old.blue - new.blue];
                for (dx, dy, weight) in DIFFUSION {
                    diffuse(buffer, i64::from(x) + dx, i64::from(y) + dy, err, weight);
                }
            }
        }
    }
}

/// Adds a weighted share of `err` onto the pixel at `(x, y)`, skipping
/// coordinates outside the raster.
fn diffuse(buffer: &mut PixelBuffer, x: i64, y: i64, err: [u8; 3], weight: f32) {
    if x < 0 || y < 0 || x >= i64::from(buffer.width()) || y >= i64::from(buffer.height()) {
        return;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (x, y) = (x as u32, y as u32);

    let current = buffer.get(x, y);
    buffer.set(
        x,
        y,
        Srgba::new(
            add_error(current.red, err[0], weight),
            add_error(current.green, err[1], weight),
            add_error(current.blue, err[2], weight),
            255,
        ),
    );
}

/// `value + trunc(err * weight)`, clamped into byte range.
fn add_error(value: u8, err: u8, weight: f32) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let share = (f32::from(err) * weight) as u16;
    #[allow(clippy::cast_possible_truncation)]
    {
        (u16::from(value) + share).min(255) as u8
    }
}
