//! Contains the pixel buffer type filters operate on.

use palette::{
    cast::{ComponentsAs, ComponentsAsMut},
    Srgb, Srgba,
};
use std::{
    error::Error,
    fmt::{Debug, Display},
};
#[cfg(feature = "image")]
use image::RgbaImage;

/// An error type for when the length of a byte buffer does not match the
/// dimensions it was paired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSizeMismatch {
    /// The length implied by the dimensions: `width * height * 4`.
    pub expected: u64,
    /// The actual length of the provided buffer.
    pub actual: u64,
}

impl Display for BufferSizeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "buffer length of {} does not match the expected RGBA length of {}",
            self.actual, self.expected
        )
    }
}

impl Error for BufferSizeMismatch {}

/// An owned, interleaved 8-bit RGBA raster.
///
/// The invariant `pixels.len() == width * height * 4` is checked on
/// construction, so every downstream pass can assume whole pixels.
/// Channel order is `R,G,B,A`.
///
/// A buffer loaded from an image is treated as the *source*: it is never
/// mutated after creation and is the baseline every pipeline run copies from.
/// The copies the pipeline mutates in place are *working* buffers.
///
/// # Examples
/// From raw bytes:
/// ```
/// # use filtrate::{PixelBuffer, BufferSizeMismatch};
/// # fn main() -> Result<(), BufferSizeMismatch> {
/// let buffer = PixelBuffer::new(1, 2, vec![255, 0, 0, 255, 0, 99, 0, 255])?;
/// # Ok(())
/// # }
/// ```
///
/// From an image (needs the `image` feature to be enabled):
/// ```no_run
/// # use filtrate::PixelBuffer;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let img = image::open("some image")?.into_rgba8();
/// let buffer = PixelBuffer::from(&img);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Width in pixels.
    width: u32,
    /// Height in pixels.
    height: u32,
    /// Interleaved `R,G,B,A` bytes, row-major from the top-left pixel.
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Creates a [`PixelBuffer`] from interleaved RGBA bytes.
    ///
    /// # Errors
    /// Returns [`BufferSizeMismatch`] if `pixels.len() != width * height * 4`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, BufferSizeMismatch> {
        let expected = u64::from(width) * u64::from(height) * 4;
        if pixels.len() as u64 == expected {
            Ok(Self { width, height, pixels })
        } else {
            Err(BufferSizeMismatch { expected, actual: pixels.len() as u64 })
        }
    }

    /// The width of the raster in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// The height of the raster in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The number of pixels in the raster.
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        self.pixels.len() / 4
    }

    /// Whether the raster contains no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// The raw interleaved RGBA bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// The raw interleaved RGBA bytes, mutably.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// The raster as a slice of typed pixels.
    #[must_use]
    pub fn pixels(&self) -> &[Srgba<u8>] {
        self.pixels.components_as()
    }

    /// The raster as a mutable slice of typed pixels.
    pub fn pixels_mut(&mut self) -> &mut [Srgba<u8>] {
        self.pixels.components_as_mut()
    }

    /// The flat pixel index of the coordinate `(x, y)`.
    ///
    /// Coordinates are not validated here; callers that walk past the
    /// raster edge must check bounds themselves.
    #[must_use]
    pub const fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize) + x as usize
    }

    /// Reads the pixel at `(x, y)`.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Srgba<u8> {
        self.pixels()[self.index(x, y)]
    }

    /// Writes the pixel at `(x, y)`.
    pub fn set(&mut self, x: u32, y: u32, pixel: Srgba<u8>) {
        let i = self.index(x, y);
        self.pixels_mut()[i] = pixel;
    }

    /// The pixel population as a flat list of opaque colors, alpha dropped.
    ///
    /// This is the input shape the k-means clusterer takes.
    #[must_use]
    pub fn rgb_colors(&self) -> Vec<Srgb<u8>> {
        self.pixels().iter().map(|p| p.color).collect()
    }

    /// Consumes the buffer, returning the raw bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }
}

#[cfg(feature = "image")]
impl From<&RgbaImage> for PixelBuffer {
    fn from(image: &RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            pixels: image.as_raw().clone(),
        }
    }
}

#[cfg(feature = "image")]
impl PixelBuffer {
    /// Copies the buffer into an [`RgbaImage`] for display or encoding.
    #[must_use]
    pub fn to_rgba_image(&self) -> RgbaImage {
        #[allow(clippy::expect_used)]
        {
            // the length invariant makes from_raw infallible here
            RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
                .expect("buffer length matches dimensions")
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn length_must_match_dimensions() {
        assert_eq!(
            PixelBuffer::new(2, 2, vec![0; 12]),
            Err(BufferSizeMismatch { expected: 16, actual: 12 })
        );
        // a multiple of 4 that still disagrees with the dimensions is rejected
        assert_eq!(
            PixelBuffer::new(1, 1, vec![0; 8]),
            Err(BufferSizeMismatch { expected: 4, actual: 8 })
        );
        assert!(PixelBuffer::new(2, 2, vec![0; 16]).is_ok());
        assert!(PixelBuffer::new(0, 0, Vec::new()).is_ok());
    }

    #[test]
    fn typed_views_share_the_bytes() {
        let mut buffer = PixelBuffer::new(1, 2, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(buffer.pixels()[1], Srgba::new(5, 6, 7, 8));

        buffer.pixels_mut()[0] = Srgba::new(9, 8, 7, 6);
        assert_eq!(buffer.as_bytes(), &[9, 8, 7, 6, 5, 6, 7, 8]);
    }

    #[test]
    fn coordinate_access_is_row_major() {
        let buffer = crate::tests::test_buffer(3, 2);
        assert_eq!(buffer.index(2, 1), 5);
        assert_eq!(buffer.get(2, 1), buffer.pixels()[5]);
    }

    #[test]
    fn rgb_colors_drop_alpha() {
        let buffer = PixelBuffer::new(1, 1, vec![10, 20, 30, 40]).unwrap();
        assert_eq!(buffer.rgb_colors(), vec![Srgb::new(10, 20, 30)]);
    }
}
