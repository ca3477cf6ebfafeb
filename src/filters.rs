//! Contains the point and area filter passes without tables or state of
//! their own: grayscale, channel tint, box blur, and brightness.
//!
//! Every pass mutates a working [`PixelBuffer`] in place and leaves the
//! alpha channel alone.

use crate::PixelBuffer;
use palette::Srgba;

/// Replaces R, G, and B of every pixel with their truncated integer mean.
///
/// Idempotent: once the channels are equal the mean is that value.
pub fn grayscale(buffer: &mut PixelBuffer) {
    for pixel in buffer.pixels_mut() {
        #[allow(clippy::cast_possible_truncation)]
        let mean = ((u16::from(pixel.red) + u16::from(pixel.green) + u16::from(pixel.blue)) / 3)
            as u8;
        pixel.red = mean;
        pixel.green = mean;
        pixel.blue = mean;
    }
}

/// Scales each of R, G, and B by its own factor, truncating the product.
///
/// Factors are expected in `[0, 1]`; each product goes through a plain
/// float-to-`u8` cast, which truncates toward zero and saturates at the type
/// bounds for anything a factor outside that range produces.
pub fn channel_tint(buffer: &mut PixelBuffer, factors: [f32; 3]) {
    for pixel in buffer.pixels_mut() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            pixel.red = (f32::from(pixel.red) * factors[0]) as u8;
            pixel.green = (f32::from(pixel.green) * factors[1]) as u8;
            pixel.blue = (f32::from(pixel.blue) * factors[2]) as u8;
        }
    }
}

/// Lightens or darkens every pixel by scaling R, G, and B with
/// `amount + 1`, truncating, and clamping to `[0, 255]`.
///
/// `amount` ranges over `[-1, 1]`: `-1` forces black, `0` is the identity,
/// and `1` overshoots into the clamp.
pub fn brightness(buffer: &mut PixelBuffer, amount: f64) {
    let scale = amount + 1.0;
    for pixel in buffer.pixels_mut() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            pixel.red = (f64::from(pixel.red) * scale).clamp(0.0, 255.0) as u8;
            pixel.green = (f64::from(pixel.green) * scale).clamp(0.0, 255.0) as u8;
            pixel.blue = (f64::from(pixel.blue) * scale).clamp(0.0, 255.0) as u8;
        }
    }
}

/// Runs `iterations` in-place passes of 3x3 unweighted mean filtering over
/// the interior pixels.
///
/// Each interior pixel becomes the integer mean of R, G, B, and A over its
/// 3x3 neighborhood *as the buffer currently stands*, so within a pass the
/// left and upper neighbors have already been blurred, and pass `N + 1`
/// blurs the output of pass `N`. The 1-pixel border is never touched and
/// keeps the original image sharp at the edges.
pub fn box_blur(buffer: &mut PixelBuffer, iterations: u32) {
    let (width, height) = (buffer.width(), buffer.height());
    if width < 3 || height < 3 {
        // no interior pixels to blur
        return;
    }

    for _ in 0..iterations {
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let (mut r, mut g, mut b, mut a) = (0u32, 0u32, 0u32, 0u32);
                for ny in y - 1..=y + 1 {
                    for nx in x - 1..=x + 1 {
                        let pixel = buffer.get(nx, ny);
                        r += u32::from(pixel.red);
                        g += u32::from(pixel.green);
                        b += u32::from(pixel.blue);
                        a += u32::from(pixel.alpha);
                    }
                }
                #[allow(clippy::cast_possible_truncation)]
                buffer.set(
                    x,
                    y,
                    Srgba::new((r / 9) as u8, (g / 9) as u8, (b / 9) as u8, (a / 9) as u8),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::tests::test_buffer;

    #[test]
    fn grayscale_truncates_the_channel_mean() {
        let mut buffer = PixelBuffer::new(1, 2, vec![255, 0, 0, 255, 0, 99, 0, 255]).unwrap();
        grayscale(&mut buffer);
        assert_eq!(buffer.as_bytes(), &[85, 85, 85, 255, 33, 33, 33, 255]);
    }

    #[test]
    fn grayscale_leaves_alpha_alone() {
        let mut buffer = PixelBuffer::new(1, 2, vec![255, 0, 0, 34, 0, 255, 0, 75]).unwrap();
        grayscale(&mut buffer);
        assert_eq!(buffer.pixels()[0].alpha, 34);
        assert_eq!(buffer.pixels()[1].alpha, 75);
    }

    #[test]
    fn grayscale_is_idempotent() {
        let mut once = test_buffer(16, 16);
        grayscale(&mut once);
        let mut twice = once.clone();
        grayscale(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn unit_tint_is_identity() {
        let mut buffer = test_buffer(8, 8);
        let original = buffer.clone();
        channel_tint(&mut buffer, [1.0, 1.0, 1.0]);
        assert_eq!(buffer, original);
    }

    #[test]
    fn tint_truncates_per_channel() {
        let mut buffer = PixelBuffer::new(1, 1, vec![255, 101, 40, 200]).unwrap();
        channel_tint(&mut buffer, [0.5, 0.1, 0.0]);
        // 127.5, 10.1, and 0.0 truncate toward zero; alpha is untouched
        assert_eq!(buffer.as_bytes(), &[127, 10, 0, 200]);
    }

    #[test]
    fn zero_brightness_is_identity() {
        let mut buffer = test_buffer(8, 8);
        let original = buffer.clone();
        brightness(&mut buffer, 0.0);
        assert_eq!(buffer, original);
    }

    #[test]
    fn brightness_extremes_clamp() {
        let mut buffer = PixelBuffer::new(1, 1, vec![200, 128, 255, 9]).unwrap();
        brightness(&mut buffer, 1.0);
        assert_eq!(buffer.as_bytes(), &[255, 255, 255, 9]);

        let mut buffer = PixelBuffer::new(1, 1, vec![200, 128, 1, 9]).unwrap();
        brightness(&mut buffer, -1.0);
        assert_eq!(buffer.as_bytes(), &[0, 0, 0, 9]);
    }

    #[test]
    fn brightness_scales_midtones() {
        let mut buffer = PixelBuffer::new(1, 1, vec![100, 60, 0, 255]).unwrap();
        brightness(&mut buffer, 0.5);
        assert_eq!(buffer.as_bytes(), &[150, 90, 0, 255]);
    }

    #[test]
    fn zero_blur_iterations_is_identity() {
        let mut buffer = test_buffer(8, 8);
        let original = buffer.clone();
        box_blur(&mut buffer, 0);
        assert_eq!(buffer, original);
    }

    #[test]
    fn blur_without_interior_is_identity() {
        let mut buffer = test_buffer(2, 2);
        let original = buffer.clone();
        box_blur(&mut buffer, 5);
        assert_eq!(buffer, original);
    }

    #[test]
    fn blur_averages_the_neighborhood_and_skips_the_border() {
        // a lone bright center pixel in a 3x3 raster
        let mut pixels = vec![0; 36];
        pixels[16..20].copy_from_slice(&[90, 18, 36, 72]);
        let mut buffer = PixelBuffer::new(3, 3, pixels).unwrap();
        let original = buffer.clone();

        box_blur(&mut buffer, 1);

        assert_eq!(buffer.get(1, 1), Srgba::new(10, 2, 4, 8));
        for (i, (pixel, before)) in buffer.pixels().iter().zip(original.pixels()).enumerate() {
            if i != 4 {
                assert_eq!(pixel, before, "border pixel {i} changed");
            }
        }
    }

    #[test]
    fn blur_reads_pixels_updated_earlier_in_the_pass() {
        // 4x3: interior pixels are (1,1) and (2,1); the second must see the
        // first's freshly written value, not the pass-input value
        let mut buffer = PixelBuffer::new(4, 3, vec![0; 48]).unwrap();
        buffer.set(1, 1, Srgba::new(90, 0, 0, 0));

        box_blur(&mut buffer, 1);

        assert_eq!(buffer.get(1, 1).red, 10);
        assert_eq!(buffer.get(2, 1).red, 1);
    }
}
