//! The filter pipeline: the closed set of filter kinds, their application
//! order, their settings, and the orchestrator that re-derives a working
//! buffer from a pristine source.

use crate::{
    band_quantize, box_blur, brightness, channel_tint, grayscale, FloydSteinberg, PixelBuffer,
    QuantizeLut, FILTER_COUNT,
};
use std::{fmt::Display, time::Instant};

/// The closed set of filters the pipeline can apply.
///
/// Being an enum (rather than, say, string keys) means a misspelled filter
/// cannot silently drop out of the pipeline, and the orchestrator's match
/// is checked for exhaustiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Replace R, G, B with their mean. See [`grayscale`].
    Grayscale,
    /// Snap channels into evenly spaced bands. See [`band_quantize`].
    BandQuantizer,
    /// Floyd–Steinberg dithering. See [`FloydSteinberg`].
    ErrorDiffusion,
    /// Per-channel multiply. See [`channel_tint`].
    ChannelTint,
    /// Iterated 3x3 mean filtering. See [`box_blur`].
    BoxBlur,
    /// Lighten or darken. See [`brightness`]. Always applied; it has no
    /// enable flag and `amount == 0` is the identity.
    Brightness,
}

impl FilterKind {
    /// A short lowercase label for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::BandQuantizer => "band quantizer",
            Self::ErrorDiffusion => "error diffusion",
            Self::ChannelTint => "channel tint",
            Self::BoxBlur => "box blur",
            Self::Brightness => "brightness",
        }
    }
}

impl Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The order filters are applied in.
///
/// Always a permutation of all six [`FilterKind`]s: it starts from the
/// default order and is only ever mutated by [`promote`](Self::promote) and
/// [`demote`](Self::demote) adjacent swaps, never reordered wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOrder([FilterKind; FILTER_COUNT]);

impl FilterOrder {
    /// The filters in application order.
    #[must_use]
    pub fn as_slice(&self) -> &[FilterKind] {
        &self.0
    }

    /// The position of `kind` in the order.
    #[must_use]
    pub fn position(&self, kind: FilterKind) -> usize {
        #[allow(clippy::expect_used)]
        {
            // the order is always a permutation of every kind
            self.0.iter().position(|&k| k == kind).expect("every kind is present")
        }
    }

    /// Swaps the filter at `index` with the one applied just before it, so
    /// it runs earlier. Returns whether anything moved; the first slot and
    /// out-of-range indices are no-ops.
    pub fn promote(&mut self, index: usize) -> bool {
        if index == 0 || index >= FILTER_COUNT {
            log::debug!("ignored promote at index {index}");
            return false;
        }
        self.0.swap(index, index - 1);
        true
    }

    /// Swaps the filter at `index` with the one applied just after it, so
    /// it runs later. Returns whether anything moved; the last slot and
    /// out-of-range indices are no-ops.
    pub fn demote(&mut self, index: usize) -> bool {
        if index + 1 >= FILTER_COUNT {
            log::debug!("ignored demote at index {index}");
            return false;
        }
        self.0.swap(index, index + 1);
        true
    }
}

impl Default for FilterOrder {
    /// The order the editor starts with.
    fn default() -> Self {
        Self([
            FilterKind::Grayscale,
            FilterKind::BandQuantizer,
            FilterKind::ErrorDiffusion,
            FilterKind::ChannelTint,
            FilterKind::BoxBlur,
            FilterKind::Brightness,
        ])
    }
}

/// Enable flags and parameters for every filter.
///
/// Mutated freely by the caller between runs and read-only during a run.
/// Derives `PartialEq` so a caller can skip a run when nothing changed;
/// the pipeline itself never debounces.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSettings {
    /// Whether the grayscale filter runs.
    pub grayscale: bool,
    /// Whether the channel tint filter runs.
    pub tint: bool,
    /// Per-channel tint factors, each in `[0, 1]`.
    pub tint_factors: [f32; 3],
    /// Whether the band quantizer runs.
    pub quantize: bool,
    /// Band count for the quantizer, `0..=255`.
    pub quantize_bands: u8,
    /// Whether the error-diffusion ditherer runs.
    pub dither: bool,
    /// Quantization bucket count for the ditherer, `0..=255`.
    pub dither_buckets: u8,
    /// Whether the box blur runs.
    pub blur: bool,
    /// How many box blur passes run.
    pub blur_iterations: u32,
    /// Brightness amount in `[-1, 1]`. There is no enable flag; `0.0`
    /// leaves the image unchanged.
    pub brightness: f64,
}

impl Default for FilterSettings {
    /// Everything disabled, with the parameter values the editor starts
    /// with.
    fn default() -> Self {
        Self {
            grayscale: false,
            tint: false,
            tint_factors: [1.0, 1.0, 1.0],
            quantize: false,
            quantize_bands: 50,
            dither: false,
            dither_buckets: 190,
            blur: false,
            blur_iterations: 3,
            brightness: 0.0,
        }
    }
}

/// Runs the configured filters over copies of a pristine source buffer.
///
/// The pipeline owns the [`QuantizeLut`] shared by the quantizer and the
/// ditherer, so tables built on one run are reused by the next.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    /// Quantization tables shared across runs and filters.
    lut: QuantizeLut,
}

impl Pipeline {
    /// Creates a pipeline with an empty table cache.
    #[must_use]
    pub fn new() -> Self {
        Self { lut: QuantizeLut::new() }
    }

    /// Drops the cached quantization tables.
    pub fn invalidate_tables(&mut self) {
        self.lut.invalidate();
    }

    /// Copies `source` and applies the enabled filters to the copy in
    /// `order`, returning the filtered working buffer.
    ///
    /// `source` itself is never written to; the copy is verified
    /// byte-for-byte before any filter runs.
    ///
    /// # Panics
    /// Panics if the copy verification fails. Pixel data corrupted before
    /// the first filter has no recoverable state, so this is fatal rather
    /// than an `Err`.
    pub fn run(
        &mut self,
        source: &PixelBuffer,
        order: &FilterOrder,
        settings: &FilterSettings,
    ) -> PixelBuffer {
        log::info!("applying filters");
        let run_start = Instant::now();

        let mut working = source.clone();
        if working.as_bytes() != source.as_bytes() {
            log::error!("pixels copied incorrectly");
            panic!("working buffer does not match its source after copy");
        }

        for &kind in order.as_slice() {
            let start = Instant::now();
            let applied = match kind {
                FilterKind::Grayscale if settings.grayscale => {
                    grayscale(&mut working);
                    true
                }
                FilterKind::BandQuantizer if settings.quantize => {
                    band_quantize(&mut working, source, settings.quantize_bands, &mut self.lut);
                    true
                }
                FilterKind::ErrorDiffusion if settings.dither => {
                    FloydSteinberg::new(settings.dither_buckets).dither(&mut working, &mut self.lut);
                    true
                }
                FilterKind::ChannelTint if settings.tint => {
                    channel_tint(&mut working, settings.tint_factors);
                    true
                }
                FilterKind::BoxBlur if settings.blur => {
                    box_blur(&mut working, settings.blur_iterations);
                    true
                }
                FilterKind::Brightness => {
                    brightness(&mut working, settings.brightness);
                    true
                }
                FilterKind::Grayscale
                | FilterKind::BandQuantizer
                | FilterKind::ErrorDiffusion
                | FilterKind::ChannelTint
                | FilterKind::BoxBlur => false,
            };
            if applied {
                log::debug!("{kind} filter took {:.2}ms", start.elapsed().as_secs_f64() * 1e3);
            }
        }

        log::info!("pipeline run took {:.2}ms", run_start.elapsed().as_secs_f64() * 1e3);
        working
    }
}
