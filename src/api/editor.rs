//! Contains the [`Editor`] application-state struct for the high level API.

use crate::{
    build_palette, FilterOrder, FilterSettings, Histogram, Pipeline, PixelBuffer,
};
#[cfg(feature = "image")]
use image::RgbaImage;
use palette::Srgba;
#[cfg(feature = "kmeans")]
use {crate::kmeans, palette::Srgb};

/// The full editing state for one loaded image.
///
/// An [`Editor`] is an explicitly constructed value the host passes through
/// its call graph; the core keeps no global state. It owns the pristine
/// source buffer, the filter configuration, the last filtered working
/// buffer, and the histogram derived from it.
///
/// Mutate [`settings`](Self::settings) and [`order`](Self::order) freely
/// between runs, then call [`refresh`](Self::refresh) to re-derive the
/// working buffer and histogram from the source. A run is never interrupted
/// or cancelled; interactive hosts should debounce by checking
/// [`is_dirty`](Self::is_dirty) before triggering another one.
///
/// # Examples
/// ```
/// # use filtrate::{Editor, PixelBuffer, BufferSizeMismatch};
/// # fn main() -> Result<(), BufferSizeMismatch> {
/// let source = PixelBuffer::new(1, 2, vec![255, 0, 0, 255, 0, 99, 0, 255])?;
/// let mut editor = Editor::new(source);
///
/// editor.settings.grayscale = true;
/// assert!(editor.is_dirty());
///
/// editor.refresh();
/// assert_eq!(editor.working().as_bytes()[0], 85);
/// assert!(!editor.is_dirty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Editor {
    /// The pristine buffer every refresh starts from. Never mutated.
    source: PixelBuffer,
    /// Filter enable flags and parameters, read on refresh.
    pub settings: FilterSettings,
    /// Filter application order, read on refresh.
    pub order: FilterOrder,
    /// The pipeline, carrying the quantization table cache.
    pipeline: Pipeline,
    /// The most recent filtered output.
    working: PixelBuffer,
    /// Channel histograms of `working`.
    histogram: Histogram,
    /// The configuration the working buffer was derived with, for
    /// dirty-checking. `None` until the first refresh.
    applied: Option<(FilterSettings, FilterOrder)>,
}

impl Editor {
    /// Creates an editor around a freshly loaded source buffer.
    ///
    /// The working buffer starts as an unfiltered copy of the source.
    #[must_use]
    pub fn new(source: PixelBuffer) -> Self {
        let working = source.clone();
        let histogram = Histogram::build(&working);
        Self {
            source,
            settings: FilterSettings::default(),
            order: FilterOrder::default(),
            pipeline: Pipeline::new(),
            working,
            histogram,
            applied: None,
        }
    }

    /// Replaces the loaded image, keeping the current configuration.
    ///
    /// The working buffer and histogram reset to the new, unfiltered
    /// source; call [`refresh`](Self::refresh) to filter it.
    pub fn load(&mut self, source: PixelBuffer) {
        log::info!(
            "loading a {}x{} image into the editor",
            source.width(),
            source.height()
        );
        self.working = source.clone();
        self.source = source;
        self.histogram = Histogram::build(&self.working);
        self.applied = None;
    }

    /// Re-derives the working buffer from the pristine source under the
    /// current settings and order, then rebuilds the histogram from it.
    ///
    /// Runs unconditionally; this finishing is the signal that the image
    /// changed, so consumers can re-read [`working`](Self::working) and
    /// [`histogram`](Self::histogram).
    pub fn refresh(&mut self) -> &PixelBuffer {
        self.working = self.pipeline.run(&self.source, &self.order, &self.settings);
        self.histogram = Histogram::build(&self.working);
        self.applied = Some((self.settings.clone(), self.order));
        &self.working
    }

    /// Whether the current configuration differs from the one the working
    /// buffer was derived with.
    ///
    /// Structural comparison, no hashing; hosts use this to debounce
    /// [`refresh`](Self::refresh) calls from their edit loop.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.applied
            .as_ref()
            .map_or(true, |(settings, order)| {
                settings != &self.settings || order != &self.order
            })
    }

    /// Calls [`refresh`](Self::refresh) only when [`is_dirty`](Self::is_dirty),
    /// returning whether a run happened.
    pub fn refresh_if_dirty(&mut self) -> bool {
        if self.is_dirty() {
            self.refresh();
            true
        } else {
            false
        }
    }

    /// The pristine source buffer.
    #[must_use]
    pub fn source(&self) -> &PixelBuffer {
        &self.source
    }

    /// The filtered output of the last refresh (or the unfiltered source
    /// before the first one).
    #[must_use]
    pub fn working(&self) -> &PixelBuffer {
        &self.working
    }

    /// Channel histograms of the working buffer.
    #[must_use]
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// The unique colors of the working buffer, brightest first.
    ///
    /// Walks every pixel and sorts; build on demand rather than per edit.
    #[must_use]
    pub fn palette(&self) -> Vec<Srgba<u8>> {
        build_palette(&self.working)
    }

    /// Clusters the working buffer's pixels around `initial_means`.
    ///
    /// See [`kmeans::cluster`]; [`kmeans::DEFAULT_MAX_ITERATIONS`] is a
    /// reasonable bound when the host has no better number.
    #[cfg(feature = "kmeans")]
    #[must_use]
    pub fn cluster(
        &self,
        initial_means: &[Srgb<u8>],
        max_iterations: u32,
    ) -> kmeans::ClusterOutput {
        kmeans::cluster(&self.working.rgb_colors(), initial_means, max_iterations)
    }

    /// Drops the cached quantization tables.
    pub fn invalidate_tables(&mut self) {
        self.pipeline.invalidate_tables();
    }
}

#[cfg(feature = "image")]
impl Editor {
    /// Creates an editor from a decoded image.
    #[must_use]
    pub fn from_image(image: &RgbaImage) -> Self {
        Self::new(PixelBuffer::from(image))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::tests::test_buffer;

    #[test]
    fn refresh_rebuilds_buffer_and_histogram() {
        let mut editor = Editor::new(test_buffer(8, 8));
        let unfiltered_histogram = editor.histogram().clone();

        editor.settings.grayscale = true;
        editor.refresh();

        assert_ne!(editor.working(), editor.source());
        assert_ne!(editor.histogram(), &unfiltered_histogram);
        // grayscale output histograms agree across all three channels
        assert_eq!(editor.histogram().red, editor.histogram().green);
        assert_eq!(editor.histogram().green, editor.histogram().blue);
    }

    #[test]
    fn dirty_tracks_settings_and_order() {
        let mut editor = Editor::new(test_buffer(4, 4));
        assert!(editor.is_dirty());

        assert!(editor.refresh_if_dirty());
        assert!(!editor.is_dirty());
        assert!(!editor.refresh_if_dirty());

        editor.settings.brightness = 0.5;
        assert!(editor.is_dirty());
        editor.refresh();
        assert!(!editor.is_dirty());

        editor.order.demote(0);
        assert!(editor.is_dirty());
    }

    #[test]
    fn load_resets_the_derived_state() {
        let mut editor = Editor::new(test_buffer(4, 4));
        editor.settings.grayscale = true;
        editor.refresh();

        let replacement = test_buffer(6, 2);
        editor.load(replacement.clone());

        assert_eq!(editor.source(), &replacement);
        assert_eq!(editor.working(), &replacement);
        assert_eq!(editor.histogram(), &Histogram::build(&replacement));
        assert!(editor.is_dirty());
        // settings survive a load
        assert!(editor.settings.grayscale);
    }

    #[test]
    fn palette_reads_the_working_buffer() {
        let source = PixelBuffer::new(1, 2, vec![10, 20, 30, 255, 200, 20, 30, 255]).unwrap();
        let mut editor = Editor::new(source);
        editor.settings.grayscale = true;
        editor.refresh();

        // both pixels collapse to their channel means
        let palette = editor.palette();
        assert_eq!(
            palette,
            vec![Srgba::new(83, 83, 83, 255), Srgba::new(20, 20, 20, 255)]
        );
    }

    #[cfg(feature = "kmeans")]
    #[test]
    fn clustering_runs_over_working_pixels() {
        let source = PixelBuffer::new(2, 1, vec![10, 0, 0, 255, 200, 0, 0, 255]).unwrap();
        let editor = Editor::new(source);

        let out = editor.cluster(
            &[Srgb::new(0, 0, 0), Srgb::new(255, 0, 0)],
            kmeans::DEFAULT_MAX_ITERATIONS,
        );
        assert!(out.converged);
        assert_eq!(out.means, vec![Srgb::new(10, 0, 0), Srgb::new(200, 0, 0)]);
    }
}
