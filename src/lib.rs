//! The engine of an interactive raster image editor.
//!
//! `filtrate` owns the pixel-level core of an editor: a configurable, orderable
//! sequence of filters (grayscale, channel tint, band quantization,
//! error-diffusion dithering, iterative box blur, brightness) applied to an
//! in-memory RGBA raster, plus histogram and palette analysis and k-means
//! color clustering over the same pixel data.
//!
//! Window management, input handling, texture upload, and file codecs are the
//! host application's job: the core consumes a decoded [`PixelBuffer`] and a
//! filter configuration and produces a filtered buffer plus derived data.
//!
//! # Features
//! To reduce dependencies and compile times, `filtrate` has several `cargo`
//! features that can be turned off or on:
//! - `pipelines`: exposes the [`Editor`] application-state struct that serves as the high-level API.
//! - `kmeans`: adds k-means palette clustering over the pixel population.
//! - `image`: enables integration with the [`image`] crate.
//!
//! # High-Level API
//! To get started with the high-level API, see [`Editor`].
//! ```no_run
//! # use filtrate::Editor;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::open("some image")?.into_rgba8();
//!
//! let mut editor = Editor::from_image(&img);
//! editor.settings.grayscale = true;
//! editor.settings.dither = true;
//! editor.settings.dither_buckets = 4;
//!
//! // Re-derive the working buffer and histogram from the pristine source.
//! let filtered = editor.refresh();
//! let out = filtered.to_rgba_image();
//! # Ok(())
//! # }
//! ```
//!
//! The low-level API is a [`Pipeline`] run over an explicit [`PixelBuffer`],
//! [`FilterOrder`], and [`FilterSettings`].

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod analysis;
mod dither;
mod filters;
mod pipeline;
mod quantize;
mod types;

#[cfg(feature = "pipelines")]
mod api;

#[cfg(feature = "kmeans")]
pub mod kmeans;

pub use analysis::*;
pub use dither::FloydSteinberg;
pub use filters::*;
pub use pipeline::*;
pub use quantize::*;
pub use types::*;

#[cfg(feature = "pipelines")]
pub use api::*;

/// The number of filter kinds in the pipeline, and therefore the length of a
/// [`FilterOrder`].
pub const FILTER_COUNT: usize = 6;

/// The number of representable values per 8-bit channel.
pub(crate) const CHANNEL_VALUES: usize = 256;
