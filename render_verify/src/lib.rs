// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render Verify checks that a renderer produces the same pixels twice.
//!
//! A capture from a first render pass becomes the baseline: a [`RenderBuffer`] pairing
//! the captured [`FrameBuffer`] with a per-pixel [`ToleranceBuffer`]. The capture of a
//! second pass is then compared against it with [`verify_render`], which counts the
//! pixels outside of tolerance. When that count is not zero, [`compute_difference`]
//! builds a visualisation of the deviation and [`save_image_as`] writes the buffers to
//! disk for inspection.
//!
//! ```
//! use render_verify::{verify_render, Color, Grid, RenderBuffer};
//!
//! let background = Color::WHITE;
//! let mut baseline = RenderBuffer::new(Grid::new(8, 8, background), background);
//! baseline.add_default_tolerances();
//!
//! let mut actual = baseline.frame().clone();
//! actual.set(3, 4, Color { r: 0.5, ..background });
//! assert_eq!(verify_render(&actual, &baseline).unwrap(), 1);
//! ```
//!
//! All colors are linear scRGB, see [`Color`].

// LINEBENDER LINT SET - lib.rs - v2
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![allow(missing_docs, reason = "We have many as-yet undocumented items.")]
#![allow(
    clippy::cast_possible_truncation,
    clippy::neg_cmp_op_on_partial_ord,
    reason = "Deferred"
)]

mod buffer;
mod color;
mod export;
mod verify;

use thiserror::Error;

pub use buffer::{FrameBuffer, Grid, Region, RenderBuffer, ToleranceBuffer, DEFAULT_TOLERANCE};
pub use color::Color;
pub use export::{encode_png, load_image, save_image_as};
pub use verify::{
    compute_difference, verify_render, Mismatch, RenderVerifier, DEFAULT_AMPLIFICATION,
    DEFAULT_MAX_REPORTED,
};

/// Errors that can occur while verifying or exporting a render.
///
/// A content mismatch is not an error; it is reported as a count by [`verify_render`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Two grids which must have the same size do not.
    ///
    /// Sizes are `(width, height)`.
    #[error("Expected a {}x{} grid, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    DimensionMismatch {
        expected: (u16, u16),
        actual: (u16, u16),
    },
    /// Pixel data did not have `width * height` entries.
    #[error("Expected {expected} pixels, got {actual}")]
    InvalidPixelCount { expected: usize, actual: usize },
    /// A loaded image does not fit in a grid.
    #[error("Image of {width}x{height} is too large for a grid")]
    ImageTooLarge { width: u32, height: u32 },
    /// Encoding, decoding or writing an image failed.
    #[error("Failed to process image: {0}")]
    Image(#[from] image::ImageError),
}
