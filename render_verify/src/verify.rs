// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tolerance-aware comparison of a captured frame against a baseline.
//!
//! A pixel is a mismatch if any of its channels deviates from the baseline by more than
//! the matching channel of the baseline's tolerance at that pixel. The whole grid is
//! always scanned, so the count does not depend on where the first mismatch is.

use crate::{Color, Error, FrameBuffer, Grid, RenderBuffer};

/// How much deviations are scaled by in a difference buffer by default.
///
/// One 8-bit step then shows up as roughly sixteen steps in the exported image.
pub const DEFAULT_AMPLIFICATION: f32 = 16.0;

/// The number of mismatches a [`RenderVerifier`] keeps for reporting by default.
pub const DEFAULT_MAX_REPORTED: usize = 16;

/// Count the pixels of `actual` which are outside of `baseline`'s tolerance.
///
/// Returns [`Error::DimensionMismatch`] if the grids have different sizes, as this means
/// the capture itself is invalid.
pub fn verify_render(actual: &FrameBuffer, baseline: &RenderBuffer) -> Result<usize, Error> {
    check_size(actual, baseline)?;
    Ok(pixel_triples(actual, baseline)
        .filter(|(_, _, actual, expected, tolerance)| !actual.within(*expected, *tolerance))
        .count())
}

/// Build a difference buffer showing how far `actual` deviates from `baseline`.
///
/// Pixels within tolerance are [`Color::BLACK`]. Pixels outside of tolerance hold their
/// per-channel deviation multiplied by `amplification` and clamped, with opaque alpha.
/// The tolerance buffer of the result is a copy of the baseline's.
///
/// This is purely diagnostic, and is only worth computing once
/// [`verify_render`] has reported a failure.
pub fn compute_difference(
    actual: &FrameBuffer,
    baseline: &RenderBuffer,
    amplification: f32,
) -> Result<RenderBuffer, Error> {
    check_size(actual, baseline)?;
    let pixels = pixel_triples(actual, baseline)
        .map(|(_, _, actual, expected, tolerance)| {
            if actual.within(expected, tolerance) {
                Color::BLACK
            } else {
                actual
                    .abs_diff(expected)
                    .scale(amplification)
                    .clamp()
                    .with_alpha(1.0)
            }
        })
        .collect();
    let frame = Grid::from_pixels(actual.width(), actual.height(), pixels)?;
    RenderBuffer::with_tolerances(frame, baseline.tolerance().clone(), baseline.background())
}

/// A single pixel outside of tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mismatch {
    pub x: u16,
    pub y: u16,
    pub actual: Color,
    pub expected: Color,
    pub tolerance: Color,
}

/// Verifies captures against a baseline, remembering the result of the last run.
#[derive(Debug, Clone)]
pub struct RenderVerifier {
    max_reported: usize,
    failures: usize,
    mismatches: Vec<Mismatch>,
}

impl Default for RenderVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderVerifier {
    pub fn new() -> Self {
        Self {
            max_reported: DEFAULT_MAX_REPORTED,
            failures: 0,
            mismatches: Vec::new(),
        }
    }

    /// Keep at most `max_reported` mismatches from each run.
    #[must_use]
    pub fn with_max_reported(mut self, max_reported: usize) -> Self {
        self.max_reported = max_reported;
        self
    }

    /// Compare `actual` against `baseline` and return the number of mismatched pixels.
    ///
    /// The first mismatches (in row-major order) are kept and can be read back from
    /// [`mismatches`](Self::mismatches). A dimension mismatch is returned as an error and
    /// leaves the previous result untouched.
    pub fn verify_render(
        &mut self,
        actual: &FrameBuffer,
        baseline: &RenderBuffer,
    ) -> Result<usize, Error> {
        check_size(actual, baseline)?;
        let mut failures = 0;
        let mut mismatches = Vec::new();
        for (x, y, actual, expected, tolerance) in pixel_triples(actual, baseline) {
            if actual.within(expected, tolerance) {
                continue;
            }
            failures += 1;
            if mismatches.len() < self.max_reported {
                mismatches.push(Mismatch {
                    x,
                    y,
                    actual,
                    expected,
                    tolerance,
                });
            }
        }
        let (width, height) = baseline.size();
        if failures == 0 {
            log::debug!("All {width}x{height} pixels within tolerance");
        } else {
            log::warn!("{failures} of {width}x{height} pixels outside of tolerance");
            for m in &mismatches {
                log::warn!(
                    "  ({}, {}): got {:?}, expected {:?} +/- {:?}",
                    m.x,
                    m.y,
                    m.actual,
                    m.expected,
                    m.tolerance
                );
            }
        }
        self.failures = failures;
        self.mismatches = mismatches;
        Ok(failures)
    }

    /// The number of mismatched pixels found by the last run.
    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn passed(&self) -> bool {
        self.failures == 0
    }

    /// The first mismatches of the last run.
    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }
}

fn check_size(actual: &FrameBuffer, baseline: &RenderBuffer) -> Result<(), Error> {
    if actual.size() != baseline.size() {
        return Err(Error::DimensionMismatch {
            expected: baseline.size(),
            actual: actual.size(),
        });
    }
    Ok(())
}

/// `(x, y, actual, expected, tolerance)` for every pixel, row-major.
fn pixel_triples<'a>(
    actual: &'a FrameBuffer,
    baseline: &'a RenderBuffer,
) -> impl Iterator<Item = (u16, u16, Color, Color, Color)> + 'a {
    actual
        .iter()
        .zip(baseline.frame().pixels())
        .zip(baseline.tolerance().pixels())
        .map(|(((x, y, actual), expected), tolerance)| (x, y, actual, *expected, *tolerance))
}
