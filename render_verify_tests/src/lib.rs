// Copyright 2024 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render Verify test harness.
//!
//! Drives a [`Rasterizer`] through two render passes of the same scene and verifies the
//! second capture against the first. Failing runs leave image artifacts behind, see
//! [`ArtifactPaths`] for their names.
//!
//! A few environment variables change what is written. Each takes either `all` or a
//! comma separated list of test names:
//!
//! - `RENDER_VERIFY_FORCE_DIFF`: always compute and export the difference buffer.
//! - `RENDER_VERIFY_DEBUG`: always write the rendered capture.
//! - `RENDER_VERIFY_CREATE`: create missing reference images.
//! - `RENDER_VERIFY_UPDATE`: replace reference images that no longer match.
//!
//! `RENDER_VERIFY_ARTIFACTS` overrides the directory artifacts are written to.

// LINEBENDER LINT SET - lib.rs - v2
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
// The following lints are part of the Linebender standard set,
// but resolving them has been deferred for now.
// Feel free to send a PR that solves one or more of these.
#![allow(
    missing_debug_implementations,
    unreachable_pub,
    missing_docs,
    clippy::missing_assert_message,
    clippy::allow_attributes_without_reason
)]

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Result;
use render_verify::{
    compute_difference, Color, FrameBuffer, Region, RenderBuffer, RenderVerifier,
    DEFAULT_AMPLIFICATION, DEFAULT_TOLERANCE,
};

mod artifacts;
mod compare;
mod registry;
mod snapshot;

pub use artifacts::ArtifactPaths;
pub use compare::{run_render_test, Verdict};
pub use registry::{
    animatable_property, Animatable, Constructor, ObjectCategory, PropertyKind, Registry,
    SetupError,
};
pub use snapshot::run_reference_test;

/// The environment variable overriding where artifacts are written.
pub const ARTIFACTS_ENV_VAR: &str = "RENDER_VERIFY_ARTIFACTS";
const FORCE_DIFF_ENV_VAR: &str = "RENDER_VERIFY_FORCE_DIFF";
const DEBUG_ENV_VAR: &str = "RENDER_VERIFY_DEBUG";
const CREATE_ENV_VAR: &str = "RENDER_VERIFY_CREATE";
const UPDATE_ENV_VAR: &str = "RENDER_VERIFY_UPDATE";

/// Produces captures of a scene.
///
/// This is the seam to the renderer under test. It must return a capture of exactly
/// `params.width` by `params.height` pixels, with `params.background` underneath the
/// scene.
pub trait Rasterizer {
    type Scene: ?Sized;

    fn render(&mut self, scene: &Self::Scene, params: &TestParams) -> Result<FrameBuffer>;
}

/// Everything needed to run one test case.
#[derive(Clone, Debug)]
pub struct TestParams {
    pub name: String,
    pub width: u16,
    pub height: u16,
    pub background: Color,
    /// The default tolerance of every pixel in the baseline.
    pub tolerance: Color,
    /// Tolerances widened on top of the default, in order.
    pub tolerance_regions: Vec<(Region, Color)>,
    /// If set, pixels matching the background get at least this tolerance.
    pub background_tolerance: Option<Color>,
    /// The scale applied to deviations in the difference buffer.
    pub amplification: f32,
    pub artifact_dir: PathBuf,
}

impl TestParams {
    pub fn new(name: impl Into<String>, width: u16, height: u16) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            background: Color::WHITE,
            tolerance: DEFAULT_TOLERANCE,
            tolerance_regions: Vec::new(),
            background_tolerance: None,
            amplification: DEFAULT_AMPLIFICATION,
            artifact_dir: default_artifact_dir(),
        }
    }

    #[must_use]
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Color) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Allow a larger deviation inside `region`, e.g. along anti-aliased edges.
    #[must_use]
    pub fn with_region_tolerance(mut self, region: Region, tolerance: Color) -> Self {
        self.tolerance_regions.push((region, tolerance));
        self
    }

    #[must_use]
    pub fn with_background_tolerance(mut self, tolerance: Color) -> Self {
        self.background_tolerance = Some(tolerance);
        self
    }

    #[must_use]
    pub fn with_amplification(mut self, amplification: f32) -> Self {
        self.amplification = amplification;
        self
    }

    #[must_use]
    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = dir.into();
        self
    }

    /// Wrap a baseline capture into a [`RenderBuffer`] with this test's tolerances.
    pub fn baseline(&self, frame: FrameBuffer) -> RenderBuffer {
        let mut baseline =
            RenderBuffer::new(frame, self.background).with_default_tolerance(self.tolerance);
        baseline.add_default_tolerances();
        for (region, tolerance) in &self.tolerance_regions {
            baseline.add_region_tolerance(*region, *tolerance);
        }
        if let Some(tolerance) = self.background_tolerance {
            baseline.relax_background(tolerance);
        }
        baseline
    }

    /// The artifact paths for this test.
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::new(&self.artifact_dir, &self.name)
    }
}

fn default_artifact_dir() -> PathBuf {
    match env::var_os(ARTIFACTS_ENV_VAR) {
        Some(dir) => PathBuf::from(dir),
        None => Path::new(env!("CARGO_MANIFEST_DIR")).join("artifacts"),
    }
}

/// Render one pass, failing if the capture isn't the requested size.
fn render_pass<R: Rasterizer>(
    rasterizer: &mut R,
    scene: &R::Scene,
    params: &TestParams,
    pass: &str,
) -> Result<FrameBuffer> {
    let frame = rasterizer.render(scene, params)?;
    if frame.size() != (params.width, params.height) {
        return Err(render_verify::Error::DimensionMismatch {
            expected: (params.width, params.height),
            actual: frame.size(),
        }
        .into());
    }
    log::debug!(
        "{}: {pass} pass captured {}x{}",
        params.name,
        frame.width(),
        frame.height()
    );
    Ok(frame)
}

/// Verify `actual` against `baseline`, exporting artifacts if it fails.
///
/// Only structural problems (such as a size mismatch) are errors. Failing to write
/// artifacts is logged and recorded on the verdict.
fn verify_against(
    actual: &FrameBuffer,
    baseline: &RenderBuffer,
    params: &TestParams,
) -> Result<Verdict> {
    let mut verifier = RenderVerifier::new();
    let failures = verifier.verify_render(actual, baseline)?;
    let mut verdict = Verdict {
        name: params.name.clone(),
        failures,
        mismatches: verifier.mismatches().to_vec(),
        difference: None,
        artifacts: Vec::new(),
        export_errors: Vec::new(),
    };
    let paths = params.artifact_paths();
    if failures != 0 || env_var_relates_to(FORCE_DIFF_ENV_VAR, &params.name) {
        let difference = compute_difference(actual, baseline, params.amplification)?;
        paths.export_all(actual, baseline, &difference, &mut verdict);
        verdict.difference = Some(difference);
    } else if env_var_relates_to(DEBUG_ENV_VAR, &params.name) {
        paths.export_rendered(actual, &mut verdict);
    } else {
        paths.remove_stale();
    }
    Ok(verdict)
}

/// Determine whether the value of the environment variable `env_var`
/// includes a specific test.
/// This is used when updating tests, or dumping the debug output
fn env_var_relates_to(env_var: &'static str, name: &str) -> bool {
    if let Ok(val) = env::var(env_var) {
        if val.eq_ignore_ascii_case("all") {
            return true;
        }
        for test in val.split(',') {
            if test.trim().eq_ignore_ascii_case(name) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::{env_var_relates_to, TestParams};
    use render_verify::{Color, Grid, Region, DEFAULT_TOLERANCE};

    #[test]
    fn env_var_lists_tests() {
        const VAR: &str = "RENDER_VERIFY_UNIT_ENV_VAR";
        std::env::set_var(VAR, "first, Second");
        assert!(env_var_relates_to(VAR, "first"));
        assert!(env_var_relates_to(VAR, "second"));
        assert!(!env_var_relates_to(VAR, "third"));
        std::env::set_var(VAR, "ALL");
        assert!(env_var_relates_to(VAR, "third"));
        std::env::remove_var(VAR);
        assert!(!env_var_relates_to(VAR, "first"));
    }

    #[test]
    fn baseline_applies_tolerances_in_order() {
        let params = TestParams::new("baseline_tolerances", 4, 1)
            .with_background(Color::BLACK)
            .with_region_tolerance(Region::new(1, 0, 1, 1), Color::splat(0.2))
            .with_background_tolerance(Color::splat(0.1));
        let frame = Grid::from_fn(4, 1, |x, _| if x < 2 { Color::BLACK } else { Color::WHITE });
        let baseline = params.baseline(frame);
        assert_eq!(baseline.tolerance().get(0, 0), Color::splat(0.1));
        assert_eq!(baseline.tolerance().get(1, 0), Color::splat(0.2));
        assert_eq!(baseline.tolerance().get(2, 0), DEFAULT_TOLERANCE);
        assert_eq!(baseline.background(), Color::BLACK);
    }
}
