// Copyright 2024 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::path::PathBuf;

use anyhow::{bail, Result};
use render_verify::{Mismatch, RenderBuffer};

use crate::{render_pass, verify_against, Rasterizer, TestParams};

/// The outcome of verifying a capture against its baseline.
#[must_use]
pub struct Verdict {
    pub name: String,
    /// The number of pixels outside of tolerance.
    pub failures: usize,
    /// The first few of those pixels.
    pub mismatches: Vec<Mismatch>,
    /// Only computed for failing (or forced) runs.
    pub difference: Option<RenderBuffer>,
    /// Artifacts which were written.
    pub artifacts: Vec<PathBuf>,
    /// Artifacts which could not be written, with the reason.
    pub export_errors: Vec<(PathBuf, String)>,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.failures == 0
    }

    /// Fail with a description of the mismatch if any pixel was outside of tolerance.
    pub fn assert_passed(&self) -> Result<()> {
        if self.passed() {
            return Ok(());
        }
        let mut message = format!(
            "{} pixels outside of tolerance in test {}",
            self.failures, self.name
        );
        if let Some(first) = self.mismatches.first() {
            message.push_str(&format!(
                "\nFirst mismatch at ({}, {}): got {:?}, expected {:?}",
                first.x, first.y, first.actual, first.expected
            ));
        }
        for path in &self.artifacts {
            message.push_str(&format!("\nWrote {}", path.display()));
        }
        bail!("{}", message);
    }
}

/// Render `scene` twice and verify the second capture against the first.
///
/// The first pass is the baseline, with the tolerances from `params`. Errors are reserved
/// for runs where the comparison could not happen at all, such as the rasterizer failing
/// or the two captures having different sizes. Differing pixels are reported on the
/// [`Verdict`].
pub fn run_render_test<R: Rasterizer>(
    rasterizer: &mut R,
    scene: &R::Scene,
    params: &TestParams,
) -> Result<Verdict> {
    let baseline = params.baseline(render_pass(rasterizer, scene, params, "baseline")?);
    let actual = render_pass(rasterizer, scene, params, "candidate")?;
    verify_against(&actual, &baseline, params)
}
