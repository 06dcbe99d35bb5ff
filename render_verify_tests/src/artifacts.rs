// Copyright 2024 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostic images for failing tests.
//!
//! Exporting is best effort: failures are logged and recorded on the [`Verdict`], but
//! never replace the verdict itself.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use render_verify::{save_image_as, FrameBuffer, Grid, RenderBuffer};

use crate::Verdict;

/// Where the artifacts of one test are written.
///
/// For a prefix `p` (the artifact directory joined with the test name) these are
/// `p_Rendered.png`, `p_Expected_fb.png`, `p_Expected_tb.png` and `p_Diff_tb.png`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    /// The capture being verified.
    pub rendered: PathBuf,
    /// The baseline frame buffer.
    pub expected_frame: PathBuf,
    /// The baseline tolerance buffer, written opaque.
    pub expected_tolerance: PathBuf,
    /// The difference buffer.
    pub difference: PathBuf,
}

impl ArtifactPaths {
    pub fn new(dir: &Path, prefix: &str) -> Self {
        let path = |suffix: &str| dir.join(format!("{prefix}_{suffix}.png"));
        Self {
            dir: dir.to_path_buf(),
            rendered: path("Rendered"),
            expected_frame: path("Expected_fb"),
            expected_tolerance: path("Expected_tb"),
            difference: path("Diff_tb"),
        }
    }

    pub fn all(&self) -> [&Path; 4] {
        [
            self.rendered.as_path(),
            self.expected_frame.as_path(),
            self.expected_tolerance.as_path(),
            self.difference.as_path(),
        ]
    }

    /// Write every artifact of a failing test.
    pub(crate) fn export_all(
        &self,
        actual: &FrameBuffer,
        baseline: &RenderBuffer,
        difference: &RenderBuffer,
        verdict: &mut Verdict,
    ) {
        if record(self.ensure_dir(), verdict).is_none() {
            return;
        }
        export(actual, &self.rendered, true, verdict);
        export(baseline.frame(), &self.expected_frame, true, verdict);
        export(baseline.tolerance(), &self.expected_tolerance, false, verdict);
        export(difference.frame(), &self.difference, true, verdict);
    }

    /// Write only the capture, for debugging passing tests.
    ///
    /// Comparison artifacts from an earlier failing run are removed, as they no longer
    /// describe this capture.
    pub(crate) fn export_rendered(&self, actual: &FrameBuffer, verdict: &mut Verdict) {
        remove_all(&[
            self.expected_frame.as_path(),
            self.expected_tolerance.as_path(),
            self.difference.as_path(),
        ]);
        if record(self.ensure_dir(), verdict).is_some() {
            export(actual, &self.rendered, true, verdict);
        }
    }

    /// Write the capture of a test which has nothing to be verified against.
    ///
    /// Returns whether it was written; failures are only logged.
    pub(crate) fn write_rendered(&self, actual: &FrameBuffer) -> bool {
        self.ensure_dir()
            .and_then(|()| save(actual, &self.rendered, true))
            .is_ok()
    }

    /// Remove artifacts left over from an earlier failing run.
    pub(crate) fn remove_stale(&self) {
        remove_all(&self.all());
    }

    fn ensure_dir(&self) -> Result<(), ExportError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            log::warn!(
                "Couldn't create artifact directory {}: {e}",
                self.dir.display()
            );
            (self.dir.clone(), e.to_string())
        })
    }
}

/// The path which couldn't be written, with the reason.
type ExportError = (PathBuf, String);

fn save(grid: &Grid, path: &Path, include_alpha: bool) -> Result<(), ExportError> {
    save_image_as(grid, path, include_alpha).map_err(|e| {
        log::warn!("Couldn't write artifact {}: {e}", path.display());
        (path.to_path_buf(), e.to_string())
    })
}

fn record(result: Result<(), ExportError>, verdict: &mut Verdict) -> Option<()> {
    result.map_err(|e| verdict.export_errors.push(e)).ok()
}

fn export(grid: &Grid, path: &Path, include_alpha: bool, verdict: &mut Verdict) {
    if record(save(grid, path, include_alpha), verdict).is_some() {
        verdict.artifacts.push(path.to_path_buf());
    }
}

fn remove_all(paths: &[&Path]) {
    for path in paths {
        match fs::remove_file(path) {
            Ok(()) => log::debug!("Removed stale artifact {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => (),
            Err(e) => log::warn!("Couldn't remove stale artifact {}: {e}", path.display()),
        }
    }
}
