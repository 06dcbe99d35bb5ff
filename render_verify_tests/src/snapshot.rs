// Copyright 2024 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fs;
use std::path::Path;

use anyhow::{bail, Result};
use render_verify::{load_image, save_image_as, Color, FrameBuffer, Grid};

use crate::{
    env_var_relates_to, render_pass, verify_against, Rasterizer, TestParams, Verdict,
    CREATE_ENV_VAR, UPDATE_ENV_VAR,
};

/// Render `scene` once and verify it against a stored reference image.
///
/// Reference images are 8-bit sRGB, so the capture is quantized the same way before it is
/// compared. A missing reference is an error unless `RENDER_VERIFY_CREATE` names this
/// test, in which case the capture becomes the reference. A failing test whose name is in
/// `RENDER_VERIFY_UPDATE` replaces its reference; the returned verdict still fails.
pub fn run_reference_test<R: Rasterizer>(
    rasterizer: &mut R,
    scene: &R::Scene,
    reference_path: &Path,
    params: &TestParams,
) -> Result<Verdict> {
    let actual = quantize(&render_pass(rasterizer, scene, params, "candidate")?);

    if !reference_path.exists() {
        if env_var_relates_to(CREATE_ENV_VAR, &params.name) {
            save_reference(&actual, reference_path)?;
            log::info!(
                "Wrote result for new test {} to {}",
                params.name,
                reference_path.display()
            );
            let baseline = params.baseline(actual.clone());
            return verify_against(&actual, &baseline, params);
        }
        let paths = params.artifact_paths();
        let written = if paths.write_rendered(&actual) {
            "written to"
        } else {
            "couldn't be written to"
        };
        bail!(
            "Couldn't find reference for test {}. Searched at {}\n\
            Test result {written} {}\n\
            Use `{CREATE_ENV_VAR}=all` to create it",
            params.name,
            reference_path.display(),
            paths.rendered.display()
        );
    }

    let baseline = params.baseline(load_image(reference_path)?);
    let verdict = verify_against(&actual, &baseline, params)?;
    if !verdict.passed() && env_var_relates_to(UPDATE_ENV_VAR, &params.name) {
        save_reference(&actual, reference_path)?;
        log::info!(
            "Updated reference for test {} at {}",
            params.name,
            reference_path.display()
        );
    }
    Ok(verdict)
}

/// Store a reference image, creating its directory if needed.
fn save_reference(actual: &FrameBuffer, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    save_image_as(actual, path, true)?;
    Ok(())
}

/// Round trip every pixel through 8-bit sRGB, as storing it would.
fn quantize(frame: &FrameBuffer) -> FrameBuffer {
    Grid::from_fn(frame.width(), frame.height(), |x, y| {
        Color::from_srgb8(frame.get(x, y).clamp().to_srgb8())
    })
}
