// Copyright 2024 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A tiny rasterizer for driving the harness in tests.

#![allow(dead_code)]

use anyhow::{bail, Result};
use render_verify::{Color, FrameBuffer, Grid, Region};
use render_verify_tests::{Rasterizer, TestParams};

/// An opaque, axis-aligned rectangle.
#[derive(Clone, Copy, Debug)]
pub struct Fill {
    pub region: Region,
    pub color: Color,
}

/// A single pixel drawn wrongly on one pass.
#[derive(Clone, Copy, Debug)]
pub struct Glitch {
    pub pass: usize,
    pub x: u16,
    pub y: u16,
    pub color: Color,
}

/// Paints fills in order over the background.
#[derive(Default)]
pub struct RectRasterizer {
    pub passes: usize,
    pub glitches: Vec<Glitch>,
    /// Capture one row short on this pass.
    pub truncate_pass: Option<usize>,
    /// Fail outright on this pass.
    pub fail_pass: Option<usize>,
    /// Capture at this size on every pass, ignoring the requested one.
    pub size: Option<(u16, u16)>,
}

impl RectRasterizer {
    pub fn with_glitch(mut self, glitch: Glitch) -> Self {
        self.glitches.push(glitch);
        self
    }
}

impl Rasterizer for RectRasterizer {
    type Scene = [Fill];

    fn render(&mut self, scene: &[Fill], params: &TestParams) -> Result<FrameBuffer> {
        let pass = self.passes;
        self.passes += 1;
        if self.fail_pass == Some(pass) {
            bail!("device lost on pass {pass}");
        }
        let (width, mut height) = self.size.unwrap_or((params.width, params.height));
        if self.truncate_pass == Some(pass) {
            height -= 1;
        }
        let mut frame = Grid::from_fn(width, height, |x, y| {
            scene
                .iter()
                .rev()
                .find(|fill| fill.region.contains(x, y))
                .map_or(params.background, |fill| fill.color)
        });
        for glitch in self.glitches.iter().filter(|g| g.pass == pass) {
            frame.set(glitch.x, glitch.y, glitch.color);
        }
        Ok(frame)
    }
}

pub const BLUE: Color = Color::from_components(1.0, 0.0, 0.0, 1.0);

/// A blue square in the middle of the canvas.
pub fn square_scene() -> Vec<Fill> {
    vec![Fill {
        region: Region::new(2, 2, 4, 4),
        color: BLUE,
    }]
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
