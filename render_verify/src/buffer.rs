// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame, tolerance and render buffers.

use crate::{Color, Error};

/// The default per-channel tolerance established by
/// [`RenderBuffer::add_default_tolerances`].
///
/// This is one 8-bit step, expressed in linear units.
pub const DEFAULT_TOLERANCE: Color = Color::splat(1.0 / 255.0);

/// A row-major 2D grid of colors.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Width of the grid in pixels.
    width: u16,
    /// Height of the grid in pixels.
    height: u16,
    /// The pixels, `width * height` of them.
    buf: Vec<Color>,
}

/// The captured output of a render pass.
pub type FrameBuffer = Grid;

/// Per-pixel, per-channel tolerances paired with a [`FrameBuffer`].
pub type ToleranceBuffer = Grid;

impl Grid {
    /// Create a grid with every pixel set to `fill`.
    pub fn new(width: u16, height: u16, fill: Color) -> Self {
        Self {
            width,
            height,
            buf: vec![fill; usize::from(width) * usize::from(height)],
        }
    }

    /// Create a grid by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u16, height: u16, mut f: impl FnMut(u16, u16) -> Color) -> Self {
        let mut buf = Vec::with_capacity(usize::from(width) * usize::from(height));
        for y in 0..height {
            for x in 0..width {
                buf.push(f(x, y));
            }
        }
        Self { width, height, buf }
    }

    /// Create a grid from row-major pixels.
    ///
    /// Fails if `pixels` does not hold exactly `width * height` colors.
    pub fn from_pixels(width: u16, height: u16, pixels: Vec<Color>) -> Result<Self, Error> {
        let expected = usize::from(width) * usize::from(height);
        if pixels.len() != expected {
            return Err(Error::InvalidPixelCount {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            buf: pixels,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// `(width, height)`.
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Whether `other` has the same dimensions as `self`.
    pub fn same_size(&self, other: &Self) -> bool {
        self.size() == other.size()
    }

    /// The color at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    pub fn get(&self, x: u16, y: u16) -> Color {
        self.buf[self.index(x, y)]
    }

    /// Set the color at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    pub fn set(&mut self, x: u16, y: u16, color: Color) {
        let idx = self.index(x, y);
        self.buf[idx] = color;
    }

    /// The pixels in row-major order.
    pub fn pixels(&self) -> &[Color] {
        &self.buf
    }

    /// Iterate over `(x, y, color)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16, Color)> + '_ {
        let width = usize::from(self.width.max(1));
        self.buf.iter().enumerate().map(move |(i, c)| {
            // Both fit, as `i < width * height`.
            ((i % width) as u16, (i / width) as u16, *c)
        })
    }

    fn index(&self, x: u16, y: u16) -> usize {
        assert!(
            x < self.width && y < self.height,
            "({x}, {y}) is outside of a {}x{} grid",
            self.width,
            self.height
        );
        usize::from(y) * usize::from(self.width) + usize::from(x)
    }
}

/// An axis-aligned rectangle of pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Region {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the pixel `(x, y)` lies inside the region.
    pub fn contains(&self, x: u16, y: u16) -> bool {
        let (x, y) = (u32::from(x), u32::from(y));
        let (left, top) = (u32::from(self.x), u32::from(self.y));
        x >= left
            && y >= top
            && x < left + u32::from(self.width)
            && y < top + u32::from(self.height)
    }
}

/// A captured frame paired with its tolerances and background color.
///
/// The frame is fixed at construction; only the tolerances can be widened afterwards.
#[derive(Debug, Clone)]
pub struct RenderBuffer {
    frame: FrameBuffer,
    tolerance: ToleranceBuffer,
    background: Color,
    default_tolerance: Color,
}

impl RenderBuffer {
    /// Wrap `frame`, with every tolerance set to zero.
    pub fn new(frame: FrameBuffer, background: Color) -> Self {
        let tolerance = Grid::new(frame.width(), frame.height(), Color::TRANSPARENT);
        Self {
            frame,
            tolerance,
            background,
            default_tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Wrap `frame` with an explicit tolerance buffer.
    ///
    /// Fails if the two grids have different dimensions.
    pub fn with_tolerances(
        frame: FrameBuffer,
        tolerance: ToleranceBuffer,
        background: Color,
    ) -> Result<Self, Error> {
        if !frame.same_size(&tolerance) {
            return Err(Error::DimensionMismatch {
                expected: frame.size(),
                actual: tolerance.size(),
            });
        }
        Ok(Self {
            frame,
            tolerance,
            background,
            default_tolerance: DEFAULT_TOLERANCE,
        })
    }

    /// Set the tolerance used by [`add_default_tolerances`](Self::add_default_tolerances).
    #[must_use]
    pub fn with_default_tolerance(mut self, tolerance: Color) -> Self {
        self.default_tolerance = tolerance;
        self
    }

    /// Establish the baseline tolerance for every pixel.
    ///
    /// Any region specific tolerance added before this call is discarded.
    pub fn add_default_tolerances(&mut self) {
        self.tolerance = Grid::new(self.width(), self.height(), self.default_tolerance);
    }

    /// Widen the tolerance of every pixel inside `region` to at least `tolerance`.
    ///
    /// Parts of the region outside the buffer are ignored.
    pub fn add_region_tolerance(&mut self, region: Region, tolerance: Color) {
        let x_end = (u32::from(region.x) + u32::from(region.width)).min(u32::from(self.width()));
        let y_end = (u32::from(region.y) + u32::from(region.height)).min(u32::from(self.height()));
        for y in u32::from(region.y)..y_end {
            for x in u32::from(region.x)..x_end {
                // In range, both are bounded by a `u16` dimension.
                let (x, y) = (x as u16, y as u16);
                self.tolerance
                    .set(x, y, self.tolerance.get(x, y).max(tolerance));
            }
        }
    }

    /// Widen the tolerance of every pixel whose baseline color matches the background
    /// (within the default tolerance) to at least `tolerance`.
    pub fn relax_background(&mut self, tolerance: Color) {
        for (x, y, color) in self.frame.iter() {
            if color.within(self.background, self.default_tolerance) {
                self.tolerance
                    .set(x, y, self.tolerance.get(x, y).max(tolerance));
            }
        }
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn tolerance(&self) -> &ToleranceBuffer {
        &self.tolerance
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn default_tolerance(&self) -> Color {
        self.default_tolerance
    }

    pub fn width(&self) -> u16 {
        self.frame.width()
    }

    pub fn height(&self) -> u16 {
        self.frame.height()
    }

    pub fn size(&self) -> (u16, u16) {
        self.frame.size()
    }
}
