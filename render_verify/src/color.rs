// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear (scRGB) colors as captured from a render pass.

use peniko::color::{AlphaColor, LinearSrgb};

/// A color with four floating point channels in linear scRGB space.
///
/// Channels are nominally in `[0, 1]`, but values outside that range (including
/// infinities) are preserved until [`Color::clamp`] is called. The derived
/// [`PartialEq`] is exact; use [`Color::approx_eq`] to compare rendered output.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    pub a: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::from_components(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Self = Self::from_components(1.0, 0.0, 0.0, 0.0);
    /// Opaque white.
    pub const WHITE: Self = Self::from_components(1.0, 1.0, 1.0, 1.0);

    /// Create a color from its alpha, red, green and blue channels.
    ///
    /// No clamping is performed.
    pub const fn from_components(a: f32, r: f32, g: f32, b: f32) -> Self {
        Self { a, r, g, b }
    }

    /// A color with the same value in every channel, alpha included.
    ///
    /// Mostly useful for uniform tolerances.
    pub const fn splat(value: f32) -> Self {
        Self::from_components(value, value, value, value)
    }

    /// Create a color from 8-bit sRGB encoded `[r, g, b, a]` values.
    ///
    /// Alpha is linear and is simply rescaled to `[0, 1]`.
    pub fn from_srgb8([r, g, b, a]: [u8; 4]) -> Self {
        Self::from_components(
            f32::from(a) / 255.0,
            srgb_to_linear(r),
            srgb_to_linear(g),
            srgb_to_linear(b),
        )
    }

    /// Encode this color as 8-bit sRGB `[r, g, b, a]`.
    ///
    /// Out of range channels saturate, NaN encodes as `0`.
    pub fn to_srgb8(self) -> [u8; 4] {
        [
            linear_to_srgb(self.r),
            linear_to_srgb(self.g),
            linear_to_srgb(self.b),
            unit_to_u8(self.a),
        ]
    }

    /// The channels in `[a, r, g, b]` order.
    pub const fn channels(self) -> [f32; 4] {
        [self.a, self.r, self.g, self.b]
    }

    /// Clamp every channel into `[0, 1]`.
    ///
    /// Values below zero (including `-∞`) become `0`, values above one (including `+∞`)
    /// become `1`. NaN is mapped to `0`, so the result never contains NaN.
    #[must_use]
    pub fn clamp(self) -> Self {
        self.map(clamp_channel)
    }

    /// Whether every channel of `self` is within `epsilon` of `other`.
    pub fn approx_eq(self, other: Self, epsilon: f32) -> bool {
        self.within(other, Self::splat(epsilon))
    }

    /// Whether every channel of `self` is within the matching channel of `tolerance`
    /// from `other`.
    ///
    /// A NaN deviation is never within tolerance.
    pub fn within(self, other: Self, tolerance: Self) -> bool {
        let diff = self.abs_diff(other).channels();
        let tolerance = tolerance.channels();
        diff.iter().zip(tolerance).all(|(d, t)| *d <= t)
    }

    /// The per-channel absolute difference between two colors.
    #[must_use]
    pub fn abs_diff(self, other: Self) -> Self {
        self.zip(other, |a, b| (a - b).abs())
    }

    /// The per-channel maximum of two colors.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        self.zip(other, f32::max)
    }

    /// Multiply every channel, alpha included, by `factor`.
    #[must_use]
    pub fn scale(self, factor: f32) -> Self {
        self.map(|c| c * factor)
    }

    #[must_use]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Whether every channel is finite.
    pub fn is_finite(self) -> bool {
        self.channels().iter().all(|c| c.is_finite())
    }

    fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self::from_components(f(self.a), f(self.r), f(self.g), f(self.b))
    }

    fn zip(self, other: Self, f: impl Fn(f32, f32) -> f32) -> Self {
        Self::from_components(
            f(self.a, other.a),
            f(self.r, other.r),
            f(self.g, other.g),
            f(self.b, other.b),
        )
    }
}

impl From<AlphaColor<LinearSrgb>> for Color {
    fn from(color: AlphaColor<LinearSrgb>) -> Self {
        let [r, g, b, a] = color.components;
        Self::from_components(a, r, g, b)
    }
}

impl From<Color> for AlphaColor<LinearSrgb> {
    fn from(color: Color) -> Self {
        Self::new([color.r, color.g, color.b, color.a])
    }
}

fn clamp_channel(value: f32) -> f32 {
    // `!(value > 0.0)` also catches NaN.
    if !(value > 0.0) {
        0.0
    } else if value > 1.0 {
        1.0
    } else {
        value
    }
}

fn unit_to_u8(value: f32) -> u8 {
    (clamp_channel(value) * 255.0 + 0.5) as u8
}

fn srgb_to_linear(value: u8) -> f32 {
    let v = f32::from(value) / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(value: f32) -> u8 {
    if !(value > 0.0) {
        0
    } else if value <= 0.003_130_8 {
        (255.0 * value * 12.92 + 0.5) as u8
    } else if value < 1.0 {
        (255.0 * (1.055 * value.powf(1.0 / 2.4) - 0.055) + 0.5) as u8
    } else {
        255
    }
}
