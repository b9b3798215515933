//! Frame-to-frame state of the rotate and scale modes.
//!
//! Everything else a session computes is a pure function of the snapshot
//! and the current input. These two trackers are the exception and are
//! advanced exactly once per update.

use std::f32::consts::TAU;

/// Counts whole turns so rotation does not wrap at ±π.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotationAccumulator {
    revolutions: i32,
    previous_offset: f32,
}

impl RotationAccumulator {
    /// Feed this frame's raw signed angle and return the accumulated one.
    ///
    /// A sign change whose new magnitude exceeds `threshold` is a crossing of
    /// the ±π seam rather than of zero.
    pub fn accumulate(&mut self, raw: f32, threshold: f32) -> f32 {
        if self.previous_offset < 0.0 && raw > 0.0 && raw.abs() > threshold {
            self.revolutions -= 1;
            log::debug!("rotation crossed -π, revolutions = {}", self.revolutions);
        } else if self.previous_offset > 0.0 && raw < 0.0 && raw.abs() > threshold {
            self.revolutions += 1;
            log::debug!("rotation crossed +π, revolutions = {}", self.revolutions);
        }

        self.previous_offset = raw;
        raw + self.revolutions as f32 * TAU
    }

    pub fn revolutions(&self) -> i32 {
        self.revolutions
    }
}

/// Mirrors the image when scaling passes through the pivot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlipTracker {
    /// Sign of the last non-zero cross product, 0 before the first one.
    previous_sign: i8,
    flipped: bool,
}

impl FlipTracker {
    /// Feed this frame's cross product; returns true if the flip toggled.
    ///
    /// A zero cross product carries no sign and leaves the state unchanged.
    pub fn track(&mut self, cross: f32) -> bool {
        let sign: i8 = if cross > 0.0 {
            1
        } else if cross < 0.0 {
            -1
        } else {
            return false;
        };

        let toggled = self.previous_sign != 0 && sign != self.previous_sign;
        if toggled {
            self.flipped = !self.flipped;
            log::debug!("scale passed through pivot, flipped = {}", self.flipped);
        }
        self.previous_sign = sign;
        toggled
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// -1.0 while flipped, 1.0 otherwise.
    pub fn sign(&self) -> f32 {
        if self.flipped {
            -1.0
        } else {
            1.0
        }
    }
}

/// Stateful part of a session, reset on every mode or participant change.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    pub rotation: RotationAccumulator,
    pub flip: FlipTracker,
}

impl Accumulator {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
