//! Tuning constants and settings carried between sessions.

use std::f32::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::session::TransformMode;

/// Snap and precision constants for the interactive transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Translation snaps down to multiples of this many view units.
    pub translate_snap_step: f32,
    /// Rotation snaps down to multiples of this many degrees.
    pub rotate_snap_degrees: f32,
    /// Scale snaps to the nearest multiple of this step.
    pub scale_snap_step: f32,
    /// Translation multiplier in precision mode.
    pub translate_precision: f32,
    /// Rotation multiplier in precision mode.
    pub rotate_precision: f32,
    /// Scale sensitivity in precision mode, centred at 1.0.
    pub scale_precision: f32,
    /// Minimum jump in raw angle, in radians, counted as a full turn.
    pub revolution_threshold: f32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            translate_snap_step: 1.0,
            rotate_snap_degrees: 5.0,
            scale_snap_step: 0.1,
            translate_precision: 0.1,
            rotate_precision: 0.1,
            scale_precision: 0.5,
            revolution_threshold: FRAC_PI_2,
        }
    }
}

/// Settings remembered across invocations.
///
/// Saved only when a session is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistentSettings {
    /// Position of the last active image among the valid images.
    pub active_image: usize,
    pub mode: TransformMode,
    pub transform_all: bool,
}

/// Load/save boundary for [`PersistentSettings`].
pub trait SettingsStore {
    fn load(&self) -> PersistentSettings;

    fn save(&mut self, settings: PersistentSettings);
}

/// Process-local settings store.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    settings: PersistentSettings,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: PersistentSettings) -> Self {
        Self { settings }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> PersistentSettings {
        self.settings
    }

    fn save(&mut self, settings: PersistentSettings) {
        self.settings = settings;
    }
}
