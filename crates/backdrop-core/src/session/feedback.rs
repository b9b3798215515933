//! Header text shown while a session runs.

use std::fmt;

use glam::Vec2;

use super::Axis;

pub const HELP_TEXT: &str = "Confirm: (Enter/LMB), Cancel: (Esc/RMB), \
Choose Image: (Mousewheel), Move: (G), Rotate: (R), Scale: (S), \
Constrain to axis: (X/Y), Transform all: (A)";

/// Numeric readout of the current mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Readout {
    Translate(Vec2),
    /// Radians.
    Rotate(f32),
    Scale(f32),
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Readout::Translate(offset) => write!(f, "Dx: {:.4} Dy: {:.4}", offset.x, offset.y),
            Readout::Rotate(angle) => write!(f, "Rot: {:.2}°", angle.to_degrees()),
            Readout::Scale(factor) => write!(f, "Scale: {:.4}", factor),
        }
    }
}

/// Full header line for one frame.
pub fn status_text(
    readout: Readout,
    active: usize,
    count: usize,
    transform_all: bool,
    constraint: Option<Axis>,
) -> String {
    let target = if transform_all {
        format!("[all {count}]")
    } else {
        format!("[{}/{}]", active + 1, count)
    };

    let along = match constraint {
        Some(Axis::X) => " along X",
        Some(Axis::Y) => " along Y",
        None => "",
    };

    format!("{target} {readout}{along}, {HELP_TEXT}")
}
