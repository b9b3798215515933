//! JavaScript-facing descriptions and DOM event mapping.
//!
//! The browser reports pointer positions in client pixels with y pointing
//! down; the core works in region pixels with y pointing up. Everything that
//! crosses that boundary goes through the helpers here.

use backdrop_core::{
    Key, OperatorStatus, OrthoViewport, PivotMode, PointerButton, ViewOrientation,
    WheelDirection,
};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// View description passed to the `JsTransformOperator` constructor.
///
/// ```typescript
/// {
///   orientation: "TOP",
///   width: 800, height: 600,
///   center: [0, 0, 0],
///   unitsPerPixel: 0.01,
///   cursor: [0, 0, 0],
///   pivotMode: "MEDIAN_POINT",
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsViewDescription {
    pub orientation: ViewOrientation,
    /// Region width in pixels.
    pub width: f32,
    /// Region height in pixels.
    pub height: f32,
    #[serde(default)]
    pub center: [f32; 3],
    #[serde(default = "default_units_per_pixel")]
    pub units_per_pixel: f32,
    #[serde(default)]
    pub cursor: [f32; 3],
    #[serde(default)]
    pub pivot_mode: PivotMode,
}

fn default_units_per_pixel() -> f32 {
    0.01
}

impl JsViewDescription {
    pub(crate) fn viewport(&self) -> OrthoViewport {
        OrthoViewport::new(self.orientation, self.width, self.height)
            .with_center(Vec3::from(self.center))
            .with_units_per_pixel(self.units_per_pixel)
    }

    pub(crate) fn cursor(&self) -> Vec3 {
        Vec3::from(self.cursor)
    }
}

/// Map a `KeyboardEvent.key` value onto a session key.
///
/// Letter keys are matched case-insensitively so that shift-held presses
/// still switch modes. Anything else maps to [`Key::Other`].
pub(crate) fn key_from_name(name: &str) -> Key {
    match name {
        "Enter" | "NumpadEnter" => Key::Enter,
        "Escape" | "Esc" => Key::Escape,
        "Control" => Key::Ctrl,
        "Shift" => Key::Shift,
        _ => match name.to_ascii_lowercase().as_str() {
            "g" => Key::G,
            "r" => Key::R,
            "s" => Key::S,
            "x" => Key::X,
            "y" => Key::Y,
            "a" => Key::A,
            _ => Key::Other,
        },
    }
}

/// Map a `MouseEvent.button` index onto a pointer button.
pub(crate) fn button_from_index(index: i16) -> Option<PointerButton> {
    match index {
        0 => Some(PointerButton::Left),
        1 => Some(PointerButton::Middle),
        2 => Some(PointerButton::Right),
        _ => None,
    }
}

/// Wheel direction from `WheelEvent.deltaY`; scrolling away from the user
/// (negative delta) is "up".
pub(crate) fn wheel_from_delta(delta_y: f64) -> Option<WheelDirection> {
    if delta_y < 0.0 {
        Some(WheelDirection::Up)
    } else if delta_y > 0.0 {
        Some(WheelDirection::Down)
    } else {
        None
    }
}

/// Client pixel (y down) to region pixel (y up).
pub(crate) fn region_from_client(x: f32, y: f32, height: f32) -> Vec2 {
    Vec2::new(x, height - y)
}

/// Region pixel (y up) to client pixel (y down).
pub(crate) fn client_from_region(region: Vec2, height: f32) -> Vec2 {
    Vec2::new(region.x, height - region.y)
}

pub(crate) fn status_name(status: OperatorStatus) -> String {
    match status {
        OperatorStatus::Running => "RUNNING",
        OperatorStatus::Finished => "FINISHED",
        OperatorStatus::Cancelled => "CANCELLED",
    }
    .to_string()
}
