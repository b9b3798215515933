//! WASM bindings for the modal background image transform.
//!
//! `JsTransformOperator` bundles the core operator with an in-memory
//! orthographic host, so a JavaScript viewport only has to forward DOM
//! events and read back the image list, header text and overlay line.

use crate::types::{
    button_from_index, client_from_region, key_from_name, region_from_client, status_name,
    wheel_from_delta, JsViewDescription,
};
use backdrop_core::{
    BackgroundImage, InputEvent, InputKind, MemoryHost, MemorySettingsStore, OperatorStatus,
    PersistentSettings, PivotMode, SettingsStore, TransformOperator,
};
use glam::Vec3;
use wasm_bindgen::prelude::*;

/// Interactive transform operator for a JavaScript viewport.
///
/// Pointer coordinates are client pixels relative to the viewport element
/// (origin top-left, y down). Every event method returns the operator
/// status as `"RUNNING"`, `"FINISHED"` or `"CANCELLED"`.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const op = new JsTransformOperator(
///   { orientation: "TOP", width: 800, height: 600 },
///   [{ offset: [0, 0], rotation: 0, size: 1, flip_x: false, flip_y: false,
///      pixel_width: 1920, pixel_height: 1080, view_axis: "ALL", visible: true }],
/// );
///
/// op.invoke(e.offsetX, e.offsetY);
/// canvas.onpointermove = (e) => op.pointer_move(e.offsetX, e.offsetY, e.ctrlKey, e.shiftKey);
/// window.onkeydown = (e) => op.key_down(e.key, lastX, lastY, e.ctrlKey, e.shiftKey);
/// ```
#[wasm_bindgen]
pub struct JsTransformOperator {
    operator: TransformOperator<MemorySettingsStore>,
    host: MemoryHost,
    /// Warnings not yet handed to JavaScript.
    warnings: Vec<String>,
}

#[wasm_bindgen]
impl JsTransformOperator {
    /// Create an operator from a view description and an image list.
    ///
    /// # Errors
    /// Returns error if either argument cannot be deserialized
    #[wasm_bindgen(constructor)]
    pub fn new(view: JsValue, images: JsValue) -> Result<JsTransformOperator, JsValue> {
        let view: JsViewDescription = serde_wasm_bindgen::from_value(view)
            .map_err(|e| JsValue::from_str(&format!("Invalid view description: {}", e)))?;
        let images: Vec<BackgroundImage> = serde_wasm_bindgen::from_value(images)
            .map_err(|e| JsValue::from_str(&format!("Invalid image list: {}", e)))?;
        Ok(Self::from_parts(view, images))
    }

    /// True if there is at least one image to work on.
    pub fn poll(&self) -> bool {
        TransformOperator::<MemorySettingsStore>::poll(&self.host.images)
    }

    /// Start a session with the pointer at (`x`, `y`).
    pub fn invoke(&mut self, x: f32, y: f32) -> String {
        let event = InputEvent::pointer_move(self.region(x, y));
        let status = self.operator.invoke(&mut self.host, &event);
        self.forward_warnings();
        status_name(status)
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, ctrl: bool, shift: bool) -> String {
        let event = InputEvent::pointer_move(self.region(x, y))
            .with_ctrl(ctrl)
            .with_shift(shift);
        self.dispatch(event)
    }

    /// Forward a `keydown`; `key` is `KeyboardEvent.key`.
    pub fn key_down(&mut self, key: &str, x: f32, y: f32, ctrl: bool, shift: bool) -> String {
        self.key(key, true, x, y, ctrl, shift)
    }

    /// Forward a `keyup`; only modifier releases have an effect.
    pub fn key_up(&mut self, key: &str, x: f32, y: f32, ctrl: bool, shift: bool) -> String {
        self.key(key, false, x, y, ctrl, shift)
    }

    /// Forward a `pointerdown`; `button` is `MouseEvent.button`.
    pub fn button_down(&mut self, button: i16, x: f32, y: f32) -> String {
        let Some(button) = button_from_index(button) else {
            return self.current_status();
        };
        self.dispatch(InputEvent {
            kind: InputKind::Button {
                button,
                pressed: true,
            },
            mouse: self.region(x, y),
            ctrl: false,
            shift: false,
        })
    }

    /// Forward a `wheel` event; `delta_y` is `WheelEvent.deltaY`.
    pub fn wheel(&mut self, delta_y: f64, x: f32, y: f32) -> String {
        let Some(direction) = wheel_from_delta(delta_y) else {
            return self.current_status();
        };
        self.dispatch(InputEvent::wheel(direction, self.region(x, y)))
    }

    /// Current image list, including images the session does not touch.
    ///
    /// # Errors
    /// Returns error if the list cannot be serialized
    pub fn images(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.host.images)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Replace the image list. Ignored while a session is running.
    ///
    /// # Errors
    /// Returns error if the list cannot be deserialized
    pub fn set_images(&mut self, images: JsValue) -> Result<(), JsValue> {
        let images: Vec<BackgroundImage> = serde_wasm_bindgen::from_value(images)
            .map_err(|e| JsValue::from_str(&format!("Invalid image list: {}", e)))?;
        if !self.operator.is_running() {
            self.host.images = images;
        }
        Ok(())
    }

    /// Header text of the running session, if any.
    pub fn status_text(&self) -> Option<String> {
        self.host.feedback.status.clone()
    }

    /// Pivot-to-pointer line as `[x0, y0, x1, y1]` in client pixels.
    pub fn overlay_line(&self) -> Option<Vec<f32>> {
        let height = self.host.viewport.region_size.y;
        self.host.feedback.overlay.map(|line| {
            let start = client_from_region(line.start, height);
            let end = client_from_region(line.end, height);
            vec![start.x, start.y, end.x, end.y]
        })
    }

    /// Warnings raised since the last call, oldest first.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// Settings the next session starts from.
    ///
    /// # Errors
    /// Returns error if the settings cannot be serialized
    pub fn settings(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.operator.store().load())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// # Errors
    /// Returns error if the settings cannot be deserialized
    pub fn set_settings(&mut self, settings: JsValue) -> Result<(), JsValue> {
        let settings: PersistentSettings = serde_wasm_bindgen::from_value(settings)
            .map_err(|e| JsValue::from_str(&format!("Invalid settings: {}", e)))?;
        self.operator.store_mut().save(settings);
        Ok(())
    }

    /// Update the 3D cursor used by the cursor pivot.
    pub fn set_cursor(&mut self, x: f32, y: f32, z: f32) {
        self.host.cursor = Vec3::new(x, y, z);
    }

    /// Change the pivot mode, e.g. `"BOUNDING_BOX_CENTER"`.
    ///
    /// # Errors
    /// Returns error for an unknown mode name
    pub fn set_pivot_mode(&mut self, mode: JsValue) -> Result<(), JsValue> {
        let mode: PivotMode = serde_wasm_bindgen::from_value(mode)
            .map_err(|e| JsValue::from_str(&format!("Invalid pivot mode: {}", e)))?;
        self.host.pivot_mode = mode;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.operator.is_running()
    }
}

impl JsTransformOperator {
    pub(crate) fn from_parts(view: JsViewDescription, images: Vec<BackgroundImage>) -> Self {
        let host = MemoryHost::new(view.viewport(), images)
            .with_cursor(view.cursor())
            .with_pivot(view.pivot_mode);
        Self {
            operator: TransformOperator::new(MemorySettingsStore::new()),
            host,
            warnings: Vec::new(),
        }
    }

    fn region(&self, x: f32, y: f32) -> glam::Vec2 {
        region_from_client(x, y, self.host.viewport.region_size.y)
    }

    fn key(&mut self, name: &str, pressed: bool, x: f32, y: f32, ctrl: bool, shift: bool) -> String {
        self.dispatch(InputEvent {
            kind: InputKind::Key {
                key: key_from_name(name),
                pressed,
            },
            mouse: self.region(x, y),
            ctrl,
            shift,
        })
    }

    fn dispatch(&mut self, event: InputEvent) -> String {
        if !self.operator.is_running() {
            return status_name(OperatorStatus::Cancelled);
        }
        let status = self.operator.modal(&mut self.host, &event);
        self.forward_warnings();
        status_name(status)
    }

    fn current_status(&self) -> String {
        if self.operator.is_running() {
            status_name(OperatorStatus::Running)
        } else {
            status_name(OperatorStatus::Cancelled)
        }
    }

    /// Move host warnings into the pending queue and the browser console.
    fn forward_warnings(&mut self) {
        for warning in self.host.feedback.warnings.drain(..) {
            #[cfg(target_arch = "wasm32")]
            web_sys::console::warn_1(&JsValue::from_str(&warning));
            self.warnings.push(warning);
        }
    }
}
