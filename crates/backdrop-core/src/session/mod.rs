//! The modal transform state machine.
//!
//! A [`TransformSession`] turns a stream of [`InputEvent`]s into offset,
//! rotation, scale and flip changes of the background images visible in an
//! axis-aligned orthographic view.
//!
//! # Update Model
//!
//! Each update recomputes every participating image from its snapshot and
//! the current input:
//!
//! 1. Unproject the mouse into world space and view space
//! 2. Resolve the pivot for the current participants
//! 3. Apply the active mode (translate, rotate or scale) with snap,
//!    precision and axis constraint modifiers
//! 4. Push the header text and overlay line to the host
//!
//! Only the rotation turn counter and the scale flip state carry over from
//! one frame to the next (see [`accumulator`]). Switching mode, cycling the
//! active image or toggling transform-all restores the snapshot first, so
//! edits from different modes never compound.

pub mod accumulator;
pub mod feedback;
pub mod input;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::host::{Host, OverlayLine};
use crate::image::ImageSet;
use crate::orientation::ViewOrientation;
use crate::pivot::{resolve_pivot, PivotMode};
use crate::projection::{angle_signed, cross, space_to_view_vector, view_to_region_vector};
use crate::settings::{PersistentSettings, TransformConfig};

use accumulator::Accumulator;
use feedback::{status_text, Readout};
use input::{Action, InputEvent, WheelDirection};

/// Active sub-mode of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransformMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

/// View-space axis a translation is constrained to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Finished,
    Cancelled,
}

/// Result of handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    /// Confirmed; the settings should be persisted.
    Finished(PersistentSettings),
    /// Cancelled; every image has been restored.
    Cancelled,
}

/// Modifier state for one update.
#[derive(Debug, Clone, Copy, Default)]
struct Modifiers {
    snap: bool,
    precision: bool,
}

/// One interactive transform, from invoke to confirm or cancel.
#[derive(Debug, Clone)]
pub struct TransformSession {
    config: TransformConfig,
    mode: TransformMode,
    orientation: ViewOrientation,
    constraint: Option<Axis>,
    transform_all: bool,
    active_image: usize,
    images: ImageSet,
    accumulator: Accumulator,
    initial_mouse_region: Vec2,
    initial_mouse_world: Vec3,
    overlay: Option<OverlayLine>,
    state: SessionState,
}

impl TransformSession {
    /// Start a session at the pointer position of `event`.
    ///
    /// The camera orientation and the set of valid images are fixed here for
    /// the whole session. Mode, active image and transform-all come from
    /// `settings`; the active index is clamped to the valid images.
    ///
    /// # Errors
    ///
    /// - [`SessionError::UndefinedOrientation`] if the camera is not
    ///   axis-aligned
    /// - [`SessionError::NoValidImages`] if no visible image belongs to the
    ///   view
    pub fn invoke<H: Host + ?Sized>(
        host: &mut H,
        event: &InputEvent,
        settings: PersistentSettings,
        config: TransformConfig,
    ) -> Result<Self, SessionError> {
        let orientation = ViewOrientation::from_rotation(host.view_rotation());
        if !orientation.is_defined() {
            return Err(SessionError::UndefinedOrientation);
        }

        let images = ImageSet::collect(&*host, orientation);
        if images.is_empty() {
            return Err(SessionError::NoValidImages);
        }

        let active_image = settings.active_image.min(images.len() - 1);
        log::debug!(
            "transform session started: {:?} view, {} image(s), mode {:?}",
            orientation,
            images.len(),
            settings.mode
        );

        let mut session = Self {
            config,
            mode: settings.mode,
            orientation,
            constraint: None,
            transform_all: settings.transform_all,
            active_image,
            images,
            accumulator: Accumulator::default(),
            initial_mouse_region: event.mouse,
            initial_mouse_world: host.region_to_world(event.mouse),
            overlay: None,
            state: SessionState::Running,
        };
        session.update(host, event);
        Ok(session)
    }

    /// Process one host event.
    ///
    /// Events arriving after the session ended are ignored and report the
    /// terminal status again.
    pub fn handle_event<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        event: &InputEvent,
    ) -> SessionStatus {
        match self.state {
            SessionState::Running => {}
            SessionState::Finished => return SessionStatus::Finished(self.settings()),
            SessionState::Cancelled => return SessionStatus::Cancelled,
        }

        match event.kind.action() {
            Action::Recompute => self.update(host, event),
            Action::Translate => self.switch_mode(host, event, TransformMode::Translate),
            Action::Rotate => self.switch_mode(host, event, TransformMode::Rotate),
            Action::Scale => self.switch_mode(host, event, TransformMode::Scale),
            Action::ConstrainX => {
                self.toggle_constraint(Axis::X);
                self.update(host, event);
            }
            Action::ConstrainY => {
                self.toggle_constraint(Axis::Y);
                self.update(host, event);
            }
            Action::ToggleTransformAll => self.toggle_transform_all(host, event),
            Action::NextImage => self.cycle_image(host, event, WheelDirection::Up),
            Action::PreviousImage => self.cycle_image(host, event, WheelDirection::Down),
            Action::Confirm => return self.confirm(),
            Action::Cancel => return self.cancel(host),
            Action::Ignore => {}
        }

        SessionStatus::Running
    }

    /// Restore the participants, change mode and recompute.
    pub fn switch_mode<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        event: &InputEvent,
        mode: TransformMode,
    ) {
        self.reset(host);
        self.mode = mode;
        log::debug!("mode switched to {:?}", mode);
        self.update(host, event);
    }

    /// Constrain translation to `axis`, or release it if already active.
    pub fn toggle_constraint(&mut self, axis: Axis) {
        self.constraint = if self.constraint == Some(axis) {
            None
        } else {
            Some(axis)
        };
        log::debug!("axis constraint {:?}", self.constraint);
    }

    /// Switch between transforming the active image and every valid image.
    pub fn toggle_transform_all<H: Host + ?Sized>(&mut self, host: &mut H, event: &InputEvent) {
        self.reset(host);
        self.transform_all = !self.transform_all;
        log::debug!("transform all = {}", self.transform_all);
        self.update(host, event);
    }

    /// Make the next (wheel up) or previous (wheel down) image active.
    pub fn cycle_image<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        event: &InputEvent,
        direction: WheelDirection,
    ) {
        self.reset(host);
        let count = self.images.len();
        self.active_image = match direction {
            WheelDirection::Up => (self.active_image + 1) % count,
            WheelDirection::Down => (self.active_image + count - 1) % count,
        };
        log::debug!("active image {}/{}", self.active_image + 1, count);
        self.update(host, event);
    }

    /// Keep the current transforms and end the session.
    pub fn confirm(&mut self) -> SessionStatus {
        self.state = SessionState::Finished;
        log::info!("background image transform confirmed");
        SessionStatus::Finished(self.settings())
    }

    /// Restore every image to its snapshot and end the session.
    pub fn cancel<H: Host + ?Sized>(&mut self, host: &mut H) -> SessionStatus {
        self.images.restore_all(host);
        self.state = SessionState::Cancelled;
        log::info!("background image transform cancelled");
        SessionStatus::Cancelled
    }

    /// Recompute every participating image for the current input.
    pub fn update<H: Host + ?Sized>(&mut self, host: &mut H, event: &InputEvent) {
        let pivot_mode = host.pivot_mode();
        let Some(pivot) = resolve_pivot(
            pivot_mode,
            self.orientation,
            host.cursor_location(),
            &self.images,
            self.active_image,
            self.transform_all,
        ) else {
            return;
        };

        let mouse_world = host.region_to_world(event.mouse);
        let modifiers = Modifiers {
            snap: event.ctrl,
            precision: event.shift,
        };

        let readout = match self.mode {
            TransformMode::Translate => self.apply_translate(host, mouse_world, modifiers),
            TransformMode::Rotate => self.apply_rotate(host, mouse_world, pivot, pivot_mode, modifiers),
            TransformMode::Scale => self.apply_scale(host, mouse_world, pivot, pivot_mode, modifiers),
        };

        let text = status_text(
            readout,
            self.active_image,
            self.images.len(),
            self.transform_all,
            self.constraint,
        );
        host.set_status(Some(&text));

        self.overlay = match self.mode {
            TransformMode::Translate => None,
            TransformMode::Rotate | TransformMode::Scale => {
                view_to_region_vector(&*host, self.orientation, pivot).map(|start| OverlayLine {
                    start,
                    end: event.mouse,
                })
            }
        };
        host.set_overlay(self.overlay);
    }

    fn apply_translate<H: Host + ?Sized>(
        &self,
        host: &mut H,
        mouse_world: Vec3,
        modifiers: Modifiers,
    ) -> Readout {
        let delta = space_to_view_vector(self.orientation, mouse_world - self.initial_mouse_world);
        let mut readout = Vec2::ZERO;

        for (position, record) in self.images.participants(self.active_image, self.transform_all) {
            let mut offset = Vec2::new(delta.x, delta.y * record.aspect);

            if modifiers.snap {
                let step = self.config.translate_snap_step;
                offset = (offset / step).floor() * step;
            }
            if modifiers.precision {
                offset *= self.config.translate_precision;
            }
            match self.constraint {
                Some(Axis::X) => offset.y = 0.0,
                Some(Axis::Y) => offset.x = 0.0,
                None => {}
            }

            host.set_offset(record.index, record.initial_offset + offset);
            if position == self.active_image {
                readout = offset;
            }
        }

        Readout::Translate(readout)
    }

    fn apply_rotate<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        mouse_world: Vec3,
        pivot: Vec2,
        pivot_mode: PivotMode,
        modifiers: Modifiers,
    ) -> Readout {
        let initial_vector = space_to_view_vector(self.orientation, self.initial_mouse_world) - pivot;
        let current_vector = space_to_view_vector(self.orientation, mouse_world) - pivot;

        let raw = if initial_vector.length_squared() > 0.0 && current_vector.length_squared() > 0.0 {
            angle_signed(initial_vector, current_vector)
        } else {
            0.0
        };

        let mut rotation_offset = self
            .accumulator
            .rotation
            .accumulate(raw, self.config.revolution_threshold);

        if modifiers.snap {
            let step = self.config.rotate_snap_degrees;
            rotation_offset = ((rotation_offset.to_degrees() / step).floor() * step).to_radians();
        }
        if modifiers.precision {
            rotation_offset *= self.config.rotate_precision;
        }

        for (position, record) in self.images.participants(self.active_image, self.transform_all) {
            if pivot_mode.moves_image(position == self.active_image) {
                let arm = record.initial_location_view - pivot;
                if arm.length_squared() > 0.0 {
                    let angle = angle_signed(arm, Vec2::X) - rotation_offset;
                    let location = pivot + Vec2::new(angle.cos(), angle.sin()) * arm.length();
                    host.set_offset(record.index, record.view_to_offset(location));
                }
            }
            host.set_rotation(record.index, record.initial_rotation + rotation_offset);
        }

        Readout::Rotate(rotation_offset)
    }

    fn apply_scale<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        mouse_world: Vec3,
        pivot: Vec2,
        pivot_mode: PivotMode,
        modifiers: Modifiers,
    ) -> Readout {
        let initial_vector = space_to_view_vector(self.orientation, self.initial_mouse_world) - pivot;
        let current_vector = space_to_view_vector(self.orientation, mouse_world) - pivot;

        let mut scale_offset = if initial_vector.length_squared() > 0.0 {
            current_vector.length() / initial_vector.length()
        } else {
            1.0
        };

        if modifiers.snap {
            let step = self.config.scale_snap_step;
            scale_offset = (scale_offset / step).round() * step;
        }
        if modifiers.precision {
            let weight = self.config.scale_precision;
            scale_offset = scale_offset * weight + (1.0 - weight);
        }

        self.accumulator.flip.track(cross(initial_vector, current_vector));
        let flipped = self.accumulator.flip.is_flipped();
        let flip_sign = self.accumulator.flip.sign();

        for (position, record) in self.images.participants(self.active_image, self.transform_all) {
            if pivot_mode.moves_image(position == self.active_image) {
                let toward_pivot = pivot - record.initial_location_view;
                if toward_pivot.length_squared() > 0.0 {
                    let location = record.initial_location_view
                        + toward_pivot * (1.0 - scale_offset * flip_sign);
                    host.set_offset(record.index, record.view_to_offset(location));
                }
            }
            host.set_size(record.index, record.initial_size * scale_offset);
            host.set_flip(
                record.index,
                record.initial_flip_x ^ flipped,
                record.initial_flip_y ^ flipped,
            );
        }

        Readout::Scale(scale_offset)
    }

    /// Restore the current participants and clear frame-to-frame state.
    fn reset<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.images
            .restore(host, self.active_image, self.transform_all);
        self.accumulator.reset();
    }

    /// Settings to persist if the session is confirmed now.
    pub fn settings(&self) -> PersistentSettings {
        PersistentSettings {
            active_image: self.active_image,
            mode: self.mode,
            transform_all: self.transform_all,
        }
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    pub fn orientation(&self) -> ViewOrientation {
        self.orientation
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn constraint(&self) -> Option<Axis> {
        self.constraint
    }

    pub fn constrain_x(&self) -> bool {
        self.constraint == Some(Axis::X)
    }

    pub fn constrain_y(&self) -> bool {
        self.constraint == Some(Axis::Y)
    }

    pub fn transform_all(&self) -> bool {
        self.transform_all
    }

    /// Position of the active image among the valid images.
    pub fn active_image(&self) -> usize {
        self.active_image
    }

    pub fn images(&self) -> &ImageSet {
        &self.images
    }

    pub fn revolutions(&self) -> i32 {
        self.accumulator.rotation.revolutions()
    }

    pub fn is_flipped(&self) -> bool {
        self.accumulator.flip.is_flipped()
    }

    pub fn initial_mouse_region(&self) -> Vec2 {
        self.initial_mouse_region
    }

    /// Overlay line of the last update, `None` in translate mode.
    pub fn overlay(&self) -> Option<OverlayLine> {
        self.overlay
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, TAU};

    use glam::{Vec2, Vec3};
    use proptest::prelude::*;

    use super::input::{InputEvent, Key, PointerButton, WheelDirection};
    use super::*;
    use crate::image::BackgroundImage;
    use crate::viewport::{MemoryHost, OrthoViewport};

    const EPS: f32 = 1e-4;

    fn top_host(images: Vec<BackgroundImage>) -> MemoryHost {
        MemoryHost::new(OrthoViewport::new(ViewOrientation::Top, 400.0, 400.0), images)
    }

    /// Region coordinate of a top-view point.
    fn at(host: &MemoryHost, x: f32, y: f32) -> Vec2 {
        host.region_of(Vec3::new(x, y, 0.0))
    }

    fn start_at(host: &mut MemoryHost, x: f32, y: f32) -> TransformSession {
        start_with(host, x, y, PersistentSettings::default())
    }

    fn start_with(
        host: &mut MemoryHost,
        x: f32,
        y: f32,
        settings: PersistentSettings,
    ) -> TransformSession {
        let mouse = at(host, x, y);
        TransformSession::invoke(
            host,
            &InputEvent::pointer_move(mouse),
            settings,
            TransformConfig::default(),
        )
        .unwrap()
    }

    fn move_to(session: &mut TransformSession, host: &mut MemoryHost, x: f32, y: f32) -> SessionStatus {
        let mouse = at(host, x, y);
        session.handle_event(host, &InputEvent::pointer_move(mouse))
    }

    fn press(session: &mut TransformSession, host: &mut MemoryHost, key: Key) -> SessionStatus {
        let mouse = host.feedback.overlay.map(|line| line.end).unwrap_or(Vec2::ZERO);
        session.handle_event(host, &InputEvent::key_press(key, mouse))
    }

    /// Press a key with the pointer at a known view location.
    fn press_at(
        session: &mut TransformSession,
        host: &mut MemoryHost,
        key: Key,
        x: f32,
        y: f32,
    ) -> SessionStatus {
        let mouse = at(host, x, y);
        session.handle_event(host, &InputEvent::key_press(key, mouse))
    }

    fn assert_vec_close(actual: Vec2, expected: Vec2) {
        assert!(
            (actual - expected).length() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!((actual - expected).abs() < EPS, "expected {expected}, got {actual}");
    }

    // =========================================================================
    // Translate
    // =========================================================================

    #[test]
    fn test_translate_follows_world_delta() {
        let mut host = top_host(vec![BackgroundImage::new(200, 100).with_offset(0.5, 0.25)]);
        let mut session = start_at(&mut host, 0.0, 0.0);

        move_to(&mut session, &mut host, 2.0, 0.0);

        assert_vec_close(host.images[0].offset, Vec2::new(2.5, 0.25));
        assert_eq!(session.mode(), TransformMode::Translate);
    }

    #[test]
    fn test_translate_y_is_aspect_corrected() {
        let mut host = top_host(vec![BackgroundImage::new(200, 100)]);
        let mut session = start_at(&mut host, 0.0, 0.0);

        move_to(&mut session, &mut host, 0.0, 1.0);

        assert_vec_close(host.images[0].offset, Vec2::new(0.0, 2.0));
    }

    #[test]
    fn test_translate_snap_floors_to_whole_units() {
        let mut host = top_host(vec![BackgroundImage::new(100, 100)]);
        let mut session = start_at(&mut host, 0.0, 0.0);

        let mouse = at(&host, 1.7, -0.3);
        session.handle_event(&mut host, &InputEvent::pointer_move(mouse).with_ctrl(true));

        assert_vec_close(host.images[0].offset, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_translate_precision_scales_down() {
        let mut host = top_host(vec![BackgroundImage::new(100, 100)]);
        let mut session = start_at(&mut host, 0.0, 0.0);

        let mouse = at(&host, 1.7, -0.3);
        session.handle_event(&mut host, &InputEvent::pointer_move(mouse).with_shift(true));

        assert_vec_close(host.images[0].offset, Vec2::new(0.17, -0.03));
    }

    #[test]
    fn test_translate_constraints() {
        let mut host = top_host(vec![BackgroundImage::new(100, 100)]);
        let mut session = start_at(&mut host, 0.0, 0.0);

        press_at(&mut session, &mut host, Key::X, 1.5, 0.5);
        assert_vec_close(host.images[0].offset, Vec2::new(1.5, 0.0));

        press_at(&mut session, &mut host, Key::Y, 1.5, 0.5);
        assert_vec_close(host.images[0].offset, Vec2::new(0.0, 0.5));

        press_at(&mut session, &mut host, Key::Y, 1.5, 0.5);
        assert_vec_close(host.images[0].offset, Vec2::new(1.5, 0.5));
    }

    #[test]
    fn test_translate_in_front_view_uses_xz() {
        let mut host = MemoryHost::new(
            OrthoViewport::new(ViewOrientation::Front, 400.0, 400.0),
            vec![BackgroundImage::new(100, 100)],
        );
        let start = host.region_of(Vec3::ZERO);
        let mut session = TransformSession::invoke(
            &mut host,
            &InputEvent::pointer_move(start),
            PersistentSettings::default(),
            TransformConfig::default(),
        )
        .unwrap();

        let mouse = host.region_of(Vec3::new(1.0, 0.0, 0.5));
        session.handle_event(&mut host, &InputEvent::pointer_move(mouse));

        assert_eq!(session.orientation(), ViewOrientation::Front);
        assert_vec_close(host.images[0].offset, Vec2::new(1.0, 0.5));
    }

    #[test]
    fn test_translate_status_and_no_overlay() {
        let mut host = top_host(vec![BackgroundImage::new(100, 100)]);
        let mut session = start_at(&mut host, 0.0, 0.0);

        move_to(&mut session, &mut host, 2.0, 0.0);

        let status = host.feedback.status.clone().unwrap();
        assert!(status.starts_with("[1/1] Dx: 2.0000 Dy: 0.0000"), "{status}");
        assert!(host.feedback.overlay.is_none());
        assert!(session.overlay().is_none());
    }

    // =========================================================================
    // Rotate
    // =========================================================================

    #[test]
    fn test_rotate_snap_rounds_down_to_five_degrees() {
        let mut host = top_host(vec![BackgroundImage::new(100, 100)]);
        let mut session = start_at(&mut host, 1.0, 0.0);
        press_at(&mut session, &mut host, Key::R, 1.0, 0.0);

        let theta: f32 = 0.1234;
        let mouse = at(&host, theta.cos(), -theta.sin());
        session.handle_event(&mut host, &InputEvent::pointer_move(mouse).with_ctrl(true));

        assert_close(host.images[0].rotation, 5.0f32.to_radians());
    }

    #[test]
    fn test_rotate_precision() {
        let mut host = top_host(vec![BackgroundImage::new(100, 100)]);
        let mut session = start_at(&mut host, 1.0, 0.0);
        press_at(&mut session, &mut host, Key::R, 1.0, 0.0);

        let mouse = at(&host, 0.0, -1.0);
        session.handle_event(&mut host, &InputEvent::pointer_move(mouse).with_shift(true));

        assert_close(host.images[0].rotation, FRAC_PI_2 * 0.1);
    }

    #[test]
    fn test_rotate_adds_to_initial_rotation() {
        let mut image = BackgroundImage::new(100, 100);
        image.rotation = 0.25;
        let mut host = top_host(vec![image]);
        let mut session = start_at(&mut host, 1.0, 0.0);
        press_at(&mut session, &mut host, Key::R, 1.0, 0.0);

        move_to(&mut session, &mut host, 0.0, -1.0);

        assert_close(host.images[0].rotation, 0.25 + FRAC_PI_2);
        // Pivot is the image itself: no orbit.
        assert_eq!(host.images[0].offset, Vec2::ZERO);
    }

    #[test]
    fn test_rotation_wraps_continuously_across_seam() {
        let mut host = top_host(vec![BackgroundImage::new(100, 100)]);
        let mut session = start_at(&mut host, 1.0, 0.0);
        press_at(&mut session, &mut host, Key::R, 1.0, 0.0);

        // Clockwise angle 3.0, then past the seam where the raw angle reads -3.0.
        let before: f32 = 3.0;
        let after: f32 = TAU - 3.0;
        move_to(&mut session, &mut host, before.cos(), -before.sin());
        let rotation_before = host.images[0].rotation;
        assert_eq!(session.revolutions(), 0);

        move_to(&mut session, &mut host, after.cos(), -after.sin());
        let rotation_after = host.images[0].rotation;

        assert_eq!(session.revolutions(), 1);
        assert_close(rotation_before, before);
        assert_close(rotation_after, after);
        assert!((rotation_after - rotation_before).abs() < 0.3);

        // Sweeping back across the seam removes the turn again.
        move_to(&mut session, &mut host, before.cos(), -before.sin());
        assert_eq!(session.revolutions(), 0);
        assert_close(host.images[0].rotation, before);
    }

    #[test]
    fn test_rotate_orbits_around_cursor() {
        let mut host = top_host(vec![BackgroundImage::new(100, 100).with_offset(2.0, 0.0)])
            .with_pivot(PivotMode::Cursor);
        let mut session = start_at(&mut host, 1.0, 0.0);
        press_at(&mut session, &mut host, Key::R, 1.0, 0.0);

        move_to(&mut session, &mut host, 0.0, -1.0);

        assert_vec_close(host.images[0].offset, Vec2::new(0.0, -2.0));
        assert_close(host.images[0].rotation, FRAC_PI_2);
    }

    #[test]
    fn test_rotate_orbit_is_aspect_corrected() {
        let mut host = top_host(vec![BackgroundImage::new(200, 100).with_offset(2.0, 0.0)])
            .with_pivot(PivotMode::Cursor);
        let mut session = start_at(&mut host, 1.0, 0.0);
        press_at(&mut session, &mut host, Key::R, 1.0, 0.0);

        // Counter-clockwise quarter turn: view location (0, 2), offset y doubled.
        move_to(&mut session, &mut host, 0.0, 1.0);

        assert_vec_close(host.images[0].offset, Vec2::new(0.0, 4.0));
    }

    #[test]
    fn test_rotate_active_element_orbits_others_only() {
        let images = vec![
            BackgroundImage::new(100, 100),
            BackgroundImage::new(100, 100).with_offset(2.0, 0.0),
        ];
        let mut host = top_host(images).with_pivot(PivotMode::ActiveElement);
        let settings = PersistentSettings {
            active_image: 0,
            mode: TransformMode::Rotate,
            transform_all: true,
        };
        let mut session = start_with(&mut host, 1.0, 0.0, settings);

        move_to(&mut session, &mut host, 0.0, -1.0);

        assert_eq!(host.images[0].offset, Vec2::ZERO);
        assert_close(host.images[0].rotation, FRAC_PI_2);
        assert_vec_close(host.images[1].offset, Vec2::new(0.0, -2.0));
        assert_close(host.images[1].rotation, FRAC_PI_2);
    }

    #[test]
    fn test_image_origin_group_orbits_stored_offset() {
        // Active image has aspect 2: its stored offset (2, 2) sits at view
        // location (2, 1), but the group pivots on the stored offset.
        let images = vec![
            BackgroundImage::new(200, 100).with_offset(2.0, 2.0),
            BackgroundImage::new(100, 100).with_offset(4.0, 2.0),
        ];
        let mut host = top_host(images);
        let settings = PersistentSettings {
            active_image: 0,
            mode: TransformMode::Rotate,
            transform_all: true,
        };
        let mut session = start_with(&mut host, 3.0, 2.0, settings);

        move_to(&mut session, &mut host, 2.0, 1.0);

        assert_eq!(host.images[0].offset, Vec2::new(2.0, 2.0));
        assert_close(host.images[0].rotation, FRAC_PI_2);
        assert_vec_close(host.images[1].offset, Vec2::new(2.0, 0.0));
        assert_close(host.images[1].rotation, FRAC_PI_2);
    }

    #[test]
    fn test_rotate_overlay_starts_at_pivot() {
        let mut host = top_host(vec![BackgroundImage::new(100, 100).with_offset(1.0, 1.0)]);
        let mut session = start_at(&mut host, 2.0, 1.0);
        press_at(&mut session, &mut host, Key::R, 2.0, 1.0);

        let mouse = at(&host, 1.0, 2.0);
        session.handle_event(&mut host, &InputEvent::pointer_move(mouse));

        let overlay = host.feedback.overlay.unwrap();
        assert_vec_close(overlay.start, at(&host, 1.0, 1.0));
        assert_eq!(overlay.end, mouse);
        assert!(host.feedback.status.clone().unwrap().contains("Rot: "));
    }

    #[test]
    fn test_rotate_with_mouse_on_pivot_is_guarded() {
        let mut host = top_host(vec![BackgroundImage::new(100, 100).with_offset(1.0, 0.0)])
            .with_pivot(PivotMode::Cursor);
        let mut session = start_at(&mut host, 0.0, 0.0);
        press_at(&mut session, &mut host, Key::R, 0.0, 0.0);

        move_to(&mut session, &mut host, 0.0, -1.0);

        assert_eq!(host.images[0].rotation, 0.0);
        assert_eq!(host.images[0].offset, Vec2::new(1.0, 0.0));
    }

    // =========================================================================
    // Scale
    // =========================================================================

    #[test]
    fn test_scale_precision_remaps_ratio() {
        let mut image = BackgroundImage::new(100, 100);
        image.size = 2.0;
        let mut host = top_host(vec![image]);
        let mut session = start_at(&mut host, 1.0, 0.0);
        press_at(&mut session, &mut host, Key::S, 1.0, 0.0);

        let mouse = at(&host, 1.8, 0.0);
        session.handle_event(&mut host, &InputEvent::pointer_move(mouse).with_shift(true));

        assert_close(host.images[0].size, 2.0 * 1.4);
        assert!(!host.images[0].flip_x);
    }

    #[test]
    fn test_scale_snap_rounds_to_tenths() {
        let mut host = top_host(vec![BackgroundImage::new(100, 100)]);
        let mut session = start_at(&mut host, 1.0, 0.0);
        press_at(&mut session, &mut host, Key::S, 1.0, 0.0);

        let mouse = at(&host, 1.26, 0.0);
        session.handle_event(&mut host, &InputEvent::pointer_move(mouse).with_ctrl(true));

        assert_close(host.images[0].size, 1.3);
    }

    #[test]
    fn test_scale_flip_toggles_once_per_crossing() {
        let mut host = top_host(vec![BackgroundImage::new(100, 100)]);
        let mut session = start_at(&mut host, 1.0, 0.0);
        press_at(&mut session, &mut host, Key::S, 1.0, 0.0);

        move_to(&mut session, &mut host, 1.0, 0.5);
        assert!(!host.images[0].flip_x);

        move_to(&mut session, &mut host, 1.0, -0.5);
        assert!(host.images[0].flip_x);
        assert!(host.images[0].flip_y);
        assert!(session.is_flipped());
        let size_after_flip = host.images[0].size;
        assert!(size_after_flip > 0.0);
        assert_close(size_after_flip, 1.25f32.sqrt());

        move_to(&mut session, &mut host, 1.0, -0.7);
        assert!(host.images[0].flip_x);

        move_to(&mut session, &mut host, 1.0, 0.2);
        assert!(!host.images[0].flip_x);
        assert!(!host.images[0].flip_y);
    }

    #[test]
    fn test_scale_flip_respects_initial_flags() {
        let mut image = BackgroundImage::new(100, 100);
        image.flip_x = true;
        let mut host = top_host(vec![image]);
        let mut session = start_at(&mut host, 1.0, 0.0);
        press_at(&mut session, &mut host, Key::S, 1.0, 0.0);

        move_to(&mut session, &mut host, 1.0, 0.5);
        move_to(&mut session, &mut host, 1.0, -0.5);

        assert!(!host.images[0].flip_x);
        assert!(host.images[0].flip_y);
    }

    #[test]
    fn test_scale_moves_toward_cursor() {
        let mut host = top_host(vec![BackgroundImage::new(100, 100).with_offset(2.0, 0.0)])
            .with_pivot(PivotMode::Cursor);
        let mut session = start_at(&mut host, 1.0, 0.0);
        press_at(&mut session, &mut host, Key::S, 1.0, 0.0);

        move_to(&mut session, &mut host, 2.0, 0.0);

        assert_vec_close(host.images[0].offset, Vec2::new(4.0, 0.0));
        assert_close(host.images[0].size, 2.0);
    }

    #[test]
    fn test_scale_about_median_of_all_images() {
        let images = vec![
            BackgroundImage::new(100, 100).with_offset(-1.0, 0.0),
            BackgroundImage::new(100, 100).with_offset(1.0, 0.0),
        ];
        let mut host = top_host(images).with_pivot(PivotMode::MedianPoint);
        let settings = PersistentSettings {
            active_image: 0,
            mode: TransformMode::Scale,
            transform_all: true,
        };
        let mut session = start_with(&mut host, 2.0, 0.0, settings);

        move_to(&mut session, &mut host, 1.0, 0.0);

        assert_vec_close(host.images[0].offset, Vec2::new(-0.5, 0.0));
        assert_vec_close(host.images[1].offset, Vec2::new(0.5, 0.0));
        assert_close(host.images[0].size, 0.5);
        assert_close(host.images[1].size, 0.5);
    }

    #[test]
    fn test_scale_with_mouse_starting_on_pivot_is_guarded() {
        let mut host = top_host(vec![BackgroundImage::new(100, 100)]);
        let mut session = start_at(&mut host, 0.0, 0.0);
        press_at(&mut session, &mut host, Key::S, 0.0, 0.0);

        move_to(&mut session, &mut host, 3.0, 1.0);

        assert_eq!(host.images[0].size, 1.0);
        assert!(host.images[0].size.is_finite());
    }

    // =========================================================================
    // Session control
    // =========================================================================

    #[test]
    fn test_wheel_down_wraps_to_last_image() {
        let images = vec![
            BackgroundImage::new(100, 100),
            BackgroundImage::new(100, 100),
            BackgroundImage::new(100, 100),
        ];
        let mut host = top_host(images);
        let mut session = start_at(&mut host, 0.0, 0.0);
        assert_eq!(session.active_image(), 0);

        let mouse = at(&host, 0.0, 0.0);
        session.handle_event(&mut host, &InputEvent::wheel(WheelDirection::Down, mouse));
        assert_eq!(session.active_image(), 2);

        session.handle_event(&mut host, &InputEvent::wheel(WheelDirection::Up, mouse));
        assert_eq!(session.active_image(), 0);

        session.handle_event(&mut host, &InputEvent::wheel(WheelDirection::Up, mouse));
        assert_eq!(session.active_image(), 1);
    }

    #[test]
    fn test_cycling_restores_previous_image() {
        let images = vec![
            BackgroundImage::new(100, 100).with_offset(0.3, 0.3),
            BackgroundImage::new(100, 100).with_offset(-0.3, 0.1),
        ];
        let mut host = top_host(images.clone());
        let mut session = start_at(&mut host, 0.0, 0.0);

        move_to(&mut session, &mut host, 1.0, 1.0);
        let mouse = at(&host, 1.0, 1.0);
        session.handle_event(&mut host, &InputEvent::wheel(WheelDirection::Up, mouse));

        assert_eq!(host.images[0], images[0]);
        assert_vec_close(host.images[1].offset, Vec2::new(0.7, 1.1));
    }

    #[test]
    fn test_mode_switch_restores_before_recompute() {
        let mut host = top_host(vec![BackgroundImage::new(100, 100).with_offset(0.5, 0.5)]);
        let mut session = start_at(&mut host, 1.0, 0.0);

        move_to(&mut session, &mut host, 2.0, 1.0);
        assert_vec_close(host.images[0].offset, Vec2::new(1.5, 1.5));

        press_at(&mut session, &mut host, Key::R, 2.0, 1.0);

        assert_eq!(session.mode(), TransformMode::Rotate);
        assert_eq!(host.images[0].offset, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_transform_all_toggle() {
        let images = vec![
            BackgroundImage::new(100, 100),
            BackgroundImage::new(100, 100).with_offset(1.0, 1.0),
        ];
        let mut host = top_host(images);
        let mut session = start_at(&mut host, 0.0, 0.0);

        move_to(&mut session, &mut host, 0.5, 0.0);
        assert_vec_close(host.images[0].offset, Vec2::new(0.5, 0.0));
        assert_eq!(host.images[1].offset, Vec2::new(1.0, 1.0));

        press_at(&mut session, &mut host, Key::A, 0.5, 0.0);
        assert!(session.transform_all());
        assert_vec_close(host.images[0].offset, Vec2::new(0.5, 0.0));
        assert_vec_close(host.images[1].offset, Vec2::new(1.5, 1.0));
        assert!(host.feedback.status.clone().unwrap().starts_with("[all 2]"));

        press_at(&mut session, &mut host, Key::A, 0.5, 0.0);
        assert!(!session.transform_all());
        assert_eq!(host.images[1].offset, Vec2::new(1.0, 1.0));
        assert_eq!(session.mode(), TransformMode::Translate);
    }

    #[test]
    fn test_constraint_toggle_semantics() {
        let mut host = top_host(vec![BackgroundImage::new(100, 100)]);
        let mut session = start_at(&mut host, 0.0, 0.0);

        press(&mut session, &mut host, Key::X);
        assert!(session.constrain_x() && !session.constrain_y());

        press(&mut session, &mut host, Key::Y);
        assert!(!session.constrain_x() && session.constrain_y());

        press(&mut session, &mut host, Key::Y);
        assert!(!session.constrain_x() && !session.constrain_y());
    }

    #[test]
    fn test_cancel_restores_everything() {
        let mut image = BackgroundImage::new(300, 200).with_offset(0.2, -0.4);
        image.rotation = 0.7;
        image.size = 1.5;
        image.flip_y = true;
        let original = vec![image, BackgroundImage::new(100, 100).with_offset(1.0, 1.0)];
        let mut host = top_host(original.clone()).with_pivot(PivotMode::Cursor);
        let mut session = start_at(&mut host, 1.0, 0.0);

        press_at(&mut session, &mut host, Key::A, 1.0, 0.0);
        press_at(&mut session, &mut host, Key::S, 1.0, 0.0);
        move_to(&mut session, &mut host, 1.0, 0.5);
        move_to(&mut session, &mut host, -1.0, -0.5);
        press_at(&mut session, &mut host, Key::R, -1.0, -0.5);
        move_to(&mut session, &mut host, 0.3, 0.9);

        let mouse = at(&host, 0.3, 0.9);
        let status = session.handle_event(&mut host, &InputEvent::key_press(Key::Escape, mouse));

        assert_eq!(status, SessionStatus::Cancelled);
        assert_eq!(session.state(), SessionState::Cancelled);
        assert_eq!(host.images, original);
    }

    #[test]
    fn test_confirm_keeps_transforms_and_reports_settings() {
        let mut host = top_host(vec![BackgroundImage::new(100, 100), BackgroundImage::new(100, 100)]);
        let mut session = start_at(&mut host, 0.0, 0.0);

        move_to(&mut session, &mut host, 0.5, 0.5);
        let mouse = at(&host, 0.5, 0.5);
        let status = session.handle_event(&mut host, &InputEvent::button_press(PointerButton::Left, mouse));

        assert_eq!(
            status,
            SessionStatus::Finished(PersistentSettings {
                active_image: 0,
                mode: TransformMode::Translate,
                transform_all: false,
            })
        );
        assert_vec_close(host.images[0].offset, Vec2::new(0.5, 0.5));

        // Ended sessions ignore further input.
        let later_mouse = at(&host, 3.0, 3.0);
        let later = session.handle_event(&mut host, &InputEvent::pointer_move(later_mouse));
        assert!(matches!(later, SessionStatus::Finished(_)));
        assert_vec_close(host.images[0].offset, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_invoke_fails_without_valid_images() {
        let mut host = top_host(vec![BackgroundImage::new(100, 100).hidden()]);
        let result = TransformSession::invoke(
            &mut host,
            &InputEvent::pointer_move(Vec2::ZERO),
            PersistentSettings::default(),
            TransformConfig::default(),
        );
        assert_eq!(result.unwrap_err(), SessionError::NoValidImages);
        assert!(host.feedback.status.is_none());
    }

    #[test]
    fn test_invoke_fails_for_undefined_orientation() {
        let mut host = top_host(vec![BackgroundImage::new(100, 100)]);
        host.viewport = host
            .viewport
            .clone()
            .with_rotation(glam::Quat::from_rotation_y(0.3));
        let result = TransformSession::invoke(
            &mut host,
            &InputEvent::pointer_move(Vec2::ZERO),
            PersistentSettings::default(),
            TransformConfig::default(),
        );
        assert_eq!(result.unwrap_err(), SessionError::UndefinedOrientation);
    }

    // =========================================================================
    // Properties
    // =========================================================================

    #[derive(Debug, Clone)]
    enum Op {
        Move { x: f32, y: f32, ctrl: bool, shift: bool },
        Key(Key),
        Wheel(WheelDirection),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (-3.0f32..3.0, -3.0f32..3.0, any::<bool>(), any::<bool>())
                .prop_map(|(x, y, ctrl, shift)| Op::Move { x, y, ctrl, shift }),
            prop_oneof![
                Just(Key::G),
                Just(Key::R),
                Just(Key::S),
                Just(Key::X),
                Just(Key::Y),
                Just(Key::A),
                Just(Key::Ctrl),
            ]
            .prop_map(Op::Key),
            prop_oneof![Just(WheelDirection::Up), Just(WheelDirection::Down)].prop_map(Op::Wheel),
        ]
    }

    fn pivot_strategy() -> impl Strategy<Value = PivotMode> {
        prop_oneof![
            Just(PivotMode::ImageOrigin),
            Just(PivotMode::Cursor),
            Just(PivotMode::BoundingBoxCenter),
            Just(PivotMode::MedianPoint),
            Just(PivotMode::IndividualOrigins),
            Just(PivotMode::ActiveElement),
        ]
    }

    fn mode_strategy() -> impl Strategy<Value = TransformMode> {
        prop_oneof![
            Just(TransformMode::Translate),
            Just(TransformMode::Rotate),
            Just(TransformMode::Scale),
        ]
    }

    fn sample_images() -> Vec<BackgroundImage> {
        let mut first = BackgroundImage::new(320, 240).with_offset(0.4, -0.2);
        first.rotation = 0.3;
        first.flip_x = true;
        let mut second = BackgroundImage::new(100, 300).with_offset(-1.2, 0.8);
        second.size = 0.75;
        vec![
            first,
            BackgroundImage::new(50, 50).hidden(),
            second,
            BackgroundImage::new(128, 128).with_offset(1.1, 1.3),
        ]
    }

    fn apply(session: &mut TransformSession, host: &mut MemoryHost, op: &Op, last: &mut Vec2) {
        let event = match *op {
            Op::Move { x, y, ctrl, shift } => {
                *last = at(host, x, y);
                InputEvent::pointer_move(*last)
                    .with_ctrl(ctrl)
                    .with_shift(shift)
            }
            Op::Key(key) => InputEvent::key_press(key, *last),
            Op::Wheel(direction) => InputEvent::wheel(direction, *last),
        };
        session.handle_event(host, &event);
    }

    proptest! {
        /// Property: cancel restores every image bit-for-bit after any edit sequence.
        #[test]
        fn prop_cancel_round_trips_snapshot(
            pivot in pivot_strategy(),
            ops in prop::collection::vec(op_strategy(), 0..40),
        ) {
            let original = sample_images();
            let mut host = top_host(original.clone())
                .with_pivot(pivot)
                .with_cursor(Vec3::new(0.5, -0.5, 0.0));
            let mut session = start_at(&mut host, 0.7, 0.4);
            let mut last = at(&host, 0.7, 0.4);

            for op in &ops {
                apply(&mut session, &mut host, op, &mut last);
            }

            let status = session.handle_event(&mut host, &InputEvent::key_press(Key::Escape, last));
            prop_assert_eq!(status, SessionStatus::Cancelled);
            prop_assert_eq!(host.images, original);
        }

        /// Property: recomputing with unchanged input changes nothing.
        #[test]
        fn prop_update_is_idempotent(
            pivot in pivot_strategy(),
            mode in mode_strategy(),
            transform_all in any::<bool>(),
            (x, y) in (-3.0f32..3.0, -3.0f32..3.0),
            ctrl in any::<bool>(),
            shift in any::<bool>(),
        ) {
            let mut host = top_host(sample_images())
                .with_pivot(pivot)
                .with_cursor(Vec3::new(-0.3, 0.2, 0.0));
            let settings = PersistentSettings { active_image: 1, mode, transform_all };
            let mut session = start_with(&mut host, 0.9, -0.6, settings);

            let event = InputEvent::pointer_move(at(&host, x, y))
                .with_ctrl(ctrl)
                .with_shift(shift);
            session.update(&mut host, &event);
            let first = host.images.clone();
            session.update(&mut host, &event);

            prop_assert_eq!(host.images, first);
        }

        /// Property: at most one axis constraint is ever active.
        #[test]
        fn prop_constraints_are_exclusive(
            keys in prop::collection::vec(prop_oneof![Just(Key::X), Just(Key::Y)], 0..30),
        ) {
            let mut host = top_host(vec![BackgroundImage::new(100, 100)]);
            let mut session = start_at(&mut host, 0.0, 0.0);

            for key in keys {
                press(&mut session, &mut host, key);
                prop_assert!(!(session.constrain_x() && session.constrain_y()));
            }
        }

        /// Property: the active index always points into the valid images.
        #[test]
        fn prop_active_index_stays_in_range(
            ops in prop::collection::vec(op_strategy(), 0..40),
        ) {
            let mut host = top_host(sample_images());
            let mut session = start_at(&mut host, 0.0, 0.0);
            let mut last = at(&host, 0.0, 0.0);

            for op in &ops {
                apply(&mut session, &mut host, op, &mut last);
                prop_assert!(session.active_image() < session.images().len());
            }
        }
    }
}
