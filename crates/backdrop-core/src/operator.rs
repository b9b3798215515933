//! Operator lifecycle around a [`TransformSession`].
//!
//! The operator owns the settings store, turns a refused start into a single
//! user-visible warning, persists settings on confirm and clears the header
//! and overlay when the session ends.

use crate::host::{Host, ImageRepository};
use crate::session::input::InputEvent;
use crate::session::{SessionStatus, TransformSession};
use crate::settings::{SettingsStore, TransformConfig};

/// Warning shown when there is nothing to transform.
pub const NO_IMAGE_WARNING: &str = "No background image found.";

/// Status returned to the host event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorStatus {
    /// Keep delivering events to [`TransformOperator::modal`].
    Running,
    Finished,
    Cancelled,
}

/// Modal background image transform operator.
#[derive(Debug)]
pub struct TransformOperator<S: SettingsStore> {
    store: S,
    config: TransformConfig,
    session: Option<TransformSession>,
}

impl<S: SettingsStore> TransformOperator<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, TransformConfig::default())
    }

    pub fn with_config(store: S, config: TransformConfig) -> Self {
        Self {
            store,
            config,
            session: None,
        }
    }

    /// Returns true if the host has any background image at all.
    pub fn poll<R: ImageRepository + ?Sized>(repository: &R) -> bool {
        repository.image_count() > 0
    }

    /// Start a session from the event that triggered the operator.
    pub fn invoke<H: Host + ?Sized>(&mut self, host: &mut H, event: &InputEvent) -> OperatorStatus {
        let settings = self.store.load();
        match TransformSession::invoke(host, event, settings, self.config.clone()) {
            Ok(session) => {
                self.session = Some(session);
                OperatorStatus::Running
            }
            Err(err) => {
                log::warn!("background image transform refused: {err}");
                host.warn(NO_IMAGE_WARNING);
                self.session = None;
                OperatorStatus::Cancelled
            }
        }
    }

    /// Forward one event to the running session.
    ///
    /// Without a running session this reports `Cancelled`.
    pub fn modal<H: Host + ?Sized>(&mut self, host: &mut H, event: &InputEvent) -> OperatorStatus {
        let Some(session) = self.session.as_mut() else {
            return OperatorStatus::Cancelled;
        };

        match session.handle_event(host, event) {
            SessionStatus::Running => OperatorStatus::Running,
            SessionStatus::Finished(settings) => {
                self.store.save(settings);
                self.finish(host);
                OperatorStatus::Finished
            }
            SessionStatus::Cancelled => {
                self.finish(host);
                OperatorStatus::Cancelled
            }
        }
    }

    fn finish<H: Host + ?Sized>(&mut self, host: &mut H) {
        host.set_status(None);
        host.set_overlay(None);
        self.session = None;
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&TransformSession> {
        self.session.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
