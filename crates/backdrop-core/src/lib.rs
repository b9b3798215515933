//! Backdrop Core - Background image transform library
//!
//! This crate provides the interactive move, rotate and scale tool for
//! background reference images shown in axis-aligned orthographic views,
//! including view orientation detection, pivot resolution, the modal
//! session state machine and an in-memory viewport host.
//!
//! The session talks to its surroundings only through the traits in
//! [`host`], so the same state machine drives a native editor, the WASM
//! bindings and the test suite.

pub mod error;
pub mod host;
pub mod image;
pub mod operator;
pub mod orientation;
pub mod pivot;
pub mod projection;
pub mod session;
pub mod settings;
pub mod viewport;

pub use error::SessionError;
pub use host::{FeedbackSink, Host, ImageList, ImageRepository, OverlayLine, ViewQuery};
pub use image::{BackgroundImage, ImageRecord, ImageSet};
pub use operator::{OperatorStatus, TransformOperator, NO_IMAGE_WARNING};
pub use orientation::{ImageViewAxis, ViewOrientation};
pub use pivot::{resolve_pivot, PivotMode};
pub use session::input::{InputEvent, InputKind, Key, PointerButton, WheelDirection};
pub use session::{Axis, SessionState, SessionStatus, TransformMode, TransformSession};
pub use settings::{MemorySettingsStore, PersistentSettings, SettingsStore, TransformConfig};
pub use viewport::{FeedbackLog, MemoryHost, OrthoViewport};

pub use glam::{Quat, Vec2, Vec3};
