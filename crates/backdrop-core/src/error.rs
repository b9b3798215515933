//! Error types for starting a transform session.

use thiserror::Error;

/// Reasons a session refuses to start.
///
/// Both are local and recoverable; the user can retry from another view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No visible image is attached to the current view.
    #[error("No background image found")]
    NoValidImages,

    /// The camera is not looking down a world axis.
    #[error("View is not aligned to an orthographic axis")]
    UndefinedOrientation,
}
