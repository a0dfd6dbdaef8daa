//! Error types for the stitching pipeline.
//!
//! Per-tile failures (a rejected response, an undecodable body, a tile that
//! cannot be drawn) never surface here: they are absorbed into absent or
//! placeholder cells. A `StitchError` always means the request as a whole
//! failed.

use thiserror::Error;

use crate::coord::CoordError;

/// Errors that fail a whole stitch request.
#[derive(Debug, Error)]
pub enum StitchError {
    /// Invalid zoom, provider template or target size
    #[error("configuration error: {0}")]
    Config(String),

    /// The tile validator escalated a response to a batch abort
    #[error("tile validation aborted the batch at {url}: {message}")]
    Validation { url: String, message: String },

    /// The tile grid is larger than the configured quota
    #[error("request needs {tiles} tiles, exceeding the limit of {max}")]
    QuotaExceeded { tiles: usize, max: usize },

    /// Image data could not be decoded
    #[error("failed to decode tile {url}: {message}")]
    Decode { url: String, message: String },

    /// The final surface could not be serialized
    #[error("failed to encode image: {0}")]
    Encode(String),

    /// Internal consistency check failed (e.g. antimeridian halves resolved
    /// to different zooms)
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),

    /// A blocking compositing task panicked or was cancelled
    #[error("background task failed: {0}")]
    Task(String),
}

impl From<CoordError> for StitchError {
    fn from(e: CoordError) -> Self {
        StitchError::Config(e.to_string())
    }
}

impl StitchError {
    /// Returns true if the caller supplied a request the stitcher refuses
    /// (as opposed to a failure while serving a valid request).
    pub fn is_client_error(&self) -> bool {
        matches!(self, StitchError::Config(_) | StitchError::QuotaExceeded { .. })
    }
}
