//! Response validation for tile fetches.

use thiserror::Error;

use crate::provider::TransportOutcome;

/// Why a validator refused a tile response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Drop this tile only; its cell stays empty.
    #[error("tile rejected: {0}")]
    Reject(String),

    /// Fail the whole batch. In-flight requests still run to completion,
    /// but nothing is composited.
    #[error("batch aborted: {0}")]
    Abort(String),
}

/// Decides whether a transport outcome is usable.
///
/// Implemented for plain closures, so ad-hoc policies need no new type:
///
/// ```
/// use mapstitch::fetch::{TileValidator, ValidationError};
/// use mapstitch::provider::TransportOutcome;
///
/// // Treat rate limiting as fatal for the whole request
/// let validator = |_url: &str, outcome: &TransportOutcome| match outcome {
///     Ok(resp) if resp.status == 429 => Err(ValidationError::Abort("rate limited".into())),
///     Ok(resp) if resp.status != 200 => Err(ValidationError::Reject(resp.status.to_string())),
///     Ok(_) => Ok(()),
///     Err(e) => Err(ValidationError::Reject(e.to_string())),
/// };
/// # fn assert_validator<V: TileValidator>(_: &V) {}
/// # assert_validator(&validator);
/// ```
pub trait TileValidator: Send + Sync {
    fn validate(&self, url: &str, outcome: &TransportOutcome) -> Result<(), ValidationError>;
}

/// Rejects transport failures and any status other than 200, tile by tile.
/// It never aborts a batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValidator;

impl TileValidator for DefaultValidator {
    fn validate(&self, _url: &str, outcome: &TransportOutcome) -> Result<(), ValidationError> {
        match outcome {
            Ok(response) if response.status == 200 => Ok(()),
            Ok(response) => Err(ValidationError::Reject(format!(
                "Request returned non-200 status code: {}",
                response.status
            ))),
            Err(e) => Err(ValidationError::Reject(e.to_string())),
        }
    }
}

impl<F> TileValidator for F
where
    F: Fn(&str, &TransportOutcome) -> Result<(), ValidationError> + Send + Sync,
{
    fn validate(&self, url: &str, outcome: &TransportOutcome) -> Result<(), ValidationError> {
        self(url, outcome)
    }
}
