use td_core::error::{RemoteError, ValidationError};
use thiserror::Error;

/// Anything a mutation or session operation can return to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Caught before dispatch; the request never started.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The dispatched request failed, either rejected by the server or
    /// lost to the network.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}
