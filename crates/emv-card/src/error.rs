//! Errors from talking to a card

use thiserror::Error;

/// Failure of a command/response exchange
#[derive(Debug, Error)]
pub enum CardError<E: std::error::Error + 'static> {
    /// The transport could not deliver the command
    #[error("Transport error: {0}")]
    Transport(#[source] E),

    /// The response was delivered but rejected
    #[error(transparent)]
    Protocol(#[from] emv_common::Error),
}
