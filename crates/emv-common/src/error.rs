//! Error type shared by the EMV crates

use thiserror::Error;

/// Result alias used throughout the EMV crates
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while encoding or decoding EMV data
///
/// Each variant is a distinct failure class so callers can tell a card
/// decline (`StatusMismatch`) apart from a local decoding defect
/// (`MalformedTlv`, `MalformedField`) or a caller bug (`Range`, `Format`).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// Malformed textual input such as a hex string
    #[error("Format error: {0}")]
    Format(String),

    /// Numeric value outside the valid domain of a field
    #[error("Value out of range: {0}")]
    Range(String),

    /// Tag or length encoding violates BER rules or region bounds
    #[error("Malformed TLV at offset {offset}: {reason}")]
    MalformedTlv {
        /// Byte offset into the decoded region
        offset: usize,
        /// What was wrong
        reason: &'static str,
    },

    /// Fixed-format EMV field given input of the wrong shape
    #[error("Malformed {field}: {reason}")]
    MalformedField {
        /// Field name
        field: &'static str,
        /// What was wrong
        reason: String,
    },

    /// Response status word or length failed an expected-value check
    #[error("Status mismatch: got {actual:04X}, expected one of {}", format_words(.expected))]
    StatusMismatch {
        /// Status word returned by the card
        actual: u16,
        /// Accepted status words
        expected: Vec<u16>,
        /// Payload length check that failed, as (expected, actual)
        length: Option<(usize, usize)>,
    },
}

impl Error {
    pub(crate) fn tlv(offset: usize, reason: &'static str) -> Self {
        Self::MalformedTlv { offset, reason }
    }

    pub fn field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedField {
            field,
            reason: reason.into(),
        }
    }
}

fn format_words(words: &[u16]) -> String {
    words
        .iter()
        .map(|w| format!("{:04X}", w))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mismatch_display() {
        let err = Error::StatusMismatch {
            actual: 0x6A82,
            expected: vec![0x9000, 0x6283],
            length: None,
        };
        assert_eq!(
            err.to_string(),
            "Status mismatch: got 6A82, expected one of 9000, 6283"
        );
    }

    #[test]
    fn test_tlv_display() {
        let err = Error::tlv(3, "length exceeds region");
        assert_eq!(err.to_string(), "Malformed TLV at offset 3: length exceeds region");
    }
}
