//! EMV Card - Command APDUs, response parsing and card transport
//!
//! Builds ISO 7816-4 / EMV command APDUs, parses responses and status words,
//! constructs GET PROCESSING OPTIONS from a PDOL and locates records through
//! the AFL. Byte exchange goes through [`CardTransport`], implemented here
//! for PC/SC cards.

pub mod apdu;
pub mod error;
pub mod gpo;
pub mod reader;
pub mod record;
pub mod status;
pub mod transport;

pub use apdu::{aids, commands, instruction_name, ApduCommand, ApduResponse};
pub use error::CardError;
pub use gpo::{GpoApdu, GpoResponse};
pub use reader::CardReader;
pub use record::{AflEntry, ApplicationFileLocator, Record};
pub use transport::CardTransport;

pub use emv_common::{Error, Result};

/// Re-export commonly used types
pub use pcsc::{Card, Context, Error as PcscError};
