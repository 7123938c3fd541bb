//! PC/SC card reader management

use std::ffi::CString;

use pcsc::{Card, Context, Protocols, Scope, ShareMode, MAX_BUFFER_SIZE};
use tracing::debug;

use crate::transport::CardTransport;

/// Card reader wrapper for managing PC/SC connections
pub struct CardReader {
    context: Context,
}

impl CardReader {
    /// Create a new CardReader by establishing a PC/SC context
    pub fn new() -> Result<Self, pcsc::Error> {
        let context = Context::establish(Scope::User)?;
        Ok(Self { context })
    }

    /// List all available card readers
    pub fn list_readers(&self) -> Result<Vec<String>, pcsc::Error> {
        let mut readers_buf = [0; 2048];
        let readers = self.context.list_readers(&mut readers_buf)?;

        Ok(readers
            .map(|r| r.to_string_lossy().into_owned())
            .collect())
    }

    /// Connect to the first available reader
    pub fn connect_first(&self) -> Result<(Card, String), pcsc::Error> {
        let mut readers_buf = [0; 2048];
        let mut readers = self.context.list_readers(&mut readers_buf)?;

        let reader = readers.next().ok_or(pcsc::Error::NoReadersAvailable)?;
        let reader_name = reader.to_string_lossy().into_owned();
        debug!(reader = %reader_name, "connecting");
        let card = self.context.connect(reader, ShareMode::Shared, Protocols::ANY)?;
        Ok((card, reader_name))
    }

    /// Connect to a specific reader by name
    pub fn connect(&self, reader_name: &str) -> Result<Card, pcsc::Error> {
        let name = CString::new(reader_name).map_err(|_| pcsc::Error::UnknownReader)?;
        debug!(reader = reader_name, "connecting");
        self.context.connect(&name, ShareMode::Shared, Protocols::ANY)
    }
}

impl CardTransport for Card {
    type Error = pcsc::Error;

    fn transmit(&mut self, command: &[u8]) -> Result<Vec<u8>, Self::Error> {
        let mut rapdu_buf = [0; MAX_BUFFER_SIZE];
        let rapdu = Card::transmit(self, command, &mut rapdu_buf)?;
        Ok(rapdu.to_vec())
    }
}
