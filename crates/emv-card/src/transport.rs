//! Byte exchange with a card

/// One command out, one response back
///
/// Implementations own the physical link. Taking `&mut self` keeps a single
/// exchange in flight per transport.
pub trait CardTransport {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send a serialized command APDU and return the raw response, status word included
    fn transmit(&mut self, command: &[u8]) -> Result<Vec<u8>, Self::Error>;
}

impl<T: CardTransport + ?Sized> CardTransport for &mut T {
    type Error = T::Error;

    fn transmit(&mut self, command: &[u8]) -> Result<Vec<u8>, Self::Error> {
        (**self).transmit(command)
    }
}
