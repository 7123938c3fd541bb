pub mod build;
pub mod decode;
pub mod inspect;
pub mod transmit;
