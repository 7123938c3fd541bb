//! Issuer Identification Number (tag 42)

use std::fmt;

use crate::util::bcd_to_int;
use crate::{Error, Result};

/// Six digit Issuer Identification Number, encoded as 3 BCD bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IssuerIdNumber(u32);

impl IssuerIdNumber {
    pub const MAX: u32 = 999_999;

    pub fn new(value: u32) -> Result<Self> {
        if value > Self::MAX {
            return Err(Error::Range(format!("IIN {} exceeds six digits", value)));
        }
        Ok(Self(value))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 3 {
            return Err(Error::Range(format!("IIN must be 3 bytes, got {}", bytes.len())));
        }
        Ok(Self(bcd_to_int(bytes)? as u32))
    }

    pub const fn value(&self) -> u32 {
        self.0
    }

    pub const fn to_bytes(&self) -> [u8; 3] {
        const fn pair(v: u32) -> u8 {
            (((v / 10) << 4) | (v % 10)) as u8
        }
        [pair(self.0 / 10_000), pair(self.0 / 100 % 100), pair(self.0 % 100)]
    }
}

impl TryFrom<&[u8]> for IssuerIdNumber {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes(bytes)
    }
}

impl fmt::Display for IssuerIdNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}
