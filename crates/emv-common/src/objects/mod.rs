//! Typed wrappers over fixed-format EMV data elements

/// A named bit inside a fixed-size bit-field data element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    /// Zero-based byte index
    pub byte: usize,
    /// Bit mask within that byte
    pub mask: u8,
    pub description: &'static str,
}

impl BitField {
    pub const fn is_set(&self, bytes: &[u8]) -> bool {
        bytes[self.byte] & self.mask != 0
    }

    /// EMV numbering: byte 1.., bit 8 (most significant) down to 1
    pub const fn position(&self) -> (usize, u8) {
        (self.byte + 1, 8 - self.mask.leading_zeros() as u8)
    }
}

/// Declare a fixed-length bit-field register with a getter/setter per bit
macro_rules! bit_register {
    (
        $(#[$meta:meta])*
        pub struct $name:ident[$len:literal] as $label:literal {
            $( $get:ident / $set:ident => ($byte:literal, $mask:literal, $desc:literal), )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name([u8; $len]);

        impl $name {
            /// Encoded length in bytes
            pub const LEN: usize = $len;

            /// Every defined bit, in byte then bit order
            pub const FIELDS: &'static [$crate::objects::BitField] = &[
                $( $crate::objects::BitField { byte: $byte, mask: $mask, description: $desc }, )*
            ];

            /// Wrap raw bytes, which must be exactly `LEN` long
            pub fn new(bytes: &[u8]) -> $crate::Result<Self> {
                let bytes: [u8; $len] = bytes.try_into().map_err(|_| {
                    $crate::Error::field(
                        $label,
                        format!("expected {} bytes, got {}", $len, bytes.len()),
                    )
                })?;
                Ok(Self(bytes))
            }

            pub const fn from_array(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub const fn to_bytes(&self) -> [u8; $len] {
                self.0
            }

            /// Clear every bit
            pub fn reset(&mut self) {
                self.0 = [0; $len];
            }

            /// Description and state of every defined bit
            pub fn fields(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
                Self::FIELDS.iter().map(move |f| (f.description, f.is_set(&self.0)))
            }

            $(
                #[doc = $desc]
                pub const fn $get(&self) -> bool {
                    self.0[$byte] & $mask != 0
                }

                pub fn $set(&mut self, value: bool) {
                    if value {
                        self.0[$byte] |= $mask;
                    } else {
                        self.0[$byte] &= !$mask;
                    }
                }
            )*
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = $crate::Error;

            fn try_from(bytes: &[u8]) -> $crate::Result<Self> {
                Self::new(bytes)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&hex::encode_upper(self.0))
            }
        }
    };
}

mod aip;
mod iin;
mod language;
mod ttq;
mod tvr;

pub use aip::{Aip, AuthenticationMethod};
pub use iin::IssuerIdNumber;
pub use language::LanguagePref;
pub use ttq::Ttq;
pub use tvr::{Tvr, RFU};
