//! EMV Common - Shared data structures and utilities for EMV processing
//!
//! This crate holds everything that works on bytes alone: hex/BCD helpers,
//! the BER-TLV decoder and the well-known tag registry, Data Object List
//! handling and typed views of fixed-format data elements (AIP, TVR, TTQ,
//! IIN, Language Preference). It performs no card I/O.

pub mod dol;
pub mod error;
pub mod objects;
pub mod tag;
pub mod tlv;
pub mod util;

pub use dol::{construct_dol_response, parse_dol, TagAndLength, TerminalContext};
pub use error::{Error, Result};
pub use objects::{Aip, AuthenticationMethod, IssuerIdNumber, LanguagePref, Ttq, Tvr};
pub use tag::{get_tag_name, tags, Tag, TagClass, ValueType};
pub use tlv::{decode, find_tag, Tlv};
