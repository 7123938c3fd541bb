//! Data Object Lists and the terminal data used to answer them
//!
//! A DOL (PDOL, CDOL1/2, DDOL) is a list of tag/length pairs with no values.
//! The terminal answers it by concatenating its own value for every listed
//! tag, each fitted to the requested length.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::tag::{tags, Tag, ValueType};
use crate::tlv::read_tag;
use crate::util::int_to_bcd;
use crate::{Error, Result};

/// One DOL entry: a tag and the number of value bytes the card expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAndLength {
    pub tag: Tag,
    pub length: usize,
}

impl TagAndLength {
    pub fn new(tag: &[u8], length: usize) -> Self {
        Self {
            tag: Tag::resolve(tag),
            length,
        }
    }
}

impl fmt::Display for TagAndLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.tag, self.length)
    }
}

/// Parse the value of a DOL data object into its entries
pub fn parse_dol(data: &[u8]) -> Result<Vec<TagAndLength>> {
    let mut entries = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        let tag_len = read_tag(&data[pos..])
            .map_err(|_| Error::field("DOL", format!("truncated tag at offset {}", pos)))?;
        let tag = &data[pos..pos + tag_len];
        pos += tag_len;
        let length = *data.get(pos).ok_or_else(|| {
            Error::field(
                "DOL",
                format!("missing length for tag {}", hex::encode_upper(tag)),
            )
        })?;
        pos += 1;
        entries.push(TagAndLength::new(tag, length as usize));
    }
    Ok(entries)
}

/// Fit `value` into `length` bytes
///
/// Numeric (`n`) data is right-aligned: padded and truncated on the left.
/// Everything else is left-aligned: padded and truncated on the right.
fn fit_value(value: &[u8], length: usize, value_type: ValueType) -> Vec<u8> {
    let mut out = vec![0u8; length];
    let n = value.len().min(length);
    if value_type == ValueType::Numeric {
        out[length - n..].copy_from_slice(&value[value.len() - n..]);
    } else {
        out[..n].copy_from_slice(&value[..n]);
    }
    out
}

/// Terminal-resident data objects keyed by tag
#[derive(Debug, Clone, Default)]
pub struct TerminalContext {
    values: HashMap<Vec<u8>, Vec<u8>>,
}

impl TerminalContext {
    /// An empty context; every requested tag is answered with zeros
    pub fn new() -> Self {
        Self::default()
    }

    /// Context seeded with values suitable for a contactless purchase
    ///
    /// The transaction date is left unset; callers supply it with
    /// [`set_transaction_date`](Self::set_transaction_date).
    pub fn with_defaults() -> Self {
        Self::new()
            .set(tags::TTQ, vec![0x36, 0x00, 0x40, 0x00])
            .set(tags::TERMINAL_COUNTRY_CODE, vec![0x08, 0x40])
            .set(tags::TRANSACTION_CURRENCY_CODE, vec![0x08, 0x40])
            .set(tags::AMOUNT_AUTHORISED, vec![0x00; 6])
            .set(tags::AMOUNT_OTHER, vec![0x00; 6])
            .set(tags::TRANSACTION_TYPE, vec![0x00])
            .set(tags::TERMINAL_TYPE, vec![0x22])
            .set(tags::TVR, vec![0x00; 5])
            .set(tags::UNPREDICTABLE_NUMBER, vec![0x00; 4])
    }

    /// Set the raw value for a tag
    pub fn set(mut self, tag: &[u8], value: Vec<u8>) -> Self {
        self.values.insert(tag.to_vec(), value);
        self
    }

    pub fn get(&self, tag: &[u8]) -> Option<&[u8]> {
        self.values.get(tag).map(Vec::as_slice)
    }

    /// Amount, Authorised in minor currency units
    pub fn set_amount(self, amount: u64) -> Result<Self> {
        Ok(self.set(tags::AMOUNT_AUTHORISED, int_to_bcd(amount, 6)?))
    }

    /// Amount, Other (cashback) in minor currency units
    pub fn set_amount_other(self, amount: u64) -> Result<Self> {
        Ok(self.set(tags::AMOUNT_OTHER, int_to_bcd(amount, 6)?))
    }

    /// ISO 4217 numeric currency code
    pub fn set_currency(self, code: u16) -> Result<Self> {
        Ok(self.set(tags::TRANSACTION_CURRENCY_CODE, int_to_bcd(code as u64, 2)?))
    }

    /// ISO 3166 numeric country code
    pub fn set_terminal_country(self, code: u16) -> Result<Self> {
        Ok(self.set(tags::TERMINAL_COUNTRY_CODE, int_to_bcd(code as u64, 2)?))
    }

    pub fn set_transaction_type(self, transaction_type: u8) -> Result<Self> {
        Ok(self.set(tags::TRANSACTION_TYPE, int_to_bcd(transaction_type as u64, 1)?))
    }

    pub fn set_terminal_type(self, terminal_type: u8) -> Result<Self> {
        Ok(self.set(tags::TERMINAL_TYPE, int_to_bcd(terminal_type as u64, 1)?))
    }

    /// Transaction date as two-digit year, month and day
    pub fn set_transaction_date(self, year: u8, month: u8, day: u8) -> Result<Self> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) || year > 99 {
            return Err(Error::Range(format!("invalid date {:02}/{:02}/{:02}", year, month, day)));
        }
        let date = [year, month, day]
            .iter()
            .map(|&v| int_to_bcd(v as u64, 1).map(|b| b[0]))
            .collect::<Result<Vec<u8>>>()?;
        Ok(self.set(tags::TRANSACTION_DATE, date))
    }

    pub fn set_unpredictable_number(self, number: [u8; 4]) -> Self {
        self.set(tags::UNPREDICTABLE_NUMBER, number.to_vec())
    }

    pub fn set_ttq(self, ttq: &crate::objects::Ttq) -> Self {
        self.set(tags::TTQ, ttq.to_bytes().to_vec())
    }

    pub fn set_tvr(self, tvr: &crate::objects::Tvr) -> Self {
        self.set(tags::TVR, tvr.to_bytes().to_vec())
    }

    /// Build the concatenated response to a parsed DOL
    pub fn dol_response(&self, dol: &[TagAndLength]) -> Vec<u8> {
        construct_dol_response(dol, self)
    }

    /// Parse raw DOL bytes and build the response
    pub fn build(&self, dol: &[u8]) -> Result<Vec<u8>> {
        Ok(self.dol_response(&parse_dol(dol)?))
    }
}

/// Concatenate the context's value for every DOL entry, in DOL order
///
/// Tags the context has no value for are answered with zeros.
pub fn construct_dol_response(dol: &[TagAndLength], context: &TerminalContext) -> Vec<u8> {
    let mut out = Vec::with_capacity(dol.iter().map(|e| e.length).sum());
    for entry in dol {
        match context.get(entry.tag.bytes()) {
            Some(value) => out.extend(fit_value(value, entry.length, entry.tag.value_type())),
            None => {
                warn!(
                    tag = %entry.tag,
                    length = entry.length,
                    "no terminal value for DOL entry, zero filling"
                );
                out.resize(out.len() + entry.length, 0);
            }
        }
    }
    debug!(response = %hex::encode_upper(&out), "built DOL response");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pdol() {
        // TTQ(4) Amount(6) Country(2) Unpredictable number(4)
        let pdol = hex::decode("9F66049F02069F1A029F3704").unwrap();
        let entries = parse_dol(&pdol).unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0], TagAndLength::new(&[0x9F, 0x66], 4));
        assert_eq!(entries[1].tag.bytes(), &[0x9F, 0x02]);
        assert_eq!(entries[1].length, 6);
        assert_eq!(entries[3].length, 4);
    }

    #[test]
    fn test_parse_dol_missing_length() {
        assert!(matches!(parse_dol(&[0x9F, 0x66]), Err(Error::MalformedField { .. })));
        assert!(matches!(parse_dol(&[0x9F]), Err(Error::MalformedField { .. })));
        assert!(parse_dol(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_dol_response_in_order() {
        let ctx = TerminalContext::with_defaults()
            .set_amount(100)
            .unwrap()
            .set_unpredictable_number([0xDE, 0xAD, 0xBE, 0xEF]);
        let pdol = hex::decode("9F66049F02069F1A029F3704").unwrap();
        let response = ctx.build(&pdol).unwrap();
        assert_eq!(
            hex::encode_upper(&response),
            "360040000000000001000840DEADBEEF"
        );
    }

    #[test]
    fn test_unknown_tag_zero_filled() {
        let ctx = TerminalContext::new();
        let dol = vec![TagAndLength::new(&[0xDF, 0x01], 3), TagAndLength::new(&[0x9C], 1)];
        assert_eq!(ctx.dol_response(&dol), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_fit_value() {
        // Numeric data is right aligned
        let ctx = TerminalContext::new().set(tags::AMOUNT_AUTHORISED, vec![0x12, 0x34]);
        assert_eq!(
            ctx.dol_response(&[TagAndLength::new(tags::AMOUNT_AUTHORISED, 4)]),
            vec![0x00, 0x00, 0x12, 0x34]
        );
        assert_eq!(
            ctx.dol_response(&[TagAndLength::new(tags::AMOUNT_AUTHORISED, 1)]),
            vec![0x34]
        );

        // Binary data is left aligned
        let ctx = TerminalContext::new().set(tags::TTQ, vec![0x36, 0x00, 0x40, 0x00]);
        assert_eq!(
            ctx.dol_response(&[TagAndLength::new(tags::TTQ, 2)]),
            vec![0x36, 0x00]
        );
        assert_eq!(
            ctx.dol_response(&[TagAndLength::new(tags::TTQ, 5)]),
            vec![0x36, 0x00, 0x40, 0x00, 0x00]
        );
    }

    #[test]
    fn test_setters() {
        let ctx = TerminalContext::new()
            .set_currency(978)
            .unwrap()
            .set_transaction_date(24, 2, 29)
            .unwrap();
        assert_eq!(ctx.get(tags::TRANSACTION_CURRENCY_CODE), Some(&[0x09, 0x78][..]));
        assert_eq!(ctx.get(tags::TRANSACTION_DATE), Some(&[0x24, 0x02, 0x29][..]));
        assert!(TerminalContext::new().set_transaction_date(24, 13, 1).is_err());

        let ctx = TerminalContext::with_defaults();
        assert_eq!(ctx.get(tags::TRANSACTION_DATE), None);
        let ctx = ctx.set_transaction_date(25, 12, 31).unwrap();
        assert_eq!(ctx.get(tags::TRANSACTION_DATE), Some(&[0x25, 0x12, 0x31][..]));
        assert!(matches!(
            TerminalContext::new().set_amount(1_000_000_000_000),
            Err(Error::Range(_))
        ));
    }
}
