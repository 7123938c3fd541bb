//! BER-TLV decoding and encoding
//!
//! Tags follow ISO/IEC 8825-1: bits 8-7 of the first byte give the class,
//! bit 6 marks a constructed object and a tag number of `11111` in bits 5-1
//! continues into following bytes for as long as bit 8 is set. Lengths use
//! the definite form only: one byte below `0x80`, or `0x81`-`0x84` followed
//! by that many big-endian length bytes.

use tracing::trace;

use crate::tag::Tag;
use crate::{Error, Result};

const MAX_LENGTH_BYTES: usize = 4;

/// Deepest template nesting `decode` will follow
pub const MAX_DEPTH: usize = 64;

/// A borrowed TLV object as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTlv<'a> {
    /// Tag bytes
    pub tag: &'a [u8],
    /// Value bytes
    pub value: &'a [u8],
}

impl RawTlv<'_> {
    pub fn is_constructed(&self) -> bool {
        self.tag[0] & 0x20 != 0
    }
}

/// Iterator over the sibling TLV objects of a byte region
///
/// Yields an error and then stops if the region is malformed.
#[derive(Debug, Clone)]
pub struct TlvIter<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
    failed: bool,
}

impl<'a> TlvIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_base(data, 0)
    }

    fn with_base(data: &'a [u8], base: usize) -> Self {
        Self {
            data,
            pos: 0,
            base,
            failed: false,
        }
    }

    fn next_object(&mut self) -> Result<RawTlv<'a>> {
        let start = self.pos;
        let tag_len = read_tag(&self.data[start..]).map_err(|e| self.rebase(e, start))?;
        let tag = &self.data[start..start + tag_len];

        let len_start = start + tag_len;
        let (value_len, len_len) =
            read_length(&self.data[len_start..]).map_err(|e| self.rebase(e, len_start))?;

        let value_start = len_start + len_len;
        let value_end = value_start
            .checked_add(value_len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| Error::tlv(self.base + len_start, "value runs past end of region"))?;

        self.pos = value_end;
        Ok(RawTlv {
            tag,
            value: &self.data[value_start..value_end],
        })
    }

    fn rebase(&self, err: Error, at: usize) -> Error {
        match err {
            Error::MalformedTlv { offset, reason } => Error::tlv(self.base + at + offset, reason),
            other => other,
        }
    }
}

impl<'a> Iterator for TlvIter<'a> {
    type Item = Result<RawTlv<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.data.len() {
            return None;
        }
        let item = self.next_object();
        self.failed = item.is_err();
        Some(item)
    }
}

/// Number of bytes making up the tag at the start of `data`
pub fn read_tag(data: &[u8]) -> Result<usize> {
    let first = *data.first().ok_or(Error::tlv(0, "missing tag"))?;
    if first & 0x1F != 0x1F {
        return Ok(1);
    }
    for (i, byte) in data.iter().enumerate().skip(1) {
        if byte & 0x80 == 0 {
            return Ok(i + 1);
        }
    }
    Err(Error::tlv(data.len(), "tag number continues past end of data"))
}

/// Decode a definite-form length, returning `(length, bytes consumed)`
pub fn read_length(data: &[u8]) -> Result<(usize, usize)> {
    let first = *data.first().ok_or(Error::tlv(0, "missing length"))?;
    match first {
        0x00..=0x7F => Ok((first as usize, 1)),
        0x80 => Err(Error::tlv(0, "indefinite length is not supported")),
        0x81..=0x84 => {
            let count = (first & 0x7F) as usize;
            let bytes = data
                .get(1..=count)
                .ok_or(Error::tlv(1, "length bytes run past end of data"))?;
            let len = bytes.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize);
            Ok((len, 1 + count))
        }
        _ => Err(Error::tlv(0, "length field too long")),
    }
}

/// Encode a length in the shortest definite form
///
/// Lengths that need more than four bytes fail with `Range`.
pub fn encode_length(len: usize) -> Result<Vec<u8>> {
    if len < 0x80 {
        return Ok(vec![len as u8]);
    }
    let bytes = u32::try_from(len)
        .map_err(|_| Error::Range(format!("length {} does not fit in four bytes", len)))?
        .to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    let count = MAX_LENGTH_BYTES - skip;
    let mut out = Vec::with_capacity(1 + count);
    out.push(0x80 | count as u8);
    out.extend_from_slice(&bytes[skip..]);
    Ok(out)
}

/// Encode a single primitive or constructed object
pub fn encode_tlv(tag: &[u8], value: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(tag.len() + 5 + value.len());
    out.extend_from_slice(tag);
    out.extend_from_slice(&encode_length(value.len())?);
    out.extend_from_slice(value);
    Ok(out)
}

/// A decoded TLV node
///
/// Constructed nodes keep both their raw value and their decoded children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    tag: Tag,
    value: Vec<u8>,
    children: Vec<Tlv>,
}

impl Tlv {
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Length of the value field in bytes
    pub fn length(&self) -> usize {
        self.value.len()
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Nested objects, empty for primitive tags
    pub fn children(&self) -> &[Tlv] {
        &self.children
    }

    pub fn is_constructed(&self) -> bool {
        self.tag.is_constructed()
    }

    /// Depth-first search for `tag`, including this node
    pub fn find(&self, tag: &[u8]) -> Option<&Tlv> {
        if self.tag.bytes() == tag {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(tag))
    }

    /// Direct child with the given tag
    pub fn find_child(&self, tag: &[u8]) -> Option<&Tlv> {
        self.children.iter().find(|c| c.tag.bytes() == tag)
    }

    /// Re-encode this node
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode_tlv(self.tag.bytes(), &self.value)
    }
}

/// Decode a region into its sibling TLV nodes, recursing into constructed tags
///
/// The whole region must be consumed, and templates may nest at most
/// [`MAX_DEPTH`] levels.
pub fn decode(data: &[u8]) -> Result<Vec<Tlv>> {
    decode_at(data, 0, 0)
}

fn decode_at(data: &[u8], base: usize, depth: usize) -> Result<Vec<Tlv>> {
    if depth > MAX_DEPTH {
        return Err(Error::tlv(base, "nesting too deep"));
    }
    let mut nodes = Vec::new();
    let mut iter = TlvIter::with_base(data, base);
    while let Some(raw) = iter.next() {
        let raw = raw?;
        // Offset of this object's value within the outermost region
        let value_offset = base + iter.pos - raw.value.len();
        let tag = Tag::resolve(raw.tag);
        trace!(
            tag = %hex::encode_upper(raw.tag),
            name = tag.name(),
            len = raw.value.len(),
            "decoded TLV"
        );
        let children = if raw.is_constructed() {
            decode_at(raw.value, value_offset, depth + 1)?
        } else {
            Vec::new()
        };
        nodes.push(Tlv {
            tag,
            value: raw.value.to_vec(),
            children,
        });
    }
    Ok(nodes)
}

/// Depth-first search for `tag` across a list of decoded nodes
pub fn find<'a>(nodes: &'a [Tlv], tag: &[u8]) -> Option<&'a Tlv> {
    nodes.iter().find_map(|node| node.find(tag))
}

/// Find the value of `tag` among the top-level objects of `data`
///
/// Stops quietly at the first malformed object.
pub fn find_tag<'a>(data: &'a [u8], tag: &[u8]) -> Option<&'a [u8]> {
    TlvIter::new(data)
        .map_while(|item| item.ok())
        .find(|raw| raw.tag == tag)
        .map(|raw| raw.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::TagClass;

    #[test]
    fn test_decode_primitive() {
        let data = hex::decode("9F660436000000").unwrap();
        let nodes = decode(&data).unwrap();
        assert_eq!(nodes.len(), 1);
        let ttq = &nodes[0];
        assert_eq!(ttq.tag().bytes(), &[0x9F, 0x66]);
        assert_eq!(ttq.length(), 4);
        assert_eq!(ttq.value(), &[0x36, 0x00, 0x00, 0x00]);
        assert!(!ttq.is_constructed());
        assert_eq!(ttq.tag().class(), TagClass::ContextSpecific);
    }

    #[test]
    fn test_decode_nested() {
        let data = hex::decode("70069F6603010203").unwrap();
        let nodes = decode(&data).unwrap();
        assert_eq!(nodes.len(), 1);
        let record = &nodes[0];
        assert_eq!(record.tag().bytes(), &[0x70]);
        assert!(record.is_constructed());
        assert_eq!(record.children().len(), 1);
        let child = &record.children()[0];
        assert_eq!(child.tag().bytes(), &[0x9F, 0x66]);
        assert_eq!(child.length(), 3);
        assert_eq!(child.value(), &[0x01, 0x02, 0x03]);

        // Template length one short of its child
        let data = hex::decode("70059F6603010203").unwrap();
        assert!(matches!(decode(&data), Err(Error::MalformedTlv { .. })));
    }

    fn nested(depth: usize) -> Vec<u8> {
        (0..depth).fold(vec![0x80, 0x00], |inner, _| encode_tlv(&[0x20], &inner).unwrap())
    }

    #[test]
    fn test_nesting_limit() {
        let nodes = decode(&nested(MAX_DEPTH)).unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].find(&[0x80]).is_some());

        let err = decode(&nested(MAX_DEPTH + 1)).unwrap_err();
        assert!(matches!(err, Error::MalformedTlv { reason: "nesting too deep", .. }));

        // Thousands of levels fail cleanly instead of exhausting the stack
        assert!(decode(&nested(5000)).is_err());
    }

    #[test]
    fn test_decode_siblings_and_find() {
        // FCI with proprietary template holding label and PDOL
        let data = hex::decode("6F1A840E315041592E5359532E4444463031A5088801015F2D02656E").unwrap();
        let nodes = decode(&data).unwrap();
        assert_eq!(nodes.len(), 1);
        let fci = &nodes[0];
        assert_eq!(fci.children().len(), 2);
        assert_eq!(fci.find_child(&[0x84]).unwrap().value(), b"1PAY.SYS.DDF01");
        assert!(fci.find_child(&[0x88]).is_none());
        assert_eq!(find(&nodes, &[0x5F, 0x2D]).unwrap().value(), b"en");
        assert_eq!(fci.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_multi_byte_tag_number() {
        // Private class tag DF 81 01 (three bytes)
        let data = [0xDF, 0x81, 0x01, 0x01, 0xAA];
        assert_eq!(read_tag(&data).unwrap(), 3);
        let nodes = decode(&data).unwrap();
        assert_eq!(nodes[0].tag().bytes(), &[0xDF, 0x81, 0x01]);
        assert_eq!(nodes[0].tag().class(), TagClass::Private);
        assert!(!nodes[0].tag().is_known());
    }

    #[test]
    fn test_truncated_tag() {
        let err = decode(&[0x9F]).unwrap_err();
        assert!(matches!(err, Error::MalformedTlv { .. }));
        let err = decode(&[0xDF, 0x81]).unwrap_err();
        assert!(matches!(err, Error::MalformedTlv { .. }));
    }

    #[test]
    fn test_length_forms() {
        assert_eq!(read_length(&[0x05]).unwrap(), (5, 1));
        assert_eq!(read_length(&[0x81, 0x80]).unwrap(), (128, 2));
        assert_eq!(read_length(&[0x82, 0x01, 0x00]).unwrap(), (256, 3));
        assert_eq!(read_length(&[0x84, 0x00, 0x01, 0x00, 0x00]).unwrap(), (65536, 5));
        assert!(read_length(&[0x80]).is_err());
        assert!(read_length(&[0x85, 0, 0, 0, 0, 1]).is_err());
        assert!(read_length(&[0x82, 0x01]).is_err());
    }

    #[test]
    fn test_long_value() {
        let value = vec![0xAB; 200];
        let encoded = encode_tlv(&[0x90], &value).unwrap();
        assert_eq!(&encoded[..3], &[0x90, 0x81, 0xC8]);
        let nodes = decode(&encoded).unwrap();
        assert_eq!(nodes[0].length(), 200);
    }

    #[test]
    fn test_encode_length() {
        assert_eq!(encode_length(0).unwrap(), vec![0x00]);
        assert_eq!(encode_length(0x7F).unwrap(), vec![0x7F]);
        assert_eq!(encode_length(0x80).unwrap(), vec![0x81, 0x80]);
        assert_eq!(encode_length(0x1234).unwrap(), vec![0x82, 0x12, 0x34]);
        assert_eq!(encode_length(0xFFFF_FFFF).unwrap(), vec![0x84, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_encode_length_overflow() {
        assert!(matches!(encode_length(1 << 32), Err(Error::Range(_))));
    }

    #[test]
    fn test_value_past_end() {
        let err = decode(&[0x5A, 0x05, 0x01, 0x02]).unwrap_err();
        assert_eq!(err, Error::tlv(1, "value runs past end of region"));
    }

    #[test]
    fn test_nested_error_offset() {
        // Inner object claims 4 bytes but only 1 is present in the template
        let err = decode(&[0x70, 0x03, 0x5A, 0x04, 0x01]).unwrap_err();
        assert_eq!(err, Error::tlv(3, "value runs past end of region"));
    }

    #[test]
    fn test_find_tag_simple() {
        // Simple TLV: Tag 8F, Length 1, Value 05
        let data = &[0x8F, 0x01, 0x05];
        assert_eq!(find_tag(data, &[0x8F]), Some(&[0x05][..]));
        assert_eq!(find_tag(data, &[0x90]), None);
    }

    #[test]
    fn test_find_tag_nested() {
        // Tag 70 contains Tag 8F, trailing garbage is ignored
        let data = &[0x70, 0x03, 0x8F, 0x01, 0x05, 0xFF];
        let template = find_tag(data, &[0x70]).unwrap();
        assert_eq!(find_tag(template, &[0x8F]), Some(&[0x05][..]));
        assert!(decode(data).is_err());
    }
}
