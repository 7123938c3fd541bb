//! GET PROCESSING OPTIONS command construction and response parsing

use emv_common::tlv::{encode_length, encode_tlv};
use emv_common::{decode, parse_dol, tags, Aip, Error, Result, TagAndLength, TerminalContext};
use tracing::debug;

use crate::apdu::{commands, ApduCommand};
use crate::record::ApplicationFileLocator;

/// Builder for the GET PROCESSING OPTIONS command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GpoApdu {
    pdol: Vec<TagAndLength>,
}

impl GpoApdu {
    /// From the raw PDOL value (tag 9F38) of the SELECT response, if the card sent one
    pub fn new(pdol: Option<&[u8]>) -> Result<Self> {
        let pdol = match pdol {
            Some(bytes) => parse_dol(bytes)?,
            None => Vec::new(),
        };
        Ok(Self { pdol })
    }

    pub fn from_dol(pdol: Vec<TagAndLength>) -> Self {
        Self { pdol }
    }

    pub fn pdol(&self) -> &[TagAndLength] {
        &self.pdol
    }

    /// The tag-83 command template
    pub fn command_data(&self, context: &TerminalContext) -> Result<Vec<u8>> {
        if self.pdol.is_empty() {
            return Ok(vec![0x83, 0x00]);
        }
        let response = context.dol_response(&self.pdol);
        debug!(entries = self.pdol.len(), len = response.len(), "built PDOL response");
        let mut out = Vec::with_capacity(response.len() + 4);
        out.push(0x83);
        out.extend(encode_length(response.len())?);
        out.extend(response);
        Ok(out)
    }

    pub fn command(&self, context: &TerminalContext) -> Result<ApduCommand> {
        commands::get_processing_options(self.command_data(context)?)
    }
}

/// Parsed GET PROCESSING OPTIONS response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpoResponse {
    pub aip: Aip,
    pub afl: ApplicationFileLocator,
}

impl GpoResponse {
    /// Parse a format 1 (tag 80) or format 2 (tag 77) response
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let nodes = decode(data)?;
        let node = nodes
            .first()
            .ok_or_else(|| Error::field("GPO response", "empty response"))?;

        match node.tag().bytes() {
            t if t == tags::RESPONSE_MESSAGE_TEMPLATE_FORMAT_1 => {
                let value = node.value();
                if value.len() < 2 {
                    return Err(Error::field("GPO response", "format 1 shorter than AIP"));
                }
                let (aip, afl) = value.split_at(2);
                Ok(Self {
                    aip: Aip::new(aip)?,
                    afl: if afl.is_empty() {
                        ApplicationFileLocator::default()
                    } else {
                        ApplicationFileLocator::from_bytes(afl)?
                    },
                })
            }
            t if t == tags::RESPONSE_MESSAGE_TEMPLATE_FORMAT_2 => {
                let aip = node
                    .find_child(tags::AIP)
                    .ok_or_else(|| Error::field("GPO response", "missing AIP (82)"))?;
                let afl = match node.find_child(tags::AFL) {
                    Some(afl) => ApplicationFileLocator::from_bytes(afl.value())?,
                    None => ApplicationFileLocator::default(),
                };
                Ok(Self {
                    aip: Aip::new(aip.value())?,
                    afl,
                })
            }
            other => Err(Error::field(
                "GPO response",
                format!("unexpected template {}", hex::encode_upper(other)),
            )),
        }
    }

    /// Re-encode as a format 2 template
    pub fn to_format2(&self) -> Result<Vec<u8>> {
        let mut inner = encode_tlv(tags::AIP, &self.aip.to_bytes())?;
        if !self.afl.is_empty() {
            let afl: Vec<u8> = self
                .afl
                .entries()
                .iter()
                .flat_map(|e| [e.sfi << 3, e.first_record, e.last_record, e.offline_records])
                .collect();
            inner.extend(encode_tlv(tags::AFL, &afl)?);
        }
        encode_tlv(tags::RESPONSE_MESSAGE_TEMPLATE_FORMAT_2, &inner)
    }
}
