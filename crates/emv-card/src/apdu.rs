//! APDU (Application Protocol Data Unit) command handling
//!
//! Only the ISO 7816-4 short form is supported: Lc and Le are single bytes.
//!
//! ```text
//! CLA INS P1 P2                case 1
//! CLA INS P1 P2 Le             case 2
//! CLA INS P1 P2 Lc DATA        case 3
//! CLA INS P1 P2 Lc DATA Le     case 4
//! ```

use std::fmt;

use emv_common::{Error, Result, Tlv};
use tracing::{debug, trace};

use crate::status;
use crate::transport::CardTransport;
use crate::CardError;

/// Largest data field a short APDU can carry
pub const MAX_DATA_LEN: usize = 255;

/// Instruction codes
pub mod ins {
    pub const EXTERNAL_AUTHENTICATE: u8 = 0x82;
    pub const GET_CHALLENGE: u8 = 0x84;
    pub const INTERNAL_AUTHENTICATE: u8 = 0x88;
    pub const SELECT: u8 = 0xA4;
    pub const GET_PROCESSING_OPTIONS: u8 = 0xA8;
    pub const READ_RECORD: u8 = 0xB2;
    pub const GET_RESPONSE: u8 = 0xC0;
    pub const GET_DATA: u8 = 0xCA;
}

/// Name of a well-known instruction code, empty for anything else
pub fn instruction_name(code: u8) -> &'static str {
    match code {
        ins::EXTERNAL_AUTHENTICATE => "EXTERNAL AUTHENTICATE",
        ins::GET_CHALLENGE => "GET CHALLENGE",
        ins::INTERNAL_AUTHENTICATE => "INTERNAL AUTHENTICATE",
        ins::SELECT => "SELECT",
        ins::GET_PROCESSING_OPTIONS => "GET PROCESSING OPTIONS",
        ins::READ_RECORD => "READ RECORD",
        ins::GET_RESPONSE => "GET RESPONSE",
        ins::GET_DATA => "GET DATA",
        _ => "",
    }
}

/// Compare two command headers on the bits selected by `mask`
///
/// Used to match a received header against a template with wildcard fields.
pub fn header_matches(header: &[u8; 4], template: &[u8; 4], mask: &[u8; 4]) -> bool {
    header
        .iter()
        .zip(template)
        .zip(mask)
        .all(|((h, t), m)| h & m == t & m)
}

/// APDU response containing data and status word
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApduResponse {
    /// Response data (without status word)
    pub data: Vec<u8>,
    /// Status word SW1
    pub sw1: u8,
    /// Status word SW2
    pub sw2: u8,
}

impl ApduResponse {
    /// Split a raw response into payload and status word
    ///
    /// Input shorter than two bytes yields an empty response with status
    /// `0000` instead of an error; callers that need to reject truncated
    /// responses must check for that explicitly.
    pub fn from_bytes(raw: &[u8]) -> Self {
        if raw.len() < 2 {
            debug!(len = raw.len(), "short response, treating as empty");
            return Self::default();
        }
        let (data, sw) = raw.split_at(raw.len() - 2);
        Self {
            data: data.to_vec(),
            sw1: sw[0],
            sw2: sw[1],
        }
    }

    /// Check if the response indicates success (9000)
    pub fn is_success(&self) -> bool {
        self.status_word() == status::SUCCESS
    }

    /// Get the full status word as a 16-bit value
    pub fn status_word(&self) -> u16 {
        ((self.sw1 as u16) << 8) | (self.sw2 as u16)
    }

    /// Get status word as hex string (e.g., "9000")
    pub fn status_string(&self) -> String {
        format!("{:02X}{:02X}", self.sw1, self.sw2)
    }

    /// Short description of the status word
    pub fn status_description(&self) -> &'static str {
        status::status_description(self.status_word())
    }

    pub fn is_status(&self, word: u16) -> bool {
        self.status_word() == word
    }

    /// Fail with `StatusMismatch` unless the status word equals `expected`
    pub fn check_status(&self, expected: u16) -> Result<()> {
        self.check_status_in(&[expected])
    }

    /// Fail with `StatusMismatch` unless the status word is one of `expected`
    pub fn check_status_in(&self, expected: &[u16]) -> Result<()> {
        let actual = self.status_word();
        if expected.contains(&actual) {
            return Ok(());
        }
        debug!(status = %self.status_string(), "unexpected status word");
        Err(Error::StatusMismatch {
            actual,
            expected: expected.to_vec(),
            length: None,
        })
    }

    /// Fail with `StatusMismatch` unless both payload length and status match
    pub fn check_length_and_status(&self, expected_len: usize, expected: &[u16]) -> Result<()> {
        if self.data.len() != expected_len {
            debug!(expected_len, actual_len = self.data.len(), "unexpected response length");
            return Err(Error::StatusMismatch {
                actual: self.status_word(),
                expected: expected.to_vec(),
                length: Some((expected_len, self.data.len())),
            });
        }
        self.check_status_in(expected)
    }

    /// Decode the payload as BER-TLV
    pub fn tlv(&self) -> Result<Vec<Tlv>> {
        emv_common::decode(&self.data)
    }
}

/// APDU command builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduCommand {
    cla: u8,
    ins: u8,
    p1: u8,
    p2: u8,
    data: Vec<u8>,
    le: Option<u8>,
}

impl ApduCommand {
    /// Create a new APDU command
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Vec::new(),
            le: None,
        }
    }

    /// Set command data, at most 255 bytes
    pub fn data(mut self, data: Vec<u8>) -> Result<Self> {
        self.set_data(data)?;
        Ok(self)
    }

    /// Set expected response length
    pub fn le(mut self, le: u8) -> Self {
        self.le = Some(le);
        self
    }

    pub fn set_data(&mut self, data: Vec<u8>) -> Result<()> {
        if data.len() > MAX_DATA_LEN {
            return Err(Error::Range(format!(
                "command data of {} bytes exceeds short APDU limit of {}",
                data.len(),
                MAX_DATA_LEN
            )));
        }
        self.data = data;
        Ok(())
    }

    pub fn set_le(&mut self, le: Option<u8>) {
        self.le = le;
    }

    pub const fn cla(&self) -> u8 {
        self.cla
    }

    pub const fn ins(&self) -> u8 {
        self.ins
    }

    pub const fn p1(&self) -> u8 {
        self.p1
    }

    pub const fn p2(&self) -> u8 {
        self.p2
    }

    pub fn command_data(&self) -> &[u8] {
        &self.data
    }

    pub const fn expected_length(&self) -> Option<u8> {
        self.le
    }

    pub const fn header(&self) -> [u8; 4] {
        [self.cla, self.ins, self.p1, self.p2]
    }

    /// Compare this command's header to a template on the masked bits
    pub fn matches(&self, template: &[u8; 4], mask: &[u8; 4]) -> bool {
        header_matches(&self.header(), template, mask)
    }

    pub fn instruction_name(&self) -> &'static str {
        instruction_name(self.ins)
    }

    /// Serialized length in bytes
    pub fn encoded_len(&self) -> usize {
        let data = if self.data.is_empty() { 0 } else { 1 + self.data.len() };
        4 + data + usize::from(self.le.is_some())
    }

    /// Build the APDU command bytes
    pub fn build(&self) -> Vec<u8> {
        let mut apdu = Vec::with_capacity(self.encoded_len());
        apdu.extend_from_slice(&self.header());

        if !self.data.is_empty() {
            apdu.push(self.data.len() as u8);
            apdu.extend_from_slice(&self.data);
        }

        if let Some(le) = self.le {
            apdu.push(le);
        }

        apdu
    }

    /// Parse a serialized short APDU
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let malformed = |reason: String| Error::MalformedField {
            field: "command APDU",
            reason,
        };
        if bytes.len() < 4 {
            return Err(malformed(format!("{} bytes is shorter than a header", bytes.len())));
        }
        let mut command = Self::new(bytes[0], bytes[1], bytes[2], bytes[3]);
        let body = &bytes[4..];
        match body.len() {
            0 => {}
            1 => command.le = Some(body[0]),
            _ => {
                let lc = body[0] as usize;
                let rest = &body[1..];
                if lc == 0 || rest.len() < lc || rest.len() > lc + 1 {
                    return Err(malformed(format!(
                        "Lc {} does not match {} body bytes",
                        lc,
                        rest.len()
                    )));
                }
                command.data = rest[..lc].to_vec();
                command.le = rest.get(lc).copied();
            }
        }
        Ok(command)
    }

    /// Send this command to the card
    pub fn send<T: CardTransport>(
        &self,
        transport: &mut T,
    ) -> std::result::Result<ApduResponse, T::Error> {
        let apdu_bytes = self.build();
        debug!(command = self.instruction_name(), "sending APDU");
        trace!(apdu = %hex::encode_upper(&apdu_bytes), "C-APDU");
        let raw = transport.transmit(&apdu_bytes)?;
        trace!(response = %hex::encode_upper(&raw), "R-APDU");
        Ok(ApduResponse::from_bytes(&raw))
    }

    /// Send this command and require one of the `expected` status words
    pub fn send_expect<T: CardTransport>(
        &self,
        transport: &mut T,
        expected: &[u16],
    ) -> std::result::Result<ApduResponse, CardError<T::Error>> {
        let response = self.send(transport).map_err(CardError::Transport)?;
        response.check_status_in(expected)?;
        Ok(response)
    }
}

impl fmt::Display for ApduCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.build()))
    }
}

/// Well-known application identifiers
pub mod aids {
    /// PSE (Payment System Environment), contact
    pub const PSE: &[u8] = b"1PAY.SYS.DDF01";

    /// PPSE (Proximity Payment System Environment), contactless
    pub const PPSE: &[u8] = b"2PAY.SYS.DDF01";

    /// Visa
    pub const VISA: &[u8] = &[0xA0, 0x00, 0x00, 0x00, 0x03, 0x10, 0x10];

    /// Mastercard
    pub const MASTERCARD: &[u8] = &[0xA0, 0x00, 0x00, 0x00, 0x04, 0x10, 0x10];

    /// American Express
    pub const AMEX: &[u8] = &[0xA0, 0x00, 0x00, 0x00, 0x02, 0x50, 0x00];
}

/// Common EMV APDU commands
pub mod commands {
    use emv_common::{Error, Result};

    use super::{ins, ApduCommand};

    /// SELECT command (by name/AID, first occurrence)
    pub fn select(aid: &[u8]) -> Result<ApduCommand> {
        Ok(ApduCommand::new(0x00, ins::SELECT, 0x04, 0x00)
            .data(aid.to_vec())?
            .le(0x00))
    }

    /// SELECT the next application matching a partial AID
    pub fn select_next(aid: &[u8]) -> Result<ApduCommand> {
        Ok(ApduCommand::new(0x00, ins::SELECT, 0x04, 0x02)
            .data(aid.to_vec())?
            .le(0x00))
    }

    /// GET PROCESSING OPTIONS command, `pdol_data` is the full tag-83 template
    pub fn get_processing_options(pdol_data: Vec<u8>) -> Result<ApduCommand> {
        Ok(ApduCommand::new(0x80, ins::GET_PROCESSING_OPTIONS, 0x00, 0x00)
            .data(pdol_data)?
            .le(0x00))
    }

    /// READ RECORD command
    pub fn read_record(record_number: u8, sfi: u8) -> Result<ApduCommand> {
        if !(1..=30).contains(&sfi) {
            return Err(Error::Range(format!("SFI {} outside 1..=30", sfi)));
        }
        let p2 = (sfi << 3) | 0x04;
        Ok(ApduCommand::new(0x00, ins::READ_RECORD, record_number, p2).le(0x00))
    }

    /// INTERNAL AUTHENTICATE command (for DDA)
    pub fn internal_authenticate(data: Vec<u8>) -> Result<ApduCommand> {
        Ok(ApduCommand::new(0x00, ins::INTERNAL_AUTHENTICATE, 0x00, 0x00)
            .data(data)?
            .le(0x00))
    }

    /// EXTERNAL AUTHENTICATE command carrying issuer authentication data
    pub fn external_authenticate(data: Vec<u8>) -> Result<ApduCommand> {
        ApduCommand::new(0x00, ins::EXTERNAL_AUTHENTICATE, 0x00, 0x00).data(data)
    }

    /// GET CHALLENGE command, returns an 8 byte unpredictable number
    pub fn get_challenge() -> ApduCommand {
        ApduCommand::new(0x00, ins::GET_CHALLENGE, 0x00, 0x00).le(0x00)
    }

    /// GET DATA command - request a one or two byte tag from the card
    pub fn get_data(tag: &[u8]) -> Result<ApduCommand> {
        match *tag {
            [t] => Ok(ApduCommand::new(0x80, ins::GET_DATA, 0x00, t).le(0x00)),
            [t1, t2] => Ok(ApduCommand::new(0x80, ins::GET_DATA, t1, t2).le(0x00)),
            _ => Err(Error::Range(format!("GET DATA takes a 1 or 2 byte tag, got {}", tag.len()))),
        }
    }
}
