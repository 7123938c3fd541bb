//! Application File Locator and the records it points at

use std::fmt;

use emv_common::{decode, tags, Error, Result, Tlv};

use crate::apdu::{commands, ApduCommand};

/// One 4-byte AFL entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AflEntry {
    pub sfi: u8,
    pub first_record: u8,
    pub last_record: u8,
    /// Number of records, counted from `first_record`, used for offline data authentication
    pub offline_records: u8,
}

impl AflEntry {
    fn from_chunk(chunk: &[u8]) -> Result<Self> {
        let entry = Self {
            sfi: chunk[0] >> 3,
            first_record: chunk[1],
            last_record: chunk[2],
            offline_records: chunk[3],
        };
        if entry.sfi == 0 || entry.sfi > 30 {
            return Err(Error::field("AFL", format!("SFI {} outside 1..=30", entry.sfi)));
        }
        if entry.first_record == 0 {
            return Err(Error::field("AFL", "first record number is 0"));
        }
        if entry.last_record < entry.first_record {
            return Err(Error::field(
                "AFL",
                format!(
                    "last record {} before first record {}",
                    entry.last_record, entry.first_record
                ),
            ));
        }
        Ok(entry)
    }

    /// `(sfi, record_number, offline_auth)` for every record in the entry
    pub fn records(&self) -> impl Iterator<Item = (u8, u8, bool)> + '_ {
        (self.first_record..=self.last_record).map(move |number| {
            let offline = number - self.first_record < self.offline_records;
            (self.sfi, number, offline)
        })
    }

    /// READ RECORD commands for every record in the entry
    pub fn read_commands(&self) -> Result<Vec<ApduCommand>> {
        self.records()
            .map(|(sfi, number, _)| commands::read_record(number, sfi))
            .collect()
    }
}

impl fmt::Display for AflEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SFI {} records {}..={} ({} for offline auth)",
            self.sfi, self.first_record, self.last_record, self.offline_records
        )
    }
}

/// Decoded value of tag 94
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationFileLocator(Vec<AflEntry>);

impl ApplicationFileLocator {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.is_empty() || data.len() % 4 != 0 {
            return Err(Error::field(
                "AFL",
                format!("length {} is not a non-zero multiple of 4", data.len()),
            ));
        }
        data.chunks_exact(4)
            .map(AflEntry::from_chunk)
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    pub fn entries(&self) -> &[AflEntry] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every record location across all entries, in AFL order
    pub fn records(&self) -> impl Iterator<Item = (u8, u8, bool)> + '_ {
        self.0.iter().flat_map(AflEntry::records)
    }
}

impl TryFrom<&[u8]> for ApplicationFileLocator {
    type Error = Error;

    fn try_from(data: &[u8]) -> Result<Self> {
        Self::from_bytes(data)
    }
}

/// One READ RECORD response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    sfi: u8,
    number: u8,
    data: Vec<u8>,
    offline_auth: bool,
}

impl Record {
    pub fn new(sfi: u8, number: u8, data: Vec<u8>, offline_auth: bool) -> Self {
        Self {
            sfi,
            number,
            data,
            offline_auth,
        }
    }

    pub fn sfi(&self) -> u8 {
        self.sfi
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the record takes part in offline data authentication
    pub fn is_offline_auth(&self) -> bool {
        self.offline_auth
    }

    /// Children of the tag-70 record template
    pub fn template(&self) -> Result<Vec<Tlv>> {
        let nodes = decode(&self.data)?;
        match nodes.into_iter().next() {
            Some(node) if node.tag().bytes() == tags::RECORD_TEMPLATE => {
                Ok(node.children().to_vec())
            }
            Some(node) => Err(Error::field(
                "record",
                format!("expected template 70, found {}", hex::encode_upper(node.tag().bytes())),
            )),
            None => Err(Error::field("record", "empty record")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_afl_entries() {
        let data = hex::decode("080101001001020118010201").unwrap();
        let afl = ApplicationFileLocator::from_bytes(&data).unwrap();
        assert_eq!(afl.entries().len(), 3);
        assert_eq!(
            afl.entries()[0],
            AflEntry { sfi: 1, first_record: 1, last_record: 1, offline_records: 0 }
        );
        assert_eq!(afl.entries()[1].sfi, 2);
        let records: Vec<_> = afl.records().collect();
        assert_eq!(
            records,
            vec![(1, 1, false), (2, 1, true), (2, 2, false), (3, 1, true), (3, 2, false)]
        );
    }

    #[test]
    fn test_afl_rejects_bad_lengths() {
        assert!(matches!(
            ApplicationFileLocator::from_bytes(&[]),
            Err(Error::MalformedField { .. })
        ));
        assert!(ApplicationFileLocator::from_bytes(&[0x08, 0x01, 0x01]).is_err());
        // first record 0
        assert!(ApplicationFileLocator::from_bytes(&[0x08, 0x00, 0x01, 0x00]).is_err());
        // last before first
        assert!(ApplicationFileLocator::from_bytes(&[0x08, 0x03, 0x02, 0x00]).is_err());
        // SFI 0 and SFI 31 cannot be addressed by READ RECORD
        for entry in [[0x00, 0x01, 0x01, 0x00], [0xF8, 0x01, 0x01, 0x00]] {
            assert!(matches!(
                ApplicationFileLocator::from_bytes(&entry),
                Err(Error::MalformedField { field: "AFL", .. })
            ));
        }
        // SFI 30 is the last valid one
        let afl = ApplicationFileLocator::from_bytes(&[0xF0, 0x01, 0x01, 0x00]).unwrap();
        assert_eq!(afl.entries()[0].sfi, 30);
    }

    #[test]
    fn test_read_commands() {
        let afl = ApplicationFileLocator::from_bytes(&[0x10, 0x01, 0x02, 0x00]).unwrap();
        let cmds = afl.entries()[0].read_commands().unwrap();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0].build(), vec![0x00, 0xB2, 0x01, 0x14, 0x00]);
        assert_eq!(cmds[1].build(), vec![0x00, 0xB2, 0x02, 0x14, 0x00]);
    }

    #[test]
    fn test_record_template() {
        let data = hex::decode("70075F2D04656E6672").unwrap();
        let record = Record::new(1, 1, data, true);
        let children = record.template().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].tag().bytes(), &[0x5F, 0x2D]);
        assert_eq!(children[0].value(), b"enfr");
        assert!(record.is_offline_auth());

        let not_a_record = Record::new(1, 2, vec![0x80, 0x00], false);
        assert!(matches!(not_a_record.template(), Err(Error::MalformedField { .. })));
    }
}
