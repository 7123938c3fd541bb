//! Language Preference (tag 5F2D)

use std::fmt;

use crate::{Error, Result};

const FIELD: &str = "Language Preference";

/// One to four ISO 639 language codes in order of preference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePref {
    languages: Vec<String>,
}

impl LanguagePref {
    /// Decode 2 to 8 bytes holding two-character codes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 2 != 0 {
            return Err(Error::field(FIELD, format!("odd length {}", bytes.len())));
        }
        if !(2..=8).contains(&bytes.len()) {
            return Err(Error::field(FIELD, format!("length {} outside 2..=8", bytes.len())));
        }
        // Codes are kept verbatim, padding included
        let languages = bytes
            .chunks(2)
            .map(|code| code.iter().map(|&b| b as char).collect())
            .collect();
        Ok(Self { languages })
    }

    /// Codes in order of preference
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Most preferred language
    pub fn preferred(&self) -> &str {
        &self.languages[0]
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.languages
            .iter()
            .flat_map(|l| l.chars().map(|c| c as u8))
            .collect()
    }
}

impl TryFrom<&[u8]> for LanguagePref {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes(bytes)
    }
}

impl fmt::Display for LanguagePref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.languages.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_languages() {
        let pref = LanguagePref::from_bytes(b"enfr").unwrap();
        assert_eq!(pref.languages(), &["en".to_string(), "fr".to_string()]);
        assert_eq!(pref.preferred(), "en");
        assert_eq!(pref.to_bytes(), b"enfr");
        assert_eq!(pref.to_string(), "en, fr");
    }

    #[test]
    fn test_bad_lengths() {
        assert!(matches!(LanguagePref::from_bytes(b"enf"), Err(Error::MalformedField { .. })));
        assert!(matches!(LanguagePref::from_bytes(b""), Err(Error::MalformedField { .. })));
        assert!(matches!(
            LanguagePref::from_bytes(b"enfrdeitnl"),
            Err(Error::MalformedField { .. })
        ));
        assert!(LanguagePref::from_bytes(b"enfrdeit").is_ok());
    }

    #[test]
    fn test_padded_codes_accepted() {
        let pref = LanguagePref::from_bytes(b"en  ").unwrap();
        assert_eq!(pref.languages(), &["en".to_string(), "  ".to_string()]);
        assert_eq!(pref.preferred(), "en");

        let raw = [0x65, 0x00, 0xC3, 0xA9];
        assert_eq!(LanguagePref::from_bytes(&raw).unwrap().to_bytes(), raw);
    }
}
