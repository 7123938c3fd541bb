//! Field formatters for human-readable output

use clap::ValueEnum;
use emv_common::{parse_dol, tags, Aip, IssuerIdNumber, LanguagePref, Tag, Tvr, ValueType};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatMode {
    /// Raw hex output
    Raw,
    /// Human-readable formatted output
    Human,
}

/// Binary values longer than this are truncated in human mode
const PREVIEW_BYTES: usize = 32;

/// Format a field value based on its tag
pub fn format_value(tag: &Tag, value: &[u8], mode: FormatMode) -> String {
    if mode == FormatMode::Raw {
        return hex::encode_upper(value);
    }

    match tag.bytes() {
        t if t == tags::AIP => match Aip::new(value) {
            Ok(aip) => format!("{} ({:?})", aip, aip.authentication_method()),
            Err(_) => hex::encode_upper(value),
        },

        t if t == tags::TVR => match Tvr::new(value) {
            Ok(tvr) => {
                let set: Vec<_> = tvr.set_bits().collect();
                if set.is_empty() {
                    format!("{} (no bits set)", tvr)
                } else {
                    format!("{} ({})", tvr, set.join("; "))
                }
            }
            Err(_) => hex::encode_upper(value),
        },

        t if t == tags::LANGUAGE_PREFERENCE => LanguagePref::from_bytes(value)
            .map(|lang| lang.to_string())
            .unwrap_or_else(|_| hex::encode_upper(value)),

        t if t == tags::ISSUER_IDENTIFICATION_NUMBER => IssuerIdNumber::from_bytes(value)
            .map(|iin| iin.to_string())
            .unwrap_or_else(|_| hex::encode_upper(value)),

        // Application Expiration / Effective Date (YYMMDD)
        [0x5F, 0x24] | [0x5F, 0x25] | [0x9A] if value.len() == 3 => {
            format!("20{:02X}/{:02X}/{:02X} (YY/MM/DD)", value[0], value[1], value[2])
        }

        // Issuer / Terminal Country Code (ISO 3166-1 numeric)
        [0x5F, 0x28] | [0x9F, 0x1A] if value.len() == 2 => {
            let code = numeric_digits(value);
            match code.parse().ok().and_then(get_country_name) {
                Some(country) => format!("{} ({})", code, country),
                None => code,
            }
        }

        // Currency Codes
        [0x5F, 0x2A] | [0x9F, 0x42] if value.len() == 2 => {
            let code = numeric_digits(value);
            match code.parse().ok().and_then(get_currency_name) {
                Some(currency) => currency.to_string(),
                None => format!("Currency Code {}", code),
            }
        }

        // Track 2 Data
        [0x57] | [0x9F, 0x6B] => hex::encode_upper(value).replace('D', " | "),

        _ => format_by_type(tag.value_type(), value),
    }
}

fn format_by_type(value_type: ValueType, value: &[u8]) -> String {
    match value_type {
        ValueType::Alphanumeric | ValueType::AlphanumericSpecial => {
            match std::str::from_utf8(value) {
                Ok(text) => text.trim().to_string(),
                Err(_) => hex::encode_upper(value),
            }
        }
        ValueType::Numeric => numeric_digits(value),
        ValueType::CompressedNumeric => hex::encode_upper(value).trim_end_matches('F').to_string(),
        ValueType::Dol => match parse_dol(value) {
            Ok(entries) => entries
                .iter()
                .map(|e| format!("{}:{}", hex::encode_upper(e.tag.bytes()), e.length))
                .collect::<Vec<_>>()
                .join(" "),
            Err(_) => hex::encode_upper(value),
        },
        ValueType::Binary | ValueType::Mixed | ValueType::Template => {
            if value.len() > PREVIEW_BYTES {
                format!(
                    "{} ... ({} bytes total)",
                    hex::encode_upper(&value[..PREVIEW_BYTES]),
                    value.len()
                )
            } else {
                hex::encode_upper(value)
            }
        }
    }
}

/// BCD digits with leading zeros removed
fn numeric_digits(value: &[u8]) -> String {
    let digits = hex::encode_upper(value);
    match digits.trim_start_matches('0') {
        "" => "0".to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// ISO 3166-1 numeric country codes (subset)
fn get_country_name(code: u16) -> Option<&'static str> {
    match code {
        124 => Some("Canada"),
        840 => Some("United States"),
        826 => Some("United Kingdom"),
        276 => Some("Germany"),
        250 => Some("France"),
        380 => Some("Italy"),
        724 => Some("Spain"),
        528 => Some("Netherlands"),
        156 => Some("China"),
        392 => Some("Japan"),
        _ => None,
    }
}

/// ISO 4217 numeric currency codes (subset)
fn get_currency_name(code: u16) -> Option<&'static str> {
    match code {
        124 => Some("CAD (Canadian Dollar)"),
        840 => Some("USD (US Dollar)"),
        978 => Some("EUR (Euro)"),
        826 => Some("GBP (Pound Sterling)"),
        392 => Some("JPY (Japanese Yen)"),
        156 => Some("CNY (Chinese Yuan)"),
        _ => None,
    }
}
