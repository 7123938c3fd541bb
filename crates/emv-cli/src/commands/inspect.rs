//! Bit-level views of AIP, TVR and TTQ plus IIN and language decoding

use emv_common::objects::BitField;
use emv_common::{Aip, IssuerIdNumber, LanguagePref, Result, Ttq, Tvr};

/// One line per defined bit: position, state, description
pub fn bit_lines(fields: &[BitField], bytes: &[u8]) -> Vec<String> {
    fields
        .iter()
        .map(|field| {
            let (byte, bit) = field.position();
            let mark = if field.is_set(bytes) { "x" } else { " " };
            format!("  [{}] B{}b{} {}", mark, byte, bit, field.description)
        })
        .collect()
}

fn print_register(label: &str, value: impl std::fmt::Display, fields: &[BitField], bytes: &[u8]) {
    println!("{}: {}", label, value);
    for line in bit_lines(fields, bytes) {
        println!("{}", line);
    }
}

pub fn cmd_aip(data: &[u8]) -> Result<()> {
    let aip = Aip::new(data)?;
    print_register("Application Interchange Profile", aip, Aip::FIELDS, &aip.to_bytes());
    println!("Offline data authentication: {:?}", aip.authentication_method());
    Ok(())
}

pub fn cmd_tvr(data: &[u8]) -> Result<()> {
    let tvr = Tvr::new(data)?;
    print_register("Terminal Verification Results", tvr, Tvr::FIELDS, &tvr.to_bytes());
    let reserved = tvr.set_bits().filter(|d| *d == emv_common::objects::RFU).count();
    if reserved > 0 {
        println!("{} reserved bit(s) set", reserved);
    }
    Ok(())
}

pub fn cmd_ttq(data: &[u8]) -> Result<()> {
    let ttq = Ttq::new(data)?;
    print_register("Terminal Transaction Qualifiers", ttq, Ttq::FIELDS, &ttq.to_bytes());
    Ok(())
}

pub fn cmd_iin(data: &[u8]) -> Result<()> {
    let iin = IssuerIdNumber::from_bytes(data)?;
    println!("Issuer Identification Number: {}", iin);
    Ok(())
}

pub fn cmd_lang(data: &[u8]) -> Result<()> {
    let lang = LanguagePref::from_bytes(data)?;
    for (rank, code) in lang.languages().iter().enumerate() {
        println!("{}. {}", rank + 1, code);
    }
    Ok(())
}
