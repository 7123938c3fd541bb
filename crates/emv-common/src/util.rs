//! Byte, hex, bit and BCD helpers

use crate::{Error, Result};

/// Decode a hex string into bytes
///
/// Accepts upper or lower case digits. Odd lengths and non-hex characters
/// are rejected.
pub fn hex_to_bytes(hex_str: &str) -> Result<Vec<u8>> {
    hex::decode(hex_str)
        .map_err(|e| Error::Format(format!("invalid hex string {:?}: {}", hex_str, e)))
}

/// Encode bytes as an uppercase hex string
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

fn bit_mask(position: u8) -> Result<u8> {
    if !(1..=8).contains(&position) {
        return Err(Error::Range(format!("bit position {} outside 1..=8", position)));
    }
    Ok(1 << (position - 1))
}

/// Test a bit, position 1 (least significant) to 8 (most significant)
pub fn is_bit_set(byte: u8, position: u8) -> Result<bool> {
    Ok(byte & bit_mask(position)? != 0)
}

/// Return `byte` with the bit at `position` set or cleared
pub fn set_bit(byte: u8, position: u8, value: bool) -> Result<u8> {
    let mask = bit_mask(position)?;
    Ok(if value { byte | mask } else { byte & !mask })
}

/// Decode packed BCD (two digits per byte, high nibble first)
pub fn bcd_to_int(bcd: &[u8]) -> Result<u64> {
    if bcd.len() > 9 {
        return Err(Error::Range(format!("{} BCD bytes overflow u64", bcd.len())));
    }
    let mut value = 0u64;
    for &byte in bcd {
        for nibble in [byte >> 4, byte & 0x0F] {
            if nibble > 9 {
                return Err(Error::Range(format!("invalid BCD digit in byte {:02X}", byte)));
            }
            value = value * 10 + nibble as u64;
        }
    }
    Ok(value)
}

/// Encode `value` as packed BCD left-padded with zeros to `len` bytes
pub fn int_to_bcd(value: u64, len: usize) -> Result<Vec<u8>> {
    let mut out = vec![0u8; len];
    let mut rest = value;
    for byte in out.iter_mut().rev() {
        let low = (rest % 10) as u8;
        rest /= 10;
        let high = (rest % 10) as u8;
        rest /= 10;
        *byte = (high << 4) | low;
    }
    if rest != 0 {
        return Err(Error::Range(format!("{} does not fit in {} BCD bytes", value, len)));
    }
    Ok(out)
}

/// Unpack bytes into bits, most significant bit of the first byte first
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    bytes
        .iter()
        .flat_map(|&b| (0..8).rev().map(move |i| b & (1 << i) != 0))
        .collect()
}

/// Pack bits (most significant first) into big-endian bytes
///
/// The bit count must be a multiple of eight.
pub fn bits_to_bytes(bits: &[bool]) -> Result<Vec<u8>> {
    if bits.len() % 8 != 0 {
        return Err(Error::Range(format!(
            "bit sequence of length {} is not a whole number of bytes",
            bits.len()
        )));
    }
    Ok(bits
        .chunks(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | bit as u8))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let bytes = hex_to_bytes("9f6604360000a0").unwrap();
        assert_eq!(bytes, vec![0x9F, 0x66, 0x04, 0x36, 0x00, 0x00, 0xA0]);
        assert_eq!(bytes_to_hex(&bytes), "9F6604360000A0");
    }

    #[test]
    fn test_hex_rejects_bad_input() {
        assert!(matches!(hex_to_bytes("ABC"), Err(Error::Format(_))));
        assert!(matches!(hex_to_bytes("ZZ"), Err(Error::Format(_))));
        assert_eq!(hex_to_bytes("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_bits() {
        assert!(is_bit_set(0x80, 8).unwrap());
        assert!(!is_bit_set(0x80, 7).unwrap());
        assert!(is_bit_set(0x01, 1).unwrap());
        assert_eq!(set_bit(0x00, 7, true).unwrap(), 0x40);
        assert_eq!(set_bit(0xFF, 1, false).unwrap(), 0xFE);
        assert!(matches!(is_bit_set(0x00, 0), Err(Error::Range(_))));
        assert!(matches!(set_bit(0x00, 9, true), Err(Error::Range(_))));
    }

    #[test]
    fn test_bcd() {
        assert_eq!(bcd_to_int(&[0x41, 0x12, 0x34]).unwrap(), 411234);
        assert_eq!(int_to_bcd(411234, 3).unwrap(), vec![0x41, 0x12, 0x34]);
        assert_eq!(int_to_bcd(100, 6).unwrap(), vec![0, 0, 0, 0, 0x01, 0x00]);
        assert!(matches!(bcd_to_int(&[0x1A]), Err(Error::Range(_))));
        assert!(matches!(int_to_bcd(1000, 1), Err(Error::Range(_))));
    }

    #[test]
    fn test_bit_sequence() {
        let bits = bytes_to_bits(&[0xA0, 0x01]);
        assert_eq!(bits.len(), 16);
        assert!(bits[0] && !bits[1] && bits[2] && bits[15]);
        assert_eq!(bits_to_bytes(&bits).unwrap(), vec![0xA0, 0x01]);
        assert!(bits_to_bytes(&[true, false]).is_err());
    }
}
