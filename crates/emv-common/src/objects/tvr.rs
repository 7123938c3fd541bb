//! Terminal Verification Results (tag 95)

use crate::util::{bits_to_bytes, bytes_to_bits};
use crate::Result;

bit_register! {
    /// Terminal Verification Results: outcome of terminal checks, 5 bytes
    pub struct Tvr[5] as "Terminal Verification Results" {
        is_offline_data_authentication_not_performed / set_offline_data_authentication_not_performed => (0, 0x80, "Offline data authentication was not performed"),
        is_sda_failed / set_sda_failed => (0, 0x40, "SDA failed"),
        is_icc_data_missing / set_icc_data_missing => (0, 0x20, "ICC data missing"),
        is_card_on_exception_file / set_card_on_exception_file => (0, 0x10, "Card appears on terminal exception file"),
        is_dda_failed / set_dda_failed => (0, 0x08, "DDA failed"),
        is_cda_failed / set_cda_failed => (0, 0x04, "CDA failed"),
        is_sda_selected / set_sda_selected => (0, 0x02, "SDA selected"),
        is_different_application_versions / set_different_application_versions => (1, 0x80, "ICC and terminal have different application versions"),
        is_expired_application / set_expired_application => (1, 0x40, "Expired application"),
        is_application_not_yet_effective / set_application_not_yet_effective => (1, 0x20, "Application not yet effective"),
        is_service_not_allowed / set_service_not_allowed => (1, 0x10, "Requested service not allowed for card product"),
        is_new_card / set_new_card => (1, 0x08, "New card"),
        is_cardholder_verification_failed / set_cardholder_verification_failed => (2, 0x80, "Cardholder verification was not successful"),
        is_unrecognised_cvm / set_unrecognised_cvm => (2, 0x40, "Unrecognised CVM"),
        is_pin_try_limit_exceeded / set_pin_try_limit_exceeded => (2, 0x20, "PIN Try Limit exceeded"),
        is_pin_pad_not_present / set_pin_pad_not_present => (2, 0x10, "PIN entry required and PIN pad not present or not working"),
        is_pin_not_entered / set_pin_not_entered => (2, 0x08, "PIN entry required, PIN pad present, but PIN was not entered"),
        is_online_pin_entered / set_online_pin_entered => (2, 0x04, "Online PIN entered"),
        is_floor_limit_exceeded / set_floor_limit_exceeded => (3, 0x80, "Transaction exceeds floor limit"),
        is_lower_offline_limit_exceeded / set_lower_offline_limit_exceeded => (3, 0x40, "Lower consecutive offline limit exceeded"),
        is_upper_offline_limit_exceeded / set_upper_offline_limit_exceeded => (3, 0x20, "Upper consecutive offline limit exceeded"),
        is_randomly_selected_online / set_randomly_selected_online => (3, 0x10, "Transaction selected randomly for online processing"),
        is_merchant_forced_online / set_merchant_forced_online => (3, 0x08, "Merchant forced transaction online"),
        is_default_tdol_used / set_default_tdol_used => (4, 0x80, "Default TDOL used"),
        is_issuer_authentication_failed / set_issuer_authentication_failed => (4, 0x40, "Issuer authentication failed"),
        is_script_failed_before_final_ac / set_script_failed_before_final_ac => (4, 0x20, "Script processing failed before final GENERATE AC"),
        is_script_failed_after_final_ac / set_script_failed_after_final_ac => (4, 0x10, "Script processing failed after final GENERATE AC"),
    }
}

/// Description given to reserved bit positions
pub const RFU: &str = "RFU";

impl Tvr {
    /// Number of bits in the register
    pub const BITS: usize = Self::LEN * 8;

    /// Description of bit `index`, where 0 is byte 1 bit 8 and 39 is byte 5 bit 1
    ///
    /// Reserved positions and indexes past the end describe as `"RFU"`.
    pub fn bit_description(index: usize) -> &'static str {
        let byte = index / 8;
        let mask = 0x80u8.checked_shr((index % 8) as u32).unwrap_or(0);
        Self::FIELDS
            .iter()
            .find(|f| f.byte == byte && f.mask == mask)
            .map_or(RFU, |f| f.description)
    }

    /// Descriptions of every set bit, reserved bits included as `"RFU"`
    pub fn set_bits(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.to_bits()
            .into_iter()
            .enumerate()
            .filter(|(_, set)| *set)
            .map(|(i, _)| Self::bit_description(i))
    }

    /// The register as 40 bits, byte 1 bit 8 first
    pub fn to_bits(&self) -> Vec<bool> {
        bytes_to_bits(&self.0)
    }

    /// Build a register from exactly 40 bits
    pub fn from_bits(bits: &[bool]) -> Result<Self> {
        Self::new(&bits_to_bytes(bits)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_description() {
        assert_eq!(Tvr::bit_description(0), "Offline data authentication was not performed");
        assert_eq!(Tvr::bit_description(7), RFU);
        assert_eq!(Tvr::bit_description(12), "New card");
        assert_eq!(Tvr::bit_description(24), "Transaction exceeds floor limit");
        assert_eq!(Tvr::bit_description(35), "Script processing failed after final GENERATE AC");
        assert_eq!(Tvr::bit_description(39), RFU);
        assert_eq!(Tvr::bit_description(40), RFU);
    }

    #[test]
    fn test_set_bits() {
        let tvr = Tvr::new(&[0x80, 0x00, 0x80, 0x00, 0x01]).unwrap();
        assert!(tvr.is_offline_data_authentication_not_performed());
        assert!(tvr.is_cardholder_verification_failed());
        let set: Vec<_> = tvr.set_bits().collect();
        assert_eq!(
            set,
            vec![
                "Offline data authentication was not performed",
                "Cardholder verification was not successful",
                RFU,
            ]
        );
    }

    #[test]
    fn test_setters_and_reset() {
        let mut tvr = Tvr::default();
        tvr.set_floor_limit_exceeded(true);
        tvr.set_new_card(true);
        assert_eq!(tvr.to_bytes(), [0x00, 0x08, 0x00, 0x80, 0x00]);
        tvr.reset();
        assert_eq!(tvr.to_bytes(), [0; 5]);
    }

    #[test]
    fn test_bits_round_trip() {
        let tvr = Tvr::from_array([0x42, 0x00, 0x10, 0x08, 0x80]);
        let bits = tvr.to_bits();
        assert_eq!(bits.len(), Tvr::BITS);
        assert_eq!(Tvr::from_bits(&bits).unwrap(), tvr);
        assert!(Tvr::from_bits(&bits[..32]).is_err());
    }

    #[test]
    fn test_wrong_length() {
        assert!(Tvr::new(&[0; 4]).is_err());
    }
}
