//! Application Interchange Profile (tag 82)

bit_register! {
    /// Application Interchange Profile: card capabilities, 2 bytes
    pub struct Aip[2] as "Application Interchange Profile" {
        is_sda_supported / set_sda_supported => (0, 0x40, "SDA supported"),
        is_dda_supported / set_dda_supported => (0, 0x20, "DDA supported"),
        is_cardholder_verification_supported / set_cardholder_verification_supported => (0, 0x10, "Cardholder verification is supported"),
        is_terminal_risk_management_to_be_performed / set_terminal_risk_management_to_be_performed => (0, 0x08, "Terminal risk management is to be performed"),
        is_issuer_authentication_supported / set_issuer_authentication_supported => (0, 0x04, "Issuer authentication is supported"),
        is_on_device_cvm_supported / set_on_device_cvm_supported => (0, 0x02, "On device cardholder verification is supported"),
        is_cda_supported / set_cda_supported => (0, 0x01, "CDA supported"),
        is_emv_mode_supported / set_emv_mode_supported => (1, 0x80, "EMV mode is supported"),
        is_mobile_supported / set_mobile_supported => (1, 0x40, "Mobile functionality is supported"),
        is_relay_resistance_supported / set_relay_resistance_supported => (1, 0x01, "Relay resistance protocol is supported"),
    }
}

/// Offline data authentication method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationMethod {
    Sda,
    Dda,
    Cda,
    None,
}

impl Aip {
    /// Strongest offline data authentication the card supports (CDA > DDA > SDA)
    pub const fn authentication_method(&self) -> AuthenticationMethod {
        if self.is_cda_supported() {
            AuthenticationMethod::Cda
        } else if self.is_dda_supported() {
            AuthenticationMethod::Dda
        } else if self.is_sda_supported() {
            AuthenticationMethod::Sda
        } else {
            AuthenticationMethod::None
        }
    }
}
