//! Terminal Transaction Qualifiers (tag 9F66)

bit_register! {
    /// Terminal Transaction Qualifiers: contactless reader capabilities, 4 bytes
    pub struct Ttq[4] as "Terminal Transaction Qualifiers" {
        is_mag_stripe_mode_supported / set_mag_stripe_mode_supported => (0, 0x80, "Mag-stripe mode supported"),
        is_emv_mode_supported / set_emv_mode_supported => (0, 0x20, "EMV mode supported"),
        is_emv_contact_chip_supported / set_emv_contact_chip_supported => (0, 0x10, "EMV contact chip supported"),
        is_offline_only_reader / set_offline_only_reader => (0, 0x08, "Offline-only reader"),
        is_online_pin_supported / set_online_pin_supported => (0, 0x04, "Online PIN supported"),
        is_signature_supported / set_signature_supported => (0, 0x02, "Signature supported"),
        is_oda_for_online_supported / set_oda_for_online_supported => (0, 0x01, "Offline Data Authentication for Online Authorizations supported"),
        is_online_cryptogram_required / set_online_cryptogram_required => (1, 0x80, "Online cryptogram required"),
        is_cvm_required / set_cvm_required => (1, 0x40, "CVM required"),
        is_contact_offline_pin_supported / set_contact_offline_pin_supported => (1, 0x20, "(Contact Chip) Offline PIN supported"),
        is_issuer_update_processing_supported / set_issuer_update_processing_supported => (2, 0x80, "Issuer Update Processing supported"),
        is_consumer_device_cvm_supported / set_consumer_device_cvm_supported => (2, 0x40, "Consumer Device CVM supported"),
    }
}
