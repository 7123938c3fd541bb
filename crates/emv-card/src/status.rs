//! ISO 7816-4 and EMV status words

pub const SUCCESS: u16 = 0x9000;

// Warnings
pub const WARNING_NO_CHANGE: u16 = 0x6200;
pub const WARNING_CORRUPTED: u16 = 0x6281;
pub const WARNING_EOF: u16 = 0x6282;
pub const WARNING_SELECTED_FILE_INVALIDATED: u16 = 0x6283;
pub const WARNING_FCI_INVALID: u16 = 0x6284;
pub const WARNING_STATE_CHANGED: u16 = 0x6300;

// Execution errors
pub const EXECUTION_ERROR: u16 = 0x6400;
pub const MEMORY_FAILURE: u16 = 0x6581;

// Checking errors
pub const WRONG_LENGTH: u16 = 0x6700;
pub const LOGICAL_CHANNEL_NOT_SUPPORTED: u16 = 0x6881;
pub const SECURE_MESSAGING_NOT_SUPPORTED: u16 = 0x6882;
pub const COMMAND_INCOMPATIBLE: u16 = 0x6981;
pub const SECURITY_STATUS_NOT_SATISFIED: u16 = 0x6982;
pub const AUTH_METHOD_BLOCKED: u16 = 0x6983;
pub const REFERENCE_DATA_NOT_USABLE: u16 = 0x6984;
pub const CONDITIONS_NOT_SATISFIED: u16 = 0x6985;
pub const COMMAND_NOT_ALLOWED: u16 = 0x6986;
pub const WRONG_DATA: u16 = 0x6A80;
pub const FUNCTION_NOT_SUPPORTED: u16 = 0x6A81;
pub const FILE_NOT_FOUND: u16 = 0x6A82;
pub const RECORD_NOT_FOUND: u16 = 0x6A83;
pub const NOT_ENOUGH_MEMORY: u16 = 0x6A84;
pub const INCORRECT_P1_P2: u16 = 0x6A86;
pub const REFERENCED_DATA_NOT_FOUND: u16 = 0x6A88;
pub const WRONG_P1_P2: u16 = 0x6B00;
pub const INS_NOT_SUPPORTED: u16 = 0x6D00;
pub const CLA_NOT_SUPPORTED: u16 = 0x6E00;
pub const UNKNOWN_ERROR: u16 = 0x6F00;

/// Short description of a status word, `"Unknown status"` when unrecognised
pub fn status_description(sw: u16) -> &'static str {
    let [sw1, sw2] = sw.to_be_bytes();
    match (sw1, sw2) {
        (0x90, 0x00) => "Success",
        (0x61, _) => "Response bytes still available",
        (0x62, 0x00) => "Warning: state of non-volatile memory unchanged",
        (0x62, 0x81) => "Warning: part of returned data may be corrupted",
        (0x62, 0x82) => "Warning: end of file or record reached before reading Le bytes",
        (0x62, 0x83) => "Warning: selected file invalidated",
        (0x62, 0x84) => "Warning: FCI not formatted correctly",
        (0x63, 0x00) => "Warning: state of non-volatile memory changed",
        (0x63, n) if n & 0xF0 == 0xC0 => "Warning: counter provided in low nibble",
        (0x64, 0x00) => "Execution error: state of non-volatile memory unchanged",
        (0x65, 0x81) => "Execution error: memory failure",
        (0x67, 0x00) => "Wrong length",
        (0x68, 0x81) => "Logical channel not supported",
        (0x68, 0x82) => "Secure messaging not supported",
        (0x69, 0x81) => "Command incompatible with file structure",
        (0x69, 0x82) => "Security status not satisfied",
        (0x69, 0x83) => "Authentication method blocked",
        (0x69, 0x84) => "Referenced data invalidated",
        (0x69, 0x85) => "Conditions of use not satisfied",
        (0x69, 0x86) => "Command not allowed (no current EF)",
        (0x6A, 0x80) => "Incorrect parameters in the data field",
        (0x6A, 0x81) => "Function not supported",
        (0x6A, 0x82) => "File or application not found",
        (0x6A, 0x83) => "Record not found",
        (0x6A, 0x84) => "Not enough memory space in the file",
        (0x6A, 0x86) => "Incorrect parameters P1-P2",
        (0x6A, 0x88) => "Referenced data not found",
        (0x6B, 0x00) => "Wrong parameters P1-P2",
        (0x6C, _) => "Wrong Le field, exact length in SW2",
        (0x6D, 0x00) => "Instruction code not supported or invalid",
        (0x6E, 0x00) => "Class not supported",
        (0x6F, 0x00) => "No precise diagnosis",
        _ => "Unknown status",
    }
}

/// Status words that let the terminal continue with the response data
pub fn is_normal_processing(sw: u16) -> bool {
    sw == SUCCESS || sw >> 8 == 0x61
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptions() {
        assert_eq!(status_description(SUCCESS), "Success");
        assert_eq!(status_description(FILE_NOT_FOUND), "File or application not found");
        assert_eq!(status_description(0x6C10), "Wrong Le field, exact length in SW2");
        assert_eq!(status_description(0x63C2), "Warning: counter provided in low nibble");
        assert_eq!(status_description(0x1234), "Unknown status");
    }

    #[test]
    fn test_normal_processing() {
        assert!(is_normal_processing(0x9000));
        assert!(is_normal_processing(0x6110));
        assert!(!is_normal_processing(0x6A82));
    }
}
