//! EMV tag metadata and the well-known tag registry

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use once_cell::sync::Lazy;

/// BER class of a tag, taken from bits 8-7 of its first byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagClass {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

impl TagClass {
    /// Classify a tag from its first byte
    pub const fn from_first_byte(byte: u8) -> Self {
        match byte >> 6 {
            0b00 => TagClass::Universal,
            0b01 => TagClass::Application,
            0b10 => TagClass::ContextSpecific,
            0b11 => TagClass::Private,
            _ => unreachable!(),
        }
    }
}

impl fmt::Display for TagClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TagClass::Universal => "universal",
            TagClass::Application => "application",
            TagClass::ContextSpecific => "context-specific",
            TagClass::Private => "private",
        };
        f.write_str(s)
    }
}

/// EMV data element format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// b - raw binary
    Binary,
    /// n - BCD numeric, right justified
    Numeric,
    /// cn - compressed numeric, left justified, F padded
    CompressedNumeric,
    /// an - alphanumeric
    Alphanumeric,
    /// ans - alphanumeric with specials
    AlphanumericSpecial,
    /// Mixed content (e.g. track 2 data)
    Mixed,
    /// Data Object List: tag/length pairs without values
    Dol,
    /// Constructed template of nested TLVs
    Template,
}

/// A BER-TLV tag with its registry metadata
///
/// Two tags are equal when their tag bytes are equal.
#[derive(Debug, Clone)]
pub struct Tag {
    bytes: Cow<'static, [u8]>,
    name: &'static str,
    description: &'static str,
    value_type: ValueType,
}

/// Name given to tags missing from the registry
pub const UNKNOWN_TAG_NAME: &str = "Unknown Tag";

impl Tag {
    const fn registered(
        bytes: &'static [u8],
        name: &'static str,
        description: &'static str,
        value_type: ValueType,
    ) -> Self {
        Self {
            bytes: Cow::Borrowed(bytes),
            name,
            description,
            value_type,
        }
    }

    /// A tag that is not in the registry
    pub fn unknown(bytes: &[u8]) -> Self {
        let value_type = if bytes.first().is_some_and(|b| b & 0x20 != 0) {
            ValueType::Template
        } else {
            ValueType::Binary
        };
        Self {
            bytes: Cow::Owned(bytes.to_vec()),
            name: UNKNOWN_TAG_NAME,
            description: "",
            value_type,
        }
    }

    /// Look a tag up in the registry
    pub fn lookup(bytes: &[u8]) -> Option<&'static Tag> {
        REGISTRY.get(bytes).copied()
    }

    /// Registered metadata for `bytes`, or an unknown tag carrying the raw bytes
    pub fn resolve(bytes: &[u8]) -> Tag {
        Self::lookup(bytes)
            .cloned()
            .unwrap_or_else(|| Self::unknown(bytes))
    }

    /// Raw tag bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn class(&self) -> TagClass {
        TagClass::from_first_byte(self.bytes.first().copied().unwrap_or(0))
    }

    /// Bit 6 of the first byte
    pub fn is_constructed(&self) -> bool {
        self.bytes.first().is_some_and(|b| b & 0x20 != 0)
    }

    pub fn is_known(&self) -> bool {
        Self::lookup(&self.bytes).is_some()
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", hex::encode_upper(&self.bytes), self.name)
    }
}

/// Common EMV tags used in payment card processing
pub mod tags {
    // Templates
    pub const FCI_TEMPLATE: &[u8] = &[0x6F];
    pub const FCI_PROPRIETARY_TEMPLATE: &[u8] = &[0xA5];
    pub const RECORD_TEMPLATE: &[u8] = &[0x70];
    pub const RESPONSE_MESSAGE_TEMPLATE_FORMAT_1: &[u8] = &[0x80];
    pub const RESPONSE_MESSAGE_TEMPLATE_FORMAT_2: &[u8] = &[0x77];
    pub const COMMAND_TEMPLATE: &[u8] = &[0x83];

    // Application metadata
    pub const APPLICATION_IDENTIFIER: &[u8] = &[0x4F];
    pub const APPLICATION_LABEL: &[u8] = &[0x50];
    pub const APPLICATION_PAN: &[u8] = &[0x5A];
    pub const APPLICATION_EXPIRATION_DATE: &[u8] = &[0x5F, 0x24];
    pub const ISSUER_IDENTIFICATION_NUMBER: &[u8] = &[0x42];
    pub const LANGUAGE_PREFERENCE: &[u8] = &[0x5F, 0x2D];

    // Processing
    pub const AIP: &[u8] = &[0x82];
    pub const AFL: &[u8] = &[0x94];
    pub const PDOL: &[u8] = &[0x9F, 0x38];
    pub const CDOL1: &[u8] = &[0x8C];
    pub const CDOL2: &[u8] = &[0x8D];
    pub const DDOL: &[u8] = &[0x9F, 0x49];

    // Terminal data
    pub const AMOUNT_AUTHORISED: &[u8] = &[0x9F, 0x02];
    pub const AMOUNT_OTHER: &[u8] = &[0x9F, 0x03];
    pub const TERMINAL_COUNTRY_CODE: &[u8] = &[0x9F, 0x1A];
    pub const TVR: &[u8] = &[0x95];
    pub const TRANSACTION_CURRENCY_CODE: &[u8] = &[0x5F, 0x2A];
    pub const TRANSACTION_DATE: &[u8] = &[0x9A];
    pub const TRANSACTION_TYPE: &[u8] = &[0x9C];
    pub const TERMINAL_TYPE: &[u8] = &[0x9F, 0x35];
    pub const UNPREDICTABLE_NUMBER: &[u8] = &[0x9F, 0x37];
    pub const TTQ: &[u8] = &[0x9F, 0x66];
}

use ValueType::*;

static TABLE: &[Tag] = &[
    Tag::registered(
        &[0x42],
        "Issuer Identification Number (IIN)",
        "The number that identifies the major industry and the card issuer",
        Numeric,
    ),
    Tag::registered(
        &[0x4F],
        "Application Identifier (AID)",
        "Identifies the application as described in ISO/IEC 7816-5",
        Binary,
    ),
    Tag::registered(
        &[0x50],
        "Application Label",
        "Mnemonic associated with the AID according to ISO/IEC 7816-5",
        AlphanumericSpecial,
    ),
    Tag::registered(
        &[0x56],
        "Track 1 Data",
        "Track 1 data as defined by the payment system",
        Mixed,
    ),
    Tag::registered(
        &[0x57],
        "Track 2 Equivalent Data",
        "Contains the data elements of track 2 according to ISO/IEC 7813",
        Mixed,
    ),
    Tag::registered(
        &[0x5A],
        "Application PAN",
        "Valid cardholder account number",
        CompressedNumeric,
    ),
    Tag::registered(
        &[0x5F, 0x20],
        "Cardholder Name",
        "Indicates cardholder name according to ISO 7813",
        AlphanumericSpecial,
    ),
    Tag::registered(
        &[0x5F, 0x24],
        "Application Expiration Date",
        "Date after which application expires (YYMMDD)",
        Numeric,
    ),
    Tag::registered(
        &[0x5F, 0x25],
        "Application Effective Date",
        "Date from which the application may be used (YYMMDD)",
        Numeric,
    ),
    Tag::registered(
        &[0x5F, 0x28],
        "Issuer Country Code",
        "Indicates the country of the issuer according to ISO 3166",
        Numeric,
    ),
    Tag::registered(
        &[0x5F, 0x2A],
        "Transaction Currency Code",
        "Indicates the currency code of the transaction according to ISO 4217",
        Numeric,
    ),
    Tag::registered(
        &[0x5F, 0x2D],
        "Language Preference",
        "1-4 languages stored in order of preference, each represented by 2 alphabetical characters according to ISO 639",
        Alphanumeric,
    ),
    Tag::registered(
        &[0x5F, 0x30],
        "Service Code",
        "Service code as defined in ISO/IEC 7813 for track 1 and track 2",
        Numeric,
    ),
    Tag::registered(
        &[0x5F, 0x34],
        "Application PAN Sequence Number",
        "Identifies and differentiates cards with the same PAN",
        Numeric,
    ),
    Tag::registered(
        &[0x5F, 0x36],
        "Transaction Currency Exponent",
        "Indicates the implied position of the decimal point from the right of the transaction amount",
        Numeric,
    ),
    Tag::registered(
        &[0x5F, 0x50],
        "Issuer URL",
        "The URL provides the location of the Issuer's Library Server on the Internet",
        AlphanumericSpecial,
    ),
    Tag::registered(
        &[0x5F, 0x53],
        "International Bank Account Number (IBAN)",
        "Uniquely identifies the account of a customer at a financial institution",
        Binary,
    ),
    Tag::registered(
        &[0x5F, 0x54],
        "Bank Identifier Code (BIC)",
        "Uniquely identifies a bank as defined in ISO 9362",
        Binary,
    ),
    Tag::registered(
        &[0x5F, 0x55],
        "Issuer Country Code (alpha2 format)",
        "Indicates the country of the issuer as defined in ISO 3166 (using a 2 character alphabetic code)",
        Alphanumeric,
    ),
    Tag::registered(
        &[0x5F, 0x56],
        "Issuer Country Code (alpha3 format)",
        "Indicates the country of the issuer as defined in ISO 3166 (using a 3 character alphabetic code)",
        Alphanumeric,
    ),
    Tag::registered(
        &[0x61],
        "Application Template",
        "Contains one or more data objects relevant to an application directory entry",
        Template,
    ),
    Tag::registered(
        &[0x6F],
        "File Control Information (FCI) Template",
        "Set of file control parameters and file management data",
        Template,
    ),
    Tag::registered(
        &[0x70],
        "Record Template",
        "Template proprietary to the EMV specification",
        Template,
    ),
    Tag::registered(
        &[0x73],
        "Directory Discretionary Template",
        "Issuer discretionary part of the directory",
        Template,
    ),
    Tag::registered(
        &[0x77],
        "Response Message Template Format 2",
        "Contains the data objects (with tags and lengths) returned by the ICC in response to a command",
        Template,
    ),
    Tag::registered(
        &[0x80],
        "Response Message Template Format 1",
        "Contains the data objects (without tags and lengths) returned by the ICC in response to a command",
        Binary,
    ),
    Tag::registered(
        &[0x82],
        "Application Interchange Profile",
        "Indicates the capabilities of the card to support specific functions in the application",
        Binary,
    ),
    Tag::registered(
        &[0x83],
        "Command Template",
        "Identifies the data field of a command message",
        Binary,
    ),
    Tag::registered(
        &[0x84],
        "Dedicated File (DF) Name",
        "Identifies the name of the DF as described in ISO/IEC 7816-4",
        Binary,
    ),
    Tag::registered(
        &[0x87],
        "Application Priority Indicator",
        "Indicates the priority of a given application or group of applications in a directory",
        Binary,
    ),
    Tag::registered(
        &[0x88],
        "Short File Identifier (SFI)",
        "Identifies the AEF referenced in commands related to a given ADF or DDF",
        Binary,
    ),
    Tag::registered(
        &[0x8A],
        "Authorisation Response Code",
        "Code that defines the disposition of a message",
        Alphanumeric,
    ),
    Tag::registered(
        &[0x8C],
        "Card Risk Management Data Object List 1 (CDOL1)",
        "List of data objects to be passed to the ICC in the first GENERATE AC command",
        Dol,
    ),
    Tag::registered(
        &[0x8D],
        "Card Risk Management Data Object List 2 (CDOL2)",
        "List of data objects to be passed to the ICC in the second GENERATE AC command",
        Dol,
    ),
    Tag::registered(
        &[0x8E],
        "Cardholder Verification Method (CVM) List",
        "Identifies a method of verification of the cardholder supported by the application",
        Binary,
    ),
    Tag::registered(
        &[0x8F],
        "CA Public Key Index",
        "Identifies the certification authority's public key in conjunction with the RID",
        Binary,
    ),
    Tag::registered(
        &[0x90],
        "Issuer Public Key Certificate",
        "Issuer public key certified by a certification authority",
        Binary,
    ),
    Tag::registered(
        &[0x92],
        "Issuer Public Key Remainder",
        "Remaining digits of the Issuer Public Key Modulus",
        Binary,
    ),
    Tag::registered(
        &[0x93],
        "Signed Static Application Data",
        "Digital signature on critical application parameters for SDA",
        Binary,
    ),
    Tag::registered(
        &[0x94],
        "Application File Locator (AFL)",
        "Indicates the location (SFI, range of records) of the AEFs related to a given application",
        Binary,
    ),
    Tag::registered(
        &[0x95],
        "Terminal Verification Results",
        "Status of the different functions as seen from the terminal",
        Binary,
    ),
    Tag::registered(
        &[0x9A],
        "Transaction Date",
        "Local date that the transaction was authorised (YYMMDD)",
        Numeric,
    ),
    Tag::registered(
        &[0x9B],
        "Transaction Status Information",
        "Indicates the functions performed in a transaction",
        Binary,
    ),
    Tag::registered(
        &[0x9C],
        "Transaction Type",
        "Indicates the type of financial transaction, represented by the first two digits of ISO 8583:1987 Processing Code",
        Numeric,
    ),
    Tag::registered(
        &[0x9D],
        "Directory Definition File (DDF) Name",
        "Identifies the name of a DF associated with a directory",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x02],
        "Amount, Authorised (Numeric)",
        "Authorised amount of the transaction (excluding adjustments)",
        Numeric,
    ),
    Tag::registered(
        &[0x9F, 0x03],
        "Amount, Other (Numeric)",
        "Secondary amount associated with the transaction representing a cashback amount",
        Numeric,
    ),
    Tag::registered(
        &[0x9F, 0x06],
        "Application Identifier (AID) - terminal",
        "Identifies the application as described in ISO/IEC 7816-5",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x07],
        "Application Usage Control",
        "Indicates issuer's specified restrictions on the geographic usage and services allowed for the application",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x08],
        "Application Version Number (Card)",
        "Version number assigned by the payment system for the application",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x09],
        "Application Version Number (Terminal)",
        "Version number assigned by the payment system for the application",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x0D],
        "Issuer Action Code - Default",
        "Conditions that cause a transaction to be rejected if it might have been approved online",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x0E],
        "Issuer Action Code - Denial",
        "Conditions that cause the denial of a transaction without attempt to go online",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x0F],
        "Issuer Action Code - Online",
        "Conditions that cause a transaction to be transmitted online",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x10],
        "Issuer Application Data",
        "Contains proprietary application data for transmission to the issuer in an online transaction",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x11],
        "Issuer Code Table Index",
        "Indicates the code table according to ISO/IEC 8859 for displaying the Application Preferred Name",
        Numeric,
    ),
    Tag::registered(
        &[0x9F, 0x12],
        "Application Preferred Name",
        "Preferred mnemonic associated with the AID",
        AlphanumericSpecial,
    ),
    Tag::registered(&[0x9F, 0x17], "PIN Try Counter", "Number of PIN tries remaining", Binary),
    Tag::registered(
        &[0x9F, 0x1A],
        "Terminal Country Code",
        "Indicates the country of the terminal, represented according to ISO 3166",
        Numeric,
    ),
    Tag::registered(
        &[0x9F, 0x1F],
        "Track 1 Discretionary Data",
        "Discretionary part of track 1 according to ISO/IEC 7813",
        AlphanumericSpecial,
    ),
    Tag::registered(
        &[0x9F, 0x21],
        "Transaction Time",
        "Local time that the transaction was authorised (HHMMSS)",
        Numeric,
    ),
    Tag::registered(
        &[0x9F, 0x26],
        "Application Cryptogram",
        "Cryptogram returned by the ICC in response of the GENERATE AC command",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x27],
        "Cryptogram Information Data",
        "Indicates the type of cryptogram and the actions to be performed by the terminal",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x32],
        "Issuer Public Key Exponent",
        "Issuer public key exponent used for the verification of the Signed Static Application Data and the ICC Public Key Certificate",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x33],
        "Terminal Capabilities",
        "Indicates the card data input, CVM, and security capabilities of the terminal",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x34],
        "Cardholder Verification Method (CVM) Results",
        "Indicates the results of the last CVM performed",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x35],
        "Terminal Type",
        "Indicates the environment of the terminal, its communications capability, and its operational control",
        Numeric,
    ),
    Tag::registered(
        &[0x9F, 0x36],
        "Application Transaction Counter (ATC)",
        "Counter maintained by the application in the ICC",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x37],
        "Unpredictable Number",
        "Value to provide variability and uniqueness to the generation of a cryptogram",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x38],
        "Processing Options Data Object List (PDOL)",
        "Contains a list of terminal resident data objects needed by the ICC in processing the GET PROCESSING OPTIONS command",
        Dol,
    ),
    Tag::registered(
        &[0x9F, 0x40],
        "Additional Terminal Capabilities",
        "Indicates the data input and output capabilities of the terminal",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x42],
        "Application Currency Code",
        "Indicates the currency in which the account is managed according to ISO 4217",
        Numeric,
    ),
    Tag::registered(
        &[0x9F, 0x44],
        "Application Currency Exponent",
        "Indicates the implied position of the decimal point from the right of the amount",
        Numeric,
    ),
    Tag::registered(
        &[0x9F, 0x46],
        "ICC Public Key Certificate",
        "ICC Public Key certified by the issuer",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x47],
        "ICC Public Key Exponent",
        "ICC Public Key Exponent used for the verification of the Signed Dynamic Application Data",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x48],
        "ICC Public Key Remainder",
        "Remaining digits of the ICC Public Key Modulus",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x49],
        "Dynamic Data Authentication Data Object List (DDOL)",
        "List of data objects to be passed to the ICC in the INTERNAL AUTHENTICATE command",
        Dol,
    ),
    Tag::registered(
        &[0x9F, 0x4A],
        "Static Data Authentication Tag List",
        "List of tags of primitive data objects whose value fields are to be included in the Signed Static or Dynamic Application Data",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x4B],
        "Signed Dynamic Application Data",
        "Digital signature on critical application parameters for DDA or CDA",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x4D],
        "Log Entry",
        "Provides the SFI of the Transaction Log file and its number of records",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x66],
        "Terminal Transaction Qualifiers (TTQ)",
        "Indicates reader capabilities, requirements, and preferences to the card",
        Binary,
    ),
    Tag::registered(
        &[0x9F, 0x6B],
        "Track 2 Data",
        "Track 2 data for contactless magnetic stripe transactions",
        Mixed,
    ),
    Tag::registered(
        &[0x9F, 0x6C],
        "Card Transaction Qualifiers (CTQ)",
        "Used to indicate to the device the card CVM requirements, issuer preferences, and card capabilities",
        Binary,
    ),
    Tag::registered(
        &[0xA5],
        "File Control Information (FCI) Proprietary Template",
        "Identifies the data object proprietary to EMV in the FCI template",
        Template,
    ),
    Tag::registered(
        &[0xBF, 0x0C],
        "File Control Information (FCI) Issuer Discretionary Data",
        "Issuer discretionary part of the FCI",
        Template,
    ),
];

static REGISTRY: Lazy<HashMap<&'static [u8], &'static Tag>> =
    Lazy::new(|| TABLE.iter().map(|tag| (tag.bytes(), tag)).collect());

/// All registered tags, in registry order
pub fn registered_tags() -> impl Iterator<Item = &'static Tag> {
    TABLE.iter()
}

/// Human-readable name for a tag, `"Unknown Tag"` if unregistered
pub fn get_tag_name(tag: &[u8]) -> &'static str {
    Tag::lookup(tag).map_or(UNKNOWN_TAG_NAME, Tag::name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_from_first_byte() {
        assert_eq!(TagClass::from_first_byte(0x04), TagClass::Universal);
        assert_eq!(TagClass::from_first_byte(0x5F), TagClass::Application);
        assert_eq!(TagClass::from_first_byte(0x9F), TagClass::ContextSpecific);
        assert_eq!(TagClass::from_first_byte(0xDF), TagClass::Private);
    }

    #[test]
    fn test_lookup_ttq() {
        let tag = Tag::lookup(&[0x9F, 0x66]).unwrap();
        assert_eq!(tag.name(), "Terminal Transaction Qualifiers (TTQ)");
        assert_eq!(tag.class(), TagClass::ContextSpecific);
        assert!(!tag.is_constructed());
        assert_eq!(tag.value_type(), ValueType::Binary);
    }

    #[test]
    fn test_lookup_template() {
        let tag = Tag::lookup(tags::RECORD_TEMPLATE).unwrap();
        assert!(tag.is_constructed());
        assert_eq!(tag.class(), TagClass::Application);
        assert_eq!(tag.value_type(), ValueType::Template);
    }

    #[test]
    fn test_unknown_tag() {
        assert!(Tag::lookup(&[0xDF, 0x7F]).is_none());
        let tag = Tag::resolve(&[0xDF, 0x7F]);
        assert_eq!(tag.name(), UNKNOWN_TAG_NAME);
        assert_eq!(tag.class(), TagClass::Private);
        assert!(!tag.is_known());
        assert_eq!(get_tag_name(&[0xDF, 0x7F]), "Unknown Tag");
    }

    #[test]
    fn test_equality_by_bytes() {
        let registered = Tag::resolve(&[0x82]);
        let unknown = Tag::unknown(&[0x82]);
        assert_eq!(registered, unknown);
        assert_ne!(registered.name(), unknown.name());
    }

    #[test]
    fn test_registry_has_no_duplicates() {
        assert_eq!(REGISTRY.len(), TABLE.len());
        assert!(registered_tags().all(|t| t.is_known()));
    }

    #[test]
    fn test_display() {
        let tag = Tag::resolve(&[0x5F, 0x2D]);
        assert_eq!(tag.to_string(), "[5F2D] Language Preference");
    }
}
