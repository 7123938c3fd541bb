//! Hardware-dependent integration tests
//!
//! These tests require a physical EMV card in a card reader.
//! They are ignored by default and must be explicitly run with:
//!
//!     cargo test --package emv-card --test hardware_integration -- --ignored

use emv_card::{aids, commands, status, CardReader, GpoApdu, GpoResponse};
use emv_common::{find_tag, tags, TerminalContext};

/// **Requires**: Card reader connected (card not required)
#[test]
#[ignore = "requires hardware: card reader"]
fn test_list_readers() {
    let reader = CardReader::new().expect("Failed to establish PC/SC context");
    let readers = reader.list_readers().expect("Failed to list readers");
    assert!(!readers.is_empty(), "No card reader connected");
}

/// **Requires**: Card reader with card inserted
#[test]
#[ignore = "requires hardware: card inserted in reader"]
fn test_connect_by_name() {
    let reader = CardReader::new().expect("Failed to establish PC/SC context");
    let (_card, reader_name) = reader.connect_first().expect("Failed to connect to card");
    reader
        .connect(&reader_name)
        .expect("Failed to reconnect by reader name");
}

/// **Requires**: EMV card (credit/debit card) inserted
#[test]
#[ignore = "requires hardware: EMV card"]
fn test_select_then_gpo() {
    let reader = CardReader::new().expect("Failed to establish PC/SC context");
    let (mut card, _) = reader.connect_first().expect("Failed to connect to card");

    let known_aids = [
        ("Visa", aids::VISA),
        ("Mastercard", aids::MASTERCARD),
        ("AmEx", aids::AMEX),
    ];

    let select = known_aids
        .iter()
        .filter_map(|(name, aid)| {
            let response = commands::select(aid).ok()?.send(&mut card).ok()?;
            response.is_success().then(|| {
                println!("Selected {} ({})", name, hex::encode_upper(aid));
                response
            })
        })
        .next()
        .expect("No EMV application could be selected");

    let pdol = find_tag(&select.data, tags::FCI_TEMPLATE)
        .and_then(|fci| find_tag(fci, tags::FCI_PROPRIETARY_TEMPLATE))
        .and_then(|a5| find_tag(a5, tags::PDOL));
    let gpo = GpoApdu::new(pdol).expect("Card sent a malformed PDOL");
    let command = gpo
        .command(&TerminalContext::with_defaults())
        .expect("GPO command too long");
    let response = command
        .send_expect(&mut card, &[status::SUCCESS])
        .expect("GET PROCESSING OPTIONS failed");

    let parsed = GpoResponse::from_bytes(&response.data).expect("Malformed GPO response");
    println!("AIP {} / {} AFL entries", parsed.aip, parsed.afl.entries().len());
}

/// **Requires**: EMV card inserted
#[test]
#[ignore = "requires hardware: EMV card"]
fn test_get_data_atc() {
    let reader = CardReader::new().expect("Failed to establish PC/SC context");
    let (mut card, _) = reader.connect_first().expect("Failed to connect to card");

    commands::select(aids::PPSE)
        .unwrap()
        .send(&mut card)
        .expect("Transmit failed");
    let response = commands::get_data(&[0x9F, 0x36])
        .unwrap()
        .send(&mut card)
        .expect("Transmit failed");
    println!("GET DATA 9F36: {} {}", response.status_string(), response.status_description());
}
