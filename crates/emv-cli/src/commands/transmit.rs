//! Send a raw command APDU through a PC/SC reader

use emv_card::{ApduCommand, CardReader};
use tracing::info;

use super::decode::render_tree;
use crate::formatters::FormatMode;

pub fn cmd_transmit(
    reader_name: Option<&str>,
    apdu: &[u8],
    mode: FormatMode,
) -> Result<(), Box<dyn std::error::Error>> {
    let command = ApduCommand::from_bytes(apdu)?;

    let reader = CardReader::new()?;
    let mut card = match reader_name {
        Some(name) => reader.connect(name)?,
        None => {
            let (card, name) = reader.connect_first()?;
            info!(reader = %name, "connected");
            card
        }
    };

    let response = command.send(&mut card)?;
    println!(
        "SW: {} ({})",
        response.status_string(),
        response.status_description()
    );
    if response.data.is_empty() {
        return Ok(());
    }

    match response.tlv() {
        Ok(nodes) => {
            let mut lines = Vec::new();
            render_tree(&nodes, 0, mode, &mut lines);
            for line in lines {
                println!("{}", line);
            }
        }
        Err(_) => println!(
            "Data ({} bytes): {}",
            response.data.len(),
            hex::encode_upper(&response.data)
        ),
    }
    Ok(())
}
