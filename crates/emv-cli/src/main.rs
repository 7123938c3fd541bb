use clap::{Parser, Subcommand};
use emv_common::util::hex_to_bytes;
use tracing_subscriber::EnvFilter;

mod commands;
mod formatters;
use formatters::FormatMode;

#[derive(Parser)]
#[command(name = "emv")]
#[command(about = "EMV toolkit - decode BER-TLV data, inspect EMV data elements and build APDUs")]
#[command(version)]
struct Args {
    /// Output format mode
    #[arg(short, long, value_enum, default_value_t = FormatMode::Human, global = true)]
    format: FormatMode,

    /// PC/SC reader to use instead of the first one found
    #[arg(short, long, global = true)]
    reader: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode BER-TLV data and print the tag tree
    Decode {
        #[arg(value_parser = parse_hex)]
        data: HexBytes,
    },
    /// Show every bit of an Application Interchange Profile (tag 82)
    Aip {
        #[arg(value_parser = parse_hex)]
        data: HexBytes,
    },
    /// Show every bit of Terminal Verification Results (tag 95)
    Tvr {
        #[arg(value_parser = parse_hex)]
        data: HexBytes,
    },
    /// Show every bit of Terminal Transaction Qualifiers (tag 9F66)
    Ttq {
        #[arg(value_parser = parse_hex)]
        data: HexBytes,
    },
    /// Decode an Issuer Identification Number (tag 42)
    Iin {
        #[arg(value_parser = parse_hex)]
        data: HexBytes,
    },
    /// Decode a Language Preference (tag 5F2D)
    Lang {
        #[arg(value_parser = parse_hex)]
        data: HexBytes,
    },
    /// Serialize a command APDU
    Build {
        #[arg(long, value_parser = parse_byte, default_value = "00")]
        cla: u8,
        #[arg(long, value_parser = parse_byte)]
        ins: u8,
        #[arg(long, value_parser = parse_byte, default_value = "00")]
        p1: u8,
        #[arg(long, value_parser = parse_byte, default_value = "00")]
        p2: u8,
        /// Command data as hex
        #[arg(long, value_parser = parse_hex)]
        data: Option<HexBytes>,
        /// Expected response length, 0 for up to 256 bytes
        #[arg(long, value_parser = parse_byte)]
        le: Option<u8>,
    },
    /// Build GET PROCESSING OPTIONS from a PDOL and the default terminal data
    Gpo {
        /// PDOL value (tag 9F38) as hex
        #[arg(long, value_parser = parse_hex)]
        pdol: Option<HexBytes>,
        /// Amount, Authorised in minor units
        #[arg(long)]
        amount: Option<u64>,
    },
    /// Send a raw command APDU to the card and decode the response
    Transmit {
        #[arg(value_parser = parse_hex)]
        apdu: HexBytes,
    },
}

/// A hex argument, spaces allowed
#[derive(Clone, Debug, PartialEq, Eq)]
struct HexBytes(Vec<u8>);

fn parse_hex(s: &str) -> Result<HexBytes, String> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    hex_to_bytes(&compact).map(HexBytes).map_err(|e| e.to_string())
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u8::from_str_radix(digits, 16).map_err(|e| format!("invalid hex byte {:?}: {}", s, e))
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mode = args.format;
    match args.command {
        Command::Decode { data } => commands::decode::cmd_decode(&data.0, mode)?,
        Command::Aip { data } => commands::inspect::cmd_aip(&data.0)?,
        Command::Tvr { data } => commands::inspect::cmd_tvr(&data.0)?,
        Command::Ttq { data } => commands::inspect::cmd_ttq(&data.0)?,
        Command::Iin { data } => commands::inspect::cmd_iin(&data.0)?,
        Command::Lang { data } => commands::inspect::cmd_lang(&data.0)?,
        Command::Build { cla, ins, p1, p2, data, le } => {
            commands::build::cmd_build(cla, ins, p1, p2, data.map(|d| d.0), le)?
        }
        Command::Gpo { pdol, amount } => commands::build::cmd_gpo(pdol.map(|d| d.0), amount)?,
        Command::Transmit { apdu } => {
            commands::transmit::cmd_transmit(args.reader.as_deref(), &apdu.0, mode)?
        }
    }
    Ok(())
}

fn main() {
    // Set RUST_LOG=debug for command construction, RUST_LOG=trace for raw APDUs and TLV steps
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    if let Err(err) = run(args) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_hex_arguments() {
        assert_eq!(parse_hex("9F 66 04").unwrap(), HexBytes(vec![0x9F, 0x66, 0x04]));
        assert!(parse_hex("9F6").is_err());
        assert_eq!(parse_byte("0xA4").unwrap(), 0xA4);
        assert_eq!(parse_byte("80").unwrap(), 0x80);
        assert!(parse_byte("100").is_err());
    }

    #[test]
    fn test_subcommand_parsing() {
        let args =
            Args::try_parse_from(["emv", "--format", "raw", "decode", "5F2D02656E"]).unwrap();
        assert_eq!(args.format, FormatMode::Raw);
        assert!(matches!(
            args.command,
            Command::Decode { ref data } if data.0 == [0x5F, 0x2D, 0x02, 0x65, 0x6E]
        ));

        let args = Args::try_parse_from(["emv", "build", "--ins", "84", "--le", "08"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Build { cla: 0, ins: 0x84, le: Some(8), data: None, .. }
        ));
    }
}
