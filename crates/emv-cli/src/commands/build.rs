//! Offline command construction

use emv_card::{ApduCommand, GpoApdu};
use emv_common::{Result, TerminalContext};

pub fn cmd_build(
    cla: u8,
    ins: u8,
    p1: u8,
    p2: u8,
    data: Option<Vec<u8>>,
    le: Option<u8>,
) -> Result<()> {
    let mut command = ApduCommand::new(cla, ins, p1, p2);
    if let Some(data) = data {
        command = command.data(data)?;
    }
    command.set_le(le);
    match command.instruction_name() {
        "" => println!("{}", command),
        name => println!("{}  ({})", command, name),
    }
    Ok(())
}

/// GET PROCESSING OPTIONS for `pdol` answered from the default terminal context
pub fn build_gpo(pdol: Option<&[u8]>, amount: Option<u64>) -> Result<(GpoApdu, ApduCommand)> {
    let mut context = TerminalContext::with_defaults();
    if let Some(amount) = amount {
        context = context.set_amount(amount)?;
    }
    let gpo = GpoApdu::new(pdol)?;
    let command = gpo.command(&context)?;
    Ok((gpo, command))
}

pub fn cmd_gpo(pdol: Option<Vec<u8>>, amount: Option<u64>) -> Result<()> {
    let (gpo, command) = build_gpo(pdol.as_deref(), amount)?;
    for entry in gpo.pdol() {
        println!("  {}", entry);
    }
    println!("{}", command);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_gpo() {
        let (gpo, command) = build_gpo(None, None).unwrap();
        assert!(gpo.pdol().is_empty());
        assert_eq!(command.to_string(), "80A8000002830000");

        let (gpo, command) = build_gpo(Some(&[0x9F, 0x02, 0x06]), Some(1500)).unwrap();
        assert_eq!(gpo.pdol().len(), 1);
        assert_eq!(gpo.pdol()[0].length, 6);
        assert_eq!(command.to_string(), "80A8000008830600000000150000");
    }

    #[test]
    fn test_build_rejects_long_data() {
        assert!(cmd_build(0x00, 0xA4, 0x04, 0x00, Some(vec![0; 256]), None).is_err());
    }
}
