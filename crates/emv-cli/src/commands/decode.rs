//! Dump a TLV tree, including unknown tags

use emv_common::{decode, Tlv};

use crate::formatters::{format_value, FormatMode};

/// Render decoded nodes, one line per node, children indented under their template
pub fn render_tree(nodes: &[Tlv], indent: usize, mode: FormatMode, out: &mut Vec<String>) {
    let indent_str = " ".repeat(indent * 2);
    for node in nodes {
        let tag = node.tag();
        if node.is_constructed() {
            out.push(format!(
                "{}[{}] {} ({} bytes)",
                indent_str,
                hex::encode_upper(tag.bytes()),
                tag.name(),
                node.length()
            ));
            render_tree(node.children(), indent + 1, mode, out);
        } else {
            out.push(format!(
                "{}[{}] {}: {}",
                indent_str,
                hex::encode_upper(tag.bytes()),
                tag.name(),
                format_value(tag, node.value(), mode)
            ));
        }
    }
}

pub fn cmd_decode(data: &[u8], mode: FormatMode) -> emv_common::Result<()> {
    let nodes = decode(data)?;
    let mut lines = Vec::new();
    render_tree(&nodes, 0, mode, &mut lines);
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}
