//! Treeviz formatter for parse results
//!
//! One line per node, nesting drawn with box characters. Elements are listed in
//! attachment order; named properties are prefixed with their key.
//!
//! Format:
//! <prefix><connector> <icon> [<key>=]<name> [<start>..<end>] [: <message>]
//!
//! Example:
//!
//! ● named-entry 0..11
//! ├─ ● key=name 0..3
//! ├─ ● operator=mutable-field-assigner 3..4
//! ├─ ● indent-increase 4..6
//! └─ ● value=text 6..11
//!
//! Icons
//!     Match: ●
//!     Ignore: ○
//!     NoMatch: ∅
//!     Error: ✗
//!     Unexpected: ⚠

use crate::astra::parsing::results::{ParseResult, ResultKind, Slot};

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

fn icon(kind: &ResultKind) -> &'static str {
    match kind {
        ResultKind::Match => "●",
        ResultKind::Ignore => "○",
        ResultKind::NoMatch => "∅",
        ResultKind::Error => "✗",
        ResultKind::Unexpected { .. } => "⚠",
    }
}

fn label(result: &ParseResult, key: Option<&str>, show_locations: bool) -> String {
    let name = if result.name.is_empty() {
        "(anonymous)"
    } else {
        result.name.as_str()
    };
    let mut label = match key {
        Some(key) => format!("{} {}={}", icon(&result.kind), key, name),
        None => format!("{} {}", icon(&result.kind), name),
    };
    if show_locations {
        label.push_str(&format!(" {}..{}", result.start.index, result.end.index));
    }
    if result.is_error() {
        if let Some(message) = &result.message {
            label.push_str(": ");
            label.push_str(&truncate(message, 30));
        }
    }
    label
}

pub fn to_treeviz(result: &ParseResult, show_locations: bool) -> String {
    let mut output = label(result, None, show_locations);
    output.push('\n');
    append_elements(&mut output, result, "", show_locations);
    output
}

fn append_elements(output: &mut String, result: &ParseResult, prefix: &str, show_locations: bool) {
    let slots = result.elements.slots();
    for (i, slot) in slots.iter().enumerate() {
        let is_last = i == slots.len() - 1;
        let connector = if is_last { "└─" } else { "├─" };
        let key = match slot {
            Slot::Named(key, _) => Some(key.as_str()),
            Slot::Positional(_) => None,
        };

        output.push_str(&format!(
            "{}{} {}\n",
            prefix,
            connector,
            label(slot.result(), key, show_locations)
        ));

        let new_prefix = format!("{}{}", prefix, if is_last { "   " } else { "│  " });
        append_elements(output, slot.result(), &new_prefix, show_locations);
    }
}
