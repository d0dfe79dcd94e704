//! `key: value` entries
//!
//! Either side of the operator may break onto a new line, as long as the next
//! line is indented deeper than the one before it or stays at its depth.

use super::assigner::Assigner;
use super::indents::{CurrentIndent, IncreaseIndent};
use super::name::Name;
use super::value::Value;
use crate::astra::parsing::grammar::{Symbol, SymbolId};
use crate::astra::parsing::rule::{Rule, Step};
use crate::astra::parsing::scanner::Scanner;
use crate::astra::parsing::token::Defaults;

#[derive(Debug, Default)]
pub struct NamedEntry;

impl NamedEntry {
    fn gap(s: &Scanner<'_>) -> Rule {
        s.optional(s.choice([
            SymbolId::of::<IncreaseIndent>().rule(),
            SymbolId::of::<CurrentIndent>().rule(),
        ]))
    }
}

impl Symbol for NamedEntry {
    fn defaults(&self) -> Defaults {
        Defaults::new("named-entry").types(["statement", "assignment", "entry"])
    }

    fn rule(&self) -> Rule {
        Rule::function(|s| {
            Ok(Step::Defer(s.sequence([
                s.field("key", SymbolId::of::<Name>()),
                NamedEntry::gap(s),
                s.field("operator", SymbolId::of::<Assigner>()),
                NamedEntry::gap(s),
                s.field("value", SymbolId::of::<Value>()),
            ])))
        })
    }
}
