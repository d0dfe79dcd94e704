//! Assignment operators
//!
//! `assigner` is a splayed root: each operator registers itself as one of its
//! alternatives. Only the mutable field assigner (`:`) exists so far.

use crate::astra::parsing::combinators::Splayed;
use crate::astra::parsing::grammar::{Symbol, SymbolId};
use crate::astra::parsing::rule::Rule;
use crate::astra::parsing::token::Defaults;

#[derive(Debug, Default)]
pub struct Assigner;

impl Symbol for Assigner {
    fn defaults(&self) -> Defaults {
        Defaults::new("assigner").types(["operator"])
    }

    fn rule(&self) -> Rule {
        Rule::dynamic(Splayed::new(SymbolId::of::<Assigner>()))
    }
}

/// `:` followed by whitespace or the end of input
///
/// Inline whitespace after the colon is consumed; a newline is left for the
/// indentation tokens.
#[derive(Debug, Default)]
pub struct MutableFieldAssigner;

impl Symbol for MutableFieldAssigner {
    fn defaults(&self) -> Defaults {
        Defaults::new("mutable-field-assigner")
    }

    fn splays(&self) -> Option<SymbolId> {
        Some(SymbolId::of::<Assigner>())
    }

    fn rule(&self) -> Rule {
        Rule::normalized(|s| {
            let after = s.cursor.next()?;
            let separated = after
                .as_ref()
                .map_or(true, |after| after.char().map_or(true, char::is_whitespace));

            let (Some(':'), Some(mut end)) = (s.cursor.char(), after) else {
                let found = s.cursor.char().map(String::from).unwrap_or_default();
                return Ok(s.unexpected(&found, &[Rule::literal(":")], &s.cursor, None));
            };
            if !separated {
                let found = s.cursor.peek(2).unwrap_or(":").to_string();
                return Ok(s.unexpected(
                    &found,
                    &[Rule::literal(": ")],
                    &s.cursor,
                    Some("An assignment operator must be followed by whitespace."),
                ));
            }

            while matches!(end.char(), Some(' ' | '\t')) {
                match end.next()? {
                    Some(next) => end = next,
                    None => break,
                }
            }
            Ok(s.matched(&end))
        })
    }
}
