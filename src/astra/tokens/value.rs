//! Entry values
//!
//! `value` is a splayed root. Its alternatives are tried in registration order:
//! `number` first, then `text`, which takes whatever is left on the line. When
//! `number` fails, `text` catches the failure with an `Ignore` so the choice
//! carries on to it instead of reporting the number error.

use crate::astra::parsing::combinators::Splayed;
use crate::astra::parsing::cursor::Cursor;
use crate::astra::parsing::error::Defect;
use crate::astra::parsing::grammar::{Catcher, Symbol, SymbolId};
use crate::astra::parsing::results::{self, ParseResult};
use crate::astra::parsing::rule::Rule;
use crate::astra::parsing::scanner::Scanner;
use crate::astra::parsing::token::{Defaults, Token};
use once_cell::sync::Lazy;
use regex::Regex;

static LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\n]*").unwrap());
static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?[0-9]+(?:\.[0-9]+)?$").unwrap());

/// The rest of the current line, without the newline
fn rest_of_line(cursor: &Cursor) -> &str {
    cursor.peek_pattern(&LINE).unwrap_or("")
}

#[derive(Debug, Default)]
pub struct Value;

impl Symbol for Value {
    fn defaults(&self) -> Defaults {
        Defaults::new("value")
    }

    fn rule(&self) -> Rule {
        Rule::dynamic(Splayed::new(SymbolId::of::<Value>()))
    }
}

/// A decimal literal that runs to the end of the line
#[derive(Debug, Default)]
pub struct Number;

impl Symbol for Number {
    fn defaults(&self) -> Defaults {
        Defaults::new("number").types(["literal"])
    }

    fn splays(&self) -> Option<SymbolId> {
        Some(SymbolId::of::<Value>())
    }

    fn rule(&self) -> Rule {
        Rule::normalized(scan_number)
    }
}

fn scan_number(s: &mut Scanner<'_>) -> Result<ParseResult, Defect> {
    let line = rest_of_line(&s.cursor).to_string();
    if DECIMAL.is_match(line.trim_end()) {
        let end = s.cursor.after(&line)?;
        return Ok(s.matched(&end));
    }

    let found = line.trim_end().to_string();
    Ok(s.unexpected(
        &found,
        &[Rule::Pattern(DECIMAL.clone())],
        &s.cursor,
        Some("Expected a number."),
    ))
}

/// Everything up to the end of the line
#[derive(Debug, Default)]
pub struct Text;

impl Symbol for Text {
    fn defaults(&self) -> Defaults {
        Defaults::new("text").types(["literal"])
    }

    fn splays(&self) -> Option<SymbolId> {
        Some(SymbolId::of::<Value>())
    }

    fn rule(&self) -> Rule {
        Rule::normalized(scan_text)
    }

    fn catchers(&self) -> Vec<Catcher> {
        vec![Catcher::new(SymbolId::of::<Number>(), |cursor, parent| {
            let token = Token::new(&Defaults::new("text"), cursor.location(), parent.cloned())
                .into_handle();
            Ok(results::ignore(&token, None))
        })]
    }
}

fn scan_text(s: &mut Scanner<'_>) -> Result<ParseResult, Defect> {
    let line = rest_of_line(&s.cursor).to_string();
    if line.trim().is_empty() {
        let found = s.cursor.char().map(String::from).unwrap_or_default();
        return Ok(s.unexpected(&found, &[], &s.cursor, Some("Expected text.")));
    }

    let end = s.cursor.after(&line)?;
    Ok(s.matched(&end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astra::parsing::grammar::Grammar;
    use crate::astra::parsing::results::ResultKind;
    use rstest::rstest;

    #[rstest]
    #[case("42", "number", 2)]
    #[case("-3.25\nnext", "number", 5)]
    #[case("12 apples", "text", 9)]
    #[case("plain words\nnext", "text", 11)]
    #[case("a\r\nb", "text", 1)]
    fn values_pick_the_first_fitting_alternative(
        #[case] text: &str,
        #[case] name: &str,
        #[case] end: usize,
    ) {
        let result = Grammar::standard().parse::<Value>(text).unwrap();
        assert!(result.is_success(), "{text:?}: {result}");
        assert_eq!(result.name, name);
        assert_eq!(result.end.index, end);
        assert!(result.has_type("value"));
    }

    #[test]
    fn a_blank_value_falls_back_to_the_caught_number() {
        let result = Grammar::standard().parse::<Value>("\nnext").unwrap();
        assert!(result.is_ignored());
        assert_eq!(result.name, "text");
    }

    #[test]
    fn text_alone_rejects_blank_lines() {
        let result = Grammar::standard().parse::<Text>("   \n").unwrap();
        assert!(matches!(result.kind, ResultKind::Unexpected { .. }));
    }
}
