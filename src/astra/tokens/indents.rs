//! Indentation tokens
//!
//! Each token skips the whitespace ahead of it (newlines included) and then
//! compares indent levels at the first visible character:
//!
//! - `indent-increase`: deeper than where the token started
//! - `indent-decrease`: shallower than the previous line
//! - `indent-current`: on a new line, as deep as the previous line
//!
//! They are meant to be tried at the end of a line, on its newline. On failure
//! the skipped whitespace is reported as what was found.

use crate::astra::parsing::cursor::Cursor;
use crate::astra::parsing::error::Defect;
use crate::astra::parsing::grammar::Symbol;
use crate::astra::parsing::results::ParseResult;
use crate::astra::parsing::rule::Rule;
use crate::astra::parsing::scanner::Scanner;
use crate::astra::parsing::token::Defaults;

const TYPES: [&str; 2] = ["whitespace", "indent"];

/// First cursor at or after `cursor` that is not whitespace (or the end)
fn skip_whitespace(cursor: &Cursor) -> Result<Cursor, Defect> {
    let mut cursor = cursor.clone();
    while cursor.char().is_some_and(char::is_whitespace) {
        match cursor.next()? {
            Some(next) => cursor = next,
            None => break,
        }
    }
    Ok(cursor)
}

fn compare(
    s: &mut Scanner<'_>,
    holds: impl Fn(&Cursor, &Cursor) -> bool,
    message: &str,
) -> Result<ParseResult, Defect> {
    let end = skip_whitespace(&s.cursor)?;
    if holds(&s.start, &end) {
        s.log(&["INDENT", "MATCH"], format_args!("depth {}", end.indents().depth()));
        return Ok(s.matched(&end));
    }

    let found = s.start.to(end.index())?.to_string();
    s.log(&["INDENT", "FAIL"], format_args!("depth {}", end.indents().depth()));
    Ok(s.unexpected(&found, &[], &end, Some(message)))
}

/// Base indentation token; has no rule of its own yet
#[derive(Debug, Default)]
pub struct Indent;

impl Symbol for Indent {
    fn defaults(&self) -> Defaults {
        Defaults::new("indent").types(TYPES)
    }

    fn rule(&self) -> Rule {
        Rule::function(|s| Ok(s.not_implemented().into()))
    }
}

#[derive(Debug, Default)]
pub struct IncreaseIndent;

impl Symbol for IncreaseIndent {
    fn defaults(&self) -> Defaults {
        Defaults::new("indent-increase").types(TYPES)
    }

    fn rule(&self) -> Rule {
        Rule::normalized(|s| {
            compare(
                s,
                |start, end| end.indents().depth() > start.indents().depth(),
                "Expected an increase in indentation level",
            )
        })
    }
}

#[derive(Debug, Default)]
pub struct DecreaseIndent;

impl Symbol for DecreaseIndent {
    fn defaults(&self) -> Defaults {
        Defaults::new("indent-decrease").types(TYPES)
    }

    fn rule(&self) -> Rule {
        Rule::normalized(|s| {
            compare(
                s,
                |_, end| {
                    let indents = end.indents();
                    indents.depth() < indents.previous_depth()
                },
                "Expected a decrease in indentation level",
            )
        })
    }
}

#[derive(Debug, Default)]
pub struct CurrentIndent;

impl Symbol for CurrentIndent {
    fn defaults(&self) -> Defaults {
        Defaults::new("indent-current").types(TYPES)
    }

    fn rule(&self) -> Rule {
        Rule::normalized(|s| {
            compare(
                s,
                |start, end| {
                    let indents = end.indents();
                    end.line() != start.line() && indents.depth() == indents.previous_depth()
                },
                "Expected the same indentation level",
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astra::parsing::grammar::{Grammar, SymbolId};
    use crate::astra::parsing::results::ResultKind;
    use rstest::rstest;

    fn parse_at<S: Symbol + Default + 'static>(text: &str, index: usize) -> ParseResult {
        let grammar = Grammar::standard();
        let cursor = Cursor::origin(text).at(index).unwrap();
        grammar.parse_rule(&SymbolId::of::<S>().rule(), cursor).unwrap()
    }

    #[rstest]
    #[case("a\n\tb", 1, true, false, false)]
    #[case("\ta\n\tb", 2, false, false, true)]
    #[case("\ta\nb", 2, false, true, false)]
    #[case("\ta\n\t\tb", 2, true, false, false)]
    #[case("\ta\n\t\tb\n\tc", 6, false, true, false)]
    fn indentation_tokens(
        #[case] text: &str,
        #[case] newline: usize,
        #[case] increase: bool,
        #[case] decrease: bool,
        #[case] current: bool,
    ) {
        assert_eq!(parse_at::<IncreaseIndent>(text, newline).is_success(), increase);
        assert_eq!(parse_at::<DecreaseIndent>(text, newline).is_success(), decrease);
        assert_eq!(parse_at::<CurrentIndent>(text, newline).is_success(), current);
    }

    #[test]
    fn a_match_ends_at_the_first_visible_character() {
        let result = parse_at::<IncreaseIndent>("a\n\tb", 1);
        assert_eq!((result.start.index, result.end.index), (1, 3));
        assert_eq!(result.types, vec!["indent-increase", "whitespace", "indent"]);
    }

    #[test]
    fn failures_report_the_skipped_whitespace() {
        let result = parse_at::<IncreaseIndent>("\ta\n\tb", 2);
        assert!(matches!(result.kind, ResultKind::Unexpected { .. }));
        assert_eq!(result.found(), Some("\n\t"));
        assert_eq!(result.end.index, 4);
    }

    #[test]
    fn current_needs_a_new_line() {
        let result = parse_at::<CurrentIndent>("a b", 1);
        assert!(!result.is_success());
    }

    #[test]
    fn base_indent_is_not_implemented() {
        let result = parse_at::<Indent>("\ta", 0);
        assert!(result.is_ignored());
        assert_eq!(result.message.as_deref(), Some("Not implemented"));
    }

    #[test]
    fn dedent_at_the_end_of_input() {
        let result = parse_at::<DecreaseIndent>("\ta\n", 2);
        assert!(result.is_success());
        assert_eq!(result.end.index, 3);
    }
}
