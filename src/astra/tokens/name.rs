//! Entry keys
//!
//! A name starts with an ASCII letter, `@`, `$`, a non-ASCII character, or a
//! digit, and continues with letters, digits, `_` and non-ASCII characters. The
//! symbols `+ - * % ^ ~` may sit inside a name, but never twice in a row and
//! never in a name that started with a digit and is still all digits. Inline
//! whitespace after the name belongs to it.

use crate::astra::parsing::cursor::Cursor;
use crate::astra::parsing::error::Defect;
use crate::astra::parsing::grammar::Symbol;
use crate::astra::parsing::results::ParseResult;
use crate::astra::parsing::rule::Rule;
use crate::astra::parsing::scanner::Scanner;
use crate::astra::parsing::token::Defaults;
use once_cell::sync::Lazy;
use regex::Regex;

static INLINE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]").unwrap());
static GLOBAL_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z@$]").unwrap());
static NON_ASCII_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\x00-\x7F]").unwrap());
static NUMERIC_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]").unwrap());
static MIDDLE_ONLY_LONE_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[+\-*%^~]").unwrap());
static MIDDLE_ONLY_REPEATABLE_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"_").unwrap());

fn is(pattern: &Regex, c: char) -> bool {
    let mut buffer = [0; 4];
    pattern.is_match(c.encode_utf8(&mut buffer))
}

fn expected_start() -> Vec<Rule> {
    vec![
        Rule::Pattern(NON_ASCII_CHAR.clone()),
        Rule::Pattern(GLOBAL_CHAR.clone()),
        Rule::Pattern(NUMERIC_CHAR.clone()),
    ]
}

#[derive(Debug, Default)]
pub struct Name;

impl Symbol for Name {
    fn defaults(&self) -> Defaults {
        Defaults::new("name").types(["key", "identifier"])
    }

    fn rule(&self) -> Rule {
        Rule::normalized(scan)
    }
}

fn scan(s: &mut Scanner<'_>) -> Result<ParseResult, Defect> {
    let first = s.cursor.char();
    let mut numeric = match first {
        Some(c) if is(&NON_ASCII_CHAR, c) || is(&GLOBAL_CHAR, c) => false,
        Some(c) if is(&NUMERIC_CHAR, c) => true,
        _ => {
            let found = first.map(String::from).unwrap_or_default();
            return Ok(s.unexpected(
                &found,
                &expected_start(),
                &s.cursor,
                Some("Names cannot begin with certain symbols."),
            ));
        }
    };
    s.log(&["READ"], format_args!("{first:?}{}", if numeric { " (numeric)" } else { "" }));

    let mut last_lone: Option<char> = None;
    let mut trailing = false;
    let mut cursor: Cursor = s.cursor.clone();
    while let Some(next) = cursor.next()? {
        cursor = next;
        let Some(c) = cursor.char() else {
            break;
        };

        if is(&INLINE_WHITESPACE, c) {
            trailing = true;
            last_lone = None;
            continue;
        }
        if trailing {
            return Ok(s.matched(&cursor));
        }

        if is(&NON_ASCII_CHAR, c) || is(&GLOBAL_CHAR, c) || is(&MIDDLE_ONLY_REPEATABLE_CHAR, c) {
            numeric = false;
        } else if is(&MIDDLE_ONLY_LONE_CHAR, c) {
            if numeric {
                return Ok(s.fail(
                    &cursor,
                    Some("Names that begin with numeric characters cannot have math symbols following them."),
                ));
            }
            if last_lone == Some(c) {
                let mut expected = expected_start();
                expected.push(Rule::Pattern(MIDDLE_ONLY_REPEATABLE_CHAR.clone()));
                return Ok(s.unexpected(
                    &c.to_string(),
                    &expected,
                    &cursor,
                    Some("The characters +-*%^~ cannot be repeated in a row in a name."),
                ));
            }
            last_lone = Some(c);
            continue;
        } else if !is(&NUMERIC_CHAR, c) {
            return Ok(s.matched(&cursor));
        }

        last_lone = None;
    }

    Ok(s.matched(&cursor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astra::parsing::grammar::Grammar;
    use crate::astra::parsing::results::ResultKind;
    use rstest::rstest;

    fn parse(text: &str) -> ParseResult {
        Grammar::standard().parse::<Name>(text).unwrap()
    }

    #[rstest]
    #[case("key", 3)]
    #[case("key: value", 3)]
    #[case("key  : value", 5)]
    #[case("snake_case\n", 10)]
    #[case("@handle", 7)]
    #[case("$var2", 5)]
    #[case("héllo wörld", 6)]
    #[case("a+b-c", 5)]
    #[case("42", 2)]
    #[case("4x+1", 4)]
    fn valid_names(#[case] text: &str, #[case] end: usize) {
        let result = parse(text);
        assert!(result.is_success(), "{text:?}: {result}");
        assert_eq!(result.end.index, end, "{text:?}");
    }

    #[test]
    fn names_cannot_start_with_a_symbol() {
        let result = parse(":key");
        assert!(matches!(result.kind, ResultKind::Unexpected { .. }));
        assert_eq!(result.found(), Some(":"));
        assert_eq!(result.expected(), Some(r"[^\x00-\x7F] | [a-zA-Z@$] | [0-9]"));
    }

    #[test]
    fn lone_symbols_cannot_repeat() {
        let result = parse("a++b");
        assert!(matches!(result.kind, ResultKind::Unexpected { .. }));
        assert_eq!(result.found(), Some("+"));
        assert_eq!(result.end.index, 2);
    }

    #[test]
    fn numeric_names_cannot_contain_symbols() {
        let result = parse("12+3");
        assert_eq!(result.kind, ResultKind::Error);
        assert_eq!(result.end.index, 2);
    }

    #[test]
    fn names_carry_their_tags() {
        let result = parse("key");
        assert_eq!(result.name, "name");
        assert_eq!(result.types, vec!["name", "key", "identifier"]);
    }
}
