//! Indentation tokens at every line break of small documents

use astra_parser::astra::parsing::cursor::Cursor;
use astra_parser::astra::parsing::grammar::{Grammar, Symbol, SymbolId};
use astra_parser::astra::parsing::results::ParseResult;
use astra_parser::astra::tokens::{CurrentIndent, DecreaseIndent, IncreaseIndent};
use rstest::rstest;

const NESTED: &str = "a\n\tb\n\t\tc\n\td\ne";
const SIBLINGS: &str = "a\n\tb\n\tc";

fn parse_at<S: Symbol + Default + 'static>(
    grammar: &Grammar,
    text: &str,
    index: usize,
) -> ParseResult {
    let cursor = Cursor::origin(text).at(index).unwrap();
    grammar
        .parse_rule(&SymbolId::of::<S>().rule(), cursor)
        .unwrap()
}

#[rstest]
#[case::into_b(NESTED, 1, true, false, false)]
#[case::into_c(NESTED, 4, true, false, false)]
#[case::back_to_d(NESTED, 8, false, true, false)]
#[case::back_to_e(NESTED, 11, false, true, false)]
#[case::sibling(SIBLINGS, 4, false, false, true)]
fn exactly_one_indent_token_matches(
    #[case] text: &str,
    #[case] index: usize,
    #[case] increase: bool,
    #[case] decrease: bool,
    #[case] current: bool,
) {
    let grammar = Grammar::standard();
    assert_eq!(
        parse_at::<IncreaseIndent>(&grammar, text, index).is_success(),
        increase
    );
    assert_eq!(
        parse_at::<DecreaseIndent>(&grammar, text, index).is_success(),
        decrease
    );
    assert_eq!(
        parse_at::<CurrentIndent>(&grammar, text, index).is_success(),
        current
    );
}

#[test]
fn indent_tokens_end_at_the_next_line_content() {
    let grammar = Grammar::standard();
    let result = parse_at::<IncreaseIndent>(&grammar, NESTED, 4);
    assert_eq!(result.end.index, 7);
    assert_eq!((result.end.line, result.end.column), (2, 2));
    assert!(result.has_type("indent"));
}

#[test]
fn cursors_remember_the_levels_of_earlier_lines() {
    let cursor = Cursor::origin(NESTED).at(10).unwrap();
    let indents = cursor.indents();
    assert_eq!(indents.depth(), 1);
    assert_eq!(indents.previous_depth(), 2);
    assert!(!indents.is_reading());
}
