//! Ordered choice
//!
//! Options are tried in declaration order and the first `Match` wins. An
//! `Ignore` is kept aside (only the first one) and returned when nothing
//! matches. When an option fails outright, the catchers registered for that
//! option by any option of the choice get a chance to recover.

use super::Combinator;
use crate::astra::parsing::error::Defect;
use crate::astra::parsing::grammar::Catcher;
use crate::astra::parsing::results::ParseResult;
use crate::astra::parsing::rule::Rule;
use crate::astra::parsing::scanner::Scanner;
use crate::astra::parsing::token::Defaults;

pub struct Choice {
    options: Vec<Rule>,
}

impl Choice {
    pub fn new<I>(options: I) -> Self
    where
        I: IntoIterator<Item = Rule>,
    {
        Choice {
            options: options.into_iter().collect(),
        }
    }
}

impl Combinator for Choice {
    fn defaults(&self) -> Defaults {
        Defaults::new("choice")
    }

    fn label(&self) -> &'static str {
        "choice"
    }

    fn scan(&self, s: &mut Scanner<'_>) -> Result<ParseResult, Defect> {
        choose(s, &self.options, "CHOICE")
    }
}

/// Catchers any of `options` registered, in option order
fn catchers_for(s: &Scanner<'_>, options: &[Rule]) -> Vec<Catcher> {
    options
        .iter()
        .filter_map(|option| match option {
            Rule::Symbol(id) => Some(s.grammar.catchers_of(*id)),
            _ => None,
        })
        .flatten()
        .collect()
}

pub(crate) fn choose(
    s: &mut Scanner<'_>,
    options: &[Rule],
    key: &str,
) -> Result<ParseResult, Defect> {
    s.log(&[key, "START"], format_args!("{} options", options.len()));

    s.token.borrow_mut().transparent = true;
    let catchers = catchers_for(s, options);
    let parent = s.token.borrow().parent.clone();
    let mut attempts: Vec<ParseResult> = Vec::new();
    let mut first_ignored: Option<ParseResult> = None;

    for (index, option) in options.iter().enumerate() {
        let name = option.describe(s.grammar);
        let result = s.parse(option, &s.cursor)?;

        if result.is_success() {
            s.log(&[key, "TRY", name.as_str(), "MATCH"], format_args!("#{index}"));
            return Ok(result);
        }

        if result.is_ignored() {
            s.log(&[key, "TRY", name.as_str(), "IGNORE"], format_args!("#{index}"));
            if first_ignored.is_none() {
                first_ignored = Some(result.clone());
            }
            attempts.push(result);
            continue;
        }

        s.log(&[key, "TRY", name.as_str(), "FAIL"], format_args!("#{index}"));
        attempts.push(result);

        let Rule::Symbol(failed) = option else {
            continue;
        };
        for (attempt, catcher) in catchers
            .iter()
            .filter(|catcher| catcher.target == *failed)
            .enumerate()
        {
            let caught = (catcher.catch)(&s.cursor, parent.as_ref())?;
            if caught.is_success() {
                s.log(&[key, "TRY", name.as_str(), "CATCH", "MATCH"], format_args!("#{index}.{attempt}"));
                return Ok(caught);
            }
            if caught.is_ignored() {
                s.log(&[key, "TRY", name.as_str(), "CATCH", "IGNORE"], format_args!("#{index}.{attempt}"));
                if first_ignored.is_none() {
                    first_ignored = Some(caught.clone());
                }
            } else {
                s.log(&[key, "TRY", name.as_str(), "CATCH", "FAIL"], format_args!("#{index}.{attempt}"));
            }
            attempts.push(caught);
        }
    }

    match first_ignored {
        Some(ignored) => {
            s.log(&[key, "IGNORED"], format_args!("no match; returning the first ignored"));
            Ok(ignored)
        }
        None => {
            s.log(&[key, "FAIL"], format_args!("no match"));
            Ok(s.none(attempts))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astra::parsing::grammar::{Grammar, Symbol, SymbolId};
    use crate::astra::parsing::results::{self, ResultKind};
    use crate::astra::parsing::combinators::{Field, Sequence};
    use crate::astra::parsing::cursor::Cursor;
    use crate::astra::parsing::token::{Token, TokenHandle};

    fn run(options: Vec<Rule>, text: &str) -> ParseResult {
        let grammar = Grammar::builder().build();
        grammar
            .parse_rule(&Rule::dynamic(Choice::new(options)), text)
            .unwrap()
    }

    fn skip() -> Rule {
        Rule::function(|s| Ok(s.ignore(None).into()))
    }

    #[test]
    fn first_match_wins() {
        let result = run(vec![Rule::literal("ab"), Rule::literal("a")], "abc");
        assert_eq!(result.end.index, 2);

        let result = run(vec![Rule::literal("a"), Rule::literal("ab")], "abc");
        assert_eq!(result.end.index, 1);
    }

    #[test]
    fn a_later_match_beats_an_earlier_ignore() {
        let result = run(vec![skip(), Rule::literal("a")], "a");
        assert!(result.is_success());
    }

    #[test]
    fn the_first_ignore_is_the_fallback() {
        let result = run(vec![Rule::literal("x"), skip(), skip()], "a");
        assert!(result.is_ignored());
    }

    #[test]
    fn no_match_lists_every_attempt() {
        let result = run(vec![Rule::literal("x"), Rule::literal("y")], "a");
        assert_eq!(result.kind, ResultKind::NoMatch);
        assert_eq!(result.name, "choice");
        assert_eq!(result.children().count(), 2);
    }

    #[test]
    fn empty_choice_has_no_match() {
        let result = run(vec![], "a");
        assert_eq!(result.kind, ResultKind::NoMatch);
    }

    #[derive(Default)]
    struct Digit;
    impl Symbol for Digit {
        fn defaults(&self) -> Defaults {
            Defaults::new("digit")
        }
        fn rule(&self) -> Rule {
            Rule::pattern("[0-9]").unwrap()
        }
    }

    #[derive(Default)]
    struct Letter;
    impl Symbol for Letter {
        fn defaults(&self) -> Defaults {
            Defaults::new("letter")
        }
        fn rule(&self) -> Rule {
            Rule::pattern("[a-z]").unwrap()
        }
        fn catchers(&self) -> Vec<Catcher> {
            vec![Catcher::new(SymbolId::of::<Digit>(), |cursor, parent| {
                let token =
                    Token::new(&Defaults::new("rescued"), cursor.location(), parent.cloned())
                        .into_handle();
                let end = cursor.advance(1)?;
                Ok(results::matched(&token, &end))
            })]
        }
    }

    #[test]
    fn catchers_recover_a_failed_option() {
        let grammar = Grammar::builder()
            .symbol::<Digit>()
            .symbol::<Letter>()
            .build();
        let choice = Rule::dynamic(Choice::new([
            SymbolId::of::<Digit>().rule(),
            SymbolId::of::<Letter>().rule(),
        ]));
        let result = grammar.parse_rule(&choice, "!").unwrap();
        assert!(result.is_success());
        assert_eq!(result.name, "rescued");
    }

    #[test]
    fn catchers_only_apply_to_their_target() {
        let grammar = Grammar::builder()
            .symbol::<Digit>()
            .symbol::<Letter>()
            .build();
        let choice = Rule::dynamic(Choice::new([
            SymbolId::of::<Letter>().rule(),
            Rule::literal("?"),
        ]));
        let result = grammar.parse_rule(&choice, "!").unwrap();
        assert_eq!(result.kind, ResultKind::NoMatch);
    }

    fn caught(name: &str, cursor: &Cursor, parent: Option<&TokenHandle>) -> TokenHandle {
        Token::new(&Defaults::new(name), cursor.location(), parent.cloned()).into_handle()
    }

    #[derive(Default)]
    struct Upper;
    impl Symbol for Upper {
        fn defaults(&self) -> Defaults {
            Defaults::new("upper")
        }
        fn rule(&self) -> Rule {
            Rule::pattern("[A-Z]").unwrap()
        }
        fn catchers(&self) -> Vec<Catcher> {
            vec![
                Catcher::new(SymbolId::of::<Digit>(), |cursor, parent| {
                    let token = caught("refused", cursor, parent);
                    Ok(results::fail(&token, cursor, Some("not here")))
                }),
                Catcher::new(SymbolId::of::<Digit>(), |cursor, parent| {
                    let token = caught("second", cursor, parent);
                    let end = cursor.advance(1)?;
                    Ok(results::matched(&token, &end))
                }),
            ]
        }
    }

    #[test]
    fn a_failing_catcher_falls_through_to_the_next() {
        let grammar = Grammar::builder()
            .symbol::<Digit>()
            .symbol::<Upper>()
            .build();
        let choice = Rule::dynamic(Choice::new([
            SymbolId::of::<Digit>().rule(),
            SymbolId::of::<Upper>().rule(),
        ]));
        let result = grammar.parse_rule(&choice, "!").unwrap();
        assert!(result.is_success());
        assert_eq!(result.name, "second");
        assert_eq!(result.end.index, 1);
    }

    #[derive(Default)]
    struct Quiet;
    impl Symbol for Quiet {
        fn defaults(&self) -> Defaults {
            Defaults::new("quiet")
        }
        fn rule(&self) -> Rule {
            Rule::literal("?")
        }
        fn catchers(&self) -> Vec<Catcher> {
            vec![Catcher::new(SymbolId::of::<Digit>(), |cursor, parent| {
                let token = caught("caught", cursor, parent);
                Ok(results::ignore(&token, None))
            })]
        }
    }

    fn quiet_grammar() -> Grammar {
        Grammar::builder()
            .symbol::<Digit>()
            .symbol::<Quiet>()
            .build()
    }

    #[test]
    fn an_option_ignore_outranks_a_later_catcher_ignore() {
        let choice = Rule::dynamic(Choice::new([
            skip(),
            SymbolId::of::<Digit>().rule(),
            SymbolId::of::<Quiet>().rule(),
        ]));
        let result = quiet_grammar().parse_rule(&choice, "!").unwrap();
        assert!(result.is_ignored());
        assert!(result.name.is_empty());
    }

    #[test]
    fn a_catcher_ignore_is_the_fallback_when_it_comes_first() {
        let choice = Rule::dynamic(Choice::new([
            SymbolId::of::<Digit>().rule(),
            SymbolId::of::<Quiet>().rule(),
            skip(),
        ]));
        let result = quiet_grammar().parse_rule(&choice, "!").unwrap();
        assert!(result.is_ignored());
        assert_eq!(result.name, "caught");
    }

    #[test]
    fn a_field_option_binds_on_the_enclosing_sequence() {
        let grammar = Grammar::builder().build();
        let rule = Rule::dynamic(Sequence::new([
            Rule::dynamic(Choice::new([Rule::dynamic(Field::new(
                "x",
                Rule::literal("a"),
            ))])),
            Rule::literal("b"),
        ]));
        let result = grammar.parse_rule(&rule, "ab").unwrap();

        assert_eq!(result.kind, ResultKind::Match);
        assert_eq!(result.end.index, 2);
        assert_eq!(result.property("x").map(|r| r.end.index), Some(1));
    }
}
