//! Parsing engine
//!
//! Recursive descent over a lazily built cursor chain. A parse starts from an
//! entry [`Rule`] (usually a grammar symbol) and raw text; every rule attempt
//! gets its own token and [`Scanner`], and combinators recurse through
//! [`parse_in`] to build the result tree.
//!
//! Bad input is reported inside the returned [`ParseResult`]. An `Err` is always
//! a [`Defect`]: the engine or the grammar is inconsistent and the parse was
//! abandoned.

pub mod combinators;
pub mod cursor;
pub mod error;
pub mod grammar;
pub mod location;
pub mod results;
pub mod rule;
pub mod scanner;
pub mod token;

pub use cursor::{Cursor, Indents};
pub use error::{Defect, GrammarError};
pub use grammar::{Catcher, Grammar, GrammarBuilder, Symbol, SymbolId};
pub use location::Location;
pub use results::{Elements, ParseResult, ResultKind, Slot};
pub use rule::{normalize, Rule, Step};
pub use scanner::Scanner;
pub use token::{Defaults, Token, TokenHandle};

use std::rc::Rc;

/// Where a parse reads from
#[derive(Debug, Clone)]
pub enum Source<'a> {
    Text(&'a str),
    Cursor(Cursor),
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(text: &'a str) -> Self {
        Source::Text(text)
    }
}

impl<'a> From<&'a String> for Source<'a> {
    fn from(text: &'a String) -> Self {
        Source::Text(text)
    }
}

impl From<Cursor> for Source<'_> {
    fn from(cursor: Cursor) -> Self {
        Source::Cursor(cursor)
    }
}

impl From<&Cursor> for Source<'_> {
    fn from(cursor: &Cursor) -> Self {
        Source::Cursor(cursor.clone())
    }
}

impl Source<'_> {
    fn into_cursor(self, grammar: &Grammar) -> Cursor {
        match self {
            Source::Text(text) => Cursor::origin_with(text, grammar.shared_sink()),
            Source::Cursor(cursor) => cursor,
        }
    }
}

/// Optional surroundings of a parse
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Token the entry result is built under
    pub parent: Option<TokenHandle>,
    /// Start here instead of at the source's first character
    pub cursor: Option<Cursor>,
}

impl Context {
    pub fn under(parent: TokenHandle) -> Self {
        Context {
            parent: Some(parent),
            cursor: None,
        }
    }

    /// Resume inside a finished result: a fresh token with its name and tags
    pub fn within(result: &ParseResult) -> Self {
        let defaults = Defaults::new(result.name.clone()).types(result.types.iter().cloned());
        Context::under(Token::new(&defaults, result.start, None).into_handle())
    }

    pub fn at(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }
}

/// Parse `source` with `rule`
pub fn parse<'s>(
    grammar: &Grammar,
    rule: &Rule,
    source: impl Into<Source<'s>>,
    context: Context,
) -> Result<ParseResult, Defect> {
    let cursor = match context.cursor {
        Some(cursor) => cursor,
        None => source.into().into_cursor(grammar),
    };
    parse_in(grammar, rule, &cursor, context.parent)
}

/// One rule attempt: a fresh token, a scanner, and start/outcome diagnostics
pub fn parse_in(
    grammar: &Grammar,
    rule: &Rule,
    cursor: &Cursor,
    parent: Option<TokenHandle>,
) -> Result<ParseResult, Defect> {
    let (defaults, normalized) = match rule {
        Rule::Symbol(id) => (grammar.defaults_of(*id)?, grammar.normalized(*id)?),
        Rule::Dynamic(combinator) => (combinator.defaults(), normalize(rule)),
        other => (Defaults::default(), normalize(other)),
    };

    let token = Token::new(&defaults, cursor.location(), parent).into_handle();
    let mut scanner = Scanner::new(grammar, cursor.clone(), Rc::clone(&token));

    let sink = grammar.sink();
    let label = if sink.is_enabled() {
        rule.describe(grammar)
    } else {
        String::new()
    };
    if sink.is_enabled() {
        sink.record(
            &["PARSER", label.as_str(), "START"],
            format_args!("{} [{}:{}]", cursor.index(), cursor.line(), cursor.column()),
        );
    }

    let result = normalized(&mut scanner)?;

    if sink.is_enabled() {
        let outcome = match result.kind {
            ResultKind::Match => "MATCH",
            ResultKind::Ignore => "IGNORED",
            ResultKind::NoMatch => "UNMATCHED",
            ResultKind::Unexpected { .. } => "UNEXPECTED",
            ResultKind::Error => "ERROR",
        };
        sink.record(
            &["PARSER", label.as_str(), outcome],
            format_args!(
                "{}..{}{}",
                result.start.index,
                result.end.index,
                result
                    .message
                    .as_deref()
                    .map(|message| format!(": {message}"))
                    .unwrap_or_default()
            ),
        );
    }

    Ok(result)
}
