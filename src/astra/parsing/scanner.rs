//! The state every rule runs against
//!
//! A [`Scanner`] bundles the entry cursor of the attempt, the cursor rules read
//! from, and the token being built. Its builders stamp results from that token so
//! rule bodies only say where a result ends; its factories build the
//! combinators.

use crate::astra::parsing::combinators::{Choice, Field, Optional, Sequence};
use crate::astra::parsing::cursor::Cursor;
use crate::astra::parsing::error::Defect;
use crate::astra::parsing::grammar::Grammar;
use crate::astra::parsing::location::Location;
use crate::astra::parsing::results::{self, ParseResult};
use crate::astra::parsing::rule::Rule;
use crate::astra::parsing::token::TokenHandle;
use std::fmt;
use std::rc::Rc;

pub struct Scanner<'g> {
    pub grammar: &'g Grammar,
    /// Where this attempt began
    pub start: Cursor,
    pub cursor: Cursor,
    pub token: TokenHandle,
}

impl<'g> Scanner<'g> {
    pub fn new(grammar: &'g Grammar, cursor: Cursor, token: TokenHandle) -> Self {
        Scanner {
            grammar,
            start: cursor.clone(),
            cursor,
            token,
        }
    }

    pub fn index(&self) -> usize {
        self.cursor.index()
    }

    pub fn line(&self) -> usize {
        self.cursor.line()
    }

    pub fn column(&self) -> usize {
        self.cursor.column()
    }

    pub fn name(&self) -> String {
        self.token.borrow().name.clone()
    }

    /// Parse `rule` at `cursor` as a child of this scanner's token
    pub fn parse(&self, rule: &Rule, cursor: &Cursor) -> Result<ParseResult, Defect> {
        crate::astra::parsing::parse_in(self.grammar, rule, cursor, Some(Rc::clone(&self.token)))
    }

    /// Parse `rule` at `cursor` under an explicit parent token
    pub fn parse_under(
        &self,
        rule: &Rule,
        cursor: &Cursor,
        parent: Option<TokenHandle>,
    ) -> Result<ParseResult, Defect> {
        crate::astra::parsing::parse_in(self.grammar, rule, cursor, parent)
    }

    /// Record a diagnostic under `PARSER/<token name>/<tags..>`
    pub fn log(&self, tags: &[&str], message: fmt::Arguments<'_>) {
        let sink = self.grammar.sink();
        if !sink.is_enabled() {
            return;
        }
        let name = self.name();
        let mut path = vec!["PARSER", name.as_str()];
        path.extend_from_slice(tags);
        sink.record(&path, message);
    }

    pub fn matched(&self, end: impl Into<Location>) -> ParseResult {
        results::matched(&self.token, end)
    }

    pub fn fail(&self, end: impl Into<Location>, message: Option<&str>) -> ParseResult {
        results::fail(&self.token, end, message)
    }

    pub fn fail_with(&self, child: ParseResult) -> ParseResult {
        results::fail_with(&self.token, child)
    }

    pub fn none(&self, attempts: Vec<ParseResult>) -> ParseResult {
        results::none(&self.token, attempts)
    }

    pub fn ignore(&self, until: Option<Location>) -> ParseResult {
        results::ignore(&self.token, until)
    }

    pub fn not_implemented(&self) -> ParseResult {
        results::not_implemented(&self.token)
    }

    /// `Unexpected`, with the expected rules rendered as `a | b`
    pub fn unexpected(
        &self,
        found: &str,
        expected: &[Rule],
        end: impl Into<Location>,
        message: Option<&str>,
    ) -> ParseResult {
        let expected = Rule::describe_all(expected, self.grammar);
        results::unexpected(&self.token, found, expected, end, message)
    }

    pub fn sequence<I>(&self, rules: I) -> Rule
    where
        I: IntoIterator<Item = Rule>,
    {
        Rule::dynamic(Sequence::new(rules))
    }

    pub fn choice<I>(&self, options: I) -> Rule
    where
        I: IntoIterator<Item = Rule>,
    {
        Rule::dynamic(Choice::new(options))
    }

    pub fn optional(&self, rule: impl Into<Rule>) -> Rule {
        Rule::dynamic(Optional::new(rule))
    }

    pub fn field(&self, name: &str, rule: impl Into<Rule>) -> Rule {
        Rule::dynamic(Field::new(name, rule))
    }
}

impl fmt::Debug for Scanner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("start", &self.start.location())
            .field("at", &format_args!("{} [{}:{}]", self.index(), self.line(), self.column()))
            .field("cursor", &self.cursor)
            .field("token", &self.token.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astra::diagnostics::MemorySink;
    use crate::astra::parsing::token::{Defaults, Token};

    fn scanner<'g>(grammar: &'g Grammar, text: &str, at: usize) -> Scanner<'g> {
        let cursor = Cursor::origin(text).at(at).unwrap();
        let token = Token::new(&Defaults::new("attempt"), cursor.location(), None).into_handle();
        Scanner::new(grammar, cursor, token)
    }

    #[test]
    fn builders_stamp_the_entry_position() {
        let grammar = Grammar::builder().build();
        let s = scanner(&grammar, "abcdef", 2);
        let end = s.cursor.advance(2).unwrap();
        let result = s.matched(&end);
        assert_eq!((result.start.index, result.end.index), (2, 4));
        assert_eq!(result.name, "attempt");
    }

    #[test]
    fn position_follows_the_cursor() {
        let grammar = Grammar::builder().build();
        let s = scanner(&grammar, "ab\ncd", 4);
        assert_eq!((s.index(), s.line(), s.column()), (4, 1, 1));
        assert!(format!("{s:?}").contains("at: 4 [1:1]"));
    }

    #[test]
    fn unexpected_joins_the_expected_rules() {
        let grammar = Grammar::builder().build();
        let s = scanner(&grammar, "x", 0);
        let result = s.unexpected("x", &[Rule::literal("a"), Rule::literal("b")], &s.cursor, None);
        assert_eq!(result.expected(), Some("a | b"));
    }

    #[test]
    fn log_prefixes_the_token_name() {
        let sink = Rc::new(MemorySink::new());
        let grammar = Grammar::builder().sink(Rc::clone(&sink)).build();
        let s = scanner(&grammar, "x", 0);
        s.log(&["READ"], format_args!("x"));
        assert_eq!(sink.lines_under("PARSER/attempt"), vec!["PARSER/attempt/READ: x".to_string()]);
    }
}
