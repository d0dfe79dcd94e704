//! Grammar rules and their normalization
//!
//! A [`Rule`] is anything a grammar may name where a sub-parse is expected: a
//! literal, a regular expression, a reference to a registered symbol, a rule
//! function, or a combinator built at the call site. [`normalize`] turns every
//! shape into the same callable, a [`NormalizedRule`], which runs against a
//! [`Scanner`] and produces a [`ParseResult`].
//!
//! Rule functions may answer with another rule instead of a result
//! ([`Step::Defer`]); normalization keeps resolving until a result comes out.

use crate::astra::diagnostics::DiagnosticSink;
use crate::astra::parsing::combinators::Combinator;
use crate::astra::parsing::cursor::Cursor;
use crate::astra::parsing::error::Defect;
use crate::astra::parsing::grammar::{Grammar, SymbolId};
use crate::astra::parsing::results::ParseResult;
use crate::astra::parsing::scanner::Scanner;
use crate::astra::parsing::token::TokenHandle;
use regex::Regex;
use std::fmt;
use std::rc::Rc;

/// What a rule function hands back
pub enum Step {
    Done(ParseResult),
    /// Keep going with another rule in the same scanner
    Defer(Rule),
}

impl From<ParseResult> for Step {
    fn from(result: ParseResult) -> Self {
        Step::Done(result)
    }
}

impl From<Rule> for Step {
    fn from(rule: Rule) -> Self {
        Step::Defer(rule)
    }
}

pub type RuleFn = Rc<dyn Fn(&mut Scanner<'_>) -> Result<Step, Defect>>;

/// The older `(cursor, token, sink)` calling shape
pub type LegacyFn = Rc<dyn Fn(&Cursor, &TokenHandle, &dyn DiagnosticSink) -> Result<Step, Defect>>;

pub type NormalizedRule = Rc<dyn Fn(&mut Scanner<'_>) -> Result<ParseResult, Defect>>;

#[derive(Clone)]
pub enum Rule {
    Literal(Rc<str>),
    Pattern(Regex),
    Symbol(SymbolId),
    Function(RuleFn),
    Legacy(LegacyFn),
    Normalized(NormalizedRule),
    Dynamic(Rc<dyn Combinator>),
}

impl Rule {
    pub fn literal(text: &str) -> Self {
        Rule::Literal(Rc::from(text))
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Rule::Pattern)
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&mut Scanner<'_>) -> Result<Step, Defect> + 'static,
    {
        Rule::Function(Rc::new(f))
    }

    pub fn legacy<F>(f: F) -> Self
    where
        F: Fn(&Cursor, &TokenHandle, &dyn DiagnosticSink) -> Result<Step, Defect> + 'static,
    {
        Rule::Legacy(Rc::new(f))
    }

    pub fn normalized<F>(f: F) -> Self
    where
        F: Fn(&mut Scanner<'_>) -> Result<ParseResult, Defect> + 'static,
    {
        Rule::Normalized(Rc::new(f))
    }

    pub fn dynamic(combinator: impl Combinator + 'static) -> Self {
        Rule::Dynamic(Rc::new(combinator))
    }

    /// Display name used by logs and `Unexpected` messages
    pub fn describe(&self, grammar: &Grammar) -> String {
        match self {
            Rule::Literal(text) => text.to_string(),
            Rule::Pattern(pattern) => pattern.as_str().to_string(),
            Rule::Symbol(id) => grammar.name_of(*id),
            Rule::Dynamic(combinator) => combinator.label().to_string(),
            Rule::Function(_) | Rule::Legacy(_) | Rule::Normalized(_) => "<fn>".to_string(),
        }
    }

    /// Renders `a | b | c` for a list of expected rules
    pub fn describe_all(rules: &[Rule], grammar: &Grammar) -> Option<String> {
        if rules.is_empty() {
            return None;
        }
        Some(
            rules
                .iter()
                .map(|rule| rule.describe(grammar))
                .collect::<Vec<_>>()
                .join(" | "),
        )
    }
}

impl From<&str> for Rule {
    fn from(text: &str) -> Self {
        Rule::literal(text)
    }
}

impl From<Regex> for Rule {
    fn from(pattern: Regex) -> Self {
        Rule::Pattern(pattern)
    }
}

impl From<SymbolId> for Rule {
    fn from(id: SymbolId) -> Self {
        Rule::Symbol(id)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Rule::Pattern(pattern) => f.debug_tuple("Pattern").field(&pattern.as_str()).finish(),
            Rule::Symbol(id) => f.debug_tuple("Symbol").field(id).finish(),
            Rule::Function(_) => f.write_str("Function"),
            Rule::Legacy(_) => f.write_str("Legacy"),
            Rule::Normalized(_) => f.write_str("Normalized"),
            Rule::Dynamic(combinator) => f.debug_tuple("Dynamic").field(&combinator.label()).finish(),
        }
    }
}

/// Turn any rule into a scanner callable
///
/// Symbol references resolve lazily through the scanner's grammar, so a rule
/// can name a symbol that is registered later (or created on first use).
pub fn normalize(rule: &Rule) -> NormalizedRule {
    match rule {
        Rule::Literal(text) => {
            let text = Rc::clone(text);
            Rc::new(move |s: &mut Scanner<'_>| scan_literal(s, &text))
        }
        Rule::Pattern(pattern) => {
            let pattern = pattern.clone();
            Rc::new(move |s: &mut Scanner<'_>| scan_pattern(s, &pattern))
        }
        Rule::Symbol(id) => {
            let id = *id;
            Rc::new(move |s: &mut Scanner<'_>| {
                let normalized = s.grammar.normalized(id)?;
                normalized(s)
            })
        }
        Rule::Function(f) => {
            let f = Rc::clone(f);
            Rc::new(move |s: &mut Scanner<'_>| {
                let step = f(s)?;
                resolve(s, step)
            })
        }
        Rule::Legacy(f) => {
            let f = Rc::clone(f);
            Rc::new(move |s: &mut Scanner<'_>| {
                let cursor = s.cursor.clone();
                let token = Rc::clone(&s.token);
                let step = f(&cursor, &token, s.grammar.sink())?;
                resolve(s, step)
            })
        }
        Rule::Normalized(f) => Rc::clone(f),
        Rule::Dynamic(combinator) => {
            let combinator = Rc::clone(combinator);
            Rc::new(move |s: &mut Scanner<'_>| combinator.scan(s))
        }
    }
}

fn resolve(s: &mut Scanner<'_>, mut step: Step) -> Result<ParseResult, Defect> {
    loop {
        match step {
            Step::Done(result) => return Ok(result),
            Step::Defer(Rule::Function(f)) => step = f(s)?,
            Step::Defer(rule) => return normalize(&rule)(s),
        }
    }
}

fn scan_literal(s: &mut Scanner<'_>, text: &str) -> Result<ParseResult, Defect> {
    if s.cursor.peek_str(text).is_some() {
        let end = s.cursor.after(text)?;
        return Ok(s.matched(&end));
    }

    let width = text.chars().count() as isize;
    let found = s.cursor.peek(width).unwrap_or(s.cursor.rest()).to_string();
    let at = s.cursor.location();
    Ok(s.unexpected(&found, &[Rule::literal(text)], at, None))
}

fn scan_pattern(s: &mut Scanner<'_>, pattern: &Regex) -> Result<ParseResult, Defect> {
    if let Some(text) = s.cursor.peek_pattern(pattern).map(str::to_string) {
        let end = s.cursor.after(&text)?;
        return Ok(s.matched(&end));
    }

    let found = s.cursor.char().map(String::from).unwrap_or_default();
    let at = s.cursor.location();
    Ok(s.unexpected(&found, &[Rule::Pattern(pattern.clone())], at, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astra::parsing::results::ResultKind;
    use crate::astra::parsing::Source;

    fn run(rule: Rule, text: &str) -> ParseResult {
        let grammar = Grammar::builder().build();
        grammar.parse_rule(&rule, Source::from(text)).unwrap()
    }

    #[test]
    fn literal_matches_its_text() {
        let result = run(Rule::literal("key"), "key: value");
        assert!(result.is_success());
        assert_eq!(result.end.index, 3);
    }

    #[test]
    fn literal_mismatch_reports_what_was_found() {
        let result = run(Rule::literal(":"), "key");
        assert_eq!(result.found(), Some("k"));
        assert_eq!(result.expected(), Some(":"));
    }

    #[test]
    fn literal_longer_than_the_input_reports_the_rest() {
        let result = run(Rule::literal("abc"), "ab");
        assert_eq!(result.found(), Some("ab"));
    }

    #[test]
    fn pattern_is_anchored() {
        assert!(run(Rule::pattern("[a-z]+").unwrap(), "key").is_success());
        let result = run(Rule::pattern("[0-9]+").unwrap(), "key9");
        assert!(matches!(result.kind, ResultKind::Unexpected { .. }));
        assert_eq!(result.expected(), Some("[0-9]+"));
    }

    #[test]
    fn functions_may_defer_to_other_rules() {
        let rule = Rule::function(|_| Ok(Step::Defer(Rule::function(|_| Ok(Rule::literal("ab").into())))));
        let result = run(rule, "abc");
        assert!(result.is_success());
        assert_eq!(result.end.index, 2);
    }

    #[test]
    fn legacy_functions_see_the_cursor_and_token() {
        let rule = Rule::legacy(|cursor, token, _sink| {
            let end = cursor.advance(1)?;
            Ok(crate::astra::parsing::results::matched(token, &end).into())
        });
        let result = run(rule, "xy");
        assert_eq!(result.end.index, 1);
    }

    #[test]
    fn rules_describe_themselves() {
        let grammar = Grammar::builder().build();
        assert_eq!(Rule::literal(":").describe(&grammar), ":");
        assert_eq!(Rule::pattern(r"\d+").unwrap().describe(&grammar), r"\d+");
        assert_eq!(
            Rule::function(|s| Ok(s.not_implemented().into())).describe(&grammar),
            "<fn>"
        );
        assert_eq!(
            Rule::describe_all(&[Rule::literal("a"), Rule::literal("b")], &grammar).as_deref(),
            Some("a | b")
        );
        assert_eq!(Rule::describe_all(&[], &grammar), None);
    }
}
