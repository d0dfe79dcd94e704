//! Parse results
//!
//! A parse produces a tree of [`ParseResult`] nodes. Each node carries one
//! [`ResultKind`]:
//!
//! - `Match`: the span `[start, end)` was consumed.
//! - `Ignore`: a deliberate skip (an optional miss, a placeholder, a field binding).
//!   Never a failure by itself.
//! - `NoMatch`: no alternative could be chosen.
//! - `Error`: malformed input.
//! - `Unexpected`: malformed input, with what was found and what was expected.
//!
//! Children and named properties share one ordered list of [`Slot`]s, so the
//! order in which they were attached survives: `key, operator, <indent>, value`
//! reads back exactly like that even though only the indent is positional.
//!
//! The builders at the bottom of this module turn an in-progress token into a
//! result. They stamp `start` from the token and move its accumulated elements
//! into the result.

use crate::astra::parsing::location::Location;
use crate::astra::parsing::token::TokenHandle;
use std::fmt;

/// The outcome carried by a result node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultKind {
    Match,
    Ignore,
    NoMatch,
    Error,
    Unexpected {
        found: String,
        expected: Option<String>,
    },
}

impl ResultKind {
    pub fn label(&self) -> &'static str {
        match self {
            ResultKind::Match => "Match",
            ResultKind::Ignore => "Ignore",
            ResultKind::NoMatch => "NoMatch",
            ResultKind::Error => "Error",
            ResultKind::Unexpected { .. } => "Unexpected",
        }
    }
}

/// One attached element: a positional child or a named property
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Positional(ParseResult),
    Named(String, ParseResult),
}

impl Slot {
    pub fn result(&self) -> &ParseResult {
        match self {
            Slot::Positional(result) | Slot::Named(_, result) => result,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Slot::Positional(_) => None,
            Slot::Named(name, _) => Some(name),
        }
    }
}

/// Children and properties in attachment order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Elements(Vec<Slot>);

impl Elements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional child
    pub fn push(&mut self, child: ParseResult) {
        self.0.push(Slot::Positional(child));
    }

    /// Bind a named property
    ///
    /// Rebinding an existing name replaces the value where it already sits.
    pub fn set(&mut self, name: impl Into<String>, value: ParseResult) {
        let name = name.into();
        match self
            .0
            .iter_mut()
            .find(|slot| slot.name() == Some(name.as_str()))
        {
            Some(slot) => *slot = Slot::Named(name, value),
            None => self.0.push(Slot::Named(name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<ParseResult> {
        let position = self.0.iter().position(|slot| slot.name() == Some(name))?;
        match self.0.remove(position) {
            Slot::Named(_, value) | Slot::Positional(value) => Some(value),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.0
    }

    /// Every element in attachment order
    pub fn iter(&self) -> impl Iterator<Item = &ParseResult> {
        self.0.iter().map(Slot::result)
    }

    pub fn get(&self, index: usize) -> Option<&ParseResult> {
        self.0.get(index).map(Slot::result)
    }

    pub fn children(&self) -> impl Iterator<Item = &ParseResult> {
        self.0.iter().filter_map(|slot| match slot {
            Slot::Positional(child) => Some(child),
            Slot::Named(..) => None,
        })
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &ParseResult)> {
        self.0.iter().filter_map(|slot| match slot {
            Slot::Named(name, value) => Some((name.as_str(), value)),
            Slot::Positional(_) => None,
        })
    }

    pub fn property(&self, name: &str) -> Option<&ParseResult> {
        self.properties()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    pub fn child_count(&self) -> usize {
        self.children().count()
    }

    pub fn property_count(&self) -> usize {
        self.properties().count()
    }

    fn extend(&mut self, other: Elements) {
        self.0.extend(other.0);
    }
}

/// A node of the parse output tree
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    pub kind: ResultKind,
    pub name: String,
    /// Type tags, most specific first
    pub types: Vec<String>,
    pub start: Location,
    pub end: Location,
    pub message: Option<String>,
    /// Name of the token this result was built under
    pub parent: Option<String>,
    pub elements: Elements,
}

impl ParseResult {
    pub fn new(kind: ResultKind, start: Location, end: Location) -> Self {
        ParseResult {
            kind,
            name: String::new(),
            types: Vec::new(),
            start,
            end,
            message: None,
            parent: None,
            elements: Elements::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.kind, ResultKind::Match)
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self.kind, ResultKind::Ignore)
    }

    /// `NoMatch`, `Error` and `Unexpected`
    pub fn is_error(&self) -> bool {
        matches!(
            self.kind,
            ResultKind::NoMatch | ResultKind::Error | ResultKind::Unexpected { .. }
        )
    }

    /// Anything that is not an error
    pub fn truthy(&self) -> bool {
        !self.is_error()
    }

    pub fn is_empty(&self) -> bool {
        self.start.index == self.end.index
    }

    pub fn position(&self) -> (Location, Location) {
        (self.start, self.end)
    }

    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }

    pub fn children(&self) -> impl Iterator<Item = &ParseResult> {
        self.elements.children()
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &ParseResult)> {
        self.elements.properties()
    }

    pub fn property(&self, name: &str) -> Option<&ParseResult> {
        self.elements.property(name)
    }

    pub fn found(&self) -> Option<&str> {
        match &self.kind {
            ResultKind::Unexpected { found, .. } => Some(found),
            _ => None,
        }
    }

    pub fn expected(&self) -> Option<&str> {
        match &self.kind {
            ResultKind::Unexpected { expected, .. } => expected.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for ParseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.kind.label(),
            crate::astra::formats::json::to_json(self, false)
        )
    }
}

fn stamp(kind: ResultKind, token: &TokenHandle, end: Location) -> ParseResult {
    let mut token = token.borrow_mut();
    let parent = token.parent_name();
    ParseResult {
        kind,
        name: token.name.clone(),
        types: token.types.clone(),
        start: token.start,
        end,
        message: None,
        parent,
        elements: std::mem::take(&mut token.elements),
    }
}

fn default_end(token: &TokenHandle) -> Location {
    let token = token.borrow();
    token.end.unwrap_or(token.start)
}

/// `Match` of `[start, end)`
pub fn matched(token: &TokenHandle, end: impl Into<Location>) -> ParseResult {
    stamp(ResultKind::Match, token, end.into())
}

/// `Error` ending at `end`
pub fn fail(token: &TokenHandle, end: impl Into<Location>, message: Option<&str>) -> ParseResult {
    let mut result = stamp(ResultKind::Error, token, end.into());
    result.message = message.map(str::to_string);
    result
}

/// `Error` wrapping a child failure, ending where the child ended
///
/// The wrapper becomes the child's parent.
pub fn fail_with(token: &TokenHandle, mut child: ParseResult) -> ParseResult {
    let mut result = stamp(ResultKind::Error, token, child.end);
    result.message = child.message.clone();
    child.parent = Some(result.name.clone());
    result.elements.push(child);
    result
}

/// `NoMatch` carrying every attempted result as children
pub fn none(token: &TokenHandle, attempts: Vec<ParseResult>) -> ParseResult {
    let end = default_end(token);
    let mut result = stamp(ResultKind::NoMatch, token, end);
    let mut tried = Elements::new();
    for attempt in attempts {
        tried.push(attempt);
    }
    result.elements.extend(tried);
    result
}

/// `Ignore` up to `until`, or zero-width at the token's start
pub fn ignore(token: &TokenHandle, until: Option<Location>) -> ParseResult {
    let end = until.unwrap_or_else(|| default_end(token));
    stamp(ResultKind::Ignore, token, end)
}

/// Zero-width `Ignore` for rules that have no body yet
pub fn not_implemented(token: &TokenHandle) -> ParseResult {
    let start = token.borrow().start;
    let mut result = stamp(ResultKind::Ignore, token, start);
    result.message = Some("Not implemented".to_string());
    result
}

/// `Unexpected` naming what was found and, optionally, what was expected
pub fn unexpected(
    token: &TokenHandle,
    found: impl Into<String>,
    expected: Option<String>,
    end: impl Into<Location>,
    message: Option<&str>,
) -> ParseResult {
    let found = found.into();
    let mut text = format!("Unexpected token: {found:?}");
    match &expected {
        Some(expected) => text.push_str(&format!("; expected: {expected}.")),
        None => text.push('.'),
    }
    if let Some(message) = message {
        text.push(' ');
        text.push_str(message);
    }

    let mut result = stamp(ResultKind::Unexpected { found, expected }, token, end.into());
    result.message = Some(text);
    result
}
