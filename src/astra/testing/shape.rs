//! Expected result shapes
//!
//! A shape only constrains what it names: a missing field matches anything.
//! Wherever a shape is expected a bare string may stand in, meaning "any result
//! carrying this type tag".
//!
//! ```yaml
//! name: named-entry
//! start: 0
//! end: { index: 11, line: 1 }
//! properties:
//!   key: name
//! elements:
//!   2: indent-increase
//!   value: { is: text, kind: match }
//! ```

use crate::astra::parsing::location::Location;
use crate::astra::parsing::results::ParseResult;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// A type tag or a full shape
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Expected {
    Tag(String),
    Shape(Box<Shape>),
}

/// A position given as a bare index or as any of its coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Position {
    Index(usize),
    At {
        #[serde(default)]
        index: Option<usize>,
        #[serde(default)]
        line: Option<usize>,
        #[serde(default)]
        column: Option<usize>,
    },
}

impl Position {
    fn matches(&self, location: &Location) -> bool {
        match *self {
            Position::Index(index) => location.index == index,
            Position::At {
                index,
                line,
                column,
            } => {
                index.map_or(true, |i| i == location.index)
                    && line.map_or(true, |l| l == location.line)
                    && column.map_or(true, |c| c == location.column)
            }
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Index(index) => write!(f, "{index}"),
            Position::At {
                index,
                line,
                column,
            } => {
                let show = |v: &Option<usize>| v.map_or("_".to_string(), |v| v.to_string());
                write!(f, "{} [{}:{}]", show(index), show(line), show(column))
            }
        }
    }
}

/// An element addressed by its position among all elements, or by property name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(untagged)]
pub enum ElementKey {
    Index(usize),
    Name(String),
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKey::Index(index) => write!(f, "{index}"),
            ElementKey::Name(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Shape {
    #[serde(default)]
    pub name: Option<String>,
    /// A type tag the result must carry
    #[serde(default)]
    pub is: Option<String>,
    /// Type tags the result must all carry
    #[serde(default)]
    pub types: Vec<String>,
    /// Result kind, compared case-insensitively (`match`, `error`, ...)
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub start: Option<Position>,
    #[serde(default)]
    pub end: Option<Position>,
    /// Leading positional children, in order
    #[serde(default)]
    pub children: Vec<Expected>,
    #[serde(default)]
    pub properties: BTreeMap<String, Expected>,
    #[serde(default)]
    pub elements: BTreeMap<ElementKey, Expected>,
}

/// Where and why a result differs from its expected shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Dotted path from the root, e.g. `properties.value.end`
    pub path: String,
    pub reason: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "{}: {}", self.path, self.reason)
        }
    }
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}.{segment}")
    }
}

fn mismatch(path: &str, reason: String) -> Result<(), Mismatch> {
    Err(Mismatch {
        path: path.to_string(),
        reason,
    })
}

impl Expected {
    /// Check `actual` against this expectation
    pub fn check(&self, actual: &ParseResult) -> Result<(), Mismatch> {
        self.check_at(actual, "")
    }

    fn check_at(&self, actual: &ParseResult, path: &str) -> Result<(), Mismatch> {
        match self {
            Expected::Tag(tag) => {
                if actual.has_type(tag) {
                    Ok(())
                } else {
                    mismatch(
                        path,
                        format!("expected a `{tag}`, found `{}` {:?}", actual.name, actual.types),
                    )
                }
            }
            Expected::Shape(shape) => shape.check_at(actual, path),
        }
    }
}

impl Shape {
    pub fn check(&self, actual: &ParseResult) -> Result<(), Mismatch> {
        self.check_at(actual, "")
    }

    fn check_at(&self, actual: &ParseResult, path: &str) -> Result<(), Mismatch> {
        if let Some(name) = &self.name {
            if *name != actual.name {
                return mismatch(
                    &join(path, "name"),
                    format!("expected `{name}`, found `{}`", actual.name),
                );
            }
        }

        for tag in self.is.iter().chain(&self.types) {
            if !actual.has_type(tag) {
                return mismatch(
                    &join(path, "types"),
                    format!("missing `{tag}` in {:?}", actual.types),
                );
            }
        }

        if let Some(kind) = &self.kind {
            if !kind.eq_ignore_ascii_case(actual.kind.label()) {
                return mismatch(
                    &join(path, "kind"),
                    format!("expected {kind}, found {}", actual.kind.label()),
                );
            }
        }

        for (field, expected, location) in [
            ("start", &self.start, &actual.start),
            ("end", &self.end, &actual.end),
        ] {
            if let Some(position) = expected {
                if !position.matches(location) {
                    return mismatch(
                        &join(path, field),
                        format!("expected {position}, found {location}"),
                    );
                }
            }
        }

        let children: Vec<&ParseResult> = actual.children().collect();
        for (index, expected) in self.children.iter().enumerate() {
            let child_path = join(path, &format!("children.{index}"));
            match children.get(index) {
                Some(child) => expected.check_at(child, &child_path)?,
                None => {
                    return mismatch(
                        &child_path,
                        format!("missing; result has {} children", children.len()),
                    )
                }
            }
        }

        for (key, expected) in &self.properties {
            let property_path = join(path, &format!("properties.{key}"));
            match actual.property(key) {
                Some(property) => expected.check_at(property, &property_path)?,
                None => return mismatch(&property_path, "missing property".to_string()),
            }
        }

        for (key, expected) in &self.elements {
            let element_path = join(path, &format!("elements.{key}"));
            let element = match key {
                ElementKey::Index(index) => actual.elements.get(*index),
                ElementKey::Name(name) => actual.property(name),
            };
            match element {
                Some(element) => expected.check_at(element, &element_path)?,
                None => return mismatch(&element_path, "missing element".to_string()),
            }
        }

        Ok(())
    }
}
