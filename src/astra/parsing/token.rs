//! In-progress output tokens
//!
//! Every rule attempt gets a [`Token`]: the node it is building, seeded from the
//! symbol's [`Defaults`]. Combinators append positional children to it and
//! [`field`](crate::astra::parsing::combinators::field) binds named properties on
//! it through the child's parent link, so tokens are shared behind a
//! [`TokenHandle`].

use crate::astra::parsing::location::Location;
use crate::astra::parsing::results::{Elements, ParseResult};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub type TokenHandle = Rc<RefCell<Token>>;

/// The template a grammar symbol stamps onto each token it produces
#[derive(Debug, Clone, Default)]
pub struct Defaults {
    pub name: String,
    pub types: Vec<String>,
    pub elements: Elements,
}

impl Defaults {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Type tags with the name first, then the declared tags, without repeats
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::with_capacity(self.types.len() + 1);
        for tag in std::iter::once(&self.name).chain(&self.types) {
            if !tag.is_empty() && !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        tags
    }
}

/// A node under construction
pub struct Token {
    pub name: String,
    pub types: Vec<String>,
    pub start: Location,
    pub end: Option<Location>,
    pub parent: Option<TokenHandle>,
    pub elements: Elements,
    /// Set by wrappers that hand back an inner result in place of their own
    pub transparent: bool,
}

impl Token {
    pub fn new(defaults: &Defaults, start: Location, parent: Option<TokenHandle>) -> Self {
        Token {
            name: defaults.name.clone(),
            types: defaults.tags(),
            start,
            end: None,
            parent,
            elements: defaults.elements.clone(),
            transparent: false,
        }
    }

    /// A token for a rule with no symbol behind it
    pub fn anonymous(start: Location, parent: Option<TokenHandle>) -> Self {
        Token::new(&Defaults::default(), start, parent)
    }

    pub fn into_handle(self) -> TokenHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn parent_name(&self) -> Option<String> {
        self.parent.as_ref().map(|parent| parent.borrow().name.clone())
    }

    /// The nearest token at or above `handle` whose elements end up in a result
    pub fn holder(handle: Option<TokenHandle>) -> Option<TokenHandle> {
        let mut current = handle;
        while let Some(token) = current {
            if !token.borrow().transparent {
                return Some(token);
            }
            current = token.borrow().parent.clone();
        }
        None
    }

    pub fn push_child(&mut self, child: ParseResult) {
        self.elements.push(child);
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: ParseResult) {
        self.elements.set(name, value);
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("name", &self.name)
            .field("types", &self.types)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("parent", &self.parent_name())
            .field("elements", &self.elements.len())
            .field("transparent", &self.transparent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_put_the_name_first() {
        let defaults = Defaults::new("indent-increase").types(["whitespace", "indent"]);
        assert_eq!(
            defaults.tags(),
            vec!["indent-increase", "whitespace", "indent"]
        );
    }

    #[test]
    fn tags_skip_repeats_and_blanks() {
        let defaults = Defaults::new("text").types(["text", "value", ""]);
        assert_eq!(defaults.tags(), vec!["text", "value"]);
        assert!(Defaults::default().tags().is_empty());
    }

    #[test]
    fn parent_name_follows_the_link() {
        let parent = Token::new(&Defaults::new("named-entry"), Location::default(), None)
            .into_handle();
        let child = Token::anonymous(Location::default(), Some(parent));
        assert_eq!(child.parent_name().as_deref(), Some("named-entry"));
    }

    #[test]
    fn holder_skips_transparent_tokens() {
        let entry = Token::new(&Defaults::new("named-entry"), Location::default(), None)
            .into_handle();
        let wrapper = Token::new(&Defaults::new("optional"), Location::default(), Some(entry))
            .into_handle();
        wrapper.borrow_mut().transparent = true;

        let holder = Token::holder(Some(Rc::clone(&wrapper))).unwrap();
        assert_eq!(holder.borrow().name, "named-entry");

        let orphan = Token::anonymous(Location::default(), None).into_handle();
        orphan.borrow_mut().transparent = true;
        assert!(Token::holder(Some(orphan)).is_none());
        assert!(Token::holder(None).is_none());
    }
}
