//! Named fields
//!
//! A field parses its value under the token that encloses the field and binds
//! the result there as a named property. Wrappers that hand back an inner
//! result (optional, choice) are looked through, since their own token is
//! dropped. The field itself comes back as an
//! `Ignore` spanning the value, so an enclosing sequence moves past the value
//! without adding a positional child.

use super::Combinator;
use crate::astra::parsing::error::Defect;
use crate::astra::parsing::results::ParseResult;
use crate::astra::parsing::rule::Rule;
use crate::astra::parsing::scanner::Scanner;
use crate::astra::parsing::token::{Defaults, Token};

pub struct Field {
    key: String,
    value: Rule,
}

impl Field {
    pub fn new(key: &str, value: impl Into<Rule>) -> Self {
        Field {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

impl Combinator for Field {
    fn defaults(&self) -> Defaults {
        Defaults::new("field")
    }

    fn label(&self) -> &'static str {
        "field"
    }

    fn scan(&self, s: &mut Scanner<'_>) -> Result<ParseResult, Defect> {
        let parent = Token::holder(s.token.borrow().parent.clone());
        s.log(&["FIELD", self.key.as_str(), "START"], format_args!("{}", s.index()));

        let result = s.parse_under(&self.value, &s.cursor, parent.clone())?;
        if result.is_error() {
            s.log(&["FIELD", self.key.as_str(), "FAIL"], format_args!("{}", result.kind.label()));
            return Ok(s.fail_with(result));
        }

        let end = result.end;
        s.log(&["FIELD", self.key.as_str(), "MATCH"], format_args!("-> {}", end.index));
        match parent {
            Some(parent) => {
                parent.borrow_mut().set_property(self.key.as_str(), result);
                Ok(s.ignore(Some(end)))
            }
            // top level: nothing encloses the field, so it keeps the value itself
            None => {
                s.token.borrow_mut().set_property(self.key.as_str(), result);
                Ok(s.matched(end))
            }
        }
    }
}
