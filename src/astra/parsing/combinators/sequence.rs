//! Sequence
//!
//! Elements run in order, each from where the previous one ended. The first
//! failing element fails the whole sequence. Ignored elements move the cursor
//! but leave no child behind.

use super::Combinator;
use crate::astra::parsing::error::Defect;
use crate::astra::parsing::results::ParseResult;
use crate::astra::parsing::rule::Rule;
use crate::astra::parsing::scanner::Scanner;
use crate::astra::parsing::token::Defaults;

pub struct Sequence {
    rules: Vec<Rule>,
}

impl Sequence {
    pub fn new<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = Rule>,
    {
        Sequence {
            rules: rules.into_iter().collect(),
        }
    }
}

impl Combinator for Sequence {
    fn defaults(&self) -> Defaults {
        Defaults::new("seq")
    }

    fn label(&self) -> &'static str {
        "seq"
    }

    fn scan(&self, s: &mut Scanner<'_>) -> Result<ParseResult, Defect> {
        s.log(&["SEQ", "START"], format_args!("{} rules", self.rules.len()));
        let mut cursor = s.cursor.clone();

        for (index, rule) in self.rules.iter().enumerate() {
            let result = s.parse(rule, &cursor)?;

            if result.is_error() {
                s.log(&["SEQ", "FAIL"], format_args!("#{index} {}", result.kind.label()));
                return Ok(s.fail_with(result));
            }

            cursor = cursor.at_location(&result.end)?;
            if result.is_ignored() {
                s.log(&["SEQ", "IGNORE"], format_args!("#{index}"));
                continue;
            }

            s.log(&["SEQ", "MATCH"], format_args!("#{index} -> {}", result.end.index));
            s.token.borrow_mut().push_child(result);
        }

        s.log(&["SEQ", "MATCH"], format_args!("{}", cursor.index()));
        Ok(s.matched(&cursor))
    }
}
