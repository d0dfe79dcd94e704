use super::Combinator;
use crate::astra::parsing::error::Defect;
use crate::astra::parsing::results::ParseResult;
use crate::astra::parsing::rule::Rule;
use crate::astra::parsing::scanner::Scanner;
use crate::astra::parsing::token::Defaults;

/// A rule that may be absent
///
/// A `Match` or an `Ignore` of the inner rule comes back unchanged; a failure
/// becomes a zero-width `Ignore`.
pub struct Optional {
    rule: Rule,
}

impl Optional {
    pub fn new(rule: impl Into<Rule>) -> Self {
        Optional { rule: rule.into() }
    }
}

impl Combinator for Optional {
    fn defaults(&self) -> Defaults {
        Defaults::new("optional")
    }

    fn label(&self) -> &'static str {
        "optional"
    }

    fn scan(&self, s: &mut Scanner<'_>) -> Result<ParseResult, Defect> {
        s.token.borrow_mut().transparent = true;
        let result = s.parse(&self.rule, &s.cursor)?;
        if result.is_success() {
            s.log(&["OPTIONAL", "MATCH"], format_args!("{}", result.end.index));
            return Ok(result);
        }
        // a field passes through as an Ignore over its value
        if result.is_ignored() {
            s.log(&["OPTIONAL", "PASS"], format_args!("{}", result.end.index));
            return Ok(result);
        }

        s.log(&["OPTIONAL", "IGNORE"], format_args!("{}", result.kind.label()));
        Ok(s.ignore(None))
    }
}
