use super::choice::choose;
use super::Combinator;
use crate::astra::parsing::error::Defect;
use crate::astra::parsing::grammar::SymbolId;
use crate::astra::parsing::results::ParseResult;
use crate::astra::parsing::rule::Rule;
use crate::astra::parsing::scanner::Scanner;
use crate::astra::parsing::token::Defaults;

/// A choice over whatever alternatives have registered under `root`
///
/// The option list is read from the grammar each time the rule runs.
pub struct Splayed {
    root: SymbolId,
}

impl Splayed {
    pub fn new(root: SymbolId) -> Self {
        Splayed { root }
    }
}

impl Combinator for Splayed {
    fn defaults(&self) -> Defaults {
        Defaults::new("splayed")
    }

    fn label(&self) -> &'static str {
        "splayed"
    }

    fn scan(&self, s: &mut Scanner<'_>) -> Result<ParseResult, Defect> {
        let options: Vec<Rule> = s
            .grammar
            .alternatives_of(self.root)
            .into_iter()
            .map(Rule::Symbol)
            .collect();
        choose(s, &options, "SPLAY")
    }
}
