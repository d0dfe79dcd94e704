//! Combinators
//!
//! Higher-order rules built at the call site from other rules. Each one is a
//! [`Combinator`]: it has a token template like a grammar symbol, so it is logged
//! and stamped like one, but it is never registered or shared.
//!
//! | combinator | succeeds with |
//! |---|---|
//! | [`Sequence`] | `Match` over every element, children appended in order |
//! | [`Choice`]   | the first option that matches |
//! | [`Optional`] | the inner match, or `Ignore` |
//! | [`Field`]    | `Ignore`, after binding the value on the parent token |
//! | [`Splayed`]  | the first registered alternative that matches |

pub mod choice;
pub mod field;
pub mod optional;
pub mod sequence;
pub mod splayed;

pub use choice::Choice;
pub use field::Field;
pub use optional::Optional;
pub use sequence::Sequence;
pub use splayed::Splayed;

use crate::astra::parsing::error::Defect;
use crate::astra::parsing::results::ParseResult;
use crate::astra::parsing::scanner::Scanner;
use crate::astra::parsing::token::Defaults;

pub trait Combinator {
    fn defaults(&self) -> Defaults;

    /// Short name used in logs and rule descriptions
    fn label(&self) -> &'static str;

    fn scan(&self, s: &mut Scanner<'_>) -> Result<ParseResult, Defect>;
}
