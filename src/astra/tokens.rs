//! Grammar symbols
//!
//! The indentation tokens are part of the engine: they are the only rules that
//! read a cursor's indent levels. The rest is a small key/value grammar that
//! exercises every combinator:
//!
//! ```text
//! named-entry
//!   - key: name
//!   - ?(indent-increase | indent-current)
//!   - operator: assigner          (splayed: mutable-field-assigner)
//!   - ?(indent-increase | indent-current)
//!   - value: value                (splayed: number, text)
//! ```

pub mod assigner;
pub mod indents;
pub mod name;
pub mod named_entry;
pub mod value;

pub use assigner::{Assigner, MutableFieldAssigner};
pub use indents::{CurrentIndent, DecreaseIndent, IncreaseIndent, Indent};
pub use name::Name;
pub use named_entry::NamedEntry;
pub use value::{Number, Text, Value};

use crate::astra::diagnostics::DiagnosticSink;
use crate::astra::parsing::grammar::{Grammar, GrammarBuilder};

/// Every built-in symbol, in bootstrap order
pub fn standard_builder() -> GrammarBuilder {
    Grammar::builder()
        .symbol::<Indent>()
        .symbol::<IncreaseIndent>()
        .symbol::<DecreaseIndent>()
        .symbol::<CurrentIndent>()
        .symbol::<Name>()
        .symbol::<Assigner>()
        .symbol::<MutableFieldAssigner>()
        .symbol::<Value>()
        .symbol::<Number>()
        .symbol::<Text>()
        .symbol::<NamedEntry>()
}

impl Grammar {
    /// The built-in grammar, reporting to the default log sink
    pub fn standard() -> Grammar {
        standard_builder().build()
    }

    pub fn standard_with(sink: impl DiagnosticSink + 'static) -> Grammar {
        standard_builder().sink(sink).build()
    }
}
