//! Fatal engine errors
//!
//! Bad input never shows up here: it is reported through the result tree
//! (`Error`, `NoMatch`, `Unexpected`). A [`Defect`] means the grammar or the engine
//! itself is inconsistent, and aborts the whole parse.

use thiserror::Error;

/// An invariant violation that aborts a parse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Defect {
    /// A seek or slice targeted a position the source does not have
    #[error("no cursor exists at index {index} (source length {length})")]
    IndexOutOfRange { index: usize, length: usize },

    /// The predecessor of the first cursor of a chain was requested
    #[error("cursor {index} has no predecessor; chains only originate at index 0")]
    MissingPredecessor { index: usize },

    /// The indentation tracker claimed to match a level it had already outgrown
    #[error(
        "line {line}: indent level {level} grew past the previous line while still matching it"
    )]
    IndentationOverrun { line: usize, level: usize },

    /// A rule referenced a grammar symbol that could not be instantiated
    #[error("unknown grammar symbol: {0}")]
    UnknownSymbol(String),
}

/// A grammar symbol that could not be registered during bootstrap
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("grammar symbol is missing a name")]
    MissingName,

    #[error("grammar symbol `{0}` is already registered")]
    Duplicate(String),

    #[error("grammar symbol `{child}` splays into `{parent}`, which is not a registered symbol")]
    UnknownParent { child: String, parent: String },

    #[error("grammar symbol could not be constructed: {0}")]
    Construction(String),
}
