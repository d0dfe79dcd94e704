//! Conformance harness
//!
//! Grammar behavior is pinned down by case tables rather than by hand-written
//! assertions: each case lists input variants and the [`Shape`] they must
//! parse to. Tables are YAML files (see `cases/`), loaded with
//! [`CaseTable::load`] and run with [`run_table`].
//!
//! ```rust-example
//! let grammar = Grammar::standard();
//! for table in builtin_tables()? {
//!     for report in run_table(&grammar, &table, &RunOptions::default())? {
//!         assert!(report.passed(), "{report}");
//!     }
//! }
//! ```

pub mod cases;
pub mod runner;
pub mod shape;

pub use cases::{builtin_tables, Case, CaseError, CaseTable};
pub use runner::{run_table, CaseReport, Outcome, RunOptions};
pub use shape::{ElementKey, Expected, Mismatch, Position, Shape};
