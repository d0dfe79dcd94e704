//! # astra-parser
//!
//! A recursive-descent parsing engine for indentation-sensitive text, built from
//! reusable grammar combinators instead of a generated parser.
//!
//! ## Testing
//!
//! The [conformance harness](astra::testing) drives case tables through a grammar
//! symbol and compares the resulting trees against expected shapes.

pub mod astra;
