//! Diagnostic sinks
//!
//! The engine reports what it is doing (rule attempts, combinator phases, grammar
//! bootstrap) to a write-only [`DiagnosticSink`], keyed by nested string tags such
//! as `PARSER/named-entry/MATCH`. Nothing is ever read back, so parsing behaves the
//! same with any sink, including [`NullSink`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A write-only, tag-keyed structured log
pub trait DiagnosticSink {
    /// Whether records are kept at all; callers may skip formatting work when not
    fn is_enabled(&self) -> bool;

    /// Record one message under a nested tag path
    fn record(&self, tags: &[&str], message: fmt::Arguments<'_>);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Rc<S> {
    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }

    fn record(&self, tags: &[&str], message: fmt::Arguments<'_>) {
        (**self).record(tags, message)
    }
}

/// Every target [`LogSink`] writes to
const TARGETS: [&str; 4] = ["astra::PARSER", "astra::GRAMMAR", "astra::CURSOR", "astra"];

/// The log target for a tag path: `astra::<first tag>` for the known areas
pub fn target_for(tags: &[&str]) -> &'static str {
    match tags.first() {
        Some(&"GRAMMAR") => "astra::GRAMMAR",
        Some(&"PARSER") => "astra::PARSER",
        Some(&"CURSOR") => "astra::CURSOR",
        _ => "astra",
    }
}

/// Forwards records to the `log` facade at trace level
///
/// The log target comes from [`target_for`], so `RUST_LOG=astra::PARSER=trace`
/// narrows output to rule attempts.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn is_enabled(&self) -> bool {
        TARGETS
            .iter()
            .any(|&target| log::log_enabled!(target: target, log::Level::Trace))
    }

    fn record(&self, tags: &[&str], message: fmt::Arguments<'_>) {
        log::trace!(target: target_for(tags), "[{}] {}", tags.join("/"), message);
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn is_enabled(&self) -> bool {
        false
    }

    fn record(&self, _tags: &[&str], _message: fmt::Arguments<'_>) {}
}

/// Keeps every record in memory as `TAG/TAG: message` lines
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: RefCell<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Recorded lines whose tag path starts with `prefix`
    pub fn lines_under(&self, prefix: &str) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter(|line| line.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }
}

impl DiagnosticSink for MemorySink {
    fn is_enabled(&self) -> bool {
        true
    }

    fn record(&self, tags: &[&str], message: fmt::Arguments<'_>) {
        self.lines
            .borrow_mut()
            .push(format!("{}: {}", tags.join("/"), message));
    }
}
