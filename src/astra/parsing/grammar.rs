//! Grammar symbols and the registry that owns them
//!
//! A grammar is a set of [`Symbol`]s: named productions with a token template.
//! The [`Grammar`] holds exactly one instance of each symbol, keyed by its Rust
//! type through [`SymbolId`], and memoizes each symbol's normalized rule.
//!
//! ## Splayed symbols
//!
//! A symbol whose [`Symbol::splays`] names a parent becomes one more alternative
//! of that parent. The parent's rule is usually [`Splayed`], a choice that reads
//! its options from this registry when it runs, so new alternatives attach
//! without touching the parent. Splayed children also inherit the parent's type
//! tags.
//!
//! ## Bootstrap
//!
//! [`GrammarBuilder::build`] registers every listed symbol in order. A symbol that
//! fails to register is logged and skipped; the others are unaffected. Symbols
//! that are referenced but never listed are registered on first use.
//!
//! [`Splayed`]: crate::astra::parsing::combinators::Splayed

use crate::astra::diagnostics::{DiagnosticSink, LogSink};
use crate::astra::parsing::cursor::Cursor;
use crate::astra::parsing::error::{Defect, GrammarError};
use crate::astra::parsing::results::ParseResult;
use crate::astra::parsing::rule::{normalize, NormalizedRule, Rule};
use crate::astra::parsing::token::{Defaults, TokenHandle};
use crate::astra::parsing::{Context, Source};
use once_cell::unsync::OnceCell;
use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// A named grammar production
pub trait Symbol {
    /// Name, type tags and initial elements of every token this symbol builds
    fn defaults(&self) -> Defaults;

    fn rule(&self) -> Rule;

    /// The splayed symbol this one is an alternative of
    fn splays(&self) -> Option<SymbolId> {
        None
    }

    /// Recovery functions offered to any choice this symbol is an option of
    fn catchers(&self) -> Vec<Catcher> {
        Vec::new()
    }
}

/// Stable identity of a symbol type, able to instantiate it
#[derive(Clone, Copy)]
pub struct SymbolId {
    type_id: TypeId,
    type_name: &'static str,
    create: fn() -> Box<dyn Symbol>,
}

impl SymbolId {
    pub fn of<S: Symbol + Default + 'static>() -> Self {
        fn create<S: Symbol + Default + 'static>() -> Box<dyn Symbol> {
            Box::new(S::default())
        }

        SymbolId {
            type_id: TypeId::of::<S>(),
            type_name: std::any::type_name::<S>(),
            create: create::<S>,
        }
    }

    /// The Rust type name, for diagnostics about symbols that never registered
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn rule(self) -> Rule {
        Rule::Symbol(self)
    }
}

impl PartialEq for SymbolId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for SymbolId {}

impl Hash for SymbolId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name.rsplit("::").next().unwrap_or(self.type_name))
    }
}

pub type CatchFn = Rc<dyn Fn(&Cursor, Option<&TokenHandle>) -> Result<ParseResult, Defect>>;

/// Fallback tried when the `target` option of a choice fails outright
///
/// It gets the raw cursor of the failed attempt and the in-progress token of
/// whatever the choice is parsing into.
#[derive(Clone)]
pub struct Catcher {
    pub target: SymbolId,
    pub catch: CatchFn,
}

impl Catcher {
    pub fn new<F>(target: SymbolId, catch: F) -> Self
    where
        F: Fn(&Cursor, Option<&TokenHandle>) -> Result<ParseResult, Defect> + 'static,
    {
        Catcher {
            target,
            catch: Rc::new(catch),
        }
    }
}

impl fmt::Debug for Catcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catcher").field("target", &self.target).finish()
    }
}

struct Entry {
    symbol: Box<dyn Symbol>,
    defaults: Defaults,
    parent: Option<SymbolId>,
    catchers: Vec<Catcher>,
    normalized: OnceCell<NormalizedRule>,
}

/// Summary of one registered symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    pub name: String,
    pub types: Vec<String>,
    pub splays: Option<String>,
    pub alternatives: Vec<String>,
}

/// The symbol registry every parse runs against
pub struct Grammar {
    entries: RefCell<HashMap<SymbolId, Rc<Entry>>>,
    order: RefCell<Vec<SymbolId>>,
    alternatives: RefCell<HashMap<SymbolId, Vec<SymbolId>>>,
    errors: RefCell<Vec<GrammarError>>,
    sink: Rc<dyn DiagnosticSink>,
}

impl Grammar {
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::default()
    }

    pub fn sink(&self) -> &dyn DiagnosticSink {
        self.sink.as_ref()
    }

    /// The sink itself, for cursors created on this grammar's behalf
    pub fn shared_sink(&self) -> Rc<dyn DiagnosticSink> {
        Rc::clone(&self.sink)
    }

    fn trace(&self, tags: &[&str], message: fmt::Arguments<'_>) {
        if self.sink.is_enabled() {
            self.sink.record(tags, message);
        }
    }

    /// Registration failures collected so far
    pub fn errors(&self) -> Vec<GrammarError> {
        self.errors.borrow().clone()
    }

    pub fn contains(&self, id: SymbolId) -> bool {
        self.entries.borrow().contains_key(&id)
    }

    /// Registered symbols in registration order
    pub fn symbols(&self) -> Vec<SymbolId> {
        self.order.borrow().clone()
    }

    pub fn symbol_named(&self, name: &str) -> Option<SymbolId> {
        let entries = self.entries.borrow();
        self.order
            .borrow()
            .iter()
            .copied()
            .find(|id| entries.get(id).is_some_and(|entry| entry.defaults.name == name))
    }

    /// Declared name of a symbol, falling back to its type name
    pub fn name_of(&self, id: SymbolId) -> String {
        match self.entries.borrow().get(&id) {
            Some(entry) => entry.defaults.name.clone(),
            None => format!("{id:?}"),
        }
    }

    /// Token template of a symbol, with inherited type tags
    pub fn defaults_of(&self, id: SymbolId) -> Result<Defaults, Defect> {
        Ok(self.entry(id)?.defaults.clone())
    }

    pub fn info(&self, id: SymbolId) -> Option<SymbolInfo> {
        let entry = self.entries.borrow().get(&id).cloned()?;
        Some(SymbolInfo {
            name: entry.defaults.name.clone(),
            types: entry.defaults.tags(),
            splays: entry.parent.map(|parent| self.name_of(parent)),
            alternatives: self
                .alternatives_of(id)
                .into_iter()
                .map(|alternative| self.name_of(alternative))
                .collect(),
        })
    }

    pub fn add_alternative(&self, root: SymbolId, alternative: SymbolId) {
        let mut alternatives = self.alternatives.borrow_mut();
        let options = alternatives.entry(root).or_default();
        if !options.contains(&alternative) {
            options.push(alternative);
        }
    }

    /// Options of a splayed symbol in registration order
    pub fn alternatives_of(&self, root: SymbolId) -> Vec<SymbolId> {
        self.alternatives
            .borrow()
            .get(&root)
            .cloned()
            .unwrap_or_default()
    }

    pub fn catchers_of(&self, id: SymbolId) -> Vec<Catcher> {
        self.entries
            .borrow()
            .get(&id)
            .map(|entry| entry.catchers.clone())
            .unwrap_or_default()
    }

    /// The symbol's rule, normalized once and reused
    pub fn normalized(&self, id: SymbolId) -> Result<NormalizedRule, Defect> {
        let entry = self.entry(id)?;
        let normalized = entry
            .normalized
            .get_or_init(|| normalize(&entry.symbol.rule()));
        Ok(Rc::clone(normalized))
    }

    fn entry(&self, id: SymbolId) -> Result<Rc<Entry>, Defect> {
        if let Some(entry) = self.entries.borrow().get(&id) {
            return Ok(Rc::clone(entry));
        }

        self.register(id).map_err(|error| {
            log::warn!("could not register grammar symbol {id:?}: {error}");
            Defect::UnknownSymbol(format!("{id:?}"))
        })?;
        self.entries
            .borrow()
            .get(&id)
            .cloned()
            .ok_or_else(|| Defect::UnknownSymbol(format!("{id:?}")))
    }

    /// Instantiate and register one symbol, and its splayed parent first
    pub fn register(&self, id: SymbolId) -> Result<(), GrammarError> {
        if self.contains(id) {
            return Ok(());
        }

        let (symbol, mut defaults) = construct(id)?;
        let name = defaults.name.clone();
        if name.is_empty() {
            return Err(GrammarError::MissingName);
        }
        self.trace(&["GRAMMAR", "INIT", "TOKENS", name.as_str()], format_args!("START"));

        if let Some(existing) = self.symbol_named(&name) {
            if existing != id {
                return Err(GrammarError::Duplicate(name));
            }
        }

        let parent = symbol.splays();
        if let Some(parent) = parent {
            let unknown = || GrammarError::UnknownParent {
                child: name.clone(),
                parent: format!("{parent:?}"),
            };
            if parent == id {
                return Err(unknown());
            }
            self.register(parent).map_err(|_| unknown())?;

            let inherited = self.entries.borrow().get(&parent).map(|p| p.defaults.tags());
            let mut tags = defaults.tags();
            for tag in inherited.into_iter().flatten() {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
            defaults.types = tags.into_iter().filter(|tag| *tag != name).collect();

            self.add_alternative(parent, id);
            self.trace(
                &["GRAMMAR", "INIT", "TOKENS", name.as_str(), "SPLAYED", "CHILD"],
                format_args!("{name} -splays-> {}", self.name_of(parent)),
            );
        }

        let catchers = symbol.catchers();
        let entry = Entry {
            symbol,
            defaults,
            parent,
            catchers,
            normalized: OnceCell::new(),
        };
        self.entries.borrow_mut().insert(id, Rc::new(entry));
        self.order.borrow_mut().push(id);
        self.trace(&["GRAMMAR", "INIT", "TOKENS", name.as_str()], format_args!("REGISTERED"));
        Ok(())
    }

    /// Parse `text` from its start with the entry symbol `S`
    pub fn parse<S: Symbol + Default + 'static>(&self, text: &str) -> Result<ParseResult, Defect> {
        self.parse_rule(&SymbolId::of::<S>().rule(), Source::from(text))
    }

    pub fn parse_rule<'s>(
        &self,
        rule: &Rule,
        source: impl Into<Source<'s>>,
    ) -> Result<ParseResult, Defect> {
        crate::astra::parsing::parse(self, rule, source, Context::default())
    }

    pub fn parse_with<'s>(
        &self,
        rule: &Rule,
        source: impl Into<Source<'s>>,
        context: Context,
    ) -> Result<ParseResult, Defect> {
        crate::astra::parsing::parse(self, rule, source, context)
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.borrow();
        let names: Vec<&str> = self
            .order
            .borrow()
            .iter()
            .filter_map(|id| entries.get(id))
            .map(|entry| entry.defaults.name.as_str())
            .collect();
        f.debug_struct("Grammar").field("symbols", &names).finish()
    }
}

/// Instantiate a symbol and read its template, turning a panic into an error
fn construct(id: SymbolId) -> Result<(Box<dyn Symbol>, Defaults), GrammarError> {
    panic::catch_unwind(AssertUnwindSafe(|| {
        let symbol = (id.create)();
        let defaults = symbol.defaults();
        (symbol, defaults)
    }))
    .map_err(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|reason| reason.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panicked".to_string());
        GrammarError::Construction(format!("{}: {reason}", id.type_name()))
    })
}

/// Lists the symbols of a grammar and bootstraps them in order
#[derive(Default)]
pub struct GrammarBuilder {
    symbols: Vec<SymbolId>,
    sink: Option<Rc<dyn DiagnosticSink>>,
}

impl GrammarBuilder {
    pub fn symbol<S: Symbol + Default + 'static>(self) -> Self {
        self.with(SymbolId::of::<S>())
    }

    pub fn with(mut self, id: SymbolId) -> Self {
        self.symbols.push(id);
        self
    }

    pub fn sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Some(Rc::new(sink));
        self
    }

    pub fn build(self) -> Grammar {
        let grammar = Grammar {
            entries: RefCell::new(HashMap::new()),
            order: RefCell::new(Vec::new()),
            alternatives: RefCell::new(HashMap::new()),
            errors: RefCell::new(Vec::new()),
            sink: self.sink.unwrap_or_else(|| Rc::new(LogSink)),
        };

        grammar.trace(&["GRAMMAR", "INIT"], format_args!("{} symbols", self.symbols.len()));
        for id in self.symbols {
            if let Err(error) = grammar.register(id) {
                log::warn!("skipping grammar symbol {id:?}: {error}");
                grammar.trace(&["GRAMMAR", "INIT", "ERROR"], format_args!("{id:?}: {error}"));
                grammar.errors.borrow_mut().push(error);
            }
        }
        grammar.trace(&["GRAMMAR", "INIT"], format_args!("DONE"));
        grammar
    }
}
