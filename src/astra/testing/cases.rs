//! Case tables
//!
//! A table names the entry symbol and lists cases. Each case has one `input` or
//! several `inputs` (variants expected to parse to the same shape).
//!
//! ```yaml
//! entry: named-entry
//! cases:
//!   - name: Mutable Text
//!     input: "key: value"
//!     expected:
//!       name: named-entry
//!       end: 10
//! ```

use super::shape::Expected;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const NAMED_ENTRY_CASES: &str = include_str!("../../../cases/named-entry.yaml");

#[derive(Debug, Error)]
pub enum CaseError {
    #[error("failed to read case table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid case table: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("case `{0}` has neither `input` nor `inputs`")]
    NoInput(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Case {
    pub name: String,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub inputs: Vec<String>,
    pub expected: Expected,
}

impl Case {
    /// Every input variant, `input` first
    pub fn variants(&self) -> impl Iterator<Item = &str> {
        self.input
            .iter()
            .chain(&self.inputs)
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseTable {
    /// Name of the symbol every input is parsed with
    pub entry: String,
    pub cases: Vec<Case>,
}

impl CaseTable {
    pub fn from_yaml(text: &str) -> Result<Self, CaseError> {
        let table: CaseTable = serde_yaml::from_str(text)?;
        if let Some(case) = table.cases.iter().find(|case| case.variants().next().is_none()) {
            return Err(CaseError::NoInput(case.name.clone()));
        }
        Ok(table)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CaseError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| CaseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }
}

/// Case tables shipped with the standard grammar
pub fn builtin_tables() -> Result<Vec<CaseTable>, CaseError> {
    Ok(vec![CaseTable::from_yaml(NAMED_ENTRY_CASES)?])
}
