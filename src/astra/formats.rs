//! Renderings of a parse result
//!
//! - [`json`]: the data form, also used by `Display` for results
//! - [`treeviz`]: one line per node, for reading trees in a terminal

pub mod json;
pub mod treeviz;

use crate::astra::parsing::results::ParseResult;
use serde::Deserialize;
use std::str::FromStr;

/// Output formats known to the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    Treeviz,
    Json,
}

impl Format {
    pub fn render(self, result: &ParseResult, show_locations: bool) -> String {
        match self {
            Format::Treeviz => treeviz::to_treeviz(result, show_locations),
            Format::Json => json::to_json(result, true),
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "treeviz" => Ok(Format::Treeviz),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown format: {other} (expected treeviz or json)")),
        }
    }
}
