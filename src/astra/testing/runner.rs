//! Runs case tables against a grammar

use super::cases::CaseTable;
use super::shape::Mismatch;
use crate::astra::parsing::error::Defect;
use crate::astra::parsing::grammar::Grammar;
use crate::astra::parsing::results::ParseResult;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Run at most this many cases (all variants of a case count once)
    pub limit: Option<usize>,
    /// Stop at the first variant whose parse aborted with a defect
    pub stop_on_defect: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Passed,
    Mismatch(Mismatch),
    Defect(Defect),
}

/// The outcome of one input variant of one case
#[derive(Debug, Clone, PartialEq)]
pub struct CaseReport {
    pub case: String,
    pub variant: usize,
    pub input: String,
    pub outcome: Outcome,
    pub actual: Option<ParseResult>,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, Outcome::Passed)
    }
}

impl fmt::Display for CaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Passed => write!(f, "ok    {} #{}", self.case, self.variant),
            Outcome::Mismatch(mismatch) => {
                write!(f, "FAIL  {} #{}: {}", self.case, self.variant, mismatch)
            }
            Outcome::Defect(defect) => {
                write!(f, "ERROR {} #{}: {}", self.case, self.variant, defect)
            }
        }
    }
}

/// Parse every variant of every case with the table's entry symbol
///
/// Fails only when the entry symbol is not part of the grammar; everything that
/// goes wrong with a single input ends up in its report.
pub fn run_table(
    grammar: &Grammar,
    table: &CaseTable,
    options: &RunOptions,
) -> Result<Vec<CaseReport>, Defect> {
    let entry = grammar
        .symbol_named(&table.entry)
        .ok_or_else(|| Defect::UnknownSymbol(table.entry.clone()))?;
    let rule = entry.rule();
    let limit = options.limit.unwrap_or(usize::MAX);

    log::debug!("running {} case(s) for {}", table.cases.len(), table.entry);
    let mut reports = Vec::new();
    for case in table.cases.iter().take(limit) {
        for (variant, input) in case.variants().enumerate() {
            let (outcome, actual) = match grammar.parse_rule(&rule, input) {
                Ok(result) => {
                    let outcome = match case.expected.check(&result) {
                        Ok(()) => Outcome::Passed,
                        Err(mismatch) => Outcome::Mismatch(mismatch),
                    };
                    (outcome, Some(result))
                }
                Err(defect) => (Outcome::Defect(defect), None),
            };

            let report = CaseReport {
                case: case.name.clone(),
                variant,
                input: input.to_string(),
                outcome,
                actual,
            };
            log::debug!("{report}");

            let stop = options.stop_on_defect && matches!(report.outcome, Outcome::Defect(_));
            reports.push(report);
            if stop {
                log::warn!("stopping {} after a defect in `{}`", table.entry, case.name);
                return Ok(reports);
            }
        }
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astra::testing::cases::builtin_tables;

    fn table(yaml: &str) -> CaseTable {
        CaseTable::from_yaml(yaml).unwrap()
    }

    #[test]
    fn builtin_named_entry_cases_pass() {
        let grammar = Grammar::standard();
        for table in builtin_tables().unwrap() {
            let reports = run_table(&grammar, &table, &RunOptions::default()).unwrap();
            assert_eq!(reports.len(), 5);
            for report in &reports {
                assert!(report.passed(), "{report}");
            }
        }
    }

    #[test]
    fn every_variant_gets_a_report() {
        let table = table(
            r#"
            entry: name
            cases:
              - name: names
                inputs: ["key", "@handle", ":nope"]
                expected: { kind: match }
            "#,
        );
        let reports = run_table(&Grammar::standard(), &table, &RunOptions::default()).unwrap();
        let passed: Vec<bool> = reports.iter().map(CaseReport::passed).collect();
        assert_eq!(passed, vec![true, true, false]);
        assert_eq!(reports[2].variant, 2);
        assert!(reports[2].to_string().starts_with("FAIL  names #2: kind: expected match"));
    }

    #[test]
    fn limit_counts_cases() {
        let table = table(
            r#"
            entry: name
            cases:
              - { name: one, inputs: [a, b], expected: name }
              - { name: two, input: c, expected: name }
            "#,
        );
        let options = RunOptions {
            limit: Some(1),
            ..RunOptions::default()
        };
        let reports = run_table(&Grammar::standard(), &table, &options).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|report| report.case == "one"));
    }

    #[test]
    fn unknown_entry_symbols_are_defects() {
        let table = table("{ entry: missing, cases: [] }");
        assert_eq!(
            run_table(&Grammar::standard(), &table, &RunOptions::default()),
            Err(Defect::UnknownSymbol("missing".to_string()))
        );
    }
}
