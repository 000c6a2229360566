//! API coverage audit
//!
//! Checks which functions of the wrapped library's documented API are
//! mentioned in the wrapper headers. A function counts as covered when its
//! name appears in the corpus flanked by non-identifier characters, so
//! `uv_run` is not covered by a mention of `uv_run_mode`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("Failed to parse API catalog: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("Invalid symbol pattern for '{symbol}': {source}")]
    Pattern {
        symbol: String,
        #[source]
        source: regex::Error,
    },
}

/// One documentation section and the functions it documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSection {
    pub name: String,

    #[serde(default)]
    pub functions: Vec<String>,
}

/// Cached list of documented functions, grouped by section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCatalog {
    #[serde(default)]
    pub sections: Vec<ApiSection>,
}

impl ApiCatalog {
    /// Parses the catalog cache format: `{"sections": [{"name", "functions"}]}`
    pub fn from_json(json: &str) -> Result<Self, CoverageError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Total number of functions across sections
    pub fn function_count(&self) -> usize {
        self.sections.iter().map(|s| s.functions.len()).sum()
    }
}

/// Whole-number percentage, rounded down; empty totals count as complete
fn percent(covered: usize, total: usize) -> u32 {
    if total == 0 {
        100
    } else {
        (covered * 100 / total) as u32
    }
}

/// Coverage of one section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionCoverage {
    pub name: String,
    pub total: usize,
    pub covered: usize,
    pub missing: Vec<String>,
}

impl SectionCoverage {
    pub fn percent(&self) -> u32 {
        percent(self.covered, self.total)
    }

    pub fn is_complete(&self) -> bool {
        self.covered == self.total
    }
}

/// Coverage of the whole catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub sections: Vec<SectionCoverage>,
    pub total: usize,
    pub covered: usize,
}

impl CoverageReport {
    /// Checks every catalog function against `corpus`
    pub fn compute(catalog: &ApiCatalog, corpus: &str) -> Result<Self, CoverageError> {
        let mut sections = Vec::with_capacity(catalog.sections.len());

        for section in &catalog.sections {
            let mut missing = Vec::new();
            for function in &section.functions {
                if !mentions(corpus, function)? {
                    missing.push(function.clone());
                }
            }

            sections.push(SectionCoverage {
                name: section.name.clone(),
                total: section.functions.len(),
                covered: section.functions.len() - missing.len(),
                missing,
            });
        }

        let total = sections.iter().map(|s| s.total).sum();
        let covered = sections.iter().map(|s| s.covered).sum();

        Ok(Self {
            sections,
            total,
            covered,
        })
    }

    pub fn percent(&self) -> u32 {
        percent(self.covered, self.total)
    }

    /// All missing functions, in catalog order
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .flat_map(|s| s.missing.iter().map(String::as_str))
    }
}

/// Returns true if `symbol` occurs in `corpus` as a whole identifier
pub fn mentions(corpus: &str, symbol: &str) -> Result<bool, CoverageError> {
    let pattern = format!(
        r"(?:^|[^A-Za-z0-9_]){}(?:$|[^A-Za-z0-9_])",
        regex::escape(symbol)
    );
    let re = Regex::new(&pattern).map_err(|source| CoverageError::Pattern {
        symbol: symbol.to_string(),
        source,
    })?;
    Ok(re.is_match(corpus))
}
