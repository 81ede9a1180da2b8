use crate::error::{ReconcileError, Result};
use crate::schema::Channel;
use crate::table::RawTable;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const MAPLE_REQUIRED_COLUMNS: &[&str] = &[
    "Service Number",
    "Status",
    "Old IMEI No",
    "Created Date",
    "Month",
    "Year",
    "Store Name",
    "Vendor Name",
    "Payment Amount",
    "Partner / Source",
    "Product Category",
    "Product Type",
    "Old Product Name",
    "New Product Name",
    "Maple Bid",
];

pub const CASHIFY_REQUIRED_COLUMNS: &[&str] = &[
    "Order Id",
    "Order Date",
    "Month",
    "Year",
    "Order Status",
    "Partner Name",
    "Store Name",
    "Pickup Type",
    "Old Device IMEI",
    "Product Type",
    "Product Category",
    "Old Device Name",
    "New Device IMEI",
    "New Device Name",
    "Initial Device Amount",
];

pub const SPOC_REQUIRED_COLUMNS: &[&str] = &[
    "Spoc Name",
    "Store State",
    "Zone",
    "Weekoff Day",
    "Store Name",
];

/// Candidates below this similarity are not worth suggesting.
const SIMILARITY_FLOOR: f64 = 0.6;
const MAX_SUGGESTIONS: usize = 3;

/// Which of the three source sheets a table claims to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dataset {
    Maple,
    Cashify,
    Spoc,
}

impl Dataset {
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            Dataset::Maple => MAPLE_REQUIRED_COLUMNS,
            Dataset::Cashify => CASHIFY_REQUIRED_COLUMNS,
            Dataset::Spoc => SPOC_REQUIRED_COLUMNS,
        }
    }

    /// Columns without which no report can be produced at all.
    pub fn critical_columns(&self) -> &'static [&'static str] {
        match self {
            Dataset::Spoc => &["Store Name", "Spoc Name"],
            _ => &["Store Name"],
        }
    }

    /// Mandatory columns may not be skipped during mapping.
    pub fn is_mandatory(&self, column: &str) -> bool {
        matches!(self, Dataset::Spoc) && matches!(column, "Store Name" | "Spoc Name")
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dataset::Maple => write!(f, "Maple"),
            Dataset::Cashify => write!(f, "Cashify"),
            Dataset::Spoc => write!(f, "SPOC"),
        }
    }
}

impl From<Channel> for Dataset {
    fn from(channel: Channel) -> Self {
        match channel {
            Channel::Maple => Dataset::Maple,
            Channel::Cashify => Dataset::Cashify,
        }
    }
}

/// A ranked fuzzy-match candidate for one missing column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub header: String,
    pub score: f64,
}

/// One required column the actual headers do not carry, with the candidates
/// a caller (UI or saved mapping) can pick from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnresolvedColumn {
    pub canonical: String,
    pub candidates: Vec<Suggestion>,
    pub mandatory: bool,
}

/// The suggestion phase's output: everything the interactive layer needs to
/// prompt the user, with no mutation performed yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingPlan {
    pub dataset: Dataset,
    pub unresolved: Vec<UnresolvedColumn>,
}

impl MappingPlan {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// A confirmed decision for one canonical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnChoice {
    /// Rename this actual header to the canonical name.
    Source(String),
    /// Leave the optional column unmapped.
    Skip,
}

/// Canonical required-column name -> confirmed decision. Built once per
/// session per dataset and reused until the source schema changes.
pub type ColumnMapping = BTreeMap<String, ColumnChoice>;

/// Ranks actual headers by similarity to an expected column name, keeping at
/// most three candidates at or above the 0.6 floor.
pub fn suggest_columns(headers: &[String], expected: &str) -> Vec<Suggestion> {
    let expected_lower = expected.to_lowercase();
    let mut scored: Vec<Suggestion> = headers
        .iter()
        .map(|h| Suggestion {
            header: h.clone(),
            score: strsim::normalized_levenshtein(&h.to_lowercase(), &expected_lower),
        })
        .filter(|s| s.score >= SIMILARITY_FLOOR)
        .collect();
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(MAX_SUGGESTIONS);
    scored
}

/// Suggestion phase: reports every required column the table is missing,
/// each with ranked candidates. Pure; the interactive prompt belongs to the
/// caller.
pub fn plan_mapping(table: &RawTable, dataset: Dataset) -> Result<MappingPlan> {
    if table.is_empty() {
        return Err(ReconcileError::EmptyDataset {
            dataset: dataset.to_string(),
        });
    }

    info!(
        "{} available columns: {}",
        dataset,
        table.headers().join(", ")
    );

    let unresolved = dataset
        .required_columns()
        .iter()
        .filter(|col| !table.has_column(col))
        .map(|col| UnresolvedColumn {
            canonical: (*col).to_string(),
            candidates: suggest_columns(table.headers(), col),
            mandatory: dataset.is_mandatory(col),
        })
        .collect();

    Ok(MappingPlan { dataset, unresolved })
}

/// Apply phase: validates the confirmed mapping and returns the renamed
/// table, or a deterministic failure. Either all downstream-required columns
/// end up present under canonical names, or nothing is produced.
pub fn apply_mapping(
    table: &RawTable,
    dataset: Dataset,
    mapping: &ColumnMapping,
) -> Result<RawTable> {
    if table.is_empty() {
        return Err(ReconcileError::EmptyDataset {
            dataset: dataset.to_string(),
        });
    }

    let mut renamed = table.clone();
    let mut unresolved = Vec::new();

    for col in dataset.required_columns() {
        if renamed.has_column(col) {
            continue;
        }
        match mapping.get(*col) {
            Some(ColumnChoice::Source(actual)) => {
                if !renamed.has_column(actual) {
                    return Err(ReconcileError::UnknownSourceColumn {
                        dataset: dataset.to_string(),
                        column: actual.clone(),
                    });
                }
                renamed.rename_column(actual, col);
            }
            Some(ColumnChoice::Skip) => {
                if dataset.is_mandatory(col) {
                    return Err(ReconcileError::MandatorySkip {
                        dataset: dataset.to_string(),
                        column: (*col).to_string(),
                    });
                }
            }
            None => unresolved.push((*col).to_string()),
        }
    }

    if !unresolved.is_empty() {
        warn!(
            "missing columns in {} data: {}",
            dataset,
            unresolved.join(", ")
        );
        return Err(ReconcileError::UnresolvedColumns {
            dataset: dataset.to_string(),
            columns: unresolved,
        });
    }

    // Cashify sheets sometimes carry the representative under a partner-name
    // header (with stray whitespace) instead of a Spoc Name column.
    if dataset == Dataset::Cashify && !renamed.has_column("Spoc Name") {
        let partner = renamed
            .headers()
            .iter()
            .find(|h| h.trim() == "Partner Name")
            .cloned();
        if let Some(partner) = partner {
            renamed.duplicate_column(&partner, "Spoc Name");
        }
    }

    let missing_critical: Vec<String> = dataset
        .critical_columns()
        .iter()
        .filter(|col| !renamed.has_column(col))
        .map(|col| (*col).to_string())
        .collect();
    if !missing_critical.is_empty() {
        return Err(ReconcileError::CriticalColumnsMissing {
            dataset: dataset.to_string(),
            columns: missing_critical,
        });
    }

    info!(
        "{} columns after mapping: {}",
        dataset,
        renamed.headers().join(", ")
    );

    Ok(renamed)
}
