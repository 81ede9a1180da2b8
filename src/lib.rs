//! # Trade-in Reconciler
//!
//! A library for reconciling messily-labeled trade-in intake sheets into a
//! consistent, joinable, analysis-ready dataset.
//!
//! Two intake channels ("Maple" and "Cashify") and a roster of field
//! representatives ("SPOC"s) arrive as spreadsheets with inconsistent
//! column schemas, state spellings, month formats, and free-text product
//! types. This crate owns the pipeline that straightens all of that out:
//!
//! - **Column reconciliation**: exact match, then fuzzy-similarity
//!   suggestions, then confirmed manual overrides, with deterministic
//!   failures for anything unresolved.
//! - **Lexical normalization**: canonical state names, full English month
//!   names, and a fixed product taxonomy.
//! - **Store/state join**: authoritative state and zone from the roster,
//!   with an "Unknown" fallback instead of hard failures.
//! - **Identity resolution**: a stable synthetic identifier per
//!   (representative, state) pair within a session.
//! - **Calendar arithmetic**: week partitions and weekoff date sets for
//!   rest-day vs working-day loss classification.
//!
//! Report aggregation, chart rendering, file I/O, and authentication are
//! external collaborators and live outside this crate.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tradein_reconciler::*;
//!
//! let mut session = ReconcileSession::new();
//!
//! // Suggestion phase: what needs mapping, with ranked candidates.
//! let plan = plan_mapping(&maple_table, Dataset::Maple)?;
//!
//! // Apply phase: the caller confirms choices, the session remembers them.
//! session.set_column_mapping(Dataset::Maple, confirmed_mapping);
//!
//! let roster = session.prepare_roster(&spoc_table)?;
//! let maple = session.prepare_channel(Channel::Maple, &maple_table, &roster)?;
//! let cashify = session.prepare_channel(Channel::Cashify, &cashify_table, &roster)?;
//! ```

pub mod calendar;
pub mod columns;
pub mod engine;
pub mod error;
pub mod identity;
pub mod join;
pub mod metrics;
pub mod normalize;
pub mod schema;
pub mod table;

pub use calendar::{
    last_n_months, last_n_weeks, month_number, spoc_weekoffs, weekoffs, weeks_in_month, WeekSpan,
};
pub use columns::{
    apply_mapping, plan_mapping, suggest_columns, ColumnChoice, ColumnMapping, Dataset,
    MappingPlan, Suggestion, UnresolvedColumn, CASHIFY_REQUIRED_COLUMNS, MAPLE_REQUIRED_COLUMNS,
    SPOC_REQUIRED_COLUMNS,
};
pub use engine::{filter_by_date, ReconcileSession};
pub use error::{ReconcileError, Result};
pub use identity::SpocRegistry;
pub use join::{attach_store_metadata, StoreDirectory, StoreMetadata, UNKNOWN};
pub use metrics::{market_share, target_achievement};
pub use normalize::{categorize_product_type, normalize_month, normalize_state, title_case};
pub use schema::{Channel, ProductCategory, SpocRosterEntry, TradeInRecord};
pub use table::RawTable;
