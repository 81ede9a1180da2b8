use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Which intake channel a trade-in arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    Maple,
    Cashify,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Maple => write!(f, "Maple"),
            Channel::Cashify => write!(f, "Cashify"),
        }
    }
}

/// The fixed product taxonomy every raw product-type string collapses into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductCategory {
    MobilePhone,
    Laptop,
    Tablet,
    SmartWatchApple,
    SmartWatchAndroid,
    Other,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::MobilePhone => "Mobile Phone",
            ProductCategory::Laptop => "Laptop",
            ProductCategory::Tablet => "Tablet",
            ProductCategory::SmartWatchApple => "SmartWatch (Apple)",
            ProductCategory::SmartWatchAndroid => "SmartWatch (Android)",
            ProductCategory::Other => "Other",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reconciled trade-in row from either channel. Built once per import by
/// the pipeline and never mutated afterwards; nothing here is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeInRecord {
    pub record_id: String,
    pub channel: Channel,
    pub imei: Option<String>,
    pub transaction_date: Option<NaiveDate>,
    /// Full English month name after normalization (never numeric).
    pub month: Option<String>,
    pub year: Option<i32>,
    pub store_name: Option<String>,
    /// Authoritative state from the roster join, "Unknown" when unmatched.
    pub store_state: String,
    pub zone: String,
    pub product_type: Option<String>,
    pub product_category: ProductCategory,
    pub product_name: Option<String>,
    pub amount: Option<f64>,
    pub spoc_name: Option<String>,
    pub spoc_id: Option<Uuid>,
}

/// One (representative, store) pairing from the SPOC roster sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpocRosterEntry {
    pub spoc_name: String,
    pub store_name: String,
    pub store_state: String,
    pub zone: String,
    /// Weekday name, or `None` for vacant postings.
    pub weekoff_day: Option<String>,
    /// Monthly numeric targets keyed by full month name, parsed from the
    /// roster's "<Month> Target" columns.
    pub monthly_targets: BTreeMap<String, f64>,
    pub spoc_id: Option<Uuid>,
}

impl SpocRosterEntry {
    pub fn target_for(&self, month: &str) -> Option<f64> {
        self.monthly_targets.get(month).copied()
    }
}
