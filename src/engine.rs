use crate::columns::{apply_mapping, ColumnMapping, Dataset};
use crate::error::Result;
use crate::identity::SpocRegistry;
use crate::join::{attach_store_metadata, StoreDirectory, UNKNOWN};
use crate::normalize::{categorize_product_type, normalize_month, normalize_state, title_case};
use crate::schema::{Channel, SpocRosterEntry, TradeInRecord};
use crate::table::RawTable;
use chrono::{Datelike, NaiveDate};
use log::{debug, info, warn};
use std::collections::BTreeMap;

const TARGET_COLUMN_SUFFIX: &str = " Target";

/// Per-session reconciliation state: the saved column mapping for each
/// dataset plus the SPOC identity registry. One instance per user session;
/// nothing here is shared process-wide.
#[derive(Debug, Default)]
pub struct ReconcileSession {
    mappings: BTreeMap<Dataset, ColumnMapping>,
    spoc_ids: SpocRegistry,
}

impl ReconcileSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column_mapping(&self, dataset: Dataset) -> Option<&ColumnMapping> {
        self.mappings.get(&dataset)
    }

    pub fn set_column_mapping(&mut self, dataset: Dataset, mapping: ColumnMapping) {
        self.mappings.insert(dataset, mapping);
    }

    /// Forgets all saved mappings, forcing re-resolution on the next import.
    pub fn reset_mappings(&mut self) {
        self.mappings.clear();
    }

    pub fn spoc_ids(&self) -> &SpocRegistry {
        &self.spoc_ids
    }

    pub fn spoc_ids_mut(&mut self) -> &mut SpocRegistry {
        &mut self.spoc_ids
    }

    /// Serializes the saved column mappings so a caller can persist them
    /// between sessions.
    pub fn export_mappings(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.mappings)?)
    }

    pub fn import_mappings(&mut self, json: &str) -> Result<()> {
        self.mappings = serde_json::from_str(json)?;
        Ok(())
    }

    /// Reconciles the SPOC roster sheet: applies the saved column mapping,
    /// normalizes names and states, collects "<Month> Target" columns, and
    /// resolves identities.
    pub fn prepare_roster(&mut self, table: &RawTable) -> Result<Vec<SpocRosterEntry>> {
        let mapping = self.mappings.entry(Dataset::Spoc).or_default().clone();
        let mapped = apply_mapping(table, Dataset::Spoc, &mapping)?;

        let target_columns: Vec<(String, String)> = mapped
            .headers()
            .iter()
            .filter_map(|h| {
                h.strip_suffix(TARGET_COLUMN_SUFFIX)
                    .map(|month| (h.clone(), normalize_month(month)))
            })
            .collect();

        let mut entries = Vec::with_capacity(mapped.row_count());
        for row in 0..mapped.row_count() {
            let Some(store_name) = mapped.value(row, "Store Name").map(title_case) else {
                warn!("roster row {row} has no store name; skipping");
                continue;
            };
            let Some(spoc_name) = mapped.value(row, "Spoc Name").map(title_case) else {
                warn!("roster row {row} has no SPOC name; skipping");
                continue;
            };

            let store_state = mapped
                .value(row, "Store State")
                .map(normalize_state)
                .unwrap_or_default();
            let zone = mapped
                .value(row, "Zone")
                .map(title_case)
                .unwrap_or_default();
            let weekoff_day = mapped
                .value(row, "Weekoff Day")
                .map(title_case)
                .filter(|d| !d.eq_ignore_ascii_case("vacant"));

            let mut monthly_targets = BTreeMap::new();
            for (header, month) in &target_columns {
                if let Some(target) = mapped.value(row, header).and_then(parse_number) {
                    monthly_targets.insert(month.clone(), target);
                }
            }

            let spoc_id = if store_state.is_empty() {
                None
            } else {
                Some(self.spoc_ids.resolve(&spoc_name, &store_name, &store_state))
            };

            entries.push(SpocRosterEntry {
                spoc_name,
                store_name,
                store_state,
                zone,
                weekoff_day,
                monthly_targets,
                spoc_id,
            });
        }

        info!("reconciled {} roster entries", entries.len());
        Ok(entries)
    }

    /// Reconciles one channel's intake sheet into analysis-ready records:
    /// column mapping, lexical normalization, product categorization, the
    /// roster join, and identity resolution, in that order. Malformed dates,
    /// years, and amounts coerce to `None` rather than failing the import.
    pub fn prepare_channel(
        &mut self,
        channel: Channel,
        table: &RawTable,
        roster: &[SpocRosterEntry],
    ) -> Result<Vec<TradeInRecord>> {
        let dataset = Dataset::from(channel);
        let mapping = self.mappings.entry(dataset).or_default().clone();
        let mapped = apply_mapping(table, dataset, &mapping)?;
        let cols = ChannelColumns::for_channel(channel);

        let mut records = Vec::with_capacity(mapped.row_count());
        for row in 0..mapped.row_count() {
            let product_type = mapped.value(row, "Product Type").map(str::to_string);
            records.push(TradeInRecord {
                record_id: mapped
                    .value(row, cols.id)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{channel}-row-{row}")),
                channel,
                imei: mapped.value(row, cols.imei).map(str::to_string),
                transaction_date: mapped.value(row, cols.date).and_then(parse_date),
                month: mapped.value(row, "Month").map(normalize_month),
                year: mapped.value(row, "Year").and_then(parse_year),
                store_name: mapped.value(row, "Store Name").map(str::to_string),
                store_state: mapped
                    .value(row, "Store State")
                    .map(str::to_string)
                    .unwrap_or_default(),
                zone: mapped
                    .value(row, "Zone")
                    .map(str::to_string)
                    .unwrap_or_default(),
                product_category: categorize_product_type(product_type.as_deref()),
                product_type,
                product_name: mapped.value(row, cols.product_name).map(title_case),
                amount: mapped.value(row, cols.amount).and_then(parse_number),
                spoc_name: mapped.value(row, "Spoc Name").map(title_case),
                spoc_id: None,
            });
        }

        let directory = StoreDirectory::from_roster(roster);
        attach_store_metadata(&mut records, &directory);

        for record in &mut records {
            if record.store_state == UNKNOWN {
                continue;
            }
            if let (Some(spoc), Some(store)) = (record.spoc_name.clone(), record.store_name.clone())
            {
                record.spoc_id = Some(self.spoc_ids.resolve(&spoc, &store, &record.store_state));
            }
        }

        info!("reconciled {} {channel} records", records.len());
        Ok(records)
    }
}

/// Channel-specific source column names for the fields the two intake
/// sheets label differently.
struct ChannelColumns {
    id: &'static str,
    date: &'static str,
    imei: &'static str,
    amount: &'static str,
    product_name: &'static str,
}

impl ChannelColumns {
    fn for_channel(channel: Channel) -> Self {
        match channel {
            Channel::Maple => Self {
                id: "Service Number",
                date: "Created Date",
                imei: "Old IMEI No",
                amount: "Maple Bid",
                product_name: "Old Product Name",
            },
            Channel::Cashify => Self {
                id: "Order Id",
                date: "Order Date",
                imei: "Old Device IMEI",
                amount: "Initial Device Amount",
                product_name: "Old Device Name",
            },
        }
    }
}

/// Keeps only records matching the selected year, and optionally month and
/// day-of-month. Records with unparseable dates are excluded by the day
/// filter, matching the coerce-then-drop policy.
pub fn filter_by_date(
    records: &[TradeInRecord],
    year: i32,
    month: Option<&str>,
    day: Option<u32>,
) -> Vec<TradeInRecord> {
    records
        .iter()
        .filter(|r| r.year == Some(year))
        .filter(|r| month.is_none() || r.month.as_deref() == month)
        .filter(|r| day.is_none() || r.transaction_date.map(|d| d.day()) == day)
        .cloned()
        .collect()
}

/// Day-first date parsing with a coerce-to-None policy for anything
/// unrecognized, including datetime strings with a trailing time part.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    const FORMATS: &[&str] = &[
        "%d/%m/%Y",
        "%d-%m-%Y",
        "%Y-%m-%d",
        "%d/%m/%y",
        "%d-%b-%Y",
        "%d %b %Y",
    ];

    let candidate = raw.split_whitespace().next().unwrap_or(raw);
    for format in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(candidate, format) {
            return Some(date);
        }
    }
    debug!("could not parse date '{raw}'; coercing to None");
    None
}

fn parse_year(raw: &str) -> Option<i32> {
    parse_number(raw).map(|n| n.trunc() as i32)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}
