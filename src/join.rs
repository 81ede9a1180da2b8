use crate::normalize::{normalize_state, title_case};
use crate::schema::{SpocRosterEntry, TradeInRecord};
use log::{info, warn};
use std::collections::{BTreeSet, HashMap};

pub const UNKNOWN: &str = "Unknown";

/// Authoritative per-store metadata distilled from the roster.
#[derive(Debug, Clone, Default)]
pub struct StoreMetadata {
    pub store_state: Option<String>,
    pub zone: Option<String>,
    pub spoc_name: Option<String>,
}

/// Deduplicated store-name lookup built from the SPOC roster. Keys are
/// title-cased store names; the first roster row seen for a store wins.
#[derive(Debug, Clone, Default)]
pub struct StoreDirectory {
    stores: HashMap<String, StoreMetadata>,
}

impl StoreDirectory {
    pub fn from_roster(roster: &[SpocRosterEntry]) -> Self {
        let mut stores = HashMap::new();
        for entry in roster {
            let key = title_case(entry.store_name.trim());
            if key.is_empty() {
                continue;
            }
            stores.entry(key).or_insert_with(|| StoreMetadata {
                store_state: Some(normalize_state(&entry.store_state))
                    .filter(|s| !s.is_empty()),
                zone: Some(title_case(entry.zone.trim())).filter(|z| !z.is_empty()),
                spoc_name: Some(title_case(entry.spoc_name.trim())).filter(|n| !n.is_empty()),
            });
        }
        Self { stores }
    }

    pub fn lookup(&self, store_name: &str) -> Option<&StoreMetadata> {
        self.stores.get(&title_case(store_name.trim()))
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

/// Attaches authoritative store state and zone to every record via a
/// left-join on store name. Roster values win over pre-existing values; the
/// pre-existing value is kept only when the roster has none; "Unknown" is
/// the final fallback. Unmatched stores are logged, never fatal.
pub fn attach_store_metadata(records: &mut [TradeInRecord], directory: &StoreDirectory) {
    if directory.is_empty() {
        warn!("store directory is empty; defaulting Store State and Zone to Unknown");
    }

    let mut unmatched: BTreeSet<String> = BTreeSet::new();

    for record in records.iter_mut() {
        let normalized_store = record
            .store_name
            .as_deref()
            .map(|s| title_case(s.trim()))
            .filter(|s| !s.is_empty());
        record.store_name = normalized_store.clone();

        let meta = normalized_store
            .as_deref()
            .and_then(|store| directory.lookup(store));

        if meta.is_none() {
            if let Some(store) = normalized_store {
                unmatched.insert(store);
            }
        }

        let existing_state = Some(record.store_state.clone())
            .filter(|s| !s.is_empty() && s != UNKNOWN)
            .map(|s| normalize_state(&s));
        record.store_state = meta
            .and_then(|m| m.store_state.clone())
            .or(existing_state)
            .unwrap_or_else(|| UNKNOWN.to_string());

        let existing_zone = Some(record.zone.clone()).filter(|z| !z.is_empty() && z != UNKNOWN);
        record.zone = meta
            .and_then(|m| m.zone.clone())
            .or(existing_zone)
            .unwrap_or_else(|| UNKNOWN.to_string());

        if record.spoc_name.is_none() {
            record.spoc_name = meta.and_then(|m| m.spoc_name.clone());
        }
    }

    if !unmatched.is_empty() {
        warn!(
            "unmatched store names: {}",
            unmatched.into_iter().collect::<Vec<_>>().join(", ")
        );
    } else {
        info!("all store names matched the roster");
    }
}
