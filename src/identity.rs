use log::debug;
use std::collections::HashMap;
use uuid::Uuid;

/// Session-scoped registry of synthetic SPOC identifiers.
///
/// The key is `(spoc name, store state)` — store name is deliberately left
/// out so that a representative reassigned between stores within one state
/// keeps their identifier. Identifiers are minted lazily and the map only
/// grows for the life of the session.
#[derive(Debug, Clone, Default)]
pub struct SpocRegistry {
    ids: HashMap<(String, String), Uuid>,
}

impl SpocRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stable identifier for this representative in this state,
    /// minting one the first time the pair is seen.
    pub fn resolve(&mut self, spoc_name: &str, store_name: &str, store_state: &str) -> Uuid {
        let key = (spoc_name.to_string(), store_state.to_string());
        *self.ids.entry(key).or_insert_with(|| {
            let id = Uuid::new_v4();
            debug!("minted SPOC id {id} for {spoc_name} ({store_name}, {store_state})");
            id
        })
    }

    /// Moves a representative's identifier to a new state, removing the old
    /// entry. Since store name is not part of the key, a store change within
    /// one state never re-keys; only a state change does. Returns the moved
    /// identifier, or `None` when the old key was never registered.
    pub fn reassign_state(
        &mut self,
        spoc_name: &str,
        old_state: &str,
        new_state: &str,
    ) -> Option<Uuid> {
        if old_state == new_state {
            return self
                .ids
                .get(&(spoc_name.to_string(), old_state.to_string()))
                .copied();
        }
        let old_key = (spoc_name.to_string(), old_state.to_string());
        let id = self.ids.remove(&old_key)?;
        self.ids
            .insert((spoc_name.to_string(), new_state.to_string()), id);
        Some(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
