//! In-memory store with JSON snapshot files.

use crate::collection::Collection;
use crate::error::StoreError;
use crate::traits::StateStore;
use crate::EntityJson;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

type Collections = BTreeMap<Collection, Vec<EntityJson>>;

/// In-memory [`StateStore`].
///
/// State can be persisted to and restored from a snapshot file, a JSON
/// object mapping collection names to entity arrays. Snapshots are the
/// store's own format and unrelated to transfer documents.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a store from a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be read or is not a valid
    /// snapshot.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let file = File::open(path)?;
        let collections: Collections = serde_json::from_reader(BufReader::new(file))?;
        for (collection, entities) in &collections {
            if entities.iter().any(|e| !e.is_object()) {
                return Err(StoreError::InvalidEntity(format!(
                    "snapshot entries of {collection} must be objects"
                )));
            }
        }
        Ok(Self {
            collections: RwLock::new(collections),
        })
    }

    /// Loads a store from `path`, or returns an empty store if the file does
    /// not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Writes a snapshot of the current state to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &*self.collections.read())?;
        writer.flush()?;
        Ok(())
    }

    /// Returns a copy of one collection's entities.
    pub fn entities(&self, collection: Collection) -> Vec<EntityJson> {
        self.collections
            .read()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }
}

impl StateStore for MemoryStore {
    fn insert(&self, collection: Collection, entity: EntityJson) -> Result<(), StoreError> {
        if !entity.is_object() {
            return Err(StoreError::InvalidEntity(format!(
                "{collection} entries must be objects"
            )));
        }
        self.collections
            .write()
            .entry(collection)
            .or_default()
            .push(entity);
        Ok(())
    }

    fn visit(
        &self,
        collection: Collection,
        visit: &mut dyn FnMut(&EntityJson) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        // Visitors may write to a slow sink; no lock is held while they run.
        for entity in &self.entities(collection) {
            visit(entity)?;
        }
        Ok(())
    }

    fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .get(&collection)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_insert_and_visit_in_order() {
        let store = MemoryStore::new();
        store.insert(Collection::Clients, json!({"clientId": "a"})).unwrap();
        store.insert(Collection::Clients, json!({"clientId": "b"})).unwrap();

        let mut seen = Vec::new();
        store
            .visit(Collection::Clients, &mut |e| {
                seen.push(e["clientId"].as_str().unwrap_or_default().to_string());
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, vec!["a", "b"]);
        assert_eq!(store.len(Collection::Clients), 2);
        assert_eq!(store.len(Collection::Grants), 0);
        assert!(!store.is_empty());
    }

    #[test]
    fn test_visitor_can_write_to_the_store() {
        let store = MemoryStore::new();
        store.insert(Collection::Clients, json!({"clientId": "a"})).unwrap();

        store
            .visit(Collection::Clients, &mut |e| {
                store.insert(Collection::Grants, json!({"clientId": e["clientId"].clone()}))
            })
            .unwrap();
        assert_eq!(store.entities(Collection::Grants), vec![json!({"clientId": "a"})]);
    }

    #[test]
    fn test_non_object_entity_is_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.insert(Collection::Grants, json!("nope")),
            Err(StoreError::InvalidEntity(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");

        let store = MemoryStore::new();
        store.insert(Collection::SystemScopes, json!({"value": "openid"})).unwrap();
        store.insert(Collection::AccessTokens, json!({"id": 1, "value": "tok"})).unwrap();
        store.save(&path).unwrap();

        let loaded = MemoryStore::load(&path).unwrap();
        assert_eq!(loaded.entities(Collection::SystemScopes), vec![json!({"value": "openid"})]);
        assert_eq!(loaded.entities(Collection::AccessTokens), vec![json!({"id": 1, "value": "tok"})]);

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw.get("systemScopes").is_some());
        assert!(raw.get("accessTokens").is_some());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = MemoryStore::load_or_default(temp_dir.path().join("absent.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_rejects_unknown_collection() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        std::fs::write(&path, r#"{"widgets": []}"#).unwrap();
        assert!(matches!(MemoryStore::load(&path), Err(StoreError::Snapshot(_))));
    }
}
