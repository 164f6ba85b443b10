use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use crate::models::{ItemRecord, ItemType, RegistryCounts};

/// In-memory item registry keyed by item id
///
/// Not durable: contents live for the lifetime of the process. Matching reads
/// go through [`ItemRegistry::list`], which clones all records under a single
/// read lock so a query always sees one point-in-time view.
#[derive(Debug, Default)]
pub struct ItemRegistry {
    items: RwLock<HashMap<String, ItemRecord>>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, ItemRecord>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, ItemRecord>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or fully replace a record. Returns true if a record was replaced.
    pub fn upsert(&self, record: ItemRecord) -> bool {
        let item_id = record.item_id.clone();
        let replaced = self.write().insert(item_id.clone(), record).is_some();
        tracing::debug!("Registry upsert: {} (replaced: {})", item_id, replaced);
        replaced
    }

    pub fn get(&self, item_id: &str) -> Option<ItemRecord> {
        self.read().get(item_id).cloned()
    }

    /// Remove a record. Returns false if the id was not registered.
    pub fn delete(&self, item_id: &str) -> bool {
        self.write().remove(item_id).is_some()
    }

    /// Point-in-time snapshot of all records
    pub fn list(&self) -> Vec<ItemRecord> {
        self.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn counts(&self) -> RegistryCounts {
        self.read().values().fold(RegistryCounts::default(), |mut counts, item| {
            match item.item_type {
                ItemType::Lost => counts.lost += 1,
                ItemType::Found => counts.found += 1,
            }
            if item.has_image {
                counts.with_images += 1;
            }
            counts
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_record(id: &str, item_type: ItemType, title: &str) -> ItemRecord {
        ItemRecord {
            item_id: id.to_string(),
            item_type,
            category: "KEYS".to_string(),
            text_embedding: vec![0.5, 0.5],
            image_embedding: None,
            has_image: false,
            title: title.to_string(),
            description: String::new(),
            user_id: "u".to_string(),
        }
    }

    #[test]
    fn test_upsert_replaces_whole_record() {
        let registry = ItemRegistry::new();

        assert!(!registry.upsert(create_record("a", ItemType::Lost, "first")));
        assert!(registry.upsert(create_record("a", ItemType::Found, "second")));

        let stored = registry.get("a").unwrap();
        assert_eq!(stored.title, "second");
        assert_eq!(stored.item_type, ItemType::Found);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let registry = ItemRegistry::new();
        registry.upsert(create_record("a", ItemType::Lost, "a"));

        assert!(registry.delete("a"));
        assert!(!registry.delete("a"));
        assert!(registry.is_empty());
        assert!(registry.get("a").is_none());
    }

    #[test]
    fn test_counts() {
        let registry = ItemRegistry::new();
        registry.upsert(create_record("l1", ItemType::Lost, "x"));
        registry.upsert(create_record("f1", ItemType::Found, "y"));
        let mut with_image = create_record("f2", ItemType::Found, "z");
        with_image.has_image = true;
        with_image.image_embedding = Some(vec![1.0]);
        registry.upsert(with_image);

        let counts = registry.counts();
        assert_eq!(counts.lost, 1);
        assert_eq!(counts.found, 2);
        assert_eq!(counts.with_images, 1);
        assert_eq!(registry.list().len(), 3);
    }
}
