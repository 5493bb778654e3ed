use chrono::{SubsecRound, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::model::{NewSchool, School, SchoolId};
use crate::store::traits::SchoolStore;
use crate::store::{StoreError, StoreResult};

#[derive(Debug, Default)]
struct Table {
    last_id: SchoolId,
    rows: BTreeMap<SchoolId, School>,
}

/// In-process school store.
///
/// Behaves like the `schools` table: ids come from a sequence that never
/// reuses values, timestamps have whole-second precision, and the version
/// check-and-increment runs under the write lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait::async_trait]
impl SchoolStore for MemoryStore {
    async fn insert_school(&self, school: NewSchool) -> StoreResult<School> {
        let mut table = self.table.write().await;
        table.last_id += 1;

        let created = School {
            id: table.last_id,
            created_at: Utc::now().trunc_subsecs(0),
            name: school.name,
            level: school.level,
            contact: school.contact,
            phone: school.phone,
            email: school.email,
            website: school.website,
            address: school.address,
            mode: school.mode.unwrap_or_default(),
            version: 1,
        };
        table.rows.insert(created.id, created.clone());

        Ok(created)
    }

    async fn get_school(&self, id: SchoolId) -> StoreResult<School> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        let table = self.table.read().await;
        table.rows.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn update_school(&self, school: &School) -> StoreResult<School> {
        let mut table = self.table.write().await;

        let Some(row) = table
            .rows
            .get_mut(&school.id)
            .filter(|row| row.version == school.version)
        else {
            return Err(StoreError::EditConflict);
        };

        // id and created_at are immutable
        *row = School {
            id: row.id,
            created_at: row.created_at,
            version: row.version + 1,
            ..school.clone()
        };

        Ok(row.clone())
    }

    async fn delete_school(&self, id: SchoolId) -> StoreResult<()> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        let mut table = self.table.write().await;
        match table.rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn apple_tree() -> NewSchool {
        NewSchool {
            name: "Apple Tree".to_string(),
            level: "High School".to_string(),
            contact: "Anna Smith".to_string(),
            phone: "601-4411".to_string(),
            email: "a@b.com".to_string(),
            website: "https://example.com".to_string(),
            address: "14 Apple street".to_string(),
            mode: Some(vec!["blended".to_string(), "online".to_string()]),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_generated_fields() {
        let store = MemoryStore::new();
        let first = store.insert_school(apple_tree()).await.unwrap();
        let second = store.insert_school(apple_tree()).await.unwrap();

        assert!(first.id > 0);
        assert!(second.id > first.id);
        assert_eq!(first.version, 1);
        assert_eq!(first.name, "Apple Tree");
        assert_eq!(first.mode, vec!["blended", "online"]);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_get_returns_inserted_record() {
        let store = MemoryStore::new();
        let inserted = store.insert_school(apple_tree()).await.unwrap();
        let fetched = store.get_school(inserted.id).await.unwrap();
        assert_eq!(fetched, inserted);
    }

    #[tokio::test]
    async fn test_non_positive_ids_are_not_found() {
        let store = MemoryStore::new();
        store.insert_school(apple_tree()).await.unwrap();

        for id in [0, -1, i64::MIN] {
            assert!(matches!(store.get_school(id).await, Err(StoreError::NotFound)));
            assert!(matches!(store.delete_school(id).await, Err(StoreError::NotFound)));
        }
        assert!(matches!(store.get_school(99).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_round_trip_bumps_version_only() {
        let store = MemoryStore::new();
        let inserted = store.insert_school(apple_tree()).await.unwrap();

        let fetched = store.get_school(inserted.id).await.unwrap();
        let updated = store.update_school(&fetched).await.unwrap();
        assert_eq!(updated.version, 2);

        let refetched = store.get_school(inserted.id).await.unwrap();
        assert_eq!(refetched.version, 2);
        assert_eq!(
            School {
                version: 1,
                ..refetched
            },
            inserted
        );
    }

    #[tokio::test]
    async fn test_stale_version_is_an_edit_conflict() {
        let store = MemoryStore::new();
        let inserted = store.insert_school(apple_tree()).await.unwrap();

        let mut online_only = inserted.clone();
        online_only.mode = vec!["online".to_string()];
        let updated = store.update_school(&online_only).await.unwrap();
        assert_eq!(updated.version, 2);

        // Same stale version twice: both rejected, nothing written
        let mut stale = inserted.clone();
        stale.name = "Pear Tree".to_string();
        for _ in 0..2 {
            assert!(matches!(
                store.update_school(&stale).await,
                Err(StoreError::EditConflict)
            ));
        }

        let current = store.get_school(inserted.id).await.unwrap();
        assert_eq!(current.version, 2);
        assert_eq!(current.name, "Apple Tree");
        assert_eq!(current.mode, vec!["online"]);
    }

    #[tokio::test]
    async fn test_update_of_missing_row_is_an_edit_conflict() {
        let store = MemoryStore::new();
        let inserted = store.insert_school(apple_tree()).await.unwrap();
        store.delete_school(inserted.id).await.unwrap();

        assert!(matches!(
            store.update_school(&inserted).await,
            Err(StoreError::EditConflict)
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_created_at() {
        let store = MemoryStore::new();
        let inserted = store.insert_school(apple_tree()).await.unwrap();

        let mut tampered = inserted.clone();
        tampered.created_at = inserted.created_at + chrono::Duration::days(1);
        let updated = store.update_school(&tampered).await.unwrap();

        assert_eq!(updated.created_at, inserted.created_at);
        assert_eq!(updated.id, inserted.id);
    }

    #[tokio::test]
    async fn test_concurrent_updates_have_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let inserted = store.insert_school(apple_tree()).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                let mut school = inserted.clone();
                school.contact = format!("Writer {}", i);
                tokio::spawn(async move { store.update_school(&school).await })
            })
            .collect();

        let mut winners = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(StoreError::EditConflict) => conflicts += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(conflicts, 7);
        assert_eq!(store.get_school(inserted.id).await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let store = MemoryStore::new();
        let inserted = store.insert_school(apple_tree()).await.unwrap();

        store.delete_school(inserted.id).await.unwrap();
        assert!(matches!(
            store.delete_school(inserted.id).await,
            Err(StoreError::NotFound)
        ));
        assert!(store.is_empty().await);
    }
}
