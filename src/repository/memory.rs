//! In-process record store

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use super::RecordStore;
use crate::{
    error::{AppError, AppResult},
    models::{Record, RecordId},
};

/// Records kept in insertion order behind an async lock.
///
/// Natural-key uniqueness is checked under the write lock, so two concurrent
/// saves of the same key cannot both succeed.
pub struct MemoryStore<R> {
    records: RwLock<IndexMap<RecordId, R>>,
}

impl<R> MemoryStore<R> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(IndexMap::new()),
        }
    }
}

impl<R> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_natural_key<R: Record>(records: &IndexMap<RecordId, R>, record: &R) -> AppResult<()> {
    if let Some(key) = record.natural_key() {
        let taken = records
            .values()
            .any(|r| r.id() != record.id() && r.natural_key() == Some(key));
        if taken {
            return Err(AppError::Conflict(format!(
                "{} '{}' already exists",
                R::KIND,
                key
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl<R: Record> RecordStore<R> for MemoryStore<R> {
    async fn find_all(&self) -> AppResult<Vec<R>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &RecordId) -> AppResult<Option<R>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn find_by(&self, filter: &R::Filter) -> AppResult<Vec<R>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.matches(filter))
            .cloned()
            .collect())
    }

    async fn count(&self, filter: Option<&R::Filter>) -> AppResult<u64> {
        let records = self.records.read().await;
        let n = match filter {
            Some(filter) => records.values().filter(|r| r.matches(filter)).count(),
            None => records.len(),
        };
        Ok(n as u64)
    }

    async fn save(&self, record: &R) -> AppResult<()> {
        let mut records = self.records.write().await;
        check_natural_key(&records, record)?;
        // An existing id keeps its position
        records.insert(record.id().clone(), record.clone());
        Ok(())
    }

    async fn update(&self, record: &R) -> AppResult<()> {
        let mut records = self.records.write().await;
        check_natural_key(&records, record)?;
        match records.get_mut(record.id()) {
            Some(stored) => {
                *stored = record.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!(
                "{} {} not found",
                R::KIND,
                record.id()
            ))),
        }
    }

    async fn delete(&self, id: &RecordId) -> AppResult<()> {
        self.records.write().await.shift_remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Genre, GenreFilter};

    fn genre(id: &str, name: &str) -> Genre {
        Genre {
            id: RecordId::from(id),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_overwrites_in_place() {
        let store: MemoryStore<Genre> = MemoryStore::new();
        store.save(&genre("G1", "Poetry")).await.unwrap();
        store.save(&genre("G2", "Drama")).await.unwrap();
        store.save(&genre("G1", "Verse")).await.unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all, vec![genre("G1", "Verse"), genre("G2", "Drama")]);
    }

    #[tokio::test]
    async fn test_natural_key_is_unique() {
        let store: MemoryStore<Genre> = MemoryStore::new();
        store.save(&genre("G1", "Poetry")).await.unwrap();

        let err = store.save(&genre("G2", "Poetry")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.count(None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_by_and_count() {
        let store: MemoryStore<Genre> = MemoryStore::new();
        store.save(&genre("G1", "Poetry")).await.unwrap();
        store.save(&genre("G2", "Drama")).await.unwrap();

        let filter = GenreFilter::Name("Drama".to_string());
        assert_eq!(store.find_by(&filter).await.unwrap(), vec![genre("G2", "Drama")]);
        assert_eq!(store.count(Some(&filter)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store: MemoryStore<Genre> = MemoryStore::new();
        store.save(&genre("G1", "Poetry")).await.unwrap();

        store.delete(&RecordId::from("G1")).await.unwrap();
        store.delete(&RecordId::from("G1")).await.unwrap();
        assert!(store.find_by_id(&RecordId::from("G1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_requires_existing_record() {
        let store: MemoryStore<Genre> = MemoryStore::new();
        store.save(&genre("G1", "Poetry")).await.unwrap();
        store.save(&genre("G2", "Drama")).await.unwrap();

        store.update(&genre("G1", "Verse")).await.unwrap();
        assert_eq!(store.find_all().await.unwrap(), vec![genre("G1", "Verse"), genre("G2", "Drama")]);

        store.delete(&RecordId::from("G1")).await.unwrap();
        let err = store.update(&genre("G1", "Verse")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.count(None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_respects_natural_key() {
        let store: MemoryStore<Genre> = MemoryStore::new();
        store.save(&genre("G1", "Poetry")).await.unwrap();
        store.save(&genre("G2", "Drama")).await.unwrap();

        let err = store.update(&genre("G2", "Poetry")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.find_by_id(&RecordId::from("G2")).await.unwrap(), Some(genre("G2", "Drama")));
    }
}
