use std::sync::Arc;

use uuid::Uuid;

use crate::database::repository::CatalogStore;
use crate::error::Result;
use crate::models::category::Category;
use crate::models::quiz::Quiz;
use crate::models::subject::Subject;
use crate::state::cache::{CacheKey, ListCache};

/// List/lookup accessors over the browsing hierarchy, with the list
/// accessors memoized through the time-boxed cache. Single-row lookups are
/// uncached.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    cache: ListCache,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, cache: ListCache) -> Self {
        Self { store, cache }
    }

    pub async fn get_subjects(&self) -> Result<Vec<Subject>> {
        if let Some(cached) = self.cache.get::<Vec<Subject>>(CacheKey::Subjects) {
            return Ok(cached);
        }
        let subjects = self.store.subjects().await?;
        self.cache.put(CacheKey::Subjects, &subjects);
        Ok(subjects)
    }

    pub async fn get_subject(&self, id: Uuid) -> Result<Subject> {
        self.store.subject(id).await
    }

    pub async fn get_categories(&self, subject_id: Uuid) -> Result<Vec<Category>> {
        let key = CacheKey::Categories(subject_id);
        if let Some(cached) = self.cache.get::<Vec<Category>>(key) {
            return Ok(cached);
        }
        let categories = self.store.categories(subject_id).await?;
        self.cache.put(key, &categories);
        Ok(categories)
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Category> {
        self.store.category(id).await
    }

    pub async fn get_quizzes_by_category(&self, category_id: Uuid) -> Result<Vec<Quiz>> {
        let key = CacheKey::Quizzes(category_id);
        if let Some(cached) = self.cache.get::<Vec<Quiz>>(key) {
            return Ok(cached);
        }
        let quizzes = self.store.quizzes_by_category(category_id).await?;
        self.cache.put(key, &quizzes);
        Ok(quizzes)
    }

    pub async fn get_quiz(&self, id: Uuid) -> Result<Quiz> {
        self.store.quiz(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::InMemoryStore;
    use crate::state::kv::MemoryStore;

    fn subject(name: &str) -> Subject {
        Subject {
            id: Uuid::new_v4(),
            name: name.to_owned(),
        }
    }

    fn service_with(store: InMemoryStore) -> CatalogService {
        let cache = ListCache::new(Arc::new(MemoryStore::new()));
        CatalogService::new(Arc::new(store), cache)
    }

    #[tokio::test]
    async fn subjects_are_listed_by_name() {
        let store = InMemoryStore::new();
        store.push_subject(subject("Physics"));
        store.push_subject(subject("Biology"));

        let svc = service_with(store);
        let names: Vec<String> = svc
            .get_subjects()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Biology".to_owned(), "Physics".to_owned()]);
    }

    #[tokio::test]
    async fn cached_list_is_served_without_the_store() {
        let store = InMemoryStore::new();
        store.push_subject(subject("Biology"));

        let svc = service_with(store.clone());
        let first = svc.get_subjects().await.unwrap();
        assert_eq!(first.len(), 1);

        // a store change within the TTL is not visible through the cache
        store.push_subject(subject("Chemistry"));
        let second = svc.get_subjects().await.unwrap();
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn unknown_quiz_is_not_found() {
        let svc = service_with(InMemoryStore::new());
        let err = svc.get_quiz(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::NotFound(_)));
    }
}
