pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use std::sync::Arc;

use sqlx::PgPool;

use crate::database::pg_attempts::PgAttemptStore;
use crate::database::pg_catalog::PgCatalogStore;
use crate::database::repository::{AttemptStore, CatalogStore};
use crate::services::attempt_service::AttemptService;
use crate::services::catalog_service::CatalogService;
use crate::state::cache::ListCache;
use crate::state::kv::{KeyValueStore, MemoryStore};

#[derive(Clone)]
pub struct AppState {
    pub attempt_service: AttemptService,
    pub catalog_service: CatalogService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let cache = ListCache::with_ttl(kv, chrono::Duration::minutes(config.cache_ttl_minutes));

        let attempts: Arc<dyn AttemptStore> = Arc::new(PgAttemptStore::new(pool.clone()));
        let catalog: Arc<dyn CatalogStore> = Arc::new(PgCatalogStore::new(pool));

        Self::with_stores(attempts, catalog, cache)
    }

    /// Assemble the application over explicit store implementations.
    /// Tests use this with the in-memory store.
    pub fn with_stores(
        attempts: Arc<dyn AttemptStore>,
        catalog: Arc<dyn CatalogStore>,
        cache: ListCache,
    ) -> Self {
        Self {
            attempt_service: AttemptService::new(attempts),
            catalog_service: CatalogService::new(catalog, cache),
        }
    }
}
