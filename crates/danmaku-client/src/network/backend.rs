//! Runtime choice between the remote store and the offline fallback.

use danmaku_core::{Fields, MemoryObjectStore, ObjectList, ObjectStore, StoreError, StoredObject};

use super::HttpObjectStore;

/// Object store used by the page.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    Http(HttpObjectStore),
    /// Offline demo: comments live only as long as the tab.
    Memory(MemoryObjectStore),
}

impl StoreBackend {
    pub fn from_url(store_url: Option<&str>) -> Self {
        match store_url {
            Some(url) => {
                tracing::info!(url, "Using remote object store");
                Self::Http(HttpObjectStore::new(url))
            }
            None => {
                tracing::info!("No store URL configured, comments are kept in memory");
                Self::Memory(MemoryObjectStore::new())
            }
        }
    }
}

impl ObjectStore for StoreBackend {
    async fn create(&self, kind: &str, fields: Fields) -> Result<StoredObject, StoreError> {
        match self {
            Self::Http(store) => store.create(kind, fields).await,
            Self::Memory(store) => store.create(kind, fields).await,
        }
    }

    async fn list(
        &self,
        kind: &str,
        limit: usize,
        most_recent_first: bool,
    ) -> Result<ObjectList, StoreError> {
        match self {
            Self::Http(store) => store.list(kind, limit, most_recent_first).await,
            Self::Memory(store) => store.list(kind, limit, most_recent_first).await,
        }
    }

    async fn get(&self, kind: &str, id: &str) -> Result<StoredObject, StoreError> {
        match self {
            Self::Http(store) => store.get(kind, id).await,
            Self::Memory(store) => store.get(kind, id).await,
        }
    }

    async fn update(&self, kind: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        match self {
            Self::Http(store) => store.update(kind, id, fields).await,
            Self::Memory(store) => store.update(kind, id, fields).await,
        }
    }
}
