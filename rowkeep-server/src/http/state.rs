//! Application state shared across handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::store::RecordStore;

/// Shared application state: one store per served collection
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    collections: BTreeMap<String, Arc<dyn RecordStore>>,
}

impl AppState {
    /// Index stores by their schema's collection name
    pub fn new(stores: Vec<Arc<dyn RecordStore>>) -> Self {
        let collections = stores
            .into_iter()
            .map(|store| (store.schema().collection().to_string(), store))
            .collect();

        Self {
            inner: Arc::new(AppStateInner { collections }),
        }
    }

    pub fn collection(&self, name: &str) -> Option<&Arc<dyn RecordStore>> {
        self.inner.collections.get(name)
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.inner.collections.keys().map(String::as_str)
    }
}
