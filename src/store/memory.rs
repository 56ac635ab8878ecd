//! In-process list store.

use super::table::SiteLists;
use super::{
    parse_endpoint, Credentials, Fields, ItemId, ListItem, ListStore, Operation, SiteConnector,
    StoreError,
};
use crate::query::ListQuery;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// List store kept in memory. Clones share the same lists.
#[derive(Debug, Clone, Default)]
pub struct InMemoryListStore {
    state: Arc<Mutex<SiteLists>>,
}

impl InMemoryListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store applying the given column defaults when items are created.
    pub fn with_column_defaults(column_defaults: BTreeMap<String, Fields>) -> Self {
        let lists = SiteLists {
            column_defaults,
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(lists)),
        }
    }

    /// Full items of a list, in creation order.
    pub fn items(&self, list: &str) -> Vec<ListItem> {
        self.lock(Operation::Query, list)
            .map(|state| state.items(list))
            .unwrap_or_default()
    }

    fn lock(&self, operation: Operation, list: &str) -> Result<MutexGuard<'_, SiteLists>, StoreError> {
        self.state
            .lock()
            .map_err(|e| StoreError::operation(operation, list, e.to_string()))
    }
}

#[async_trait]
impl ListStore for InMemoryListStore {
    async fn query(&self, list: &str, query: &ListQuery) -> Result<Vec<ListItem>, StoreError> {
        Ok(self.lock(Operation::Query, list)?.query(list, query))
    }

    async fn create(&self, list: &str, fields: Fields) -> Result<ItemId, StoreError> {
        Ok(self.lock(Operation::Create, list)?.create(list, fields))
    }

    async fn update(&self, list: &str, id: ItemId, fields: Fields) -> Result<(), StoreError> {
        self.lock(Operation::Update, list)?.update(list, id, fields)
    }

    async fn delete(&self, list: &str, id: ItemId) -> Result<(), StoreError> {
        self.lock(Operation::Delete, list)?.delete(list, id)
    }
}

/// Connector handing out sessions on an [`InMemoryListStore`].
///
/// When credentials are configured, `connect` rejects any other pair.
#[derive(Debug, Clone, Default)]
pub struct InMemorySite {
    store: InMemoryListStore,
    credentials: Option<Credentials>,
}

impl InMemorySite {
    pub fn new(store: InMemoryListStore) -> Self {
        Self {
            store,
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn store(&self) -> &InMemoryListStore {
        &self.store
    }
}

#[async_trait]
impl SiteConnector for InMemorySite {
    type Store = InMemoryListStore;

    async fn connect(
        &self,
        endpoint: &str,
        credentials: &Credentials,
    ) -> Result<InMemoryListStore, StoreError> {
        parse_endpoint(endpoint)?;

        if let Some(expected) = &self.credentials {
            if expected != credentials {
                return Err(StoreError::Authentication(format!(
                    "invalid credentials for user '{}'",
                    credentials.user
                )));
            }
        }

        Ok(self.store.clone())
    }
}
