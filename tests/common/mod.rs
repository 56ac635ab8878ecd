#![allow(dead_code)]

use async_trait::async_trait;
use listsync::store::Operation;
use listsync::{
    Credentials, Fields, InMemoryListStore, InMemorySite, ItemId, ListItem, ListNames, ListQuery,
    ListStore, Secret, SiteConnector, StoreError, SyncConfig, Tier,
};

pub const ENDPOINT: &str = "https://sp.example.com/sites/mac";
pub const USER: &str = "svc-autopkg";
pub const PASSWORD: &str = "correct horse";

pub fn lists() -> ListNames {
    ListNames::default()
}

/// Empty site with the list column defaults and a single user
pub fn create_site() -> InMemorySite {
    let store = InMemoryListStore::with_column_defaults(lists().column_defaults());
    InMemorySite::new(store).with_credentials(Credentials::new(USER, PASSWORD))
}

pub fn untested_config(product: &str, version: &str) -> SyncConfig {
    SyncConfig {
        target_tier: Tier::Production,
        product_name: product.to_string(),
        version: version.to_string(),
        category: "Apps".to_string(),
        site_endpoint: ENDPOINT.to_string(),
        site_user: USER.to_string(),
        site_password: Secret::new(PASSWORD),
        ..Default::default()
    }
}

pub fn release_config(final_name: &str, version: &str, tier: Tier) -> SyncConfig {
    SyncConfig {
        target_tier: tier,
        final_policy_name: Some(final_name.to_string()),
        ..untested_config(final_name, version)
    }
}

pub fn fields(pairs: &[(&str, &str)]) -> Fields {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Add an item directly, bypassing the reconciler
pub async fn seed(store: &InMemoryListStore, list: &str, pairs: &[(&str, &str)]) -> ItemId {
    store
        .create(list, fields(pairs))
        .await
        .expect("Should seed item")
}

/// The single item of `list` whose `field` equals `value`
pub fn entry(store: &InMemoryListStore, list: &str, field: &str, value: &str) -> ListItem {
    let matches: Vec<ListItem> = store
        .items(list)
        .into_iter()
        .filter(|item| item.get(field) == Some(value))
        .collect();
    assert_eq!(
        matches.len(),
        1,
        "Expected exactly one '{}' entry with {}={}, found {:?}",
        list,
        field,
        value,
        matches
    );
    matches.into_iter().next().expect("checked above")
}

/// Every item of the three reconciled lists
pub fn snapshot(store: &InMemoryListStore) -> Vec<Vec<ListItem>> {
    let names = lists();
    vec![
        store.items(&names.content_list),
        store.items(&names.test_coordination),
        store.items(&names.test_review),
    ]
}

/// Store failing every `operation` on `list`
#[derive(Clone)]
pub struct FailingStore {
    pub inner: InMemoryListStore,
    pub operation: Operation,
    pub list: String,
}

impl FailingStore {
    fn check(&self, operation: Operation, list: &str) -> Result<(), StoreError> {
        if operation == self.operation && list == self.list {
            return Err(StoreError::operation(operation, list, "connection reset"));
        }
        Ok(())
    }
}

#[async_trait]
impl ListStore for FailingStore {
    async fn query(&self, list: &str, query: &ListQuery) -> Result<Vec<ListItem>, StoreError> {
        self.check(Operation::Query, list)?;
        self.inner.query(list, query).await
    }

    async fn create(&self, list: &str, fields: Fields) -> Result<ItemId, StoreError> {
        self.check(Operation::Create, list)?;
        self.inner.create(list, fields).await
    }

    async fn update(&self, list: &str, id: ItemId, fields: Fields) -> Result<(), StoreError> {
        self.check(Operation::Update, list)?;
        self.inner.update(list, id, fields).await
    }

    async fn delete(&self, list: &str, id: ItemId) -> Result<(), StoreError> {
        self.check(Operation::Delete, list)?;
        self.inner.delete(list, id).await
    }
}

pub struct FailingSite(pub FailingStore);

#[async_trait]
impl SiteConnector for FailingSite {
    type Store = FailingStore;

    async fn connect(
        &self,
        _endpoint: &str,
        _credentials: &Credentials,
    ) -> Result<FailingStore, StoreError> {
        Ok(self.0.clone())
    }
}
