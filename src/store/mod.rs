//! Access to the lists on the collaboration site.
//!
//! [`ListStore`] is the port the reconciler talks to. The transport behind it
//! is not part of this crate: [`memory`] keeps the lists in process and
//! [`file`] keeps them in a JSON document standing in for the site.

pub mod file;
pub mod memory;
mod table;

pub use file::{FileListStore, FileSite};
pub use memory::{InMemoryListStore, InMemorySite};

use crate::query::ListQuery;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Identifier the site assigns to a list item
pub type ItemId = u64;

/// Field name -> value mapping of one list item
pub type Fields = BTreeMap<String, String>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not connect to site: {0}")]
    Authentication(String),

    #[error("{operation} on list '{list}' failed: {message}")]
    Operation {
        operation: Operation,
        list: String,
        message: String,
    },
}

impl StoreError {
    pub fn operation(operation: Operation, list: &str, message: impl Into<String>) -> Self {
        StoreError::Operation {
            operation,
            list: list.to_string(),
            message: message.into(),
        }
    }
}

/// The four remote calls a store performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Query,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Query => "Query",
            Operation::Create => "Create",
            Operation::Update => "Update",
            Operation::Delete => "Delete",
        };
        f.write_str(name)
    }
}

/// A list item as returned by a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: ItemId,
    pub fields: Fields,
}

impl ListItem {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

/// Site user and password
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Read and write access to the lists of one site session.
///
/// Calls are issued one at a time by the reconciler. Implementations must not
/// cache query results across calls: every query reflects all mutations that
/// completed before it.
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Items of `list` matching the query condition, restricted to the query's
    /// fields. Every item carries its [`ItemId`].
    async fn query(&self, list: &str, query: &ListQuery) -> Result<Vec<ListItem>, StoreError>;

    /// Create an item with the given fields.
    async fn create(&self, list: &str, fields: Fields) -> Result<ItemId, StoreError>;

    /// Overwrite the given fields of an existing item.
    async fn update(&self, list: &str, id: ItemId, fields: Fields) -> Result<(), StoreError>;

    async fn delete(&self, list: &str, id: ItemId) -> Result<(), StoreError>;
}

/// Opens a session on a site.
#[async_trait]
pub trait SiteConnector: Send + Sync {
    type Store: ListStore;

    /// Fails with [`StoreError::Authentication`] on bad credentials or an
    /// unreachable endpoint.
    async fn connect(
        &self,
        endpoint: &str,
        credentials: &Credentials,
    ) -> Result<Self::Store, StoreError>;
}

/// Endpoint check shared by the bundled connectors
pub(crate) fn parse_endpoint(endpoint: &str) -> Result<url::Url, StoreError> {
    url::Url::parse(endpoint)
        .map_err(|e| StoreError::Authentication(format!("invalid site endpoint '{}': {}", endpoint, e)))
}
