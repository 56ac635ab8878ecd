//! List store persisted as a JSON document.
//!
//! Stands in for the remote site when running the binary locally. Every call
//! reads the document, applies the change and writes it back atomically, so
//! the file always reflects the last completed call.

use super::table::SiteLists;
use super::{
    parse_endpoint, Credentials, Fields, ItemId, ListItem, ListStore, Operation, SiteConnector,
    StoreError,
};
use crate::query::ListQuery;
use crate::utils::now_iso;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

/// On-disk layout of a site document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteDocument {
    #[serde(default)]
    pub updated_at: String,

    /// user -> password; an empty map accepts any credentials
    #[serde(default)]
    pub users: BTreeMap<String, String>,

    #[serde(flatten)]
    pub lists: SiteLists,
}

/// Connector opening sessions on a site document
#[derive(Debug, Clone)]
pub struct FileSite {
    path: PathBuf,
}

impl FileSite {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write an empty site document with the given column defaults and users.
    pub async fn init(
        &self,
        column_defaults: BTreeMap<String, Fields>,
        users: BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        let document = SiteDocument {
            updated_at: now_iso(),
            users,
            lists: SiteLists {
                column_defaults,
                ..Default::default()
            },
        };
        write_document(&self.path, &document)
            .await
            .map_err(|e| StoreError::operation(Operation::Create, "<site>", e.to_string()))
    }
}

#[async_trait]
impl SiteConnector for FileSite {
    type Store = FileListStore;

    async fn connect(
        &self,
        endpoint: &str,
        credentials: &Credentials,
    ) -> Result<FileListStore, StoreError> {
        parse_endpoint(endpoint)?;

        let document = read_document(&self.path).await.map_err(|e| {
            StoreError::Authentication(format!(
                "site document {} is unreachable: {}",
                self.path.display(),
                e
            ))
        })?;

        if !document.users.is_empty()
            && document.users.get(&credentials.user) != Some(&credentials.password)
        {
            return Err(StoreError::Authentication(format!(
                "invalid credentials for user '{}'",
                credentials.user
            )));
        }

        Ok(FileListStore {
            path: self.path.clone(),
            lock: Arc::new(Mutex::new(())),
        })
    }
}

/// Session on a site document
#[derive(Debug, Clone)]
pub struct FileListStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileListStore {
    async fn load(&self, operation: Operation, list: &str) -> Result<SiteDocument, StoreError> {
        read_document(&self.path)
            .await
            .map_err(|e| StoreError::operation(operation, list, e.to_string()))
    }

    async fn save(
        &self,
        operation: Operation,
        list: &str,
        document: &mut SiteDocument,
    ) -> Result<(), StoreError> {
        document.updated_at = now_iso();
        write_document(&self.path, document)
            .await
            .map_err(|e| StoreError::operation(operation, list, e.to_string()))
    }

    /// Full items of a list, in creation order.
    pub async fn items(&self, list: &str) -> Result<Vec<ListItem>, StoreError> {
        Ok(self.load(Operation::Query, list).await?.lists.items(list))
    }
}

#[async_trait]
impl ListStore for FileListStore {
    async fn query(&self, list: &str, query: &ListQuery) -> Result<Vec<ListItem>, StoreError> {
        let _guard = self.lock.lock().await;
        let document = self.load(Operation::Query, list).await?;
        Ok(document.lists.query(list, query))
    }

    async fn create(&self, list: &str, fields: Fields) -> Result<ItemId, StoreError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load(Operation::Create, list).await?;
        let id = document.lists.create(list, fields);
        self.save(Operation::Create, list, &mut document).await?;
        Ok(id)
    }

    async fn update(&self, list: &str, id: ItemId, fields: Fields) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load(Operation::Update, list).await?;
        document.lists.update(list, id, fields)?;
        self.save(Operation::Update, list, &mut document).await
    }

    async fn delete(&self, list: &str, id: ItemId) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load(Operation::Delete, list).await?;
        document.lists.delete(list, id)?;
        self.save(Operation::Delete, list, &mut document).await
    }
}

#[derive(Debug, thiserror::Error)]
enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

async fn read_document(path: &Path) -> Result<SiteDocument, DocumentError> {
    let content = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Write atomically using temp file + rename
async fn write_document(path: &Path, document: &SiteDocument) -> Result<(), DocumentError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let temp_path = path.with_extension("json.tmp");
    let content = serde_json::to_string_pretty(document)?;
    fs::write(&temp_path, &content).await?;
    fs::rename(&temp_path, path).await?;
    Ok(())
}
