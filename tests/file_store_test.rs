mod common;

use common::{lists, release_config, untested_config, ENDPOINT, PASSWORD, USER};
use listsync::lists::field;
use listsync::{sync_lists, Credentials, FileSite, SiteConnector, SyncError, Tier};
use std::collections::BTreeMap;
use tempfile::tempdir;

async fn init_site(path: &std::path::Path) -> FileSite {
    let site = FileSite::new(path);
    let users = BTreeMap::from([(USER.to_string(), PASSWORD.to_string())]);
    site.init(lists().column_defaults(), users)
        .await
        .expect("Should create site document");
    site
}

#[tokio::test]
async fn test_sync_persists_to_site_document() {
    let temp_dir = tempdir().expect("Should create temp dir");
    let path = temp_dir.path().join("site.json");
    let site = init_site(&path).await;

    sync_lists(&site, &untested_config("Foo", "1.0"))
        .await
        .expect("Should sync 1.0");
    sync_lists(&site, &release_config("Foo", "1.0", Tier::Test))
        .await
        .expect("Should release to TST");

    // a fresh connector sees what the previous runs wrote
    let reopened = FileSite::new(&path);
    let store = reopened
        .connect(ENDPOINT, &Credentials::new(USER, PASSWORD))
        .await
        .expect("Should connect");

    let names = lists();
    let content = store.items(&names.content_list).await.expect("Should read");
    assert_eq!(content.len(), 1);
    assert_eq!(content[0].get(field::UNTESTED_VERSION), Some("1.0"));
    assert_eq!(content[0].get(field::AUTOSTAGE), Some("No"));

    let review = store.items(&names.test_review).await.expect("Should read");
    assert_eq!(review.len(), 1);
    assert_eq!(review[0].get(field::RELEASE_COMPLETED_TST), Some("Yes"));
    assert_eq!(review[0].get(field::RELEASE_COMPLETED_PRD), Some("No"));

    assert!(!path.with_extension("json.tmp").exists());
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let temp_dir = tempdir().expect("Should create temp dir");
    let path = temp_dir.path().join("site.json");
    let site = init_site(&path).await;

    let mut config = untested_config("Foo", "1.0");
    config.site_password = listsync::Secret::new("wrong");

    let result = sync_lists(&site, &config).await;
    assert!(matches!(result, Err(SyncError::Authentication(_))));
}

#[tokio::test]
async fn test_missing_document_is_an_authentication_error() {
    let temp_dir = tempdir().expect("Should create temp dir");
    let site = FileSite::new(temp_dir.path().join("missing.json"));

    let result = sync_lists(&site, &untested_config("Foo", "1.0")).await;
    assert!(matches!(result, Err(SyncError::Authentication(_))));
}
