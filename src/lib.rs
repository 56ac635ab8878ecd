pub mod config;
pub mod lists;
pub mod naming;
pub mod query;
pub mod reconcile;
pub mod stage_check;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use config::{read_config, ConfigError, Secret, SyncConfig, Tier};
pub use lists::{CoordinationStatus, Flag, ListNames};
pub use naming::{final_policy_name, test_report_link, PolicyNames, ProductAttributes};
pub use query::{build_query, exists, Condition, Criteria, ListQuery, Operator};
pub use reconcile::{
    reconcile_release, reconcile_untested, sync_lists, AppliedMutation, Flow, MutationKind,
    SyncError, SyncReport,
};
pub use stage_check::{check_ready_to_stage, ready_to_stage};
pub use store::{
    Credentials, Fields, FileListStore, FileSite, InMemoryListStore, InMemorySite, ItemId,
    ListItem, ListStore, SiteConnector, StoreError,
};
