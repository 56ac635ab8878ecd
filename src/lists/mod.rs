//! Names and values shared by the content, test coordination and test review lists.

mod status;

pub use status::{CoordinationStatus, Flag};

use crate::store::Fields;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field names as they appear on the collaboration site.
pub mod field {
    /// Record identifier, always returned by a query
    pub const ID: &str = "ID";

    pub const SELF_SERVICE_CONTENT: &str = "Self Service Content";
    pub const UNTESTED_VERSION: &str = "Untested Version";
    pub const CATEGORY: &str = "Category";
    pub const CONTENT_TYPE: &str = "Content Type";
    pub const AUTOSTAGE: &str = "Autostage";
    pub const PROD_VERSION: &str = "Prod. Version";
    pub const TEST_REPORT: &str = "Test Report";

    pub const SELF_SERVICE_CONTENT_NAME: &str = "Self Service Content Name";
    pub const FINAL_CONTENT_NAME: &str = "Final Content Name";
    pub const RELEASE_COMPLETED: &str = "Release Completed";
    pub const STATUS: &str = "Status";

    pub const RELEASE_COMPLETED_TST: &str = "Release Completed TST";
    pub const RELEASE_COMPLETED_PRD: &str = "Release Completed PRD";
    pub const READY_FOR_PRODUCTION: &str = "Ready for Production";
    pub const EXECUTABLE_COMMAND: &str = "Executable_Command";
    pub const PROCESS_NAME: &str = "Process_Name";
}

/// Value written to `Content Type` for packaged applications
pub const CONTENT_TYPE_APPLICATION: &str = "Application";

/// Names of the lists on the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListNames {
    pub content_list: String,
    pub test_coordination: String,
    pub test_review: String,
    /// Only read by the stage check
    pub content_test: String,
}

impl Default for ListNames {
    fn default() -> Self {
        Self {
            content_list: "Jamf Content List".to_string(),
            test_coordination: "Jamf Test Coordination".to_string(),
            test_review: "Jamf Test Review".to_string(),
            content_test: "Jamf Content Test".to_string(),
        }
    }
}

impl ListNames {
    /// Column defaults the site applies to newly created items.
    ///
    /// Flag columns start out as `No`. `Status` has no default, so a fresh
    /// coordination entry is not picked up by the "needs review" reset.
    pub fn column_defaults(&self) -> BTreeMap<String, Fields> {
        let no = || Flag::No.to_string();
        let mut defaults = BTreeMap::new();

        defaults.insert(
            self.content_list.clone(),
            Fields::from([(field::AUTOSTAGE.to_string(), no())]),
        );
        defaults.insert(
            self.test_coordination.clone(),
            Fields::from([(field::RELEASE_COMPLETED.to_string(), no())]),
        );
        defaults.insert(
            self.test_review.clone(),
            Fields::from([
                (field::RELEASE_COMPLETED_TST.to_string(), no()),
                (field::RELEASE_COMPLETED_PRD.to_string(), no()),
                (field::READY_FOR_PRODUCTION.to_string(), no()),
            ]),
        );
        defaults.insert(
            self.content_test.clone(),
            Fields::from([(field::READY_FOR_PRODUCTION.to_string(), no())]),
        );

        defaults
    }
}
