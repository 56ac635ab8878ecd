use std::fmt;

/// Boolean-as-string values used by the flag columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Yes,
    No,
    /// Only written to `Release Completed PRD` when a newer version supersedes the entry
    Skipped,
}

impl Flag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::Yes => "Yes",
            Flag::No => "No",
            Flag::Skipped => "Skipped",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values of the `Status` column on the test coordination list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinationStatus {
    InProgress,
    Done,
    Deferred,
    WaitingForOtherTestManager,
    NeedsReview,
    Autostage,
    Obsolete,
}

impl CoordinationStatus {
    /// Statuses meaning testing work already happened on an entry.
    /// A re-packaged version in one of these states goes back to review.
    pub const WORK_STARTED: [CoordinationStatus; 4] = [
        CoordinationStatus::InProgress,
        CoordinationStatus::Done,
        CoordinationStatus::Deferred,
        CoordinationStatus::WaitingForOtherTestManager,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinationStatus::InProgress => "In progress",
            CoordinationStatus::Done => "Done",
            CoordinationStatus::Deferred => "Deferred",
            CoordinationStatus::WaitingForOtherTestManager => "Waiting for other test manager",
            CoordinationStatus::NeedsReview => "Needs review",
            CoordinationStatus::Autostage => "Autostage",
            CoordinationStatus::Obsolete => "Obsolete",
        }
    }
}

impl fmt::Display for CoordinationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
