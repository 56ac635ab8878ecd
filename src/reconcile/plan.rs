//! Transition tables for the three lists.
//!
//! Each function returns the steps one list goes through for one flow. The
//! tables only describe what to do; guards are evaluated against the store by
//! the executor at the moment the step runs.

use crate::config::Tier;
use crate::lists::{field, CoordinationStatus, Flag, CONTENT_TYPE_APPLICATION};
use crate::naming::PolicyNames;
use crate::query::Criteria;

/// Field assignments, applied in order
pub type Assignments = Vec<(&'static str, String)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Create the entry `key` unless it exists, adding `on_create`; then set
    /// `set` on it.
    Upsert {
        key: (&'static str, String),
        on_create: Assignments,
        set: Assignments,
    },
    /// Set fields on every entry matching `target`. No match, no change.
    Update { target: Criteria, set: Assignments },
    /// Create an entry. The first assignment is its key.
    Create { fields: Assignments },
    /// Delete every entry matching `target`.
    Delete { target: Criteria },
    /// Run `then` if an entry matching `guard` exists, `otherwise` if not.
    Branch {
        guard: Criteria,
        then: Vec<Step>,
        otherwise: Vec<Step>,
    },
}

fn set(field: &'static str, value: impl ToString) -> (&'static str, String) {
    (field, value.to_string())
}

fn content_key(names: &PolicyNames) -> (&'static str, String) {
    (field::SELF_SERVICE_CONTENT, names.final_name.clone())
}

fn testing_key(names: &PolicyNames) -> (&'static str, String) {
    (field::SELF_SERVICE_CONTENT_NAME, names.self_service_name.clone())
}

fn testing_entry(names: &PolicyNames) -> Criteria {
    Criteria::new().equals(field::SELF_SERVICE_CONTENT_NAME, names.self_service_name.as_str())
}

fn final_content(names: &PolicyNames) -> Criteria {
    Criteria::new().equals(field::FINAL_CONTENT_NAME, names.final_name.as_str())
}

/// Content list entries flagged for automatic staging
pub fn autostage_criteria(final_name: &str) -> Criteria {
    Criteria::new()
        .equals(field::SELF_SERVICE_CONTENT, final_name)
        .equals(field::AUTOSTAGE, Flag::Yes.as_str())
}

/// Untested run, content list: record the untested version.
pub fn content_list_untested(names: &PolicyNames, version: &str, category: &str) -> Vec<Step> {
    vec![Step::Upsert {
        key: content_key(names),
        on_create: Vec::new(),
        set: vec![
            set(field::UNTESTED_VERSION, version),
            set(field::CATEGORY, category),
            set(field::CONTENT_TYPE, CONTENT_TYPE_APPLICATION),
        ],
    }]
}

/// Untested run, test coordination.
///
/// A re-packaged version reopens its entry; a new version obsoletes the
/// previous unreleased entry before its own entry is created.
pub fn coordination_untested(names: &PolicyNames, autostage: bool) -> Vec<Step> {
    let reopen = Step::Update {
        target: testing_entry(names).equals(field::RELEASE_COMPLETED, Flag::Yes.as_str()),
        set: vec![set(field::RELEASE_COMPLETED, Flag::No)],
    };

    let existing = if autostage {
        vec![Step::Update {
            target: testing_entry(names)
                .not_equals(field::STATUS, CoordinationStatus::Autostage.as_str()),
            set: vec![set(field::STATUS, CoordinationStatus::Autostage)],
        }]
    } else {
        CoordinationStatus::WORK_STARTED
            .iter()
            .map(|status| Step::Update {
                target: testing_entry(names)
                    .equals(field::RELEASE_COMPLETED, Flag::No.as_str())
                    .equals(field::STATUS, status.as_str()),
                set: vec![set(field::STATUS, CoordinationStatus::NeedsReview)],
            })
            .collect()
    };

    let mut new_entry = vec![set(field::SELF_SERVICE_CONTENT_NAME, &names.self_service_name)];
    new_entry.push(set(field::FINAL_CONTENT_NAME, &names.final_name));
    if autostage {
        new_entry.push(set(field::STATUS, CoordinationStatus::Autostage));
    }

    let fresh = vec![
        Step::Update {
            target: final_content(names)
                .equals(field::RELEASE_COMPLETED, Flag::No.as_str())
                .not_equals(field::STATUS, CoordinationStatus::Obsolete.as_str()),
            set: vec![set(field::STATUS, CoordinationStatus::Obsolete)],
        },
        Step::Create { fields: new_entry },
    ];

    vec![
        reopen,
        Step::Branch {
            guard: testing_entry(names),
            then: existing,
            otherwise: fresh,
        },
    ]
}

/// Untested run, test review.
///
/// A re-packaged version resets its review. A new version removes the
/// previous entry if it never reached TST, marks it skipped for PRD
/// otherwise, and gets an entry of its own.
pub fn review_untested(names: &PolicyNames, executable_command: &str, process_name: &str) -> Vec<Step> {
    let not_in_tst = final_content(names).equals(field::RELEASE_COMPLETED_TST, Flag::No.as_str());
    let not_in_prd = final_content(names).equals(field::RELEASE_COMPLETED_PRD, Flag::No.as_str());

    let reset = vec![Step::Update {
        target: testing_entry(names),
        set: vec![
            set(field::RELEASE_COMPLETED_TST, Flag::No),
            set(field::RELEASE_COMPLETED_PRD, Flag::No),
            set(field::READY_FOR_PRODUCTION, Flag::No),
            set(field::EXECUTABLE_COMMAND, executable_command),
            set(field::PROCESS_NAME, process_name),
        ],
    }];

    let supersede = vec![
        Step::Branch {
            guard: not_in_tst.clone(),
            then: vec![Step::Delete { target: not_in_tst }],
            otherwise: vec![Step::Update {
                target: not_in_prd,
                set: vec![set(field::RELEASE_COMPLETED_PRD, Flag::Skipped)],
            }],
        },
        Step::Create {
            fields: vec![
                set(field::SELF_SERVICE_CONTENT_NAME, &names.self_service_name),
                set(field::FINAL_CONTENT_NAME, &names.final_name),
                set(field::EXECUTABLE_COMMAND, executable_command),
                set(field::PROCESS_NAME, process_name),
            ],
        },
    ];

    vec![Step::Branch {
        guard: testing_entry(names),
        then: reset,
        otherwise: supersede,
    }]
}

/// Release run, test coordination: make sure the entry exists.
pub fn coordination_release(names: &PolicyNames) -> Vec<Step> {
    vec![Step::Upsert {
        key: testing_key(names),
        on_create: vec![set(field::FINAL_CONTENT_NAME, &names.final_name)],
        set: Vec::new(),
    }]
}

/// Release run on production, test coordination: close the entry.
pub fn coordination_release_gate(names: &PolicyNames, autostage: bool) -> Vec<Step> {
    let status = if autostage {
        CoordinationStatus::Autostage
    } else {
        CoordinationStatus::Done
    };
    vec![Step::Update {
        target: testing_entry(names),
        set: vec![
            set(field::RELEASE_COMPLETED, Flag::Yes),
            set(field::STATUS, status),
        ],
    }]
}

/// Release run, test review: pass the gate of the tier released to.
pub fn review_release(names: &PolicyNames, tier: Tier) -> Vec<Step> {
    let gate = match tier {
        Tier::Test => vec![
            set(field::RELEASE_COMPLETED_TST, Flag::Yes),
            // staging may have been forced past the review
            set(field::READY_FOR_PRODUCTION, Flag::Yes),
        ],
        Tier::Production => vec![set(field::RELEASE_COMPLETED_PRD, Flag::Yes)],
        Tier::Other => Vec::new(),
    };
    vec![Step::Upsert {
        key: testing_key(names),
        on_create: vec![set(field::FINAL_CONTENT_NAME, &names.final_name)],
        set: gate,
    }]
}

/// Release run on production, content list: the version is now in production.
pub fn content_list_release(names: &PolicyNames, version: &str, test_report: &str) -> Vec<Step> {
    vec![Step::Upsert {
        key: content_key(names),
        on_create: Vec::new(),
        set: vec![
            set(field::UNTESTED_VERSION, ""),
            set(field::PROD_VERSION, version),
            set(field::TEST_REPORT, test_report),
        ],
    }]
}
