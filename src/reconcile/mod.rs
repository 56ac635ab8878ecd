//! State reconciliation across the content, test coordination and test review
//! lists.
//!
//! One run handles one packaging event. Without a final policy name the run
//! is an untested run, which only happens on production; with one it is a
//! release run for the tier the package was staged to. The lists are written
//! in a fixed order because later existence checks depend on earlier writes.
//!
//! Check-then-act sequences are not atomic: a concurrent writer on the site
//! can change an entry between the check and the write. Nothing here locks
//! the site, and a failed call leaves earlier writes in place.

mod execute;
mod plan;

pub use execute::{AppliedMutation, MutationKind, StepRunner};
pub use plan::{Assignments, Step};

use crate::config::{ConfigError, SyncConfig, Tier};
use crate::naming::{test_report_link, PolicyNames};
use crate::query::exists;
use crate::store::{ListStore, SiteConnector, StoreError};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Remote operation error: {0}")]
    RemoteOperation(StoreError),
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Authentication(message) => SyncError::Authentication(message),
            other => SyncError::RemoteOperation(other),
        }
    }
}

/// Which of the two flows a run took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Untested,
    Release,
}

/// What a run did
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub flow: Flow,
    pub names: PolicyNames,
    /// Untested run outside production: nothing was written
    pub skipped: bool,
    pub mutations: Vec<AppliedMutation>,
}

/// Bring the three lists in line with one packaging event.
///
/// The configuration is validated before the site is contacted.
pub async fn sync_lists<C>(connector: &C, config: &SyncConfig) -> Result<SyncReport, SyncError>
where
    C: SiteConnector,
{
    config.validate()?;

    let (flow, names) = match config.final_policy_name() {
        None => (
            Flow::Untested,
            PolicyNames::untested(&config.product(), &config.version),
        ),
        Some(final_name) => (Flow::Release, PolicyNames::release(final_name, &config.version)),
    };
    log_inputs(flow, &names, config);

    if flow == Flow::Untested && config.target_tier != Tier::Production {
        info!(
            tier = %config.target_tier,
            "Untested recipes only update the lists from production, nothing to do"
        );
        return Ok(SyncReport {
            flow,
            names,
            skipped: true,
            mutations: Vec::new(),
        });
    }

    let store = connector
        .connect(&config.site_endpoint, &config.credentials())
        .await?;

    let mutations = match flow {
        Flow::Untested => reconcile_untested(&store, config, &names).await?,
        Flow::Release => reconcile_release(&store, config, &names).await?,
    };

    info!(count = mutations.len(), "Lists synchronised");
    Ok(SyncReport {
        flow,
        names,
        skipped: false,
        mutations,
    })
}

fn log_inputs(flow: Flow, names: &PolicyNames, config: &SyncConfig) {
    match flow {
        Flow::Untested => info!(
            "UNTESTED recipe type: Sending updates to SharePoint based on Policy Name {}",
            names.final_name
        ),
        Flow::Release => info!("PROD recipe type: Sending staging instructions to SharePoint"),
    }
    info!("Name: {}", config.product_name);
    info!("Title: {}", names.final_name);
    info!("Policy: {}", names.policy_name);
    info!("Version: {}", config.version);
    info!("SharePoint item: {}", names.self_service_name);
    info!("Production Category: {}", config.category);
    info!("Current Category: {}", config.current_category);
}

/// Read the autostage flag of the product's content list entry.
async fn read_autostage<S>(store: &S, list: &str, final_name: &str) -> Result<bool, StoreError>
where
    S: ListStore + ?Sized,
{
    let autostage = exists(store, list, &plan::autostage_criteria(final_name)).await?;
    if autostage {
        info!("{}: {} is set to Autostage", list, final_name);
    } else {
        info!("{}: {} is not set to Autostage", list, final_name);
    }
    Ok(autostage)
}

/// Untested run: record the new untested version and open fresh testing
/// entries, retiring the ones of the previous version.
///
/// The autostage flag is read once, after the content list is written and
/// before test coordination is touched.
pub async fn reconcile_untested<S>(
    store: &S,
    config: &SyncConfig,
    names: &PolicyNames,
) -> Result<Vec<AppliedMutation>, StoreError>
where
    S: ListStore + ?Sized,
{
    let lists = &config.lists;
    let mut runner = StepRunner::new(store);

    runner
        .run(
            &lists.content_list,
            plan::content_list_untested(names, &config.version, &config.category),
        )
        .await?;

    let autostage = read_autostage(store, &lists.content_list, &names.final_name).await?;

    runner
        .run(
            &lists.test_coordination,
            plan::coordination_untested(names, autostage),
        )
        .await?;

    runner
        .run(
            &lists.test_review,
            plan::review_untested(
                names,
                config.executable_command.as_deref().unwrap_or_default(),
                config.process_name.as_deref().unwrap_or_default(),
            ),
        )
        .await?;

    Ok(runner.into_mutations())
}

/// Release run: mark the version as released for the target tier, and on
/// production move it into the content list's production version.
pub async fn reconcile_release<S>(
    store: &S,
    config: &SyncConfig,
    names: &PolicyNames,
) -> Result<Vec<AppliedMutation>, StoreError>
where
    S: ListStore + ?Sized,
{
    let lists = &config.lists;
    let tier = config.target_tier;
    let mut runner = StepRunner::new(store);

    runner
        .run(&lists.test_coordination, plan::coordination_release(names))
        .await?;

    // Release Completed on test coordination is only set from production
    if tier == Tier::Production {
        let autostage = read_autostage(store, &lists.content_list, &names.final_name).await?;
        runner
            .run(
                &lists.test_coordination,
                plan::coordination_release_gate(names, autostage),
            )
            .await?;
    }

    runner
        .run(&lists.test_review, plan::review_release(names, tier))
        .await?;

    if tier == Tier::Production {
        let test_report = test_report_link(&config.site_endpoint, &names.self_service_name);
        runner
            .run(
                &lists.content_list,
                plan::content_list_release(names, &config.version, &test_report),
            )
            .await?;
    }

    Ok(runner.into_mutations())
}
