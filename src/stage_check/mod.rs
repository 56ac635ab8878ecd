//! Decide whether a tested version may be staged to its target tier.
//!
//! Reads the same lists the reconciler writes and never modifies them.

use crate::config::{ConfigError, SyncConfig, Tier};
use crate::lists::{field, CoordinationStatus, Flag};
use crate::naming::self_service_policy_name;
use crate::query::{exists, Criteria};
use crate::reconcile::SyncError;
use crate::store::{ListStore, SiteConnector, StoreError};
use tracing::info;

/// Connect to the site and run [`check_ready_to_stage`].
pub async fn ready_to_stage<C>(connector: &C, config: &SyncConfig) -> Result<bool, SyncError>
where
    C: SiteConnector,
{
    config.validate_stage_check()?;
    let final_name = config
        .final_policy_name()
        .ok_or(ConfigError::MissingInput("final policy name"))?;
    if config.target_tier == Tier::Other {
        return Err(ConfigError::InvalidTier(config.target_tier).into());
    }

    let store = connector
        .connect(&config.site_endpoint, &config.credentials())
        .await?;
    let ready = check_ready_to_stage(&store, config, final_name).await?;
    info!("Ready To Stage: {}", ready);
    Ok(ready)
}

/// Whether the version passed every gate for the configured tier.
///
/// Test: the review entry is ready for production and not yet released to
/// TST. Production: the review entry passed TST but not PRD, and either the
/// product is autostaged, or content test and test coordination both signed
/// the version off.
pub async fn check_ready_to_stage<S>(
    store: &S,
    config: &SyncConfig,
    final_name: &str,
) -> Result<bool, StoreError>
where
    S: ListStore + ?Sized,
{
    let ssp_name = self_service_policy_name(final_name, &config.version);
    info!("Untested Policy: {} (Testing)", final_name);
    info!("Untested SharePoint Item: {}", ssp_name);

    let gates = Gates {
        store,
        config,
        final_name,
        ssp_name: &ssp_name,
    };

    match config.target_tier {
        Tier::Test => gates.test_review().await,
        Tier::Production => {
            if gates.content_list(true).await? && gates.test_review().await? {
                return Ok(true);
            }
            Ok(gates.content_list(false).await?
                && gates.content_test().await?
                && gates.test_coordination().await?
                && gates.test_review().await?)
        }
        Tier::Other => Ok(false),
    }
}

struct Gates<'a, S: ListStore + ?Sized> {
    store: &'a S,
    config: &'a SyncConfig,
    final_name: &'a str,
    ssp_name: &'a str,
}

impl<S: ListStore + ?Sized> Gates<'_, S> {
    async fn check(&self, list: &str, criteria: Criteria) -> Result<bool, StoreError> {
        let passed = exists(self.store, list, &criteria).await?;
        if passed {
            info!("{} passed: {}", list, passed);
        } else {
            info!("{}: No entry matching {}", list, criteria);
        }
        Ok(passed)
    }

    async fn content_list(&self, autostage: bool) -> Result<bool, StoreError> {
        let mut criteria = Criteria::new()
            .equals(field::SELF_SERVICE_CONTENT, self.final_name)
            .equals(field::UNTESTED_VERSION, self.config.version.as_str());
        if autostage {
            criteria = criteria.equals(field::AUTOSTAGE, Flag::Yes.as_str());
        }
        self.check(&self.config.lists.content_list, criteria).await
    }

    async fn content_test(&self) -> Result<bool, StoreError> {
        let criteria = Criteria::new()
            .equals(field::SELF_SERVICE_CONTENT_NAME, self.ssp_name)
            .equals(field::READY_FOR_PRODUCTION, Flag::Yes.as_str());
        self.check(&self.config.lists.content_test, criteria).await
    }

    async fn test_coordination(&self) -> Result<bool, StoreError> {
        let criteria = Criteria::new()
            .equals(field::SELF_SERVICE_CONTENT_NAME, self.ssp_name)
            .equals(field::STATUS, CoordinationStatus::Done.as_str())
            .equals(field::RELEASE_COMPLETED, Flag::No.as_str());
        self.check(&self.config.lists.test_coordination, criteria).await
    }

    async fn test_review(&self) -> Result<bool, StoreError> {
        let mut criteria = Criteria::new()
            .equals(field::SELF_SERVICE_CONTENT_NAME, self.ssp_name)
            .equals(field::READY_FOR_PRODUCTION, Flag::Yes.as_str());
        criteria = match self.config.target_tier {
            Tier::Production => criteria
                .equals(field::RELEASE_COMPLETED_TST, Flag::Yes.as_str())
                .equals(field::RELEASE_COMPLETED_PRD, Flag::No.as_str()),
            _ => criteria.equals(field::RELEASE_COMPLETED_TST, Flag::No.as_str()),
        };
        self.check(&self.config.lists.test_review, criteria).await
    }
}
