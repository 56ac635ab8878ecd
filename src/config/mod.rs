use crate::lists::ListNames;
use crate::naming::ProductAttributes;
use crate::store::Credentials;
use crate::utils::non_empty;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required input: {0}")]
    MissingInput(&'static str),

    #[error("Unknown target tier '{0}', expected production, test or other")]
    UnknownTier(String),

    #[error("Target tier must be production or test, got {0}")]
    InvalidTier(Tier),
}

/// Deployment stage of the system the packaging run targeted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Production,
    Test,
    #[default]
    Other,
}

impl Tier {
    /// Resolve the tier from the target system URL: `prd` means production,
    /// otherwise `tst` means test. A URL containing both resolves to
    /// production.
    pub fn from_target_url(url: &str) -> Self {
        if url.contains("prd") {
            Tier::Production
        } else if url.contains("tst") {
            Tier::Test
        } else {
            Tier::Other
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Production => "production",
            Tier::Test => "test",
            Tier::Other => "other",
        };
        f.write_str(name)
    }
}

impl FromStr for Tier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" | "prd" => Ok(Tier::Production),
            "test" | "tst" => Ok(Tier::Test),
            "other" => Ok(Tier::Other),
            _ => Err(ConfigError::UnknownTier(s.to_string())),
        }
    }
}

/// A password that never shows up in debug output
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

fn default_current_category() -> String {
    "Untested".to_string()
}

/// Inputs of one synchronisation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    #[serde(default)]
    pub target_tier: Tier,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub version: String,
    /// Production self-service name. Present for release runs, absent for
    /// untested runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_policy_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Package category, which ends up as the production category
    #[serde(default)]
    pub category: String,
    /// Category of the testing policy
    #[serde(default = "default_current_category")]
    pub current_category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
    #[serde(default)]
    pub site_endpoint: String,
    #[serde(default)]
    pub site_user: String,
    #[serde(default)]
    pub site_password: Secret,
    #[serde(default)]
    pub lists: ListNames,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            target_tier: Tier::default(),
            product_name: String::new(),
            version: String::new(),
            final_policy_name: None,
            major_version: None,
            language: None,
            license: None,
            platform: None,
            category: String::new(),
            current_category: default_current_category(),
            executable_command: None,
            process_name: None,
            site_endpoint: String::new(),
            site_user: String::new(),
            site_password: Secret::default(),
            lists: ListNames::default(),
        }
    }
}

impl SyncConfig {
    /// Check the inputs a sync run needs. Runs before any site call.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(&[
            (self.product_name.as_str(), "product name"),
            (self.version.as_str(), "version"),
            (self.category.as_str(), "category"),
        ])?;
        self.validate_site()
    }

    /// Check the inputs a stage check needs. Product attributes and category
    /// are not read, only the final policy name and version.
    pub fn validate_stage_check(&self) -> Result<(), ConfigError> {
        require(&[
            (self.version.as_str(), "version"),
            (
                self.final_policy_name.as_deref().unwrap_or_default(),
                "final policy name",
            ),
        ])?;
        self.validate_site()
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        require(&[
            (self.site_endpoint.as_str(), "site endpoint"),
            (self.site_user.as_str(), "site user"),
            (self.site_password.expose(), "site password"),
        ])
    }

    /// The supplied final policy name, if any. An empty value counts as absent.
    pub fn final_policy_name(&self) -> Option<&str> {
        non_empty(self.final_policy_name.as_deref())
    }

    pub fn product(&self) -> ProductAttributes {
        let segment = |value: &Option<String>| non_empty(value.as_deref()).map(str::to_string);
        ProductAttributes {
            name: self.product_name.clone(),
            major_version: segment(&self.major_version),
            language: segment(&self.language),
            license: segment(&self.license),
            platform: segment(&self.platform),
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.site_user.clone(), self.site_password.expose())
    }
}

fn require(inputs: &[(&str, &'static str)]) -> Result<(), ConfigError> {
    for &(value, name) in inputs {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingInput(name));
        }
    }
    Ok(())
}

/// Read a JSON configuration file
pub async fn read_config(path: &Path) -> Result<SyncConfig, ConfigError> {
    let content = fs::read_to_string(path).await?;
    let config: SyncConfig = serde_json::from_str(&content)?;
    Ok(config)
}
