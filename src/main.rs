use anyhow::Context;
use clap::{Parser, Subcommand};
use listsync::{
    read_config, ready_to_stage, sync_lists, FileSite, ListNames, Secret, SyncConfig, Tier,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Listsync - keeps the content, test coordination and test review lists in
/// step with the packaging pipeline
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Update the lists after a packaging run
    Update(RunArgs),

    /// Report whether the packaged version is ready to stage
    StageCheck(RunArgs),

    /// Create an empty site document for local runs
    InitSite {
        /// Site document to create
        #[arg(long, env = "LISTSYNC_STORE")]
        store: PathBuf,

        /// Only accept this user (requires --password)
        #[arg(long, requires = "password")]
        user: Option<String>,

        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Site document standing in for the collaboration site
    #[arg(long, env = "LISTSYNC_STORE")]
    store: PathBuf,

    /// JSON configuration file; flags override its values
    #[arg(long, env = "LISTSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// URL of the system the package was uploaded to; the tier is derived
    /// from it ("prd" = production, "tst" = test)
    #[arg(long, env = "LISTSYNC_TARGET_URL")]
    target_url: Option<String>,

    /// Target tier (production, test, other); takes precedence over --target-url
    #[arg(long)]
    target_tier: Option<Tier>,

    #[arg(long)]
    product_name: Option<String>,

    #[arg(long)]
    product_version: Option<String>,

    /// Production self-service policy name; omit for untested runs
    #[arg(long)]
    final_policy_name: Option<String>,

    #[arg(long)]
    major_version: Option<String>,

    #[arg(long)]
    language: Option<String>,

    #[arg(long)]
    license: Option<String>,

    #[arg(long)]
    platform: Option<String>,

    /// Package category (the production category)
    #[arg(long)]
    category: Option<String>,

    /// Category of the testing policy
    #[arg(long)]
    current_category: Option<String>,

    #[arg(long)]
    executable_command: Option<String>,

    #[arg(long)]
    process_name: Option<String>,

    #[arg(long, env = "LISTSYNC_SITE_URL")]
    site_url: Option<String>,

    #[arg(long, env = "LISTSYNC_SITE_USER")]
    site_user: Option<String>,

    #[arg(long, env = "LISTSYNC_SITE_PASSWORD", hide_env_values = true)]
    site_password: Option<String>,
}

fn set(target: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn set_optional(target: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *target = value;
    }
}

impl RunArgs {
    async fn into_config(self) -> anyhow::Result<(FileSite, SyncConfig)> {
        let mut config = match &self.config {
            Some(path) => read_config(path)
                .await
                .with_context(|| format!("Failed to read config {}", path.display()))?,
            None => SyncConfig::default(),
        };

        if let Some(tier) = self.target_tier {
            config.target_tier = tier;
        } else if let Some(url) = &self.target_url {
            config.target_tier = Tier::from_target_url(url);
        }

        set(&mut config.product_name, self.product_name);
        set(&mut config.version, self.product_version);
        set_optional(&mut config.final_policy_name, self.final_policy_name);
        set_optional(&mut config.major_version, self.major_version);
        set_optional(&mut config.language, self.language);
        set_optional(&mut config.license, self.license);
        set_optional(&mut config.platform, self.platform);
        set(&mut config.category, self.category);
        set(&mut config.current_category, self.current_category);
        set_optional(&mut config.executable_command, self.executable_command);
        set_optional(&mut config.process_name, self.process_name);
        set(&mut config.site_endpoint, self.site_url);
        set(&mut config.site_user, self.site_user);
        if let Some(password) = self.site_password {
            config.site_password = Secret::new(password);
        }

        Ok((FileSite::new(self.store), config))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Update(run) => {
            let (site, config) = run.into_config().await?;
            info!(tier = %config.target_tier, store = %site.path().display(), "Starting list update");
            let report = sync_lists(&site, &config).await?;
            if report.skipped {
                info!("No lists were updated");
            }
        }
        Command::StageCheck(run) => {
            let (site, config) = run.into_config().await?;
            let ready = ready_to_stage(&site, &config).await?;
            println!("Ready To Stage: {}", ready);
        }
        Command::InitSite {
            store,
            user,
            password,
        } => {
            let users: BTreeMap<String, String> = user.zip(password).into_iter().collect();
            let site = FileSite::new(store);
            site.init(ListNames::default().column_defaults(), users)
                .await?;
            info!("Created site document {}", site.path().display());
        }
    }

    Ok(())
}
