//! vaultpost CLI

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use vaultpost::report::{render_categories, render_report};
use vaultpost::settings::{init_settings_file, redacted_yaml};
use vaultpost::{
    CliOverrides, ForumClient, LogNotifier, PromptSelector, Publisher, SyncConfig, VaultManager,
    choose_category, load_settings,
};

/// Publish Obsidian notes to a Discourse forum
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file
    #[arg(short, long, env = "VAULTPOST_CONFIG", default_value = "vaultpost.yaml", global = true)]
    config: PathBuf,

    /// Vault directory (overrides the settings file)
    #[arg(short, long, global = true)]
    vault: Option<PathBuf>,

    /// Forum base URL (overrides the settings file)
    #[arg(long, global = true)]
    forum_url: Option<String>,

    /// Forum username the API key acts as
    #[arg(long, global = true)]
    username: Option<String>,

    /// Log filter, e.g. `info` or `vaultpost=debug`
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a note's embeds and create a topic from it
    Publish {
        /// Vault-relative path of the note
        note: PathBuf,

        /// Category id to post into
        #[arg(long, conflicts_with = "pick")]
        category: Option<u64>,

        /// Choose the category from the forum's list
        #[arg(long)]
        pick: bool,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the forum's categories
    Categories,

    /// Manage the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a starter settings file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective settings with the API key hidden
    Show,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let Args {
        config,
        vault,
        forum_url,
        username,
        log_level,
        log_format,
        command,
    } = Args::parse();

    if let Command::Config {
        action: ConfigAction::Init { force },
    } = command
    {
        init_logging(log_format, log_level.as_deref().unwrap_or("info"))?;
        init_settings_file(&config, force).await?;
        println!("Wrote {}", config.display());
        return Ok(ExitCode::SUCCESS);
    }

    let overrides = CliOverrides {
        vault_path: vault,
        base_url: forum_url,
        api_username: username,
        category: None,
        log_level,
    };
    let settings = load_settings(&config, &overrides)
        .with_context(|| format!("Failed to load settings ({})", config.display()))?;
    init_logging(log_format, &settings.log_level)?;

    log::debug!("vaultpost v{}", env!("CARGO_PKG_VERSION"));

    match command {
        Command::Publish {
            note,
            category,
            pick,
            json,
        } => publish(settings, &note, category, pick, json).await,
        Command::Categories => {
            let client = ForumClient::new(settings.forum)?;
            let categories = client.fetch_categories().await?;
            print!("{}", render_categories(&categories));
            Ok(ExitCode::SUCCESS)
        }
        // `config init` has already returned above
        Command::Config { .. } => {
            print!("{}", redacted_yaml(&settings)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn publish(
    settings: SyncConfig,
    note: &Path,
    category: Option<u64>,
    pick: bool,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let vault = Arc::new(VaultManager::new(settings.vault)?);
    let client = ForumClient::new(settings.forum.clone())?;

    let category = match (category, pick) {
        (Some(id), _) => id,
        (None, true) => {
            let selector = PromptSelector::new(BufReader::new(std::io::stdin()), std::io::stderr());
            choose_category(&client, &selector).await?
        }
        (None, false) => settings.forum.category,
    };

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling publish");
            trigger.cancel();
        }
    });

    let publisher = Publisher::new(vault, client).with_notifier(Arc::new(LogNotifier));
    let report = publisher.publish_note(note, category, &cancel).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }

    Ok(if report.outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// `text` goes through env_logger, `json` through tracing-subscriber.
/// `RUST_LOG` wins over `level` when set.
fn init_logging(format: LogFormat, level: &str) -> anyhow::Result<()> {
    match format {
        LogFormat::Text => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
                .format_timestamp_millis()
                .try_init()
                .context("Failed to initialize logger")?;
        }
        LogFormat::Json => {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;
        }
    }
    Ok(())
}
