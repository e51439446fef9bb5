//! Cover Sync command line entry point.
//!
//! Each invocation loads the configuration and the settings store, forwards
//! one lifecycle event or settings change to the [`CoverImageManager`], and
//! exits.  A reader application (or a shell hook) calls it on document open
//! and close; the settings subcommands back a settings menu.
//!
//! # Usage
//!
//! ```text
//! cover-sync [OPTIONS] <COMMAND>
//!
//! Commands:
//!   open <PATH>            A document was opened
//!   close                  The open document was closed
//!   set-path <PATH>        Change the target image path
//!   set-fallback <PATH>    Change the fallback image path ("" clears it)
//!   toggle-enabled         Flip the master switch
//!   toggle-fallback        Flip fallback mode
//!   toggle-exclude         Flip the exclusion flag of --document
//!   status                 Print configuration and target state
//!
//! Options:
//!   --config-dir <DIR>     Config directory [env: COVER_SYNC_CONFIG_DIR]
//!   -d, --document <PATH>  Document that is currently open
//! ```
//!
//! # Startup order
//!
//! 1. `config.toml` is read so its `log_level` can seed the log filter.
//! 2. `tracing_subscriber` is initialised; `RUST_LOG` wins over the config.
//! 3. The settings store, cover source, notifier and path validator are
//!    wired into a manager.  Construction never touches the target file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cover_sync::application::sync_cover::{CoverImageManager, CoverStatus, DocumentHandle};
use cover_sync::infrastructure::cover_source::SidecarCoverSource;
use cover_sync::infrastructure::notify::TracingNotifier;
use cover_sync::infrastructure::storage::config::{self, CONFIG_DIR_ENV};
use cover_sync::infrastructure::storage::document::JsonDocumentSettings;
use cover_sync::infrastructure::storage::settings::TomlSettingsStore;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Keeps a screensaver image in sync with the cover of the open document.
#[derive(Debug, Parser)]
#[command(name = "cover-sync", version)]
struct Cli {
    /// Directory holding `config.toml` and, by default, `settings.toml`.
    #[arg(long, global = true, env = CONFIG_DIR_ENV)]
    config_dir: Option<PathBuf>,

    /// Document that is currently open.
    ///
    /// Needed by `toggle-exclude`; for other commands it lets the manager
    /// re-render the cover after a settings change.
    #[arg(short, long, global = true)]
    document: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// A document was opened.
    Open { path: PathBuf },
    /// The open document was closed.
    Close,
    /// Change the target image path.
    SetPath { path: String },
    /// Change the fallback image path; an empty string clears it.
    SetFallback { path: String },
    /// Flip the master switch.
    ToggleEnabled,
    /// Flip fallback mode.
    ToggleFallback,
    /// Flip the exclusion flag of the document given with --document.
    ToggleExclude,
    /// Print configuration and target state.
    Status,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_dir =
        config::config_dir(cli.config_dir.as_deref()).context("locating config directory")?;
    let app_config = config::load_config(&config_dir)
        .with_context(|| format!("loading config from {}", config_dir.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&app_config.general.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings_path = app_config.settings_path(&config_dir);
    let store = TomlSettingsStore::open(&settings_path)
        .with_context(|| format!("opening settings store {}", settings_path.display()))?;
    info!(path = %store.path().display(), "settings store opened");

    let mut manager = CoverImageManager::new(
        Box::new(store),
        Box::new(SidecarCoverSource::new()),
        Box::new(TracingNotifier),
        app_config.validator(),
    );

    if let Some(document) = cli.document.as_deref() {
        manager.attach_document(open_document(document)?);
    }

    let action = match cli.command {
        Command::Open { path } => manager.on_document_opened(open_document(&path)?)?,
        Command::Close => manager.on_document_closed()?,
        Command::SetPath { path } => manager.set_target_path(&path)?,
        Command::SetFallback { path } => {
            manager.set_fallback_path(&path)?;
            print_status(&manager.status());
            return Ok(());
        }
        Command::ToggleEnabled => manager.toggle_enabled()?,
        Command::ToggleFallback => manager.toggle_fallback()?,
        Command::ToggleExclude => manager
            .toggle_exclusion()
            .context("toggling exclusion of --document")?,
        Command::Status => {
            print_status(&manager.status());
            return Ok(());
        }
    };

    info!(?action, "done");
    Ok(())
}

fn open_document(path: &Path) -> anyhow::Result<DocumentHandle> {
    let settings = JsonDocumentSettings::for_document(path)
        .with_context(|| format!("reading settings of {}", path.display()))?;
    debug!(settings = %settings.path().display(), "document settings loaded");
    Ok(DocumentHandle::new(
        path.display().to_string(),
        path,
        Box::new(settings),
    ))
}

fn print_status(status: &CoverStatus) {
    let config = &status.config;
    println!("enabled:           {}", config.enabled);
    println!("target path:       {}", config.target_path);
    match &status.target_problem {
        Some(problem) => println!("target problem:    {}", problem.reason()),
        None => println!("target exists:     {}", status.target_exists),
    }
    println!("fallback:          {}", config.fallback_enabled);
    println!(
        "fallback path:     {} ({})",
        config.fallback_path,
        if status.fallback_valid { "valid" } else { "invalid" }
    );
    if let Some(document) = &status.document {
        println!("document:          {document}");
        println!("excluded:          {}", status.excluded.unwrap_or(false));
        if let Some(available) = status.cover_available {
            println!("cover available:   {available}");
        }
    }
}
