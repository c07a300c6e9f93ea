//! Command-line entry point for mydns-sync.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use mydns_check::SyncChecker;
use mydns_sync::clock_watch::ClockWatcher;
use mydns_sync::credentials::{
    self, Credential, CredentialPrompt, CredentialStore, KeyringCredentialStore, StdinPrompt,
};
use mydns_sync::{AppConfig, ImmediateSync, SyncCoordinator, SystemClock};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Keeps a MyDNS dynamic-DNS registration in sync with this host.
#[derive(Parser)]
#[command(name = "mydns-sync", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Run the daily sync until interrupted.
    Run,

    /// Check the registration once, right now.
    SyncNow {
        /// Ask for the login if none is stored.
        #[arg(long)]
        prompt: bool,
    },

    /// Store the MyDNS login in the OS credential store.
    Login {
        /// MyDNS master ID.
        #[arg(long)]
        user: String,

        /// Password. Read from stdin when unset.
        #[arg(long, env = "MYDNS_SYNC_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Remove the stored login.
    Logout,

    /// Turn the scheduled daily check on or off.
    AutoSync {
        /// New setting.
        state: Toggle,
    },

    /// Print the effective configuration.
    ShowConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);
    let config = AppConfig::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    config.validate()?;

    let _log_guard = mydns_sync::logging::init(&config.logging)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(config).await,
        Command::SyncNow { prompt } => sync_now(config, prompt).await,
        Command::Login { user, password } => login(&config, user, password),
        Command::Logout => logout(&config),
        Command::AutoSync { state } => auto_sync(config, &config_path, state),
        Command::ShowConfig => show_config(&config),
    }
}

fn checker(config: &AppConfig) -> mydns_sync::Result<Arc<SyncChecker>> {
    config.check.build_checker().map(Arc::new)
}

async fn run(config: AppConfig) -> anyhow::Result<ExitCode> {
    info!(version = env!("CARGO_PKG_VERSION"), "mydns-sync starting");

    let clock = SystemClock::new()?;
    let store: Arc<dyn CredentialStore> = Arc::new(KeyringCredentialStore::new());
    let mut coordinator =
        SyncCoordinator::new(clock, store, checker(&config)?, config.sync.clone());
    coordinator.start().await;

    let handle = coordinator.handle();
    let _clock_watch =
        ClockWatcher::new(&config.clock_watch, move |_| handle.clock_changed()).spawn();

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received");
            }
            cancel.cancel();
        }
    });

    coordinator.run(cancel).await;
    info!("mydns-sync stopped");
    Ok(ExitCode::SUCCESS)
}

async fn sync_now(config: AppConfig, prompt: bool) -> anyhow::Result<ExitCode> {
    let store: Arc<dyn CredentialStore> = Arc::new(KeyringCredentialStore::new());
    let sync = ImmediateSync::new(store, checker(&config)?, config.sync);
    let prompt: Option<Arc<dyn CredentialPrompt>> = if prompt {
        Some(Arc::new(StdinPrompt))
    } else {
        None
    };
    let result = sync.run(prompt).await?;

    println!("{result}");
    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn login(config: &AppConfig, user: String, password: Option<String>) -> anyhow::Result<ExitCode> {
    let password = match password {
        Some(password) => password,
        None => {
            eprint!("password: ");
            let mut line = String::new();
            std::io::stdin()
                .read_line(&mut line)
                .context("reading password from stdin")?;
            line.trim_end_matches(['\r', '\n']).to_owned()
        }
    };
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }

    let store = KeyringCredentialStore::new();
    store.save(
        &config.sync.credential_target,
        &Credential::new(user, password),
    )?;
    println!("Login saved.");
    Ok(ExitCode::SUCCESS)
}

fn logout(config: &AppConfig) -> anyhow::Result<ExitCode> {
    let store = KeyringCredentialStore::new();
    if credentials::remove_credential(&store, &config.sync.credential_target)? {
        println!("Login removed.");
    } else {
        println!("No login was stored.");
    }
    Ok(ExitCode::SUCCESS)
}

fn auto_sync(mut config: AppConfig, path: &Path, state: Toggle) -> anyhow::Result<ExitCode> {
    config.sync.enable_auto_sync = matches!(state, Toggle::On);
    config.save_to_file(path)?;
    info!(
        enable_auto_sync = config.sync.enable_auto_sync,
        path = %path.display(),
        "configuration saved"
    );
    println!(
        "Auto sync {}.",
        if config.sync.enable_auto_sync { "enabled" } else { "disabled" }
    );
    Ok(ExitCode::SUCCESS)
}

fn show_config(config: &AppConfig) -> anyhow::Result<ExitCode> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(ExitCode::SUCCESS)
}
