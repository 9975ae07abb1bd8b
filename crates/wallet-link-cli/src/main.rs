/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: A driven wallet link flow with graceful shutdown
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wallet_link_adapter::{AuthFlowController, ChallengeClient, WalletSession};
use wallet_link_cli::{LinkConfig, RunMode, RunOutcome, resolve_session_id, run};

#[derive(Parser, Debug)]
#[command(name = "wallet-link", version, about = "Link a wallet to a pending session")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: PathBuf,
    /// Page URL carrying the session_id query parameter
    #[arg(long = "url", value_name = "URL")]
    url: Option<String>,
    #[arg(long = "session-id", value_name = "ID")]
    session_id: Option<String>,
    /// Wallet to select instead of the configured default
    #[arg(long = "wallet", value_name = "NAME")]
    wallet: Option<String>,
    /// Click through the flow without prompting
    #[arg(long = "yes", short = 'y')]
    yes: bool,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    #[arg(long = "dry-run")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    info!(
        config_path = %args.config_path.display(),
        dry_run = args.dry_run,
        "starting wallet-link"
    );

    let config = load_config(&args.config_path)?;
    let session_id = resolve_session_id(args.url.as_deref(), args.session_id.as_deref())?;
    let registry = config.build_registry().context("build wallet registry")?;
    info!(
        backend_url = %config.backend_url,
        wallets = ?registry.names(),
        has_session = session_id.is_some(),
        "configuration loaded"
    );

    if args.dry_run {
        info!("dry-run requested; configuration validated");
        return Ok(());
    }

    let client = ChallengeClient::with_config(config.client_config(), &config.backend_url)
        .context("create backend client")?;
    let mut controller = AuthFlowController::new(session_id, WalletSession::new(registry), client)
        .context("create flow controller")?;
    controller.start().await;

    if let Some(wallet) = args.wallet.as_deref().or(config.default_wallet.as_deref()) {
        controller.select_wallet(wallet).await;
    }

    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());

    let mode = if args.yes {
        RunMode::Unattended
    } else {
        RunMode::Interactive
    };
    let outcome = run(&mut controller, mode, shutdown).await?;
    info!(?outcome, "wallet link finished");

    match outcome {
        RunOutcome::Linked(_) | RunOutcome::Quit => Ok(()),
        RunOutcome::Cancelled => {
            info!("shutdown signal received");
            Ok(())
        }
        RunOutcome::Failed(failure) => bail!("wallet link failed: {}", failure.detail),
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_config(path: &PathBuf) -> Result<LinkConfig> {
    let path_str = path.to_str().context("config path must be valid utf-8")?;
    LinkConfig::from_file(path_str).context("load config")
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
