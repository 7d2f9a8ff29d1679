use std::future::Future;

use anyhow::Context;
use block_gaps::{
    config::{self, ConfigArgs},
    log,
};
use clap::Parser;
#[cfg(unix)]
use futures::future::select_all;
use tracing::{info, warn};

/// Reports block numbers missing from the blocks table, from block zero up to the stored head.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
}

/// Registers handlers for SIGINT, SIGTERM, SIGHUP and SIGQUIT right away, so a signal arriving
/// before the returned future is first polled is not lost to the default action.
fn install_shutdown_signal() -> impl Future<Output = ()> {
    #[cfg(unix)]
    let mut signals = {
        use tokio::signal::unix::{signal, SignalKind};

        let mut signals = Vec::new();
        for kind in [
            SignalKind::interrupt(),
            SignalKind::terminate(),
            SignalKind::hangup(),
            SignalKind::quit(),
        ] {
            match signal(kind) {
                Ok(stream) => signals.push(stream),
                Err(err) => warn!(?kind, %err, "failed to install signal handler"),
            }
        }
        signals
    };

    async move {
        #[cfg(unix)]
        {
            if !signals.is_empty() {
                let receivers = signals.iter_mut().map(|stream| Box::pin(stream.recv()));
                select_all(receivers).await;
                info!("termination signal received");
                return;
            }
        }

        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(%err, "failed to listen for ctrl-c, scan can only be stopped by killing it");
            std::future::pending::<()>().await;
        }
    }
}

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load(&cli.config).context("failed to load config")?;

    log::init(config.debug);

    if let Some(path) = &config.source {
        warn!(path = %path.display(), "using config file");
    }

    let shutdown = install_shutdown_signal();

    block_gaps::check_blocks_gaps(&config, shutdown).await?;

    Ok(())
}
