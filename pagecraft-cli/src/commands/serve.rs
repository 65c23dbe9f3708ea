//! Run the web console

use anyhow::{anyhow, Context as _, Result};
use clap::Args;
use console::style;
use pagecraft::prelude::*;

use super::{INFO, WARN};

/// Serve the console over HTTP
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to bind, overriding configuration
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind, overriding configuration
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeCommand {
    /// Start the server and run until interrupted
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be built or the address cannot
    /// be bound.
    pub async fn execute(self, mut config: PagecraftConfig) -> Result<()> {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        let addr = config.server.socket_addr()?;

        let state = ConsoleState::new(config).map_err(|err| anyhow!(err.user_message()))?;
        if let Err(err) = state.session().restore().await {
            eprintln!("{WARN}{}", style(err.user_message()).yellow());
        }

        let app = pagecraft::router::build_router(state.clone());
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("could not bind {addr}"))?;

        println!("{INFO}Console listening on {}", style(format!("http://{addr}")).cyan());
        println!("{INFO}Template service at {}", state.api().base_url());
        tracing::info!(%addr, "console started");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        tracing::info!("console stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "could not listen for ctrl-c");
    }
}
