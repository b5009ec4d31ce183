//! server-side event loop
// (c) 2025 Ross Younger

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use tokio::net::TcpListener;
use tracing::{error, error_span, info, warn, Instrument as _};

use crate::config::Configuration;

mod connection;
mod programmer;

/// Server behaviour knobs, resolved from the CLI and the built-in defaults
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Address to listen on
    pub bind_address: String,
    /// Port to listen on
    pub port: u16,
    /// Programmer tool to invoke
    pub programmer: String,
    /// Bound on a single tool invocation
    pub program_timeout: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        let config = Configuration::system_default();
        Self {
            bind_address: config.bind_address.into(),
            port: config.port,
            programmer: config.programmer.into(),
            program_timeout: config.program_timeout,
        }
    }
}

/// Server entry point: bind and run until interrupted.
pub(crate) async fn server_main(options: ServerOptions) -> anyhow::Result<()> {
    let addr = format!("{}:{}", options.bind_address, options.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("could not bind {addr}"))?;
    info!("listening on {}", listener.local_addr()?);
    serve(listener, options).await
}

/// Accept loop.
///
/// Every accepted connection gets its own task owning its socket (and,
/// later, its temporary file) exclusively; a handler fault is logged here
/// and never reaches the loop. Ctrl-C stops us accepting; in-flight
/// handlers are left to run to completion.
pub async fn serve(listener: TcpListener, options: ServerOptions) -> anyhow::Result<()> {
    let options = Arc::new(options);
    loop {
        let accepted = tokio::select! {
            accepted = listener.accept() => accepted,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received; no longer accepting connections");
                break;
            }
        };
        match accepted {
            Ok((stream, peer)) => {
                let options = Arc::clone(&options);
                let _handler = tokio::spawn(
                    async move {
                        if let Err(e) = connection::handle(stream, &options).await {
                            error!("connection handling failed: {e:#}");
                        }
                    }
                    .instrument(error_span!("conn", %peer)),
                );
            }
            Err(e) => warn!("accept failed: {e}"),
        }
    }
    Ok(())
}
