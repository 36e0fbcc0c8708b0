use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use powermon::{http_api, Args, ConsolePrinter, PollTiming, PollingLoop, SharedStateStore};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let store = Arc::new(SharedStateStore::new());

    if args.interactive {
        PollingLoop::new(
            args.device_config(),
            PollTiming::default(),
            ConsolePrinter::new(store),
        )
        .run_forever()
        .await;
        return Ok(());
    }

    let listener = TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("Could not listen on {}", args.listen))?;

    // Held for the life of the process; the loop has no shutdown path here
    let _polling =
        PollingLoop::new(args.device_config(), PollTiming::default(), store.clone()).spawn();

    http_api::serve(listener, store, &args.page)
        .await
        .context("HTTP server failed")?;
    Ok(())
}
