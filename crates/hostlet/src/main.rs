//! Native messaging host entry point.
//!
//! The browser invokes this binary with no arguments and drives it with
//! framed requests on stdin. All logging goes to stderr; stdout belongs to
//! the protocol.

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use hostlet::{Host, LauncherConfig, ServerLauncher};

/// Initialize tracing with HOSTLET_LOG and LOG_FORMAT support.
fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match std::env::var("HOSTLET_LOG").as_deref() {
            Ok("trace") => "trace",
            Ok("debug") => "debug",
            Ok("warn") | Ok("warning") => "warn",
            Ok("error") => "error",
            _ => "info",
        };
        EnvFilter::new(format!("hostlet={level}"))
    };

    let use_json = std::env::var("LOG_FORMAT").as_deref() == Ok("json");

    if use_json {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("hostlet {}", env!("CARGO_PKG_VERSION"));

    let launcher = ServerLauncher::new(LauncherConfig::new());

    Host::new(tokio::io::stdin(), tokio::io::stdout(), launcher)
        .run()
        .await
        .context("extension channel failed")?;

    Ok(())
}
