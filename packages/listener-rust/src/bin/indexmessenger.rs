//! `indexmessenger` binary: parses configuration, installs tracing and the
//! optional metrics exporter, then runs the listener until the topic closes or
//! ctrl-c is pressed.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use indexmessenger_listener::telemetry::init_tracing;
use indexmessenger_listener::{ListenOutcome, ListenerArgs, ListenerBootstrap};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = ListenerArgs::parse();
    if let Err(err) = init_tracing(args.log_format) {
        eprintln!("Unable to start IndexMessenger: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(ListenOutcome::Shutdown) => ExitCode::SUCCESS,
        Ok(ListenOutcome::TopicClosed) => ExitCode::FAILURE,
        Err(err) => {
            let cause = format!("{err:#}");
            error!(fatal = true, error = %cause, "Unable to start IndexMessenger");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: ListenerArgs) -> anyhow::Result<ListenOutcome> {
    if let Some(addr) = args.metrics_addr {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("failed to install metrics exporter")?;
        info!(%addr, "Metrics exporter listening");
    }

    let bootstrap = ListenerBootstrap::new(args.to_config());
    let signal = tokio::spawn({
        let shutdown = bootstrap.shutdown_controller();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested");
                shutdown.trigger_shutdown();
            }
        }
    });

    let outcome = bootstrap.run().await;
    signal.abort();
    outcome
}
