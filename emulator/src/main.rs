// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use clap::Parser;
use imds_emulator::application::Application;
use imds_emulator::configuration::EmulatorOptions;
use imds_emulator::constants;
use imds_emulator::emulator::MetadataEmulator;
use imds_emulator::signals::{PhaseEmitter, spawn_signal_logger};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // get configuration options from flags or environment variables
    let options = EmulatorOptions::parse();

    init_tracing(options.log_json);

    tracing::info!("[emulator] {:?}", &options);

    let (emitter, receiver) = PhaseEmitter::channel();
    let logger = spawn_signal_logger(receiver);
    let emulator = MetadataEmulator::new(&options, emitter);

    let application = match Application::build(&options, emulator).await {
        Ok(application) => application,
        Err(err) => {
            tracing::error!("[emulator] {}", err);
            return Err(err.into());
        }
    };

    application.run_until_signal(shutdown_signal()).await?;

    // the router (and with it the last emitter) is gone, so the logger drains and exits
    match tokio::time::timeout(constants::SHUTDOWN_DRAIN_TIMEOUT, logger).await {
        Ok(progress) => {
            let progress = progress?;
            tracing::info!("[emulator] attack chain summary: {}", progress);
        }
        Err(_) => tracing::warn!("[emulator] timed out waiting for phase signals to drain"),
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            // this needs to be set to remove duplicated information in the log.
            .with_current_span(false)
            .with_ansi(false)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("[emulator] unable to listen for shutdown signal: {:?}", err);
        std::future::pending::<()>().await;
    }

    tracing::info!("[emulator] shutting down");
}
