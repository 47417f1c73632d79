// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::serve::Serve;
use tokio::net::TcpListener;

use crate::configuration::EmulatorOptions;
use crate::constants;
use crate::emulator::MetadataEmulator;
use crate::errors::AppError;
use crate::routes;

pub struct AppState {
    pub emulator: MetadataEmulator,
}

pub struct Application {
    port: u16,
    server: Serve<TcpListener, Router, Router>,
}

impl Application {
    /// Binds the configured address. A bind error is fatal for startup.
    pub async fn build(
        options: &EmulatorOptions,
        emulator: MetadataEmulator,
    ) -> Result<Self, AppError> {
        let address = options.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|err| AppError::bind(address.as_str(), &err))?;
        let policy = emulator.policy();
        let server = run(listener, emulator);
        let port = server.local_addr()?.port();

        tracing::info!(
            "[emulator] metadata service live at http://{}:{} (policy: {})",
            options.host,
            port,
            policy
        );

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }

    pub async fn run_until_signal<F>(self, signal: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.server.with_graceful_shutdown(signal).await
    }
}

pub fn create_router(emulator: MetadataEmulator) -> Router {
    let state = Arc::new(AppState { emulator });

    Router::new()
        .fallback(routes::dispatch)
        .layer(DefaultBodyLimit::max(constants::MAX_BODY_SIZE))
        .with_state(state)
}

#[tracing::instrument(skip(listener, emulator))]
pub fn run(
    listener: TcpListener,
    emulator: MetadataEmulator,
) -> Serve<TcpListener, Router, Router> {
    let app = create_router(emulator);
    axum::serve(listener, app)
}
