// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! HTTP route handlers for the metadata emulator.
//!
//! Scanners probe metadata services with loosely formed paths, so requests are
//! matched by verb and path substring rather than by exact route:
//!
//! | Method | Path | Handler | Description |
//! |--------|------|---------|-------------|
//! | GET | `/` | [`discovery`] | Discovery fingerprint |
//! | PUT | contains `/latest/api/token` | [`token`] | IMDSv2 session token |
//! | GET | contains `iam/security-credentials` | [`credentials`] | Fabricated credentials |
//! | POST | any | [`stimulus`] | Generic trigger fingerprint |
//!
//! Everything else is answered with an empty 404.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::{HeaderMap, Method, Uri};

use crate::application::AppState;
use crate::constants::{DISCOVERY_PATH, TOKEN_HEADER, TOKEN_TTL_HEADER};
use crate::emulator::Reply;
use crate::errors::AppError;

/// Routes every request to an emulator operation by verb.
#[tracing::instrument(skip(state, headers, body))]
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Reply, AppError> {
    let path = uri.path();
    // Oversized or unreadable bodies are treated as empty, never rejected
    let body = body.unwrap_or_else(|rejection| {
        tracing::debug!("[emulator] request body dropped: {}", rejection);
        Bytes::new()
    });

    match method {
        Method::GET if path == DISCOVERY_PATH => discovery(&state, path),
        Method::GET => credentials(&state, path, &headers).await,
        Method::PUT => token(&state, path, &headers).await,
        Method::POST => Ok(stimulus(&state, path, &body)),
        _ => {
            tracing::debug!("[emulator] no operation for {} {}", method, path);
            Err(AppError::UnrecognizedEndpoint)
        }
    }
}

/// Service-root probe.
pub fn discovery(state: &AppState, path: &str) -> Result<Reply, AppError> {
    state.emulator.handle_discovery(path)
}

/// IMDSv2 token issuance. The client's TTL header is passed along as-is.
pub async fn token(state: &AppState, path: &str, headers: &HeaderMap) -> Result<Reply, AppError> {
    let requested_ttl = header_str(headers, TOKEN_TTL_HEADER);
    state
        .emulator
        .handle_token_request(path, requested_ttl)
        .await
}

/// Credential lookup, with the session token read from its request header.
pub async fn credentials(
    state: &AppState,
    path: &str,
    headers: &HeaderMap,
) -> Result<Reply, AppError> {
    let presented_token = header_str(headers, TOKEN_HEADER);
    state
        .emulator
        .handle_credential_lookup(path, presented_token)
        .await
}

pub fn stimulus(state: &AppState, path: &str, body: &[u8]) -> Reply {
    state.emulator.handle_generic_stimulus(path, body)
}

// A header that is not valid UTF-8 counts as absent
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
