// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! The metadata emulator: token lifecycle plus the disclosure decision.
//!
//! [`MetadataEmulator`] is transport-agnostic. Each `handle_*` operation takes
//! the parts of a request it cares about and returns either a [`Reply`] or an
//! [`AppError`]; both convert into HTTP responses at the routing layer.
//!
//! # Request Kinds
//!
//! 1. **Discovery**: `GET /` returns the discovery fingerprint
//! 2. **Handshake**: `PUT .../latest/api/token` mints the single valid token
//! 3. **Credential lookup**: `GET ...iam/security-credentials...` discloses the
//!    fabricated credential, gated by the [`DisclosurePolicy`]
//! 4. **Generic stimulus**: any `POST` returns a second fingerprint
//!
//! Every recognized request emits exactly one [`PhaseSignal`]. Unrecognized
//! endpoints emit nothing.

use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::configuration::EmulatorOptions;
use crate::constants::{
    CREDENTIALS_PATH_SEGMENT, DISCOVERY_PATH, DISCOVERY_TRIGGER, MAX_REQUESTED_TTL_SECONDS,
    STIMULUS_TRIGGER, TOKEN_PATH_SEGMENT, TOKEN_TTL_HEADER,
};
use crate::errors::AppError;
use crate::models::{DisclosurePolicy, FabricatedCredential};
use crate::signals::{Phase, PhaseEmitter, PhaseSignal};
use crate::tokens::{IssuedToken, TokenStore};

/// Successful outcome of an emulator operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Discovery,
    Token(IssuedToken),
    Credential(FabricatedCredential),
    Stimulus,
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Self::Discovery => (StatusCode::OK, DISCOVERY_TRIGGER).into_response(),
            Self::Token(token) => (
                StatusCode::OK,
                [(TOKEN_TTL_HEADER, token.ttl_seconds().to_string())],
                token.value().to_string(),
            )
                .into_response(),
            Self::Credential(credential) => (StatusCode::OK, Json(credential)).into_response(),
            Self::Stimulus => (StatusCode::OK, STIMULUS_TRIGGER).into_response(),
        }
    }
}

pub struct MetadataEmulator {
    policy: DisclosurePolicy,
    token_ttl: Duration,
    honor_requested_ttl: bool,
    credential: FabricatedCredential,
    tokens: TokenStore,
    emitter: PhaseEmitter,
}

impl MetadataEmulator {
    pub fn new(options: &EmulatorOptions, emitter: PhaseEmitter) -> Self {
        Self {
            policy: options.policy,
            token_ttl: Duration::from_secs(options.token_ttl_seconds),
            honor_requested_ttl: options.honor_requested_ttl,
            credential: FabricatedCredential::synthetic(),
            tokens: TokenStore::new(options.token_strategy, options.enforce_token_ttl),
            emitter,
        }
    }

    pub fn policy(&self) -> DisclosurePolicy {
        self.policy
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Answers the service-root probe with the discovery fingerprint.
    #[tracing::instrument(skip(self))]
    pub fn handle_discovery(&self, path: &str) -> Result<Reply, AppError> {
        if path != DISCOVERY_PATH {
            return Err(AppError::UnrecognizedEndpoint);
        }

        self.emit(Phase::Discovery, "sent discovery trigger to scanner");
        Ok(Reply::Discovery)
    }

    /// Mints a new session token, invalidating whichever token came before.
    ///
    /// `requested_ttl` is the raw value of the client's TTL header. It only
    /// takes effect when the emulator is configured to honor it, and anything
    /// that is not an integer in `1..=21600` falls back to the configured TTL.
    #[tracing::instrument(skip(self))]
    pub async fn handle_token_request(
        &self,
        path: &str,
        requested_ttl: Option<&str>,
    ) -> Result<Reply, AppError> {
        if !path.contains(TOKEN_PATH_SEGMENT) {
            return Err(AppError::UnrecognizedEndpoint);
        }

        let token = self.tokens.issue(self.resolve_ttl(requested_ttl)).await;

        self.emit(
            Phase::Handshake,
            format!("issued IMDSv2 token, ttl {}s", token.ttl_seconds()),
        );
        Ok(Reply::Token(token))
    }

    /// Discloses the fabricated credential if the policy allows it.
    ///
    /// # Errors
    ///
    /// - [`AppError::UnrecognizedEndpoint`] - path lacks the credentials segment
    /// - [`AppError::Unauthorized`] - strict policy and the token check failed
    #[tracing::instrument(skip(self, presented_token))]
    pub async fn handle_credential_lookup(
        &self,
        path: &str,
        presented_token: Option<&str>,
    ) -> Result<Reply, AppError> {
        if !path.contains(CREDENTIALS_PATH_SEGMENT) {
            return Err(AppError::UnrecognizedEndpoint);
        }

        match self.policy {
            DisclosurePolicy::Permissive => {
                let description = match presented_token {
                    Some(_) => "sent mock credentials (token not checked)",
                    None => "sent mock credentials without a token",
                };
                self.emit(Phase::Exfiltration, description);
            }
            DisclosurePolicy::Strict => {
                let verdict = self.tokens.verify(presented_token).await;
                if !verdict.is_valid() {
                    self.emit(
                        Phase::Rejected,
                        format!("refused credential lookup: {}", verdict.describe()),
                    );
                    return Err(AppError::Unauthorized);
                }
                self.emit(Phase::Exfiltration, "sent mock credentials for a valid token");
            }
        }

        Ok(Reply::Credential(self.credential.clone()))
    }

    /// Catch-all trigger for arbitrary payloads. The body is never inspected.
    #[tracing::instrument(skip(self, body))]
    pub fn handle_generic_stimulus(&self, path: &str, body: &[u8]) -> Reply {
        tracing::debug!("[emulator] stimulus body of {} bytes ignored", body.len());

        self.emit(
            Phase::Exfiltration,
            format!("dispatched trigger to POST {path}: {STIMULUS_TRIGGER}"),
        );
        Reply::Stimulus
    }

    fn resolve_ttl(&self, requested_ttl: Option<&str>) -> Duration {
        if !self.honor_requested_ttl {
            return self.token_ttl;
        }

        requested_ttl
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|seconds| (1..=MAX_REQUESTED_TTL_SECONDS).contains(seconds))
            .map_or(self.token_ttl, Duration::from_secs)
    }

    fn emit(&self, phase: Phase, description: impl Into<String>) {
        self.emitter.emit(PhaseSignal::new(phase, description));
    }
}
