// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum AppError {
    #[error("unrecognized endpoint")]
    UnrecognizedEndpoint,
    #[error("unauthorized")]
    Unauthorized,
    #[error(
        "unable to bind {address}: permission denied. Re-run with elevated privileges (e.g. sudo) or choose a port above 1024"
    )]
    BindPermissionDenied { address: String },
    #[error("unable to bind {address}: {reason}")]
    BindFailure { address: String, reason: String },
    #[error("internal server error")]
    InternalServerError,
}

impl AppError {
    pub fn bind(address: impl Into<String>, source: &std::io::Error) -> Self {
        let address = address.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::BindPermissionDenied { address },
            _ => Self::BindFailure {
                address,
                reason: source.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // IMDS answers protocol failures with a bare status line
            Self::UnrecognizedEndpoint => StatusCode::NOT_FOUND.into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::BindPermissionDenied { .. }
            | Self::BindFailure { .. }
            | Self::InternalServerError => {
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = Json(json!({
                    "code": status.as_u16(),
                    "message": "Internal Server Error"
                }));

                (status, body).into_response()
            }
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(_source: std::io::Error) -> Self {
        tracing::error!("{:?}", _source);
        AppError::InternalServerError
    }
}
