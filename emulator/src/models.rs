// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::constants::{
    CREDENTIAL_ACCESS_KEY_ID, CREDENTIAL_CODE, CREDENTIAL_SECRET_ACCESS_KEY,
    CREDENTIAL_SESSION_TOKEN, CREDENTIAL_TYPE,
};

/// Whether credential lookups must present the currently valid token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DisclosurePolicy {
    /// Credentials are disclosed to every lookup (IMDSv1 behavior).
    Permissive,
    /// Credentials are disclosed only for an exact token match (IMDSv2 behavior).
    Strict,
}

impl fmt::Display for DisclosurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permissive => f.write_str("permissive"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

/// Synthetic role credentials, shaped like the body of
/// `GET /latest/meta-data/iam/security-credentials/<role>`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricatedCredential {
    #[serde(rename = "Code")]
    pub status_code: String,

    #[serde(rename = "Type")]
    pub credential_type: String,

    #[serde(rename = "AccessKeyId")]
    pub access_key_id: String,

    #[serde(rename = "SecretAccessKey")]
    pub secret_access_key: String,

    #[serde(rename = "Token")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl FabricatedCredential {
    pub fn synthetic() -> Self {
        Self {
            status_code: CREDENTIAL_CODE.to_string(),
            credential_type: CREDENTIAL_TYPE.to_string(),
            access_key_id: CREDENTIAL_ACCESS_KEY_ID.to_string(),
            secret_access_key: CREDENTIAL_SECRET_ACCESS_KEY.to_string(),
            session_token: Some(CREDENTIAL_SESSION_TOKEN.to_string()),
        }
    }

    #[cfg(test)]
    pub fn without_session_token(mut self) -> Self {
        self.session_token = None;
        self
    }
}

impl Default for FabricatedCredential {
    fn default() -> Self {
        Self::synthetic()
    }
}

// Fake secrets stay out of the logs
impl fmt::Debug for FabricatedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FabricatedCredential")
            .field("status_code", &self.status_code)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &"[REDACTED]")
            .finish()
    }
}
