// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use clap::{ArgAction, Parser, ValueEnum};

use crate::constants::DEFAULT_TOKEN_TTL_SECONDS;
use crate::models::DisclosurePolicy;

/// How the value of a freshly issued token is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TokenStrategy {
    /// Sequence number plus random alphanumerics; never repeats.
    Random,
    /// Always the same constant value.
    Fixed,
}

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct EmulatorOptions {
    #[arg(long, default_value = "127.0.0.1", env("IMDS_EMULATOR_HOST"))]
    pub host: String,
    #[arg(long, default_value = "80", env("IMDS_EMULATOR_PORT"))]
    pub port: u16,
    #[arg(long, value_enum, default_value = "strict", env("IMDS_EMULATOR_POLICY"))]
    pub policy: DisclosurePolicy,
    #[arg(long, default_value = "21600", env("IMDS_EMULATOR_TOKEN_TTL_SECONDS"))]
    pub token_ttl_seconds: u64,
    #[arg(long, default_value = "false", env("IMDS_EMULATOR_ENFORCE_TOKEN_TTL"), action = ArgAction::SetTrue)]
    pub enforce_token_ttl: bool,
    #[arg(long, value_enum, default_value = "random", env("IMDS_EMULATOR_TOKEN_STRATEGY"))]
    pub token_strategy: TokenStrategy,
    #[arg(long, default_value = "false", env("IMDS_EMULATOR_HONOR_REQUESTED_TTL"), action = ArgAction::SetTrue)]
    pub honor_requested_ttl: bool,
    #[arg(long, default_value = "false", env("IMDS_EMULATOR_LOG_JSON"), action = ArgAction::SetTrue)]
    pub log_json: bool,
}

impl Default for EmulatorOptions {
    fn default() -> Self {
        EmulatorOptions {
            host: "127.0.0.1".to_string(),
            port: 80,
            policy: DisclosurePolicy::Strict,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            enforce_token_ttl: false,
            token_strategy: TokenStrategy::Random,
            honor_requested_ttl: false,
            log_json: false,
        }
    }
}

impl EmulatorOptions {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
