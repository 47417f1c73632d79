// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::time::Duration;

pub const DISCOVERY_PATH: &str = "/";
pub const TOKEN_PATH_SEGMENT: &str = "/latest/api/token";
pub const CREDENTIALS_PATH_SEGMENT: &str = "iam/security-credentials";

pub const TOKEN_HEADER: &str = "x-aws-ec2-metadata-token";
pub const TOKEN_TTL_HEADER: &str = "x-aws-ec2-metadata-token-ttl-seconds";

/// 6 hours, the largest TTL a real IMDSv2 endpoint will grant
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 21_600;
pub const MAX_REQUESTED_TTL_SECONDS: u64 = 21_600;

pub const RANDOM_TOKEN_PREFIX: &str = "AQAEA";
pub const RANDOM_TOKEN_LENGTH: usize = 40;
/// Value handed out by the `fixed` token strategy. Every issuance returns the
/// same string, so a re-issued token cannot be told apart from the old one.
pub const FIXED_TOKEN_VALUE: &str = "imds-emulator-token-777";

// Fingerprints matched by scanner content heuristics
pub const DISCOVERY_TRIGGER: &str = "IMDS Emulator Discovery: Metadata Service active at 127.0.0.1";
pub const STIMULUS_TRIGGER: &str = "CRITICAL_LEAK: IP=127.0.0.1 KEY=AKIAIMDSEMULATOR2026";

pub const CREDENTIAL_CODE: &str = "Success";
pub const CREDENTIAL_TYPE: &str = "AWS-HMAC";
pub const CREDENTIAL_ACCESS_KEY_ID: &str = "ASIAIMDSEMULATOR2026";
pub const CREDENTIAL_SECRET_ACCESS_KEY: &str = "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEMULATEDKEY";
pub const CREDENTIAL_SESSION_TOKEN: &str = "IQoJb3JpZ2luX2VjEMULATED//////////wEaCXVzLWVhc3QtMSJHMEUCIQ";

pub const MAX_BODY_SIZE: usize = 1024 * 1024; // 1 MB
pub const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);
