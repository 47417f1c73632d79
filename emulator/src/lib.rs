// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! # IMDS Emulator
//!
//! An EC2 Instance Metadata Service emulator for checking whether a scanner
//! really walks the IMDSv2 credential-theft chain.
//!
//! The emulator answers the handful of endpoints a scanner touches when it
//! pivots to cloud metadata, hands out a session token, decides whether to
//! disclose fabricated role credentials, and reports which phase of the chain
//! each request reached.
//!
//! ## Architecture
//!
//! ```text
//! Scanner -> HTTP (axum) -> routes -> MetadataEmulator -> TokenStore (RwLock slot)
//!                                          |
//!                                          +-> PhaseEmitter -> mpsc -> signal logger
//! ```
//!
//! ## Modules
//!
//! - [`application`]: listener binding and router setup with Axum
//! - [`configuration`]: CLI argument parsing with clap
//! - [`constants`]: endpoints, header names, fingerprints and synthetic values
//! - [`emulator`]: the protocol state machine and disclosure decision
//! - [`errors`]: error types with HTTP response mapping
//! - [`models`]: disclosure policy and the fabricated credential
//! - [`routes`]: verb/path dispatch onto emulator operations
//! - [`signals`]: phase signals and the chain-progress sink
//! - [`tokens`]: single-slot session token state
//!
//! ## Usage
//!
//! ```bash
//! sudo imds-emulator --policy strict
//! imds-emulator --port 8080 --policy permissive --token-strategy fixed
//! ```

pub mod application;
pub mod configuration;
pub mod constants;
pub mod emulator;
pub mod errors;
pub mod models;
pub mod routes;
pub mod signals;
pub mod tokens;
