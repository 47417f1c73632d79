// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Runs the AWS SDK's own IMDS client against a live emulator listener.
//!
//! The SDK client performs the full IMDSv2 flow on its own: it PUTs to the
//! token endpoint, parses the TTL header, then presents the token on the
//! follow-up GET. Passing here means a real IMDSv2 client can complete the
//! handshake end to end.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use aws_config::imds::client::Client;
use imds_emulator::application::Application;
use imds_emulator::configuration::EmulatorOptions;
use imds_emulator::constants::CREDENTIAL_ACCESS_KEY_ID;
use imds_emulator::emulator::MetadataEmulator;
use imds_emulator::errors::AppError;
use imds_emulator::models::DisclosurePolicy;
use imds_emulator::signals::{Phase, PhaseEmitter, PhaseSignal};
use tokio::sync::mpsc::UnboundedReceiver;

const CREDENTIALS_PATH: &str = "/latest/meta-data/iam/security-credentials/emulated-role";

fn local_options(policy: DisclosurePolicy) -> EmulatorOptions {
    EmulatorOptions {
        port: 0,
        policy,
        ..EmulatorOptions::default()
    }
}

/// Binds an ephemeral port and serves in the background.
async fn spawn_emulator(policy: DisclosurePolicy) -> (String, UnboundedReceiver<PhaseSignal>) {
    let options = local_options(policy);
    let (emitter, receiver) = PhaseEmitter::channel();
    let emulator = MetadataEmulator::new(&options, emitter);

    let application = Application::build(&options, emulator).await.unwrap();
    let endpoint = format!("http://127.0.0.1:{}", application.port());
    tokio::spawn(application.run_until_stopped());

    (endpoint, receiver)
}

fn imds_client(endpoint: &str) -> Client {
    Client::builder().endpoint(endpoint).unwrap().build()
}

#[tokio::test]
async fn test_sdk_client_completes_strict_handshake() {
    let (endpoint, mut signals) = spawn_emulator(DisclosurePolicy::Strict).await;

    let body = imds_client(&endpoint).get(CREDENTIALS_PATH).await.unwrap();
    let body: &str = body.as_ref();
    let credential: serde_json::Value = serde_json::from_str(body).unwrap();

    assert_eq!(credential["Code"], "Success");
    assert_eq!(credential["AccessKeyId"], CREDENTIAL_ACCESS_KEY_ID);

    let mut phases = Vec::new();
    while let Ok(signal) = signals.try_recv() {
        phases.push(signal.phase);
    }
    assert_eq!(phases, vec![Phase::Handshake, Phase::Exfiltration]);
}

#[tokio::test]
async fn test_sdk_client_reads_discovery_root() {
    let (endpoint, _signals) = spawn_emulator(DisclosurePolicy::Strict).await;

    let body = imds_client(&endpoint).get("/").await.unwrap();
    let body: &str = body.as_ref();

    assert!(body.contains("127.0.0.1"));
}

#[tokio::test]
async fn test_second_bind_on_same_port_fails() {
    let (emitter, _signals) = PhaseEmitter::channel();
    let options = local_options(DisclosurePolicy::Strict);
    let first = Application::build(&options, MetadataEmulator::new(&options, emitter.clone()))
        .await
        .unwrap();

    let taken = EmulatorOptions {
        port: first.port(),
        ..options
    };
    let result = Application::build(&taken, MetadataEmulator::new(&taken, emitter)).await;

    match result {
        Err(AppError::BindFailure { address, .. }) => {
            assert_eq!(address, format!("127.0.0.1:{}", first.port()));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("second bind should fail"),
    }
}
