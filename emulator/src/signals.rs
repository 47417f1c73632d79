// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Phase-tagged observations of the exploitation chain.
//!
//! Every recognized request the emulator finishes handling produces a
//! [`PhaseSignal`]. Signals are pushed onto an unbounded channel so that a
//! handler never waits on the sink, and the operator-facing side consumes
//! them independently (see [`spawn_signal_logger`]).
//!
//! | Phase | Meaning |
//! |-------|---------|
//! | `DISCOVERY` | the scanner fetched the service root fingerprint |
//! | `HANDSHAKE` | the scanner obtained a session token |
//! | `EXFILTRATION` | credentials (or the stimulus fingerprint) were disclosed |
//! | `REJECTED` | a credential lookup failed the token check |

use std::fmt;

use serde::Serialize;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Discovery,
    Handshake,
    Exfiltration,
    Rejected,
}

impl Phase {
    /// Position along the attack chain. `Rejected` is not a step forward.
    fn rank(self) -> Option<u8> {
        match self {
            Self::Discovery => Some(1),
            Self::Handshake => Some(2),
            Self::Exfiltration => Some(3),
            Self::Rejected => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Discovery => "DISCOVERY",
            Self::Handshake => "HANDSHAKE",
            Self::Exfiltration => "EXFILTRATION",
            Self::Rejected => "REJECTED",
        };
        f.write_str(tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseSignal {
    pub phase: Phase,
    pub description: String,
}

impl PhaseSignal {
    pub fn new(phase: Phase, description: impl Into<String>) -> Self {
        Self {
            phase,
            description: description.into(),
        }
    }
}

/// Sending half of the signal channel, held by the emulator.
#[derive(Debug, Clone)]
pub struct PhaseEmitter {
    sender: UnboundedSender<PhaseSignal>,
}

impl PhaseEmitter {
    pub fn channel() -> (Self, UnboundedReceiver<PhaseSignal>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Fire-and-forget. A sink that has gone away is not an error for the request.
    pub fn emit(&self, signal: PhaseSignal) {
        if let Err(err) = self.sender.send(signal) {
            tracing::debug!("[emulator] signal sink closed, dropped {}", err.0.phase);
        }
    }
}

/// Running tally of which chain steps a scanner reached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChainProgress {
    pub discovery: u64,
    pub handshake: u64,
    pub exfiltration: u64,
    pub rejected: u64,
    pub furthest: Option<Phase>,
}

impl ChainProgress {
    pub fn record(&mut self, phase: Phase) {
        match phase {
            Phase::Discovery => self.discovery += 1,
            Phase::Handshake => self.handshake += 1,
            Phase::Exfiltration => self.exfiltration += 1,
            Phase::Rejected => self.rejected += 1,
        }

        if let Some(rank) = phase.rank() {
            let current = self.furthest.and_then(Phase::rank).unwrap_or(0);
            if rank > current {
                self.furthest = Some(phase);
            }
        }
    }
}

impl fmt::Display for ChainProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let furthest = self
            .furthest
            .map_or_else(|| "NONE".to_string(), |phase| phase.to_string());
        write!(
            f,
            "furthest={} discovery={} handshake={} exfiltration={} rejected={}",
            furthest, self.discovery, self.handshake, self.exfiltration, self.rejected
        )
    }
}

/// Logs every signal until all emitters are dropped, then yields the tally.
pub fn spawn_signal_logger(
    mut receiver: UnboundedReceiver<PhaseSignal>,
) -> JoinHandle<ChainProgress> {
    tokio::spawn(async move {
        let mut progress = ChainProgress::default();

        while let Some(signal) = receiver.recv().await {
            progress.record(signal.phase);
            log_signal(&signal);
        }

        progress
    })
}

fn log_signal(signal: &PhaseSignal) {
    match signal.phase {
        Phase::Discovery | Phase::Handshake => tracing::info!(
            phase = %signal.phase,
            "[emulator] {}: {}",
            signal.phase,
            signal.description
        ),
        Phase::Exfiltration | Phase::Rejected => tracing::warn!(
            phase = %signal.phase,
            "[emulator] {}: {}",
            signal.phase,
            signal.description
        ),
    }
}
