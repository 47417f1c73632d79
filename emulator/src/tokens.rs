// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Single-slot session token state for the IMDSv2 handshake.
//!
//! The emulator tracks at most one valid token. Every issuance replaces the
//! previous one, so a scanner that caches an old token and presents it after a
//! newer one was minted is rejected under the strict policy.
//!
//! # State Machine
//!
//! ```text
//! NO_TOKEN --issue--> TOKEN_VALID(v1) --issue--> TOKEN_VALID(v2) --issue--> ...
//! ```
//!
//! Lookups only ever take the read lock and never transition the state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::configuration::TokenStrategy;
use crate::constants::{FIXED_TOKEN_VALUE, RANDOM_TOKEN_LENGTH, RANDOM_TOKEN_PREFIX};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    value: String,
    issued_at: Instant,
    ttl: Duration,
}

impl IssuedToken {
    pub fn new(value: String, issued_at: Instant, ttl: Duration) -> Self {
        Self {
            value,
            issued_at,
            ttl,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl.as_secs()
    }

    /// A token is expired once its full TTL has elapsed.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.issued_at) >= self.ttl
    }
}

/// Outcome of checking a presented token against the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenVerdict {
    Valid,
    Missing,
    NoneIssued,
    Mismatch,
    Expired,
}

impl TokenVerdict {
    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::Valid => "token accepted",
            Self::Missing => "no token presented",
            Self::NoneIssued => "no token has been issued",
            Self::Mismatch => "presented token is not the current token",
            Self::Expired => "presented token has expired",
        }
    }
}

pub struct TokenStore {
    strategy: TokenStrategy,
    enforce_ttl: bool,
    sequence: AtomicU64,
    current: RwLock<Option<IssuedToken>>,
}

impl TokenStore {
    pub fn new(strategy: TokenStrategy, enforce_ttl: bool) -> Self {
        Self {
            strategy,
            enforce_ttl,
            sequence: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    /// Mints a new token and makes it the only valid one.
    pub async fn issue(&self, ttl: Duration) -> IssuedToken {
        self.issue_at(ttl, Instant::now()).await
    }

    #[tracing::instrument(skip(self, now))]
    pub async fn issue_at(&self, ttl: Duration, now: Instant) -> IssuedToken {
        // Value generation happens under the write lock so sequence order matches slot order
        let mut current = self.current.write().await;

        let token = IssuedToken::new(self.next_value(), now, ttl);
        *current = Some(token.clone());

        tracing::debug!(
            "[emulator] token slot replaced, ttl: {}s",
            token.ttl_seconds()
        );

        token
    }

    /// Returns a copy of the currently valid token, if any.
    pub async fn current(&self) -> Option<IssuedToken> {
        self.current.read().await.clone()
    }

    pub async fn verify(&self, presented: Option<&str>) -> TokenVerdict {
        self.verify_at(presented, Instant::now()).await
    }

    pub async fn verify_at(&self, presented: Option<&str>, now: Instant) -> TokenVerdict {
        let current = self.current.read().await;

        let Some(ref token) = *current else {
            return TokenVerdict::NoneIssued;
        };
        let Some(presented) = presented else {
            return TokenVerdict::Missing;
        };
        if presented != token.value() {
            return TokenVerdict::Mismatch;
        }
        if self.enforce_ttl && token.is_expired_at(now) {
            return TokenVerdict::Expired;
        }

        TokenVerdict::Valid
    }

    fn next_value(&self) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);

        match self.strategy {
            TokenStrategy::Fixed => FIXED_TOKEN_VALUE.to_string(),
            TokenStrategy::Random => {
                let suffix: String = std::iter::repeat_with(fastrand::alphanumeric)
                    .take(RANDOM_TOKEN_LENGTH)
                    .collect();
                format!("{RANDOM_TOKEN_PREFIX}{sequence:08x}{suffix}")
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_empty_store_has_no_token() {
        let store = TokenStore::new(TokenStrategy::Random, false);

        assert!(store.current().await.is_none());
        assert_eq!(store.verify(Some("anything")).await, TokenVerdict::NoneIssued);
        assert_eq!(store.verify(None).await, TokenVerdict::NoneIssued);
    }

    #[tokio::test]
    async fn test_issue_replaces_previous_token() {
        let store = TokenStore::new(TokenStrategy::Random, false);

        let first = store.issue(TTL).await;
        let second = store.issue(TTL).await;

        assert_ne!(first.value(), second.value());
        assert_eq!(store.current().await.unwrap(), second);
        assert_eq!(store.verify(Some(first.value())).await, TokenVerdict::Mismatch);
        assert_eq!(store.verify(Some(second.value())).await, TokenVerdict::Valid);
    }

    #[tokio::test]
    async fn test_random_tokens_carry_prefix_and_length() {
        let store = TokenStore::new(TokenStrategy::Random, false);
        let token = store.issue(TTL).await;

        assert!(token.value().starts_with(RANDOM_TOKEN_PREFIX));
        assert_eq!(
            token.value().len(),
            RANDOM_TOKEN_PREFIX.len() + 8 + RANDOM_TOKEN_LENGTH
        );
        assert!(token.value().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn test_fixed_strategy_reissues_same_value() {
        let store = TokenStore::new(TokenStrategy::Fixed, false);

        let first = store.issue(TTL).await;
        let second = store.issue(TTL).await;

        assert_eq!(first.value(), FIXED_TOKEN_VALUE);
        assert_eq!(first.value(), second.value());
        assert_eq!(store.verify(Some(FIXED_TOKEN_VALUE)).await, TokenVerdict::Valid);
    }

    #[tokio::test]
    async fn test_missing_token_after_issue() {
        let store = TokenStore::new(TokenStrategy::Random, false);
        store.issue(TTL).await;

        assert_eq!(store.verify(None).await, TokenVerdict::Missing);
        assert_eq!(store.verify(Some("")).await, TokenVerdict::Mismatch);
    }

    #[tokio::test]
    async fn test_expiry_ignored_unless_enforced() {
        let issued_at = Instant::now();
        let later = issued_at + TTL + Duration::from_secs(1);

        let lenient = TokenStore::new(TokenStrategy::Random, false);
        let token = lenient.issue_at(TTL, issued_at).await;
        assert!(token.is_expired_at(later));
        assert_eq!(
            lenient.verify_at(Some(token.value()), later).await,
            TokenVerdict::Valid
        );

        let enforcing = TokenStore::new(TokenStrategy::Random, true);
        let token = enforcing.issue_at(TTL, issued_at).await;
        assert_eq!(
            enforcing.verify_at(Some(token.value()), issued_at).await,
            TokenVerdict::Valid
        );
        assert_eq!(
            enforcing.verify_at(Some(token.value()), later).await,
            TokenVerdict::Expired
        );
    }

    #[test]
    fn test_expiry_boundary() {
        let issued_at = Instant::now();
        let token = IssuedToken::new("t".to_string(), issued_at, TTL);

        assert!(!token.is_expired_at(issued_at));
        assert!(!token.is_expired_at(issued_at + TTL - Duration::from_millis(1)));
        assert!(token.is_expired_at(issued_at + TTL));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_issuance_leaves_one_issued_token() {
        let store = Arc::new(TokenStore::new(TokenStrategy::Random, false));

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.issue(TTL).await.value().to_string() })
            })
            .collect();

        let mut issued = HashSet::new();
        for handle in handles {
            issued.insert(handle.await.unwrap());
        }

        assert_eq!(issued.len(), 64);
        let current = store.current().await.unwrap();
        assert!(issued.contains(current.value()));

        let mut valid = 0;
        for value in &issued {
            if store.verify(Some(value)).await.is_valid() {
                valid += 1;
            }
        }
        assert_eq!(valid, 1);
    }
}
