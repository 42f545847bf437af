//! Test helpers and utilities for MenuGate integration tests
//!
//! This module provides the shared infrastructure used across the
//! integration tests: an in-memory database, a recording chat transport,
//! a wiremock-based Telegram API and a context bundling the services.

#![allow(dead_code)]

pub mod database_helper;
pub mod fake_transport;
pub mod telegram_mock;
pub mod test_context;

pub use database_helper::*;
pub use fake_transport::*;
pub use telegram_mock::*;
pub use test_context::*;

/// Bot token used by the mock Telegram API
pub const TEST_TOKEN: &str = "12345:test_token";

/// Configured super-admin in every test context
pub const SUPER_ADMIN_ID: i64 = 1000;

/// Plain user ids
pub const ALICE: i64 = 2001;
pub const BOB: i64 = 2002;

/// Mandatory channel ids as the registry stores them
pub const NEWS_CHANNEL: i64 = -1001111;
pub const CHAT_CHANNEL: i64 = -1002222;

/// Poll a condition until it holds or the timeout elapses
pub async fn wait_until<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_millis(timeout_ms);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    condition()
}
