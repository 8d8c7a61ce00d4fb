// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Shared test tooling.

pub mod fixtures;
pub mod mocks;

use std::time::{Duration, Instant};

/// Polls `predicate` until it holds or the timeout elapses.
///
/// # Panics
///
/// Panics with `message` when the timeout elapses first.
pub async fn wait_until(timeout: Duration, message: &str, predicate: impl Fn() -> bool) {
    let deadline = Instant::now() + timeout;
    while !predicate() {
        if Instant::now() >= deadline {
            panic!("timed out waiting for: {message}");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
