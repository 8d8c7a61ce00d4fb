// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Cooperative cancellation.
//!
//! A [`CancelHandle`] is shared between the client's public surface and
//! every task and driver it spawns. `cancel()` is idempotent and may be
//! called from any task, including from inside an event handler; it only
//! flips the flag and notifies waiters, so it never blocks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

// =============================================================================
// CancelHandle
// =============================================================================

/// A cloneable cancellation handle.
///
/// All clones observe the same cancellation state. Cancellation is
/// one-way: once requested it cannot be cleared.
#[derive(Clone)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
    sender: broadcast::Sender<()>,
}

impl CancelHandle {
    /// Creates a new, uncancelled handle.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            sender,
        }
    }

    /// Requests cancellation and wakes every waiter.
    pub fn cancel(&self) {
        if self
            .cancelled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            let _ = self.sender.send(());
        }
    }

    /// Returns `true` if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once cancellation has been requested.
    ///
    /// Resolves immediately if the handle is already cancelled.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }

        let mut receiver = self.sender.subscribe();

        // The flag may have flipped between the check and the subscribe.
        if self.is_cancelled() {
            return;
        }

        let _ = receiver.recv().await;
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_wakes_waiter() {
        let handle = CancelHandle::new();
        assert!(!handle.is_cancelled());

        let waiter = handle.clone();
        let task = tokio::spawn(async move { waiter.cancelled().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("waiter should wake")
            .unwrap();
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_immediately_when_already_cancelled() {
        let handle = CancelHandle::new();
        handle.cancel();

        tokio::time::timeout(Duration::from_millis(100), handle.cancelled())
            .await
            .expect("already-cancelled handle must resolve at once");
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let handle = CancelHandle::new();
        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let handle = CancelHandle::new();
        let clone = handle.clone();

        clone.cancel();
        assert!(handle.is_cancelled());
    }
}
