// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use tokio::sync::watch;

/// Change-version counter bumped once per committed mutation.
///
/// Consumers compare the version they last rendered with
/// [`current_version`](Self::current_version), or await a
/// [`subscribe`](Self::subscribe) receiver, and re-run the aggregation
/// only when it moved. Nothing is recomputed here.
#[derive(Debug)]
pub struct RefreshCoordinator {
    tx: watch::Sender<u64>,
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx }
    }

    pub fn current_version(&self) -> u64 {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    /// Only the store calls this, right after a successful commit.
    pub(crate) fn bump(&self) -> u64 {
        self.tx.send_modify(|v| *v += 1);
        self.current_version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_is_strictly_increasing() {
        let rc = RefreshCoordinator::new();
        assert_eq!(rc.current_version(), 0);
        assert_eq!(rc.bump(), 1);
        assert_eq!(rc.bump(), 2);
        assert_eq!(rc.current_version(), 2);
    }

    #[test]
    fn subscribers_see_new_versions() {
        let rc = RefreshCoordinator::new();
        let mut rx = rc.subscribe();
        assert!(!rx.has_changed().unwrap());
        rc.bump();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);
    }
}
