// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata store
//!
//! Single-writer holder of the current [`MetadataState`].
//!
//! ## Architecture
//!
//! ```text
//! RefreshLoop ──dispatch_for(epoch)──┐
//!                                    ├─→ [epoch lock] ─→ reduce ─→ watch channel ─→ readers
//! MetadataSync ──dispatch / reset ───┘
//! ```
//!
//! Readers never block writers: they hold an `Arc` of an immutable snapshot.
//! Writers are serialized by the epoch lock, so the epoch check and the state
//! write are one atomic step.

use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::debug;

use crate::state::{MetaAction, MetadataState};

/// Generation of the session allowed to write through [`MetaStore::dispatch_for`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Epoch(u64);

/// Shared metadata store
#[derive(Debug)]
pub struct MetaStore {
    /// Current epoch; also serializes writes
    epoch: Mutex<u64>,

    /// Latest snapshot
    state: watch::Sender<Arc<MetadataState>>,
}

impl Default for MetaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaStore {
    /// Create a store holding the default state
    pub fn new() -> Self {
        Self::with_state(MetadataState::default())
    }

    /// Create a store holding `state`
    pub fn with_state(state: MetadataState) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(state));
        Self {
            epoch: Mutex::new(0),
            state: tx,
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<MetadataState> {
        self.state.borrow().clone()
    }

    /// Receiver notified after every write
    pub fn subscribe(&self) -> watch::Receiver<Arc<MetadataState>> {
        self.state.subscribe()
    }

    /// Apply an action unconditionally
    pub async fn dispatch(&self, action: MetaAction) {
        let _guard = self.epoch.lock().await;
        self.write(action);
    }

    /// Apply an action only if `epoch` is still current
    ///
    /// Returns `false` when the action was discarded.
    pub async fn dispatch_for(&self, epoch: Epoch, action: MetaAction) -> bool {
        let guard = self.epoch.lock().await;
        if *guard != epoch.0 {
            debug!(
                "Discarding update from retired epoch {} (current {})",
                epoch.0, *guard
            );
            return false;
        }
        self.write(action);
        true
    }

    /// Open a new epoch, retiring whichever was current
    pub async fn begin_session(&self) -> Epoch {
        let mut guard = self.epoch.lock().await;
        *guard += 1;
        Epoch(*guard)
    }

    /// Retire `epoch` if it is still current
    pub async fn end_session(&self, epoch: Epoch) {
        let mut guard = self.epoch.lock().await;
        if *guard == epoch.0 {
            *guard += 1;
        }
    }

    /// Whether `epoch` may still write
    pub async fn is_current(&self, epoch: Epoch) -> bool {
        *self.epoch.lock().await == epoch.0
    }

    /// Reset to the default state
    pub async fn reset(&self) {
        self.dispatch(MetaAction::Clear).await;
    }

    fn write(&self, action: MetaAction) {
        let next = self.state.borrow().reduce(action);
        self.state.send_replace(Arc::new(next));
    }
}
