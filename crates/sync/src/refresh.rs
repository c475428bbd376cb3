// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Refresh loop
//!
//! Background task that keeps the store in step with one live session.
//!
//! ## Cycle
//!
//! ```text
//! wait ─┬─ interval tick ─┐
//!       ├─ force refresh ─┼─→ metadata query ─→ management facts ─→ server config ─→ wait
//!       └─ cancelled ─→ stop
//! ```
//!
//! Each step is bounded by the configured query timeout, dispatches its own
//! update as soon as it succeeds, and fails independently of the others. A
//! cancelled loop issues no further round trips; results of a round trip
//! already in flight are discarded by the store's epoch check.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Notify, watch};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use graphmeta_catalog::query::{
    MANAGEMENT_KEYS, META_QUERY, decode_meta_records, server_info_from_facts,
};
use graphmeta_catalog::{CatalogError, CatalogResult, QueryClient};

use crate::config::SyncConfig;
use crate::events::Session;
use crate::state::MetaAction;
use crate::store::{Epoch, MetaStore};

/// Result of one step of a refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Fetched and written to the store
    Applied,
    /// Fetched, but there was nothing to write
    Unchanged,
    /// The round trip failed or returned something unusable
    Failed,
    /// Fetched after the session was retired; dropped
    Discarded,
    /// Not attempted because the session was cancelled
    Skipped,
}

/// Outcome of a full refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub meta: StepOutcome,
    pub server: StepOutcome,
    pub settings: StepOutcome,
}

/// Polls one session until cancelled
pub struct RefreshLoop {
    client: Arc<dyn QueryClient>,
    store: Arc<MetaStore>,
    config: SyncConfig,
    session: Session,
    epoch: Epoch,
    force: Arc<Notify>,
    cancel: watch::Receiver<bool>,
    cycles: Arc<watch::Sender<u64>>,
}

impl RefreshLoop {
    /// Create a loop for `session`
    ///
    /// `epoch` must come from [`MetaStore::begin_session`]. Sending `true` on
    /// the sender side of `cancel` (or dropping it) stops the loop.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        client: Arc<dyn QueryClient>,
        store: Arc<MetaStore>,
        config: SyncConfig,
        session: Session,
        epoch: Epoch,
        force: Arc<Notify>,
        cancel: watch::Receiver<bool>,
        cycles: Arc<watch::Sender<u64>>,
    ) -> Self {
        Self {
            client,
            store,
            config,
            session,
            epoch,
            force,
            cancel,
            cycles,
        }
    }

    /// Run until cancelled
    pub async fn run(mut self) {
        info!(
            "Starting metadata refresh for session {} (context {}, every {:?})",
            self.session.id, self.session.context, self.config.refresh_interval
        );

        let mut ticker = interval(self.config.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = wait_cancelled(&mut self.cancel) => break,
                _ = ticker.tick() => {
                    debug!("Scheduled metadata refresh for session {}", self.session.id);
                }
                _ = self.force.notified() => {
                    debug!("Forced metadata refresh for session {}", self.session.id);
                }
            }

            // Another session took over the store without cancelling us.
            if !self.store.is_current(self.epoch).await {
                info!(
                    "Session {} no longer owns the store, stopping refresh",
                    self.session.id
                );
                break;
            }

            let report = self.run_cycle().await;
            debug!(
                "Refresh cycle finished for session {}: {:?}",
                self.session.id, report
            );
            self.cycles.send_modify(|count| *count += 1);

            if self.is_cancelled() {
                break;
            }
        }

        info!("Stopped metadata refresh for session {}", self.session.id);
    }

    /// Run the three fetch steps once
    pub async fn run_cycle(&self) -> CycleReport {
        let meta = self.refresh_meta().await;

        let server = if self.is_cancelled() {
            StepOutcome::Skipped
        } else {
            self.refresh_server().await
        };

        let settings = if self.is_cancelled() {
            StepOutcome::Skipped
        } else {
            self.refresh_settings().await
        };

        CycleReport {
            meta,
            server,
            settings,
        }
    }

    async fn refresh_meta(&self) -> StepOutcome {
        let fetched = self
            .round_trip(self.client.routed_read_query(META_QUERY))
            .await
            .and_then(|rows| decode_meta_records(&rows));

        match fetched {
            Ok(meta) => {
                self.apply(MetaAction::UpdateMeta {
                    meta,
                    context: self.session.context.clone(),
                })
                .await
            }
            Err(e) => {
                warn!(
                    "Skipping schema metadata update for session {}: {}",
                    self.session.id, e
                );
                StepOutcome::Failed
            }
        }
    }

    async fn refresh_server(&self) -> StepOutcome {
        let fetched = self
            .round_trip(self.client.get_management_facts(&MANAGEMENT_KEYS))
            .await
            .and_then(|facts| server_info_from_facts(&facts));

        match fetched {
            Ok(server) => self.apply(MetaAction::UpdateServer(server)).await,
            Err(e) => {
                warn!(
                    "Skipping server info update for session {}: {}",
                    self.session.id, e
                );
                StepOutcome::Failed
            }
        }
    }

    async fn refresh_settings(&self) -> StepOutcome {
        let fetched = self
            .round_trip(self.client.get_server_config(&self.config.settings_prefix))
            .await;

        match fetched {
            Ok(Some(settings)) if !settings.is_empty() => {
                self.apply(MetaAction::UpdateSettings(settings)).await
            }
            Ok(_) => {
                debug!(
                    "No '{}' settings reported for session {}",
                    self.config.settings_prefix, self.session.id
                );
                StepOutcome::Unchanged
            }
            Err(e) => {
                warn!(
                    "Skipping settings update for session {}: {}",
                    self.session.id, e
                );
                StepOutcome::Failed
            }
        }
    }

    async fn apply(&self, action: MetaAction) -> StepOutcome {
        if self.store.dispatch_for(self.epoch, action).await {
            StepOutcome::Applied
        } else {
            StepOutcome::Discarded
        }
    }

    async fn round_trip<T, F>(&self, request: F) -> CatalogResult<T>
    where
        F: Future<Output = CatalogResult<T>>,
    {
        let timeout = self.config.query_timeout;
        tokio::time::timeout(timeout, request)
            .await
            .unwrap_or(Err(CatalogError::QueryTimeout(timeout.as_secs())))
    }

    fn is_cancelled(&self) -> bool {
        *self.cancel.borrow() || self.cancel.has_changed().is_err()
    }
}

/// Resolves once cancellation is requested or the sender is gone
async fn wait_cancelled(cancel: &mut watch::Receiver<bool>) {
    while !*cancel.borrow_and_update() {
        if cancel.changed().await.is_err() {
            return;
        }
    }
}
