// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata sync service
//!
//! Entry point wiring connection events to the refresh loop and the store.
//!
//! The service is responsible for:
//! - Starting a refresh loop when a session becomes connected
//! - Stopping it when that same session is lost or disconnected
//! - Resetting the store on disconnect
//! - Forwarding force-refresh requests to the running loop
//!
//! At most one session is polled at a time. Connecting a different session
//! retires the previous one first.

use std::sync::Arc;
use tokio::sync::{Mutex, Notify, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use graphmeta_catalog::QueryClient;

use crate::config::{ConfigError, SyncConfig};
use crate::events::{ConnectionEvent, Session, SessionId};
use crate::refresh::RefreshLoop;
use crate::state::MetadataState;
use crate::store::{Epoch, MetaStore};

/// The session currently being polled
struct ActiveSession {
    session: Session,
    epoch: Epoch,
    cancel: watch::Sender<bool>,
    force: Arc<Notify>,
    task: JoinHandle<()>,
}

/// Metadata sync service
///
/// Owns the store and at most one running refresh loop.
pub struct MetadataSync {
    client: Arc<dyn QueryClient>,
    store: Arc<MetaStore>,
    config: SyncConfig,
    active: Mutex<Option<ActiveSession>>,
    cycles: Arc<watch::Sender<u64>>,
}

impl MetadataSync {
    /// Create a service with a fresh store
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `config` does not validate.
    pub fn new(client: Arc<dyn QueryClient>, config: SyncConfig) -> Result<Self, ConfigError> {
        Self::with_store(client, config, Arc::new(MetaStore::new()))
    }

    /// Create a service writing into an existing store
    pub fn with_store(
        client: Arc<dyn QueryClient>,
        config: SyncConfig,
        store: Arc<MetaStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (cycles, _) = watch::channel(0);

        Ok(Self {
            client,
            store,
            config,
            active: Mutex::new(None),
            cycles: Arc::new(cycles),
        })
    }

    pub fn store(&self) -> &Arc<MetaStore> {
        &self.store
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Current metadata snapshot
    pub fn snapshot(&self) -> Arc<MetadataState> {
        self.store.snapshot()
    }

    /// Counter of completed refresh cycles, across sessions
    pub fn cycles(&self) -> watch::Receiver<u64> {
        self.cycles.subscribe()
    }

    /// The session currently being polled
    pub async fn active_session(&self) -> Option<Session> {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|active| active.session.clone())
    }

    /// React to a connection lifecycle event
    pub async fn handle_event(&self, event: ConnectionEvent) {
        debug!("Connection event for session {}", event.session_id());
        match event {
            ConnectionEvent::BecameConnected(session)
            | ConnectionEvent::ConnectSucceeded(session) => self.start(session).await,
            ConnectionEvent::ConnectionLost(id) => {
                if self.stop_if_active(&id).await.is_some() {
                    info!("Connection {} lost, metadata refresh stopped", id);
                } else {
                    debug!("Ignoring connection loss of inactive session {}", id);
                }
            }
            ConnectionEvent::DisconnectSucceeded(id) => {
                self.stop_if_active(&id).await;
                self.store.reset().await;
                info!("Disconnected {}, metadata cleared", id);
            }
        }
    }

    /// Request an immediate refresh cycle
    ///
    /// Returns `false` when no session is active.
    pub async fn force_refresh(&self) -> bool {
        match self.active.lock().await.as_ref() {
            Some(active) => {
                active.force.notify_one();
                true
            }
            None => {
                debug!("Force refresh requested without an active session");
                false
            }
        }
    }

    /// Handle events until the channel closes, then shut down
    pub async fn run(&self, mut events: mpsc::Receiver<ConnectionEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        self.shutdown().await;
    }

    /// Stop the running loop, if any, and wait for it to exit
    pub async fn shutdown(&self) {
        let previous = self.active.lock().await.take();
        if let Some(active) = previous {
            let task = self.retire(active).await;
            if let Err(e) = task.await {
                warn!("Refresh task ended abnormally: {}", e);
            }
        }
    }

    async fn start(&self, session: Session) {
        let mut active = self.active.lock().await;

        if let Some(current) = active.as_ref() {
            if current.session == session && !current.task.is_finished() {
                debug!("Session {} already being refreshed", session.id);
                return;
            }
        }

        if let Some(previous) = active.take() {
            info!(
                "Switching metadata refresh from {} ({}) to {} ({})",
                previous.session.id, previous.session.context, session.id, session.context
            );
            self.retire(previous).await;
        }

        let epoch = self.store.begin_session().await;
        let (cancel, cancel_rx) = watch::channel(false);
        let force = Arc::new(Notify::new());
        let refresh = RefreshLoop::new(
            self.client.clone(),
            self.store.clone(),
            self.config.clone(),
            session.clone(),
            epoch,
            force.clone(),
            cancel_rx,
            self.cycles.clone(),
        );
        let task = tokio::spawn(refresh.run());

        *active = Some(ActiveSession {
            session,
            epoch,
            cancel,
            force,
            task,
        });
    }

    async fn stop_if_active(&self, id: &SessionId) -> Option<JoinHandle<()>> {
        let mut active = self.active.lock().await;
        match active.take() {
            Some(current) if current.session.id == *id => Some(self.retire(current).await),
            other => {
                *active = other;
                None
            }
        }
    }

    /// Cancel the loop and retire its epoch; the task exits on its own
    async fn retire(&self, active: ActiveSession) -> JoinHandle<()> {
        // Receiver may already be gone if the task exited.
        let _ = active.cancel.send(true);
        self.store.end_session(active.epoch).await;
        active.task
    }
}
