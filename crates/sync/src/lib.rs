// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # graphmeta - Metadata Sync
//!
//! Keeps a cache of graph database metadata in step with a live connection.
//!
//! ## Overview
//!
//! While a session is connected, a background loop fetches:
//! - Labels, relationship types, property keys, functions and procedures
//! - Server version, edition and store id
//! - Server settings under the `browser.` namespace
//!
//! and merges them into a [`MetaStore`]. Schema entries are tagged with the
//! session's [`Context`], so metadata of several sessions can coexist. The
//! store is reset when the connection is closed.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐     ┌──────────────────────┐
//! │  Connection events   │     │     QueryClient      │
//! └──────────┬───────────┘     └──────────┬───────────┘
//!            ↓                            ↑
//! ┌──────────────────────┐     ┌──────────┴───────────┐
//! │     MetadataSync     │────→│     RefreshLoop      │
//! └──────────┬───────────┘     └──────────┬───────────┘
//!            │ reset                      │ dispatch_for(epoch)
//!            ↓                            ↓
//! ┌───────────────────────────────────────────────────┐
//! │            MetaStore (MetadataState)              │
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use graphmeta_sync::{ConnectionEvent, MetadataSync, Session, SyncConfig};
//!
//! let sync = MetadataSync::new(client, SyncConfig::default())?;
//! sync.handle_event(ConnectionEvent::ConnectSucceeded(Session::new("bolt-1", "tab-1"))).await;
//!
//! let labels = sync.snapshot().meta_in_context(&"tab-1".into()).labels;
//! ```

pub mod config;
pub mod events;
pub mod refresh;
pub mod service;
pub mod state;
pub mod store;

// Re-exports
pub use config::{ConfigError, SyncConfig};
pub use events::{ConnectionEvent, Session, SessionId};
pub use refresh::{CycleReport, RefreshLoop, StepOutcome};
pub use service::MetadataSync;
pub use state::{
    ALLOW_OUTGOING_CONNECTIONS, Context, ContextMeta, InvokableEntry, MetaAction, MetaEntry,
    MetadataState,
};
pub use store::{Epoch, MetaStore};
