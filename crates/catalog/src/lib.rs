// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # graphmeta - Catalog Layer
//!
//! This crate provides the database access abstraction for graph metadata
//! synchronisation. It defines the `QueryClient` trait and the metadata types
//! fetched through it:
//!
//! - **Schema metadata**: labels, relationship types, property keys,
//!   functions and procedures, fetched with one routed read query
//! - **Management facts**: kernel version, store id and edition
//! - **Server settings**: configuration entries under a name prefix
//!
//! ## Architecture
//!
//! The catalog layer is responsible for:
//! - Defining the query text and fact keys exchanged with the database
//! - Decoding raw query rows into typed [`MetaRecords`]
//! - Parsing the server version out of the kernel version string
//! - Providing a fixture-backed client for running without a database
//!
//! ## Usage
//!
//! ```rust,ignore
//! use graphmeta_catalog::{QueryClient, CatalogResult};
//! use graphmeta_catalog::query::{META_QUERY, decode_meta_records};
//!
//! async fn print_labels(client: &dyn QueryClient) -> CatalogResult<()> {
//!     let rows = client.routed_read_query(META_QUERY).await?;
//!     for label in decode_meta_records(&rows)?.labels {
//!         println!("{}", label);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod metadata;
pub mod query;
pub mod r#static;
pub mod r#trait;

// Re-exports
pub use error::{CatalogError, CatalogResult};
pub use metadata::{Invokable, ManagementKey, MetaRecords, ServerInfo, Settings};
pub use query::QueryRecord;
pub use r#static::{Fixture, StaticQueryClient};
pub use r#trait::QueryClient;
