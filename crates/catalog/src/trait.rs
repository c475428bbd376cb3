// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # QueryClient trait for database access
//!
//! This module defines the async trait through which metadata is fetched from
//! a live graph database connection.

use crate::error::CatalogResult;
use crate::metadata::{ManagementKey, Settings};
use crate::query::QueryRecord;

/// Query-executing client for a graph database connection
///
/// Implementations can wrap a network driver, read from fixture files, or be
/// scripted mocks for tests.
///
/// # Examples
///
/// ```rust,ignore
/// use graphmeta_catalog::{QueryClient, query::{META_QUERY, decode_meta_records}};
///
/// async fn labels(client: &dyn QueryClient) -> CatalogResult<Vec<String>> {
///     let records = client.routed_read_query(META_QUERY).await?;
///     Ok(decode_meta_records(&records)?.labels)
/// }
/// ```
#[async_trait::async_trait]
pub trait QueryClient: Send + Sync {
    /// Run a read-only query routed to a read-capable cluster member
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ConnectionFailed` if no member is reachable.
    /// Returns `CatalogError::QueryFailed` if the database rejects the query.
    async fn routed_read_query(&self, query: &str) -> CatalogResult<Vec<QueryRecord>>;

    /// Look up values from the management interface
    ///
    /// Returns one entry per requested key, in request order. A key the
    /// server does not expose yields `None`.
    async fn get_management_facts(
        &self,
        keys: &[ManagementKey],
    ) -> CatalogResult<Vec<Option<String>>>;

    /// Read server configuration entries whose name starts with `prefix`
    ///
    /// `Ok(None)` means the server has no configuration to report.
    async fn get_server_config(&self, prefix: &str) -> CatalogResult<Option<Settings>>;
}
