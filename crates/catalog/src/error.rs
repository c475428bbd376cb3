// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for Catalog operations
//!
//! This module defines the error types returned by query clients and by the
//! response decoders in [`crate::query`].

use serde::Serialize;
use thiserror::Error;

/// Result type alias for Catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while talking to the database or decoding its answers
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
pub enum CatalogError {
    /// Failed to connect to the database
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// Query execution timed out
    #[error("Query timed out after {0}s")]
    QueryTimeout(u64),

    /// The database answered, but not in the shape we expect
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Failed to serialize or deserialize fixture data
    #[error("Failed to serialize metadata: {0}")]
    SerializationError(String),

    /// Invalid client configuration
    #[error("Invalid catalog configuration: {0}")]
    ConfigurationError(String),

    /// The specified feature is not supported by this client implementation
    #[error("Feature not supported: {0}")]
    NotSupported(String),
}

impl CatalogError {
    /// Whether the failure came from the transport rather than from the payload
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CatalogError::ConnectionFailed(_)
                | CatalogError::QueryFailed(_)
                | CatalogError::QueryTimeout(_)
        )
    }
}
