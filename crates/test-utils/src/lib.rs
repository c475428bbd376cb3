// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for graphmeta
//!
//! This crate provides common testing components including:
//! - A scriptable mock query client
//! - Sample server responses

pub mod fixtures;
pub mod mock_client;

// Re-exports for convenience
pub use fixtures::MetaFixtures;
pub use mock_client::{MockQueryClient, MockQueryClientBuilder, Reply};
