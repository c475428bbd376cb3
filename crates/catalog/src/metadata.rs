// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata types for graph database schema information
//!
//! These are the shapes produced by decoding the metadata query, the
//! management facts and the server configuration. They carry no session
//! context; tagging happens when they are merged into the sync state.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Server configuration values keyed by setting name
pub type Settings = BTreeMap<String, Value>;

/// A registered function or procedure
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Invokable {
    /// Fully qualified name, e.g. `db.labels`
    pub name: String,
    /// Call signature as reported by the database
    #[serde(default)]
    pub signature: String,
    /// Human readable description
    #[serde(default)]
    pub description: String,
}

impl Invokable {
    /// Create a new invokable with builder pattern
    pub fn new(name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: signature.into(),
            description: String::new(),
        }
    }

    /// Builder method: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }
}

/// Decoded result of the five-part metadata query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaRecords {
    /// Distinct node labels
    pub labels: Vec<String>,
    /// Distinct relationship types
    pub relationship_types: Vec<String>,
    /// Distinct property keys
    pub property_keys: Vec<String>,
    /// Registered functions
    pub functions: Vec<Invokable>,
    /// Registered procedures
    pub procedures: Vec<Invokable>,
}

impl MetaRecords {
    /// Create empty records
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set labels
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method: set relationship types
    pub fn with_relationship_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relationship_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method: set property keys
    pub fn with_property_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.property_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method: set functions
    pub fn with_functions(mut self, functions: Vec<Invokable>) -> Self {
        self.functions = functions;
        self
    }

    /// Builder method: set procedures
    pub fn with_procedures(mut self, procedures: Vec<Invokable>) -> Self {
        self.procedures = procedures;
        self
    }

    /// True when every category is empty
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
            && self.relationship_types.is_empty()
            && self.property_keys.is_empty()
            && self.functions.is_empty()
            && self.procedures.is_empty()
    }
}

/// A `(domain, key)` path into the database's management interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ManagementKey {
    /// Management bean, e.g. `Kernel`
    pub domain: &'static str,
    /// Attribute within the bean, e.g. `KernelVersion`
    pub key: &'static str,
}

impl ManagementKey {
    /// Create a new management key
    pub const fn new(domain: &'static str, key: &'static str) -> Self {
        Self { domain, key }
    }
}

impl std::fmt::Display for ManagementKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.domain, self.key)
    }
}

/// Version, edition and store identifier of the connected server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Parsed kernel version, e.g. `3.4.0`
    pub version: Option<String>,
    /// Edition string, e.g. `enterprise`
    pub edition: Option<String>,
    /// Store identifier
    pub store_id: Option<String>,
}

impl ServerInfo {
    /// Create server info from its three parts
    pub fn new(
        version: Option<String>,
        edition: Option<String>,
        store_id: Option<String>,
    ) -> Self {
        Self {
            version,
            edition,
            store_id,
        }
    }
}
