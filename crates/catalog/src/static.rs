// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Static query client
//!
//! A [`QueryClient`] that answers from a predefined fixture instead of a live
//! database. Used for demos, the command line tool and tests.
//!
//! ## Fixture format
//!
//! ```yaml
//! labels: [Person, Movie]
//! relationship_types: [ACTED_IN]
//! property_keys: [name, title]
//! functions:
//!   - { name: date, signature: "date() :: DATE?", description: Create a date }
//! procedures: []
//! kernel_version: "neo4j-kernel, version: 3.4.0,abc"
//! store_id: store-1
//! edition: community
//! settings:
//!   browser.allow_outgoing_connections: "true"
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use graphmeta_catalog::StaticQueryClient;
//!
//! let client = StaticQueryClient::from_path("fixtures/movies.yaml")?;
//! let rows = client.routed_read_query(META_QUERY).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::metadata::{Invokable, ManagementKey, MetaRecords, Settings};
use crate::query::{self, EDITION, KERNEL_VERSION, META_QUERY, QueryRecord, STORE_ID};
use crate::{CatalogError, CatalogResult, QueryClient};

/// Everything a static client can report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub labels: Vec<String>,
    pub relationship_types: Vec<String>,
    pub property_keys: Vec<String>,
    pub functions: Vec<Invokable>,
    pub procedures: Vec<Invokable>,
    pub kernel_version: Option<String>,
    pub store_id: Option<String>,
    pub edition: Option<String>,
    pub settings: Settings,
}

impl Fixture {
    /// Parse a YAML fixture
    pub fn from_yaml_str(text: &str) -> CatalogResult<Self> {
        serde_yaml::from_str(text).map_err(|e| CatalogError::SerializationError(e.to_string()))
    }

    /// Parse a JSON fixture
    pub fn from_json_str(text: &str) -> CatalogResult<Self> {
        serde_json::from_str(text).map_err(|e| CatalogError::SerializationError(e.to_string()))
    }

    /// Schema metadata part of the fixture
    pub fn meta_records(&self) -> MetaRecords {
        MetaRecords {
            labels: self.labels.clone(),
            relationship_types: self.relationship_types.clone(),
            property_keys: self.property_keys.clone(),
            functions: self.functions.clone(),
            procedures: self.procedures.clone(),
        }
    }

    fn fact(&self, key: &ManagementKey) -> Option<String> {
        if *key == KERNEL_VERSION {
            self.kernel_version.clone()
        } else if *key == STORE_ID {
            self.store_id.clone()
        } else if *key == EDITION {
            self.edition.clone()
        } else {
            None
        }
    }
}

/// Static query client with fixture data
pub struct StaticQueryClient {
    fixture: Fixture,
}

impl StaticQueryClient {
    /// Create a client serving the given fixture
    pub fn new(fixture: Fixture) -> Self {
        Self { fixture }
    }

    /// Load a fixture file, YAML or JSON depending on its extension
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ConfigurationError` if the file cannot be read
    /// or has an unknown extension, `CatalogError::SerializationError` if it
    /// does not parse.
    pub fn from_path(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::ConfigurationError(format!("cannot read {}: {}", path.display(), e))
        })?;

        let fixture = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Fixture::from_yaml_str(&text)?,
            Some("json") => Fixture::from_json_str(&text)?,
            _ => {
                return Err(CatalogError::ConfigurationError(format!(
                    "unsupported fixture format: {}",
                    path.display()
                )));
            }
        };

        debug!("Loaded metadata fixture from {}", path.display());
        Ok(Self::new(fixture))
    }

    /// The fixture being served
    pub fn fixture(&self) -> &Fixture {
        &self.fixture
    }
}

#[async_trait]
impl QueryClient for StaticQueryClient {
    async fn routed_read_query(&self, query: &str) -> CatalogResult<Vec<QueryRecord>> {
        if query.trim() != META_QUERY.trim() {
            return Err(CatalogError::NotSupported(
                "static client only answers the metadata query".to_string(),
            ));
        }
        Ok(query::encode_meta_records(&self.fixture.meta_records()))
    }

    async fn get_management_facts(
        &self,
        keys: &[ManagementKey],
    ) -> CatalogResult<Vec<Option<String>>> {
        Ok(keys.iter().map(|key| self.fixture.fact(key)).collect())
    }

    async fn get_server_config(&self, prefix: &str) -> CatalogResult<Option<Settings>> {
        if self.fixture.settings.is_empty() {
            return Ok(None);
        }
        let settings: Settings = self
            .fixture
            .settings
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Ok(Some(settings))
    }
}
