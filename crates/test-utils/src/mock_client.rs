// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mock query client for testing
//!
//! Provides an in-memory client with builder pattern for easy test setup.
//! Every endpoint can be scripted to answer, fail or hang, and calls are
//! counted so tests can assert how often the database was hit.

use graphmeta_catalog::query::{self, META_QUERY};
use graphmeta_catalog::{
    CatalogError, CatalogResult, ManagementKey, MetaRecords, QueryClient, QueryRecord, Settings,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// What an endpoint does when called
#[derive(Debug, Clone)]
pub enum Reply<T> {
    /// Answer with a value
    Answer(T),
    /// Fail with an error
    Fail(CatalogError),
    /// Never answer
    Hang,
}

impl<T: Clone> Reply<T> {
    async fn resolve(&self) -> CatalogResult<T> {
        match self {
            Reply::Answer(value) => Ok(value.clone()),
            Reply::Fail(err) => Err(err.clone()),
            Reply::Hang => std::future::pending().await,
        }
    }
}

/// In-memory mock query client
#[derive(Debug)]
pub struct MockQueryClient {
    meta: RwLock<Reply<Vec<QueryRecord>>>,
    facts: RwLock<Reply<Vec<Option<String>>>>,
    settings: RwLock<Reply<Option<Settings>>>,
    latency: RwLock<Duration>,
    meta_calls: AtomicUsize,
    facts_calls: AtomicUsize,
    settings_calls: AtomicUsize,
}

impl Default for MockQueryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockQueryClient {
    /// Create a client with an empty schema, no facts and no settings
    pub fn new() -> Self {
        Self {
            meta: RwLock::new(Reply::Answer(query::encode_meta_records(&MetaRecords::new()))),
            facts: RwLock::new(Reply::Answer(vec![None, None, None])),
            settings: RwLock::new(Reply::Answer(None)),
            latency: RwLock::new(Duration::ZERO),
            meta_calls: AtomicUsize::new(0),
            facts_calls: AtomicUsize::new(0),
            settings_calls: AtomicUsize::new(0),
        }
    }

    /// Answer the metadata query with these records
    pub async fn set_meta(&self, meta: &MetaRecords) {
        *self.meta.write().await = Reply::Answer(query::encode_meta_records(meta));
    }

    /// Answer the metadata query with raw rows
    pub async fn set_meta_rows(&self, rows: Vec<QueryRecord>) {
        *self.meta.write().await = Reply::Answer(rows);
    }

    /// Script the metadata query
    pub async fn script_meta(&self, reply: Reply<Vec<QueryRecord>>) {
        *self.meta.write().await = reply;
    }

    /// Answer management lookups with these facts
    pub async fn set_facts(&self, facts: Vec<Option<String>>) {
        *self.facts.write().await = Reply::Answer(facts);
    }

    /// Script management lookups
    pub async fn script_facts(&self, reply: Reply<Vec<Option<String>>>) {
        *self.facts.write().await = reply;
    }

    /// Answer config lookups with these settings
    pub async fn set_settings(&self, settings: Option<Settings>) {
        *self.settings.write().await = Reply::Answer(settings);
    }

    /// Script config lookups
    pub async fn script_settings(&self, reply: Reply<Option<Settings>>) {
        *self.settings.write().await = reply;
    }

    /// Delay every answer by `latency`
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.write().await = latency;
    }

    /// Number of metadata queries received
    pub fn meta_calls(&self) -> usize {
        self.meta_calls.load(Ordering::SeqCst)
    }

    /// Number of management lookups received
    pub fn facts_calls(&self) -> usize {
        self.facts_calls.load(Ordering::SeqCst)
    }

    /// Number of config lookups received
    pub fn settings_calls(&self) -> usize {
        self.settings_calls.load(Ordering::SeqCst)
    }

    async fn delay(&self) {
        let latency = *self.latency.read().await;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait::async_trait]
impl QueryClient for MockQueryClient {
    async fn routed_read_query(&self, query: &str) -> CatalogResult<Vec<QueryRecord>> {
        self.meta_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        if query != META_QUERY {
            return Err(CatalogError::NotSupported(format!("mock cannot run: {}", query)));
        }
        let reply = self.meta.read().await.clone();
        reply.resolve().await
    }

    async fn get_management_facts(
        &self,
        keys: &[ManagementKey],
    ) -> CatalogResult<Vec<Option<String>>> {
        self.facts_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        let reply = self.facts.read().await.clone();
        let mut facts = reply.resolve().await?;
        facts.resize(keys.len(), None);
        Ok(facts)
    }

    async fn get_server_config(&self, prefix: &str) -> CatalogResult<Option<Settings>> {
        self.settings_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        let reply = self.settings.read().await.clone();
        Ok(reply.resolve().await?.map(|settings| {
            settings
                .into_iter()
                .filter(|(name, _)| name.starts_with(prefix))
                .collect()
        }))
    }
}

/// Builder for creating mock clients with a fluent API
pub struct MockQueryClientBuilder {
    client: MockQueryClient,
}

impl Default for MockQueryClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockQueryClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            client: MockQueryClient::new(),
        }
    }

    /// Answer the metadata query with these records
    pub fn with_meta(mut self, meta: &MetaRecords) -> Self {
        self.client.meta = RwLock::new(Reply::Answer(query::encode_meta_records(meta)));
        self
    }

    /// Answer management lookups with these facts
    pub fn with_facts(mut self, facts: Vec<Option<String>>) -> Self {
        self.client.facts = RwLock::new(Reply::Answer(facts));
        self
    }

    /// Answer config lookups with these settings
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.client.settings = RwLock::new(Reply::Answer(Some(settings)));
        self
    }

    /// Make the metadata query fail
    pub fn failing_meta(mut self, err: CatalogError) -> Self {
        self.client.meta = RwLock::new(Reply::Fail(err));
        self
    }

    /// Make management lookups fail
    pub fn failing_facts(mut self, err: CatalogError) -> Self {
        self.client.facts = RwLock::new(Reply::Fail(err));
        self
    }

    /// Make config lookups fail
    pub fn failing_settings(mut self, err: CatalogError) -> Self {
        self.client.settings = RwLock::new(Reply::Fail(err));
        self
    }

    /// Delay every answer
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.client.latency = RwLock::new(latency);
        self
    }

    /// Build the mock client
    pub fn build(self) -> MockQueryClient {
        self.client
    }
}
