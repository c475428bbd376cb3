// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata state
//!
//! The cached metadata snapshot and its pure transitions. Every transition
//! takes the current state by reference and returns a new state; nothing here
//! performs I/O or can fail.
//!
//! ## Context tagging
//!
//! Schema entries carry the [`Context`] of the session they were fetched for.
//! Updating one context replaces only that context's entries and keeps the
//! relative order of everything else.

use graphmeta_catalog::{Invokable, MetaRecords, ServerInfo, Settings};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// Setting that gates loading remote content in the console
pub const ALLOW_OUTGOING_CONNECTIONS: &str = "browser.allow_outgoing_connections";

/// Edition string reported by enterprise servers
pub const ENTERPRISE_EDITION: &str = "enterprise";

/// Tag identifying which session a cached entry belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(String);

impl Context {
    /// Create a context tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The tag as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Context {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for Context {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

/// A label, relationship type or property key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetaEntry {
    pub value: String,
    pub context: Context,
}

impl MetaEntry {
    pub fn new(value: impl Into<String>, context: impl Into<Context>) -> Self {
        Self {
            value: value.into(),
            context: context.into(),
        }
    }
}

/// A function or procedure
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvokableEntry {
    pub name: String,
    pub context: Context,
    pub signature: String,
    pub description: String,
}

impl InvokableEntry {
    fn tagged(invokable: &Invokable, context: &Context) -> Self {
        Self {
            name: invokable.name.clone(),
            context: context.clone(),
            signature: invokable.signature.clone(),
            description: invokable.description.clone(),
        }
    }
}

trait Tagged {
    fn context(&self) -> &Context;

    /// What makes two entries of one context the same entry
    fn identity(&self) -> &str;
}

impl Tagged for MetaEntry {
    fn context(&self) -> &Context {
        &self.context
    }

    fn identity(&self) -> &str {
        &self.value
    }
}

impl Tagged for InvokableEntry {
    fn context(&self) -> &Context {
        &self.context
    }

    fn identity(&self) -> &str {
        &self.name
    }
}

/// Drop `context`'s entries from `existing`, then append `fresh`
///
/// Repeated identities in `fresh` keep only their first occurrence.
fn replace_context<T, I>(existing: &[T], context: &Context, fresh: I) -> Vec<T>
where
    T: Tagged + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    let fresh = fresh
        .into_iter()
        .filter(|entry| seen.insert(entry.identity().to_string()));

    existing
        .iter()
        .filter(|entry| entry.context() != context)
        .cloned()
        .chain(fresh)
        .collect()
}

fn in_context<T: Tagged + Clone>(entries: &[T], context: &Context) -> Vec<T> {
    entries
        .iter()
        .filter(|entry| entry.context() == context)
        .cloned()
        .collect()
}

/// Schema metadata of a single context
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextMeta {
    pub labels: Vec<MetaEntry>,
    pub relationship_types: Vec<MetaEntry>,
    pub properties: Vec<MetaEntry>,
    pub functions: Vec<InvokableEntry>,
    pub procedures: Vec<InvokableEntry>,
}

/// A state transition
#[derive(Debug, Clone, PartialEq)]
pub enum MetaAction {
    /// Replace the schema metadata of one context
    UpdateMeta { meta: MetaRecords, context: Context },
    /// Replace server version, edition and store id
    UpdateServer(ServerInfo),
    /// Replace the settings mapping
    UpdateSettings(Settings),
    /// Return to defaults
    Clear,
}

/// The cached metadata snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataState {
    pub labels: Vec<MetaEntry>,
    pub relationship_types: Vec<MetaEntry>,
    pub properties: Vec<MetaEntry>,
    pub functions: Vec<InvokableEntry>,
    pub procedures: Vec<InvokableEntry>,
    pub server: ServerInfo,
    pub settings: Settings,
}

impl Default for MetadataState {
    fn default() -> Self {
        let mut settings = Settings::new();
        settings.insert(ALLOW_OUTGOING_CONNECTIONS.to_string(), Value::Bool(false));

        Self {
            labels: Vec::new(),
            relationship_types: Vec::new(),
            properties: Vec::new(),
            functions: Vec::new(),
            procedures: Vec::new(),
            server: ServerInfo::default(),
            settings,
        }
    }
}

impl MetadataState {
    /// Apply a transition
    pub fn reduce(&self, action: MetaAction) -> Self {
        match action {
            MetaAction::UpdateMeta { meta, context } => {
                self.apply_metadata_update(&meta, &context)
            }
            MetaAction::UpdateServer(server) => self.apply_server_info(server),
            MetaAction::UpdateSettings(settings) => self.apply_settings(settings),
            MetaAction::Clear => self.reset(),
        }
    }

    /// Replace every schema entry of `context` with freshly fetched ones
    ///
    /// New entries are appended in query order; other contexts keep their
    /// entries and their relative order.
    pub fn apply_metadata_update(&self, meta: &MetaRecords, context: &Context) -> Self {
        let values = |items: &[String]| -> Vec<MetaEntry> {
            items
                .iter()
                .map(|value| MetaEntry::new(value.clone(), context.clone()))
                .collect()
        };
        let invokables = |items: &[Invokable]| -> Vec<InvokableEntry> {
            items
                .iter()
                .map(|inv| InvokableEntry::tagged(inv, context))
                .collect()
        };

        Self {
            labels: replace_context(&self.labels, context, values(&meta.labels)),
            relationship_types: replace_context(
                &self.relationship_types,
                context,
                values(&meta.relationship_types),
            ),
            properties: replace_context(&self.properties, context, values(&meta.property_keys)),
            functions: replace_context(&self.functions, context, invokables(&meta.functions)),
            procedures: replace_context(&self.procedures, context, invokables(&meta.procedures)),
            server: self.server.clone(),
            settings: self.settings.clone(),
        }
    }

    /// Replace server info wholesale
    pub fn apply_server_info(&self, server: ServerInfo) -> Self {
        Self {
            server,
            ..self.clone()
        }
    }

    /// Replace settings wholesale
    pub fn apply_settings(&self, settings: Settings) -> Self {
        Self {
            settings,
            ..self.clone()
        }
    }

    /// The default state, whatever `self` holds
    pub fn reset(&self) -> Self {
        Self::default()
    }

    // ===== Selectors =====

    /// Schema metadata tagged with `context`
    pub fn meta_in_context(&self, context: &Context) -> ContextMeta {
        ContextMeta {
            labels: in_context(&self.labels, context),
            relationship_types: in_context(&self.relationship_types, context),
            properties: in_context(&self.properties, context),
            functions: in_context(&self.functions, context),
            procedures: in_context(&self.procedures, context),
        }
    }

    pub fn version(&self) -> Option<&str> {
        self.server.version.as_deref()
    }

    pub fn edition(&self) -> Option<&str> {
        self.server.edition.as_deref()
    }

    pub fn store_id(&self) -> Option<&str> {
        self.server.store_id.as_deref()
    }

    /// Exact, case-sensitive match on the edition string
    pub fn is_enterprise(&self) -> bool {
        self.edition() == Some(ENTERPRISE_EDITION)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn setting(&self, name: &str) -> Option<&Value> {
        self.settings.get(name)
    }

    /// Whether the console may load remote content
    ///
    /// Servers report config values as strings, so both `true` and `"true"`
    /// count. Anything else, including a missing entry, is `false`.
    pub fn allow_outgoing_connections(&self) -> bool {
        match self.setting(ALLOW_OUTGOING_CONNECTIONS) {
            Some(Value::Bool(allowed)) => *allowed,
            Some(Value::String(text)) => text.trim().eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphmeta_catalog::query::{decode_meta_records, encode_meta_records};

    fn labels(state: &MetadataState) -> Vec<(&str, &str)> {
        state
            .labels
            .iter()
            .map(|e| (e.value.as_str(), e.context.as_str()))
            .collect()
    }

    fn movies() -> MetaRecords {
        MetaRecords::new()
            .with_labels(["Person", "Movie"])
            .with_relationship_types(["ACTED_IN"])
            .with_property_keys(["name"])
            .with_functions(vec![Invokable::new("date", "date() :: DATE?")])
            .with_procedures(vec![
                Invokable::new("db.labels", "db.labels() :: (label :: STRING?)")
                    .with_description("List all labels"),
            ])
    }

    #[test]
    fn test_default_state() {
        let state = MetadataState::default();
        assert!(state.labels.is_empty());
        assert!(state.procedures.is_empty());
        assert_eq!(state.server, ServerInfo::default());
        assert_eq!(state.settings.len(), 1);
        assert_eq!(state.setting(ALLOW_OUTGOING_CONNECTIONS), Some(&Value::Bool(false)));
        assert!(!state.allow_outgoing_connections());
        assert!(!state.is_enterprise());
    }

    #[test]
    fn test_update_tags_entries_with_context() {
        let ctx = Context::from("ctx1");
        let state = MetadataState::default().apply_metadata_update(&movies(), &ctx);

        assert_eq!(labels(&state), vec![("Person", "ctx1"), ("Movie", "ctx1")]);
        assert_eq!(state.relationship_types, vec![MetaEntry::new("ACTED_IN", "ctx1")]);
        assert_eq!(state.properties, vec![MetaEntry::new("name", "ctx1")]);
        assert_eq!(state.functions[0].name, "date");
        assert_eq!(state.functions[0].context, ctx);
        assert_eq!(state.procedures[0].description, "List all labels");
    }

    #[test]
    fn test_update_keeps_other_contexts() {
        let a = Context::from("a");
        let b = Context::from("b");
        let state = MetadataState::default()
            .apply_metadata_update(&MetaRecords::new().with_labels(["A1", "A2"]), &a)
            .apply_metadata_update(&MetaRecords::new().with_labels(["B1"]), &b)
            .apply_metadata_update(&MetaRecords::new().with_labels(["B2", "B3"]), &b);

        assert_eq!(
            labels(&state),
            vec![("A1", "a"), ("A2", "a"), ("B2", "b"), ("B3", "b")]
        );
    }

    #[test]
    fn test_update_moves_refreshed_context_to_end() {
        let a = Context::from("a");
        let b = Context::from("b");
        let state = MetadataState::default()
            .apply_metadata_update(&MetaRecords::new().with_labels(["A"]), &a)
            .apply_metadata_update(&MetaRecords::new().with_labels(["B"]), &b)
            .apply_metadata_update(&MetaRecords::new().with_labels(["A'"]), &a);

        assert_eq!(labels(&state), vec![("B", "b"), ("A'", "a")]);
    }

    #[test]
    fn test_update_drops_repeated_entries() {
        let rows = encode_meta_records(
            &MetaRecords::new()
                .with_labels(["Person", "Movie", "Person"])
                .with_procedures(vec![
                    Invokable::new("db.labels", "db.labels()"),
                    Invokable::new("db.labels", "db.labels() :: (label :: STRING?)"),
                ]),
        );
        let meta = decode_meta_records(&rows).unwrap();
        let ctx = Context::from("ctx1");

        let state = MetadataState::default()
            .apply_metadata_update(&meta, &ctx)
            .apply_metadata_update(&meta, &ctx);

        assert_eq!(labels(&state), vec![("Person", "ctx1"), ("Movie", "ctx1")]);
        assert_eq!(state.procedures.len(), 1);
        assert_eq!(state.procedures[0].signature, "db.labels()");

        // The same value in another context is a separate entry.
        let state = state.apply_metadata_update(&meta, &Context::from("ctx2"));
        let people = state.labels.iter().filter(|e| e.value == "Person").count();
        assert_eq!(people, 2);
    }

    #[test]
    fn test_update_with_empty_records_clears_context() {
        let ctx = Context::from("ctx");
        let state = MetadataState::default()
            .apply_metadata_update(&movies(), &ctx)
            .apply_metadata_update(&MetaRecords::new(), &ctx);

        assert_eq!(state.meta_in_context(&ctx), ContextMeta::default());
    }

    #[test]
    fn test_update_leaves_server_and_settings() {
        let state = MetadataState::default()
            .apply_server_info(ServerInfo::new(Some("3.4.0".into()), None, None))
            .apply_metadata_update(&movies(), &Context::from("x"));
        assert_eq!(state.version(), Some("3.4.0"));
        assert_eq!(state.settings, MetadataState::default().settings);
    }

    #[test]
    fn test_server_info_replaced_wholesale() {
        let state = MetadataState::default()
            .apply_server_info(ServerInfo::new(
                Some("3.4.0".into()),
                Some("enterprise".into()),
                Some("store-1".into()),
            ))
            .apply_server_info(ServerInfo::new(Some("3.5.0".into()), None, None));

        assert_eq!(state.version(), Some("3.5.0"));
        assert_eq!(state.edition(), None);
        assert_eq!(state.store_id(), None);
    }

    #[test]
    fn test_settings_replaced_wholesale() {
        let mut first = Settings::new();
        first.insert(ALLOW_OUTGOING_CONNECTIONS.into(), Value::from("true"));
        first.insert("browser.post_connect_cmd".into(), Value::from("play movies"));
        let mut second = Settings::new();
        second.insert("browser.retain_connection_credentials".into(), Value::from("false"));

        let state = MetadataState::default().apply_settings(first);
        assert!(state.allow_outgoing_connections());

        let state = state.apply_settings(second);
        assert_eq!(state.settings.len(), 1);
        assert!(!state.allow_outgoing_connections());
    }

    #[test]
    fn test_allow_outgoing_connections_values() {
        let with = |value: Value| {
            let mut settings = Settings::new();
            settings.insert(ALLOW_OUTGOING_CONNECTIONS.into(), value);
            MetadataState::default().apply_settings(settings)
        };

        assert!(with(Value::Bool(true)).allow_outgoing_connections());
        assert!(with(Value::from("true")).allow_outgoing_connections());
        assert!(with(Value::from("TRUE")).allow_outgoing_connections());
        assert!(!with(Value::from("false")).allow_outgoing_connections());
        assert!(!with(Value::from(1)).allow_outgoing_connections());
        assert!(!with(Value::Null).allow_outgoing_connections());
    }

    #[test]
    fn test_is_enterprise_is_exact() {
        let with_edition = |edition: &str| {
            MetadataState::default().apply_server_info(ServerInfo::new(
                None,
                Some(edition.to_string()),
                None,
            ))
        };

        assert!(with_edition("enterprise").is_enterprise());
        assert!(!with_edition("Enterprise").is_enterprise());
        assert!(!with_edition("community").is_enterprise());
        assert!(!with_edition("enterprise ").is_enterprise());
    }

    #[test]
    fn test_reset_from_any_state() {
        let state = MetadataState::default()
            .apply_metadata_update(&movies(), &Context::from("a"))
            .apply_server_info(ServerInfo::new(Some("3.4.0".into()), None, None))
            .apply_settings(Settings::new());

        assert_eq!(state.reset(), MetadataState::default());
        assert_eq!(state.reduce(MetaAction::Clear), MetadataState::default());
    }

    #[test]
    fn test_reduce_dispatches_actions() {
        let ctx = Context::from("ctx");
        let state = MetadataState::default().reduce(MetaAction::UpdateMeta {
            meta: movies(),
            context: ctx.clone(),
        });
        assert_eq!(state.meta_in_context(&ctx).labels.len(), 2);

        let state = state.reduce(MetaAction::UpdateServer(ServerInfo::new(
            None,
            Some("enterprise".into()),
            None,
        )));
        assert!(state.is_enterprise());

        let state = state.reduce(MetaAction::UpdateSettings(Settings::new()));
        assert!(state.settings().is_empty());
    }

    #[test]
    fn test_meta_in_context_filters() {
        let a = Context::from("a");
        let b = Context::from("b");
        let state = MetadataState::default()
            .apply_metadata_update(&movies(), &a)
            .apply_metadata_update(&MetaRecords::new().with_labels(["Other"]), &b);

        let meta_a = state.meta_in_context(&a);
        assert_eq!(meta_a.labels.len(), 2);
        assert_eq!(meta_a.procedures.len(), 1);

        let meta_b = state.meta_in_context(&b);
        assert_eq!(meta_b.labels, vec![MetaEntry::new("Other", "b")]);
        assert!(meta_b.functions.is_empty());

        assert_eq!(state.meta_in_context(&Context::from("c")), ContextMeta::default());
    }

    #[test]
    fn test_state_serializes_to_json() {
        let state = MetadataState::default()
            .apply_metadata_update(&MetaRecords::new().with_labels(["Person"]), &Context::from("t"));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["labels"][0]["value"], "Person");
        assert_eq!(json["labels"][0]["context"], "t");
        assert_eq!(json["settings"][ALLOW_OUTGOING_CONNECTIONS], false);
    }
}
