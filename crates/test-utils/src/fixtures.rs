// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Test fixtures and sample server responses

use graphmeta_catalog::{Invokable, MetaRecords, Settings};
use serde_json::Value;

/// Sample metadata answers for testing
pub struct MetaFixtures;

impl MetaFixtures {
    // ===== Schema metadata =====

    /// The movies example graph
    pub fn movies() -> MetaRecords {
        MetaRecords::new()
            .with_labels(["Person", "Movie"])
            .with_relationship_types(["ACTED_IN", "DIRECTED"])
            .with_property_keys(["name", "born", "title", "released"])
            .with_functions(vec![
                Invokable::new("date", "date(input :: ANY?) :: (DATE?)")
                    .with_description("Create a Date instance."),
            ])
            .with_procedures(vec![
                Invokable::new("db.labels", "db.labels() :: (label :: STRING?)")
                    .with_description("List all labels in the database."),
                Invokable::new(
                    "db.propertyKeys",
                    "db.propertyKeys() :: (propertyKey :: STRING?)",
                )
                .with_description("List all property keys in the database."),
            ])
    }

    /// A different graph, for telling contexts apart
    pub fn northwind() -> MetaRecords {
        MetaRecords::new()
            .with_labels(["Customer", "Order", "Product"])
            .with_relationship_types(["PURCHASED", "ORDERS"])
            .with_property_keys(["customerID", "orderID"])
    }

    // ===== Management facts =====

    /// Facts of a community server, in `MANAGEMENT_KEYS` order
    pub fn community_facts() -> Vec<Option<String>> {
        vec![
            Some("neo4j-kernel, version: 3.4.0,4fd91cb".to_string()),
            Some("store-community".to_string()),
            Some("community".to_string()),
        ]
    }

    /// Facts of an enterprise server, in `MANAGEMENT_KEYS` order
    pub fn enterprise_facts() -> Vec<Option<String>> {
        vec![
            Some("neo4j-kernel, version: 3.5.1,9a2b3c".to_string()),
            Some("store-enterprise".to_string()),
            Some("enterprise".to_string()),
        ]
    }

    /// Facts whose kernel version string cannot be parsed
    pub fn unparsable_facts() -> Vec<Option<String>> {
        vec![
            Some("kernel build 2024".to_string()),
            Some("store-odd".to_string()),
            Some("community".to_string()),
        ]
    }

    // ===== Settings =====

    /// Browser settings allowing outgoing connections
    pub fn browser_settings(allow_outgoing: bool) -> Settings {
        let mut settings = Settings::new();
        settings.insert(
            "browser.allow_outgoing_connections".to_string(),
            Value::from(allow_outgoing.to_string()),
        );
        settings.insert(
            "browser.remote_content_hostname_whitelist".to_string(),
            Value::from("guides.neo4j.com"),
        );
        settings
    }
}
