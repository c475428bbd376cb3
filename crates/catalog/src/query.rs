// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata query contract
//!
//! The query text and management keys in this module are part of the
//! compatibility contract with the database and must not change.
//!
//! ## Metadata query
//!
//! [`META_QUERY`] returns five rows, each shaped `(a, result)` where `a` is
//! the category tag and `result` a list:
//!
//! | tag | result |
//! |-----|--------|
//! | `labels` | list of strings |
//! | `relationshipTypes` | list of strings |
//! | `propertyKeys` | list of strings |
//! | `functions` | list of `{name, signature, description}` |
//! | `procedures` | list of `{name, signature, description}` |

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

use crate::error::{CatalogError, CatalogResult};
use crate::metadata::{Invokable, ManagementKey, MetaRecords, ServerInfo};

/// Five-part UNION query fetching labels, types, keys, functions and procedures
pub const META_QUERY: &str = r#"
CALL db.labels() YIELD label
WITH COLLECT(label) AS labels
RETURN 'labels' as a, labels as result
UNION
CALL db.relationshipTypes() YIELD relationshipType
WITH COLLECT(relationshipType) AS relationshipTypes
RETURN 'relationshipTypes' as a, relationshipTypes as result
UNION
CALL db.propertyKeys() YIELD propertyKey
WITH COLLECT(propertyKey) AS propertyKeys
RETURN 'propertyKeys' as a, propertyKeys as result
UNION
CALL dbms.functions() YIELD name, signature, description
WITH collect({name: name, signature: signature, description: description}) as functions
RETURN 'functions' as a, functions AS result
UNION
CALL dbms.procedures() YIELD name, signature, description
WITH collect({name: name, signature: signature, description: description}) as procedures
RETURN 'procedures' as a, procedures as result
"#;

/// Kernel version string, e.g. `neo4j-kernel, version: 3.4.0,abc123`
pub const KERNEL_VERSION: ManagementKey = ManagementKey::new("Kernel", "KernelVersion");

/// Store identifier
pub const STORE_ID: ManagementKey = ManagementKey::new("Kernel", "StoreId");

/// Edition string, e.g. `enterprise`
pub const EDITION: ManagementKey = ManagementKey::new("Configuration", "unsupported.dbms.edition");

/// Management facts fetched every refresh cycle, in this order
pub const MANAGEMENT_KEYS: [ManagementKey; 3] = [KERNEL_VERSION, STORE_ID, EDITION];

/// Namespace of the server settings the console cares about
pub const BROWSER_SETTINGS_PREFIX: &str = "browser.";

const TAG_LABELS: &str = "labels";
const TAG_RELATIONSHIP_TYPES: &str = "relationshipTypes";
const TAG_PROPERTY_KEYS: &str = "propertyKeys";
const TAG_FUNCTIONS: &str = "functions";
const TAG_PROCEDURES: &str = "procedures";

/// One row returned by a query: ordered column names and values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    keys: Vec<String>,
    values: Vec<Value>,
}

impl QueryRecord {
    /// Create a record from `(column, value)` pairs
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let (keys, values) = pairs.into_iter().map(|(k, v)| (k.into(), v)).unzip();
        Self { keys, values }
    }

    /// Value at column position
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value by column name
    pub fn get_by_key(&self, key: &str) -> Option<&Value> {
        let index = self.keys.iter().position(|k| k == key)?;
        self.values.get(index)
    }

    /// Column names
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the record has no columns
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Decode the rows of [`META_QUERY`] into [`MetaRecords`]
///
/// Rows are matched by their tag (first column), so row order does not
/// matter. Every category must be present exactly once.
///
/// # Errors
///
/// Returns `CatalogError::MalformedResponse` if a category is missing or
/// duplicated, a tag is unknown, or a value has the wrong shape.
pub fn decode_meta_records(records: &[QueryRecord]) -> CatalogResult<MetaRecords> {
    let mut labels = None;
    let mut relationship_types = None;
    let mut property_keys = None;
    let mut functions = None;
    let mut procedures = None;

    for record in records {
        let tag = record
            .get(0)
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("row without a category tag"))?;
        let result = record
            .get(1)
            .ok_or_else(|| malformed(format!("row '{}' has no result column", tag)))?;

        let duplicate = match tag {
            TAG_LABELS => labels.replace(decode_strings(tag, result)?).is_some(),
            TAG_RELATIONSHIP_TYPES => relationship_types
                .replace(decode_strings(tag, result)?)
                .is_some(),
            TAG_PROPERTY_KEYS => property_keys.replace(decode_strings(tag, result)?).is_some(),
            TAG_FUNCTIONS => functions.replace(decode_invokables(tag, result)?).is_some(),
            TAG_PROCEDURES => procedures.replace(decode_invokables(tag, result)?).is_some(),
            other => return Err(malformed(format!("unknown category '{}'", other))),
        };
        if duplicate {
            return Err(malformed(format!("category '{}' returned twice", tag)));
        }
    }

    Ok(MetaRecords {
        labels: labels.ok_or_else(|| missing(TAG_LABELS))?,
        relationship_types: relationship_types.ok_or_else(|| missing(TAG_RELATIONSHIP_TYPES))?,
        property_keys: property_keys.ok_or_else(|| missing(TAG_PROPERTY_KEYS))?,
        functions: functions.ok_or_else(|| missing(TAG_FUNCTIONS))?,
        procedures: procedures.ok_or_else(|| missing(TAG_PROCEDURES))?,
    })
}

/// Produce the rows the database would return for [`META_QUERY`]
///
/// Used by clients that answer the query without a database.
pub fn encode_meta_records(meta: &MetaRecords) -> Vec<QueryRecord> {
    let strings = |items: &[String]| Value::from(items.to_vec());
    let invokables = |items: &[Invokable]| {
        Value::Array(
            items
                .iter()
                .map(|inv| {
                    serde_json::json!({
                        "name": inv.name,
                        "signature": inv.signature,
                        "description": inv.description,
                    })
                })
                .collect(),
        )
    };

    [
        (TAG_LABELS, strings(&meta.labels)),
        (TAG_RELATIONSHIP_TYPES, strings(&meta.relationship_types)),
        (TAG_PROPERTY_KEYS, strings(&meta.property_keys)),
        (TAG_FUNCTIONS, invokables(&meta.functions)),
        (TAG_PROCEDURES, invokables(&meta.procedures)),
    ]
    .into_iter()
    .map(|(tag, result)| {
        QueryRecord::from_pairs([("a", Value::from(tag)), ("result", result)])
    })
    .collect()
}

/// Extract the version number from a kernel version string
///
/// The canonical format is `<product>, version: <X>,<build>`. Strings of the
/// shorter form `<Product>/<X>, ...` are accepted as well.
///
/// # Examples
///
/// ```
/// use graphmeta_catalog::query::parse_kernel_version;
///
/// assert_eq!(
///     parse_kernel_version("neo4j-kernel, version: 3.4.0,a1b2c3").as_deref(),
///     Some("3.4.0")
/// );
/// assert_eq!(parse_kernel_version("Neo4j/3.4.0, blah").as_deref(), Some("3.4.0"));
/// assert_eq!(parse_kernel_version("unknown"), None);
/// ```
pub fn parse_kernel_version(kernel_version: &str) -> Option<String> {
    static VERSION_FIELD: OnceLock<Option<Regex>> = OnceLock::new();
    static PRODUCT_SLASH: OnceLock<Option<Regex>> = OnceLock::new();

    let version_field = VERSION_FIELD
        .get_or_init(|| Regex::new(r"version:\s([^,]+),").ok())
        .as_ref()?;
    if let Some(caps) = version_field.captures(kernel_version) {
        return caps.get(1).map(|m| m.as_str().trim().to_string());
    }

    let product_slash = PRODUCT_SLASH
        .get_or_init(|| Regex::new(r"^[A-Za-z][\w.-]*/([^,\s]+)").ok())
        .as_ref()?;
    product_slash
        .captures(kernel_version.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Build [`ServerInfo`] from values fetched for [`MANAGEMENT_KEYS`]
///
/// # Errors
///
/// Returns `CatalogError::MalformedResponse` if the number of facts does not
/// match the keys, the kernel version is absent, or its version cannot be
/// parsed.
pub fn server_info_from_facts(facts: &[Option<String>]) -> CatalogResult<ServerInfo> {
    let [kernel_version, store_id, edition] = facts else {
        return Err(malformed(format!(
            "expected {} management facts, got {}",
            MANAGEMENT_KEYS.len(),
            facts.len()
        )));
    };

    let kernel_version = kernel_version
        .as_deref()
        .ok_or_else(|| malformed(format!("{} not reported", KERNEL_VERSION)))?;
    let version = parse_kernel_version(kernel_version).ok_or_else(|| {
        malformed(format!(
            "cannot parse version from kernel version '{}'",
            kernel_version
        ))
    })?;

    Ok(ServerInfo::new(Some(version), edition.clone(), store_id.clone()))
}

fn decode_strings(tag: &str, value: &Value) -> CatalogResult<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| malformed(format!("'{}' result is not a list", tag)))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| malformed(format!("'{}' contains a non-string entry", tag)))
        })
        .collect()
}

fn decode_invokables(tag: &str, value: &Value) -> CatalogResult<Vec<Invokable>> {
    let items = value
        .as_array()
        .ok_or_else(|| malformed(format!("'{}' result is not a list", tag)))?;
    items
        .iter()
        .map(|item| {
            let name = item
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| malformed(format!("'{}' entry without a name", tag)))?;
            let text = |field: &str| {
                item.get(field)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            Ok(Invokable {
                name: name.to_string(),
                signature: text("signature"),
                description: text("description"),
            })
        })
        .collect()
}

fn missing(tag: &str) -> CatalogError {
    malformed(format!("category '{}' missing from response", tag))
}

fn malformed(reason: impl Into<String>) -> CatalogError {
    CatalogError::MalformedResponse(reason.into())
}
