// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Dynamically typed view of Rancher API payloads.
//!
//! Rancher's Steve and Norman APIs return loosely structured JSON whose shape drifts
//! between releases and vendors. Instead of deserializing into rigid structs, records are
//! decoded into [`Field`], an explicit tagged tree, and individual values are pulled out
//! by dotted path (`"status.nodeRef.name"`).
//!
//! Numbers are kept as their original decimal text. `serde_json` is built with the
//! `arbitrary_precision` feature, so a 20-digit inventory ID survives decoding unchanged
//! instead of being rounded through `f64`.
//!
//! # Example
//!
//! ```rust
//! use elemental_node_map::value::Field;
//!
//! let record: Field = serde_json::from_str(
//!     r#"{"status": {"nodeRef": {"name": "node-1"}}, "spec": {"serial": 123456789012345678901234}}"#,
//! ).unwrap();
//!
//! assert_eq!(record.text("status.nodeRef.name").as_deref(), Some("node-1"));
//! assert_eq!(record.text("spec.serial").as_deref(), Some("123456789012345678901234"));
//! ```

use crate::fields::ADDRESS_OBJECT_KEYS;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// A node of a decoded JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field {
    /// JSON `null`
    #[default]
    Null,
    /// JSON boolean
    Bool(bool),
    /// JSON number, as the decimal text it was sent with
    Number(String),
    /// JSON string
    Text(String),
    /// JSON array
    List(Vec<Field>),
    /// JSON object
    Map(BTreeMap<String, Field>),
}

impl From<serde_json::Value> for Field {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Field::Null,
            serde_json::Value::Bool(b) => Field::Bool(b),
            serde_json::Value::Number(n) => Field::Number(n.to_string()),
            serde_json::Value::String(s) => Field::Text(s),
            serde_json::Value::Array(items) => {
                Field::List(items.into_iter().map(Field::from).collect())
            }
            serde_json::Value::Object(entries) => Field::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Field::from(value)))
                    .collect(),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Field::from)
    }
}

impl Field {
    /// Resolve a dotted path.
    ///
    /// Every intermediate step must be a [`Field::Map`]. When the next segment is not a
    /// key of the current map, the whole remainder of the path is tried as one literal
    /// key, so label keys containing dots (`metadata.labels.cluster.x-k8s.io/cluster-name`)
    /// resolve as expected.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Field> {
        if path.is_empty() {
            return None;
        }
        let mut current = self;
        let mut rest = path;
        loop {
            let Field::Map(entries) = current else {
                return None;
            };
            let (segment, tail) = match rest.split_once('.') {
                Some((segment, tail)) => (segment, Some(tail)),
                None => (rest, None),
            };
            match (entries.get(segment), tail) {
                (Some(found), None) => return Some(found),
                (Some(found), Some(tail)) if matches!(found, Field::Map(_)) => {
                    current = found;
                    rest = tail;
                }
                _ => return entries.get(rest).filter(|_| tail.is_some()),
            }
        }
    }

    /// Scalar-to-text coercion.
    ///
    /// Strings pass through verbatim, numbers keep their decimal text and booleans render
    /// as `true`/`false`. Empty strings, `null` and collections yield `None`.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Field::Text(s) if !s.is_empty() => Some(s.clone()),
            Field::Number(n) => Some(n.clone()),
            Field::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Text at `path`, see [`Field::as_text`].
    #[must_use]
    pub fn text(&self, path: &str) -> Option<String> {
        self.lookup(path).and_then(Field::as_text)
    }

    /// Interpret this node as a list of strings.
    ///
    /// A list of scalars becomes a list of trimmed, non-empty strings; a lone scalar
    /// becomes a one-element list.
    #[must_use]
    pub fn as_string_list(&self) -> Option<Vec<String>> {
        let raw: Vec<String> = match self {
            Field::List(items) => items.iter().filter_map(Field::as_text).collect(),
            other => other.as_text().into_iter().collect(),
        };
        non_empty(trimmed(raw))
    }

    /// Extract IP address strings.
    ///
    /// Handles plain strings, lists of strings and Kubernetes-style address objects
    /// (`{"type": "InternalIP", "address": "10.0.0.1"}`) in any nesting of lists.
    #[must_use]
    pub fn as_ip_list(&self) -> Option<Vec<String>> {
        let mut raw = Vec::new();
        collect_addresses(self, &mut raw);
        non_empty(trimmed(raw))
    }

    /// Interpret this node as a string map; non-scalar entries are skipped.
    #[must_use]
    pub fn as_string_map(&self) -> Option<BTreeMap<String, String>> {
        let Field::Map(entries) = self else {
            return None;
        };
        let map: BTreeMap<String, String> = entries
            .iter()
            .filter_map(|(key, value)| scalar_text(value).map(|text| (key.clone(), text)))
            .collect();
        (!map.is_empty()).then_some(map)
    }

    /// First non-empty text among `paths`.
    #[must_use]
    pub fn first_text(&self, paths: &[&str]) -> Option<String> {
        paths.iter().find_map(|path| self.text(path))
    }

    /// First non-empty IP list among `paths`.
    #[must_use]
    pub fn first_ip_list(&self, paths: &[&str]) -> Option<Vec<String>> {
        paths
            .iter()
            .find_map(|path| self.lookup(path).and_then(Field::as_ip_list))
    }

    /// First non-empty string list among `paths`.
    #[must_use]
    pub fn first_string_list(&self, paths: &[&str]) -> Option<Vec<String>> {
        paths
            .iter()
            .find_map(|path| self.lookup(path).and_then(Field::as_string_list))
    }

    /// First non-empty string map among `paths`.
    #[must_use]
    pub fn first_string_map(&self, paths: &[&str]) -> Option<BTreeMap<String, String>> {
        paths
            .iter()
            .find_map(|path| self.lookup(path).and_then(Field::as_string_map))
    }
}

/// Map values keep empty strings, unlike [`Field::as_text`].
fn scalar_text(value: &Field) -> Option<String> {
    match value {
        Field::Text(s) => Some(s.clone()),
        other => other.as_text(),
    }
}

fn collect_addresses(value: &Field, out: &mut Vec<String>) {
    match value {
        Field::Text(s) => out.push(s.clone()),
        Field::List(items) => {
            for item in items {
                collect_addresses(item, out);
            }
        }
        Field::Map(entries) => {
            if let Some(address) = ADDRESS_OBJECT_KEYS
                .iter()
                .find_map(|key| entries.get(*key))
                .and_then(scalar_text)
            {
                out.push(address);
            }
        }
        Field::Null | Field::Bool(_) | Field::Number(_) => {}
    }
}

fn trimmed(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    (!values.is_empty()).then_some(values)
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod value_tests;
