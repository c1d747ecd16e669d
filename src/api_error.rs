//! Decoding of the `errors` field the API embeds in response bodies.
//!
//! The service is inconsistent about the field's shape: sometimes it is a
//! flat list of strings, sometimes a map of field name to a list of strings.
//! Both decode into one normalized collection.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// Business-rule errors reported inside an otherwise-successful response.
///
/// The API includes an `errors` field even on success, so callers must check
/// [`ApiError::is_empty`] before treating a decoded envelope as a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiError {
    list: Vec<String>,
    map: BTreeMap<String, Vec<String>>,
}

/// Attempt-ordered decode: try the flat list first, then the field map.
/// A third shape would slot in as another variant.
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorShape {
    List(Vec<String>),
    Map(BTreeMap<String, Vec<String>>),
}

impl<'de> Deserialize<'de> for ApiError {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match ErrorShape::deserialize(deserializer)? {
            ErrorShape::List(list) => Self {
                list,
                map: BTreeMap::new(),
            },
            ErrorShape::Map(map) => Self {
                list: Vec::new(),
                map,
            },
        })
    }
}

impl ApiError {
    /// Total number of messages across both shapes.
    pub fn len(&self) -> usize {
        self.list.len() + self.map.values().map(Vec::len).sum::<usize>()
    }

    /// Returns true if the service reported no errors.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The normalized messages. Map-sourced entries are prefixed with their
    /// field name as `"field: message"`; their order follows the map, not
    /// the original payload.
    pub fn messages(&self) -> Vec<String> {
        let mut messages = self.list.clone();
        for (field, msgs) in &self.map {
            for msg in msgs {
                messages.push(format!("{field}: {msg}"));
            }
        }
        messages
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        write!(f, "api error(s): {}", self.messages().join(", "))
    }
}

impl std::error::Error for ApiError {}
