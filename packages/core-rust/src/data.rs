//! Generic record document used by the downstream records API.
//!
//! Records are trees of named groups and atomics. On the wire a group is
//! `{"name": .., "children": [..]}` and an atomic is `{"name": .., "value": ..}`,
//! both with an optional `repeatId`. Links to other records are groups holding
//! the atomics `linkedRecordType` and `linkedRecordId`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Child name holding the type of a linked record.
pub const LINKED_RECORD_TYPE: &str = "linkedRecordType";

/// Child name holding the id of a linked record.
pub const LINKED_RECORD_ID: &str = "linkedRecordId";

/// A leaf value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataAtomic {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub repeat_id: Option<String>,
}

impl DataAtomic {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            repeat_id: None,
        }
    }
}

/// A named container of children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataGroup {
    pub name: String,
    #[serde(default)]
    pub children: Vec<DataElement>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub repeat_id: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub attributes: BTreeMap<String, String>,
}

/// Either kind of child. Atomics are tried first when deserializing since a
/// group never carries a `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataElement {
    Atomic(DataAtomic),
    Group(DataGroup),
}

impl DataElement {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Atomic(atomic) => &atomic.name,
            Self::Group(group) => &group.name,
        }
    }
}

impl From<DataAtomic> for DataElement {
    fn from(atomic: DataAtomic) -> Self {
        Self::Atomic(atomic)
    }
}

impl From<DataGroup> for DataElement {
    fn from(group: DataGroup) -> Self {
        Self::Group(group)
    }
}

impl DataGroup {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            repeat_id: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Creates a link group named `name` pointing at `linked_type`/`linked_id`.
    #[must_use]
    pub fn link(
        name: impl Into<String>,
        linked_type: impl Into<String>,
        linked_id: impl Into<String>,
    ) -> Self {
        Self::new(name)
            .with_child(DataAtomic::new(LINKED_RECORD_TYPE, linked_type))
            .with_child(DataAtomic::new(LINKED_RECORD_ID, linked_id))
    }

    #[must_use]
    pub fn with_child(mut self, child: impl Into<DataElement>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn add_child(&mut self, child: impl Into<DataElement>) {
        self.children.push(child.into());
    }

    /// Value of the first atomic child with the given name.
    #[must_use]
    pub fn first_atomic_value(&self, name: &str) -> Option<&str> {
        self.children.iter().find_map(|child| match child {
            DataElement::Atomic(atomic) if atomic.name == name => Some(atomic.value.as_str()),
            _ => None,
        })
    }

    /// First group child with the given name.
    #[must_use]
    pub fn first_group(&self, name: &str) -> Option<&DataGroup> {
        self.children.iter().find_map(|child| match child {
            DataElement::Group(group) if group.name == name => Some(group),
            _ => None,
        })
    }

    #[must_use]
    pub fn contains_child(&self, name: &str) -> bool {
        self.children.iter().any(|child| child.name() == name)
    }

    /// Returns `(linkedRecordType, linkedRecordId)` when this group is a link.
    #[must_use]
    pub fn as_link(&self) -> Option<(&str, &str)> {
        Some((
            self.first_atomic_value(LINKED_RECORD_TYPE)?,
            self.first_atomic_value(LINKED_RECORD_ID)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn link_serializes_as_group_with_linked_atomics() {
        let link = DataGroup::link("recordType", "recordType", "place");
        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "recordType",
                "children": [
                    {"name": "linkedRecordType", "value": "recordType"},
                    {"name": "linkedRecordId", "value": "place"}
                ]
            })
        );
        assert_eq!(link.as_link(), Some(("recordType", "place")));
    }

    #[test]
    fn repeat_id_and_attributes_are_written_only_when_set() {
        let mut atomic = DataAtomic::new("title", "x");
        atomic.repeat_id = Some("0".to_string());
        let mut group = DataGroup::new("root").with_child(atomic);
        group
            .attributes
            .insert("type".to_string(), "index".to_string());

        let value = serde_json::to_value(&group).unwrap();
        assert_eq!(value["children"][0]["repeatId"], "0");
        assert_eq!(value["attributes"]["type"], "index");

        let plain = serde_json::to_value(DataGroup::new("root")).unwrap();
        assert_eq!(plain, json!({"name": "root", "children": []}));
    }

    #[test]
    fn deserializes_nested_groups_and_atomics() {
        // Shape of an app-token verifier response body.
        let raw = r#"{
            "name": "authToken",
            "children": [
                {"name": "id", "value": "a1acff95-5849-4e10-9ee9-4b192aef17fd"},
                {"name": "validForNoSeconds", "value": "600"},
                {"name": "user", "children": [
                    {"name": "linkedRecordType", "value": "user"},
                    {"name": "linkedRecordId", "value": "141414"}
                ]}
            ]
        }"#;
        let group: DataGroup = serde_json::from_str(raw).unwrap();

        assert_eq!(
            group.first_atomic_value("id"),
            Some("a1acff95-5849-4e10-9ee9-4b192aef17fd")
        );
        assert_eq!(group.first_group("user").and_then(DataGroup::as_link), Some(("user", "141414")));
        assert!(group.contains_child("validForNoSeconds"));
        assert!(group.first_group("id").is_none());
        assert!(group.first_atomic_value("missing").is_none());
    }

    #[test]
    fn group_without_link_children_is_not_a_link() {
        let group = DataGroup::new("recordType").with_child(DataAtomic::new(LINKED_RECORD_ID, "x"));
        assert!(group.as_link().is_none());
    }
}
