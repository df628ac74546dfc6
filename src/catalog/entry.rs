use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::resolver::{self, Resolution};

/// Lowercase an identifier into its catalog key form.
pub fn normalize_key(identifier: &str) -> String {
    identifier.to_lowercase()
}

/// Display metadata for one identifier. Serialized in the upstream `{value, description, type, systemName}` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Canonical lowercased identifier; the map key this entry is stored under.
    #[serde(skip_serializing, default)]
    pub key: String,
    #[serde(rename = "value")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Classification tag: weapon slot for items, mission type for star chart nodes.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(rename = "systemName", default, skip_serializing_if = "Option::is_none")]
    pub system_name: Option<String>,
}

/// Fields one payload record contributes for a key. Every field is optional; an entry
/// is only materialized once some record supplied a display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFields {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub item_type: Option<String>,
    pub system_name: Option<String>,
}

impl EntryFields {
    pub fn named(display_name: impl Into<String>) -> Self {
        EntryFields {
            display_name: Some(display_name.into()),
            ..EntryFields::default()
        }
    }

    pub fn has_display_name(&self) -> bool {
        self.display_name.is_some()
    }

    /// Fill fields that are still unset from `other`. Fields already set are never replaced.
    pub fn augment(&mut self, other: EntryFields) {
        fill(&mut self.display_name, other.display_name);
        fill(&mut self.description, other.description);
        fill(&mut self.item_type, other.item_type);
        fill(&mut self.system_name, other.system_name);
    }

    pub(crate) fn into_entry(self, key: String) -> Option<CatalogEntry> {
        Some(CatalogEntry {
            key,
            display_name: self.display_name?,
            description: self.description,
            item_type: self.item_type,
            system_name: self.system_name,
        })
    }
}

fn fill(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        *slot = value;
    }
}

/// Immutable lookup table keyed by lowercased identifier.
///
/// Keys are kept sorted so prefix scans are range queries and ties resolve the same way
/// on every build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    pub(crate) fn from_entries(entries: BTreeMap<String, CatalogEntry>) -> Self {
        Catalog { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact lookup; the identifier is lowercased first.
    pub fn get(&self, identifier: &str) -> Option<&CatalogEntry> {
        self.entries.get(&normalize_key(identifier))
    }

    pub fn contains_key(&self, identifier: &str) -> bool {
        self.get(identifier).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn entries(&self) -> &BTreeMap<String, CatalogEntry> {
        &self.entries
    }

    /// Fuzzy lookup through the resolver's fallback chain.
    pub fn resolve(&self, identifier: &str) -> Option<Resolution<'_>> {
        resolver::resolve(identifier, self)
    }

    /// Display string for an identifier: the resolved name, else `placeholder`, else the raw identifier.
    pub fn display_name(&self, identifier: &str, placeholder: Option<&str>) -> String {
        match self.resolve(identifier) {
            Some(found) => found.entry.display_name.clone(),
            None => placeholder.unwrap_or(identifier).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn augment_keeps_existing_fields_and_fills_missing_ones() {
        let mut fields = EntryFields::named("Vent Fan");
        fields.augment(EntryFields {
            display_name: Some("Other Name".to_string()),
            description: Some("Moves air.".to_string()),
            ..EntryFields::default()
        });
        assert_eq!(fields.display_name.as_deref(), Some("Vent Fan"));
        assert_eq!(fields.description.as_deref(), Some("Moves air."));
    }

    #[test]
    fn fields_without_display_name_do_not_become_entries() {
        let fields = EntryFields {
            description: Some("orphan".to_string()),
            ..EntryFields::default()
        };
        assert!(fields.into_entry("key".to_string()).is_none());
    }

    #[test]
    fn entry_serializes_in_upstream_shape() {
        let entry = CatalogEntry {
            key: "sol".to_string(),
            display_name: "Mercury".to_string(),
            description: None,
            item_type: Some("Survival".to_string()),
            system_name: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, serde_json::json!({"value": "Mercury", "type": "Survival"}));
    }
}
