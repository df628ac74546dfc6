//! Catalog Builder: folds parsed payloads into one [Catalog].
//!
//! Records are merged per lowercased key in ingestion order. A later record only fills
//! fields that are still unset, so sources that each supply part of an entity (one the
//! name, another the description) end up in a single entry. Keys that never receive a
//! display name are dropped when the build finishes.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::catalog::entry::{normalize_key, Catalog, EntryFields};
use crate::catalog::payload::{ItemRecord, Payload, SourceKind};

/// Ingestion counts for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub kind: SourceKind,
    /// False when the payload could not be fetched or had the wrong top-level shape.
    pub available: bool,
    /// Records folded into the build (entries, abilities and fragments).
    pub records: usize,
    /// Records skipped because of their shape.
    pub malformed: usize,
    /// Records carrying no display name; kept only if another record names the key.
    pub unnamed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub sources: Vec<SourceReport>,
    pub entries: usize,
    /// Keys dropped at the end of the build because no source gave them a display name.
    pub dropped_unnamed: usize,
}

impl BuildReport {
    pub fn unavailable_sources(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources.iter().filter(|s| !s.available)
    }
}

#[derive(Debug, Default)]
pub struct CatalogBuilder {
    pending: BTreeMap<String, EntryFields>,
    report: BuildReport,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode-and-ingest one source. `None` means the payload was unavailable; it
    /// contributes nothing and is recorded as such.
    pub fn ingest_value(&mut self, source: &str, kind: SourceKind, raw: Option<&Value>) -> &SourceReport {
        let payload = raw.map_or(Payload::Empty, |raw| Payload::parse(kind, raw));
        self.ingest(source, kind, &payload)
    }

    pub fn ingest(&mut self, source: &str, kind: SourceKind, payload: &Payload) -> &SourceReport {
        let mut report = SourceReport {
            source: source.to_string(),
            kind,
            available: !matches!(payload, Payload::Empty),
            records: 0,
            malformed: payload.malformed(),
            unnamed: 0,
        };

        match payload {
            Payload::Translations(table) => {
                for (key, fields) in &table.records {
                    self.upsert(key, fields.clone(), &mut report);
                }
            }
            Payload::Items(catalog) => {
                for item in &catalog.items {
                    self.ingest_item(item, &mut report);
                }
            }
            Payload::Modifiers(table) => {
                for (key, fields) in table.merged() {
                    self.upsert(&key, fields, &mut report);
                }
            }
            Payload::Empty => {}
        }

        debug!(
            source,
            kind = kind.as_str(),
            records = report.records,
            malformed = report.malformed,
            unnamed = report.unnamed,
            "ingested catalog source"
        );
        self.report.sources.push(report);
        &self.report.sources[self.report.sources.len() - 1]
    }

    fn ingest_item(&mut self, item: &ItemRecord, report: &mut SourceReport) {
        self.upsert(&item.unique_name, item.fields(), report);
        for ability in &item.abilities {
            let fields = EntryFields {
                display_name: ability.name.clone(),
                description: ability.description.clone(),
                ..EntryFields::default()
            };
            self.upsert(&ability.unique_name, fields, report);
        }
    }

    fn upsert(&mut self, key: &str, fields: EntryFields, report: &mut SourceReport) {
        report.records += 1;
        if !fields.has_display_name() {
            report.unnamed += 1;
        }
        self.pending.entry(normalize_key(key)).or_default().augment(fields);
    }

    /// Lowercase every key once more, drop unnamed keys and freeze the catalog.
    pub fn finish(self) -> (Catalog, BuildReport) {
        let CatalogBuilder { pending, mut report } = self;

        let mut normalized: BTreeMap<String, EntryFields> = BTreeMap::new();
        for (key, fields) in pending {
            let lowered = normalize_key(&key);
            match normalized.get_mut(&lowered) {
                Some(existing) => existing.augment(fields),
                None => {
                    normalized.insert(lowered, fields);
                }
            }
        }

        let mut entries = BTreeMap::new();
        for (key, fields) in normalized {
            match fields.into_entry(key.clone()) {
                Some(entry) => {
                    entries.insert(key, entry);
                }
                None => report.dropped_unnamed += 1,
            }
        }

        report.entries = entries.len();
        (Catalog::from_entries(entries), report)
    }
}

/// Build a catalog from already-parsed payloads, in order.
pub fn build_catalog<'a, I>(payloads: I) -> (Catalog, BuildReport)
where
    I: IntoIterator<Item = (&'a str, SourceKind, &'a Payload)>,
{
    let mut builder = CatalogBuilder::new();
    for (source, kind, payload) in payloads {
        builder.ingest(source, kind, payload);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn later_sources_augment_but_never_rename() {
        let mut builder = CatalogBuilder::new();
        builder.ingest_value(
            "first",
            SourceKind::Translations,
            Some(&json!({"MT_SURVIVAL": {"value": "Survival"}})),
        );
        builder.ingest_value(
            "second",
            SourceKind::Translations,
            Some(&json!({"mt_survival": {"value": "Endless Survival", "description": "Stay alive."}})),
        );
        let (catalog, report) = builder.finish();
        let entry = catalog.get("MT_SURVIVAL").unwrap();
        assert_eq!(entry.display_name, "Survival");
        assert_eq!(entry.description.as_deref(), Some("Stay alive."));
        assert_eq!(report.entries, 1);
    }

    #[test]
    fn description_fragment_before_name_is_merged() {
        let mut builder = CatalogBuilder::new();
        builder.ingest_value(
            "descriptions",
            SourceKind::Translations,
            Some(&json!({"FissureMod": {"description": "Void fissure"}})),
        );
        builder.ingest_value("names", SourceKind::Translations, Some(&json!({"FissureMod": {"value": "Lith"}})));
        let (catalog, report) = builder.finish();
        let entry = catalog.get("fissuremod").unwrap();
        assert_eq!(entry.display_name, "Lith");
        assert_eq!(entry.description.as_deref(), Some("Void fissure"));
        assert_eq!(report.sources[0].unnamed, 1);
        assert_eq!(report.dropped_unnamed, 0);
    }

    #[test]
    fn unnamed_keys_are_dropped_at_finish() {
        let mut builder = CatalogBuilder::new();
        builder.ingest_value(
            "modifiers",
            SourceKind::Modifiers,
            Some(&json!({"modifierDescriptions": {"SORTIE_MODIFIER_ORPHAN": "No name."}})),
        );
        let (catalog, report) = builder.finish();
        assert!(catalog.is_empty());
        assert_eq!(report.dropped_unnamed, 1);
    }

    #[test]
    fn unavailable_source_is_reported_and_contributes_nothing() {
        let mut builder = CatalogBuilder::new();
        let report = builder.ingest_value("items", SourceKind::ItemCatalog, None).clone();
        assert!(!report.available);
        assert_eq!(report.records, 0);
        builder.ingest_value("factions", SourceKind::Translations, Some(&json!({"FC_CORPUS": {"value": "Corpus"}})));
        let (catalog, report) = builder.finish();
        assert_eq!(catalog.len(), 1);
        assert_eq!(report.unavailable_sources().count(), 1);
    }

    #[test]
    fn abilities_become_their_own_entries() {
        let payload = Payload::parse(
            SourceKind::ItemCatalog,
            &json!([{
                "uniqueName": "/Lotus/Powersuits/Volt/Volt",
                "name": "Volt",
                "category": "Warframes",
                "abilities": [
                    {"uniqueName": "/Lotus/Powersuits/Volt/ShockAbility", "name": "Shock", "description": "Zap."}
                ]
            }]),
        );
        let (catalog, report) = build_catalog([("items", SourceKind::ItemCatalog, &payload)]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(report.sources[0].records, 2);
        let ability = catalog.get("/lotus/powersuits/volt/shockability").unwrap();
        assert_eq!(ability.display_name, "Shock");
        assert_eq!(catalog.get("/Lotus/Powersuits/Volt/Volt").unwrap().item_type.as_deref(), Some("warframe"));
    }
}
