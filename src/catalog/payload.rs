//! Raw static payloads, one variant per upstream shape.
//!
//! Each parser takes the decoded JSON of one source and returns a structured payload.
//! A payload of the wrong top-level shape parses to [Payload::Empty]; records of the
//! wrong shape inside an otherwise valid payload are counted in `malformed` and skipped.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::entry::EntryFields;

/// Which parser a configured source goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// `{key: {value, description?, type?, systemName?}}`
    Translations,
    /// `[{uniqueName, name, category, description?, systemName?, abilities?}]`
    ItemCatalog,
    /// `{modifierTypes: {key: name}, modifierDescriptions: {key: text}, bosses: {key: name}}`
    Modifiers,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Translations => "translations",
            Self::ItemCatalog => "item_catalog",
            Self::Modifiers => "modifiers",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Translations(TranslationTable),
    Items(ItemCatalog),
    Modifiers(ModifierTable),
    Empty,
}

impl Payload {
    /// Parse a decoded source with the parser for `kind`.
    pub fn parse(kind: SourceKind, raw: &Value) -> Payload {
        match kind {
            SourceKind::Translations => TranslationTable::parse(raw).map_or(Payload::Empty, Payload::Translations),
            SourceKind::ItemCatalog => ItemCatalog::parse(raw).map_or(Payload::Empty, Payload::Items),
            SourceKind::Modifiers => ModifierTable::parse(raw).map_or(Payload::Empty, Payload::Modifiers),
        }
    }

    pub fn malformed(&self) -> usize {
        match self {
            Payload::Translations(t) => t.malformed,
            Payload::Items(c) => c.malformed,
            Payload::Modifiers(m) => m.malformed,
            Payload::Empty => 0,
        }
    }
}

/// Non-empty string field, or None when absent or of another type.
fn string_field(obj: &Map<String, Value>, field: &str) -> Option<String> {
    obj.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

// ----- Flat translation tables -----

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTable {
    pub records: Vec<(String, EntryFields)>,
    pub malformed: usize,
}

impl TranslationTable {
    pub fn parse(raw: &Value) -> Option<TranslationTable> {
        let obj = raw.as_object()?;
        let mut table = TranslationTable::default();
        for (key, record) in obj {
            let Some(record) = record.as_object() else {
                table.malformed += 1;
                continue;
            };
            let fields = EntryFields {
                display_name: string_field(record, "value"),
                description: string_field(record, "description"),
                item_type: string_field(record, "type"),
                system_name: string_field(record, "systemName"),
            };
            table.records.push((key.clone(), fields));
        }
        Some(table)
    }
}

// ----- Category-grouped item catalog -----

/// Item category tag from the item catalog. Only the tags that change how an item is
/// folded get their own variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemCategory {
    Warframe,
    Primary,
    Secondary,
    Melee,
    Companion,
    Archwing,
    ArchGun,
    ArchMelee,
    Node,
    Other(String),
}

impl ItemCategory {
    pub fn from_tag(tag: &str) -> ItemCategory {
        match tag.trim().to_lowercase().as_str() {
            "warframe" | "warframes" => ItemCategory::Warframe,
            "primary" => ItemCategory::Primary,
            "secondary" => ItemCategory::Secondary,
            "melee" => ItemCategory::Melee,
            "sentinels" | "pets" | "companion" | "companions" => ItemCategory::Companion,
            "archwing" => ItemCategory::Archwing,
            "arch-gun" => ItemCategory::ArchGun,
            "arch-melee" => ItemCategory::ArchMelee,
            "node" | "nodes" => ItemCategory::Node,
            _ => ItemCategory::Other(tag.to_string()),
        }
    }

    /// Loadout slot stored as the entry's `type`; profile "most used" metrics filter on it.
    pub fn slot_type(&self) -> Option<&'static str> {
        match self {
            ItemCategory::Warframe => Some("warframe"),
            ItemCategory::Primary => Some("primary"),
            ItemCategory::Secondary => Some("secondary"),
            ItemCategory::Melee => Some("melee"),
            ItemCategory::Companion => Some("companion"),
            ItemCategory::Archwing => Some("archwing"),
            ItemCategory::ArchGun => Some("arch-gun"),
            ItemCategory::ArchMelee => Some("arch-melee"),
            ItemCategory::Node | ItemCategory::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbilityRecord {
    pub unique_name: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub unique_name: String,
    pub name: Option<String>,
    pub category: ItemCategory,
    pub description: Option<String>,
    pub system_name: Option<String>,
    pub abilities: Vec<AbilityRecord>,
}

impl ItemRecord {
    /// Fields this item contributes, dispatched on category.
    pub fn fields(&self) -> EntryFields {
        match self.category {
            ItemCategory::Node => EntryFields {
                display_name: self.name.clone(),
                system_name: self.system_name.clone(),
                ..EntryFields::default()
            },
            _ => EntryFields {
                display_name: self.name.clone(),
                description: self.description.clone(),
                item_type: self.category.slot_type().map(str::to_string),
                system_name: None,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemCatalog {
    pub items: Vec<ItemRecord>,
    pub malformed: usize,
}

impl ItemCatalog {
    /// Accepts the item list itself, or an object whose values are item records.
    pub fn parse(raw: &Value) -> Option<ItemCatalog> {
        let records: Vec<&Value> = match raw {
            Value::Array(items) => items.iter().collect(),
            Value::Object(obj) => obj.values().collect(),
            _ => return None,
        };
        let mut catalog = ItemCatalog::default();
        for record in records {
            match parse_item(record, &mut catalog.malformed) {
                Some(item) => catalog.items.push(item),
                None => catalog.malformed += 1,
            }
        }
        Some(catalog)
    }
}

fn parse_item(raw: &Value, malformed: &mut usize) -> Option<ItemRecord> {
    let obj = raw.as_object()?;
    let unique_name = string_field(obj, "uniqueName")?;
    let category = string_field(obj, "category")
        .map(|tag| ItemCategory::from_tag(&tag))
        .unwrap_or_else(|| ItemCategory::Other(String::new()));

    let mut abilities = Vec::new();
    if let Some(list) = obj.get("abilities").and_then(Value::as_array) {
        for ability in list {
            let parsed = ability.as_object().and_then(|a| {
                Some(AbilityRecord {
                    unique_name: string_field(a, "uniqueName")?,
                    name: string_field(a, "name"),
                    description: string_field(a, "description"),
                })
            });
            match parsed {
                Some(a) => abilities.push(a),
                None => *malformed += 1,
            }
        }
    }

    Some(ItemRecord {
        unique_name,
        name: string_field(obj, "name"),
        category,
        description: string_field(obj, "description"),
        system_name: string_field(obj, "systemName"),
        abilities,
    })
}

// ----- Sortie modifier tables -----

pub const MODIFIER_TYPES_SECTION: &str = "modifierTypes";
pub const MODIFIER_DESCRIPTIONS_SECTION: &str = "modifierDescriptions";
pub const BOSSES_SECTION: &str = "bosses";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifierTable {
    pub modifier_types: Vec<(String, String)>,
    pub modifier_descriptions: Vec<(String, String)>,
    /// Boss roster: value-only entries.
    pub bosses: Vec<(String, String)>,
    pub malformed: usize,
}

impl ModifierTable {
    pub fn parse(raw: &Value) -> Option<ModifierTable> {
        let obj = raw.as_object()?;
        let mut table = ModifierTable::default();
        if let Some(section) = obj.get(MODIFIER_TYPES_SECTION) {
            table.modifier_types = string_section(section, &mut table.malformed);
        }
        if let Some(section) = obj.get(MODIFIER_DESCRIPTIONS_SECTION) {
            table.modifier_descriptions = string_section(section, &mut table.malformed);
        }
        if let Some(section) = obj.get(BOSSES_SECTION) {
            table.bosses = string_section(section, &mut table.malformed);
        }
        Some(table)
    }

    /// One record per key with value and description merged across sections.
    pub fn merged(&self) -> Vec<(String, EntryFields)> {
        let mut merged: Vec<(String, EntryFields)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        let sections = [
            (&self.modifier_types, Section::Name),
            (&self.modifier_descriptions, Section::Description),
            (&self.bosses, Section::Name),
        ];
        for (pairs, section) in sections {
            for (key, text) in pairs {
                let fields = match section {
                    Section::Name => EntryFields::named(text.clone()),
                    Section::Description => EntryFields {
                        description: Some(text.clone()),
                        ..EntryFields::default()
                    },
                };
                match index.get(key.as_str()) {
                    Some(&i) => merged[i].1.augment(fields),
                    None => {
                        index.insert(key.as_str(), merged.len());
                        merged.push((key.clone(), fields));
                    }
                }
            }
        }
        merged
    }
}

#[derive(Clone, Copy)]
enum Section {
    Name,
    Description,
}

/// `{key: "text"}` section. Object values carrying a `name` (the boss roster shape) are accepted too.
fn string_section(section: &Value, malformed: &mut usize) -> Vec<(String, String)> {
    let Some(obj) = section.as_object() else {
        *malformed += 1;
        return Vec::new();
    };
    let mut out = Vec::with_capacity(obj.len());
    for (key, value) in obj {
        let text = match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Object(inner) => string_field(inner, "name"),
            _ => None,
        };
        match text {
            Some(text) => out.push((key.clone(), text)),
            None => *malformed += 1,
        }
    }
    out
}
