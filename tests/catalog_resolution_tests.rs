use serde_json::json;
use warframe_stats::catalog::{
    build_catalog, is_hard_mode, resolve, resolve_or, Catalog, CatalogBuilder, CatalogEntry, MatchKind, Payload,
    SourceKind,
};

fn scenario_catalog() -> Catalog {
    let translations = Payload::parse(
        SourceKind::Translations,
        &json!({"orb/vent/fan": {"value": "Vent Fan"}}),
    );
    let items = Payload::parse(
        SourceKind::ItemCatalog,
        &json!([{
            "uniqueName": "Excalibur",
            "name": "Excalibur",
            "category": "Warframes",
            "abilities": [
                {"uniqueName": "Slash Dash", "name": "Slash Dash", "description": "A dash attack."}
            ]
        }]),
    );
    build_catalog([
        ("languages", SourceKind::Translations, &translations),
        ("items", SourceKind::ItemCatalog, &items),
    ])
    .0
}

#[test]
fn end_to_end_scenario_resolves_every_identifier() {
    let catalog = scenario_catalog();

    let vent = resolve("ORB/VENT/FAN", &catalog).expect("vent fan should resolve");
    assert_eq!(vent.kind, MatchKind::Exact);
    assert_eq!(
        serde_json::to_value(vent.entry).unwrap(),
        json!({"value": "Vent Fan"})
    );

    let dash = resolve("slash dash", &catalog).expect("ability should resolve");
    assert_eq!(
        serde_json::to_value(dash.entry).unwrap(),
        json!({"value": "Slash Dash", "description": "A dash attack."})
    );

    let frame = resolve("excalibur_hm", &catalog).expect("hard mode variant should resolve");
    assert_eq!(frame.key, "excalibur");
    assert_eq!(frame.entry.display_name, "Excalibur");
}

#[test]
fn disjoint_fields_from_two_payloads_merge() {
    let mut builder = CatalogBuilder::new();
    builder.ingest_value(
        "names",
        SourceKind::Translations,
        Some(&json!({"MT_DEFENSE": {"value": "Defense"}})),
    );
    builder.ingest_value(
        "descriptions",
        SourceKind::Translations,
        Some(&json!({"MT_DEFENSE": {"description": "Protect the objective."}})),
    );
    let (catalog, _) = builder.finish();
    let entry = catalog.get("mt_defense").unwrap();
    assert_eq!(entry.display_name, "Defense");
    assert_eq!(entry.description.as_deref(), Some("Protect the objective."));
}

#[test]
fn lookups_are_case_insensitive_and_builds_repeatable() {
    let raw = json!({"SolNode1": {"value": "Galatea (Neptune)", "systemName": "Neptune"}});
    let build = || {
        let mut builder = CatalogBuilder::new();
        builder.ingest_value("sol_nodes", SourceKind::Translations, Some(&raw));
        builder.finish().0
    };
    let first = build();
    let second = build();
    assert_eq!(first, second);
    for probe in ["SolNode1", "solnode1", "SOLNODE1"] {
        assert_eq!(first.get(probe), second.get(probe));
        assert_eq!(resolve(probe, &first).unwrap().kind, MatchKind::Exact);
    }
}

#[test]
fn stem_fallback_and_default() {
    let mut builder = CatalogBuilder::new();
    builder.ingest_value(
        "languages",
        SourceKind::Translations,
        Some(&json!({"lotus/weapon": {"value": "Lotus Weapon"}})),
    );
    let (catalog, _) = builder.finish();

    let found = resolve("lotus/weapon/variant_a", &catalog).unwrap();
    assert_eq!(found.entry.display_name, "Lotus Weapon");

    let default = CatalogEntry {
        key: String::new(),
        display_name: "Unknown".to_string(),
        description: None,
        item_type: None,
        system_name: None,
    };
    assert_eq!(resolve_or("kuva/lich", &catalog, Some(&default)), Some(&default));
    assert_eq!(catalog.display_name("kuva/lich", None), "kuva/lich");
    assert_eq!(catalog.display_name("kuva/lich", Some("???")), "???");
}

#[test]
fn hard_mode_predicate() {
    assert!(is_hard_mode("SolNode001_HM"));
    assert!(!is_hard_mode("SolNode001"));
}

#[test]
fn empty_payloads_do_not_disturb_valid_ones() {
    let mut builder = CatalogBuilder::new();
    builder.ingest_value("empty_list", SourceKind::ItemCatalog, Some(&json!([])));
    builder.ingest_value("empty_map", SourceKind::Translations, Some(&json!({})));
    builder.ingest_value("wrong_shape", SourceKind::Translations, Some(&json!("nope")));
    builder.ingest_value(
        "factions",
        SourceKind::Translations,
        Some(&json!({"FC_OROKIN": {"value": "Orokin"}})),
    );
    let (catalog, report) = builder.finish();
    assert_eq!(catalog.len(), 1);
    assert!(catalog.contains_key("fc_orokin"));
    assert_eq!(report.unavailable_sources().count(), 1);
}

#[test]
fn sortie_modifiers_merge_across_sections() {
    let mut builder = CatalogBuilder::new();
    builder.ingest_value(
        "sortie_data",
        SourceKind::Modifiers,
        Some(&json!({
            "modifierTypes": {"SORTIE_MODIFIER_LOW_ENERGY": "Energy Reduction"},
            "modifierDescriptions": {"SORTIE_MODIFIER_LOW_ENERGY": "Maximum energy is reduced."},
            "bosses": {
                "SORTIE_BOSS_HYENA": {"name": "Hyena Pack", "faction": "Corpus"},
                "SORTIE_BOSS_KELA": "Kela De Thaym"
            }
        })),
    );
    let (catalog, _) = builder.finish();
    let modifier = catalog.get("SORTIE_MODIFIER_LOW_ENERGY").unwrap();
    assert_eq!(modifier.display_name, "Energy Reduction");
    assert_eq!(modifier.description.as_deref(), Some("Maximum energy is reduced."));
    assert_eq!(catalog.get("sortie_boss_hyena").unwrap().display_name, "Hyena Pack");
    assert_eq!(catalog.get("sortie_boss_kela").unwrap().display_name, "Kela De Thaym");
}
