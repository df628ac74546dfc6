use std::sync::Arc;

use serde_json::{json, Value};
use warframe_stats::catalog::CatalogStore;
use warframe_stats::config::Config;
use warframe_stats::data::sources::{default_sources, MemorySource};
use warframe_stats::metrics::MetricKind;
use warframe_stats::refresh::refresh_catalog;
use warframe_stats::server::routes::route_request;
use warframe_stats::server::AppState;

fn source() -> MemorySource {
    MemorySource::default()
        .with_payload(
            "sol_nodes",
            json!({"SolNode1": {"value": "Galatea (Neptune)", "type": "Capture"}}),
        )
        .with_payload(
            "items",
            json!([{
                "uniqueName": "Excalibur",
                "name": "Excalibur",
                "category": "Warframes",
                "abilities": [{"uniqueName": "Slash Dash", "name": "Slash Dash", "description": "A dash attack."}]
            }]),
        )
        .with_profile(
            "tenno",
            json!({"playerLevel": 12, "missions": [{"nodeKey": "SolNode1_HM", "highScore": 3}]}),
        )
}

fn state_with(source: MemorySource) -> AppState {
    let store = Arc::new(CatalogStore::new());
    let _ = refresh_catalog(&store, &source, &default_sources());
    AppState {
        store,
        source: Arc::new(source),
        config: Config {
            metrics: vec![MetricKind::Rank, MetricKind::StarChart],
            unknown_placeholder: Some("Unknown".to_string()),
            ..Config::default()
        },
    }
}

fn json_body(body: &str) -> Value {
    serde_json::from_str(body).expect("response should be valid json")
}

#[test]
fn health_endpoint_returns_ok_json() {
    let response = route_request(&state_with(source()), "GET", "/api/health", "");
    assert_eq!(response.status_code, 200);
    assert_eq!(response.content_type, "application/json");
    assert!(response.body.contains("\"status\": \"ok\""));
}

#[test]
fn catalog_endpoint_reports_last_build() {
    let response = route_request(&state_with(source()), "GET", "/api/catalog", "");
    assert_eq!(response.status_code, 200);
    let payload = json_body(&response.body);
    assert_eq!(payload["entries"], 3);
    assert!(payload["built_at"].is_string());
    assert_eq!(payload["report"]["sources"].as_array().map(Vec::len), Some(default_sources().len()));
}

#[test]
fn resolve_endpoint_decodes_identifier() {
    let state = state_with(source());
    let response = route_request(&state, "GET", "/api/resolve?id=slash%20dash", "");
    assert_eq!(response.status_code, 200);
    let payload = json_body(&response.body);
    assert_eq!(payload["match"], "exact");
    assert_eq!(payload["entry"], json!({"value": "Slash Dash", "description": "A dash attack."}));

    let response = route_request(&state, "GET", "/api/resolve?id=EXCALIBUR_HM", "");
    assert_eq!(json_body(&response.body)["match"], "prefix");
}

#[test]
fn resolve_endpoint_reports_misses_and_missing_id() {
    let state = state_with(source());
    let response = route_request(&state, "GET", "/api/resolve?id=zzz", "");
    assert_eq!(response.status_code, 404);
    assert_eq!(json_body(&response.body)["display"], "Unknown");

    let response = route_request(&state, "GET", "/api/resolve", "");
    assert_eq!(response.status_code, 400);
}

#[test]
fn metrics_for_stored_profile() {
    let state = state_with(source());
    let response = route_request(&state, "GET", "/api/metrics/tenno", "");
    assert_eq!(response.status_code, 200);
    let payload = json_body(&response.body);
    assert_eq!(payload["username"], "tenno");
    assert_eq!(payload["metrics"]["rank"]["label"], "12");
    assert_eq!(payload["metrics"]["star_chart"]["steel_path"][0]["node"], "Galatea (Neptune)");
    assert!(payload["metrics"].get("credits").is_none());

    assert_eq!(route_request(&state, "GET", "/api/metrics/nobody", "").status_code, 404);
    assert_eq!(route_request(&state, "GET", "/api/metrics/..%2Fetc", "").status_code, 400);
}

#[test]
fn metrics_for_posted_profile() {
    let state = state_with(source());
    let response = route_request(&state, "POST", "/api/metrics", r#"{"playerLevel": 40}"#);
    assert_eq!(response.status_code, 200);
    assert_eq!(json_body(&response.body)["rank"]["label"], "Legendary 10");

    let response = route_request(&state, "POST", "/api/metrics", "not json");
    assert_eq!(response.status_code, 400);
}

#[test]
fn refresh_endpoint_keeps_catalog_when_rebuild_is_empty() {
    let good = state_with(source());
    assert_eq!(route_request(&good, "POST", "/api/refresh", "").status_code, 200);

    let empty = AppState {
        store: Arc::clone(&good.store),
        source: Arc::new(MemorySource::default()),
        config: Config::default(),
    };
    let response = route_request(&empty, "POST", "/api/refresh", "");
    assert_eq!(response.status_code, 503);
    assert!(good.store.load().catalog.contains_key("solnode1"));
}

#[test]
fn unknown_route_is_not_found() {
    let response = route_request(&state_with(source()), "DELETE", "/api/catalog", "");
    assert_eq!(response.status_code, 404);
    assert!(response.body.contains("\"status\": \"error\""));
}

#[test]
fn worldstate_endpoint_names_fissures_sorties_and_invasions() {
    let source = source()
        .with_payload(
            "factions",
            json!({"FC_GRINEER": {"value": "Grineer"}, "FC_CORPUS": {"value": "Corpus"}}),
        )
        .with_payload("fissure_modifiers", json!({"VoidT4": {"value": "Axi"}}))
        .with_payload(
            "sortie_data",
            json!({
                "modifierTypes": {"SORTIE_MODIFIER_LOW_ENERGY": "Energy Reduction"},
                "modifierDescriptions": {"SORTIE_MODIFIER_LOW_ENERGY": "Maximum energy is reduced."},
                "bosses": {"SORTIE_BOSS_VOR": "Captain Vor"}
            }),
        )
        .with_worldstate(json!({
            "ActiveMissions": [
                {"Node": "SolNode1", "MissionType": "MT_CAPTURE", "Modifier": "VoidT4", "Hard": true},
                {"Node": "SolNode1", "Modifier": "VoidT4", "Expiry": {"$date": {"$numberLong": "1000"}}}
            ],
            "Sorties": [{
                "Boss": "SORTIE_BOSS_VOR",
                "Variants": [{"missionType": "MT_CAPTURE", "modifierType": "SORTIE_MODIFIER_LOW_ENERGY", "node": "SolNode1"}]
            }],
            "Invasions": [
                {"Node": "SolNode1", "Faction": "FC_GRINEER", "DefenderFaction": "FC_CORPUS", "Count": 0, "Goal": 1000},
                {"Node": "SolNode1", "Faction": "FC_GRINEER", "DefenderFaction": "FC_CORPUS", "Completed": true}
            ]
        }));
    let response = route_request(&state_with(source), "GET", "/api/worldstate", "");
    assert_eq!(response.status_code, 200);
    let payload = json_body(&response.body);

    assert_eq!(payload["fissures"]["regular"]["count"], 0);
    let steel = &payload["fissures"]["steel_path"];
    assert_eq!(steel["count"], 1);
    assert_eq!(steel["fissures"][0]["node"], "Galatea (Neptune)");
    assert_eq!(steel["fissures"][0]["tier"], "Axi");

    assert_eq!(payload["sortie"]["boss"], "Captain Vor");
    assert_eq!(payload["sortie"]["missions"][0]["modifier"], "Energy Reduction");
    assert_eq!(
        payload["sortie"]["missions"][0]["modifier_description"],
        "Maximum energy is reduced."
    );

    assert_eq!(payload["invasions"]["count"], 1);
    assert_eq!(payload["invasions"]["invasions"][0]["attacker"], "Grineer");
    assert_eq!(payload["invasions"]["invasions"][0]["defender"], "Corpus");
    assert_eq!(payload["invasions"]["invasions"][0]["completion"], 50.0);
}

#[test]
fn worldstate_endpoint_reports_missing_source() {
    let response = route_request(&state_with(source()), "GET", "/api/worldstate", "");
    assert_eq!(response.status_code, 502);
    assert!(response.body.contains("world state unavailable"));
}
