use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::catalog::{BuildReport, CatalogEntry, MatchKind};
use crate::data::profile::{ProfileError, ProfilePayload};
use crate::data::sources::{validate_username, FetchError};
use crate::data::worldstate::WorldState;
use crate::metrics::{compute_profile_metrics, compute_world_metrics, ProfileMetrics, UserMetrics};
use crate::refresh::{refresh_catalog, RefreshError};
use crate::server::AppState;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing query parameter '{0}'")]
    MissingParam(&'static str),
    #[error("no catalog entry matches '{identifier}'")]
    Unresolved { identifier: String, display: String },
    #[error("profile '{0}' not found")]
    ProfileNotFound(String),
    #[error("invalid profile name '{0}'")]
    InvalidName(String),
    #[error("profile source failed: {0}")]
    Upstream(String),
    #[error("world state unavailable: {0}")]
    WorldState(String),
    #[error("invalid profile: {0}")]
    Profile(#[from] ProfileError),
    #[error("{0}")]
    Refresh(#[from] RefreshError),
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::NotFound { path } => ApiError::ProfileNotFound(path),
            FetchError::InvalidName(name) => ApiError::InvalidName(name),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct CatalogSummary<'a> {
    entries: usize,
    built_at: Option<String>,
    report: &'a BuildReport,
}

#[derive(Debug, Serialize)]
struct ResolveResponse<'a> {
    identifier: &'a str,
    #[serde(rename = "match")]
    kind: MatchKind,
    key: &'a str,
    entry: &'a CatalogEntry,
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "status": "ok",
        "service": "warframe-stats",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn catalog_payload(state: &AppState) -> Result<String, ApiError> {
    let snapshot = state.store.load();
    let summary = CatalogSummary {
        entries: snapshot.catalog.len(),
        built_at: snapshot.built_at.map(|at| at.to_rfc3339()),
        report: &snapshot.report,
    };
    Ok(serde_json::to_string_pretty(&summary)?)
}

/// `path` is the full request target; the identifier comes from its `id` query parameter.
pub fn resolve_payload(state: &AppState, path: &str) -> Result<String, ApiError> {
    let identifier = query_param(path, "id")
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingParam("id"))?;
    let snapshot = state.store.load();
    match snapshot.catalog.resolve(&identifier) {
        Some(found) => Ok(serde_json::to_string_pretty(&ResolveResponse {
            identifier: &identifier,
            kind: found.kind,
            key: found.key,
            entry: found.entry,
        })?),
        None => Err(ApiError::Unresolved {
            display: snapshot
                .catalog
                .display_name(&identifier, state.config.unknown_placeholder.as_deref()),
            identifier,
        }),
    }
}

pub fn unresolved_payload(identifier: &str, display: &str) -> String {
    serde_json::to_string_pretty(&json!({
        "status": "error",
        "message": format!("no catalog entry matches '{identifier}'"),
        "identifier": identifier,
        "display": display,
    }))
    .unwrap_or_default()
}

pub fn user_metrics_payload(state: &AppState, username: &str) -> Result<String, ApiError> {
    validate_username(username)?;
    let raw = state.source.fetch_profile(username)?;
    let profile = ProfilePayload::from_value(&raw).map_err(|err| ApiError::Upstream(err.to_string()))?;
    Ok(serde_json::to_string_pretty(&UserMetrics {
        username: username.to_string(),
        metrics: metrics_for(state, &profile),
    })?)
}

pub fn body_metrics_payload(state: &AppState, body: &str) -> Result<String, ApiError> {
    let profile = ProfilePayload::from_json_str(body)?;
    Ok(serde_json::to_string_pretty(&metrics_for(state, &profile))?)
}

pub fn refresh_payload(state: &AppState) -> Result<String, ApiError> {
    let report = refresh_catalog(&state.store, state.source.as_ref(), &state.config.sources)?;
    Ok(serde_json::to_string_pretty(&json!({
        "status": "ok",
        "report": report,
    }))?)
}

pub fn worldstate_payload(state: &AppState) -> Result<String, ApiError> {
    let raw = state
        .source
        .fetch_worldstate()
        .map_err(|err| ApiError::WorldState(err.to_string()))?;
    let world = WorldState::from_value(&raw).map_err(|err| ApiError::WorldState(err.to_string()))?;
    let snapshot = state.store.load();
    let metrics = compute_world_metrics(
        &world,
        &snapshot.catalog,
        Utc::now(),
        state.config.unknown_placeholder.as_deref(),
    );
    Ok(serde_json::to_string_pretty(&metrics)?)
}

fn metrics_for(state: &AppState, profile: &ProfilePayload) -> ProfileMetrics {
    let snapshot = state.store.load();
    compute_profile_metrics(
        profile,
        &snapshot.catalog,
        &state.config.metrics,
        state.config.unknown_placeholder.as_deref(),
    )
}

fn query_param(path: &str, name: &str) -> Option<String> {
    let query = path.split_once('?')?.1;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (key == name).then(|| percent_decode(value))
    })
}

/// Decode `%XX` escapes and `+` as space. Invalid escapes are kept literally.
fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' => match bytes.get(i + 1..i + 3).and_then(hex_byte) {
                Some(byte) => {
                    out.push(byte);
                    i += 3;
                    continue;
                }
                None => out.push(b'%'),
            },
            other => out.push(other),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_byte(pair: &[u8]) -> Option<u8> {
    let hex = std::str::from_utf8(pair).ok()?;
    u8::from_str_radix(hex, 16).ok()
}
