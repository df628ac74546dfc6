//! Live world state as published by the game's world-state endpoint.
//!
//! Only the parts the world metrics read are modelled: void fissures (`ActiveMissions`
//! and `VoidStorms`), the daily sortie (`Sorties`) and invasions (`Invasions`). Every
//! identifier stays raw (`SolNode1`, `MT_CAPTURE`, `VoidT1`, `FC_GRINEER`); naming is the
//! catalog's job. Parsing is as tolerant as profile parsing.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::data::profile::parse_list;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fissure {
    pub node: String,
    /// Storms carry no mission type of their own.
    pub mission_type: Option<String>,
    /// Relic tier key, e.g. `VoidT1`.
    pub tier: String,
    pub hard: bool,
    pub storm: bool,
    pub expiry: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortieVariant {
    pub node: String,
    #[serde(default)]
    pub mission_type: String,
    #[serde(default)]
    pub modifier_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Sortie {
    #[serde(rename = "Boss", default)]
    pub boss: String,
    #[serde(rename = "Variants", default)]
    pub variants: Vec<SortieVariant>,
    #[serde(rename = "Expiry", default, deserialize_with = "expiry")]
    pub expiry: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Invasion {
    #[serde(rename = "Node")]
    pub node: String,
    /// Attacking faction key.
    #[serde(rename = "Faction", default)]
    pub faction: String,
    #[serde(rename = "DefenderFaction", default)]
    pub defender_faction: String,
    /// Signed progress; positive favours the attacker.
    #[serde(rename = "Count", default)]
    pub count: i64,
    #[serde(rename = "Goal", default)]
    pub goal: i64,
    #[serde(rename = "Completed", default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldState {
    pub fissures: Vec<Fissure>,
    pub sorties: Vec<Sortie>,
    pub invasions: Vec<Invasion>,
}

#[derive(Debug, Deserialize)]
struct ActiveMission {
    #[serde(rename = "Node")]
    node: String,
    #[serde(rename = "MissionType", default)]
    mission_type: Option<String>,
    #[serde(rename = "Modifier", default)]
    modifier: String,
    #[serde(rename = "Hard", default)]
    hard: bool,
    #[serde(rename = "Expiry", default, deserialize_with = "expiry")]
    expiry: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct VoidStorm {
    #[serde(rename = "Node")]
    node: String,
    #[serde(rename = "ActiveMissionTier", default)]
    tier: String,
    #[serde(rename = "Expiry", default, deserialize_with = "expiry")]
    expiry: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum WorldStateError {
    #[error("failed to read world state {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("world state is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("world state payload must be a JSON object")]
    NotAnObject,
}

impl WorldState {
    pub fn from_value(raw: &Value) -> Result<WorldState, WorldStateError> {
        let obj = raw.as_object().ok_or(WorldStateError::NotAnObject)?;

        let missions: Vec<ActiveMission> = parse_list(obj.get("ActiveMissions"));
        let storms: Vec<VoidStorm> = parse_list(obj.get("VoidStorms"));
        let fissures = missions
            .into_iter()
            .map(|m| Fissure {
                node: m.node,
                mission_type: m.mission_type,
                tier: m.modifier,
                hard: m.hard,
                storm: false,
                expiry: m.expiry,
            })
            .chain(storms.into_iter().map(|s| Fissure {
                node: s.node,
                mission_type: None,
                tier: s.tier,
                hard: false,
                storm: true,
                expiry: s.expiry,
            }))
            .collect();

        Ok(WorldState {
            fissures,
            sorties: parse_list(obj.get("Sorties")),
            invasions: parse_list(obj.get("Invasions")),
        })
    }

    pub fn from_json_str(raw: &str) -> Result<WorldState, WorldStateError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(&value)
    }
}

pub fn load_worldstate(path: impl AsRef<Path>) -> Result<WorldState, WorldStateError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| WorldStateError::Read {
        path: path.display().to_string(),
        source,
    })?;
    WorldState::from_json_str(&raw)
}

/// Timestamps arrive as `{"$date": {"$numberLong": "<ms>"}}`, `{"$date": <ms>}` or bare
/// milliseconds. Anything else reads as no expiry.
fn expiry<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(timestamp_millis(&raw).and_then(DateTime::from_timestamp_millis))
}

fn timestamp_millis(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(obj) => obj
            .get("$date")
            .or_else(|| obj.get("$numberLong"))
            .and_then(timestamp_millis),
        _ => None,
    }
}
