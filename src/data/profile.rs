//! Player profile statistics as published by the stats API.
//! Parsing is tolerant: list entries of the wrong shape are skipped and missing scalars default to zero.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityUsage {
    pub unique_name: String,
    #[serde(default)]
    pub used: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyRecord {
    pub unique_name: String,
    #[serde(default)]
    pub kills: u64,
    /// Times this enemy killed the player.
    #[serde(default)]
    pub deaths: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub unique_name: String,
    #[serde(default)]
    pub scans: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponUsage {
    pub unique_name: String,
    #[serde(default, rename = "equiptime")]
    pub equip_time: f64,
    #[serde(default)]
    pub kills: u64,
    #[serde(default)]
    pub headshots: u64,
    #[serde(default)]
    pub fired: u64,
    #[serde(default)]
    pub hits: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionRecord {
    pub node_key: String,
    #[serde(default)]
    pub high_score: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfilePayload {
    pub abilities: Vec<AbilityUsage>,
    pub enemies: Vec<EnemyRecord>,
    pub scans: Vec<ScanRecord>,
    pub weapons: Vec<WeaponUsage>,
    pub missions: Vec<MissionRecord>,
    pub income: f64,
    pub time_played_sec: f64,
    pub player_level: u32,
    pub deaths: u64,
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read profile {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("profile is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("profile payload must be a JSON object")]
    NotAnObject,
}

impl ProfilePayload {
    /// Build from a decoded payload, skipping list entries that do not parse.
    pub fn from_value(raw: &Value) -> Result<ProfilePayload, ProfileError> {
        let obj = raw.as_object().ok_or(ProfileError::NotAnObject)?;
        Ok(ProfilePayload {
            abilities: parse_list(obj.get("abilities")),
            enemies: parse_list(obj.get("enemies")),
            scans: parse_list(obj.get("scans")),
            weapons: parse_list(obj.get("weapons")),
            missions: parse_list(obj.get("missions")),
            income: obj.get("income").and_then(Value::as_f64).unwrap_or(0.0),
            time_played_sec: obj.get("timePlayedSec").and_then(Value::as_f64).unwrap_or(0.0),
            player_level: obj
                .get("playerLevel")
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0),
            deaths: obj.get("deaths").and_then(Value::as_u64).unwrap_or(0),
        })
    }

    pub fn from_json_str(raw: &str) -> Result<ProfilePayload, ProfileError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(&value)
    }
}

pub(crate) fn parse_list<T: for<'de> Deserialize<'de>>(raw: Option<&Value>) -> Vec<T> {
    let Some(items) = raw.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect()
}

/// Load a profile from a JSON file.
pub fn load_profile(path: impl AsRef<Path>) -> Result<ProfilePayload, ProfileError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| ProfileError::Read {
        path: path.display().to_string(),
        source,
    })?;
    ProfilePayload::from_json_str(&raw)
}
