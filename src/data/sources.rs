//! Static sources the catalog is built from, and where their payloads come from.
//!
//! [PayloadSource] is the seam for the transport: the builder only ever sees payloads a
//! source already produced. [DirectorySource] reads a local mirror of the statistics API
//! (one JSON file per endpoint, profiles under `profiles/`); [MemorySource] serves
//! payloads a caller fetched some other way.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use crate::catalog::SourceKind;

pub const DEFAULT_DATA_DIR: &str = "data/static";
pub const PROFILES_DIR: &str = "profiles";
pub const WORLDSTATE_FILE: &str = "worldState.json";

/// One configured static source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    pub kind: SourceKind,
    /// Path relative to the source root (file name of the mirrored endpoint).
    pub path: String,
}

impl SourceSpec {
    pub fn new(name: &str, kind: SourceKind, path: &str) -> Self {
        SourceSpec {
            name: name.to_string(),
            kind,
            path: path.to_string(),
        }
    }
}

/// Sources in ingestion order. Order matters: later sources only fill fields earlier ones left unset.
pub fn default_sources() -> Vec<SourceSpec> {
    vec![
        SourceSpec::new("sortie_data", SourceKind::Modifiers, "sortieData.json"),
        SourceSpec::new("factions", SourceKind::Translations, "factionsData.json"),
        SourceSpec::new("sol_nodes", SourceKind::Translations, "solNodes.json"),
        SourceSpec::new("fissure_modifiers", SourceKind::Translations, "fissureModifiers.json"),
        SourceSpec::new("syndicates", SourceKind::Translations, "syndicatesData.json"),
        SourceSpec::new("mission_types", SourceKind::Translations, "missionTypes.json"),
        SourceSpec::new("languages", SourceKind::Translations, "languages.json"),
        SourceSpec::new("items", SourceKind::ItemCatalog, "items.json"),
    ]
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("payload not found: {path}")]
    NotFound { path: String },
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid profile name '{0}'")]
    InvalidName(String),
}

pub trait PayloadSource: Send + Sync {
    /// Decoded payload of one static source.
    fn fetch(&self, spec: &SourceSpec) -> Result<Value, FetchError>;

    /// Decoded profile statistics for one player.
    fn fetch_profile(&self, username: &str) -> Result<Value, FetchError>;

    /// Decoded live world state.
    fn fetch_worldstate(&self) -> Result<Value, FetchError>;
}

/// Reads payloads from `<root>/<spec.path>`, profiles from `<root>/profiles/<username>.json`
/// and the world state from `<root>/worldState.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectorySource { root: root.into() }
    }
}

impl PayloadSource for DirectorySource {
    fn fetch(&self, spec: &SourceSpec) -> Result<Value, FetchError> {
        read_json(&self.root.join(&spec.path))
    }

    fn fetch_profile(&self, username: &str) -> Result<Value, FetchError> {
        validate_username(username)?;
        read_json(&self.root.join(PROFILES_DIR).join(format!("{username}.json")))
    }

    fn fetch_worldstate(&self) -> Result<Value, FetchError> {
        read_json(&self.root.join(WORLDSTATE_FILE))
    }
}

/// In-memory payloads keyed by source name, and profiles keyed by username.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub payloads: HashMap<String, Value>,
    pub profiles: HashMap<String, Value>,
    pub worldstate: Option<Value>,
}

impl MemorySource {
    pub fn with_payload(mut self, source: &str, payload: Value) -> Self {
        self.payloads.insert(source.to_string(), payload);
        self
    }

    pub fn with_profile(mut self, username: &str, profile: Value) -> Self {
        self.profiles.insert(username.to_string(), profile);
        self
    }

    pub fn with_worldstate(mut self, worldstate: Value) -> Self {
        self.worldstate = Some(worldstate);
        self
    }
}

impl PayloadSource for MemorySource {
    fn fetch(&self, spec: &SourceSpec) -> Result<Value, FetchError> {
        self.payloads.get(&spec.name).cloned().ok_or_else(|| FetchError::NotFound {
            path: spec.name.clone(),
        })
    }

    fn fetch_profile(&self, username: &str) -> Result<Value, FetchError> {
        self.profiles.get(username).cloned().ok_or_else(|| FetchError::NotFound {
            path: username.to_string(),
        })
    }

    fn fetch_worldstate(&self) -> Result<Value, FetchError> {
        self.worldstate.clone().ok_or_else(|| FetchError::NotFound {
            path: WORLDSTATE_FILE.to_string(),
        })
    }
}

/// Profile names become file names; only plain names are accepted.
pub fn validate_username(username: &str) -> Result<(), FetchError> {
    let ok = !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !username.starts_with('.');
    if ok {
        Ok(())
    } else {
        Err(FetchError::InvalidName(username.to_string()))
    }
}

fn read_json(path: &Path) -> Result<Value, FetchError> {
    let display = path.display().to_string();
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(FetchError::NotFound { path: display });
        }
        Err(source) => return Err(FetchError::Read { path: display, source }),
    };
    serde_json::from_str(&raw).map_err(|source| FetchError::Decode { path: display, source })
}
