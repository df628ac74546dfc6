//! World-state summaries: open void fissures by kind, today's sortie and running invasions.
//!
//! Node keys are looked up exactly, as in star chart completion. Mission types, relic
//! tiers, sortie modifiers, bosses and factions go through the fuzzy resolver.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::Catalog;
use crate::data::worldstate::{Fissure, Invasion, Sortie, WorldState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FissureKind {
    Regular,
    SteelPath,
    VoidStorm,
}

impl FissureKind {
    /// Storms first, then hard mode; every fissure has exactly one kind.
    pub fn of(fissure: &Fissure) -> FissureKind {
        if fissure.storm {
            FissureKind::VoidStorm
        } else if fissure.hard {
            FissureKind::SteelPath
        } else {
            FissureKind::Regular
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FissureView {
    pub node_key: String,
    pub node: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_name: Option<String>,
    pub mission_type: String,
    pub tier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FissureSummary {
    pub count: usize,
    pub fissures: Vec<FissureView>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Fissures {
    pub regular: FissureSummary,
    pub steel_path: FissureSummary,
    pub void_storm: FissureSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortieMission {
    pub node: String,
    pub mission_type: String,
    pub modifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortieSummary {
    pub boss: String,
    /// Mission types joined with `" - "`.
    pub label: String,
    pub missions: Vec<SortieMission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvasionView {
    pub node: String,
    pub attacker: String,
    pub defender: String,
    /// Attacker progress in percent; 50 at the start.
    pub completion: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InvasionSummary {
    pub count: usize,
    pub invasions: Vec<InvasionView>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorldMetrics {
    pub fissures: Fissures,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sortie: Option<SortieSummary>,
    pub invasions: InvasionSummary,
}

fn active(expiry: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expiry.map_or(true, |at| at > now)
}

/// Exact node lookup: display name and system, else the placeholder or the raw key.
fn node_name(catalog: &Catalog, node_key: &str, placeholder: Option<&str>) -> (String, Option<String>) {
    match catalog.get(node_key) {
        Some(entry) => (entry.display_name.clone(), entry.system_name.clone()),
        None => (placeholder.unwrap_or(node_key).to_string(), None),
    }
}

/// Unexpired fissures of one kind.
pub fn fissures(
    world: &WorldState,
    catalog: &Catalog,
    kind: FissureKind,
    now: DateTime<Utc>,
    placeholder: Option<&str>,
) -> FissureSummary {
    let fissures: Vec<FissureView> = world
        .fissures
        .iter()
        .filter(|f| FissureKind::of(f) == kind && active(f.expiry, now))
        .map(|f| {
            let (node, system_name) = node_name(catalog, &f.node, placeholder);
            // Storms have no mission type; the node entry's type tag stands in.
            let mission_type = match f.mission_type.as_deref() {
                Some(mission_type) => catalog.display_name(mission_type, placeholder),
                None => catalog
                    .get(&f.node)
                    .and_then(|entry| entry.item_type.clone())
                    .unwrap_or_default(),
            };
            FissureView {
                node_key: f.node.clone(),
                node,
                system_name,
                mission_type,
                tier: catalog.display_name(&f.tier, placeholder),
                expires_at: f.expiry.map(|at| at.to_rfc3339()),
            }
        })
        .collect();
    FissureSummary {
        count: fissures.len(),
        fissures,
    }
}

/// The first sortie that has not expired.
pub fn sortie(world: &WorldState, catalog: &Catalog, now: DateTime<Utc>, placeholder: Option<&str>) -> Option<SortieSummary> {
    let current: &Sortie = world.sorties.iter().find(|s| active(s.expiry, now))?;
    let missions: Vec<SortieMission> = current
        .variants
        .iter()
        .map(|variant| SortieMission {
            node: node_name(catalog, &variant.node, placeholder).0,
            mission_type: catalog.display_name(&variant.mission_type, placeholder),
            modifier: catalog.display_name(&variant.modifier_type, placeholder),
            modifier_description: catalog
                .resolve(&variant.modifier_type)
                .and_then(|found| found.entry.description.clone()),
        })
        .collect();
    let label = missions
        .iter()
        .map(|m| m.mission_type.as_str())
        .collect::<Vec<_>>()
        .join(" - ");
    Some(SortieSummary {
        boss: catalog.display_name(&current.boss, placeholder),
        label,
        missions,
        expires_at: current.expiry.map(|at| at.to_rfc3339()),
    })
}

fn completion(invasion: &Invasion) -> f64 {
    if invasion.goal <= 0 {
        return 0.0;
    }
    ((1.0 + invasion.count as f64 / invasion.goal as f64) * 50.0).clamp(0.0, 100.0)
}

/// Invasions still running.
pub fn invasions(world: &WorldState, catalog: &Catalog, placeholder: Option<&str>) -> InvasionSummary {
    let invasions: Vec<InvasionView> = world
        .invasions
        .iter()
        .filter(|invasion| !invasion.completed)
        .map(|invasion| InvasionView {
            node: node_name(catalog, &invasion.node, placeholder).0,
            attacker: catalog.display_name(&invasion.faction, placeholder),
            defender: catalog.display_name(&invasion.defender_faction, placeholder),
            completion: completion(invasion),
        })
        .collect();
    InvasionSummary {
        count: invasions.len(),
        invasions,
    }
}

pub fn compute_world_metrics(
    world: &WorldState,
    catalog: &Catalog,
    now: DateTime<Utc>,
    placeholder: Option<&str>,
) -> WorldMetrics {
    WorldMetrics {
        fissures: Fissures {
            regular: fissures(world, catalog, FissureKind::Regular, now, placeholder),
            steel_path: fissures(world, catalog, FissureKind::SteelPath, now, placeholder),
            void_storm: fissures(world, catalog, FissureKind::VoidStorm, now, placeholder),
        },
        sortie: sortie(world, catalog, now, placeholder),
        invasions: invasions(world, catalog, placeholder),
    }
}
