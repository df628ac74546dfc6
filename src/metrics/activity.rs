use serde::Serialize;

use crate::catalog::Catalog;
use crate::data::profile::ProfilePayload;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedCount {
    pub name: String,
    pub count: u64,
}

/// A total plus the per-identifier breakdown it was summed from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountSummary {
    pub total: u64,
    pub items: Vec<NamedCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MostScans {
    /// Display name of the most scanned item; empty when nothing was scanned.
    pub name: String,
    pub scans: u64,
    pub items: Vec<NamedCount>,
}

pub fn abilities_used(profile: &ProfilePayload, catalog: &Catalog, placeholder: Option<&str>) -> CountSummary {
    summarize(
        profile.abilities.iter().map(|a| (a.unique_name.as_str(), a.used)),
        catalog,
        placeholder,
    )
}

pub fn enemies_killed(profile: &ProfilePayload, catalog: &Catalog, placeholder: Option<&str>) -> CountSummary {
    summarize(
        profile.enemies.iter().map(|e| (e.unique_name.as_str(), e.kills)),
        catalog,
        placeholder,
    )
}

/// Total deaths, broken down by the enemies that scored at least one kill on the player.
/// The total is the profile's own counter, not the sum of the breakdown.
pub fn deaths(profile: &ProfilePayload, catalog: &Catalog, placeholder: Option<&str>) -> CountSummary {
    let killers = profile
        .enemies
        .iter()
        .filter(|e| e.deaths > 0)
        .map(|e| (e.unique_name.as_str(), e.deaths));
    CountSummary {
        total: profile.deaths,
        items: summarize(killers, catalog, placeholder).items,
    }
}

/// First strictly greatest scan count wins ties.
pub fn most_scans(profile: &ProfilePayload, catalog: &Catalog, placeholder: Option<&str>) -> MostScans {
    let mut best = MostScans::default();
    for scan in &profile.scans {
        let name = catalog.display_name(&scan.unique_name, placeholder);
        if scan.scans > best.scans {
            best.scans = scan.scans;
            best.name = name.clone();
        }
        best.items.push(NamedCount {
            name,
            count: scan.scans,
        });
    }
    best
}

fn summarize<'a>(
    counts: impl Iterator<Item = (&'a str, u64)>,
    catalog: &Catalog,
    placeholder: Option<&str>,
) -> CountSummary {
    let mut summary = CountSummary::default();
    for (identifier, count) in counts {
        summary.total = summary.total.saturating_add(count);
        summary.items.push(NamedCount {
            name: catalog.display_name(identifier, placeholder),
            count,
        });
    }
    summary
}
