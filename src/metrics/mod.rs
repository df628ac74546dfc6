//! Derived per-profile metrics. Every identifier in a profile is displayed through the
//! catalog's fuzzy resolver, falling back to the placeholder or the raw identifier.
//! World-state summaries live in [world].

pub mod activity;
pub mod loadout;
pub mod progress;
pub mod world;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::data::profile::ProfilePayload;
use crate::parallel::WorkerPool;

pub use activity::{abilities_used, deaths, enemies_killed, most_scans, CountSummary, MostScans, NamedCount};
pub use loadout::{most_used, most_used_by_slot, MostUsed, SlotUsage, SLOTS};
pub use progress::{credits, rank, star_chart_completion, time_played, Credits, NodeScore, Rank, StarChart, TimePlayed};
pub use world::{compute_world_metrics, fissures, invasions, sortie, FissureKind, WorldMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    AbilitiesUsed,
    EnemiesKilled,
    MostScans,
    Deaths,
    Credits,
    Rank,
    TimePlayed,
    StarChart,
    MostUsed,
}

impl MetricKind {
    pub const ALL: [MetricKind; 9] = [
        MetricKind::AbilitiesUsed,
        MetricKind::EnemiesKilled,
        MetricKind::MostScans,
        MetricKind::Deaths,
        MetricKind::Credits,
        MetricKind::Rank,
        MetricKind::TimePlayed,
        MetricKind::StarChart,
        MetricKind::MostUsed,
    ];
}

/// Metrics for one profile; a field is present only when its [MetricKind] was requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abilities_used: Option<CountSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enemies_killed: Option<CountSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_scans: Option<MostScans>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deaths: Option<CountSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<Credits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<Rank>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_played: Option<TimePlayed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub star_chart: Option<StarChart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_used: Option<Vec<MostUsed>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserMetrics {
    pub username: String,
    pub metrics: ProfileMetrics,
}

pub fn compute_profile_metrics(
    profile: &ProfilePayload,
    catalog: &Catalog,
    kinds: &[MetricKind],
    placeholder: Option<&str>,
) -> ProfileMetrics {
    let mut out = ProfileMetrics::default();
    for kind in kinds {
        match kind {
            MetricKind::AbilitiesUsed => out.abilities_used = Some(abilities_used(profile, catalog, placeholder)),
            MetricKind::EnemiesKilled => out.enemies_killed = Some(enemies_killed(profile, catalog, placeholder)),
            MetricKind::MostScans => out.most_scans = Some(most_scans(profile, catalog, placeholder)),
            MetricKind::Deaths => out.deaths = Some(deaths(profile, catalog, placeholder)),
            MetricKind::Credits => out.credits = Some(credits(profile)),
            MetricKind::Rank => out.rank = Some(rank(profile)),
            MetricKind::TimePlayed => out.time_played = Some(time_played(profile)),
            MetricKind::StarChart => out.star_chart = Some(star_chart_completion(profile, catalog)),
            MetricKind::MostUsed => out.most_used = Some(most_used_by_slot(profile, catalog)),
        }
    }
    out
}

/// Compute metrics for many profiles in parallel. Results are ordered by username.
pub fn compute_all(
    profiles: &[(String, ProfilePayload)],
    catalog: &Catalog,
    kinds: &[MetricKind],
    placeholder: Option<&str>,
    pool: WorkerPool,
) -> Vec<UserMetrics> {
    let mut results: Vec<UserMetrics> = pool.install(|| {
        profiles
            .par_iter()
            .map(|(username, profile)| UserMetrics {
                username: username.clone(),
                metrics: compute_profile_metrics(profile, catalog, kinds, placeholder),
            })
            .collect()
    });
    results.sort_by(|a, b| a.username.cmp(&b.username));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogBuilder;

    #[test]
    fn only_requested_metrics_are_present() {
        let catalog = CatalogBuilder::new().finish().0;
        let metrics = compute_profile_metrics(
            &ProfilePayload::default(),
            &catalog,
            &[MetricKind::Rank, MetricKind::Credits],
            None,
        );
        assert!(metrics.rank.is_some());
        assert!(metrics.credits.is_some());
        assert!(metrics.abilities_used.is_none());
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 2);
    }

    #[test]
    fn compute_all_orders_by_username() {
        let catalog = CatalogBuilder::new().finish().0;
        let profiles = vec![
            ("zeta".to_string(), ProfilePayload::default()),
            ("alpha".to_string(), ProfilePayload::default()),
        ];
        let results = compute_all(&profiles, &catalog, &MetricKind::ALL, None, WorkerPool::with_workers(2));
        let names: Vec<_> = results.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
