//! Account progression: income, mastery rank, time played and star chart completion.

use serde::Serialize;

use crate::catalog::{is_hard_mode, strip_hard_mode, Catalog};
use crate::data::profile::ProfilePayload;

/// Mastery ranks above this level are reported as Legendary ranks.
pub const LEGENDARY_THRESHOLD: u32 = 30;
pub const DAYS_PER_MONTH: f64 = 30.44;

const SECONDS_PER_HOUR: f64 = 3600.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credits {
    pub total: f64,
    pub per_hour: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rank {
    pub level: u32,
    /// Rank within its band: the level itself, or levels past the threshold when legendary.
    pub rank: u32,
    pub legendary: bool,
    pub label: String,
    pub per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePlayed {
    pub seconds: f64,
    pub minutes: f64,
    pub hours: f64,
    pub days: f64,
    pub months: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeScore {
    pub node_key: String,
    pub node: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_name: Option<String>,
    pub high_score: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StarChart {
    /// completed / total_missions, 0 when no mission resolved.
    pub completion: f64,
    pub total_missions: usize,
    pub completed: usize,
    pub steel_path: Vec<NodeScore>,
    pub regular: Vec<NodeScore>,
}

fn per_unit(value: f64, seconds: f64, unit: f64) -> f64 {
    let units = seconds / unit;
    if units > 0.0 {
        value / units
    } else {
        0.0
    }
}

pub fn credits(profile: &ProfilePayload) -> Credits {
    Credits {
        total: profile.income,
        per_hour: per_unit(profile.income, profile.time_played_sec, SECONDS_PER_HOUR),
    }
}

pub fn rank(profile: &ProfilePayload) -> Rank {
    let level = profile.player_level;
    let legendary = level > LEGENDARY_THRESHOLD;
    let rank = if legendary { level - LEGENDARY_THRESHOLD } else { level };
    let label = if legendary {
        format!("Legendary {rank}")
    } else {
        rank.to_string()
    };
    Rank {
        level,
        rank,
        legendary,
        label,
        per_day: per_unit(f64::from(level), profile.time_played_sec, SECONDS_PER_DAY),
    }
}

pub fn time_played(profile: &ProfilePayload) -> TimePlayed {
    let seconds = profile.time_played_sec.max(0.0);
    let days = seconds / SECONDS_PER_DAY;
    TimePlayed {
        seconds,
        minutes: seconds / 60.0,
        hours: seconds / SECONDS_PER_HOUR,
        days,
        months: days / DAYS_PER_MONTH,
    }
}

/// Missions count toward the total only when their base node is a catalog key. Node keys are
/// matched exactly: `SolNode123` never counts as `SolNode1`. Completed missions (non-zero high
/// score) are split by whether the raw node key is the hard mode variant.
pub fn star_chart_completion(profile: &ProfilePayload, catalog: &Catalog) -> StarChart {
    let mut chart = StarChart::default();
    for mission in &profile.missions {
        let Some(entry) = catalog.get(strip_hard_mode(&mission.node_key)) else {
            continue;
        };
        chart.total_missions += 1;
        if mission.high_score == 0 {
            continue;
        }
        chart.completed += 1;
        let score = NodeScore {
            node_key: mission.node_key.clone(),
            node: entry.display_name.clone(),
            system_name: entry.system_name.clone(),
            high_score: mission.high_score,
        };
        if is_hard_mode(&mission.node_key) {
            chart.steel_path.push(score);
        } else {
            chart.regular.push(score);
        }
    }
    if chart.total_missions > 0 {
        chart.completion = chart.completed as f64 / chart.total_missions as f64;
    }
    chart
}
