use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, warn};

use crate::catalog::{BuildReport, Catalog, CatalogStore};
use crate::config::Config;
use crate::data::profile::{load_profile, ProfilePayload};
use crate::data::sources::{DirectorySource, PayloadSource};
use crate::data::worldstate::{load_worldstate, WorldState};
use crate::metrics::{compute_all, compute_profile_metrics, compute_world_metrics, UserMetrics};
use crate::parallel::WorkerPool;
use crate::refresh::{rebuild, refresh_catalog, run_periodic};
use crate::server::{self, AppState};

const USAGE: &str = "usage: warframe-stats <serve|build|resolve <identifier>...|metrics <profile.json> [username]|metrics --all|worldstate [worldstate.json]>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Build,
    Resolve,
    Metrics,
    WorldState,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("build") => Some(Command::Build),
        Some("resolve") => Some(Command::Resolve),
        Some("metrics") => Some(Command::Metrics),
        Some("worldstate") => Some(Command::WorldState),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };
    match command {
        Command::Serve => handle_serve(config),
        Command::Build => handle_build(&config),
        Command::Resolve => handle_resolve(&config, &args[2..]),
        Command::Metrics => handle_metrics(&config, &args[2..]),
        Command::WorldState => handle_worldstate(&config, args.get(2)),
    }
}

fn handle_serve(config: Config) -> i32 {
    let store = Arc::new(CatalogStore::new());
    let source: Arc<dyn PayloadSource> = Arc::new(DirectorySource::new(&config.data_dir));
    if let Err(err) = refresh_catalog(&store, source.as_ref(), &config.sources) {
        warn!(error = %err, "starting with an empty catalog");
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("runtime error: {err}");
            return 1;
        }
    };
    let period = Duration::from_secs(config.refresh_interval_secs.max(1));
    let sources = config.sources.clone();
    let state = Arc::new(AppState {
        store: Arc::clone(&store),
        source: Arc::clone(&source),
        config,
    });

    let result = runtime.block_on(async move {
        tokio::spawn(run_periodic(store, source, sources, period));
        server::run_server(state).await
    });
    match result {
        Ok(()) => 0,
        Err(err) => {
            error!(error = %err, "server error");
            1
        }
    }
}

fn build_from(config: &Config) -> (Catalog, BuildReport) {
    rebuild(&DirectorySource::new(&config.data_dir), &config.sources)
}

fn handle_build(config: &Config) -> i32 {
    let (catalog, report) = build_from(config);
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("failed to encode report: {err}");
            return 1;
        }
    }
    if catalog.is_empty() {
        eprintln!("catalog is empty; check data_dir {}", config.data_dir.display());
        1
    } else {
        0
    }
}

fn handle_resolve(config: &Config, identifiers: &[String]) -> i32 {
    if identifiers.is_empty() {
        eprintln!("{USAGE}");
        return 2;
    }
    let (catalog, _) = build_from(config);
    let placeholder = config.unknown_placeholder.as_deref();
    for identifier in identifiers {
        let kind = catalog.resolve(identifier).map_or("none", |found| found.kind.as_str());
        println!("{identifier}\t{}\t{kind}", catalog.display_name(identifier, placeholder));
    }
    0
}

fn handle_metrics(config: &Config, args: &[String]) -> i32 {
    let (catalog, _) = build_from(config);
    let placeholder = config.unknown_placeholder.as_deref();

    let encoded = match args.first().map(String::as_str) {
        Some("--all") => {
            let profiles = fetch_configured_profiles(config);
            let results = compute_all(
                &profiles,
                &catalog,
                &config.metrics,
                placeholder,
                WorkerPool::with_workers(config.workers),
            );
            serde_json::to_string_pretty(&results)
        }
        Some(path) => {
            let profile = match load_profile(path) {
                Ok(profile) => profile,
                Err(err) => {
                    eprintln!("{err}");
                    return 1;
                }
            };
            let metrics = compute_profile_metrics(&profile, &catalog, &config.metrics, placeholder);
            match args.get(1) {
                Some(username) => serde_json::to_string_pretty(&UserMetrics {
                    username: username.clone(),
                    metrics,
                }),
                None => serde_json::to_string_pretty(&metrics),
            }
        }
        None => {
            eprintln!("{USAGE}");
            return 2;
        }
    };

    match encoded {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(err) => {
            eprintln!("failed to encode metrics: {err}");
            1
        }
    }
}

/// World summary from an explicit file, else from `<data_dir>/worldState.json`.
fn handle_worldstate(config: &Config, path: Option<&String>) -> i32 {
    let loaded = match path {
        Some(path) => load_worldstate(path).map_err(|err| err.to_string()),
        None => DirectorySource::new(&config.data_dir)
            .fetch_worldstate()
            .map_err(|err| err.to_string())
            .and_then(|raw| WorldState::from_value(&raw).map_err(|err| err.to_string())),
    };
    let world = match loaded {
        Ok(world) => world,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let (catalog, _) = build_from(config);
    let metrics = compute_world_metrics(&world, &catalog, Utc::now(), config.unknown_placeholder.as_deref());
    match serde_json::to_string_pretty(&metrics) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(err) => {
            eprintln!("failed to encode world state: {err}");
            1
        }
    }
}

/// Profiles for every configured username; ones that cannot be loaded are skipped with a warning.
fn fetch_configured_profiles(config: &Config) -> Vec<(String, ProfilePayload)> {
    let source = DirectorySource::new(&config.data_dir);
    config
        .usernames
        .iter()
        .filter_map(|username| {
            let loaded = source
                .fetch_profile(username)
                .map_err(|err| err.to_string())
                .and_then(|raw| ProfilePayload::from_value(&raw).map_err(|err| err.to_string()));
            match loaded {
                Ok(profile) => Some((username.clone(), profile)),
                Err(err) => {
                    warn!(%username, error = %err, "skipping profile");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_command(&args(&["warframe-stats", "serve"])), Some(Command::Serve));
        assert_eq!(parse_command(&args(&["warframe-stats", "resolve", "x"])), Some(Command::Resolve));
        assert_eq!(parse_command(&args(&["warframe-stats", "worldstate"])), Some(Command::WorldState));
        assert_eq!(parse_command(&args(&["warframe-stats", "simulate"])), None);
        assert_eq!(parse_command(&args(&["warframe-stats"])), None);
    }

    #[test]
    fn unknown_command_exits_with_usage_code() {
        assert_eq!(run_with_args(&args(&["warframe-stats", "bogus"])), 2);
    }
}
