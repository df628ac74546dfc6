//! Catalog refresh: fetch every configured source, rebuild, and swap the result in.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::catalog::{BuildReport, Catalog, CatalogBuilder, CatalogStore};
use crate::data::sources::{PayloadSource, SourceSpec};

#[derive(Debug, Error)]
pub enum RefreshError {
    /// Nothing usable came back; the previously published catalog stays current.
    #[error("rebuild produced an empty catalog ({unavailable} of {sources} sources unavailable)")]
    EmptyCatalog {
        sources: usize,
        unavailable: usize,
        report: BuildReport,
    },
}

/// Fetch and fold every source in order. Fetch failures are logged and count as unavailable payloads.
pub fn rebuild(source: &dyn PayloadSource, specs: &[SourceSpec]) -> (Catalog, BuildReport) {
    let mut builder = CatalogBuilder::new();
    for spec in specs {
        let payload = match source.fetch(spec) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(source = %spec.name, error = %err, "catalog source unavailable");
                None
            }
        };
        builder.ingest_value(&spec.name, spec.kind, payload.as_ref());
    }
    builder.finish()
}

/// Rebuild and publish into `store`. An empty rebuild is an error and publishes nothing.
pub fn refresh_catalog(
    store: &CatalogStore,
    source: &dyn PayloadSource,
    specs: &[SourceSpec],
) -> Result<BuildReport, RefreshError> {
    let (catalog, report) = rebuild(source, specs);
    if catalog.is_empty() {
        return Err(RefreshError::EmptyCatalog {
            sources: report.sources.len(),
            unavailable: report.unavailable_sources().count(),
            report,
        });
    }
    info!(
        entries = report.entries,
        dropped_unnamed = report.dropped_unnamed,
        "published catalog"
    );
    store.publish(catalog, report.clone());
    Ok(report)
}

/// Refresh on a fixed period until the task is dropped. The first tick is skipped;
/// callers run the initial build themselves so startup failures surface directly.
pub async fn run_periodic(
    store: Arc<CatalogStore>,
    source: Arc<dyn PayloadSource>,
    specs: Vec<SourceSpec>,
    period: Duration,
) {
    let specs: Arc<[SourceSpec]> = specs.into();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let store = Arc::clone(&store);
        let source = Arc::clone(&source);
        let specs = Arc::clone(&specs);
        let outcome =
            tokio::task::spawn_blocking(move || refresh_catalog(&store, source.as_ref(), &specs)).await;
        match outcome {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => warn!(error = %err, "keeping previous catalog"),
            Err(err) => error!(error = %err, "refresh task failed"),
        }
    }
}
