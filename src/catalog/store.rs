//! Shared slot holding the current catalog snapshot.
//!
//! Rebuilds construct a complete [Catalog] off to the side and swap it in with one
//! atomic store; readers hold an `Arc` to whichever snapshot was current when they
//! loaded it, never a half-built one.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};

use crate::catalog::builder::BuildReport;
use crate::catalog::entry::Catalog;

#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub catalog: Catalog,
    pub report: BuildReport,
    /// None until the first successful build is published.
    pub built_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct CatalogStore {
    current: ArcSwap<CatalogSnapshot>,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    /// Empty store; lookups miss until the first publish.
    pub fn new() -> Self {
        CatalogStore {
            current: ArcSwap::from_pointee(CatalogSnapshot::default()),
        }
    }

    pub fn load(&self) -> Arc<CatalogSnapshot> {
        self.current.load_full()
    }

    /// Replace the current snapshot with a freshly built catalog.
    pub fn publish(&self, catalog: Catalog, report: BuildReport) -> Arc<CatalogSnapshot> {
        let snapshot = Arc::new(CatalogSnapshot {
            catalog,
            report,
            built_at: Some(Utc::now()),
        });
        self.current.store(Arc::clone(&snapshot));
        snapshot
    }

    pub fn is_populated(&self) -> bool {
        self.current.load().built_at.is_some()
    }
}
