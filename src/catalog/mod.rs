//! Catalog: the lookup table from lowercased identifier to display metadata.
//!
//! [builder] folds raw payloads (parsed by [payload]) into a [Catalog], [resolver]
//! answers fuzzy queries against it, and [store] holds the current snapshot that
//! readers share between rebuilds.

pub mod builder;
mod entry;
pub mod payload;
pub mod resolver;
pub mod store;

pub use builder::{build_catalog, BuildReport, CatalogBuilder, SourceReport};
pub use entry::{normalize_key, Catalog, CatalogEntry, EntryFields};
pub use payload::{ItemCategory, Payload, SourceKind};
pub use resolver::{is_hard_mode, path_stem, resolve, resolve_or, strip_hard_mode, MatchKind, Resolution};
pub use store::{CatalogSnapshot, CatalogStore};
