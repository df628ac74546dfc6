//! Name-resolution engine and profile metrics for Warframe statistics payloads.
//!
//! Static payloads (translation tables, the item catalog, sortie modifiers) are folded
//! into a [catalog::Catalog]; identifiers seen in profile and worldstate payloads are
//! resolved against it through the fuzzy fallback chain in [catalog::resolver].

pub mod catalog;
pub mod cli;
pub mod config;
pub mod data;
pub mod metrics;
pub mod parallel;
pub mod refresh;
pub mod server;
