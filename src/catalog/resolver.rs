//! Fuzzy Resolver: maps raw identifiers from profile and worldstate payloads to catalog entries.
//!
//! Fallback chain, first match wins:
//! 1. exact match on the lowercased identifier;
//! 2. a key that is a prefix of the identifier, or a key the identifier is a prefix of;
//! 3. the same test with the identifier's path stem (everything before the last `/`).
//!
//! Among several related keys the choice is deterministic: a key the identifier extends
//! beats a key that extends the identifier; the longest such prefix wins, and among
//! extensions the shortest wins, then the lexicographically smallest.

use std::ops::Bound;

use serde::Serialize;

use crate::catalog::entry::{normalize_key, Catalog, CatalogEntry};

/// Suffix marking the Steel Path (hard mode) variant of a node identifier.
pub const HARD_MODE_SUFFIX: &str = "_HM";

/// Which step of the fallback chain produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    /// The catalog key is a prefix of the identifier.
    Prefix,
    /// The identifier is a prefix of the catalog key.
    Extension,
    /// Matched through the identifier's path stem.
    Stem,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Prefix => "prefix",
            Self::Extension => "extension",
            Self::Stem => "stem",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub key: &'a str,
    pub entry: &'a CatalogEntry,
    pub kind: MatchKind,
}

/// Resolve an identifier through the fallback chain. Empty identifiers never match.
pub fn resolve<'a>(identifier: &str, catalog: &'a Catalog) -> Option<Resolution<'a>> {
    let needle = normalize_key(identifier);
    if needle.is_empty() {
        return None;
    }

    if let Some((key, entry)) = catalog.entries().get_key_value(needle.as_str()) {
        return Some(Resolution {
            key,
            entry,
            kind: MatchKind::Exact,
        });
    }

    if let Some(found) = related_key(catalog, &needle) {
        return Some(found);
    }

    let stem = path_stem(&needle)?;
    related_key(catalog, stem).map(|found| Resolution {
        kind: MatchKind::Stem,
        ..found
    })
}

/// [resolve], returning the caller's default when nothing matches.
pub fn resolve_or<'a>(
    identifier: &str,
    catalog: &'a Catalog,
    default: Option<&'a CatalogEntry>,
) -> Option<&'a CatalogEntry> {
    resolve(identifier, catalog).map(|found| found.entry).or(default)
}

/// Best key that is a prefix of `needle` (inclusive) or that `needle` is a prefix of.
fn related_key<'a>(catalog: &'a Catalog, needle: &str) -> Option<Resolution<'a>> {
    let entries = catalog.entries();

    let boundaries = needle
        .char_indices()
        .map(|(i, _)| i)
        .filter(|&i| i > 0)
        .chain(std::iter::once(needle.len()));
    let longest_prefix = boundaries
        .rev()
        .find_map(|end| entries.get_key_value(&needle[..end]));
    if let Some((key, entry)) = longest_prefix {
        return Some(Resolution {
            key,
            entry,
            kind: MatchKind::Prefix,
        });
    }

    // Keys extending `needle` sort directly after it; the first shortest one wins.
    let mut best: Option<(&'a String, &'a CatalogEntry)> = None;
    for (key, entry) in entries
        .range::<str, _>((Bound::Excluded(needle), Bound::Unbounded))
        .take_while(|(key, _)| key.starts_with(needle))
    {
        if best.map_or(true, |(current, _)| key.len() < current.len()) {
            best = Some((key, entry));
        }
    }
    best.map(|(key, entry)| Resolution {
        key,
        entry,
        kind: MatchKind::Extension,
    })
}

/// Everything before the final `/`, or None when there is no non-empty stem.
pub fn path_stem(identifier: &str) -> Option<&str> {
    identifier
        .rsplit_once('/')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
}

/// True when the identifier names the hard mode variant of a node (`SolNode001_HM`).
pub fn is_hard_mode(identifier: &str) -> bool {
    identifier.ends_with(HARD_MODE_SUFFIX)
}

/// The identifier with the hard mode suffix removed, if it carries one.
pub fn strip_hard_mode(identifier: &str) -> &str {
    identifier.strip_suffix(HARD_MODE_SUFFIX).unwrap_or(identifier)
}
