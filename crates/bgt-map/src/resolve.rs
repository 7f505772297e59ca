//! Raw header → canonical field name resolution.

use std::collections::{BTreeMap, HashMap, HashSet};

use bgt_common::normalize_text;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dictionary::SynonymDictionary;
use crate::error::{MapError, Result};

/// Which side of a substring comparison the alias sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchDirection {
    /// The alias text appears inside the header (`ปี 2569 (บาท)` contains `2569`).
    #[default]
    AliasInHeader,
    /// The header text appears inside the alias.
    HeaderInAlias,
}

/// How a header was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Contains,
    Pattern,
    PassThrough,
}

/// A regex tested against the folded header, yielding a canonical name.
#[derive(Debug, Clone)]
pub struct HeaderPattern {
    regex: Regex,
    canonical: String,
}

impl HeaderPattern {
    pub fn new(pattern: &str, canonical: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| MapError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self {
            regex,
            canonical: normalize_text(canonical),
        })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub contains_fallback: bool,
    pub direction: MatchDirection,
    pub patterns: Vec<HeaderPattern>,
    /// Applied to resolved names before de-duplication.
    pub rename: BTreeMap<String, String>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            contains_fallback: true,
            direction: MatchDirection::default(),
            patterns: Vec::new(),
            rename: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedHeader {
    pub raw: String,
    pub normalized: String,
    pub name: String,
    pub kind: MatchKind,
}

/// Resolves raw headers to unique canonical column names, positionally.
pub fn resolve<S: AsRef<str>>(
    raw_headers: &[S],
    synonyms: &SynonymDictionary,
    options: &ResolveOptions,
) -> Vec<String> {
    resolve_detailed(raw_headers, synonyms, options)
        .into_iter()
        .map(|header| header.name)
        .collect()
}

/// Like [`resolve`], also reporting how each column matched.
pub fn resolve_detailed<S: AsRef<str>>(
    raw_headers: &[S],
    synonyms: &SynonymDictionary,
    options: &ResolveOptions,
) -> Vec<ResolvedHeader> {
    let mut resolved: Vec<ResolvedHeader> = raw_headers
        .iter()
        .map(|raw| {
            let raw = raw.as_ref();
            let normalized = normalize_text(raw);
            let (name, kind) = match_header(&normalized, synonyms, options);
            let name = options.rename.get(&name).cloned().unwrap_or(name);
            ResolvedHeader {
                raw: raw.to_string(),
                normalized,
                name,
                kind,
            }
        })
        .collect();

    let names = dedupe_names(resolved.iter().map(|header| header.name.clone()));
    for (header, name) in resolved.iter_mut().zip(names) {
        if header.name != name {
            debug!(column = %header.name, renamed = %name, "duplicate column renamed");
        }
        header.name = name;
    }
    resolved
}

fn match_header(
    normalized: &str,
    synonyms: &SynonymDictionary,
    options: &ResolveOptions,
) -> (String, MatchKind) {
    let folded = normalized.to_lowercase();

    if let Some(entry) = synonyms
        .entries()
        .iter()
        .find(|entry| entry.keys().iter().any(|key| *key == folded))
    {
        return (entry.canonical().to_string(), MatchKind::Exact);
    }

    if options.contains_fallback && !folded.is_empty() {
        let hit = synonyms.entries().iter().find(|entry| {
            entry.keys().iter().any(|key| {
                !key.is_empty()
                    && match options.direction {
                        MatchDirection::AliasInHeader => folded.contains(key.as_str()),
                        MatchDirection::HeaderInAlias => key.contains(folded.as_str()),
                    }
            })
        });
        if let Some(entry) = hit {
            return (entry.canonical().to_string(), MatchKind::Contains);
        }
    }

    if !folded.is_empty()
        && let Some(pattern) = options
            .patterns
            .iter()
            .find(|pattern| pattern.regex.is_match(&folded))
    {
        return (pattern.canonical.clone(), MatchKind::Pattern);
    }

    (normalized.to_string(), MatchKind::PassThrough)
}

/// Makes names unique: the first occurrence keeps its name, later ones get
/// `_1`, `_2`, … in positional order.
pub fn dedupe_names<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for name in names {
        let count = seen.entry(name.clone()).or_insert(0);
        let unique = if *count == 0 && !taken.contains(&name) {
            name.clone()
        } else {
            let mut suffix = (*count).max(1);
            let mut candidate = format!("{name}_{suffix}");
            while taken.contains(&candidate) {
                suffix += 1;
                candidate = format!("{name}_{suffix}");
            }
            *count = suffix;
            candidate
        };
        *count += 1;
        taken.insert(unique.clone());
        out.push(unique);
    }
    out
}

/// Normalized names of pass-through columns, for reporting.
pub fn unknown_headers(resolved: &[ResolvedHeader]) -> Vec<String> {
    resolved
        .iter()
        .filter(|header| header.kind == MatchKind::PassThrough && !header.normalized.is_empty())
        .map(|header| header.normalized.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_appends_counters() {
        let names = dedupe_names(
            ["รายการ", "รายการ", "x", "รายการ"]
                .into_iter()
                .map(String::from),
        );
        assert_eq!(names, ["รายการ", "รายการ_1", "x", "รายการ_2"]);
    }

    #[test]
    fn dedupe_avoids_existing_suffixed_names() {
        let names = dedupe_names(["a", "a_1", "a"].into_iter().map(String::from));
        assert_eq!(names, ["a", "a_1", "a_2"]);
    }

    #[test]
    fn dedupe_never_reuses_a_generated_name() {
        let names = dedupe_names(["a", "a", "a_1"].into_iter().map(String::from));
        assert_eq!(names, ["a", "a_1", "a_1_1"]);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = HeaderPattern::new("(", "x").expect_err("invalid regex");
        assert!(err.to_string().contains("invalid header pattern"));
    }
}
