//! Similarity-ranked resolution for names with no exact index hit.
//!
//! Two separate call paths share the candidate scoring:
//! - [`FuzzyResolver::best_match`] picks the single best key across all
//!   query terms, accepted only at or above the threshold.
//! - [`FuzzyResolver::suggest`] ranks every entry with a key at or above
//!   the threshold, best score per entry, capped at the suggestion limit.
//!
//! Ties go to the first probed term (scientific before common), then to
//! catalog order.
use std::collections::{BTreeMap, HashSet};

use crate::catalog::{normalize_name, CatalogIndex, EntryId};
use crate::models::IdentificationResult;
use crate::similarity::weighted_ratio;

use super::{Match, MatchKind};

// ---

pub const DEFAULT_THRESHOLD: u8 = 75;
pub const DEFAULT_SUGGESTION_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct FuzzyResolver {
    threshold: u8,
    limit: usize,
}

impl Default for FuzzyResolver {
    fn default() -> Self {
        FuzzyResolver::new(DEFAULT_THRESHOLD, DEFAULT_SUGGESTION_LIMIT)
    }
}

impl FuzzyResolver {
    // ---
    pub fn new(threshold: u8, limit: usize) -> Self {
        FuzzyResolver {
            threshold: threshold.min(100),
            limit,
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Highest-scoring catalog name across the query terms.
    pub fn best_match<'a>(&self, id: &IdentificationResult, index: &'a CatalogIndex) -> Option<Match<'a>> {
        // ---
        if id.is_error() {
            return None;
        }

        let mut best: Option<(u8, &str, EntryId)> = None;
        for term in id.query_terms() {
            for (key, entry_id) in index.names() {
                let score = weighted_ratio(&term, key);
                if best.map_or(true, |(top, _, _)| score > top) {
                    best = Some((score, key, entry_id));
                }
            }
        }

        let (score, key, entry_id) = best.filter(|(score, _, _)| *score >= self.threshold)?;
        let entry = index.entry(entry_id)?;

        tracing::debug!(
            "Fuzzy best match '{}' -> {} (score {})",
            key,
            entry.display_name(),
            score
        );

        Some(Match {
            entry_id,
            entry,
            score,
            kind: MatchKind::Fuzzy,
            matched_name: key.to_string(),
        })
    }

    /// Ranked alternatives, excluding the name that was already identified.
    pub fn suggest<'a>(&self, id: &IdentificationResult, index: &'a CatalogIndex) -> Vec<Match<'a>> {
        // ---
        if id.is_error() || self.limit == 0 {
            return Vec::new();
        }

        let terms = id.query_terms();

        // Keyed by entry id so iteration is catalog order before ranking.
        let mut per_entry: BTreeMap<EntryId, (u8, &str)> = BTreeMap::new();
        for term in &terms {
            for (key, entry_id) in index.names() {
                let score = weighted_ratio(term, key);
                if score < self.threshold {
                    continue;
                }
                per_entry
                    .entry(entry_id)
                    .and_modify(|best| {
                        if score > best.0 {
                            *best = (score, key);
                        }
                    })
                    .or_insert((score, key));
            }
        }

        let mut ranked: Vec<(EntryId, (u8, &str))> = per_entry.into_iter().collect();
        ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0));

        let mut seen_names = HashSet::new();
        let suggestions: Vec<Match<'a>> = ranked
            .into_iter()
            .filter_map(|(entry_id, (score, key))| {
                let entry = index.entry(entry_id)?;
                let display = normalize_name(entry.display_name());
                if terms.contains(&display) || !seen_names.insert(display) {
                    return None;
                }
                Some(Match {
                    entry_id,
                    entry,
                    score,
                    kind: MatchKind::Fuzzy,
                    matched_name: key.to_string(),
                })
            })
            .take(self.limit)
            .collect();

        tracing::debug!(
            "Fuzzy suggestions for {:?}: {} candidate(s)",
            terms,
            suggestions.len()
        );

        suggestions
    }
}
