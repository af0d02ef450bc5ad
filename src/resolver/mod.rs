//! Name resolution: identification result in, catalog entry (or ranked
//! alternatives) out.
//!
//! Exact probes run first; the fuzzy path is only reached on an exact miss.
//! An identification that carries an upstream error is never resolved.
use serde::Serialize;

use crate::catalog::{CatalogEntry, CatalogIndex, EntryId};
use crate::models::IdentificationResult;

mod exact;
mod fuzzy;

pub use exact::{CommonNameProbe, ExactResolver, NameProbe, ScientificNameProbe};
pub use fuzzy::{FuzzyResolver, DEFAULT_SUGGESTION_LIMIT, DEFAULT_THRESHOLD};

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchKind {
    Exact,
    Fuzzy,
}

/// A catalog entry reached through one of its name keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match<'a> {
    pub entry_id: EntryId,
    pub entry: &'a CatalogEntry,
    /// Similarity on 0-100; always 100 for exact matches.
    pub score: u8,
    pub kind: MatchKind,
    /// The normalized index key that matched.
    pub matched_name: String,
}

/// What came of one identification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ResolutionOutcome<'a> {
    /// A single entry, found exactly or by a confident fuzzy pick.
    Resolved {
        #[serde(rename = "match")]
        found: Match<'a>,
    },
    /// No confident pick; ranked alternatives, possibly none.
    Suggestions { suggestions: Vec<Match<'a>> },
    /// Identification failed upstream, nothing was attempted.
    Skipped { reason: String },
}

impl<'a> ResolutionOutcome<'a> {
    pub fn resolved(&self) -> Option<&Match<'a>> {
        match self {
            ResolutionOutcome::Resolved { found } => Some(found),
            _ => None,
        }
    }
}

/// Similarity bar for alternatives offered after a confident pick failed.
///
/// Lower than [`DEFAULT_THRESHOLD`]: anything clearing the pick bar would
/// already have resolved, so suggestions only ever come from below it.
pub const DEFAULT_SUGGESTION_THRESHOLD: u8 = 60;

pub struct Resolver {
    exact: ExactResolver,
    fuzzy: FuzzyResolver,
    alternatives: FuzzyResolver,
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver::new(
            ExactResolver::default(),
            FuzzyResolver::default(),
            FuzzyResolver::new(DEFAULT_SUGGESTION_THRESHOLD, DEFAULT_SUGGESTION_LIMIT),
        )
    }
}

impl Resolver {
    // ---
    /// `fuzzy` picks a single entry; `alternatives` ranks suggestions when
    /// no pick was made.
    pub fn new(exact: ExactResolver, fuzzy: FuzzyResolver, alternatives: FuzzyResolver) -> Self {
        Resolver {
            exact,
            fuzzy,
            alternatives,
        }
    }

    /// Exact probes, then the fuzzy best match.
    pub fn find_care_profile<'a>(
        &self,
        id: &IdentificationResult,
        index: &'a CatalogIndex,
    ) -> Option<Match<'a>> {
        self.exact
            .resolve(id, index)
            .or_else(|| self.fuzzy.best_match(id, index))
    }

    /// Ranked alternatives for an identification with no confident pick.
    pub fn suggest_alternatives<'a>(
        &self,
        id: &IdentificationResult,
        index: &'a CatalogIndex,
    ) -> Vec<Match<'a>> {
        self.alternatives.suggest(id, index)
    }

    pub fn resolve<'a>(&self, id: &IdentificationResult, index: &'a CatalogIndex) -> ResolutionOutcome<'a> {
        // ---
        if let Some(reason) = &id.error {
            tracing::debug!("Identification carries an error, skipping resolution: {}", reason);
            return ResolutionOutcome::Skipped {
                reason: reason.clone(),
            };
        }

        match self.find_care_profile(id, index) {
            Some(found) => ResolutionOutcome::Resolved { found },
            None => ResolutionOutcome::Suggestions {
                suggestions: self.suggest_alternatives(id, index),
            },
        }
    }
}
