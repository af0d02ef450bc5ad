//! Exact name resolution: ordered equality probes against the name index.

use crate::catalog::CatalogIndex;
use crate::models::IdentificationResult;

use super::{Match, MatchKind};

// ---

/// One way of turning an identification into an index key.
///
/// Probes only look up keys, they never scan the catalog.
pub trait NameProbe: Send + Sync {
    fn name(&self) -> &'static str;

    fn probe<'a>(&self, id: &IdentificationResult, index: &'a CatalogIndex) -> Option<Match<'a>>;
}

/// Probe with the scientific name. Hits canonical names too, for catalogs
/// that file the binomial as the display name.
pub struct ScientificNameProbe;

impl NameProbe for ScientificNameProbe {
    fn name(&self) -> &'static str {
        "scientific-name"
    }

    fn probe<'a>(&self, id: &IdentificationResult, index: &'a CatalogIndex) -> Option<Match<'a>> {
        probe_key(id.scientific_key()?, index)
    }
}

/// Probe with the common name. Hits aliases as well as primary names.
pub struct CommonNameProbe;

impl NameProbe for CommonNameProbe {
    fn name(&self) -> &'static str {
        "common-name"
    }

    fn probe<'a>(&self, id: &IdentificationResult, index: &'a CatalogIndex) -> Option<Match<'a>> {
        probe_key(id.common_key()?, index)
    }
}

/// Runs its probes in order; the first hit wins.
pub struct ExactResolver {
    probes: Vec<Box<dyn NameProbe>>,
}

impl Default for ExactResolver {
    fn default() -> Self {
        ExactResolver {
            probes: vec![Box::new(ScientificNameProbe), Box::new(CommonNameProbe)],
        }
    }
}

impl ExactResolver {
    // ---
    pub fn new(probes: Vec<Box<dyn NameProbe>>) -> Self {
        ExactResolver { probes }
    }

    /// Append a probe that runs after the existing ones.
    pub fn with_probe(mut self, probe: Box<dyn NameProbe>) -> Self {
        self.probes.push(probe);
        self
    }

    pub fn resolve<'a>(&self, id: &IdentificationResult, index: &'a CatalogIndex) -> Option<Match<'a>> {
        // ---
        if id.is_error() {
            return None;
        }

        self.probes.iter().find_map(|probe| {
            let found = probe.probe(id, index)?;
            tracing::debug!(
                "Exact match via {} probe: '{}' -> {}",
                probe.name(),
                found.matched_name,
                found.entry.display_name()
            );
            Some(found)
        })
    }
}

fn probe_key(key: String, index: &CatalogIndex) -> Option<Match<'_>> {
    let (hit, entry) = index.lookup_normalized(&key)?;
    Some(Match {
        entry_id: hit.entry,
        entry,
        score: 100,
        kind: MatchKind::Exact,
        matched_name: key,
    })
}
