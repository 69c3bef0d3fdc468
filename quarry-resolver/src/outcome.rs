//! Resolution outcomes.
//!
//! Resolution distinguishes "nothing matched" from "several artifacts
//! matched" so callers can report each accurately. Both are ordinary
//! outcomes, not errors; the convenience wrappers in the resolver convert
//! them to errors for callers that only want a single identity.

use serde::{Deserialize, Serialize};

use quarry_core::{HashPrefix, Rid};

/// A hash prefix that matched more than one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguousMatch {
    /// The canonicalized prefix that was looked up.
    pub prefix: HashPrefix,
    /// Every artifact whose hash starts with the prefix, in ascending
    /// identity order.
    pub candidates: Vec<Rid>,
}

impl AmbiguousMatch {
    /// Number of artifacts that matched.
    pub fn count(&self) -> usize {
        self.candidates.len()
    }
}

/// The result of resolving one name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionOutcome {
    /// Exactly one artifact answers to the name.
    Resolved(Rid),
    /// The name is a hash prefix shared by several artifacts.
    Ambiguous(AmbiguousMatch),
    /// No artifact answers to the name.
    NotFound,
}

impl ResolutionOutcome {
    /// True when the name resolved to a single identity.
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionOutcome::Resolved(_))
    }

    /// The resolved identity, if there is one.
    pub fn rid(&self) -> Option<Rid> {
        match self {
            ResolutionOutcome::Resolved(rid) => Some(*rid),
            _ => None,
        }
    }
}
