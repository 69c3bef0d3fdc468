//! Artifact identities and kinds.
//!
//! A repository assigns every stored artifact a [`Rid`]: a small opaque
//! handle that is only meaningful inside that repository instance. The
//! globally stable identifier for an artifact is its content hash (see
//! [`crate::hashname`]); the index maintains the 1:1 mapping between the
//! two. Resolution works in terms of `Rid` and only surfaces hashes at the
//! edges.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Rid
// =============================================================================

/// Opaque, process-local artifact identity.
///
/// Not stable across repositories; never persisted or exchanged. A zero
/// value is not a valid identity and callers must not treat a default
/// `Rid` as a successful resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rid(u64);

impl Rid {
    /// Wrap a raw identity number.
    pub const fn new(raw: u64) -> Self {
        Rid(raw)
    }

    /// The raw identity number.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Rid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Rid {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.parse::<u64>().map(Rid)
    }
}

// =============================================================================
// ArtifactKind / KindFilter
// =============================================================================

/// The kind of a stored artifact, as recorded by the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// A check-in (commit) in the version graph
    CheckIn,
    /// A file blob referenced by check-ins
    File,
    /// One revision of a wiki page
    WikiEdit,
    /// One change to a ticket
    TicketChange,
    /// One revision of a technote
    Technote,
    /// A control artifact that adds or cancels tags
    TagChange,
}

/// Restricts which artifact kinds are eligible matches for a resolution.
///
/// `BranchStart` is a derived filter: it matches check-ins, and asks the
/// resolver to adjust a symbolic-tag match to the first check-in of its
/// branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KindFilter {
    /// Any artifact kind
    Any,
    /// Check-ins only
    CheckIn,
    /// File blobs only
    File,
    /// Wiki page revisions only
    WikiEdit,
    /// Ticket changes only
    TicketChange,
    /// Technote revisions only
    Technote,
    /// Tag-control artifacts only
    TagChange,
    /// Check-ins, adjusted to the first check-in of the matched branch
    BranchStart,
}

impl KindFilter {
    /// Lower the derived `BranchStart` filter to the base kind it matches.
    pub fn effective(self) -> KindFilter {
        match self {
            KindFilter::BranchStart => KindFilter::CheckIn,
            other => other,
        }
    }

    /// True when branch-relative adjustment was requested.
    pub fn wants_branch_start(self) -> bool {
        self == KindFilter::BranchStart
    }

    /// Whether an artifact of `kind` is an eligible match.
    pub fn matches(self, kind: ArtifactKind) -> bool {
        match self.effective() {
            KindFilter::Any => true,
            KindFilter::CheckIn => kind == ArtifactKind::CheckIn,
            KindFilter::File => kind == ArtifactKind::File,
            KindFilter::WikiEdit => kind == ArtifactKind::WikiEdit,
            KindFilter::TicketChange => kind == ArtifactKind::TicketChange,
            KindFilter::Technote => kind == ArtifactKind::Technote,
            KindFilter::TagChange => kind == ArtifactKind::TagChange,
            KindFilter::BranchStart => unreachable!("lowered by effective()"),
        }
    }
}
