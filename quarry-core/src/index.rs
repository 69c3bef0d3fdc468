//! Artifact index interfaces consumed by the resolver.
//!
//! The resolver never owns artifact, tag, or graph state; it reads an
//! existing index through these traits. [`ArtifactIndex`] hands out
//! consistent read views; [`IndexSnapshot`] is the query surface of one
//! such view. Every method returns a [`Result`] so that a failing backing
//! store surfaces as [`crate::Error::IndexUnavailable`] instead of being
//! silently folded into "not found".
//!
//! A resolution run takes exactly one snapshot and issues all of its
//! queries against it. Forms that query more than once (branch walks,
//! recursive sub-resolution, label-with-date) therefore never observe a
//! tag or artifact appearing between sub-queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::artifact::{ArtifactKind, KindFilter, Rid};
use crate::error::Result;
use crate::hashname::{ArtifactHash, HashPrefix};

/// Symbolic-tag namespaces.
///
/// Wiki titles do not share the general symbolic namespace: a wiki page
/// named `build` never shadows a branch or release label named `build`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagNamespace {
    /// Branch names, release labels, and other general symbolic names
    Symbolic,
    /// Wiki page titles
    Wiki,
}

/// Which identifiers participate in a collision audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditScope {
    /// Every hash-like identifier: artifact hashes, technote identifiers,
    /// ticket identifiers
    All,
    /// Content hashes of check-ins only
    CheckInsOnly,
}

/// A directed parent edge in the check-in graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLink {
    /// The ancestor check-in
    pub parent: Rid,
    /// The descendant check-in
    pub child: Rid,
    /// True for the mainline ancestor edge. A non-root check-in has exactly
    /// one primary parent; merge contributors are secondary.
    pub is_primary: bool,
    /// Event time of the child check-in
    pub child_time: DateTime<Utc>,
}

/// Snapshot factory for an artifact index.
pub trait ArtifactIndex {
    /// The read view this index hands out.
    type Snapshot: IndexSnapshot;

    /// Capture a consistent read view of the current index state.
    ///
    /// Mutations committed after the snapshot is taken are not visible
    /// through it.
    fn snapshot(&self) -> Result<Self::Snapshot>;
}

/// Read queries against one consistent index state.
pub trait IndexSnapshot {
    /// All artifacts whose content hash starts with `prefix`, restricted by
    /// `filter`, in ascending identity order.
    fn artifacts_with_prefix(&self, prefix: &HashPrefix, filter: KindFilter) -> Result<Vec<Rid>>;

    /// Whether any stored content hash starts with `text`, taken verbatim.
    ///
    /// Used to detect all-digit strings that are simultaneously a compact
    /// date and a live hash prefix; `text` must already be lower-case.
    fn any_hash_starts_with(&self, text: &str) -> Result<bool>;

    /// The full content hash of an artifact, if it exists.
    fn hash_of(&self, rid: Rid) -> Result<Option<ArtifactHash>>;

    /// The kind of an artifact, if it exists.
    fn kind_of(&self, rid: Rid) -> Result<Option<ArtifactKind>>;

    /// The event time of an artifact, if it exists.
    fn time_of(&self, rid: Rid) -> Result<Option<DateTime<Utc>>>;

    /// The most recent artifact matching `filter` with an event time at or
    /// before `bound`.
    fn latest_at_or_before(
        &self,
        bound: DateTime<Utc>,
        filter: KindFilter,
    ) -> Result<Option<Rid>>;

    /// The most recent check-in by event time.
    fn latest_check_in(&self) -> Result<Option<Rid>>;

    /// The artifact a symbolic tag points at.
    ///
    /// Considers active assignments of `name` in `namespace` whose targets
    /// match `filter`, optionally restricted to targets with event times at
    /// or before `at_or_before`. When the tag was assigned to several
    /// artifacts over time, the target with the newest event time wins.
    fn tag_target(
        &self,
        namespace: TagNamespace,
        name: &str,
        filter: KindFilter,
        at_or_before: Option<DateTime<Utc>>,
    ) -> Result<Option<Rid>>;

    /// The branch name of a check-in. Check-ins with no explicit branch
    /// assignment report the repository default branch.
    fn branch_of(&self, rid: Rid) -> Result<String>;

    /// All parent edges of `child`.
    fn parent_links_of(&self, child: Rid) -> Result<Vec<ParentLink>>;

    /// All child edges of `parent`.
    fn child_links_of(&self, parent: Rid) -> Result<Vec<ParentLink>>;

    /// The ancestor of `start` (including `start` itself) with the newest
    /// event time among those on `branch`, following all parent edges.
    fn youngest_ancestor_in_branch(&self, start: Rid, branch: &str) -> Result<Option<Rid>>;

    /// All identifiers participating in collision audits, sorted
    /// lexicographically with duplicates removed.
    fn collision_universe(&self, scope: AuditScope) -> Result<Vec<String>>;
}
