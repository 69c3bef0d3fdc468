//! In-memory artifact index.
//!
//! Stores all records in memory behind `Arc<RwLock>` so fixtures can be
//! built up mutably while earlier snapshots keep reading a stable state.
//! This is the index used by tests and by embedders that materialize a
//! repository view themselves; it is not a storage engine.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use crate::artifact::{ArtifactKind, KindFilter, Rid};
use crate::error::Result;
use crate::hashname::{ArtifactHash, HashPrefix};
use crate::index::{ArtifactIndex, AuditScope, IndexSnapshot, ParentLink, TagNamespace};

/// Branch name reported for check-ins with no explicit branch assignment,
/// unless the index was configured otherwise.
pub const DEFAULT_BRANCH: &str = "trunk";

#[derive(Debug, Clone)]
struct ArtifactRecord {
    hash: ArtifactHash,
    kind: ArtifactKind,
    time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct TagBinding {
    target: Rid,
    active: bool,
}

#[derive(Debug, Clone, Copy)]
struct LinkRow {
    parent: Rid,
    child: Rid,
    is_primary: bool,
}

#[derive(Debug, Clone)]
struct IndexState {
    artifacts: BTreeMap<Rid, ArtifactRecord>,
    next_rid: u64,
    tags: HashMap<(TagNamespace, String), Vec<TagBinding>>,
    links: Vec<LinkRow>,
    branches: HashMap<Rid, String>,
    default_branch: String,
    technote_ids: Vec<String>,
    ticket_ids: Vec<String>,
}

impl Default for IndexState {
    fn default() -> Self {
        IndexState {
            artifacts: BTreeMap::new(),
            next_rid: 1,
            tags: HashMap::new(),
            links: Vec::new(),
            branches: HashMap::new(),
            default_branch: DEFAULT_BRANCH.to_string(),
            technote_ids: Vec::new(),
            ticket_ids: Vec::new(),
        }
    }
}

/// In-memory artifact index.
///
/// Cloning shares the underlying state. [`MemoryIndex::snapshot`] returns
/// an immutable copy, so a snapshot taken before a mutation never sees it.
#[derive(Clone, Default)]
pub struct MemoryIndex {
    state: Arc<RwLock<IndexState>>,
}

impl Debug for MemoryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("MemoryIndex")
            .field("artifact_count", &state.artifacts.len())
            .field("tag_count", &state.tags.len())
            .field("link_count", &state.links.len())
            .finish()
    }
}

impl MemoryIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the branch name reported for check-ins without an explicit
    /// assignment.
    pub fn set_default_branch(&self, name: &str) {
        self.state.write().default_branch = name.to_string();
    }

    /// Store an artifact with an explicit content hash. Returns the
    /// assigned identity.
    pub fn add_artifact(&self, kind: ArtifactKind, hash: ArtifactHash, time: DateTime<Utc>) -> Rid {
        let mut state = self.state.write();
        let rid = Rid::new(state.next_rid);
        state.next_rid += 1;
        state.artifacts.insert(rid, ArtifactRecord { hash, kind, time });
        rid
    }

    /// Store an artifact, minting its content hash from `content` with
    /// SHA-256.
    pub fn add_artifact_from_content(
        &self,
        kind: ArtifactKind,
        content: &[u8],
        time: DateTime<Utc>,
    ) -> Rid {
        let hash = ArtifactHash::from_digest_hex(hex::encode(Sha256::digest(content)));
        self.add_artifact(kind, hash, time)
    }

    /// Record a parent edge between two check-ins.
    pub fn link(&self, parent: Rid, child: Rid, is_primary: bool) {
        self.state.write().links.push(LinkRow {
            parent,
            child,
            is_primary,
        });
    }

    /// Assign a symbolic tag to an artifact, or re-activate a cancelled
    /// assignment.
    pub fn apply_tag(&self, namespace: TagNamespace, name: &str, target: Rid) {
        let mut state = self.state.write();
        let bindings = state
            .tags
            .entry((namespace, name.to_string()))
            .or_default();
        match bindings.iter_mut().find(|b| b.target == target) {
            Some(binding) => binding.active = true,
            None => bindings.push(TagBinding {
                target,
                active: true,
            }),
        }
    }

    /// Cancel a tag assignment. Unknown assignments are ignored.
    pub fn cancel_tag(&self, namespace: TagNamespace, name: &str, target: Rid) {
        let mut state = self.state.write();
        if let Some(bindings) = state.tags.get_mut(&(namespace, name.to_string())) {
            if let Some(binding) = bindings.iter_mut().find(|b| b.target == target) {
                binding.active = false;
            }
        }
    }

    /// Set the branch a check-in belongs to.
    pub fn set_branch(&self, rid: Rid, branch: &str) {
        self.state.write().branches.insert(rid, branch.to_string());
    }

    /// Register a technote identifier for collision audits.
    pub fn register_technote_id(&self, id: &str) {
        self.state.write().technote_ids.push(id.to_string());
    }

    /// Register a ticket identifier for collision audits.
    pub fn register_ticket_id(&self, id: &str) {
        self.state.write().ticket_ids.push(id.to_string());
    }
}

impl ArtifactIndex for MemoryIndex {
    type Snapshot = MemorySnapshot;

    fn snapshot(&self) -> Result<MemorySnapshot> {
        Ok(MemorySnapshot {
            state: self.state.read().clone(),
        })
    }
}

/// Immutable view of one [`MemoryIndex`] state.
#[derive(Debug, Clone)]
pub struct MemorySnapshot {
    state: IndexState,
}

impl MemorySnapshot {
    fn record(&self, rid: Rid) -> Option<&ArtifactRecord> {
        self.state.artifacts.get(&rid)
    }

    fn materialize(&self, row: LinkRow) -> Option<ParentLink> {
        let child = self.record(row.child)?;
        Some(ParentLink {
            parent: row.parent,
            child: row.child,
            is_primary: row.is_primary,
            child_time: child.time,
        })
    }
}

impl IndexSnapshot for MemorySnapshot {
    fn artifacts_with_prefix(&self, prefix: &HashPrefix, filter: KindFilter) -> Result<Vec<Rid>> {
        Ok(self
            .state
            .artifacts
            .iter()
            .filter(|(_, record)| filter.matches(record.kind) && record.hash.has_prefix(prefix))
            .map(|(rid, _)| *rid)
            .collect())
    }

    fn any_hash_starts_with(&self, text: &str) -> Result<bool> {
        Ok(self
            .state
            .artifacts
            .values()
            .any(|record| record.hash.as_str().starts_with(text)))
    }

    fn hash_of(&self, rid: Rid) -> Result<Option<ArtifactHash>> {
        Ok(self.record(rid).map(|record| record.hash.clone()))
    }

    fn kind_of(&self, rid: Rid) -> Result<Option<ArtifactKind>> {
        Ok(self.record(rid).map(|record| record.kind))
    }

    fn time_of(&self, rid: Rid) -> Result<Option<DateTime<Utc>>> {
        Ok(self.record(rid).map(|record| record.time))
    }

    fn latest_at_or_before(
        &self,
        bound: DateTime<Utc>,
        filter: KindFilter,
    ) -> Result<Option<Rid>> {
        Ok(self
            .state
            .artifacts
            .iter()
            .filter(|(_, record)| filter.matches(record.kind) && record.time <= bound)
            .max_by_key(|(rid, record)| (record.time, **rid))
            .map(|(rid, _)| *rid))
    }

    fn latest_check_in(&self) -> Result<Option<Rid>> {
        Ok(self
            .state
            .artifacts
            .iter()
            .filter(|(_, record)| record.kind == ArtifactKind::CheckIn)
            .max_by_key(|(rid, record)| (record.time, **rid))
            .map(|(rid, _)| *rid))
    }

    fn tag_target(
        &self,
        namespace: TagNamespace,
        name: &str,
        filter: KindFilter,
        at_or_before: Option<DateTime<Utc>>,
    ) -> Result<Option<Rid>> {
        let Some(bindings) = self.state.tags.get(&(namespace, name.to_string())) else {
            return Ok(None);
        };
        Ok(bindings
            .iter()
            .filter(|binding| binding.active)
            .filter_map(|binding| {
                let record = self.record(binding.target)?;
                if !filter.matches(record.kind) {
                    return None;
                }
                if let Some(bound) = at_or_before {
                    if record.time > bound {
                        return None;
                    }
                }
                Some((record.time, binding.target))
            })
            .max()
            .map(|(_, target)| target))
    }

    fn branch_of(&self, rid: Rid) -> Result<String> {
        Ok(self
            .state
            .branches
            .get(&rid)
            .cloned()
            .unwrap_or_else(|| self.state.default_branch.clone()))
    }

    fn parent_links_of(&self, child: Rid) -> Result<Vec<ParentLink>> {
        Ok(self
            .state
            .links
            .iter()
            .filter(|row| row.child == child)
            .filter_map(|row| self.materialize(*row))
            .collect())
    }

    fn child_links_of(&self, parent: Rid) -> Result<Vec<ParentLink>> {
        Ok(self
            .state
            .links
            .iter()
            .filter(|row| row.parent == parent)
            .filter_map(|row| self.materialize(*row))
            .collect())
    }

    fn youngest_ancestor_in_branch(&self, start: Rid, branch: &str) -> Result<Option<Rid>> {
        let mut seen = HashSet::new();
        let mut pending = vec![start];
        let mut best: Option<(DateTime<Utc>, Rid)> = None;
        while let Some(rid) = pending.pop() {
            if !seen.insert(rid) {
                continue;
            }
            if let Some(record) = self.record(rid) {
                if self.branch_of(rid)? == branch {
                    let candidate = (record.time, rid);
                    if best.map_or(true, |current| candidate > current) {
                        best = Some(candidate);
                    }
                }
            }
            for row in self.state.links.iter().filter(|row| row.child == rid) {
                pending.push(row.parent);
            }
        }
        Ok(best.map(|(_, rid)| rid))
    }

    fn collision_universe(&self, scope: AuditScope) -> Result<Vec<String>> {
        let mut universe: Vec<String> = match scope {
            AuditScope::All => self
                .state
                .artifacts
                .values()
                .map(|record| record.hash.as_str().to_string())
                .chain(self.state.technote_ids.iter().cloned())
                .chain(self.state.ticket_ids.iter().cloned())
                .collect(),
            AuditScope::CheckInsOnly => self
                .state
                .artifacts
                .values()
                .filter(|record| record.kind == ArtifactKind::CheckIn)
                .map(|record| record.hash.as_str().to_string())
                .collect(),
        };
        universe.sort();
        universe.dedup();
        Ok(universe)
    }
}
