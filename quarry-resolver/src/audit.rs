//! Hash prefix collision diagnostics.
//!
//! Short prefixes stop being unique as a repository grows. The audit
//! scans the whole identifier universe (artifact hashes plus technote and
//! ticket identifiers) and reports every prefix that two identifiers
//! share, so operators can see how short is still safe. The single-name
//! probe answers the narrower question "how many identifiers does this
//! prefix hit".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use quarry_core::hashname::{canonical_hash_name, is_hash_alphabet};
use quarry_core::{AuditScope, IndexSnapshot, HASH_LEN_MAX, HASH_PREFIX_MIN};

use crate::error::Result;

/// Shortest prefix length the audit reports on by default.
pub const DEFAULT_MIN_PREFIX: usize = HASH_PREFIX_MIN;

/// Cap on example prefixes retained per length bucket.
pub const COLLISION_EXAMPLE_CAP: usize = 25;

/// All collisions whose shared prefix has one particular length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionBucket {
    /// Length of the shared prefix, in bytes.
    pub length: usize,
    /// How many adjacent identifier pairs share a prefix of this length.
    pub collisions: usize,
    /// Shared prefixes, in identifier order, capped at
    /// [`COLLISION_EXAMPLE_CAP`].
    pub examples: Vec<String>,
}

/// Outcome of a collision audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionReport {
    /// Shortest prefix length that was considered a collision.
    pub min_length: usize,
    /// How many identifiers were scanned.
    pub scanned: usize,
    /// Buckets ordered longest shared prefix first.
    pub buckets: Vec<CollisionBucket>,
}

impl CollisionReport {
    /// Total collisions across all buckets.
    pub fn total_collisions(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.collisions).sum()
    }

    /// True when no prefix at or above the minimum length collided.
    pub fn is_clean(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Audit the identifier universe with the default minimum prefix length.
pub fn audit_collisions<S: IndexSnapshot + ?Sized>(
    snapshot: &S,
    scope: AuditScope,
) -> Result<CollisionReport> {
    audit_collisions_with_min(snapshot, scope, DEFAULT_MIN_PREFIX)
}

/// Audit the identifier universe, reporting shared prefixes of at least
/// `min_length` bytes.
///
/// The universe is scanned in sorted order, so any two identifiers with a
/// common prefix end up adjacent and every collision is found by
/// comparing neighbors only.
pub fn audit_collisions_with_min<S: IndexSnapshot + ?Sized>(
    snapshot: &S,
    scope: AuditScope,
    min_length: usize,
) -> Result<CollisionReport> {
    let universe = snapshot.collision_universe(scope)?;
    let mut by_length: BTreeMap<usize, CollisionBucket> = BTreeMap::new();
    for pair in universe.windows(2) {
        let shared = common_prefix_len(&pair[0], &pair[1]);
        if shared < min_length {
            continue;
        }
        let bucket = by_length.entry(shared).or_insert_with(|| CollisionBucket {
            length: shared,
            collisions: 0,
            examples: Vec::new(),
        });
        bucket.collisions += 1;
        if bucket.examples.len() < COLLISION_EXAMPLE_CAP {
            bucket.examples.push(pair[1][..shared].to_string());
        }
    }
    Ok(CollisionReport {
        min_length,
        scanned: universe.len(),
        buckets: by_length.into_values().rev().collect(),
    })
}

/// How many identifiers a would-be hash prefix matches.
///
/// Text that is not usable as a hash prefix counts zero, as does a prefix
/// matching fewer than two identifiers. The prefix is canonicalized
/// before counting, so case never hides a collision.
pub fn prefix_collisions<S: IndexSnapshot + ?Sized>(snapshot: &S, text: &str) -> Result<usize> {
    if text.len() < HASH_PREFIX_MIN || text.len() > HASH_LEN_MAX || !is_hash_alphabet(text) {
        return Ok(0);
    }
    let prefix = canonical_hash_name(text);
    let count = snapshot
        .collision_universe(AuditScope::All)?
        .iter()
        .filter(|id| id.starts_with(&prefix))
        .count();
    Ok(if count < 2 { 0 } else { count })
}

/// Byte length of the longest common prefix that ends on a character
/// boundary in both strings.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x.len_utf8())
        .sum()
}
