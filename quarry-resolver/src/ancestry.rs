//! Ancestry walks along branch boundaries.
//!
//! A branch name usually resolves to the newest check-in on that branch.
//! The walks here answer the other questions a branch supports: where the
//! branch broke away from its parent, which check-in opened it, and how far
//! the parent branch had advanced into the branch's merged history.

use quarry_core::{IndexSnapshot, Result, Rid};
use tracing::debug;

/// Which point of a branch an ancestry walk should land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchPoint {
    /// The last check-in before the branch began, on the parent branch.
    /// A branch that never diverged yields the root of its history.
    DivergencePoint,
    /// The first check-in on the branch itself.
    FirstOnBranch,
    /// The youngest ancestor of the starting check-in that lies on the
    /// parent branch, counting merged-in history.
    YoungestOnParentBranch,
}

/// Walk primary-parent edges from `start` until the branch boundary.
///
/// The walk follows primary parents while they stay on `start`'s branch.
/// For [`BranchPoint::FirstOnBranch`] it stops on the last check-in still
/// on the branch; otherwise it steps onto the first off-branch parent.
/// [`BranchPoint::YoungestOnParentBranch`] then re-reads the landing
/// check-in's branch and picks the youngest ancestor of `start` on that
/// branch, merge parents included.
pub fn start_of_branch<S: IndexSnapshot + ?Sized>(
    snapshot: &S,
    start: Rid,
    point: BranchPoint,
) -> Result<Option<Rid>> {
    let branch = snapshot.branch_of(start)?;
    let mut at = start;
    loop {
        let links = snapshot.parent_links_of(at)?;
        let Some(parent) = links.iter().find(|link| link.is_primary).map(|link| link.parent)
        else {
            break;
        };
        let parent_on_branch = snapshot.branch_of(parent)? == branch;
        if point == BranchPoint::FirstOnBranch && !parent_on_branch {
            break;
        }
        at = parent;
        if !parent_on_branch {
            break;
        }
    }
    debug!(%start, ?point, landed = %at, "branch walk stopped");
    if point == BranchPoint::YoungestOnParentBranch {
        let parent_branch = snapshot.branch_of(at)?;
        return snapshot.youngest_ancestor_in_branch(start, &parent_branch);
    }
    Ok(Some(at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use quarry_core::{ArtifactHash, ArtifactIndex, ArtifactKind, MemoryIndex};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 6, 1, hour, 0, 0).unwrap()
    }

    fn hash(prefix: &str) -> ArtifactHash {
        let mut text = String::from(prefix);
        while text.len() < 40 {
            text.push('0');
        }
        ArtifactHash::parse(&text).unwrap()
    }

    /// trunk: t1 -> t2 -> t3; feature: f1 (parent t2) -> f2 -> m, where m
    /// also merges t3.
    fn branched_index() -> (MemoryIndex, [Rid; 6]) {
        let index = MemoryIndex::new();
        let t1 = index.add_artifact(ArtifactKind::CheckIn, hash("a1"), at(1));
        let t2 = index.add_artifact(ArtifactKind::CheckIn, hash("a2"), at(2));
        let t3 = index.add_artifact(ArtifactKind::CheckIn, hash("a3"), at(5));
        let f1 = index.add_artifact(ArtifactKind::CheckIn, hash("b1"), at(3));
        let f2 = index.add_artifact(ArtifactKind::CheckIn, hash("b2"), at(4));
        let m = index.add_artifact(ArtifactKind::CheckIn, hash("b3"), at(6));
        index.link(t1, t2, true);
        index.link(t2, t3, true);
        index.link(t2, f1, true);
        index.link(f1, f2, true);
        index.link(f2, m, true);
        index.link(t3, m, false);
        for rid in [f1, f2, m] {
            index.set_branch(rid, "feature");
        }
        (index, [t1, t2, t3, f1, f2, m])
    }

    #[test]
    fn test_divergence_point_lands_on_parent_branch() {
        let (index, [_, t2, _, _, f2, _]) = branched_index();
        let snapshot = index.snapshot().unwrap();
        assert_eq!(
            start_of_branch(&snapshot, f2, BranchPoint::DivergencePoint).unwrap(),
            Some(t2)
        );
    }

    #[test]
    fn test_first_on_branch_stays_on_branch() {
        let (index, [_, _, _, f1, f2, _]) = branched_index();
        let snapshot = index.snapshot().unwrap();
        assert_eq!(
            start_of_branch(&snapshot, f2, BranchPoint::FirstOnBranch).unwrap(),
            Some(f1)
        );
        // already first on the branch: the walk does not move
        assert_eq!(
            start_of_branch(&snapshot, f1, BranchPoint::FirstOnBranch).unwrap(),
            Some(f1)
        );
    }

    #[test]
    fn test_youngest_on_parent_branch_counts_merges() {
        let (index, [_, t2, t3, _, f2, m]) = branched_index();
        let snapshot = index.snapshot().unwrap();
        // f2 has no merge history: only t2 is reachable on trunk
        assert_eq!(
            start_of_branch(&snapshot, f2, BranchPoint::YoungestOnParentBranch).unwrap(),
            Some(t2)
        );
        // m merged t3, so trunk history reaches t3
        assert_eq!(
            start_of_branch(&snapshot, m, BranchPoint::YoungestOnParentBranch).unwrap(),
            Some(t3)
        );
    }

    #[test]
    fn test_linear_history_degenerates() {
        let index = MemoryIndex::new();
        let t1 = index.add_artifact(ArtifactKind::CheckIn, hash("a1"), at(1));
        let t2 = index.add_artifact(ArtifactKind::CheckIn, hash("a2"), at(2));
        let t3 = index.add_artifact(ArtifactKind::CheckIn, hash("a3"), at(3));
        index.link(t1, t2, true);
        index.link(t2, t3, true);
        let snapshot = index.snapshot().unwrap();

        // no divergence anywhere: the walk runs out at the root
        assert_eq!(
            start_of_branch(&snapshot, t3, BranchPoint::DivergencePoint).unwrap(),
            Some(t1)
        );
        assert_eq!(
            start_of_branch(&snapshot, t3, BranchPoint::FirstOnBranch).unwrap(),
            Some(t1)
        );
        // the "parent branch" of the root is the branch itself, so the
        // youngest ancestor on it is the starting check-in
        assert_eq!(
            start_of_branch(&snapshot, t3, BranchPoint::YoungestOnParentBranch).unwrap(),
            Some(t3)
        );
    }
}
