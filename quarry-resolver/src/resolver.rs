//! Name-to-identity resolution.
//!
//! A name is tried against a fixed sequence of interpretations and the
//! first one that produces an identity wins. Prefixed forms (`date:`,
//! `tag:`, `root:`, and the rest) are final: once the prefix matches, the
//! answer is whatever that interpretation finds, including nothing. Bare
//! forms fall through to the next interpretation when they find nothing,
//! which is how a tag named like a hash prefix still resolves after the
//! hash lookup comes up empty.
//!
//! Every call resolves against a single index snapshot, so one answer
//! never mixes two states of a concurrently-updated index.

use chrono::{FixedOffset, Offset, Utc};
use tracing::{debug, warn};

use quarry_core::hashname::strip_brackets;
use quarry_core::temporal::{
    expand_compact_datetime, parse_instant_bound, roundup_date_bound, starts_with_iso_date,
};
use quarry_core::{
    ArtifactHash, ArtifactIndex, HashPrefix, IndexSnapshot, KindFilter, Rid, TagNamespace,
    TimeZoneMode,
};

use crate::ancestry::{start_of_branch, BranchPoint};
use crate::error::{ResolverError, Result};
use crate::outcome::{AmbiguousMatch, ResolutionOutcome};

/// Resolves names to artifact identities against an index.
///
/// The resolver is configured once with the index to query, the check-in
/// an open checkout sits on (if any), and the offset that "local" times
/// are interpreted in. Resolution itself borrows the resolver immutably.
pub struct Resolver<I: ArtifactIndex> {
    index: I,
    checkout: Option<Rid>,
    local_offset: FixedOffset,
}

impl<I: ArtifactIndex> Resolver<I> {
    /// Create a resolver with no open checkout and local times read as
    /// UTC.
    pub fn new(index: I) -> Self {
        Resolver {
            index,
            checkout: None,
            local_offset: Utc.fix(),
        }
    }

    /// Set the check-in the open checkout sits on. Enables the
    /// `current`, `prev`, `previous`, and `next` keywords.
    pub fn with_checkout(mut self, rid: Rid) -> Self {
        self.checkout = Some(rid);
        self
    }

    /// Set the offset used to interpret local date-time names.
    pub fn with_local_offset(mut self, offset: FixedOffset) -> Self {
        self.local_offset = offset;
        self
    }

    /// The underlying index.
    pub fn index(&self) -> &I {
        &self.index
    }

    /// Resolve `name` to an outcome under `filter`.
    ///
    /// An empty name is rejected before any lookup. "Several artifacts
    /// matched" and "nothing matched" are outcomes, not errors; use
    /// [`Resolver::resolve_rid`] to get errors instead.
    pub fn resolve(&self, name: &str, filter: KindFilter) -> Result<ResolutionOutcome> {
        if name.is_empty() {
            return Err(ResolverError::malformed_query("empty name"));
        }
        debug!(name, ?filter, "resolving name");
        let snapshot = self.index.snapshot()?;
        self.resolve_with(&snapshot, name, filter)
    }

    /// Resolve `name` to a single identity, or fail.
    pub fn resolve_rid(&self, name: &str, filter: KindFilter) -> Result<Rid> {
        match self.resolve(name, filter)? {
            ResolutionOutcome::Resolved(rid) => Ok(rid),
            ResolutionOutcome::Ambiguous(found) => {
                Err(ResolverError::ambiguous_name(name, found.count()))
            }
            ResolutionOutcome::NotFound => Err(ResolverError::not_found(name)),
        }
    }

    /// Resolve `name` to the full hash of a single artifact, or fail.
    ///
    /// Reads the hash from the same snapshot the name was resolved
    /// against. An identity with no stored hash (the `rid:` escape can
    /// produce one) reports not-found.
    pub fn resolve_hash(&self, name: &str, filter: KindFilter) -> Result<ArtifactHash> {
        if name.is_empty() {
            return Err(ResolverError::malformed_query("empty name"));
        }
        debug!(name, ?filter, "resolving name to hash");
        let snapshot = self.index.snapshot()?;
        match self.resolve_with(&snapshot, name, filter)? {
            ResolutionOutcome::Resolved(rid) => match snapshot.hash_of(rid)? {
                Some(hash) => Ok(hash),
                None => Err(ResolverError::not_found(name)),
            },
            ResolutionOutcome::Ambiguous(found) => {
                Err(ResolverError::ambiguous_name(name, found.count()))
            }
            ResolutionOutcome::NotFound => Err(ResolverError::not_found(name)),
        }
    }

    /// Run the interpretation sequence against one snapshot.
    ///
    /// `root:` and `merge-in:` recurse here so the whole chain, nested
    /// names included, reads one consistent state.
    fn resolve_with(
        &self,
        snapshot: &I::Snapshot,
        name: &str,
        filter: KindFilter,
    ) -> Result<ResolutionOutcome> {
        if name.is_empty() {
            return Ok(ResolutionOutcome::NotFound);
        }
        let branch_start = filter.wants_branch_start();
        let filter = filter.effective();

        if let Some(outcome) = self.try_tip(snapshot, name, filter)? {
            return Ok(outcome);
        }
        if let Some(outcome) = self.try_checkout_keyword(snapshot, name)? {
            return Ok(outcome);
        }
        if let Some(outcome) = self.try_date_prefixed(snapshot, name, filter)? {
            return Ok(outcome);
        }
        if let Some(outcome) = self.try_bare_iso_date(snapshot, name, filter)? {
            return Ok(outcome);
        }
        if let Some(outcome) = self.try_zoned_date(snapshot, name, filter)? {
            return Ok(outcome);
        }
        if let Some(outcome) = self.try_tag_prefixed(snapshot, name, filter, branch_start)? {
            return Ok(outcome);
        }
        if let Some(outcome) = self.try_branch_walk(snapshot, name, filter)? {
            return Ok(outcome);
        }
        if let Some(outcome) = self.try_label_with_date(snapshot, name, filter)? {
            return Ok(outcome);
        }
        if let Some(outcome) = self.try_hash_prefix(snapshot, name, filter)? {
            return Ok(outcome);
        }
        if let Some(outcome) = self.try_symbolic_tag(snapshot, name, filter, branch_start)? {
            return Ok(outcome);
        }
        if let Some(outcome) = self.try_compact_date(snapshot, name, filter)? {
            return Ok(outcome);
        }
        if let Some(outcome) = self.try_raw_rid(snapshot, name, filter)? {
            return Ok(outcome);
        }
        Ok(ResolutionOutcome::NotFound)
    }

    /// `tip`: the newest check-in anywhere. Only consulted when the
    /// filter admits check-ins; falls through on an empty index.
    fn try_tip(
        &self,
        snapshot: &I::Snapshot,
        name: &str,
        filter: KindFilter,
    ) -> Result<Option<ResolutionOutcome>> {
        if name != "tip" || !matches!(filter, KindFilter::Any | KindFilter::CheckIn) {
            return Ok(None);
        }
        Ok(snapshot
            .latest_check_in()?
            .map(ResolutionOutcome::Resolved))
    }

    /// `current`, `prev`, `previous`, `next`: positions relative to the
    /// open checkout. Skipped entirely when no checkout is set; `prev` at
    /// the root and `next` at a leaf fall through.
    fn try_checkout_keyword(
        &self,
        snapshot: &I::Snapshot,
        name: &str,
    ) -> Result<Option<ResolutionOutcome>> {
        let Some(checkout) = self.checkout else {
            return Ok(None);
        };
        let found = match name {
            "current" => Some(checkout),
            "prev" | "previous" => snapshot
                .parent_links_of(checkout)?
                .iter()
                .find(|link| link.is_primary)
                .map(|link| link.parent),
            "next" => snapshot
                .child_links_of(checkout)?
                .iter()
                .max_by_key(|link| (link.is_primary, link.child_time, link.child))
                .map(|link| link.child),
            _ => return Ok(None),
        };
        Ok(found.map(ResolutionOutcome::Resolved))
    }

    /// `date:<when>`: newest artifact at or before the moment, in local
    /// time. Final once the prefix matches.
    fn try_date_prefixed(
        &self,
        snapshot: &I::Snapshot,
        name: &str,
        filter: KindFilter,
    ) -> Result<Option<ResolutionOutcome>> {
        let Some(rest) = name.strip_prefix("date:") else {
            return Ok(None);
        };
        let literal = expand_compact_datetime(rest).unwrap_or_else(|| rest.to_string());
        let found =
            self.latest_before_bound(snapshot, &literal, TimeZoneMode::Local, filter, true)?;
        Ok(Some(Self::outcome_of(found)))
    }

    /// A bare name shaped like an ISO date. Falls through when nothing is
    /// old enough, so a tag named like a date can still win.
    fn try_bare_iso_date(
        &self,
        snapshot: &I::Snapshot,
        name: &str,
        filter: KindFilter,
    ) -> Result<Option<ResolutionOutcome>> {
        if !starts_with_iso_date(name) {
            return Ok(None);
        }
        Ok(self
            .latest_before_bound(snapshot, name, TimeZoneMode::Local, filter, true)?
            .map(ResolutionOutcome::Resolved))
    }

    /// `local:<when>` and `utc:<when>`: date bounds with an explicit
    /// zone. The `local:` remainder is taken verbatim; `utc:` still gets
    /// end-of-period rounding. Final once the prefix matches.
    fn try_zoned_date(
        &self,
        snapshot: &I::Snapshot,
        name: &str,
        filter: KindFilter,
    ) -> Result<Option<ResolutionOutcome>> {
        let (rest, mode, roundup) = if let Some(rest) = name.strip_prefix("local:") {
            (rest, TimeZoneMode::Local, false)
        } else if let Some(rest) = name.strip_prefix("utc:") {
            (rest, TimeZoneMode::Utc, true)
        } else {
            return Ok(None);
        };
        let found = self.latest_before_bound(snapshot, rest, mode, filter, roundup)?;
        Ok(Some(Self::outcome_of(found)))
    }

    /// `tag:<label>`: explicit symbolic lookup, always in the symbolic
    /// namespace. Final once the prefix matches.
    fn try_tag_prefixed(
        &self,
        snapshot: &I::Snapshot,
        name: &str,
        filter: KindFilter,
        branch_start: bool,
    ) -> Result<Option<ResolutionOutcome>> {
        let Some(rest) = name.strip_prefix("tag:") else {
            return Ok(None);
        };
        let mut found = snapshot.tag_target(TagNamespace::Symbolic, rest, filter, None)?;
        if branch_start {
            if let Some(target) = found {
                found = start_of_branch(snapshot, target, BranchPoint::FirstOnBranch)?;
            }
        }
        Ok(Some(Self::outcome_of(found)))
    }

    /// `root:<name>` and `merge-in:<name>`: resolve the remainder, then
    /// walk to the branch boundary. Ambiguity in the inner name
    /// propagates. Final once the prefix matches.
    fn try_branch_walk(
        &self,
        snapshot: &I::Snapshot,
        name: &str,
        filter: KindFilter,
    ) -> Result<Option<ResolutionOutcome>> {
        let (rest, point) = if let Some(rest) = name.strip_prefix("root:") {
            (rest, BranchPoint::DivergencePoint)
        } else if let Some(rest) = name.strip_prefix("merge-in:") {
            (rest, BranchPoint::YoungestOnParentBranch)
        } else {
            return Ok(None);
        };
        match self.resolve_with(snapshot, rest, filter)? {
            ResolutionOutcome::Resolved(rid) => {
                let found = start_of_branch(snapshot, rid, point)?;
                Ok(Some(Self::outcome_of(found)))
            }
            other => Ok(Some(other)),
        }
    }

    /// `<label>:<when>`: a tag as of a moment. The name splits at its
    /// first colon, provided the colon leaves room for a date. A trailing
    /// `utc` on the date part switches the interpretation to UTC. Final
    /// once the split parses as a date.
    fn try_label_with_date(
        &self,
        snapshot: &I::Snapshot,
        name: &str,
        filter: KindFilter,
    ) -> Result<Option<ResolutionOutcome>> {
        let bytes = name.as_bytes();
        let stop = bytes.len().saturating_sub(8);
        let mut split = 0;
        while split < stop && bytes[split] != b':' {
            split += 1;
        }
        if bytes[split] != b':' {
            return Ok(None);
        }
        let suffix = &name[split + 1..];
        let suffix_bytes = suffix.as_bytes();
        let (folded, mode) = if suffix_bytes.len() >= 3
            && suffix_bytes[suffix_bytes.len() - 3..].eq_ignore_ascii_case(b"utc")
        {
            (&suffix[..suffix.len() - 3], TimeZoneMode::Utc)
        } else {
            (suffix, TimeZoneMode::Local)
        };
        let expanded = match expand_compact_datetime(folded) {
            Some(expanded) => expanded,
            None if starts_with_iso_date(folded) => folded.to_string(),
            None => return Ok(None),
        };
        let bound_text = roundup_date_bound(&expanded);
        let Some(bound) = parse_instant_bound(&bound_text, mode, self.local_offset) else {
            return Ok(Some(ResolutionOutcome::NotFound));
        };
        let label = &name[..split];
        let found = snapshot.tag_target(TagNamespace::Symbolic, label, filter, Some(bound))?;
        Ok(Some(Self::outcome_of(found)))
    }

    /// A hash prefix, optionally bracketed. A unique match resolves and
    /// several matches are reported as ambiguous; no match falls through
    /// so hex-looking tags still get their chance.
    fn try_hash_prefix(
        &self,
        snapshot: &I::Snapshot,
        name: &str,
        filter: KindFilter,
    ) -> Result<Option<ResolutionOutcome>> {
        let Ok(prefix) = strip_brackets(name).parse::<HashPrefix>() else {
            return Ok(None);
        };
        let candidates = snapshot.artifacts_with_prefix(&prefix, filter)?;
        match candidates.len() {
            0 => Ok(None),
            1 => Ok(Some(ResolutionOutcome::Resolved(candidates[0]))),
            count => {
                warn!(prefix = prefix.as_str(), count, "hash prefix is ambiguous");
                Ok(Some(ResolutionOutcome::Ambiguous(AmbiguousMatch {
                    prefix,
                    candidates,
                })))
            }
        }
    }

    /// A bare symbolic name. Wiki filters read the wiki namespace,
    /// everything else the symbolic one. Falls through when no tag
    /// matches.
    fn try_symbolic_tag(
        &self,
        snapshot: &I::Snapshot,
        name: &str,
        filter: KindFilter,
        branch_start: bool,
    ) -> Result<Option<ResolutionOutcome>> {
        let namespace = if filter == KindFilter::WikiEdit {
            TagNamespace::Wiki
        } else {
            TagNamespace::Symbolic
        };
        let Some(target) = snapshot.tag_target(namespace, name, filter, None)? else {
            return Ok(None);
        };
        let found = if branch_start {
            start_of_branch(snapshot, target, BranchPoint::FirstOnBranch)?
        } else {
            Some(target)
        };
        Ok(Some(Self::outcome_of(found)))
    }

    /// A bare compact date. Runs after tags, so an all-digit tag name
    /// shadows the date reading. Falls through when nothing is old
    /// enough.
    fn try_compact_date(
        &self,
        snapshot: &I::Snapshot,
        name: &str,
        filter: KindFilter,
    ) -> Result<Option<ResolutionOutcome>> {
        let Some(expanded) = expand_compact_datetime(name) else {
            return Ok(None);
        };
        Ok(self
            .latest_before_bound(snapshot, &expanded, TimeZoneMode::Local, filter, true)?
            .map(ResolutionOutcome::Resolved))
    }

    /// `rid:<number>`: the numeric identity itself. Under an unrestricted
    /// filter the number is returned without checking that it exists;
    /// typed filters verify the kind. Final once the prefix matches.
    fn try_raw_rid(
        &self,
        snapshot: &I::Snapshot,
        name: &str,
        filter: KindFilter,
    ) -> Result<Option<ResolutionOutcome>> {
        let Some(rest) = name.strip_prefix("rid:") else {
            return Ok(None);
        };
        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Some(ResolutionOutcome::NotFound));
        }
        let Ok(value) = rest.parse::<u64>() else {
            return Ok(Some(ResolutionOutcome::NotFound));
        };
        if value == 0 {
            return Ok(Some(ResolutionOutcome::NotFound));
        }
        let rid = Rid::new(value);
        if filter == KindFilter::Any {
            return Ok(Some(ResolutionOutcome::Resolved(rid)));
        }
        let found = match snapshot.kind_of(rid)? {
            Some(kind) if filter.matches(kind) => Some(rid),
            _ => None,
        };
        Ok(Some(Self::outcome_of(found)))
    }

    /// Newest artifact at or before a date-time literal, or `None` when
    /// the literal does not parse or nothing is old enough.
    fn latest_before_bound(
        &self,
        snapshot: &I::Snapshot,
        literal: &str,
        mode: TimeZoneMode,
        filter: KindFilter,
        roundup: bool,
    ) -> Result<Option<Rid>> {
        let text = if roundup {
            roundup_date_bound(literal)
        } else {
            literal.to_string()
        };
        let Some(bound) = parse_instant_bound(&text, mode, self.local_offset) else {
            return Ok(None);
        };
        Ok(snapshot.latest_at_or_before(bound, filter)?)
    }

    fn outcome_of(found: Option<Rid>) -> ResolutionOutcome {
        match found {
            Some(rid) => ResolutionOutcome::Resolved(rid),
            None => ResolutionOutcome::NotFound,
        }
    }
}
