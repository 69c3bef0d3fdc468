//! Name-to-identity resolution for Quarry repositories.
//!
//! Users name artifacts many ways: a hash prefix, a tag, a branch, a
//! date, a position relative to their checkout, or one of the prefixed
//! query forms (`tag:`, `date:`, `root:`, `merge-in:`, and friends). The
//! [`Resolver`] tries these interpretations in a fixed order against a
//! snapshot of an artifact index and reports a single identity, an
//! ambiguity, or nothing.
//!
//! The crate also ships the branch ancestry walks those query forms are
//! built on ([`ancestry`]) and the hash prefix collision audit
//! ([`audit`]).

pub mod ancestry;
pub mod audit;
pub mod error;
pub mod outcome;
pub mod resolver;

pub use ancestry::{start_of_branch, BranchPoint};
pub use audit::{
    audit_collisions, audit_collisions_with_min, prefix_collisions, CollisionBucket,
    CollisionReport, COLLISION_EXAMPLE_CAP, DEFAULT_MIN_PREFIX,
};
pub use error::{ResolverError, Result};
pub use outcome::{AmbiguousMatch, ResolutionOutcome};
pub use resolver::Resolver;
