//! Core types for the Quarry artifact index.
//!
//! This crate defines the vocabulary shared by every component that talks
//! about repository artifacts: numeric identities ([`Rid`]), content hashes
//! and hash prefixes, artifact kinds and kind filters, the date shorthand
//! helpers, and the [`ArtifactIndex`]/[`IndexSnapshot`] traits that
//! resolution runs against. An in-memory index implementation is provided
//! for tests and embedders that materialize repository state themselves.
//!
//! # Architecture
//!
//! - **artifact**: identities, kinds, and kind filters
//! - **hashname**: hash syntax, canonicalization, and validated prefixes
//! - **temporal**: compact date expansion and timestamp bounds
//! - **index**: the snapshot query surface resolution is written against
//! - **memory**: `Arc<RwLock>` index for fixtures and embedding
//! - **error**: shared error type

pub mod artifact;
pub mod error;
pub mod hashname;
pub mod index;
pub mod memory;
pub mod temporal;

pub use artifact::{ArtifactKind, KindFilter, Rid};
pub use error::{Error, Result};
pub use hashname::{ArtifactHash, HashPrefix, HASH_LEN_MAX, HASH_LEN_SHORT, HASH_PREFIX_MIN};
pub use index::{ArtifactIndex, AuditScope, IndexSnapshot, ParentLink, TagNamespace};
pub use memory::{MemoryIndex, MemorySnapshot, DEFAULT_BRANCH};
pub use temporal::TimeZoneMode;

/// Convenience re-exports for consumers that want the common types in one
/// `use`.
pub mod prelude {
    pub use crate::artifact::{ArtifactKind, KindFilter, Rid};
    pub use crate::error::{Error, Result};
    pub use crate::hashname::{ArtifactHash, HashPrefix};
    pub use crate::index::{ArtifactIndex, AuditScope, IndexSnapshot, TagNamespace};
    pub use crate::memory::MemoryIndex;
    pub use crate::temporal::TimeZoneMode;
}
