//! Comment repository: durable storage seam, bounded cache and the store.
//!
//! # Responsibility
//! - Own the in-memory document and every mutation path to it.
//! - Keep persistence details behind the `DocumentStorage` trait.
//!
//! # Invariants
//! - Every mutating operation rewrites the full document to durable storage.
//! - Every successful write invalidates the whole scene cache, not just the
//!   written scene. Callers must not assume selective invalidation.

pub mod clock;
pub mod comment_store;
pub mod document_storage;
pub mod idgen;
pub mod scene_cache;
