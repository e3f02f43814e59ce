//! Domain model for scene-anchored annotations.
//!
//! # Responsibility
//! - Define the canonical comment record and the durable document root.
//! - Own structural validation for positions, text and id uniqueness.
//!
//! # Invariants
//! - Every persisted comment has a stable `id` and a non-empty `text`.
//! - Position components are always three finite numbers; invalid values are
//!   rejected here, before they can reach the store.

pub mod comment;
