//! Application-facing services.
//!
//! # Responsibility
//! - Wire store, placement workflow and visual synchronizer into the single
//!   facade the UI layer calls.
//!
//! # Invariants
//! - Service APIs never bypass store validation/persistence contracts.

pub mod annotation_service;
