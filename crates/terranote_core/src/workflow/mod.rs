//! Placement workflow turning raw scene picks into committed comments.
//!
//! # Responsibility
//! - Own the `Inactive` → `AwaitingPosition` → `PositionChosen` machine.
//! - Resolve pick results through the renderer capability seam.
//!
//! # Invariants
//! - A bad pick never leaves the armed state; resolution failures are
//!   reported as outcomes, not errors.
//! - Comments are only ever created through this workflow's commit step.

pub mod placement;
