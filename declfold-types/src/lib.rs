//! Shared DTOs (schemas-as-code) for the declfold workspace.
//!
//! # Design constraints
//! - `plan` types are serialized to disk and consumed by downstream build tooling.
//! - `decl` types are the in-memory input of the resolver; they are never persisted.
//! - Prefer adding optional fields over changing semantics.

pub mod decl;
pub mod plan;

/// Schema identifiers.
pub mod schema {
    pub const DECLFOLD_PLAN_V1: &str = "declfold.plan.v1";
}
