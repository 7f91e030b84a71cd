//! Local state persistence.
//!
//! # Responsibility
//! - Mirror every UI field into durable key/value storage.
//! - Isolate SQL details from the page services.
//!
//! # Invariants
//! - Keys are drawn from [`state_repo::StateKey`]; free-form keys are not
//!   accepted.
//! - Undecodable stored JSON surfaces as `RepoError::InvalidData`, never as a
//!   silently defaulted value.

pub mod state_repo;
