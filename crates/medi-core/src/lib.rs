//! # medi-core
//!
//! Core types, ID prefixes, and error types for MediSyn.
//!
//! This crate provides the foundational types shared across all MediSyn crates:
//! - Entity structs for sessions, queries, responses, approvals, memory entries
//!   and the audit trail
//! - Status enums with state machine transitions, including the per-query
//!   workflow
//! - ID prefix constants
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
