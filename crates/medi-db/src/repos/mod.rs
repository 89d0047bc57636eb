//! Repository modules implementing persistence for all MediSyn entities.
//!
//! Each module adds methods to `MediService` via `impl MediService` blocks.

pub mod approval;
pub mod audit;
pub mod memory;
pub mod query;
pub mod response;
pub mod session;
