//! Entity structs for all MediSyn domain objects.
//!
//! Each entity maps to a table in the libSQL database (see
//! `medi-db/migrations/001_initial.sql`). All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema` for JSON roundtrip and schema validation.

mod approval;
mod audit;
mod memory;
mod query;
mod response;
mod session;

pub use approval::ApprovalRecord;
pub use audit::AuditEntry;
pub use memory::MemoryEntry;
pub use query::QueryRecord;
pub use response::ResponseRecord;
pub use session::Session;
