//! # medi-engine
//!
//! The MediSyn research assistant: message filter, per-query workflow,
//! two-tier memory, query handler, human approval gate and reports, tied
//! together by the [`Assistant`] facade.
//!
//! ```no_run
//! use medi_config::MediConfig;
//! use medi_core::enums::{Priority, QueryType};
//! use medi_engine::Assistant;
//!
//! # async fn run() -> Result<(), medi_engine::AssistantError> {
//! let mut assistant = Assistant::open(MediConfig::for_testing()).await?;
//! let session = assistant.start_session("dr-lee", "proj-7", "type 2 diabetes").await?;
//! let outcome = assistant
//!     .process_query(
//!         &session.id,
//!         "What is the first-line treatment for type 2 diabetes?",
//!         QueryType::ClinicalQuestion,
//!         Priority::Medium,
//!     )
//!     .await?;
//! println!("{:?}", outcome.steps());
//! # Ok(())
//! # }
//! ```

pub mod approval;
pub mod assistant;
mod error;
pub mod filter;
pub mod handler;
pub mod memory;
pub mod prompt;
pub mod report;
pub mod workflow;

pub use approval::{ApprovalGate, GateDecision, KeywordSensitivityPolicy, SensitivityPolicy};
pub use assistant::{Assistant, CleanupReport, QueryOutcome, ResolveOutcome, SessionStatusView};
pub use error::AssistantError;
pub use filter::{FilterReason, FilterVerdict, MessageFilter};
pub use handler::{HandledResponse, QueryHandler};
pub use memory::MemoryManager;
pub use report::{Report, ReportGenerator, ReportSummary, SessionReport};
pub use workflow::QueryWorkflow;
