pub mod approval;
pub mod cleanup;
pub mod config;
pub mod dispatch;
pub mod query;
pub mod report;
pub mod session;
pub mod shared;
