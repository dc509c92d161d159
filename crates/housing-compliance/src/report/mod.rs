//! Caseload report: the whole pass for one persona over one snapshot.

mod summary;
pub mod views;

pub use summary::CaseloadReport;
pub use views::{CaseEscalation, CaseloadSummary};
