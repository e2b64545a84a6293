//! Repository methods on [`KeelService`](crate::service::KeelService).
//!
//! Each module adds an `impl KeelService` block for one table. Reads filter by
//! the tenant's `org_id`; writes validate first, then run SQL, then append an
//! audit entry.

pub mod allocation;
pub mod attachment;
pub mod audit;
pub mod csat;
pub mod daily_task;
pub mod dashboard;
pub mod document;
pub mod esat;
pub mod financial;
pub mod lead;
pub mod member;
pub mod project;

pub use allocation::AllocationFilter;
pub use attachment::AttachmentOwner;
pub use audit::AuditFilter;
pub use csat::CsatFilter;
pub use daily_task::DailyTaskFilter;
pub use financial::FinancialFilter;
