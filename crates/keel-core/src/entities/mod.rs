//! Entity structs and input payloads for all Keel records.
//!
//! Each entity maps to a table in the libSQL database (see
//! `keel-db/migrations/001_initial.sql`). Entities derive `Serialize`,
//! `Deserialize`, and `JsonSchema`; `New*` inputs implement `Validate`.

mod allocation;
mod attachment;
mod audit;
mod csat;
mod daily_task;
mod document;
mod esat;
mod financial;
mod lead;
mod member;
mod project;

pub use allocation::{Allocation, AllocationKey, NewAllocation, UpsertOutcome};
pub use attachment::{Attachment, MAX_ATTACHMENT_BYTES, NewAttachment};
pub use audit::AuditEntry;
pub use csat::{CsatEntry, NewCsatEntry};
pub use daily_task::{DailyTask, NewDailyTask};
pub use document::{Document, DocumentVersion, NewDocument};
pub use esat::{
    AnswerInput, EsatAnswer, EsatQuestion, EsatResponse, EsatSubmission, EsatSurvey,
    NewEsatQuestion, NewEsatSurvey,
};
pub use financial::{FinancialRecord, NewFinancialRecord};
pub use lead::{Lead, NewLead};
pub use member::{NewTeamMember, TeamMember};
pub use project::{NewProject, Project};
