mod allocation;
mod attachment;
mod csat;
mod doc;
mod esat;
mod finance;
mod lead;
mod member;
mod project;
mod task;

pub use allocation::AllocationCommands;
pub use attachment::{AttachmentCommands, OwnerArgs};
pub use csat::CsatCommands;
pub use doc::DocCommands;
pub use esat::{EsatCommands, QuestionCommands};
pub use finance::FinanceCommands;
pub use lead::LeadCommands;
pub use member::MemberCommands;
pub use project::ProjectCommands;
pub use task::TaskCommands;
