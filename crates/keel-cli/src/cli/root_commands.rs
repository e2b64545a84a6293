use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    AllocationCommands, AttachmentCommands, CsatCommands, DocCommands, EsatCommands,
    FinanceCommands, LeadCommands, MemberCommands, ProjectCommands, TaskCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create .keel/ with a starter config and database.
    Init(InitArgs),
    /// Projects.
    Project {
        #[command(subcommand)]
        action: ProjectCommands,
    },
    /// Revenue, OPEX, and COGS records.
    Finance {
        #[command(subcommand)]
        action: FinanceCommands,
    },
    /// Sales-lead pipeline.
    Lead {
        #[command(subcommand)]
        action: LeadCommands,
    },
    /// Team members.
    Member {
        #[command(subcommand)]
        action: MemberCommands,
    },
    /// Monthly team allocation to projects.
    Allocation {
        #[command(subcommand)]
        action: AllocationCommands,
    },
    /// Customer satisfaction scores.
    Csat {
        #[command(subcommand)]
        action: CsatCommands,
    },
    /// Employee satisfaction surveys.
    Esat {
        #[command(subcommand)]
        action: EsatCommands,
    },
    /// Daily tasks.
    Task {
        #[command(subcommand)]
        action: TaskCommands,
    },
    /// Knowledge-base documents.
    Doc {
        #[command(subcommand)]
        action: DocCommands,
    },
    /// Files attached to documents and projects.
    Attachment {
        #[command(subcommand)]
        action: AttachmentCommands,
    },
    /// View the audit trail.
    Audit(AuditArgs),
    /// Monthly roll-up of every dashboard widget.
    Dashboard(DashboardArgs),
    /// Dump the JSON schema for a registered type.
    Schema(SchemaArgs),
}

/// Arguments for `keel init`.
#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Organization to scope every query to.
    #[arg(long)]
    pub org: Option<String>,
    /// User recorded as the actor on audit entries.
    #[arg(long)]
    pub user: Option<String>,
    /// Overwrite an existing config.toml.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `keel audit`.
#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    /// Entity type, e.g. `lead` or `esat_survey`.
    #[arg(long)]
    pub entity_type: Option<String>,
    #[arg(long)]
    pub entity_id: Option<String>,
    /// Action, e.g. `created` or `status_changed`.
    #[arg(long)]
    pub action: Option<String>,
    #[arg(long)]
    pub actor: Option<String>,
}

/// Arguments for `keel dashboard`.
#[derive(Clone, Debug, Args)]
pub struct DashboardArgs {
    /// `YYYY-MM`; defaults to the current month.
    #[arg(long)]
    pub month: Option<String>,
}

/// Arguments for `keel schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Registered schema name; omit to list names.
    pub type_name: Option<String>,
}
