use clap::Subcommand;

/// CSAT commands.
#[derive(Clone, Debug, Subcommand)]
pub enum CsatCommands {
    /// Record a client score (0-100) for a project and month.
    Add {
        #[arg(long)]
        project: String,
        /// `YYYY-MM`
        #[arg(long)]
        month: String,
        #[arg(long)]
        score: f64,
        #[arg(long)]
        respondent: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// List entries.
    List {
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Get an entry by ID.
    Get { id: String },
    /// Delete an entry.
    Delete { id: String },
    /// Average scores overall and per project.
    Summary {
        #[arg(long)]
        month: Option<String>,
    },
}
