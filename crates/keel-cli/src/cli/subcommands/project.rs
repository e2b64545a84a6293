use clap::Subcommand;

/// Project commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ProjectCommands {
    /// Create a project.
    Create {
        name: String,
        #[arg(long)]
        client: Option<String>,
        /// Initial status (default: planned).
        #[arg(long)]
        status: Option<String>,
        /// `YYYY-MM-DD`
        #[arg(long)]
        start: Option<String>,
        /// `YYYY-MM-DD`
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long)]
        description: Option<String>,
    },
    /// List projects.
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Get a project by ID.
    Get { id: String },
    /// Update project fields. Use `status` to change status.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        client: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long)]
        progress: Option<u8>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Move a project to another status.
    Status {
        id: String,
        /// planned, active, on-hold, completed, cancelled
        status: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Delete a project.
    Delete { id: String },
}
