use clap::Subcommand;

/// Daily task commands.
#[derive(Clone, Debug, Subcommand)]
pub enum TaskCommands {
    /// Log a task for a day.
    Create {
        title: String,
        /// `YYYY-MM-DD`; defaults to today.
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value_t = 0.0)]
        hours: f64,
        #[arg(long)]
        member: Option<String>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List tasks.
    List {
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        member: Option<String>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Get a task by ID.
    Get { id: String },
    /// Update task fields. Use `status` to change status.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        hours: Option<f64>,
        #[arg(long)]
        member: Option<String>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Move a task to another status.
    Status {
        id: String,
        /// todo, in-progress, done
        status: String,
    },
    /// Delete a task.
    Delete { id: String },
}
