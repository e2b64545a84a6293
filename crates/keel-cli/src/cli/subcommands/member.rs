use clap::Subcommand;

/// Team member commands.
#[derive(Clone, Debug, Subcommand)]
pub enum MemberCommands {
    /// Add a team member.
    Create {
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long, default_value_t = 0.0)]
        monthly_cost: f64,
    },
    /// List team members.
    List {
        /// Include deactivated members.
        #[arg(long)]
        all: bool,
    },
    /// Get a team member by ID.
    Get { id: String },
    /// Update a team member.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        monthly_cost: Option<f64>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a team member.
    Delete { id: String },
}
