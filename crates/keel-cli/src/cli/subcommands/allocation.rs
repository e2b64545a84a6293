use clap::Subcommand;

/// Allocation commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AllocationCommands {
    /// Create or update the allocation for (member, month, cost type).
    Set {
        #[arg(long)]
        member: String,
        /// `YYYY-MM`
        #[arg(long)]
        month: String,
        /// cogs, opex
        #[arg(long)]
        cost_type: String,
        #[arg(long)]
        percentage: f64,
        #[arg(long)]
        project: Option<String>,
    },
    /// List allocations.
    List {
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        member: Option<String>,
        #[arg(long)]
        project: Option<String>,
    },
    /// Per-member utilization for a month.
    Utilization {
        /// `YYYY-MM`; defaults to the current month.
        #[arg(long)]
        month: Option<String>,
    },
    /// Delete an allocation.
    Remove { id: String },
}
