use clap::Subcommand;

/// Financial record commands.
#[derive(Clone, Debug, Subcommand)]
pub enum FinanceCommands {
    /// Record revenue or cost for a month.
    Add {
        /// `YYYY-MM`
        #[arg(long)]
        month: String,
        /// revenue, opex, cogs
        #[arg(long)]
        category: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// List records, newest month first.
    List {
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Get a record by ID.
    Get { id: String },
    /// Update a record.
    Update {
        id: String,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        project: Option<String>,
        /// Detach the record from its project.
        #[arg(long, conflicts_with = "project")]
        no_project: bool,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a record.
    Delete { id: String },
    /// Revenue, costs, team cost, and profit for a month.
    Summary {
        /// `YYYY-MM`; defaults to the current month.
        #[arg(long)]
        month: Option<String>,
    },
}
