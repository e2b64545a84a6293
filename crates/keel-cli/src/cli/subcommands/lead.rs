use clap::Subcommand;

/// Sales-lead commands.
#[derive(Clone, Debug, Subcommand)]
pub enum LeadCommands {
    /// Create a lead.
    Create {
        company: String,
        #[arg(long)]
        contact_name: Option<String>,
        #[arg(long)]
        contact_email: Option<String>,
        /// Initial stage (default: new).
        #[arg(long)]
        stage: Option<String>,
        #[arg(long, default_value_t = 0.0)]
        value: f64,
        #[arg(long)]
        probability: Option<u8>,
        #[arg(long)]
        owner: Option<String>,
        /// `YYYY-MM-DD`
        #[arg(long)]
        expected_close: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List leads, optionally in one stage.
    List {
        #[arg(long)]
        stage: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Get a lead by ID.
    Get { id: String },
    /// Update lead fields. Use `stage` to move through the pipeline.
    Update {
        id: String,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        contact_name: Option<String>,
        #[arg(long)]
        contact_email: Option<String>,
        #[arg(long)]
        value: Option<f64>,
        #[arg(long)]
        probability: Option<u8>,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        expected_close: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Move a lead to another pipeline stage.
    Stage {
        id: String,
        /// new, contacted, qualified, proposal, negotiation, won, lost
        stage: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Delete a lead.
    Delete { id: String },
    /// Full-text search over company, contact, and notes.
    Search {
        query: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Import leads from a JSON Lines file, or a CSV file with a header row.
    Import { path: String },
    /// Export every lead to a JSON Lines file.
    Export { path: String },
    /// Pipeline totals per stage.
    Pipeline,
}
