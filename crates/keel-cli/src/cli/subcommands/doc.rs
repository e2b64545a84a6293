use clap::Subcommand;

/// Knowledge-base document commands.
#[derive(Clone, Debug, Subcommand)]
pub enum DocCommands {
    /// Create a document.
    Create {
        title: String,
        /// Derived from the title when omitted.
        #[arg(long)]
        slug: Option<String>,
        /// Markdown body.
        #[arg(long, conflicts_with = "file")]
        body: Option<String>,
        /// Read the markdown body from a file.
        #[arg(long)]
        file: Option<String>,
        #[arg(long)]
        project: Option<String>,
        /// Repeat for several tags.
        #[arg(long)]
        tag: Vec<String>,
    },
    /// Get a document by ID or slug.
    Get { id: String },
    /// List documents, most recently updated first.
    List {
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Edit a document. Title or body changes write a new version.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "file")]
        body: Option<String>,
        #[arg(long)]
        file: Option<String>,
        /// Replaces all tags; repeat for several.
        #[arg(long)]
        tag: Vec<String>,
        #[arg(long)]
        project: Option<String>,
    },
    /// Render the body to HTML with a plain-text excerpt.
    Render { id: String },
    /// Version history, newest first.
    History { id: String },
    /// Show one stored version.
    Version { id: String, version: u32 },
    /// Copy an old version forward as the newest one.
    Restore { id: String, version: u32 },
    /// Full-text search over titles and bodies.
    Search {
        query: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Delete a document with its history.
    Delete { id: String },
}
