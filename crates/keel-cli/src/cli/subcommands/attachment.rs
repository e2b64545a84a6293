use clap::{Args, Subcommand};

/// The record an attachment belongs to. Exactly one is required.
#[derive(Clone, Debug, Args)]
#[group(required = true, multiple = false)]
pub struct OwnerArgs {
    #[arg(long)]
    pub document: Option<String>,
    #[arg(long)]
    pub project: Option<String>,
}

/// Attachment commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AttachmentCommands {
    /// Upload a file and record it.
    Upload {
        path: String,
        #[command(flatten)]
        owner: OwnerArgs,
        /// Guessed from the file extension when omitted.
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Time-limited download URL.
    Url { id: String },
    /// Attachments of a document or project.
    List {
        #[command(flatten)]
        owner: OwnerArgs,
    },
    /// Save an attachment's bytes to a local file.
    Download {
        id: String,
        #[arg(long)]
        out: String,
    },
    /// Delete the record and the stored file.
    Delete { id: String },
}
