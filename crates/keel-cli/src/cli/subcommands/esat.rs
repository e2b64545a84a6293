use clap::Subcommand;

/// ESAT survey commands.
#[derive(Clone, Debug, Subcommand)]
pub enum EsatCommands {
    /// Create a draft survey.
    Create {
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List surveys.
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Survey with its questions and response count.
    Get { id: String },
    /// Start accepting responses.
    Open { id: String },
    /// Stop accepting responses.
    Close { id: String },
    /// Delete a survey with its questions and responses.
    Delete { id: String },
    /// Survey questions.
    Question {
        #[command(subcommand)]
        action: QuestionCommands,
    },
    /// Submit answers through a survey's public token.
    Submit {
        token: String,
        /// `QUESTION_ID=VALUE` with VALUE 1-5; repeat per question.
        #[arg(long)]
        answer: Vec<String>,
        #[arg(long)]
        respondent: Option<String>,
    },
    /// Responses received so far.
    Responses { id: String },
    /// Averages per category, overall, and completion rate.
    Report { id: String },
    /// Shareable public link.
    Link { id: String },
}

/// Survey question commands.
#[derive(Clone, Debug, Subcommand)]
pub enum QuestionCommands {
    /// Add a Likert question.
    Add {
        survey: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        prompt: String,
        /// Allow responses to skip this question.
        #[arg(long)]
        optional: bool,
        #[arg(long)]
        position: Option<u32>,
    },
    /// List questions in order.
    List { survey: String },
    /// Remove a question.
    Remove { id: String },
}
