use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Project { action } => commands::project::handle(&action, ctx, flags).await,
        Commands::Finance { action } => commands::finance::handle(&action, ctx, flags).await,
        Commands::Lead { action } => commands::lead::handle(&action, ctx, flags).await,
        Commands::Member { action } => commands::member::handle(&action, ctx, flags).await,
        Commands::Allocation { action } => commands::allocation::handle(&action, ctx, flags).await,
        Commands::Csat { action } => commands::csat::handle(&action, ctx, flags).await,
        Commands::Esat { action } => commands::esat::handle(&action, ctx, flags).await,
        Commands::Task { action } => commands::task::handle(&action, ctx, flags).await,
        Commands::Doc { action } => commands::doc::handle(&action, ctx, flags).await,
        Commands::Attachment { action } => commands::attachment::handle(&action, ctx, flags).await,
        Commands::Audit(args) => commands::audit::handle(&args, ctx, flags).await,
        Commands::Dashboard(args) => commands::dashboard::handle(&args, ctx, flags).await,
        Commands::Init(_) | Commands::Schema(_) => {
            anyhow::bail!("init and schema run before the project context is opened")
        }
    }
}
