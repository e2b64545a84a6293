use crate::cli::GlobalFlags;
use crate::cli::root_commands::DashboardArgs;
use crate::commands::shared::parse::month_or_current;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

/// Handle `keel dashboard`.
pub async fn handle(
    args: &DashboardArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let month = month_or_current(args.month.as_deref())?;
    let progress = Progress::spinner(&format!("building dashboard for {month}"));
    let dashboard = match ctx.service.dashboard(month).await {
        Ok(dashboard) => dashboard,
        Err(error) => {
            progress.finish_err("dashboard failed");
            return Err(error.into());
        }
    };
    progress.finish_clear();

    let over = dashboard
        .utilization
        .iter()
        .filter(|row| row.over_allocated)
        .count();
    if over > 0 {
        tracing::warn!(%month, members = over, "team members allocated above 100%");
    }
    output(&dashboard, flags.format)
}
