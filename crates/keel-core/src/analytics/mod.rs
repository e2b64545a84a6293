//! Dashboard analytics over rows already loaded into memory.
//!
//! Datasets are small (tens to low hundreds of rows per tenant and period), so
//! every function here is a plain pass over slices with no I/O. `keel-db`
//! loads the rows; these functions do the arithmetic.

mod csat;
mod esat;
mod financial;
mod pipeline;
mod utilization;

pub use csat::{CsatSummary, ProjectScore, csat_summary};
pub use esat::{CategoryAverage, EsatReport, esat_report};
pub use financial::{FinancialSummary, financial_summary};
pub use pipeline::{PipelineSummary, StageSummary, pipeline_summary};
pub use utilization::{MemberUtilization, utilization};

/// Round to two decimal places for stable report output.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole × 100`, or `None` when `whole` is zero.
#[must_use]
pub fn percent(part: f64, whole: f64) -> Option<f64> {
    if whole == 0.0 {
        None
    } else {
        Some(round2(part / whole * 100.0))
    }
}
