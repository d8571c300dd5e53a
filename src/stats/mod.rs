pub mod monthly;
pub mod summary;
pub mod tranche;
pub mod yearly;

pub use monthly::{stats_by_month, MonthSummary, MonthlyStats};
pub use tranche::{tranches, values_by_tranche, BoxStats, Tranche};
pub use yearly::{compute_yearly, year_of, YearSummary, YearTotals, YearlyStats};
