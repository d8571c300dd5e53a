use std::ops::RangeInclusive;

use crate::ingest::{Dataset, Metric};

use super::summary::quantile_sorted;

/// A 48-month bucket used to group box plots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tranche {
    pub months: RangeInclusive<u32>,
    pub label: &'static str,
}

pub const TRANCHE_MONTHS: u32 = 48;

pub fn tranches() -> [Tranche; 4] {
    [
        Tranche {
            months: 1..=48,
            label: "Années 1–4",
        },
        Tranche {
            months: 49..=96,
            label: "Années 5–8",
        },
        Tranche {
            months: 97..=144,
            label: "Années 9–12",
        },
        Tranche {
            months: 145..=192,
            label: "Années 13–16",
        },
    ]
}

/// All present values of `metric`, every run pooled, split by tranche.
pub fn values_by_tranche(dataset: &Dataset, metric: Metric) -> [Vec<f64>; 4] {
    tranches().map(|t| {
        dataset
            .records
            .iter()
            .filter(|r| t.months.contains(&r.mois))
            .filter_map(|r| r.get(metric))
            .collect()
    })
}

/// Box-and-whisker summary: quartiles, whiskers reaching the furthest data
/// point within 1.5 IQR of the box, everything beyond as outliers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    pub fn from_values(values: &[f64]) -> Option<BoxStats> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile_sorted(&sorted, 0.25);
        let median = quantile_sorted(&sorted, 0.5);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let lo_fence = q1 - 1.5 * iqr;
        let hi_fence = q3 + 1.5 * iqr;

        let inside = sorted.iter().copied().filter(|v| *v >= lo_fence && *v <= hi_fence);
        let whisker_low = inside.clone().next().unwrap_or(q1).min(q1);
        let whisker_high = inside.last().unwrap_or(q3).max(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < lo_fence || *v > hi_fence)
            .collect();

        Some(BoxStats {
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            outliers,
        })
    }

    /// Lowest and highest value drawn (whiskers and outliers).
    pub fn extent(&self) -> (f64, f64) {
        let lo = self.outliers.iter().copied().fold(self.whisker_low, f64::min);
        let hi = self.outliers.iter().copied().fold(self.whisker_high, f64::max);
        (lo, hi)
    }
}
