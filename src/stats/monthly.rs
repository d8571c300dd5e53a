use std::collections::BTreeMap;

use crate::ingest::{Dataset, Metric, MetricMap, MonthRecord};

use super::summary::{mean, median, present, std_pop};

/// Cross-run statistics for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    pub mois: u32,
    /// Number of records (one per run that reached this month).
    pub n_files: usize,
    pub mean: MetricMap<Option<f64>>,
    pub median: MetricMap<Option<f64>>,
    pub std: MetricMap<Option<f64>>,
}

/// Per-month statistics, ascending by month.
#[derive(Debug, Clone, Default)]
pub struct MonthlyStats {
    pub months: Vec<MonthSummary>,
}

impl MonthlyStats {
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn month_axis(&self) -> Vec<u32> {
        self.months.iter().map(|m| m.mois).collect()
    }

    /// Mean of `metric` per month; nulls stay nulls.
    pub fn mean_of(&self, metric: Metric) -> Vec<Option<f64>> {
        self.months.iter().map(|m| m.mean[metric]).collect()
    }

    pub fn median_of(&self, metric: Metric) -> Vec<Option<f64>> {
        self.months.iter().map(|m| m.median[metric]).collect()
    }

    pub fn std_of(&self, metric: Metric) -> Vec<Option<f64>> {
        self.months.iter().map(|m| m.std[metric]).collect()
    }
}

/// Group all records by month and summarize each metric across runs.
pub fn stats_by_month(dataset: &Dataset) -> MonthlyStats {
    let mut groups: BTreeMap<u32, Vec<&MonthRecord>> = BTreeMap::new();
    for r in &dataset.records {
        groups.entry(r.mois).or_default().push(r);
    }

    let months = groups
        .into_iter()
        .map(|(mois, rows)| {
            let columns: MetricMap<Vec<f64>> =
                MetricMap::from_fn(|m| present(rows.iter().map(|r| r.get(m))));
            MonthSummary {
                mois,
                n_files: rows.len(),
                mean: MetricMap::from_fn(|m| mean(&columns[m])),
                median: MetricMap::from_fn(|m| median(&columns[m])),
                std: MetricMap::from_fn(|m| std_pop(&columns[m])),
            }
        })
        .collect();

    MonthlyStats { months }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a record with only the given metrics set.
    pub(crate) fn rec(file: &str, mois: u32, values: &[(Metric, f64)]) -> MonthRecord {
        let mut map = MetricMap::default();
        for &(m, v) in values {
            map[m] = Some(v);
        }
        MonthRecord {
            source_file: file.to_string(),
            mois,
            values: map,
        }
    }

    #[test]
    fn groups_and_summarizes_across_runs() {
        let ds = Dataset {
            records: vec![
                rec("a", 2, &[(Metric::Vivants, 10.0)]),
                rec("a", 1, &[(Metric::Vivants, 4.0), (Metric::MortsMois, 1.0)]),
                rec("b", 1, &[(Metric::Vivants, 8.0)]),
                rec("c", 1, &[(Metric::Vivants, 9.0), (Metric::MortsMois, 3.0)]),
            ],
            ..Dataset::default()
        };
        let stats = stats_by_month(&ds);
        assert_eq!(stats.month_axis(), vec![1, 2]);

        let jan = &stats.months[0];
        assert_eq!(jan.n_files, 3);
        assert_eq!(jan.mean[Metric::Vivants], Some(7.0));
        assert_eq!(jan.median[Metric::Vivants], Some(8.0));
        let sd = jan.std[Metric::Vivants].unwrap();
        assert!((sd - (14.0f64 / 3.0).sqrt()).abs() < 1e-9);

        // nulls are skipped, not zero-filled
        assert_eq!(jan.mean[Metric::MortsMois], Some(2.0));
        assert_eq!(jan.mean[Metric::NaissMois], None);

        let feb = &stats.months[1];
        assert_eq!(feb.n_files, 1);
        assert_eq!(feb.std[Metric::Vivants], Some(0.0));
    }

    #[test]
    fn series_accessors_follow_month_order() {
        let ds = Dataset {
            records: vec![
                rec("a", 3, &[(Metric::NaissMois, 3.0)]),
                rec("a", 1, &[(Metric::NaissMois, 1.0)]),
            ],
            ..Dataset::default()
        };
        let stats = stats_by_month(&ds);
        assert_eq!(stats.mean_of(Metric::NaissMois), vec![Some(1.0), Some(3.0)]);
        assert_eq!(stats.median_of(Metric::Vivants), vec![None, None]);
    }
}
