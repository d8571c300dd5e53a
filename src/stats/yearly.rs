use std::collections::BTreeMap;

use crate::ingest::{Dataset, Metric, MonthRecord};

use super::summary::{mean, present, std_pop};

/// Year index (1-based) of a month index (1-based).
pub fn year_of(mois: u32) -> u32 {
    (mois.saturating_sub(1)) / 12 + 1
}

/// Yearly aggregate of one run, or the mean/std of those across runs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct YearTotals {
    pub naissances: Option<f64>,
    pub morts: Option<f64>,
    /// Average living population over the year.
    pub vivants: Option<f64>,
    pub morts_juv: Option<f64>,
    pub morts_enf: Option<f64>,
    pub morts_adult: Option<f64>,
}

impl YearTotals {
    fn from_months(rows: &[&MonthRecord]) -> Self {
        // a sum over only-null cells is 0, a mean over them is null
        let sum = |m: Metric| Some(present(rows.iter().map(|r| r.get(m))).iter().sum::<f64>());
        YearTotals {
            naissances: sum(Metric::NaissMois),
            morts: sum(Metric::MortsMois),
            vivants: mean(&present(rows.iter().map(|r| r.get(Metric::Vivants)))),
            morts_juv: sum(Metric::MortsJuvMois),
            morts_enf: sum(Metric::MortsEnfMois),
            morts_adult: sum(Metric::MortsAdultMois),
        }
    }

    fn fields(&self) -> [Option<f64>; 6] {
        [
            self.naissances,
            self.morts,
            self.vivants,
            self.morts_juv,
            self.morts_enf,
            self.morts_adult,
        ]
    }

    fn from_fields(f: [Option<f64>; 6]) -> Self {
        YearTotals {
            naissances: f[0],
            morts: f[1],
            vivants: f[2],
            morts_juv: f[3],
            morts_enf: f[4],
            morts_adult: f[5],
        }
    }

    /// Births minus deaths, if both are known.
    pub fn solde(&self) -> Option<f64> {
        Some(self.naissances? - self.morts?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileYear {
    pub source_file: String,
    pub annee: u32,
    pub totals: YearTotals,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearSummary {
    pub annee: u32,
    pub mean: YearTotals,
    pub std: YearTotals,
}

#[derive(Debug, Clone, Default)]
pub struct YearlyStats {
    /// One row per (file, year), sorted by file then year.
    pub per_file: Vec<FileYear>,
    /// Mean and std across files, ascending by year.
    pub years: Vec<YearSummary>,
}

impl YearlyStats {
    pub fn first_years(&self, n: u32) -> Vec<YearSummary> {
        self.years.iter().filter(|y| y.annee <= n).cloned().collect()
    }
}

/// Aggregate each run by year, then summarize those totals across runs.
pub fn compute_yearly(dataset: &Dataset) -> YearlyStats {
    let mut groups: BTreeMap<(&str, u32), Vec<&MonthRecord>> = BTreeMap::new();
    for r in &dataset.records {
        groups
            .entry((r.source_file.as_str(), year_of(r.mois)))
            .or_default()
            .push(r);
    }

    let per_file: Vec<FileYear> = groups
        .into_iter()
        .map(|((file, annee), rows)| FileYear {
            source_file: file.to_string(),
            annee,
            totals: YearTotals::from_months(&rows),
        })
        .collect();

    let mut by_year: BTreeMap<u32, Vec<[Option<f64>; 6]>> = BTreeMap::new();
    for fy in &per_file {
        by_year.entry(fy.annee).or_default().push(fy.totals.fields());
    }

    let years = by_year
        .into_iter()
        .map(|(annee, rows)| {
            let column = |i: usize| present(rows.iter().map(|f| f[i]));
            let means: [Option<f64>; 6] = std::array::from_fn(|i| mean(&column(i)));
            let stds: [Option<f64>; 6] = std::array::from_fn(|i| std_pop(&column(i)));
            YearSummary {
                annee,
                mean: YearTotals::from_fields(means),
                std: YearTotals::from_fields(stds),
            }
        })
        .collect();

    YearlyStats { per_file, years }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::monthly::tests::rec;

    #[test]
    fn month_to_year() {
        assert_eq!(year_of(1), 1);
        assert_eq!(year_of(12), 1);
        assert_eq!(year_of(13), 2);
        assert_eq!(year_of(192), 16);
    }

    #[test]
    fn sums_per_file_then_averages_across_files() {
        let mut records = Vec::new();
        for m in 1..=24 {
            records.push(rec(
                "a",
                m,
                &[
                    (Metric::NaissMois, 2.0),
                    (Metric::MortsMois, 1.0),
                    (Metric::Vivants, m as f64),
                ],
            ));
        }
        for m in 1..=12 {
            records.push(rec("b", m, &[(Metric::NaissMois, 4.0)]));
        }
        let ds = Dataset {
            records,
            ..Dataset::default()
        };
        let y = compute_yearly(&ds);

        assert_eq!(y.per_file.len(), 3);
        let a1 = &y.per_file[0];
        assert_eq!((a1.source_file.as_str(), a1.annee), ("a", 1));
        assert_eq!(a1.totals.naissances, Some(24.0));
        assert_eq!(a1.totals.morts, Some(12.0));
        assert_eq!(a1.totals.vivants, Some(6.5));

        // file b never reports deaths or living: sum is 0, mean is null
        let b1 = &y.per_file[2];
        assert_eq!(b1.totals.morts, Some(0.0));
        assert_eq!(b1.totals.vivants, None);

        assert_eq!(y.years.len(), 2);
        let year1 = &y.years[0];
        assert_eq!(year1.mean.naissances, Some(36.0));
        assert_eq!(year1.std.naissances, Some(12.0));
        assert_eq!(year1.mean.morts, Some(6.0));
        assert_eq!(year1.mean.vivants, Some(6.5));
        assert_eq!(year1.mean.solde(), Some(30.0));

        let year2 = &y.years[1];
        assert_eq!(year2.mean.naissances, Some(24.0));
        assert_eq!(year2.std.naissances, Some(0.0));

        assert_eq!(y.first_years(1).len(), 1);
    }
}
