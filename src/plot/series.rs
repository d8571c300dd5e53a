//! Chart data preparation, kept apart from drawing so it can be tested.

use std::ops::Range;

use crate::ingest::Metric;
use crate::stats::{MonthlyStats, YearSummary};

/// Guard against division by zero in share computations.
pub const EPS: f64 = 1e-9;

pub type Point = (f64, f64);

pub fn fill0(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().map(|v| v.unwrap_or(0.0)).collect()
}

fn months_f64(stats: &MonthlyStats) -> Vec<f64> {
    stats.month_axis().into_iter().map(f64::from).collect()
}

/// Split a series with holes into contiguous drawable runs.
pub fn segments(xs: &[f64], ys: &[Option<f64>]) -> Vec<Vec<Point>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (&x, y) in xs.iter().zip(ys) {
        match y {
            Some(y) if y.is_finite() => current.push((x, *y)),
            _ => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Mean monthly series of `metric` as drawable runs.
pub fn mean_segments(stats: &MonthlyStats, metric: Metric) -> Vec<Vec<Point>> {
    segments(&months_f64(stats), &stats.mean_of(metric))
}

pub fn std_segments(stats: &MonthlyStats, metric: Metric) -> Vec<Vec<Point>> {
    segments(&months_f64(stats), &stats.std_of(metric))
}

pub fn median_segments(stats: &MonthlyStats, metric: Metric) -> Vec<Vec<Point>> {
    segments(&months_f64(stats), &stats.median_of(metric))
}

/// Share (%) of juvenile deaths among the month's deaths, floored at 0.
pub fn juvenile_share(stats: &MonthlyStats) -> Vec<Vec<Point>> {
    let juv = stats.mean_of(Metric::MortsJuvMois);
    let all = stats.mean_of(Metric::MortsMois);
    let share: Vec<Option<f64>> = juv
        .iter()
        .zip(&all)
        .map(|(j, a)| Some(((*j)? / ((*a)? + EPS) * 100.0).max(0.0)))
        .collect();
    segments(&months_f64(stats), &share)
}

/// Mean deaths per age category for one month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeStack {
    pub mois: f64,
    pub juv: f64,
    pub enf: f64,
    pub adult: f64,
}

impl AgeStack {
    pub fn total(&self) -> f64 {
        self.juv + self.enf + self.adult
    }

    /// The same stack rescaled to 100 %, `None` when there were no deaths.
    pub fn to_percent(&self) -> Option<AgeStack> {
        let tot = self.total();
        if tot == 0.0 {
            return None;
        }
        Some(AgeStack {
            mois: self.mois,
            juv: self.juv / tot * 100.0,
            enf: self.enf / tot * 100.0,
            adult: self.adult / tot * 100.0,
        })
    }
}

/// Absolute death structure by age, nulls read as 0.
pub fn age_stacks(stats: &MonthlyStats) -> Vec<AgeStack> {
    let juv = fill0(&stats.mean_of(Metric::MortsJuvMois));
    let enf = fill0(&stats.mean_of(Metric::MortsEnfMois));
    let adult = fill0(&stats.mean_of(Metric::MortsAdultMois));
    months_f64(stats)
        .into_iter()
        .enumerate()
        .map(|(i, mois)| AgeStack {
            mois,
            juv: juv[i],
            enf: enf[i],
            adult: adult[i],
        })
        .collect()
}

/// Share (%) of each age category in the month's deaths: juvenile,
/// non-mature, mature.
pub fn age_proportions(stats: &MonthlyStats) -> [Vec<Point>; 3] {
    let stacks = age_stacks(stats);
    let share = |pick: fn(&AgeStack) -> f64| -> Vec<Point> {
        stacks
            .iter()
            .map(|s| (s.mois, pick(s) / (s.total() + EPS) * 100.0))
            .collect()
    };
    [share(|s| s.juv), share(|s| s.enf), share(|s| s.adult)]
}

/// Births, deaths and their difference per month, nulls read as 0.
pub struct DeltaSeries {
    pub naissances: Vec<Point>,
    pub morts: Vec<Point>,
    pub delta: Vec<Point>,
}

pub fn delta_series(stats: &MonthlyStats) -> DeltaSeries {
    let xs = months_f64(stats);
    let naiss = fill0(&stats.mean_of(Metric::NaissMois));
    let morts = fill0(&stats.mean_of(Metric::MortsMois));
    DeltaSeries {
        naissances: xs.iter().copied().zip(naiss.iter().copied()).collect(),
        morts: xs.iter().copied().zip(morts.iter().copied()).collect(),
        delta: xs
            .iter()
            .zip(naiss.iter().zip(&morts))
            .map(|(&x, (n, m))| (x, n - m))
            .collect(),
    }
}

/// (mean, std) of monthly deaths, one point per month.
pub fn deaths_std_vs_mean(stats: &MonthlyStats) -> Vec<Point> {
    let mean = fill0(&stats.mean_of(Metric::MortsMois));
    let std = fill0(&stats.std_of(Metric::MortsMois));
    mean.into_iter().zip(std).collect()
}

/// Mean ± std envelope of the living population: (month, low, high).
pub fn living_band(stats: &MonthlyStats) -> Vec<(f64, f64, f64)> {
    let mu = stats.mean_of(Metric::Vivants);
    let sd = stats.std_of(Metric::Vivants);
    months_f64(stats)
        .into_iter()
        .zip(mu.into_iter().zip(sd))
        .filter_map(|(x, (m, s))| {
            let (m, s) = (m?, s?);
            Some((x, m - s, m + s))
        })
        .collect()
}

/// Cumulative mean deaths against cumulative mean births.
pub fn cumulative_deaths_vs_births(stats: &MonthlyStats) -> Vec<Point> {
    let naiss = fill0(&stats.mean_of(Metric::NaissMois));
    let morts = fill0(&stats.mean_of(Metric::MortsMois));
    let mut acc = (0.0, 0.0);
    naiss
        .into_iter()
        .zip(morts)
        .map(|(n, m)| {
            acc = (acc.0 + n, acc.1 + m);
            acc
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarKind {
    Naissances,
    Morts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: Option<f64>,
    pub kind: BarKind,
}

/// Two bars per year: mean births then mean deaths.
pub fn waterfall_bars(years: &[YearSummary]) -> Vec<Bar> {
    years
        .iter()
        .flat_map(|y| {
            [
                Bar {
                    label: format!("Année {} Naissances", y.annee),
                    value: y.mean.naissances,
                    kind: BarKind::Naissances,
                },
                Bar {
                    label: format!("Année {} Morts", y.annee),
                    value: y.mean.morts,
                    kind: BarKind::Morts,
                },
            ]
        })
        .collect()
}

/// Yearly balance, births minus deaths.
pub fn solde_bars(years: &[YearSummary]) -> Vec<(String, Option<f64>)> {
    years
        .iter()
        .map(|y| (format!("Année {} Solde", y.annee), y.mean.solde()))
        .collect()
}

/// Axis range covering `values`, padded by 5 %; optionally forced to include 0.
pub fn value_range<I: IntoIterator<Item = f64>>(values: I, include_zero: bool) -> Range<f64> {
    let (mut lo, mut hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return 0.0..1.0;
    }
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    if hi - lo < f64::EPSILON {
        return (lo - 1.0)..(hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    let lo = if include_zero && lo == 0.0 { 0.0 } else { lo - pad };
    let hi = if include_zero && hi == 0.0 { 0.0 } else { hi + pad };
    lo..hi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{Dataset, MonthRecord};
    use crate::stats::monthly::tests::rec;
    use crate::stats::{compute_yearly, stats_by_month};

    fn stats_of(records: Vec<MonthRecord>) -> MonthlyStats {
        stats_by_month(&Dataset {
            records,
            ..Dataset::default()
        })
    }

    #[test]
    fn segments_break_on_nulls() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [Some(1.0), None, Some(3.0), Some(4.0), None];
        assert_eq!(
            segments(&xs, &ys),
            vec![vec![(1.0, 1.0)], vec![(3.0, 3.0), (4.0, 4.0)]]
        );
        assert!(segments(&xs, &[None; 5]).is_empty());
    }

    #[test]
    fn juvenile_share_is_percentage_of_deaths() {
        let stats = stats_of(vec![
            rec("a", 1, &[(Metric::MortsJuvMois, 1.0), (Metric::MortsMois, 4.0)]),
            rec("a", 2, &[(Metric::MortsMois, 4.0)]),
            rec("a", 3, &[(Metric::MortsJuvMois, 0.0), (Metric::MortsMois, 0.0)]),
        ]);
        let segs = juvenile_share(&stats);
        assert_eq!(segs.len(), 2);
        assert!((segs[0][0].1 - 25.0).abs() < 1e-6);
        assert_eq!(segs[1][0], (3.0, 0.0));
    }

    #[test]
    fn age_structure_absolute_and_percent() {
        let stats = stats_of(vec![
            rec(
                "a",
                1,
                &[
                    (Metric::MortsJuvMois, 2.0),
                    (Metric::MortsEnfMois, 1.0),
                    (Metric::MortsAdultMois, 1.0),
                ],
            ),
            rec("a", 2, &[]),
        ]);
        let stacks = age_stacks(&stats);
        assert_eq!(stacks[0].total(), 4.0);
        let pct = stacks[0].to_percent().unwrap();
        assert_eq!((pct.juv, pct.enf, pct.adult), (50.0, 25.0, 25.0));
        assert_eq!(stacks[1].total(), 0.0);
        assert_eq!(stacks[1].to_percent(), None);

        let [juv, _, adult] = age_proportions(&stats);
        assert!((juv[0].1 - 50.0).abs() < 1e-6);
        assert!((adult[0].1 - 25.0).abs() < 1e-6);
        assert_eq!(juv[1].1, 0.0);
    }

    #[test]
    fn delta_and_cumulative() {
        let stats = stats_of(vec![
            rec("a", 1, &[(Metric::NaissMois, 5.0), (Metric::MortsMois, 2.0)]),
            rec("a", 2, &[(Metric::NaissMois, 3.0)]),
        ]);
        let d = delta_series(&stats);
        assert_eq!(d.delta, vec![(1.0, 3.0), (2.0, 3.0)]);
        assert_eq!(d.morts[1], (2.0, 0.0));
        assert_eq!(
            cumulative_deaths_vs_births(&stats),
            vec![(5.0, 2.0), (8.0, 2.0)]
        );
    }

    #[test]
    fn band_skips_months_without_std() {
        let stats = stats_of(vec![
            rec("a", 1, &[(Metric::Vivants, 10.0)]),
            rec("b", 1, &[(Metric::Vivants, 20.0)]),
            rec("a", 2, &[]),
        ]);
        assert_eq!(living_band(&stats), vec![(1.0, 10.0, 20.0)]);
    }

    #[test]
    fn yearly_bars() {
        let mut records = Vec::new();
        for m in 1..=24 {
            records.push(rec("a", m, &[(Metric::NaissMois, 2.0), (Metric::MortsMois, 1.0)]));
        }
        let yearly = compute_yearly(&Dataset {
            records,
            ..Dataset::default()
        });
        let bars = waterfall_bars(&yearly.years);
        assert_eq!(bars.len(), 4);
        assert_eq!(bars[0].label, "Année 1 Naissances");
        assert_eq!(bars[0].value, Some(24.0));
        assert_eq!(bars[3].kind, BarKind::Morts);
        assert_eq!(
            solde_bars(&yearly.years),
            vec![
                ("Année 1 Solde".to_string(), Some(12.0)),
                ("Année 2 Solde".to_string(), Some(12.0)),
            ]
        );
    }

    #[test]
    fn ranges_are_padded_and_safe() {
        assert_eq!(value_range(Vec::<f64>::new(), true), 0.0..1.0);
        assert_eq!(value_range([5.0, 5.0], false), 4.0..6.0);
        let r = value_range([10.0, 20.0], true);
        assert_eq!(r.start, 0.0);
        assert!((r.end - 21.0).abs() < 1e-9);
        let r = value_range([-10.0, 10.0], false);
        assert!((r.start + 11.0).abs() < 1e-9 && (r.end - 11.0).abs() < 1e-9);
    }
}
