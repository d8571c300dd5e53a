use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::config::Settings;
use crate::export::{export_tables, ExportPaths};
use crate::ingest::{self, load_folder, LoadOptions, Metric};
use crate::plot::{self, ChartInputs};
use crate::stats::{compute_yearly, stats_by_month};

/// What one run produced.
#[derive(Debug)]
pub struct RunReport {
    pub files_loaded: usize,
    pub files_skipped: usize,
    pub records: usize,
    pub charts: Vec<PathBuf>,
    pub exports: ExportPaths,
}

/// Normalized columns, non-null counts and first rows of the first `.csv`
/// in `dir`, logged at debug level.
fn log_sample_file(dir: &Path, opts: &LoadOptions) {
    let sample = match ingest::discover_files(dir, usize::MAX) {
        Ok(paths) => paths
            .into_iter()
            .find(|p| p.extension().is_some_and(|e| e == "csv")),
        Err(_) => None,
    };
    let Some(sample) = sample else { return };

    match ingest::read_one_file(&sample, opts) {
        Ok(parsed) => {
            let columns: Vec<&str> = parsed.headers.iter().map(|h| h.as_str()).collect();
            debug!(file = %sample.display(), ?columns, "sample file columns");
            let mois = parsed.records.len();
            let non_null: Vec<(&str, usize)> = [Metric::NaissMois, Metric::MortsMois, Metric::Vivants]
                .iter()
                .map(|&m| (m.name(), parsed.non_null(m)))
                .collect();
            debug!(mois, ?non_null, "sample file non-null counts");
            for r in parsed.records.iter().take(5) {
                debug!(mois = r.mois, values = ?r.values, "sample row");
            }
        }
        Err(e) => debug!(file = %sample.display(), "sample file not loadable: {}", e),
    }
}

/// Load, aggregate, draw and export according to `settings`.
#[tracing::instrument(level = "info", skip(settings), fields(out = %settings.out.display()))]
pub fn run(settings: &Settings) -> Result<RunReport> {
    run_with(settings, true)
}

fn run_with(settings: &Settings, draw_charts: bool) -> Result<RunReport> {
    let input = settings
        .input
        .as_deref()
        .context("no input folder configured")?;
    let out = settings.out.as_path();
    let opts = settings.load_options();

    // ─── 1) output folder ───
    fs::create_dir_all(out).with_context(|| format!("creating output folder {:?}", out))?;

    // ─── 2) load ───
    let dataset = load_folder(input, &opts)
        .with_context(|| format!("loading simulation logs from {:?}", input))?;
    info!(
        files = dataset.files.len(),
        skipped = dataset.skipped.len(),
        records = dataset.records.len(),
        "logs loaded"
    );
    log_sample_file(input, &opts);

    // ─── 3) aggregate ───
    let monthly = stats_by_month(&dataset);
    let yearly = compute_yearly(&dataset);
    info!(
        months = monthly.months.len(),
        years = yearly.years.len(),
        "statistics computed"
    );

    // ─── 4) charts ───
    let charts = if draw_charts {
        let inputs = ChartInputs {
            dataset: &dataset,
            monthly: &monthly,
            yearly: &yearly,
        };
        plot::render_all(&inputs, out, &settings.style()).context("rendering charts")?
    } else {
        Vec::new()
    };

    // ─── 5) export ───
    let exports = export_tables(&dataset, &monthly, out).context("exporting tables")?;
    info!(
        raw = %exports.raw.display(),
        monthly = %exports.monthly.display(),
        charts = charts.len(),
        "run complete"
    );

    Ok(RunReport {
        files_loaded: dataset.files.len(),
        files_skipped: dataset.skipped.len(),
        records: dataset.records.len(),
        charts,
        exports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn simulation(months: u32, seed: f64) -> String {
        let mut s = String::from(
            "Timestamp: 2025-01-01\nMois,Lapins vivants,Nombre de naissance,\
             Nombre de lapin mort en 1 mois,Nombre de lapin juveniles morts par mois,\
             Nombre de lapin adulte mort par mois\n",
        );
        for m in 1..=months {
            s.push_str(&format!(
                "{},{},{},{},1,1\n",
                m,
                100.0 + seed * m as f64,
                10.0 + seed,
                2.0 + seed
            ));
        }
        s
    }

    #[test]
    fn load_aggregate_export_end_to_end() {
        let input = tempdir().unwrap();
        let out = tempdir().unwrap();
        fs::write(input.path().join("run1.csv"), simulation(200, 1.0)).unwrap();
        fs::write(input.path().join("run2.csv"), simulation(24, 3.0)).unwrap();
        fs::write(input.path().join("broken.csv"), "x").unwrap();

        let settings = Settings {
            input: Some(input.path().to_path_buf()),
            out: out.path().join("images"),
            ..Settings::default()
        };
        let report = run_with(&settings, false).unwrap();

        assert_eq!(report.files_loaded, 2);
        assert_eq!(report.files_skipped, 1);
        assert_eq!(report.records, 192 + 24);
        assert!(report.charts.is_empty());

        let monthly = fs::read_to_string(&report.exports.monthly).unwrap();
        let rows: Vec<&str> = monthly.lines().collect();
        assert_eq!(rows.len(), 1 + 192);
        // month 1: vivants 101 and 103, births 11 and 13
        assert!(rows[1].starts_with("1,102,12,"), "got {}", rows[1]);

        let raw = fs::read_to_string(&report.exports.raw).unwrap();
        assert_eq!(raw.lines().count(), 1 + 192 + 24);
        assert!(raw.lines().nth(1).unwrap().ends_with(",run1.csv"));
    }

    #[test]
    fn empty_input_folder_fails() {
        let input = tempdir().unwrap();
        let out = tempdir().unwrap();
        let settings = Settings {
            input: Some(input.path().to_path_buf()),
            out: out.path().to_path_buf(),
            ..Settings::default()
        };
        assert!(run_with(&settings, false).is_err());
    }
}
