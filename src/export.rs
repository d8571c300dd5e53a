use anyhow::{Context, Result};
use chrono::Local;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::ingest::{Dataset, Metric};
use crate::stats::MonthlyStats;

/// Files written by [`export_tables`].
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub raw: PathBuf,
    pub monthly: PathBuf,
}

fn cell(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

/// A table that can be flattened into CSV rows.
trait CsvTable {
    fn header(&self) -> Vec<String>;
    fn rows(&self) -> Vec<Vec<String>>;
}

struct RawRecords<'a>(&'a Dataset);

impl CsvTable for RawRecords<'_> {
    fn header(&self) -> Vec<String> {
        let mut h = vec!["mois".to_string()];
        h.extend(Metric::ALL.iter().map(|m| m.name().to_string()));
        h.push("source_file".to_string());
        h
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .records
            .iter()
            .map(|r| {
                let mut row = vec![r.mois.to_string()];
                row.extend(Metric::ALL.iter().map(|&m| cell(r.get(m))));
                row.push(r.source_file.clone());
                row
            })
            .collect()
    }
}

struct MonthlyTable<'a>(&'a MonthlyStats);

impl CsvTable for MonthlyTable<'_> {
    fn header(&self) -> Vec<String> {
        let mut h = vec!["mois".to_string()];
        h.extend(Metric::SUMMARY.iter().map(|m| format!("moy_{}", m.name())));
        h.push("med_vivants".to_string());
        h.push("std_vivants".to_string());
        h
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .months
            .iter()
            .map(|m| {
                let mut row = vec![m.mois.to_string()];
                row.extend(Metric::SUMMARY.iter().map(|&k| cell(m.mean[k])));
                row.push(cell(m.median[Metric::Vivants]));
                row.push(cell(m.std[Metric::Vivants]));
                row
            })
            .collect()
    }
}

/// Write `table` to `path` through a temporary file renamed into place.
fn write_table(table: &dyn CsvTable, path: &Path) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let mut writer = csv::Writer::from_path(&tmp_path)
        .with_context(|| format!("creating {:?}", tmp_path))?;
    writer.write_record(table.header())?;
    for row in table.rows() {
        writer.write_record(&row)?;
    }
    writer.flush().with_context(|| format!("flushing {:?}", tmp_path))?;
    drop(writer);

    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;
    Ok(())
}

/// Raw concatenation and monthly statistics, stamped with the local time.
pub fn export_tables(dataset: &Dataset, monthly: &MonthlyStats, out_dir: &Path) -> Result<ExportPaths> {
    let stamp = Local::now().format("%d-%m_%Hh%M").to_string();
    export_tables_stamped(dataset, monthly, out_dir, &stamp)
}

pub fn export_tables_stamped(
    dataset: &Dataset,
    monthly: &MonthlyStats,
    out_dir: &Path,
    stamp: &str,
) -> Result<ExportPaths> {
    fs::create_dir_all(out_dir).with_context(|| format!("creating {:?}", out_dir))?;

    let raw = out_dir.join(format!("donnees_brutes_concat_{}.csv", stamp));
    write_table(&RawRecords(dataset), &raw)?;

    let monthly_path = out_dir.join(format!("stats_mensuelles_{}.csv", stamp));
    write_table(&MonthlyTable(monthly), &monthly_path)?;

    info!(raw = %raw.display(), monthly = %monthly_path.display(), "tables exported");
    Ok(ExportPaths {
        raw,
        monthly: monthly_path,
    })
}
