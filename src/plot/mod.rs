//! Chart rendering with [`plotters`]. Every chart is a PNG written into the
//! output directory; data preparation lives in [`series`].

pub mod bars;
pub mod boxplot;
pub mod format;
pub mod lines;
pub mod series;
pub mod style;

use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{info, warn};

use crate::ingest::Dataset;
use crate::stats::{MonthlyStats, YearlyStats};
pub use format::fmt_fr;
pub use style::{Figure, Style};

/// Errors that can occur while producing one chart
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("failed to draw chart: {0}")]
    Drawing(String),

    #[error("failed to prepare output directory: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = core::result::Result<T, PlotError>;

pub(crate) fn drawing<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Drawing(e.to_string())
}

pub(crate) type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// White bitmap canvas of `fig` at the style's resolution.
pub(crate) fn canvas<'a>(path: &'a Path, style: &Style, fig: Figure) -> Result<Canvas<'a>> {
    let root = BitMapBackend::new(path, style.pixels(fig)).into_drawing_area();
    root.fill(&WHITE).map_err(drawing)?;
    Ok(root)
}

pub(crate) fn chart_builder<'a, 'b, DB: DrawingBackend>(
    root: &'a DrawingArea<DB, Shift>,
    style: &Style,
    title: &str,
) -> ChartBuilder<'a, 'b, DB> {
    let mut builder = ChartBuilder::on(root);
    builder
        .caption(title, style.title())
        .margin(style.margin())
        .x_label_area_size(style.px(40.0))
        .y_label_area_size(style.px(60.0));
    builder
}

pub(crate) type Chart<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Axis set-up shared by every Cartesian chart.
pub(crate) struct Axes<'f> {
    pub x_desc: &'f str,
    pub y_desc: &'f str,
    pub x_labels: usize,
    pub y_labels: usize,
    pub x_fmt: &'f dyn Fn(&f64) -> String,
    pub y_fmt: &'f dyn Fn(&f64) -> String,
    pub rotate_x: bool,
}

pub(crate) fn thousands(v: &f64) -> String {
    fmt_fr(*v, 0)
}

pub(crate) fn hundredths(v: &f64) -> String {
    fmt_fr(*v, 2)
}

pub(crate) fn plain(v: &f64) -> String {
    format!("{}", v)
}

impl<'f> Axes<'f> {
    /// Month axis at the bottom, French thousands on Y.
    pub fn months(x_desc: &'f str, y_desc: &'f str) -> Self {
        Axes {
            x_desc,
            y_desc,
            x_labels: 24,
            y_labels: 10,
            x_fmt: &plain,
            y_fmt: &thousands,
            rotate_x: false,
        }
    }
}

/// Light grid, no top/right spines, French tick labels.
pub(crate) fn draw_mesh(chart: &mut Chart<'_, '_>, style: &Style, axes: &Axes<'_>) -> Result<()> {
    let x_style = if axes.rotate_x {
        style.tick().transform(FontTransform::Rotate90)
    } else {
        style.tick()
    };
    chart
        .configure_mesh()
        .light_line_style(TRANSPARENT)
        .bold_line_style(style.grid_color())
        .axis_style(BLACK.mix(0.7))
        .label_style(style.tick())
        .x_label_style(x_style)
        .axis_desc_style(style.label())
        .x_labels(axes.x_labels)
        .y_labels(axes.y_labels)
        .x_label_formatter(axes.x_fmt)
        .y_label_formatter(axes.y_fmt)
        .x_desc(axes.x_desc)
        .y_desc(axes.y_desc)
        .draw()
        .map_err(drawing)
}

pub(crate) fn draw_legend<'a>(
    chart: &mut Chart<'a, 'a>,
    style: &Style,
    position: SeriesLabelPosition,
) -> Result<()> {
    chart
        .configure_series_labels()
        .position(position)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.2))
        .label_font(style.legend())
        .draw()
        .map_err(drawing)
}

pub(crate) fn finish(root: &Canvas<'_>, path: &Path) -> Result<PathBuf> {
    root.present().map_err(drawing)?;
    info!(path = %path.display(), "chart saved");
    Ok(path.to_path_buf())
}

/// Everything the charts are drawn from.
pub struct ChartInputs<'a> {
    pub dataset: &'a Dataset,
    pub monthly: &'a MonthlyStats,
    pub yearly: &'a YearlyStats,
}

/// Render the full chart set. Charts with no data are skipped; a chart that
/// fails to render is logged and the others still run.
pub fn render_all(inputs: &ChartInputs<'_>, out_dir: &Path, style: &Style) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();
    written.extend(boxplot::boxplots_tranches(inputs.dataset, out_dir, style));

    let years = &inputs.yearly.years;
    let m = inputs.monthly;
    let charts: Vec<(&str, Result<Option<PathBuf>>)> = vec![
        ("cascade 1-4", bars::waterfall(years, out_dir, style, true)),
        ("cascade 1-16", bars::waterfall(years, out_dir, style, false)),
        ("solde", bars::solde_par_an(years, out_dir, style)),
        ("proportion juvénile", lines::proportion_juvenile(m, out_dir, style)),
        ("histogramme empilé", bars::hist_abs(m, out_dir, style)),
        ("delta", lines::delta(m, out_dir, style)),
        ("dynamique", lines::dynamiques(m, out_dir, style)),
        ("écart type morts", lines::morts_std_vs_mean(m, out_dir, style)),
        ("vivants moyenne", lines::vivants_mean_std(m, out_dir, style)),
        ("histogramme 100", bars::hist_100(m, out_dir, style)),
        ("moyenne/médiane", lines::mean_median_band(m, out_dir, style)),
        ("courbes proportions", lines::courbes_proportions(m, out_dir, style)),
    ];
    for (name, outcome) in charts {
        match outcome {
            Ok(Some(path)) => written.push(path),
            Ok(None) => {}
            Err(e) => warn!(chart = name, "chart failed: {}", e),
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{Dataset, Metric};
    use crate::stats::monthly::tests::rec;
    use crate::stats::{compute_yearly, stats_by_month};
    use tempfile::tempdir;

    fn simulated(files: &[&str], months: u32, metrics: &[Metric]) -> Dataset {
        let mut records = Vec::new();
        for (i, file) in files.iter().enumerate() {
            for mois in 1..=months {
                let values: Vec<(Metric, f64)> = metrics
                    .iter()
                    .enumerate()
                    .map(|(k, &m)| (m, 10.0 + (mois as f64) * (k + 1) as f64 + i as f64 * 3.0))
                    .collect();
                records.push(rec(file, mois, &values));
            }
        }
        Dataset {
            records,
            files: files.iter().map(|f| f.to_string()).collect(),
            ..Dataset::default()
        }
    }

    fn render(dataset: &Dataset, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let monthly = stats_by_month(dataset);
        let yearly = compute_yearly(dataset);
        let inputs = ChartInputs {
            dataset,
            monthly: &monthly,
            yearly: &yearly,
        };
        render_all(&inputs, out_dir, &Style::with_dpi(40))
    }

    #[test]
    fn full_dataset_renders_every_chart() -> Result<()> {
        let dir = tempdir()?;
        let data = simulated(&["a.csv", "b.csv"], 60, &Metric::ALL);
        let written = render(&data, dir.path())?;
        assert_eq!(written.len(), 15);
        for path in &written {
            assert!(path.is_file(), "missing {}", path.display());
            assert!(path.starts_with(dir.path()));
        }
        Ok(())
    }

    #[test]
    fn living_only_dataset_skips_what_it_cannot_draw() -> Result<()> {
        let dir = tempdir()?;
        let data = simulated(&["a.csv", "b.csv"], 30, &[Metric::Vivants]);
        let written = render(&data, dir.path())?;
        assert!(!written.is_empty() && written.len() < 15);
        assert!(written.iter().all(|p| p.is_file()));
        Ok(())
    }

    #[test]
    fn single_month_dataset_renders() -> Result<()> {
        let dir = tempdir()?;
        let data = simulated(&["a.csv"], 1, &Metric::ALL);
        let written = render(&data, dir.path())?;
        assert!(!written.is_empty());
        assert!(written.iter().all(|p| p.is_file()));
        Ok(())
    }
}
