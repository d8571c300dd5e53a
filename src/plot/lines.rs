use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::info;

use super::series::{
    age_proportions, cumulative_deaths_vs_births, deaths_std_vs_mean, delta_series,
    juvenile_share, living_band, mean_segments, median_segments, std_segments, value_range, Point,
};
use super::style::{self, Figure, Style};
use super::{
    canvas, chart_builder, draw_legend, draw_mesh, drawing, finish, hundredths, thousands,
    Axes, Chart, Result,
};
use crate::ingest::Metric;
use crate::stats::MonthlyStats;

struct Line<'l> {
    runs: Vec<Vec<Point>>,
    color: RGBColor,
    width_pt: f64,
    label: Option<&'l str>,
    dashed: bool,
}

impl<'l> Line<'l> {
    fn solid(runs: Vec<Vec<Point>>, color: RGBColor, width_pt: f64) -> Self {
        Line {
            runs,
            color,
            width_pt,
            label: None,
            dashed: false,
        }
    }

    fn labelled(mut self, label: &'l str) -> Self {
        self.label = Some(label);
        self
    }

    fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }

    fn points(&self) -> impl Iterator<Item = &Point> {
        self.runs.iter().flatten()
    }
}

/// Every other segment of each run, which reads as a dashed line at monthly
/// resolution.
fn dashes(runs: &[Vec<Point>]) -> Vec<Vec<Point>> {
    runs.iter()
        .flat_map(|run| run.windows(2).step_by(2).map(|w| w.to_vec()))
        .collect()
}

fn draw_line(chart: &mut Chart<'_, '_>, style: &Style, line: &Line<'_>) -> Result<()> {
    let stroke = style.line(line.color, line.width_pt);
    let pieces = if line.dashed { dashes(&line.runs) } else { line.runs.clone() };
    for (i, piece) in pieces.into_iter().enumerate() {
        let anno = chart
            .draw_series(LineSeries::new(piece, stroke))
            .map_err(drawing)?;
        if let (0, Some(label)) = (i, line.label) {
            anno.label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], stroke));
        }
    }
    Ok(())
}

/// Month span of the statistics, or 1..192 when there is a single month.
fn month_range(stats: &MonthlyStats) -> Range<f64> {
    let axis = stats.month_axis();
    match (axis.first(), axis.last()) {
        (Some(&a), Some(&b)) if a < b => f64::from(a)..f64::from(b),
        (Some(&a), _) => (f64::from(a) - 1.0)..(f64::from(a) + 1.0),
        _ => 1.0..192.0,
    }
}

struct LineChart<'l> {
    fname: &'l str,
    title: &'l str,
    fig: Figure,
    axes: Axes<'l>,
    x_range: Range<f64>,
    y_range: Option<Range<f64>>,
    lines: Vec<Line<'l>>,
    band: Option<(&'l str, Vec<(f64, f64, f64)>)>,
    legend: Option<SeriesLabelPosition>,
}

fn draw_line_chart(out_dir: &Path, style: &Style, def: LineChart<'_>) -> Result<PathBuf> {
    let path = out_dir.join(def.fname);
    let root = canvas(&path, style, def.fig)?;

    let y_range = def.y_range.clone().unwrap_or_else(|| {
        let band = def.band.iter().flat_map(|(_, b)| b.iter().flat_map(|&(_, lo, hi)| [lo, hi]));
        value_range(
            def.lines.iter().flat_map(|l| l.points().map(|p| p.1)).chain(band),
            false,
        )
    });
    let mut chart = chart_builder(&root, style, def.title)
        .build_cartesian_2d(def.x_range.clone(), y_range)
        .map_err(drawing)?;
    draw_mesh(&mut chart, style, &def.axes)?;

    if let Some((label, band)) = &def.band {
        let mut outline: Vec<Point> = band.iter().map(|&(x, lo, _)| (x, lo)).collect();
        outline.extend(band.iter().rev().map(|&(x, _, hi)| (x, hi)));
        let fill = style::BAND.mix(0.35).filled();
        chart
            .draw_series(std::iter::once(Polygon::new(outline, fill)))
            .map_err(drawing)?
            .label(*label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], fill));
    }
    for line in &def.lines {
        draw_line(&mut chart, style, line)?;
    }
    if let Some(position) = def.legend {
        draw_legend(&mut chart, style, position)?;
    }

    finish(&root, &path)
}

fn no_monthly_data(chart: &str) -> Result<Option<PathBuf>> {
    info!(chart, "chart skipped: no monthly data");
    Ok(None)
}

/// Juvenile deaths as a share of all deaths, month by month.
pub fn proportion_juvenile(stats: &MonthlyStats, out_dir: &Path, style: &Style) -> Result<Option<PathBuf>> {
    let runs = juvenile_share(stats);
    if runs.is_empty() {
        return no_monthly_data("GrapheLapinJuvenileMortProportion.png");
    }
    let mut axes = Axes::months("Temps (en mois)", "Pourcentage");
    axes.y_fmt = &hundredths;
    let def = LineChart {
        fname: "GrapheLapinJuvenileMortProportion.png",
        title: "Proportion de mort juvénile par rapport au nombre total de lapins morts en fonction du temps",
        fig: Figure::new(16.0, 5.0),
        axes,
        x_range: month_range(stats),
        y_range: None,
        lines: vec![Line::solid(runs, style::PROPORTION_LINE, 2.5)],
        band: None,
        legend: None,
    };
    draw_line_chart(out_dir, style, def).map(Some)
}

/// Mean living population and its spread over time.
pub fn vivants_mean_std(stats: &MonthlyStats, out_dir: &Path, style: &Style) -> Result<Option<PathBuf>> {
    let mean = mean_segments(stats, Metric::Vivants);
    if mean.is_empty() {
        return no_monthly_data("grapheLapinVivantMoyenne.png");
    }
    let def = LineChart {
        fname: "grapheLapinVivantMoyenne.png",
        title: "Nombre de lapin vivants en fonction du temps",
        fig: Figure::new(16.0, 6.0),
        axes: Axes::months("Temps (en mois)", "Nombre"),
        x_range: month_range(stats),
        y_range: None,
        lines: vec![
            Line::solid(mean, style::VIVANTS, 2.4).labelled("Nombre de lapin vivants en moyenne"),
            Line::solid(std_segments(stats, Metric::Vivants), style::STD_LINE, 2.0)
                .labelled("Ecart type du nombre de lapins vivants"),
        ],
        band: None,
        legend: Some(SeriesLabelPosition::UpperLeft),
    };
    draw_line_chart(out_dir, style, def).map(Some)
}

/// Living mean and median inside the mean ± std envelope.
pub fn mean_median_band(stats: &MonthlyStats, out_dir: &Path, style: &Style) -> Result<Option<PathBuf>> {
    let mean = mean_segments(stats, Metric::Vivants);
    if mean.is_empty() {
        return no_monthly_data("moy_med_et_vivants.png");
    }
    let band = living_band(stats);
    let def = LineChart {
        fname: "moy_med_et_vivants.png",
        title: "Moyenne vs Médiane avec bande ± Écart-type – Vivants (1–192 mois)",
        fig: Figure::new(16.0, 9.0),
        axes: Axes::months("Mois", "Lapins vivants"),
        x_range: month_range(stats),
        y_range: None,
        lines: vec![
            Line::solid(mean, style::VIVANTS, 2.5).labelled("Moyenne"),
            Line::solid(median_segments(stats, Metric::Vivants), style::VIVANTS, 2.0)
                .labelled("Médiane")
                .dashed(),
        ],
        band: (!band.is_empty()).then_some(("Bande ± Écart-type", band)),
        legend: Some(SeriesLabelPosition::UpperLeft),
    };
    draw_line_chart(out_dir, style, def).map(Some)
}

/// Share of each age category in the month's deaths.
pub fn courbes_proportions(stats: &MonthlyStats, out_dir: &Path, style: &Style) -> Result<Option<PathBuf>> {
    if stats.is_empty() {
        return no_monthly_data("graphe_courbesProportions.png");
    }
    let [juv, enf, adult] = age_proportions(stats);
    let def = LineChart {
        fname: "graphe_courbesProportions.png",
        title: "Évolution mensuelle des proportions de décès par catégorie d’âge",
        fig: Figure::new(16.0, 6.0),
        axes: Axes::months("Temps (en mois)", "Pourcentage de lapin mort"),
        x_range: month_range(stats),
        y_range: Some(0.0..100.0),
        lines: vec![
            Line::solid(vec![juv], style::JUV, 1.5).labelled(
                "Proportion de lapin juvénile par rapport au nombre total de lapins morts",
            ),
            Line::solid(vec![enf], style::ENF, 1.5).labelled(
                "Proportion de lapin non mature par rapport au nombre total de lapins morts",
            ),
            Line::solid(vec![adult], style::ADULT, 1.5).labelled(
                "Proportion de lapin mature par rapport au nombre total de lapins morts",
            ),
        ],
        band: None,
        legend: Some(SeriesLabelPosition::LowerRight),
    };
    draw_line_chart(out_dir, style, def).map(Some)
}

/// Cumulative mean deaths plotted against cumulative mean births.
pub fn dynamiques(stats: &MonthlyStats, out_dir: &Path, style: &Style) -> Result<Option<PathBuf>> {
    if stats.is_empty() {
        return no_monthly_data("graphe_dynamiqueGlob.png");
    }
    let curve = cumulative_deaths_vs_births(stats);
    let mut axes = Axes::months("Naissances cumulées (moyenne)", "Morts cumulées (moyenne)");
    axes.x_labels = 10;
    axes.x_fmt = &thousands;
    let def = LineChart {
        fname: "graphe_dynamiqueGlob.png",
        title: "Nombre de lapin morts total en moyenne en fonction du nombre de naissance",
        fig: Figure::new(14.0, 6.0),
        axes,
        x_range: value_range(curve.iter().map(|p| p.0), false),
        y_range: None,
        lines: vec![Line::solid(vec![curve], style::DYNAMIQUE, 1.5)],
        band: None,
        legend: None,
    };
    draw_line_chart(out_dir, style, def).map(Some)
}

/// Scatter of the per-month standard deviation of deaths against their mean.
pub fn morts_std_vs_mean(stats: &MonthlyStats, out_dir: &Path, style: &Style) -> Result<Option<PathBuf>> {
    if stats.is_empty() {
        return no_monthly_data("grapheLapinMortParMoisEcartType.png");
    }
    let points = deaths_std_vs_mean(stats);
    let path = out_dir.join("grapheLapinMortParMoisEcartType.png");
    let root = canvas(&path, style, Figure::new(16.0, 6.0))?;
    let mut chart = chart_builder(&root, style, "Ecart type du nombre de mort par mois")
        .build_cartesian_2d(
            value_range(points.iter().map(|p| p.0), false),
            value_range(points.iter().map(|p| p.1), false),
        )
        .map_err(drawing)?;
    let mut axes = Axes::months(
        "Moyenne des morts par mois",
        "Ecart type du nombre de mort par mois",
    );
    axes.x_labels = 10;
    axes.x_fmt = &thousands;
    draw_mesh(&mut chart, style, &axes)?;

    let dot = style::SCATTER.filled();
    chart
        .draw_series(points.iter().map(|&p| Circle::new(p, style.px(2.5), dot)))
        .map_err(drawing)?;

    finish(&root, &path).map(Some)
}

/// Births and deaths on the left axis, their difference dashed on the right.
pub fn delta(stats: &MonthlyStats, out_dir: &Path, style: &Style) -> Result<Option<PathBuf>> {
    if stats.is_empty() {
        return no_monthly_data("graphe_Delta.png");
    }
    let series = delta_series(stats);
    let path = out_dir.join("graphe_Delta.png");
    let root = canvas(&path, style, Figure::new(16.0, 6.0))?;

    let x_range = month_range(stats);
    let left = value_range(
        series.naissances.iter().chain(&series.morts).map(|p| p.1),
        true,
    );
    let right = value_range(series.delta.iter().map(|p| p.1), false);
    let mut chart = chart_builder(&root, style, "Naissances vs Morts par mois et Croissance nette (Δ)")
        .right_y_label_area_size(style.px(60.0))
        .build_cartesian_2d(x_range.clone(), left)
        .map_err(drawing)?
        .set_secondary_coord(x_range, right);

    draw_mesh(&mut chart, style, &Axes::months("Temps (en mois)", "Nombre de lapins"))?;
    chart
        .configure_secondary_axes()
        .axis_style(BLACK.mix(0.7))
        .label_style(style.tick())
        .axis_desc_style(style.label())
        .y_labels(10)
        .y_label_formatter(&thousands)
        .y_desc("Nombre de lapins")
        .draw()
        .map_err(drawing)?;

    // delta first so the two main curves stay on top
    let dash = style::DELTA.mix(0.75).stroke_width(style.px(2.2));
    for piece in dashes(&[series.delta]) {
        chart
            .draw_secondary_series(LineSeries::new(piece, dash))
            .map_err(drawing)?;
    }
    chart
        .draw_series(std::iter::empty::<PathElement<(f64, f64)>>())
        .map_err(drawing)?
        .label("Delta par mois")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], dash));

    draw_line(
        &mut chart,
        style,
        &Line::solid(vec![series.morts], style::MORTS, 2.4)
            .labelled("Nombre de mort par mois en moyenne"),
    )?;
    draw_line(
        &mut chart,
        style,
        &Line::solid(vec![series.naissances], style::NAISS, 2.6)
            .labelled("Nombre de naissance par mois en moyenne"),
    )?;
    draw_legend(&mut chart, style, SeriesLabelPosition::UpperLeft)?;

    finish(&root, &path).map(Some)
}
