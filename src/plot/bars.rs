use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};
use tracing::info;

use super::series::{age_stacks, solde_bars, value_range, waterfall_bars, AgeStack, BarKind};
use super::style::{self, Figure, Style};
use super::{
    canvas, chart_builder, draw_legend, draw_mesh, drawing, finish, fmt_fr, thousands,
    Axes, Chart, Result,
};
use crate::stats::{MonthlyStats, YearSummary};

const BAR_HALF_WIDTH: f64 = 0.4;

fn bar_color(kind: BarKind) -> RGBColor {
    match kind {
        BarKind::Naissances => style::NAISS,
        BarKind::Morts => style::MORTS,
    }
}

fn legend_swatch(chart: &mut Chart<'_, '_>, label: &str, color: RGBColor) -> Result<()> {
    chart
        .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())
        .map_err(drawing)?
        .label(label)
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
    Ok(())
}

/// Value labels on top of (or below, when negative) each bar.
fn annotate(chart: &mut Chart<'_, '_>, style: &Style, bars: &[(f64, f64)]) -> Result<()> {
    let above = TextStyle::from(style.annotation()).pos(Pos::new(HPos::Center, VPos::Bottom));
    let below = TextStyle::from(style.annotation()).pos(Pos::new(HPos::Center, VPos::Top));
    chart
        .draw_series(bars.iter().map(|&(x, h)| {
            let anchor = if h >= 0.0 { above.clone() } else { below.clone() };
            Text::new(fmt_fr(h, 0), (x, h), anchor)
        }))
        .map_err(drawing)?;
    Ok(())
}

/// One bar per category, category names rotated under the axis.
struct CategoricalBars<'l> {
    title: &'l str,
    labels: Vec<String>,
    values: Vec<Option<f64>>,
    colors: Vec<RGBColor>,
    legend: Vec<(&'l str, RGBColor)>,
}

fn draw_categorical(path: &Path, style: &Style, bars: &CategoricalBars<'_>) -> Result<PathBuf> {
    let root = canvas(path, style, Figure::new(14.0, 6.0))?;
    let n = bars.labels.len();
    let y_range = value_range(bars.values.iter().flatten().copied(), true);
    let mut chart = chart_builder(&root, style, bars.title)
        .x_label_area_size(style.px(120.0))
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), y_range)
        .map_err(drawing)?;

    let x_fmt = |v: &f64| {
        let i = v.round();
        if (v - i).abs() < 1e-6 && i >= 0.0 && (i as usize) < n {
            bars.labels[i as usize].clone()
        } else {
            String::new()
        }
    };
    let axes = Axes {
        x_desc: "",
        y_desc: "Nombre",
        x_labels: n,
        y_labels: 10,
        x_fmt: &x_fmt,
        y_fmt: &thousands,
        rotate_x: true,
    };
    draw_mesh(&mut chart, style, &axes)?;

    let present: Vec<(f64, f64, RGBColor)> = bars
        .values
        .iter()
        .zip(&bars.colors)
        .enumerate()
        .filter_map(|(i, (v, c))| v.map(|v| (i as f64, v, *c)))
        .collect();
    chart
        .draw_series(present.iter().map(|&(x, v, c)| {
            Rectangle::new([(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, v)], c.filled())
        }))
        .map_err(drawing)?;
    let tops: Vec<(f64, f64)> = present.iter().map(|&(x, v, _)| (x, v)).collect();
    annotate(&mut chart, style, &tops)?;

    if !bars.legend.is_empty() {
        for &(label, color) in &bars.legend {
            legend_swatch(&mut chart, label, color)?;
        }
        draw_legend(&mut chart, style, SeriesLabelPosition::UpperLeft)?;
    }

    finish(&root, path)
}

/// Mean yearly births and deaths side by side; `first4` keeps years 1 to 4.
pub fn waterfall(years: &[YearSummary], out_dir: &Path, style: &Style, first4: bool) -> Result<Option<PathBuf>> {
    let (title, fname) = if first4 {
        ("Cascade annuelle sur les 4 premières années", "graphe_cascade1-4.png")
    } else {
        ("Cascade annuelle", "graphe_cascade1-16.png")
    };
    let kept: Vec<YearSummary> = years
        .iter()
        .filter(|y| !first4 || y.annee <= 4)
        .cloned()
        .collect();

    let bars = waterfall_bars(&kept);
    if bars.iter().all(|b| b.value.is_none()) {
        info!(chart = fname, "waterfall skipped: no yearly data");
        return Ok(None);
    }

    let def = CategoricalBars {
        title,
        labels: bars.iter().map(|b| b.label.clone()).collect(),
        values: bars.iter().map(|b| b.value).collect(),
        colors: bars.iter().map(|b| bar_color(b.kind)).collect(),
        legend: vec![("Naissances", style::NAISS), ("Morts", style::MORTS)],
    };
    draw_categorical(&out_dir.join(fname), style, &def).map(Some)
}

/// Yearly balance, births minus deaths.
pub fn solde_par_an(years: &[YearSummary], out_dir: &Path, style: &Style) -> Result<Option<PathBuf>> {
    let bars = solde_bars(years);
    if bars.iter().all(|(_, v)| v.is_none()) {
        info!("yearly balance skipped: no yearly data");
        return Ok(None);
    }
    let def = CategoricalBars {
        title: "Nombre de lapin par an",
        labels: bars.iter().map(|(l, _)| l.clone()).collect(),
        values: bars.iter().map(|(_, v)| *v).collect(),
        colors: vec![style::NAISS; bars.len()],
        legend: vec![("Hausse", style::NAISS)],
    };
    draw_categorical(&out_dir.join("graphe_cascadeSolde.png"), style, &def).map(Some)
}

const STACK_LABELS_ABS: [&str; 3] = [
    "Nombre de lapins morts juvénile par mois en moyenne",
    "Nombre de lapins morts non mature par mois en moyenne",
    "Nombre de lapins morts mature par mois en moyenne",
];

const STACK_LABELS_PCT: [&str; 3] = [
    "Nombre de mort infantiles chez les lapins en moyenne",
    "Nombre de lapins morts non mature en moyenne",
    "Nombre de lapins morts mature en moyenne",
];

struct StackedChart<'l> {
    fname: &'l str,
    title: &'l str,
    y_desc: &'l str,
    labels: [&'l str; 3],
    y_range: std::ops::Range<f64>,
}

fn draw_stacked(
    out_dir: &Path,
    style: &Style,
    def: &StackedChart<'_>,
    stacks: &[AgeStack],
    legend_pos: SeriesLabelPosition,
) -> Result<PathBuf> {
    let path = out_dir.join(def.fname);
    let root = canvas(&path, style, Figure::new(16.0, 6.0))?;
    let first = stacks.first().map_or(1.0, |s| s.mois);
    let last = stacks.last().map_or(1.0, |s| s.mois);
    let x_range = (first - 0.5)..(last + 0.5);
    let mut chart = chart_builder(&root, style, def.title)
        .build_cartesian_2d(x_range, def.y_range.clone())
        .map_err(drawing)?;

    let axes = Axes::months("Temps (en mois)", def.y_desc);
    draw_mesh(&mut chart, style, &axes)?;

    let layers: [(fn(&AgeStack) -> (f64, f64), RGBColor); 3] = [
        (|s: &AgeStack| (0.0, s.juv), style::JUV),
        (|s: &AgeStack| (s.juv, s.juv + s.enf), style::ENF),
        (|s: &AgeStack| (s.juv + s.enf, s.total()), style::ADULT),
    ];
    for ((span, color), label) in layers.into_iter().zip(def.labels) {
        chart
            .draw_series(stacks.iter().map(|s| {
                let (lo, hi) = span(s);
                Rectangle::new(
                    [(s.mois - BAR_HALF_WIDTH, lo), (s.mois + BAR_HALF_WIDTH, hi)],
                    color.filled(),
                )
            }))
            .map_err(drawing)?
            .label(label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
    }
    draw_legend(&mut chart, style, legend_pos)?;

    finish(&root, &path)
}

/// Monthly deaths stacked by age category, absolute values.
pub fn hist_abs(stats: &MonthlyStats, out_dir: &Path, style: &Style) -> Result<Option<PathBuf>> {
    if stats.is_empty() {
        info!("stacked histogram skipped: no monthly data");
        return Ok(None);
    }
    let stacks = age_stacks(stats);
    let def = StackedChart {
        fname: "graphe_histogrammeEmpile.png",
        title: "Structure des décès par âge (valeurs absolues) chaque mois",
        y_desc: "Nombre",
        labels: STACK_LABELS_ABS,
        y_range: value_range(stacks.iter().map(AgeStack::total), true),
    };
    draw_stacked(out_dir, style, &def, &stacks, SeriesLabelPosition::UpperLeft).map(Some)
}

/// Monthly deaths stacked by age category, rescaled to 100 %. Months without
/// deaths are left blank.
pub fn hist_100(stats: &MonthlyStats, out_dir: &Path, style: &Style) -> Result<Option<PathBuf>> {
    let stacks: Vec<AgeStack> = age_stacks(stats)
        .iter()
        .filter_map(AgeStack::to_percent)
        .collect();
    if stacks.is_empty() {
        info!("100% histogram skipped: no deaths recorded");
        return Ok(None);
    }
    let def = StackedChart {
        fname: "graphe_histogramme100.png",
        title: "Structure des décès par âge (valeurs absolues)",
        y_desc: "Pourcentage de lapins morts",
        labels: STACK_LABELS_PCT,
        y_range: 0.0..100.0,
    };
    draw_stacked(out_dir, style, &def, &stacks, SeriesLabelPosition::LowerLeft).map(Some)
}
