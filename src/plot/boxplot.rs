use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::series::value_range;
use super::style::{self, Figure, Style};
use super::{canvas, chart_builder, draw_mesh, drawing, finish, thousands, Axes, Result};
use crate::ingest::{Dataset, Metric};
use crate::stats::{tranches, values_by_tranche, BoxStats};

const BOX_HALF_WIDTH: f64 = 0.25;
const CAP_HALF_WIDTH: f64 = 0.125;

struct BoxChart {
    metric: Metric,
    title_suffix: &'static str,
    y_desc: &'static str,
    fill: RGBColor,
    edge: RGBColor,
}

const BOX_CHARTS: [BoxChart; 3] = [
    BoxChart {
        metric: Metric::MortsMois,
        title_suffix: "Morts mensuels",
        y_desc: "Morts par mois",
        fill: RGBColor(0xf2, 0x8e, 0x8c),
        edge: RGBColor(0xb5, 0x4e, 0x4e),
    },
    BoxChart {
        metric: Metric::NaissMois,
        title_suffix: "Naissances",
        y_desc: "Naissances par mois",
        fill: RGBColor(0x9f, 0xe3, 0xb0),
        edge: RGBColor(0x5b, 0x8a, 0x72),
    },
    BoxChart {
        metric: Metric::Vivants,
        title_suffix: "Vivants",
        y_desc: "Lapins vivants",
        fill: RGBColor(0xb3, 0xc6, 0xe6),
        edge: RGBColor(0x5b, 0x8a, 0x72),
    },
];

/// One box plot per metric, boxes grouped by 48-month tranche. A metric whose
/// tranches are all empty is skipped; the remaining metrics are still drawn.
pub fn boxplots_tranches(dataset: &Dataset, out_dir: &Path, style: &Style) -> Vec<PathBuf> {
    let mut written = Vec::new();
    for def in &BOX_CHARTS {
        let data = values_by_tranche(dataset, def.metric);
        if data.iter().all(|d| d.is_empty()) {
            info!(metric = %def.metric, "box plot skipped: every tranche is empty");
            continue;
        }
        let boxes: Vec<Option<BoxStats>> = data.iter().map(|d| BoxStats::from_values(d)).collect();
        let path = out_dir.join(format!("boxplot_{}_tranches.png", def.metric.name()));
        match draw_boxes(&path, def, &boxes, style) {
            Ok(p) => written.push(p),
            Err(e) => warn!(metric = %def.metric, "box plot failed: {}", e),
        }
    }
    written
}

fn draw_boxes(path: &Path, def: &BoxChart, boxes: &[Option<BoxStats>], style: &Style) -> Result<PathBuf> {
    let root = canvas(path, style, Figure::new(12.0, 8.0))?;
    let title = format!(
        "Variabilité par tranches (boîtes à moustaches) – {}",
        def.title_suffix
    );

    let y_range = value_range(
        boxes.iter().flatten().flat_map(|b| {
            let (lo, hi) = b.extent();
            [lo, hi]
        }),
        false,
    );
    let mut chart = chart_builder(&root, style, &title)
        .build_cartesian_2d(0.5..(boxes.len() as f64 + 0.5), y_range)
        .map_err(drawing)?;

    let labels = tranches().map(|t| t.label);
    let x_fmt = |v: &f64| {
        let i = v.round() as usize;
        if (v - v.round()).abs() < 1e-6 && (1..=labels.len()).contains(&i) {
            labels[i - 1].to_string()
        } else {
            String::new()
        }
    };
    let axes = Axes {
        x_desc: "",
        y_desc: def.y_desc,
        x_labels: boxes.len(),
        y_labels: 10,
        x_fmt: &x_fmt,
        y_fmt: &thousands,
        rotate_x: false,
    };
    draw_mesh(&mut chart, style, &axes)?;

    let edge = style.line(def.edge, 1.0);
    let whisker = style.line(BLACK, 1.0);
    let median = style.line(style::ENF, 1.5);
    for (i, b) in boxes.iter().enumerate() {
        let Some(b) = b else { continue };
        let x = i as f64 + 1.0;
        let (left, right) = (x - BOX_HALF_WIDTH, x + BOX_HALF_WIDTH);

        chart
            .draw_series([
                Rectangle::new([(left, b.q1), (right, b.q3)], def.fill.mix(0.6).filled()),
                Rectangle::new([(left, b.q1), (right, b.q3)], edge),
            ])
            .map_err(drawing)?;
        chart
            .draw_series([
                PathElement::new(vec![(x, b.q1), (x, b.whisker_low)], whisker),
                PathElement::new(vec![(x, b.q3), (x, b.whisker_high)], whisker),
                PathElement::new(
                    vec![(x - CAP_HALF_WIDTH, b.whisker_low), (x + CAP_HALF_WIDTH, b.whisker_low)],
                    whisker,
                ),
                PathElement::new(
                    vec![(x - CAP_HALF_WIDTH, b.whisker_high), (x + CAP_HALF_WIDTH, b.whisker_high)],
                    whisker,
                ),
                PathElement::new(vec![(left, b.median), (right, b.median)], median),
            ])
            .map_err(drawing)?;
        chart
            .draw_series(
                b.outliers
                    .iter()
                    .map(|&v| Circle::new((x, v), style.px(2.5), whisker)),
            )
            .map_err(drawing)?;
    }

    finish(&root, path)
}
