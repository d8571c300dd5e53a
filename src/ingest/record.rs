use std::ops::RangeInclusive;

use super::canonical::{Metric, MetricMap};

/// One month of one simulation run after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthRecord {
    /// File name (no directory) the row came from.
    pub source_file: String,
    pub mois: u32,
    pub values: MetricMap<Option<f64>>,
}

impl MonthRecord {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values[metric]
    }
}

/// Coerce a cell to a number the way a lenient CSV reader would:
/// empty or unparsable cells are `None`. A single decimal comma is
/// accepted when the table itself is not comma-separated.
pub fn parse_number(cell: &str, delimiter: char) -> Option<f64> {
    let s = cell.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<f64>() {
        return v.is_finite().then_some(v);
    }
    if delimiter != ',' && s.matches(',').count() == 1 && !s.contains('.') {
        return s.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite());
    }
    None
}

/// Accept a month cell only if it is an integral value inside `range`.
pub fn parse_month(cell: &str, delimiter: char, range: &RangeInclusive<u32>) -> Option<u32> {
    let v = parse_number(cell, delimiter)?;
    if v.fract() != 0.0 || v < *range.start() as f64 || v > *range.end() as f64 {
        return None;
    }
    Some(v as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_coerce_leniently() {
        assert_eq!(parse_number("12", ','), Some(12.0));
        assert_eq!(parse_number(" 3.5 ", ','), Some(3.5));
        assert_eq!(parse_number("", ','), None);
        assert_eq!(parse_number("n/a", ','), None);
        assert_eq!(parse_number("NaN", ','), None);
        assert_eq!(parse_number("inf", ','), None);
    }

    #[test]
    fn decimal_comma_only_off_comma_tables() {
        assert_eq!(parse_number("12,5", ';'), Some(12.5));
        assert_eq!(parse_number("12,5", ','), None);
        assert_eq!(parse_number("1,234,5", ';'), None);
        assert_eq!(parse_number("1.234,5", ';'), None);
    }

    #[test]
    fn month_bounds() {
        let range = 1..=192;
        assert_eq!(parse_month("1", ',', &range), Some(1));
        assert_eq!(parse_month("192", ',', &range), Some(192));
        assert_eq!(parse_month("192.0", ',', &range), Some(192));
        assert_eq!(parse_month("0", ',', &range), None);
        assert_eq!(parse_month("193", ',', &range), None);
        assert_eq!(parse_month("-4", ',', &range), None);
        assert_eq!(parse_month("12.5", ',', &range), None);
        assert_eq!(parse_month("mois", ',', &range), None);
    }
}
