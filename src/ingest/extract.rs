use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::label::clean_label;

/// Plausible field separators of a simulation log.
pub const SEPARATORS: [char; 4] = [',', ';', '\t', '|'];

const HEADER_TOKEN: &str = "mois";

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|\r|\n").unwrap());

static DATA_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+\s*[,;\t|]").unwrap());

/// Strip the preamble of a raw log and return only the tabular part
/// (header line + data lines, joined with `\n`).
///
/// - blank lines are dropped, a leading BOM is removed
/// - `Timestamp : ...` lines are skipped
/// - the header is the first line containing "mois" and a separator
/// - failing that, the line above the first data-looking line (`1,...`)
///
/// Returns `None` when nothing usable is left.
pub fn extract_csv_content(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }

    let mut lines: Vec<&str> = LINE_BREAK
        .split(raw)
        .filter(|ln| !ln.trim().is_empty())
        .collect();
    if let Some(first) = lines.first_mut() {
        *first = first.trim_start_matches('\u{feff}');
    }

    let header_idx = find_header(&lines).or_else(|| find_first_data_line(&lines))?;
    trace!(header_idx, total = lines.len(), "located header line");

    Some(lines[header_idx..].join("\n"))
}

fn find_header(lines: &[&str]) -> Option<usize> {
    lines.iter().position(|ln| {
        let cleaned = clean_label(ln);
        !cleaned.starts_with("timestamp")
            && cleaned.contains(HEADER_TOKEN)
            && ln.contains(&SEPARATORS[..])
    })
}

/// Header assumed to sit right above the first data line.
fn find_first_data_line(lines: &[&str]) -> Option<usize> {
    lines
        .iter()
        .position(|ln| DATA_LINE.is_match(ln))
        .map(|i| i.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_timestamp_preamble() {
        let raw = "Timestamp : 14|10_09:12\nMois,Lapins vivants,Lapins morts\n1,20,0\n2,22,1\n";
        assert_eq!(
            extract_csv_content(raw).as_deref(),
            Some("Mois,Lapins vivants,Lapins morts\n1,20,0\n2,22,1")
        );
    }

    #[test]
    fn drops_bom_and_blank_lines() {
        let raw = "\u{feff}\n\nMois;Vivants\n\n1;4\r\n2;5\r\n";
        assert_eq!(
            extract_csv_content(raw).as_deref(),
            Some("Mois;Vivants\n1;4\n2;5")
        );
    }

    #[test]
    fn carriage_return_only_line_endings() {
        let raw = "Timestamp : x\rMois,Lapins vivants,Morts par mois\r1,5,1\r2,6,1\r";
        assert_eq!(
            extract_csv_content(raw).as_deref(),
            Some("Mois,Lapins vivants,Morts par mois\n1,5,1\n2,6,1")
        );
    }

    #[test]
    fn timestamp_line_mentioning_mois_is_not_a_header() {
        let raw = "Timestamp : mois, 14|10\nMois,Vivants\n1,3";
        assert_eq!(
            extract_csv_content(raw).as_deref(),
            Some("Mois,Vivants\n1,3")
        );
    }

    #[test]
    fn header_without_separator_is_ignored() {
        // "mois" alone on a line is prose, not a header
        let raw = "Simulation sur 192 mois\nMonth|Alive\n1|10\n2|12";
        assert_eq!(
            extract_csv_content(raw).as_deref(),
            Some("Month|Alive\n1|10\n2|12")
        );
    }

    #[test]
    fn data_line_fallback_at_top_keeps_first_line() {
        let raw = "1,10,0\n2,11,0";
        assert_eq!(extract_csv_content(raw).as_deref(), Some("1,10,0\n2,11,0"));
    }

    #[test]
    fn nothing_usable() {
        assert_eq!(extract_csv_content(""), None);
        assert_eq!(extract_csv_content("   \n\t\n"), None);
        assert_eq!(extract_csv_content("Timestamp : 01|01_00:00\nno table here"), None);
    }
}
