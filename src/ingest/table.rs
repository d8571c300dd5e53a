use csv::{ReaderBuilder, Trim};
use tracing::{debug, trace};

use super::{extract::SEPARATORS, LoadError};

/// Number of lines inspected when sniffing the delimiter.
const SNIFF_LINES: usize = 10;

/// A parsed table before header mapping.
#[derive(Debug)]
pub struct RawTable {
    /// Header cells as written in the file.
    pub headers: Vec<String>,
    /// Data rows, one `Vec` of cells per line (may be ragged).
    pub rows: Vec<Vec<String>>,
    pub delimiter: char,
}

/// Parse `content` (header + data) into a [`RawTable`], trying the sniffed
/// delimiter first and then every candidate in turn. The first attempt whose
/// header has at least `min_columns` fields wins.
pub fn read_table(content: &str, min_columns: usize) -> Result<RawTable, LoadError> {
    let sniffed = sniff_delimiter(content);
    let attempts = sniffed.into_iter().chain(SEPARATORS);

    for delimiter in attempts {
        match parse_with(content, delimiter) {
            Ok(table) if table.headers.len() >= min_columns => {
                debug!(
                    delimiter = ?delimiter,
                    columns = table.headers.len(),
                    rows = table.rows.len(),
                    "parsed table"
                );
                return Ok(table);
            }
            Ok(table) => {
                trace!(delimiter = ?delimiter, columns = table.headers.len(), "too few columns");
            }
            Err(e) => {
                trace!(delimiter = ?delimiter, error = %e, "parse attempt failed");
            }
        }
    }

    Err(LoadError::Delimiter { min_columns })
}

/// Pick the candidate separator giving the most consistent non-zero field
/// count across the first lines. Ties go to the candidate with more fields,
/// then to the earlier candidate.
pub fn sniff_delimiter(content: &str) -> Option<char> {
    let sample: Vec<&str> = content.lines().take(SNIFF_LINES).collect();
    let header = sample.first()?;

    let mut best: Option<(usize, usize, char)> = None;
    for sep in SEPARATORS {
        let header_fields = header.matches(sep).count();
        if header_fields == 0 {
            continue;
        }
        let consistent = sample
            .iter()
            .filter(|ln| ln.matches(sep).count() == header_fields)
            .count();
        let score = (consistent, header_fields);
        match best {
            Some((c, f, _)) if (c, f) >= score => {}
            _ => best = Some((score.0, score.1, sep)),
        }
    }
    best.map(|(_, _, sep)| sep)
}

fn parse_with(content: &str, delimiter: char) -> Result<RawTable, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable {
        headers,
        rows,
        delimiter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_common_separators() {
        assert_eq!(sniff_delimiter("a,b,c\n1,2,3"), Some(','));
        assert_eq!(sniff_delimiter("a;b;c\n1;2,5;3"), Some(';'));
        assert_eq!(sniff_delimiter("a\tb\tc\n1\t2\t3"), Some('\t'));
        assert_eq!(sniff_delimiter("a|b|c\n1|2|3"), Some('|'));
        assert_eq!(sniff_delimiter("abc\n123"), None);
    }

    #[test]
    fn sniff_prefers_consistent_separator() {
        // decimal commas in the data must not win the sniff
        let content = "Mois;Vivants;Naissances\n1;2,5;3\n2;4;5,25\n3;6;7";
        assert_eq!(sniff_delimiter(content), Some(';'));
    }

    #[test]
    fn reads_semicolon_table() -> Result<(), LoadError> {
        let content = "Mois;A;B;C;D\n1;2;3;4;5\n2;3;4;5;6";
        let table = read_table(content, 5)?;
        assert_eq!(table.delimiter, ';');
        assert_eq!(table.headers, vec!["Mois", "A", "B", "C", "D"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["2", "3", "4", "5", "6"]);
        Ok(())
    }

    #[test]
    fn ragged_rows_are_kept() -> Result<(), LoadError> {
        let content = "Mois,A,B,C,D\n1,2\n2,3,4,5,6,7";
        let table = read_table(content, 5)?;
        assert_eq!(table.rows[0], vec!["1", "2"]);
        assert_eq!(table.rows[1].len(), 6);
        Ok(())
    }

    #[test]
    fn falls_back_past_sniffed_delimiter() -> Result<(), LoadError> {
        // ',' is the steadier separator, but only ';' yields 5 columns
        let content = "Mois;A;B;C;D,E,F\n1;2,6,7\n2;3;4,6,7";
        assert_eq!(sniff_delimiter(content), Some(','));
        let table = read_table(content, 5)?;
        assert_eq!(table.delimiter, ';');
        assert_eq!(table.headers.len(), 5);
        Ok(())
    }

    #[test]
    fn too_few_columns_everywhere() {
        let err = read_table("Mois,Vivants,Morts\n1,2,3", 5).unwrap_err();
        assert!(matches!(err, LoadError::Delimiter { min_columns: 5 }));
    }

    #[test]
    fn cells_are_trimmed() -> Result<(), LoadError> {
        let table = read_table(" Mois , A,B,C,D\n 1 , 2,3,4,5", 5)?;
        assert_eq!(table.headers[0], "Mois");
        assert_eq!(table.rows[0][0], "1");
        Ok(())
    }
}
