use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(
    author,
    version,
    about = "Aggregate rabbit-population simulation logs into statistics and charts"
)]
pub struct Args {
    /// Folder containing the simulation CSV/TXT logs
    #[arg(short, long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Output folder for charts and exported tables [default: images]
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Maximum number of files to load [default: 100]
    #[arg(long)]
    pub limit: Option<usize>,

    /// YAML settings file; command-line flags take precedence
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Chart resolution in pixels per inch [default: 150]
    #[arg(long)]
    pub dpi: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let args = Args::parse_from([
            "lapinstats",
            "--input",
            "runs",
            "--out",
            "charts",
            "--limit",
            "12",
            "--config",
            "lapin.yaml",
            "--dpi",
            "96",
        ]);
        assert_eq!(args.input, Some(PathBuf::from("runs")));
        assert_eq!(args.out, Some(PathBuf::from("charts")));
        assert_eq!(args.limit, Some(12));
        assert_eq!(args.config, Some(PathBuf::from("lapin.yaml")));
        assert_eq!(args.dpi, Some(96));
    }

    #[test]
    fn flags_are_optional() {
        let args = Args::parse_from(["lapinstats", "-i", "runs"]);
        assert_eq!(args.input, Some(PathBuf::from("runs")));
        assert!(args.out.is_none() && args.limit.is_none() && args.dpi.is_none());
    }
}
