use lapinstats::ingest::{self, HeaderName, LoadOptions, Metric};
use std::{env, path::Path, process::exit};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Expect exactly one CLI argument: path to a simulation log.
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <LOG_FILE>", args[0]);
        exit(1);
    }
    if let Err(e) = inspect_log(Path::new(&args[1])) {
        eprintln!("Error: {}", e);
        exit(1);
    }
}

/// Normalize one log and print its columns, non-null counts and first rows.
fn inspect_log(path: &Path) -> Result<(), ingest::LoadError> {
    let parsed = ingest::read_one_file(path, &LoadOptions::default())?;

    println!("=== Log: {} ===", path.display());
    println!("Delimiter:  {:?}", parsed.delimiter);
    println!("Rows kept:  {}", parsed.records.len());
    println!();

    println!("=== Columns ===");
    for h in &parsed.headers {
        let kind = match h {
            HeaderName::Mois => "month",
            HeaderName::Metric(_) => "metric",
            HeaderName::Other(_) => "ignored",
        };
        println!("- {:<40} | {}", h.as_str(), kind);
    }
    println!();

    println!("=== Non-null ===");
    for m in Metric::ALL {
        println!("- {:<20} {}", m.name(), parsed.non_null(m));
    }
    println!();

    println!("=== Head ===");
    let present: Vec<Metric> = Metric::ALL
        .into_iter()
        .filter(|&m| parsed.non_null(m) > 0)
        .collect();
    let header: Vec<&str> = present.iter().map(|m| m.name()).collect();
    println!("mois | {}", header.join(" | "));
    for r in parsed.records.iter().take(5) {
        let cells: Vec<String> = present
            .iter()
            .map(|&m| r.get(m).map_or_else(|| "-".to_string(), |v| v.to_string()))
            .collect();
        println!("{:>4} | {}", r.mois, cells.join(" | "));
    }
    Ok(())
}
