use anyhow::{Context, Result};
use clap::Parser;
use lapinstats::{cli::Args, config::Settings, pipeline};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) settings: defaults < --config file < flags ───────────────
    let args = Args::parse();
    let settings = Settings::resolve(&args).context("invalid settings")?;
    info!(
        input = ?settings.input,
        out = %settings.out.display(),
        limit = settings.limit,
        "startup"
    );

    // ─── 3) run ──────────────────────────────────────────────────────
    let report = pipeline::run(&settings)?;

    println!("Export des données :");
    println!("  - Données brutes concaténées : {}", report.exports.raw.display());
    println!("  - Statistiques mensuelles     : {}", report.exports.monthly.display());
    let out_dir = settings
        .out
        .canonicalize()
        .unwrap_or_else(|_| settings.out.clone());
    println!(
        "{} figure(s) sauvegardée(s) dans : {}",
        report.charts.len(),
        out_dir.display()
    );
    Ok(())
}
