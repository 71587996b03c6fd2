//! Runs the share price monotonicity suite and prints the report to stdout.
//!
//! Exit status: 0 when every check meets its expectation, 1 when any check contradicts it,
//! 2 when any check is inconclusive.

use share_price_prover::runtime::{
    emit_config_status, parse_runtime_args, render_json, render_text,
};
use share_price_prover::solver::run_suite;
use share_price_prover::utils::config::ReportFormat;
use z3::{Config, Context};

fn main() -> anyhow::Result<()> {
    // Load .env before parsing so file-provided keys take part in configuration.
    let applied = share_price_prover::utils::env_guard::harden_env_setup();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    share_price_prover::utils::env_guard::emit_env_status(applied);

    let config = parse_runtime_args()?;
    emit_config_status(&config);
    if config.explain_config {
        tracing::info!("[OPS] PROVER_EXPLAIN_CONFIG=true requested; configuration resolved.");
        return Ok(());
    }

    let z3_config = Config::new();
    let ctx = Context::new(&z3_config);
    let report = run_suite(&ctx, &config)?;

    match config.report_format {
        ReportFormat::Text => print!("{}", render_text(&report)),
        ReportFormat::Json => println!("{}", render_json(&report)?),
    }

    let status = report.status();
    tracing::info!("[OPS] Suite finished: {:?}", status);
    std::process::exit(status.exit_code());
}
