use serde::Serialize;
use std::fmt::Write as _;

use crate::solver::runner::{CheckReport, SuiteReport, SuiteStatus};
use crate::solver::verification::{DomainSanity, Verdict};
use crate::utils::config::ProverConfig;

pub fn emit_config_status(config: &ProverConfig) {
    let checks = config
        .check_allowlist
        .as_ref()
        .map(|names| names.join(","))
        .unwrap_or_else(|| "all".to_string());
    tracing::info!(
        "[OPS] Prover config resolved: timeout_ms={} rlimit={} seed={} format={} checks={} lemmas={} regression={}",
        config.solver.timeout_ms,
        config
            .solver
            .rlimit
            .map(|r| r.to_string())
            .unwrap_or_else(|| "none".to_string()),
        config.solver.random_seed,
        config.report_format.as_str(),
        checks,
        config.include_lemmas,
        config.include_regression
    );
}

fn status_label(status: SuiteStatus) -> &'static str {
    match status {
        SuiteStatus::Passed => "PASS",
        SuiteStatus::Failed => "FAIL",
        SuiteStatus::Inconclusive => "INCONCLUSIVE",
    }
}

pub fn render_text(report: &SuiteReport) -> String {
    let mut out = String::new();
    match &report.domain_sanity {
        DomainSanity::Satisfiable => {}
        DomainSanity::Unsatisfiable => {
            let _ = writeln!(out, "Domain constraints are unsatisfiable.");
        }
        DomainSanity::Unknown { reason } => {
            let _ = writeln!(out, "Domain satisfiability unknown: {reason}");
        }
    }

    for check in &report.checks {
        let _ = writeln!(out, "\n-- {} --", check.description);
        match &check.verdict {
            Verdict::Proved => {
                let _ = writeln!(out, "Property holds.");
            }
            Verdict::Refuted(witness) => {
                let _ = writeln!(out, "Counterexample found:");
                for entry in &witness.assignments {
                    let _ = writeln!(out, "  {} = {}", entry.name, entry.value);
                }
                if !witness.observables.is_empty() {
                    let _ = writeln!(out, "  where");
                    for entry in &witness.observables {
                        let _ = writeln!(out, "  {} = {}", entry.name, entry.value);
                    }
                }
            }
            Verdict::Indeterminate { reason } => {
                let _ = writeln!(out, "Timed out or unknown: {reason}");
            }
        }
        let expectation = match check.met_expectation() {
            Some(true) => "as expected",
            Some(false) => "UNEXPECTED",
            None => "inconclusive",
        };
        let _ = writeln!(
            out,
            "[{}] {} ({}ms, {})",
            check.name,
            check.verdict.label(),
            check.elapsed_ms,
            expectation
        );
    }

    let status = report.status();
    let conclusive = report
        .checks
        .iter()
        .filter(|check| check.verdict.is_conclusive())
        .count();
    let _ = writeln!(
        out,
        "\n{}: {} checks, {} conclusive",
        status_label(status),
        report.checks.len(),
        conclusive
    );
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    status: SuiteStatus,
    domain_sanity: &'a DomainSanity,
    checks: &'a [CheckReport],
}

pub fn render_json(report: &SuiteReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        status: report.status(),
        domain_sanity: &report.domain_sanity,
        checks: &report.checks,
    })
}
