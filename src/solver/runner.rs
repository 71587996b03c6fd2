use serde::Serialize;
use std::time::Instant;
use z3::Context;

use crate::error::{ConfigError, ProverError, Result};
use crate::protocols::premium::PremiumRounding;
use crate::solver::domain::MONOTONICITY_DOMAIN;
use crate::solver::invariants::{
    build_check, CheckGroup, Expectation, RegressionScenario, CHECK_CATALOG,
};
use crate::solver::verification::{DomainSanity, Verdict, VerificationContext};
use crate::utils::config::ProverConfig;

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub name: String,
    pub description: String,
    pub group: CheckGroup,
    pub expectation: Expectation,
    pub verdict: Verdict,
    pub elapsed_ms: u128,
}

impl CheckReport {
    /// `None` while the verdict is inconclusive.
    pub fn met_expectation(&self) -> Option<bool> {
        match (&self.verdict, self.expectation) {
            (Verdict::Indeterminate { .. }, _) => None,
            (Verdict::Proved, Expectation::Holds) => Some(true),
            (Verdict::Refuted(_), Expectation::Refuted) => Some(true),
            _ => Some(false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteStatus {
    Passed,
    Failed,
    Inconclusive,
}

impl SuiteStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Passed => 0,
            Self::Failed => 1,
            Self::Inconclusive => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub domain_sanity: DomainSanity,
    pub checks: Vec<CheckReport>,
}

impl SuiteReport {
    pub fn status(&self) -> SuiteStatus {
        let outcomes = self
            .checks
            .iter()
            .map(CheckReport::met_expectation)
            .collect::<Vec<_>>();
        if outcomes.contains(&Some(false)) {
            return SuiteStatus::Failed;
        }
        if outcomes.is_empty()
            || outcomes.contains(&None)
            || !matches!(self.domain_sanity, DomainSanity::Satisfiable)
        {
            return SuiteStatus::Inconclusive;
        }
        SuiteStatus::Passed
    }

    pub fn check(&self, name: &str) -> Option<&CheckReport> {
        self.checks.iter().find(|report| report.name == name)
    }
}

fn group_enabled(config: &ProverConfig, group: CheckGroup) -> bool {
    match group {
        CheckGroup::Core => true,
        CheckGroup::Lemma => config.include_lemmas,
        CheckGroup::Regression => config.include_regression,
    }
}

/// Env key that switched `group` off, if it is off.
fn disabled_by(config: &ProverConfig, group: CheckGroup) -> Option<&'static str> {
    match group {
        CheckGroup::Lemma if !config.include_lemmas => Some("PROVER_INCLUDE_LEMMAS"),
        CheckGroup::Regression if !config.include_regression => Some("PROVER_INCLUDE_REGRESSION"),
        _ => None,
    }
}

/// Resolve the catalog entries this run will check.
/// Unknown names, allowlisted names whose group is switched off, and an empty selection are
/// configuration errors: a run with nothing to check must not report a pass.
fn select_checks(config: &ProverConfig) -> Result<Vec<(&'static str, CheckGroup)>> {
    if let Some(names) = &config.check_allowlist {
        for name in names {
            let Some((_, group)) = CHECK_CATALOG
                .iter()
                .find(|(known, _)| *known == name.as_str())
            else {
                let known = CHECK_CATALOG
                    .iter()
                    .map(|(known, _)| *known)
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(ConfigError::UnknownCheck {
                    name: name.clone(),
                    known,
                }
                .into());
            };
            if let Some(toggle) = disabled_by(config, *group) {
                return Err(ConfigError::InvalidConfig(format!(
                    "check `{name}` is selected but {toggle}=false disables its group"
                ))
                .into());
            }
        }
    }

    let selected = CHECK_CATALOG
        .iter()
        .copied()
        .filter(|(name, group)| group_enabled(config, *group) && config.check_selected(name))
        .collect::<Vec<_>>();
    if selected.is_empty() {
        return Err(ConfigError::InvalidConfig(
            "no checks selected; PROVER_CHECKS and the group toggles leave nothing to run"
                .to_string(),
        )
        .into());
    }
    Ok(selected)
}

/// Run the monotonicity suite: domain sanity first, then every selected check in its own frame.
pub fn run_suite(ctx: &Context, config: &ProverConfig) -> Result<SuiteReport> {
    let selected = select_checks(config)?;
    let vc = VerificationContext::new(ctx, MONOTONICITY_DOMAIN, &config.solver)?;

    let domain_sanity = vc.check_domain_satisfiable();
    match &domain_sanity {
        DomainSanity::Satisfiable => {
            tracing::info!(
                "[PROVE] Domain sanity: {} variables satisfiable",
                vc.domain().len()
            );
        }
        DomainSanity::Unsatisfiable => {
            tracing::error!("[PROVE] Domain constraints are contradictory; refusing to run checks");
            return Err(ProverError::VacuousDomain);
        }
        DomainSanity::Unknown { reason } => {
            tracing::warn!(
                "[PROVE] Domain sanity undecided ({}); verdicts below are not vacuity-checked",
                reason
            );
        }
    }

    if config.include_regression {
        let scenario = RegressionScenario::default();
        for rounding in [PremiumRounding::Independent, PremiumRounding::OnDifference] {
            let totals = scenario.totals(ctx, rounding)?;
            tracing::debug!(
                "[PROVE] Pinned scenario totals ({}): T1={} T2={} T3={}",
                rounding.as_str(),
                totals.t1,
                totals.t2,
                totals.t3
            );
        }
    }

    let mut checks = Vec::new();
    for (name, group) in selected {
        let Some(check) = build_check(vc.domain(), name)? else {
            continue;
        };

        tracing::info!("[PROVE] Checking {}...", check.name);
        let started = Instant::now();
        let verdict = vc.check_property(&check);
        let elapsed_ms = started.elapsed().as_millis();

        let report = CheckReport {
            name: check.name,
            description: check.description,
            group,
            expectation: check.expectation,
            verdict,
            elapsed_ms,
        };
        match report.met_expectation() {
            Some(true) => tracing::info!(
                "[PROVE] {} -> {} ({}ms)",
                report.name,
                report.verdict.label(),
                elapsed_ms
            ),
            Some(false) => tracing::warn!(
                "[PROVE] {} -> {} against expectation {:?} ({}ms)",
                report.name,
                report.verdict.label(),
                report.expectation,
                elapsed_ms
            ),
            None => tracing::warn!(
                "[PROVE] {} -> inconclusive: {} ({}ms)",
                report.name,
                report.verdict,
                elapsed_ms
            ),
        }
        checks.push(report);
    }

    Ok(SuiteReport {
        domain_sanity,
        checks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::invariants::DIV_UP_IS_CEILING;
    use crate::solver::verification::Counterexample;

    fn report(expectation: Expectation, verdict: Verdict) -> CheckReport {
        CheckReport {
            name: "probe".to_string(),
            description: String::new(),
            group: CheckGroup::Lemma,
            expectation,
            verdict,
            elapsed_ms: 0,
        }
    }

    fn witness() -> Verdict {
        Verdict::Refuted(Counterexample {
            assignments: Vec::new(),
            observables: Vec::new(),
        })
    }

    #[test]
    fn test_expectation_matrix() {
        assert_eq!(report(Expectation::Holds, Verdict::Proved).met_expectation(), Some(true));
        assert_eq!(report(Expectation::Refuted, witness()).met_expectation(), Some(true));
        assert_eq!(report(Expectation::Holds, witness()).met_expectation(), Some(false));
        assert_eq!(
            report(Expectation::Refuted, Verdict::Proved).met_expectation(),
            Some(false)
        );
        let unknown = Verdict::Indeterminate {
            reason: "timeout".to_string(),
        };
        assert_eq!(report(Expectation::Holds, unknown).met_expectation(), None);
    }

    #[test]
    fn test_failure_outranks_inconclusive() {
        let suite = SuiteReport {
            domain_sanity: DomainSanity::Satisfiable,
            checks: vec![
                report(
                    Expectation::Holds,
                    Verdict::Indeterminate {
                        reason: "canceled".to_string(),
                    },
                ),
                report(Expectation::Holds, witness()),
            ],
        };
        assert_eq!(suite.status(), SuiteStatus::Failed);
        assert_eq!(suite.status().exit_code(), 1);
    }

    #[test]
    fn test_unknown_is_never_reported_as_passed() {
        let suite = SuiteReport {
            domain_sanity: DomainSanity::Satisfiable,
            checks: vec![
                report(Expectation::Holds, Verdict::Proved),
                report(
                    Expectation::Holds,
                    Verdict::Indeterminate {
                        reason: "timeout".to_string(),
                    },
                ),
            ],
        };
        assert_eq!(suite.status(), SuiteStatus::Inconclusive);
        assert_eq!(suite.status().exit_code(), 2);
    }

    #[test]
    fn test_empty_report_is_not_a_pass() {
        let suite = SuiteReport {
            domain_sanity: DomainSanity::Satisfiable,
            checks: Vec::new(),
        };
        assert_eq!(suite.status(), SuiteStatus::Inconclusive);
        assert_eq!(suite.status().exit_code(), 2);
    }

    #[test]
    fn test_empty_allowlist_selects_nothing_and_is_rejected() {
        let config = ProverConfig {
            check_allowlist: Some(Vec::new()),
            ..ProverConfig::default()
        };
        let err = select_checks(&config).expect_err("empty selection must fail");
        assert!(
            matches!(err, ProverError::Config(ConfigError::InvalidConfig(_))),
            "{err}"
        );
    }

    #[test]
    fn test_allowlisted_check_in_disabled_group_is_rejected() {
        let config = ProverConfig {
            check_allowlist: Some(vec![DIV_UP_IS_CEILING.to_string()]),
            include_lemmas: false,
            ..ProverConfig::default()
        };
        let err = select_checks(&config).expect_err("disabled group must fail");
        let message = err.to_string();
        assert!(message.contains(DIV_UP_IS_CEILING), "{message}");
        assert!(message.contains("PROVER_INCLUDE_LEMMAS"), "{message}");
    }

    #[test]
    fn test_default_selection_follows_catalog_order() {
        let selected = select_checks(&ProverConfig::default()).expect("defaults select");
        assert_eq!(selected.len(), CHECK_CATALOG.len());
        assert_eq!(selected[0].0, CHECK_CATALOG[0].0);

        let core_only = ProverConfig {
            include_lemmas: false,
            include_regression: false,
            ..ProverConfig::default()
        };
        let selected = select_checks(&core_only).expect("core always selectable");
        assert!(selected.iter().all(|(_, group)| *group == CheckGroup::Core));
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_unknown_allowlist_entry_is_rejected() {
        let config = ProverConfig {
            check_allowlist: Some(vec!["share_price_t9".to_string()]),
            ..ProverConfig::default()
        };
        let ctx = Context::new(&z3::Config::new());
        let err = run_suite(&ctx, &config).expect_err("unknown check must fail");
        assert!(err.to_string().contains("share_price_t9"), "{err}");
    }
}
