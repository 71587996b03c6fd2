use crate::error::{ConfigError, Result};
use serde::Serialize;
use std::env;

const DEFAULT_TIMEOUT_MS: u32 = 60_000;
const DEFAULT_RANDOM_SEED: u32 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SolverSettings {
    pub timeout_ms: u32,
    pub rlimit: Option<u32>,
    pub random_seed: u32,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            rlimit: None,
            random_seed: DEFAULT_RANDOM_SEED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProverConfig {
    pub solver: SolverSettings,
    pub report_format: ReportFormat,
    /// Restrict the run to these check names; `None` runs every enabled check.
    pub check_allowlist: Option<Vec<String>>,
    pub include_lemmas: bool,
    pub include_regression: bool,
    pub explain_config: bool,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            solver: SolverSettings::default(),
            report_format: ReportFormat::Text,
            check_allowlist: None,
            include_lemmas: true,
            include_regression: true,
            explain_config: false,
        }
    }
}

pub(crate) fn parse_bool_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn parse_u32_var(name: &str) -> Result<Option<u32>> {
    match non_empty_var(name) {
        None => Ok(None),
        Some(raw) => raw.parse::<u32>().map(Some).map_err(|e| {
            ConfigError::InvalidConfig(format!("{name} must be a u32, got `{raw}`: {e}")).into()
        }),
    }
}

fn parse_flag_var(name: &str, default: bool) -> Result<bool> {
    match non_empty_var(name) {
        None => Ok(default),
        Some(raw) => parse_bool_flag(&raw).ok_or_else(|| {
            ConfigError::InvalidConfig(format!("{name} must be a boolean flag, got `{raw}`")).into()
        }),
    }
}

impl ProverConfig {
    pub fn from_env() -> Result<Self> {
        let timeout_ms = parse_u32_var("PROVER_TIMEOUT_MS")?.unwrap_or(DEFAULT_TIMEOUT_MS);
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "PROVER_TIMEOUT_MS must be greater than zero".to_string(),
            )
            .into());
        }
        let rlimit = parse_u32_var("PROVER_RLIMIT")?;
        let random_seed = parse_u32_var("PROVER_RANDOM_SEED")?.unwrap_or(DEFAULT_RANDOM_SEED);

        let report_format = match non_empty_var("PROVER_REPORT_FORMAT") {
            None => ReportFormat::Text,
            Some(raw) => ReportFormat::parse(&raw).ok_or_else(|| {
                ConfigError::InvalidConfig(format!(
                    "PROVER_REPORT_FORMAT must be `text` or `json`, got `{raw}`"
                ))
            })?,
        };

        let check_allowlist = match non_empty_var("PROVER_CHECKS") {
            None => None,
            Some(raw) => {
                let names = raw
                    .split(',')
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .collect::<Vec<_>>();
                if names.is_empty() {
                    return Err(ConfigError::InvalidConfig(format!(
                        "PROVER_CHECKS must name at least one check, got `{raw}`"
                    ))
                    .into());
                }
                Some(names)
            }
        };

        Ok(Self {
            solver: SolverSettings {
                timeout_ms,
                rlimit,
                random_seed,
            },
            report_format,
            check_allowlist,
            include_lemmas: parse_flag_var("PROVER_INCLUDE_LEMMAS", true)?,
            include_regression: parse_flag_var("PROVER_INCLUDE_REGRESSION", true)?,
            explain_config: parse_flag_var("PROVER_EXPLAIN_CONFIG", false)?,
        })
    }

    pub fn check_selected(&self, name: &str) -> bool {
        match &self.check_allowlist {
            None => true,
            Some(names) => names.iter().any(|selected| selected == name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_prover_env() {
        for key in [
            "PROVER_TIMEOUT_MS",
            "PROVER_RLIMIT",
            "PROVER_RANDOM_SEED",
            "PROVER_REPORT_FORMAT",
            "PROVER_CHECKS",
            "PROVER_INCLUDE_LEMMAS",
            "PROVER_INCLUDE_REGRESSION",
            "PROVER_EXPLAIN_CONFIG",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn config_defaults_when_env_is_empty() {
        let _guard = env_lock().lock().expect("env lock");
        clear_prover_env();
        let config = ProverConfig::from_env().expect("defaults parse");
        assert_eq!(config, ProverConfig::default());
        clear_prover_env();
    }

    #[test]
    fn config_reads_solver_and_selection_keys() {
        let _guard = env_lock().lock().expect("env lock");
        clear_prover_env();
        std::env::set_var("PROVER_TIMEOUT_MS", "1500");
        std::env::set_var("PROVER_RLIMIT", "9000000");
        std::env::set_var("PROVER_REPORT_FORMAT", "JSON");
        std::env::set_var("PROVER_CHECKS", "share_price_t1_to_t2, share_price_t2_to_t3,");
        std::env::set_var("PROVER_INCLUDE_LEMMAS", "off");

        let config = ProverConfig::from_env().expect("parse should succeed");
        assert_eq!(config.solver.timeout_ms, 1_500);
        assert_eq!(config.solver.rlimit, Some(9_000_000));
        assert_eq!(config.solver.random_seed, 42);
        assert_eq!(config.report_format, ReportFormat::Json);
        assert!(!config.include_lemmas);
        assert!(config.include_regression);
        assert!(config.check_selected("share_price_t2_to_t3"));
        assert!(!config.check_selected("div_up_is_ceiling"));
        clear_prover_env();
    }

    #[test]
    fn config_rejects_zero_timeout_and_bad_values() {
        let _guard = env_lock().lock().expect("env lock");
        clear_prover_env();
        std::env::set_var("PROVER_TIMEOUT_MS", "0");
        let err = ProverConfig::from_env().expect_err("zero timeout must fail");
        assert!(err.to_string().contains("greater than zero"), "{err}");

        clear_prover_env();
        std::env::set_var("PROVER_REPORT_FORMAT", "yaml");
        let err = ProverConfig::from_env().expect_err("unknown format must fail");
        assert!(err.to_string().contains("PROVER_REPORT_FORMAT"), "{err}");

        clear_prover_env();
        std::env::set_var("PROVER_CHECKS", " , ,");
        let err = ProverConfig::from_env().expect_err("empty check list must fail");
        assert!(err.to_string().contains("at least one check"), "{err}");

        clear_prover_env();
        std::env::set_var("PROVER_INCLUDE_REGRESSION", "maybe");
        let err = ProverConfig::from_env().expect_err("bad flag must fail");
        assert!(err.to_string().contains("boolean flag"), "{err}");
        clear_prover_env();
    }
}
