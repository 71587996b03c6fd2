use std::fs;
use std::path::Path;

const PROVER_KEYS: [&str; 8] = [
    "PROVER_TIMEOUT_MS",
    "PROVER_RLIMIT",
    "PROVER_RANDOM_SEED",
    "PROVER_REPORT_FORMAT",
    "PROVER_CHECKS",
    "PROVER_INCLUDE_LEMMAS",
    "PROVER_INCLUDE_REGRESSION",
    "PROVER_EXPLAIN_CONFIG",
];

fn parse_env_line(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let (key, value) = trimmed.split_once('=')?;

    let value_no_comment = value.split('#').next().unwrap_or("").trim();
    let parsed = if value_no_comment.len() >= 2
        && ((value_no_comment.starts_with('"') && value_no_comment.ends_with('"'))
            || (value_no_comment.starts_with('\'') && value_no_comment.ends_with('\'')))
    {
        &value_no_comment[1..value_no_comment.len() - 1]
    } else {
        value_no_comment
    };
    Some((key.trim(), parsed))
}

/// Load `KEY=value` pairs from `path` into the process environment.
/// Variables already present in the environment win. Returns the number of keys applied.
pub fn load_env_file(path: &Path) -> usize {
    if !path.exists() {
        return 0;
    }

    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("[ENV] Failed to read {}: {}", path.display(), e);
            return 0;
        }
    };

    let mut applied = 0;
    for (key, value) in content.lines().filter_map(parse_env_line) {
        if std::env::var_os(key).is_some() {
            continue;
        }
        std::env::set_var(key, value);
        applied += 1;
    }
    applied
}

/// Load `.env` from the working directory. Returns the number of keys applied.
pub fn harden_env_setup() -> usize {
    load_env_file(Path::new(".env"))
}

/// Report `.env` usage and which prover keys are set. Call once tracing is installed.
pub fn emit_env_status(applied: usize) {
    if applied > 0 {
        tracing::debug!("[ENV] Applied {} keys from .env", applied);
    }
    let configured = PROVER_KEYS
        .iter()
        .filter(|key| std::env::var_os(key).is_some())
        .copied()
        .collect::<Vec<_>>();
    if configured.is_empty() {
        tracing::debug!("[ENV] No PROVER_* keys set; using defaults");
    } else {
        tracing::debug!("[ENV] PROVER_* keys set: {}", configured.join(", "));
    }
}
