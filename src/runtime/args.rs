use crate::utils::config::ProverConfig;

fn parse_runtime_args_from_iter<I, S>(args: I) -> anyhow::Result<ProverConfig>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let supplied_args = args
        .into_iter()
        .map(|arg| arg.as_ref().to_string())
        .collect::<Vec<_>>();
    if !supplied_args.is_empty() {
        let joined = supplied_args.join(" ");
        return Err(anyhow::anyhow!(
            "CLI arguments are not accepted. Configure environment keys instead (PROVER_TIMEOUT_MS, PROVER_RLIMIT, PROVER_RANDOM_SEED, PROVER_REPORT_FORMAT, PROVER_CHECKS, PROVER_INCLUDE_LEMMAS, PROVER_INCLUDE_REGRESSION, PROVER_EXPLAIN_CONFIG). Received args: {}",
            joined
        ));
    }

    Ok(ProverConfig::from_env()?)
}

pub fn parse_runtime_args() -> anyhow::Result<ProverConfig> {
    parse_runtime_args_from_iter(std::env::args().skip(1))
}
