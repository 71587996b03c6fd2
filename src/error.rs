use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProverError>;

#[derive(Debug, Error)]
pub enum ProverError {
    #[error("math error: {0}")]
    Math(#[from] Z3Error),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("domain constraints are unsatisfiable; every property would hold vacuously")]
    VacuousDomain,
}

#[derive(Debug, Error)]
pub enum Z3Error {
    #[error("term `{0}` does not reduce to a non-negative numeral")]
    NonNumeral(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unknown check `{name}` (known: {known})")]
    UnknownCheck { name: String, known: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("variable `{0}` declared twice")]
    DuplicateVariable(String),
    #[error("variable `{variable}` references `{reference}` before it is declared")]
    ForwardReference { variable: String, reference: String },
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),
}
