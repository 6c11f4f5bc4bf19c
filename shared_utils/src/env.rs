use std::{fmt::Display, str::FromStr};

use thiserror::Error;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    /// An environment variable required by the application is not set.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// The variable is set but its value could not be parsed.
    #[error("Invalid value for environment variable {name}: {message}")]
    InvalidValue { name: String, message: String },
}

/// Reads an environment variable, returning a structured error if it's missing.
///
/// Empty values are treated as missing.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, EnvError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(EnvError::MissingEnvVar(name.to_string())),
    }
}

/// Reads an optional environment variable.
///
/// Returns `None` when the variable is unset or empty, so callers can fall
/// back to their defaults.
pub fn get_env_var_opt(name: &str) -> Option<String> {
    get_env_var(name).ok()
}

/// Parses a raw value read for the variable `name`.
///
/// Surrounding whitespace is ignored. Failures carry the variable name.
pub fn parse_env_value<T>(name: &str, raw: &str) -> Result<T, EnvError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse::<T>().map_err(|e| EnvError::InvalidValue {
        name: name.to_string(),
        message: e.to_string(),
    })
}
