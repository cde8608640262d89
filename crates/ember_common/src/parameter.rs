//! Name/value parameters forwarded to the compile tool.

use std::fmt;
use std::str::FromStr;

/// A preprocessor definition passed verbatim to the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Definition name.
    pub name: String,
    /// Definition value (may be empty).
    pub value: String,
}

impl Parameter {
    /// Creates a new parameter.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Renders the parameter as a compiler definition flag, `-d<name>=<value>`.
    pub fn to_flag(&self) -> String {
        format!("-d{}={}", self.name, self.value)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Error returned when a `name=value` string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid parameter '{input}': expected name=value")]
pub struct ParseParameterError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for Parameter {
    type Err = ParseParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => Ok(Parameter::new(name.trim(), value)),
            _ => Err(ParseParameterError {
                input: s.to_string(),
            }),
        }
    }
}
