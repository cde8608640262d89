//! Which pipeline stages run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Selects the stages of a pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Run the compile stage only.
    #[serde(rename = "compile")]
    CompileOnly,
    /// Skip compiling and link the primary sources directly.
    #[serde(rename = "link")]
    LinkOnly,
    /// Compile stale sources, then link (default).
    #[default]
    #[serde(rename = "both")]
    Both,
}

impl Mode {
    /// Returns `true` if the compile stage runs in this mode.
    pub fn compiles(self) -> bool {
        !matches!(self, Mode::LinkOnly)
    }

    /// Returns `true` if the link stage runs in this mode.
    pub fn links(self) -> bool {
        !matches!(self, Mode::CompileOnly)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::CompileOnly => "compile",
            Mode::LinkOnly => "link",
            Mode::Both => "both",
        };
        write!(f, "{s}")
    }
}

/// Error returned when a mode name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode '{0}' (expected compile, link, or both)")]
pub struct ParseModeError(pub String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compile" => Ok(Mode::CompileOnly),
            "link" => Ok(Mode::LinkOnly),
            "both" => Ok(Mode::Both),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_both() {
        assert_eq!(Mode::default(), Mode::Both);
    }

    #[test]
    fn stage_selection() {
        assert!(Mode::CompileOnly.compiles());
        assert!(!Mode::CompileOnly.links());
        assert!(!Mode::LinkOnly.compiles());
        assert!(Mode::LinkOnly.links());
        assert!(Mode::Both.compiles() && Mode::Both.links());
    }

    #[test]
    fn parse_and_display_agree() {
        for mode in [Mode::CompileOnly, Mode::LinkOnly, Mode::Both] {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("LINK".parse::<Mode>().unwrap(), Mode::LinkOnly);
    }

    #[test]
    fn parse_unknown() {
        let err = "candle".parse::<Mode>().unwrap_err();
        assert!(err.to_string().contains("unknown mode 'candle'"));
    }

    #[test]
    fn serde_names() {
        let json = serde_json::to_string(&Mode::CompileOnly).unwrap();
        assert_eq!(json, "\"compile\"");
        let back: Mode = serde_json::from_str("\"link\"").unwrap();
        assert_eq!(back, Mode::LinkOnly);
    }
}
