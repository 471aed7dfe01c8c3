//! Line-ending normalization for clipboard text
//!
//! Text copied on one platform often carries the wrong line breaks for the
//! other side of the link. The conversion mode is configured per endpoint:
//! the server normalizes incoming `Copy` text, the client normalizes
//! `Paste` output.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Line-ending conversion policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// Leave text untouched
    #[default]
    Passthrough,
    /// Normalize every line break to `\n`
    Lf,
    /// Normalize every line break to `\r\n`
    Crlf,
}

impl LineEnding {
    /// Apply the policy to `text`
    pub fn convert(&self, text: &str) -> String {
        match self {
            LineEnding::Passthrough => text.to_string(),
            LineEnding::Lf => to_lf(text),
            LineEnding::Crlf => to_lf(text).replace('\n', "\r\n"),
        }
    }
}

/// Collapse `\r\n` and stray `\r` into `\n`
fn to_lf(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

impl FromStr for LineEnding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.eq_ignore_ascii_case("passthrough") {
            Ok(LineEnding::Passthrough)
        } else if s.eq_ignore_ascii_case("lf") {
            Ok(LineEnding::Lf)
        } else if s.eq_ignore_ascii_case("crlf") {
            Ok(LineEnding::Crlf)
        } else {
            Err(ConfigError::Invalid(format!(
                "unknown line ending '{}' (expected lf or crlf)",
                s
            )))
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineEnding::Passthrough => write!(f, "passthrough"),
            LineEnding::Lf => write!(f, "lf"),
            LineEnding::Crlf => write!(f, "crlf"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lf_conversion() {
        assert_eq!(LineEnding::Lf.convert("hello\r\nworld"), "hello\nworld");
        assert_eq!(LineEnding::Lf.convert("a\rb\r\nc\n"), "a\nb\nc\n");
        assert_eq!(LineEnding::Lf.convert("no breaks"), "no breaks");
    }

    #[test]
    fn test_crlf_conversion() {
        assert_eq!(LineEnding::Crlf.convert("a\nb"), "a\r\nb");
        assert_eq!(LineEnding::Crlf.convert("a\r\nb"), "a\r\nb");
        assert_eq!(LineEnding::Crlf.convert("a\rb\n"), "a\r\nb\r\n");
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(LineEnding::Passthrough.convert("a\r\nb\rc"), "a\r\nb\rc");
    }

    #[test]
    fn test_parse() {
        assert_eq!("lf".parse::<LineEnding>().unwrap(), LineEnding::Lf);
        assert_eq!("CRLF".parse::<LineEnding>().unwrap(), LineEnding::Crlf);
        assert_eq!(
            "".parse::<LineEnding>().unwrap(),
            LineEnding::Passthrough
        );
        assert!("cr".parse::<LineEnding>().is_err());
    }
}
