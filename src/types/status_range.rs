//! Accepted HTTP status code range.
//!
//! `StatusRange` is an inclusive `min..=max` window of status codes that
//! classify a response as alive. Parses from `"200-399"` or a single code.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An inclusive range of HTTP status codes (100-599).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StatusRange {
    min: u16,
    max: u16,
}

impl StatusRange {
    /// Lowest status code HTTP defines.
    pub const LOWEST: u16 = 100;
    /// Highest status code HTTP defines.
    pub const HIGHEST: u16 = 599;

    /// Create a new status range.
    pub fn new(min: u16, max: u16) -> Result<Self, StatusRangeError> {
        for code in [min, max] {
            if !(Self::LOWEST..=Self::HIGHEST).contains(&code) {
                return Err(StatusRangeError::OutOfRange(code));
            }
        }
        if min > max {
            return Err(StatusRangeError::InvalidRange(min, max));
        }
        Ok(Self { min, max })
    }

    #[inline]
    pub const fn min(&self) -> u16 {
        self.min
    }

    #[inline]
    pub const fn max(&self) -> u16 {
        self.max
    }

    /// Check whether a status code falls inside the range.
    #[inline]
    pub const fn contains(&self, code: u16) -> bool {
        code >= self.min && code <= self.max
    }
}

impl Default for StatusRange {
    /// 200-399: success and redirection.
    fn default() -> Self {
        Self { min: 200, max: 399 }
    }
}

impl fmt::Display for StatusRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// Error type for status range parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatusRangeError {
    #[error("status code {0} is out of valid range (100-599)")]
    OutOfRange(u16),
    #[error("invalid status code: {0}")]
    InvalidFormat(String),
    #[error("invalid status range: min ({0}) > max ({1})")]
    InvalidRange(u16, u16),
    #[error("empty status range")]
    Empty,
}

impl FromStr for StatusRange {
    type Err = StatusRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(StatusRangeError::Empty);
        }

        let parse = |part: &str| -> Result<u16, StatusRangeError> {
            part.trim()
                .parse()
                .map_err(|_| StatusRangeError::InvalidFormat(part.to_string()))
        };

        match s.split_once('-') {
            Some((min, max)) => Self::new(parse(min)?, parse(max)?),
            None => {
                let code = parse(s)?;
                Self::new(code, code)
            }
        }
    }
}

impl TryFrom<String> for StatusRange {
    type Error = StatusRangeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StatusRange> for String {
    fn from(range: StatusRange) -> Self {
        range.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_range() {
        let range = StatusRange::default();
        assert!(range.contains(200));
        assert!(range.contains(399));
        assert!(!range.contains(404));
        assert!(!range.contains(199));
    }

    #[test]
    fn test_parse_range() {
        let range: StatusRange = "200-299".parse().unwrap();
        assert_eq!((range.min(), range.max()), (200, 299));

        let single: StatusRange = "204".parse().unwrap();
        assert!(single.contains(204));
        assert!(!single.contains(200));
        assert_eq!(single.to_string(), "204");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<StatusRange>(), Err(StatusRangeError::Empty));
        assert_eq!(
            "400-200".parse::<StatusRange>(),
            Err(StatusRangeError::InvalidRange(400, 200))
        );
        assert_eq!(
            "99-200".parse::<StatusRange>(),
            Err(StatusRangeError::OutOfRange(99))
        );
        assert!(matches!(
            "abc".parse::<StatusRange>(),
            Err(StatusRangeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&StatusRange::default()).unwrap();
        assert_eq!(json, "\"200-399\"");
        let parsed: StatusRange = serde_json::from_str("\"200-204\"").unwrap();
        assert_eq!(parsed.max(), 204);
    }
}
