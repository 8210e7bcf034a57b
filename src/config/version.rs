//! API version definitions.
//!
//! The remote API pins behaviour to a `MAJOR.MINOR` version sent in the
//! `X-Api-Version` header of every request.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// API version sent with every request.
///
/// # Example
///
/// ```rust
/// use fulfillment_api::ApiVersion;
///
/// let version: ApiVersion = "1.5".parse().unwrap();
/// assert_eq!(version, ApiVersion::latest());
/// assert_eq!(version.to_string(), "1.5");
/// assert!("v1".parse::<ApiVersion>().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiVersion {
    major: u16,
    minor: u16,
}

impl ApiVersion {
    /// Returns the API version this client was written against.
    #[must_use]
    pub const fn latest() -> Self {
        Self { major: 1, minor: 5 }
    }

    /// Creates a version from its components.
    #[must_use]
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Returns the major component.
    #[must_use]
    pub const fn major(&self) -> u16 {
        self.major
    }

    /// Returns the minor component.
    #[must_use]
    pub const fn minor(&self) -> u16 {
        self.minor
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::latest()
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidApiVersion {
            version: s.to_string(),
        };

        let (major, minor) = s.trim().split_once('.').ok_or_else(invalid)?;
        let digits = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
        if !digits(major) || !digits(minor) {
            return Err(invalid());
        }

        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_is_one_five() {
        assert_eq!(ApiVersion::latest().to_string(), "1.5");
        assert_eq!(ApiVersion::default(), ApiVersion::latest());
    }

    #[test]
    fn test_parse_valid_versions() {
        assert_eq!("1.5".parse::<ApiVersion>().unwrap(), ApiVersion::new(1, 5));
        assert_eq!(" 2.10 ".parse::<ApiVersion>().unwrap(), ApiVersion::new(2, 10));
    }

    #[test]
    fn test_parse_rejects_malformed_versions() {
        for bad in ["", "1", "1.", ".5", "v1.5", "1.5.0", "one.five", "1.-5"] {
            assert!(
                matches!(
                    bad.parse::<ApiVersion>(),
                    Err(ConfigError::InvalidApiVersion { .. })
                ),
                "expected '{bad}' to be rejected"
            );
        }
    }
}
