//! Platform API levels.
//!
//! A package declares the minimum level it requires and the level it
//! targets. The runtime only supports the levels listed here; anything
//! outside the range is rejected at load time.

use serde::{Deserialize, Serialize};

/// A platform API level a package can declare.
///
/// The numeric values match the platform's level numbering so manifests
/// can carry plain integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
#[repr(u32)]
pub enum ApiLevel {
    /// Level 29.
    Api29 = 29,
    /// Level 30.
    Api30 = 30,
    /// Level 31.
    Api31 = 31,
    /// Level 32.
    Api32 = 32,
    /// Level 33.
    Api33 = 33,
    /// Level 34.
    Api34 = 34,
}

impl ApiLevel {
    /// The lowest level the runtime accepts.
    pub const MIN_SUPPORTED: Self = Self::Api29;

    /// The highest level the runtime accepts.
    pub const MAX_SUPPORTED: Self = Self::Api34;

    /// Returns the numeric level.
    #[inline]
    #[must_use]
    pub const fn level(self) -> u32 {
        self as u32
    }
}

impl From<ApiLevel> for u32 {
    fn from(level: ApiLevel) -> Self {
        level.level()
    }
}

impl TryFrom<u32> for ApiLevel {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            29 => Ok(Self::Api29),
            30 => Ok(Self::Api30),
            31 => Ok(Self::Api31),
            32 => Ok(Self::Api32),
            33 => Ok(Self::Api33),
            34 => Ok(Self::Api34),
            other => Err(format!(
                "unsupported API level {other} (supported: {}..={})",
                Self::MIN_SUPPORTED.level(),
                Self::MAX_SUPPORTED.level()
            )),
        }
    }
}

impl std::fmt::Display for ApiLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_roundtrip() {
        for raw in 29..=34u32 {
            let level = ApiLevel::try_from(raw).unwrap();
            assert_eq!(level.level(), raw);
        }
    }

    #[test]
    fn test_unsupported_level_rejected() {
        assert!(ApiLevel::try_from(28).is_err());
        assert!(ApiLevel::try_from(35).is_err());
    }

    #[test]
    fn test_ordering_follows_numbering() {
        assert!(ApiLevel::Api29 < ApiLevel::Api34);
        assert!(ApiLevel::MIN_SUPPORTED <= ApiLevel::MAX_SUPPORTED);
    }
}
