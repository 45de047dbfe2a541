//! Platform build numbers.
//!
//! A platform version is a dot-separated build number with an optional
//! product code prefix, e.g. `2021.1`, `211.7628.21`, or `XD-211.7628.21`.
//! Compatibility ranges in plugin descriptors may end with a `*` wildcard
//! component (`211.*`), which compares greater than any concrete build.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Wildcard component value; sorts above every concrete build number.
const WILDCARD: u32 = u32::MAX;

/// A parsed platform build number.
///
/// The product code is carried for display but does not participate in
/// build-number comparison ([`PlatformVersion::cmp_build`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformVersion {
    product_code: Option<String>,
    components: Vec<u32>,
}

/// Why a platform version string did not parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsePlatformVersionError {
    #[error("platform version is empty")]
    Empty,

    #[error("invalid component {component:?} in platform version {input:?}")]
    InvalidComponent { input: String, component: String },

    #[error("wildcard must be the last component of {0:?}")]
    MisplacedWildcard(String),
}

impl PlatformVersion {
    pub fn product_code(&self) -> Option<&str> {
        self.product_code.as_deref()
    }

    pub fn components(&self) -> &[u32] {
        &self.components
    }

    /// Componentwise build-number comparison. Missing trailing components
    /// compare as zero (`211` == `211.0.0`); the product code is ignored.
    pub fn cmp_build(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for idx in 0..len {
            match self.component(idx).cmp(&other.component(idx)) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }

    fn component(&self, idx: usize) -> u32 {
        self.components.get(idx).copied().unwrap_or(0)
    }
}

impl FromStr for PlatformVersion {
    type Err = ParsePlatformVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParsePlatformVersionError::Empty);
        }

        // An uppercase alphabetic prefix before the first '-' is a product
        // code; anything else is part of the build number.
        let (product_code, build) = match s.split_once('-') {
            Some((code, rest))
                if !code.is_empty() && code.chars().all(|c| c.is_ascii_uppercase()) =>
            {
                (Some(code.to_string()), rest)
            }
            _ => (None, s),
        };

        if build.is_empty() {
            return Err(ParsePlatformVersionError::Empty);
        }

        let parts: Vec<&str> = build.split('.').collect();
        let mut components = Vec::with_capacity(parts.len());

        for (idx, part) in parts.iter().enumerate() {
            if *part == "*" {
                if idx + 1 != parts.len() {
                    return Err(ParsePlatformVersionError::MisplacedWildcard(s.to_string()));
                }
                components.push(WILDCARD);
            } else {
                let value = part.parse::<u32>().map_err(|_| {
                    ParsePlatformVersionError::InvalidComponent {
                        input: s.to_string(),
                        component: (*part).to_string(),
                    }
                })?;
                components.push(value);
            }
        }

        Ok(Self {
            product_code,
            components,
        })
    }
}

impl fmt::Display for PlatformVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = &self.product_code {
            write!(f, "{code}-")?;
        }
        for (idx, component) in self.components.iter().enumerate() {
            if idx > 0 {
                write!(f, ".")?;
            }
            if *component == WILDCARD {
                write!(f, "*")?;
            } else {
                write!(f, "{component}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod version_tests {
    use super::*;

    fn parse(s: &str) -> PlatformVersion {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_plain_build() {
        let version = parse("211.7628.21");
        assert_eq!(version.product_code(), None);
        assert_eq!(version.components(), &[211, 7628, 21]);
        assert_eq!(version.to_string(), "211.7628.21");
    }

    #[test]
    fn test_parse_product_code() {
        let version = parse("XD-211.7628.21");
        assert_eq!(version.product_code(), Some("XD"));
        assert_eq!(version.components(), &[211, 7628, 21]);
        assert_eq!(version.to_string(), "XD-211.7628.21");
    }

    #[test]
    fn test_parse_trailing_wildcard() {
        let version = parse("211.*");
        assert_eq!(version.components(), &[211, WILDCARD]);
        assert_eq!(version.to_string(), "211.*");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "".parse::<PlatformVersion>(),
            Err(ParsePlatformVersionError::Empty)
        );
        assert_eq!(
            "  ".parse::<PlatformVersion>(),
            Err(ParsePlatformVersionError::Empty)
        );
        assert_eq!(
            "XD-".parse::<PlatformVersion>(),
            Err(ParsePlatformVersionError::Empty)
        );
        assert!(matches!(
            "211.x.21".parse::<PlatformVersion>(),
            Err(ParsePlatformVersionError::InvalidComponent { .. })
        ));
        assert!(matches!(
            "banana".parse::<PlatformVersion>(),
            Err(ParsePlatformVersionError::InvalidComponent { .. })
        ));
        assert_eq!(
            "211.*.21".parse::<PlatformVersion>(),
            Err(ParsePlatformVersionError::MisplacedWildcard(
                "211.*.21".to_string()
            ))
        );
    }

    #[test]
    fn test_dash_without_product_code_is_not_a_version() {
        // "211-123" has no uppercase prefix, so the whole string is treated
        // as a build number and fails on the non-numeric component.
        assert!("211-123".parse::<PlatformVersion>().is_err());
    }

    #[test]
    fn test_cmp_build_componentwise() {
        assert_eq!(parse("211.2").cmp_build(&parse("211.10")), Ordering::Less);
        assert_eq!(
            parse("212.0").cmp_build(&parse("211.9999")),
            Ordering::Greater
        );
        assert_eq!(parse("211.5").cmp_build(&parse("211.5")), Ordering::Equal);
    }

    #[test]
    fn test_cmp_build_pads_missing_components_with_zero() {
        assert_eq!(parse("211").cmp_build(&parse("211.0.0")), Ordering::Equal);
        assert_eq!(parse("211").cmp_build(&parse("211.0.1")), Ordering::Less);
    }

    #[test]
    fn test_cmp_build_ignores_product_code() {
        assert_eq!(
            parse("XD-211.5").cmp_build(&parse("211.5")),
            Ordering::Equal
        );
    }

    #[test]
    fn test_wildcard_sorts_above_concrete_builds() {
        assert_eq!(
            parse("211.*").cmp_build(&parse("211.99999")),
            Ordering::Greater
        );
        assert_eq!(parse("211.*").cmp_build(&parse("212.0")), Ordering::Less);
    }
}
