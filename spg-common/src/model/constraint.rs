use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use semver::{Op, VersionReq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::version::pad_version;
use crate::error::{Result, SpgError};

/// A version requirement as written in a package specification (`">= 2.7"`, `"~> 3.1"`).
///
/// The original text is kept for display; comparison and hashing use the parsed requirement.
#[derive(Debug, Clone)]
pub struct Constraint {
    raw: String,
    req: VersionReq,
}

impl Constraint {
    /// The requirement that accepts every version.
    pub fn any() -> Self {
        Self {
            raw: "*".to_string(),
            req: VersionReq::STAR,
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let raw = s.trim();
        if raw.is_empty() || raw == "*" {
            return Ok(Self::any());
        }

        let mut comparators = Vec::new();
        for part in raw.split(',') {
            let compact: String = part.chars().filter(|c| !c.is_whitespace()).collect();
            if compact.is_empty() {
                return Err(SpgError::ConstraintError(format!(
                    "Empty comparator in '{raw}'"
                )));
            }
            if let Some(base) = compact.strip_prefix("~>") {
                comparators.extend(expand_pessimistic(base, raw)?);
            } else if compact.starts_with("!=") {
                return Err(SpgError::ConstraintError(format!(
                    "Exclusion comparators are not supported: '{raw}'"
                )));
            } else if compact.starts_with(|c: char| c.is_ascii_digit()) {
                comparators.push(format!("={compact}"));
            } else {
                comparators.push(compact);
            }
        }

        let joined = comparators.join(", ");
        let req = VersionReq::parse(&joined).map_err(|e| {
            SpgError::ConstraintError(format!(
                "Failed to parse constraint '{raw}' (tried '{joined}'): {e}"
            ))
        })?;
        Ok(Self {
            raw: raw.to_string(),
            req,
        })
    }

    /// True for requirements that place no restriction at all (`*`, `>= 0`).
    pub fn is_any(&self) -> bool {
        self.req.comparators.iter().all(|c| {
            c.op == Op::GreaterEq
                && c.major == 0
                && c.minor.unwrap_or(0) == 0
                && c.patch.unwrap_or(0) == 0
                && c.pre.is_empty()
        })
    }

    pub fn as_version_req(&self) -> &VersionReq {
        &self.req
    }
}

// `~> 2.7` allows anything from 2.7 up to, but not including, 3.0.
fn expand_pessimistic(base: &str, raw: &str) -> Result<Vec<String>> {
    let parts: Vec<u64> = base
        .split('.')
        .map(|p| p.parse::<u64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| {
            SpgError::ConstraintError(format!("Invalid pessimistic bound in '{raw}': {e}"))
        })?;
    let overflow = || {
        SpgError::ConstraintError(format!("Pessimistic bound in '{raw}' has no successor"))
    };
    let upper = match parts.as_slice() {
        [] => {
            return Err(SpgError::ConstraintError(format!(
                "Missing version after '~>' in '{raw}'"
            )))
        }
        [major] => format!("{}.0.0", major.checked_add(1).ok_or_else(overflow)?),
        [prefix @ .., _] => {
            let mut bumped = prefix.to_vec();
            if let Some(last) = bumped.last_mut() {
                *last = last.checked_add(1).ok_or_else(overflow)?;
            }
            let upper = bumped
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(".");
            pad_version(&upper)
        }
    };
    Ok(vec![format!(">={base}"), format!("<{upper}")])
}

impl Default for Constraint {
    fn default() -> Self {
        Self::any()
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.req == other.req
    }
}

impl Eq for Constraint {}

impl Hash for Constraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.req.hash(state);
    }
}

impl FromStr for Constraint {
    type Err = SpgError;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Constraint::parse(s)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Serialize for Constraint {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Constraint {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Constraint::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("*")]
    #[case("")]
    #[case(">= 0")]
    #[case(">=0.0.0")]
    fn accepts_anything(#[case] input: &str) {
        assert!(Constraint::parse(input).unwrap().is_any());
    }

    #[rstest]
    #[case(">= 2.7")]
    #[case("~> 3.1")]
    #[case("< 4, >= 2.5")]
    #[case("1.2.3")]
    fn restricts_versions(#[case] input: &str) {
        assert!(!Constraint::parse(input).unwrap().is_any());
    }

    #[test]
    fn keeps_original_text_for_display() {
        assert_eq!(Constraint::parse(" >= 2.7 ").unwrap().to_string(), ">= 2.7");
    }

    #[test]
    fn spacing_does_not_affect_equality() {
        assert_eq!(
            Constraint::parse(">= 2.7").unwrap(),
            Constraint::parse(">=2.7").unwrap()
        );
    }

    #[test]
    fn pessimistic_two_components() {
        let c = Constraint::parse("~> 2.7").unwrap();
        let req = c.as_version_req();
        assert!(req.matches(&semver::Version::new(2, 9, 1)));
        assert!(!req.matches(&semver::Version::new(3, 0, 0)));
        assert!(!req.matches(&semver::Version::new(2, 6, 9)));
    }

    #[test]
    fn pessimistic_three_components() {
        let req = Constraint::parse("~> 1.4.2").unwrap().as_version_req().clone();
        assert!(req.matches(&semver::Version::new(1, 4, 9)));
        assert!(!req.matches(&semver::Version::new(1, 5, 0)));
    }

    #[rstest]
    #[case("~> 18446744073709551615")]
    #[case("~> 1.18446744073709551615.2")]
    fn rejects_unbounded_pessimistic(#[case] input: &str) {
        assert!(matches!(
            Constraint::parse(input),
            Err(SpgError::ConstraintError(_))
        ));
    }

    #[test]
    fn rejects_exclusion() {
        assert!(matches!(
            Constraint::parse("!= 1.0"),
            Err(SpgError::ConstraintError(_))
        ));
    }
}
