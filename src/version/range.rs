//! npm version range matching
//!
//! Supports the npm range grammar:
//! - `1.2.3`, `=1.2.3`, `v1.2.3` - exact match
//! - `^1.2.3` - compatible with version (>=1.2.3 <2.0.0, special cases for 0.x)
//! - `~1.2.3` - approximately equivalent (>=1.2.3 <1.3.0)
//! - `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3` - comparison operators
//! - `1.2.x`, `1.x`, `1`, `1.2`, `*`, `""` - wildcards and partial versions
//! - `1.2.3 - 2.3.4` - hyphen ranges
//! - `>=1.0.0 <2.0.0` - space-separated intersections
//! - `^16.8.0 || ^17.0.0` - unions
//!
//! Every range is desugared into a union of comparator sets, so matching is
//! a plain `any(all(..))` over `semver::Version` comparisons.

use semver::{Prerelease, Version};
use std::fmt;
use thiserror::Error;

/// A range string could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid version range '{range}': {message}")]
pub struct RangeError {
    /// The offending range string
    pub range: String,
    /// What was wrong with it
    pub message: String,
}

impl RangeError {
    fn new(range: &str, message: impl Into<String>) -> Self {
        Self {
            range: range.to_string(),
            message: message.into(),
        }
    }
}

/// A single bound
#[derive(Debug, Clone, PartialEq, Eq)]
enum Comparator {
    Eq(Version),
    Gt(Version),
    Gte(Version),
    Lt(Version),
    Lte(Version),
    /// Matches nothing (`>*`, `<*`)
    Never,
}

impl Comparator {
    fn matches(&self, version: &Version) -> bool {
        match self {
            Comparator::Eq(v) => version.cmp_precedence(v).is_eq(),
            Comparator::Gt(v) => version.cmp_precedence(v).is_gt(),
            Comparator::Gte(v) => version.cmp_precedence(v).is_ge(),
            Comparator::Lt(v) => version.cmp_precedence(v).is_lt(),
            Comparator::Lte(v) => version.cmp_precedence(v).is_le(),
            Comparator::Never => false,
        }
    }
}

/// Range operators, longest spelling first
const OPERATORS: [(&str, Op); 8] = [
    (">=", Op::Gte),
    ("<=", Op::Lte),
    ("~>", Op::Tilde),
    (">", Op::Gt),
    ("<", Op::Lt),
    ("=", Op::Eq),
    ("^", Op::Caret),
    ("~", Op::Tilde),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Caret,
    Tilde,
}

/// A version with optional (wildcard) components, as written in a range
#[derive(Debug, Clone, PartialEq, Eq)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

impl Partial {
    fn parse(token: &str, range: &str) -> Result<Self, RangeError> {
        let token = token.trim();
        let token = token.strip_prefix(['v', 'V']).unwrap_or(token);

        // Build metadata never affects matching
        let token = token.split_once('+').map(|(t, _)| t).unwrap_or(token);
        let (core, pre) = match token.split_once('-') {
            Some((core, pre)) => {
                let pre = Prerelease::new(pre)
                    .map_err(|e| RangeError::new(range, format!("bad prerelease: {}", e)))?;
                (core, pre)
            }
            None => (token, Prerelease::EMPTY),
        };

        if core.is_empty() {
            return Ok(Self::any());
        }

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 3 {
            return Err(RangeError::new(range, format!("too many components in '{}'", core)));
        }

        let mut numbers = [None; 3];
        let mut wildcard_seen = false;
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if matches!(*part, "x" | "X" | "*") {
                wildcard_seen = true;
                continue;
            }
            let value: u64 = part
                .parse()
                .map_err(|_| RangeError::new(range, format!("'{}' is not a version", core)))?;
            // `1.x.3` reads as `1.x`
            if !wildcard_seen {
                *slot = Some(value);
            }
        }

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            pre,
        })
    }

    fn any() -> Self {
        Self {
            major: None,
            minor: None,
            patch: None,
            pre: Prerelease::EMPTY,
        }
    }

    /// Lowest version matching this partial (`1.2` -> `1.2.0`)
    fn floor(&self) -> Version {
        let mut v = Version::new(
            self.major.unwrap_or(0),
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0),
        );
        if self.patch.is_some() {
            v.pre = self.pre.clone();
        }
        v
    }

    /// First version after everything this partial covers (`1.2` -> `1.3.0`)
    fn ceiling(&self, range: &str) -> Result<Option<Version>, RangeError> {
        Ok(match (self.major, self.minor, self.patch) {
            (Some(major), None, _) => Some(Version::new(bump(major, range)?, 0, 0)),
            (Some(major), Some(minor), None) => Some(Version::new(major, bump(minor, range)?, 0)),
            _ => None,
        })
    }

    fn is_full(&self) -> bool {
        self.patch.is_some()
    }
}

/// A parsed npm range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpmRange {
    raw: String,
    /// Union of intersections; an empty intersection matches everything
    sets: Vec<Vec<Comparator>>,
}

impl NpmRange {
    /// Parse a range string
    pub fn parse(range: &str) -> Result<Self, RangeError> {
        let sets = range
            .split("||")
            .map(|alternative| parse_alternative(alternative, range))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: range.to_string(),
            sets,
        })
    }

    /// Check if a version satisfies this range
    pub fn matches(&self, version: &Version) -> bool {
        self.sets
            .iter()
            .any(|set| set.iter().all(|c| c.matches(version)))
    }

    /// The range as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for NpmRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Next value of a version component; components come from registry data,
/// so `u64::MAX` is a parse error rather than an overflow
fn bump(component: u64, range: &str) -> Result<u64, RangeError> {
    component
        .checked_add(1)
        .ok_or_else(|| RangeError::new(range, format!("component {} is too large", component)))
}

fn parse_alternative(alternative: &str, range: &str) -> Result<Vec<Comparator>, RangeError> {
    let tokens: Vec<&str> = alternative.split_whitespace().collect();

    if tokens.len() == 3 && tokens[1] == "-" {
        return hyphen(tokens[0], tokens[2], range);
    }

    let mut comparators = Vec::new();
    let mut pending_op: Option<&str> = None;

    for token in tokens {
        // `>= 1.2.3`: operator and version separated by whitespace
        if OPERATORS.iter().any(|(spelling, _)| *spelling == token) {
            if pending_op.is_some() {
                return Err(RangeError::new(range, "dangling operator"));
            }
            pending_op = Some(token);
            continue;
        }

        let joined;
        let token = match pending_op.take() {
            Some(op) => {
                joined = format!("{}{}", op, token);
                joined.as_str()
            }
            None => token,
        };
        comparators.extend(parse_comparator(token, range)?);
    }

    if pending_op.is_some() {
        return Err(RangeError::new(range, "operator without a version"));
    }

    Ok(comparators)
}

fn parse_comparator(token: &str, range: &str) -> Result<Vec<Comparator>, RangeError> {
    let (op, rest) = OPERATORS
        .iter()
        .find_map(|(spelling, op)| token.strip_prefix(spelling).map(|rest| (*op, rest)))
        .unwrap_or((Op::Eq, token));

    let partial = Partial::parse(rest, range)?;
    desugar(op, &partial, range)
}

fn desugar(op: Op, p: &Partial, range: &str) -> Result<Vec<Comparator>, RangeError> {
    let Some(major) = p.major else {
        // `*`, `x`, `""` and friends
        return Ok(match op {
            Op::Gt | Op::Lt => vec![Comparator::Never],
            _ => Vec::new(),
        });
    };

    let comparators = match op {
        Op::Eq => match p.ceiling(range)? {
            None => vec![Comparator::Eq(p.floor())],
            Some(ceiling) => vec![Comparator::Gte(p.floor()), Comparator::Lt(ceiling)],
        },
        Op::Gt => match p.ceiling(range)? {
            None => vec![Comparator::Gt(p.floor())],
            Some(ceiling) => vec![Comparator::Gte(ceiling)],
        },
        Op::Gte => vec![Comparator::Gte(p.floor())],
        Op::Lt => vec![Comparator::Lt(p.floor())],
        Op::Lte => match p.ceiling(range)? {
            None => vec![Comparator::Lte(p.floor())],
            Some(ceiling) => vec![Comparator::Lt(ceiling)],
        },
        Op::Tilde => {
            let upper = match p.minor {
                Some(minor) => Version::new(major, bump(minor, range)?, 0),
                None => Version::new(bump(major, range)?, 0, 0),
            };
            vec![Comparator::Gte(p.floor()), Comparator::Lt(upper)]
        }
        Op::Caret => {
            let upper = match (p.minor, p.patch) {
                _ if major > 0 => Version::new(bump(major, range)?, 0, 0),
                (Some(minor), _) if minor > 0 => Version::new(0, bump(minor, range)?, 0),
                (Some(0), Some(patch)) => Version::new(0, 0, bump(patch, range)?),
                (Some(minor), None) => Version::new(0, bump(minor, range)?, 0),
                _ => Version::new(1, 0, 0),
            };
            vec![Comparator::Gte(p.floor()), Comparator::Lt(upper)]
        }
    };
    Ok(comparators)
}

fn hyphen(from: &str, to: &str, range: &str) -> Result<Vec<Comparator>, RangeError> {
    let from = Partial::parse(from, range)?;
    let to = Partial::parse(to, range)?;

    let mut comparators = Vec::new();
    if from.major.is_some() {
        comparators.push(Comparator::Gte(from.floor()));
    }
    if to.major.is_some() {
        if to.is_full() {
            comparators.push(Comparator::Lte(to.floor()));
        } else if let Some(ceiling) = to.ceiling(range)? {
            comparators.push(Comparator::Lt(ceiling));
        }
    }
    Ok(comparators)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn check(range: &str, version: &str) -> bool {
        NpmRange::parse(range).unwrap().matches(&v(version))
    }

    #[test]
    fn test_exact() {
        assert!(check("18.2.0", "18.2.0"));
        assert!(!check("18.2.0", "18.2.1"));
        assert!(check("=18.2.0", "18.2.0"));
        assert!(check("v18.2.0", "18.2.0"));
    }

    #[test]
    fn test_caret() {
        assert!(check("^19.0.0", "19.1.0"));
        assert!(!check("^19.0.0", "20.0.0"));
        assert!(!check("^19.0.0", "18.3.1"));
        assert!(check("^0.2.3", "0.2.9"));
        assert!(!check("^0.2.3", "0.3.0"));
        assert!(check("^0.0.3", "0.0.3"));
        assert!(!check("^0.0.3", "0.0.4"));
        assert!(check("^1.2", "1.9.0"));
        assert!(check("^0.0", "0.0.7"));
        assert!(!check("^0.0", "0.1.0"));
        assert!(check("^1", "1.5.0"));
    }

    #[test]
    fn test_tilde() {
        assert!(check("~1.2.3", "1.2.9"));
        assert!(!check("~1.2.3", "1.3.0"));
        assert!(check("~1", "1.9.9"));
        assert!(!check("~1", "2.0.0"));
        assert!(check("~>1.2.3", "1.2.4"));
    }

    #[test]
    fn test_comparisons() {
        assert!(check(">=16.8.0", "19.1.0"));
        assert!(!check(">16.8.0", "16.8.0"));
        assert!(check("<17", "16.14.0"));
        assert!(!check("<17", "17.0.0"));
        assert!(check("<=17", "17.9.9"));
        assert!(!check("<=17", "18.0.0"));
        assert!(check(">1.2", "1.3.0"));
        assert!(!check(">1.2", "1.2.9"));
    }

    #[test]
    fn test_wildcards() {
        assert!(check("*", "1.0.0"));
        assert!(check("", "0.0.1"));
        assert!(check("x", "5.0.0"));
        assert!(check("1.x", "1.9.0"));
        assert!(!check("1.x", "2.0.0"));
        assert!(check("1.2.X", "1.2.7"));
        assert!(check("18", "18.3.1"));
        assert!(check("18.2", "18.2.5"));
        assert!(!check("18.2", "18.3.0"));
        assert!(!check(">*", "1.0.0"));
    }

    #[test]
    fn test_and_or() {
        assert!(check(">=1.0.0 <2.0.0", "1.5.0"));
        assert!(!check(">=1.0.0 <2.0.0", "2.0.0"));
        assert!(check("^16.8.0 || ^17.0.0 || ^18.0.0", "17.0.2"));
        assert!(!check("^16.8.0 || ^17.0.0 || ^18.0.0", "19.0.0"));
        assert!(check(">= 16.8.0", "18.0.0"));
    }

    #[test]
    fn test_hyphen() {
        assert!(check("1.2.3 - 2.3.4", "2.3.4"));
        assert!(!check("1.2.3 - 2.3.4", "2.3.5"));
        assert!(check("1.2 - 2.3", "2.3.9"));
        assert!(!check("1.2 - 2.3", "2.4.0"));
        assert!(!check("1.2 - 2.3", "1.1.9"));
    }

    #[test]
    fn test_prerelease_bounds() {
        assert!(check("^19.0.0-rc.1", "19.0.0"));
        assert!(check(">=19.0.0-rc.1", "19.0.0-rc.2"));
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(NpmRange::parse("latest").is_err());
        assert!(NpmRange::parse("workspace:*").is_err());
        assert!(NpmRange::parse("file:../lib").is_err());
        assert!(NpmRange::parse("1.2.3.4").is_err());
        assert!(NpmRange::parse(">=").is_err());
        assert!(NpmRange::parse("github:facebook/react").is_err());
    }

    #[test]
    fn test_display_keeps_raw() {
        let range = NpmRange::parse("^18.0.0 || ^19.0.0").unwrap();
        assert_eq!(range.to_string(), "^18.0.0 || ^19.0.0");
        assert_eq!(range.as_str(), "^18.0.0 || ^19.0.0");
    }

    #[test]
    fn test_component_overflow_is_an_error() {
        let max = u64::MAX;
        for range in [
            format!("^{}.0.0", max),
            format!("~1.{}", max),
            format!("~{}", max),
            format!("^0.{}.1", max),
            format!("^0.0.{}", max),
            format!("{}.x", max),
            format!("<=1.{}", max),
            format!("1.0.0 - {}", max),
        ] {
            let err = NpmRange::parse(&range).unwrap_err();
            assert!(err.message.contains("too large"), "{}: {}", range, err);
        }

        // Full versions need no upper bound
        assert!(check(&format!(">={}.0.0", max), &format!("{}.0.0", max)));
    }
}
