//! Version constraint evaluation.
//!
//! Terraform declares provider requirements with HashiCorp's constraint
//! language (`>= 3.71, < 5.0`, `~> 3.0`, `= 2.1.0`). This module parses that
//! language and answers one question: does a given candidate version satisfy
//! a declared constraint?
//!
//! The candidate is always the configured floor and the constraint is always
//! what the module declares. Swapping the two changes the answer.
//!
//! # Example
//!
//! ```
//! use avm_check::scan::satisfies;
//!
//! assert!(satisfies("4.0.0", ">= 3.71, < 5.0").unwrap());
//! assert!(!satisfies("4.0.0", "~> 3.0").unwrap());
//! assert!(satisfies("4.0.0", "not-a-version").is_err());
//! ```

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{CheckError, Result};

/// Loose version grammar: `v1`, `1.2`, `1.2.3-beta.1`, `1.2.3+build`, `1.0rc1`.
static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^v?([0-9]+(?:\.[0-9]+)*)",
        r"(?:-([0-9]+[0-9A-Za-z\-~]*(?:\.[0-9A-Za-z\-~]+)*)|-?([A-Za-z\-~]+[0-9A-Za-z\-~]*(?:\.[0-9A-Za-z\-~]+)*))?",
        r"(?:\+([0-9A-Za-z\-~]+(?:\.[0-9A-Za-z\-~]+)*))?$",
    ))
    .expect("VERSION_REGEX must compile")
});

/// Minimum number of numeric segments a parsed version carries.
const MIN_SEGMENTS: usize = 3;

/// A parsed version.
///
/// Missing trailing segments are padded with zeroes (`4` == `4.0.0`), but the
/// number of segments actually written is kept because `~>` depends on it.
#[derive(Debug, Clone)]
pub struct Version {
    segments: Vec<u64>,
    specified: usize,
    prerelease: String,
    metadata: String,
    original: String,
}

impl Version {
    /// Parse a version string.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let caps = VERSION_REGEX
            .captures(trimmed)
            .ok_or_else(|| CheckError::InvalidVersion {
                input: input.to_string(),
                message: "malformed version".to_string(),
            })?;

        let mut segments = Vec::new();
        for part in caps[1].split('.') {
            let value = part.parse::<u64>().map_err(|e| CheckError::InvalidVersion {
                input: input.to_string(),
                message: format!("segment '{}': {}", part, e),
            })?;
            segments.push(value);
        }

        let specified = segments.len();
        while segments.len() < MIN_SEGMENTS {
            segments.push(0);
        }

        let prerelease = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let metadata = caps
            .get(4)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        Ok(Self {
            segments,
            specified,
            prerelease,
            metadata,
            original: trimmed.to_string(),
        })
    }

    /// Numeric segments, padded to at least three.
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    /// Pre-release label, empty if none.
    pub fn prerelease(&self) -> &str {
        &self.prerelease
    }

    /// Build metadata, empty if none. Ignored when comparing.
    pub fn metadata(&self) -> &str {
        &self.metadata
    }

    fn is_prerelease(&self) -> bool {
        !self.prerelease.is_empty()
    }

    fn compare_segments(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.compare_segments(other) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match (self.is_prerelease(), other.is_prerelease()) {
            (false, false) => Ordering::Equal,
            // A release sorts after any of its pre-releases.
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (true, true) => compare_prerelease(&self.prerelease, &other.prerelease),
        }
    }
}

impl FromStr for Version {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// Compare dot-separated pre-release identifiers.
///
/// Numeric identifiers compare numerically and sort before alphanumeric ones;
/// a shorter list sorts first when it is a prefix of the longer one.
fn compare_prerelease(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// Comparison operator of a single constraint clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=` or no operator.
    Equal,
    /// `!=`
    NotEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `~>`: allow only the rightmost written segment to grow.
    Pessimistic,
}

impl Operator {
    /// Split a leading operator off a clause.
    fn split(clause: &str) -> (Self, &str) {
        // Two-character operators first so `>=` isn't read as `>`.
        const OPERATORS: [(&str, Operator); 7] = [
            ("~>", Operator::Pessimistic),
            (">=", Operator::GreaterEqual),
            ("<=", Operator::LessEqual),
            ("!=", Operator::NotEqual),
            (">", Operator::Greater),
            ("<", Operator::Less),
            ("=", Operator::Equal),
        ];
        for (token, op) in OPERATORS {
            if let Some(rest) = clause.strip_prefix(token) {
                return (op, rest);
            }
        }
        (Operator::Equal, clause)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Pessimistic => "~>",
        };
        f.write_str(token)
    }
}

/// One `<operator> <version>` clause.
#[derive(Debug, Clone)]
pub struct Clause {
    pub op: Operator,
    pub version: Version,
}

impl Clause {
    /// Whether `candidate` satisfies this clause.
    pub fn check(&self, candidate: &Version) -> bool {
        let target = &self.version;
        match self.op {
            Operator::Equal => candidate == target,
            Operator::NotEqual => candidate != target,
            Operator::Greater => prerelease_compatible(candidate, target) && candidate > target,
            Operator::GreaterEqual => {
                prerelease_compatible(candidate, target) && candidate >= target
            }
            Operator::Less => prerelease_compatible(candidate, target) && candidate < target,
            Operator::LessEqual => prerelease_compatible(candidate, target) && candidate <= target,
            Operator::Pessimistic => check_pessimistic(candidate, target),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.version)
    }
}

/// A pre-release candidate only matches clauses that name a pre-release of
/// the same base version.
fn prerelease_compatible(candidate: &Version, target: &Version) -> bool {
    match (candidate.is_prerelease(), target.is_prerelease()) {
        (true, true) => candidate.compare_segments(target) == Ordering::Equal,
        (true, false) => false,
        _ => true,
    }
}

fn check_pessimistic(candidate: &Version, target: &Version) -> bool {
    if !prerelease_compatible(candidate, target) {
        return false;
    }
    if target.is_prerelease() && !candidate.is_prerelease() {
        return false;
    }
    if candidate < target {
        return false;
    }
    // `~> 3` pins nothing beyond the lower bound.
    if target.specified == 1 {
        return true;
    }
    (0..target.specified - 1).all(|i| candidate.segments[i] == target.segments[i])
}

/// A comma-separated list of clauses; all must hold.
#[derive(Debug, Clone)]
pub struct Constraints {
    clauses: Vec<Clause>,
}

impl Constraints {
    /// Parse a constraint expression such as `">= 3.71, < 5.0"`.
    pub fn parse(input: &str) -> Result<Self> {
        let mut clauses = Vec::new();
        for raw in input.split(',') {
            let (op, rest) = Operator::split(raw.trim());
            let version = Version::parse(rest).map_err(|e| CheckError::InvalidConstraint {
                input: input.to_string(),
                message: format!("clause '{}': {}", raw.trim(), e),
            })?;
            clauses.push(Clause { op, version });
        }
        Ok(Self { clauses })
    }

    /// The parsed clauses in declaration order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Whether `candidate` satisfies every clause.
    pub fn check(&self, candidate: &Version) -> bool {
        self.clauses.iter().all(|c| c.check(candidate))
    }
}

impl FromStr for Constraints {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Decide whether `floor` satisfies the declared `constraint`.
///
/// Fails if either operand is malformed.
pub fn satisfies(floor: &str, constraint: &str) -> Result<bool> {
    let candidate = Version::parse(floor)?;
    let constraints = Constraints::parse(constraint)?;
    Ok(constraints.check(&candidate))
}
