//! Semver range constraints
//!
//! Supports the range expressions commonly used for image tags:
//! - `1.2.3`, `=1.2.3` - exact match; partial operands (`1.2`, `1.2.x`) match the whole span
//! - `!=1.2.3` - anything but the operand
//! - `>1.2.3`, `>=1.2.3`, `<1.2.3`, `<=1.2.3` - comparison operators (`=>`, `=<` also accepted)
//! - `~1.2.3` - approximately equivalent (>=1.2.3 <1.3.0)
//! - `^1.2.3` - compatible with version (>=1.2.3 <2.0.0, narrower for 0.x)
//! - `1.2.3 - 2.3` - inclusive hyphen range
//! - `*`, `x` - any release
//! - `>=1.0, <2.0` or `>=1.0 <2.0` - all comparators must match
//! - `^1.0 || ^2.0` - any alternative may match
//!
//! A pre-release version only satisfies a comparator whose operand carries a
//! pre-release itself.

use std::cmp::Ordering;
use std::str::FromStr;

use semver::{BuildMetadata, Prerelease, Version};

use crate::policy::error::PolicyError;
use crate::policy::version::cmp_precedence;

/// Operators ordered so that two-character operators are tried first
const OPERATORS: &[(&str, Op)] = &[
    ("!=", Op::NotEqual),
    (">=", Op::Gte),
    ("=>", Op::Gte),
    ("<=", Op::Lte),
    ("=<", Op::Lte),
    ("~>", Op::Tilde),
    (">", Op::Gt),
    ("<", Op::Lt),
    ("=", Op::Exact),
    ("~", Op::Tilde),
    ("^", Op::Caret),
];

/// A compiled range expression
#[derive(Debug, Clone)]
pub struct Constraint {
    spec: VersionSpec,
}

impl Constraint {
    /// Parse a range expression such as `^1.0` or `>=1.0, <2.0 || 3.x`
    pub fn parse(expr: &str) -> Result<Self, PolicyError> {
        VersionSpec::parse(expr)
            .map(|spec| Self { spec })
            .map_err(|reason| PolicyError::invalid_range(expr, reason))
    }

    /// Check whether a version satisfies this constraint
    pub fn matches(&self, version: &Version) -> bool {
        self.spec.satisfies(version)
    }
}

impl FromStr for Constraint {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Top-level specification: OR of AND groups of single ranges
#[derive(Debug, Clone)]
enum VersionSpec {
    /// Single range (^1.0.0, >=1.0.0, etc.)
    Single(VersionRange),
    /// AND of ranges (>=1.0.0, <2.0.0) - all must satisfy
    And(Vec<VersionSpec>),
    /// OR of specs (^1.0.0 || ^2.0.0) - any must satisfy
    Or(Vec<VersionSpec>),
}

impl VersionSpec {
    fn parse(expr: &str) -> Result<Self, String> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err("empty range expression".to_string());
        }

        // OR has the lowest precedence
        if expr.contains("||") {
            let specs = expr
                .split("||")
                .map(Self::parse_and_or_single)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(VersionSpec::Or(specs));
        }

        Self::parse_and_or_single(expr)
    }

    /// Parse a group that may be a conjunction or a single range
    fn parse_and_or_single(group: &str) -> Result<Self, String> {
        let group = group.trim();
        if group.is_empty() {
            return Err("empty alternative in range expression".to_string());
        }

        let mut ranges = Vec::new();
        for part in group.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(format!("empty comparator in '{group}'"));
            }

            if let Some(range) = VersionRange::parse_hyphen(part)? {
                ranges.push(range);
                continue;
            }

            for token in split_comparators(part)? {
                ranges.push(VersionRange::parse(&token)?);
            }
        }

        if ranges.len() == 1 {
            Ok(VersionSpec::Single(ranges.remove(0)))
        } else {
            Ok(VersionSpec::And(
                ranges.into_iter().map(VersionSpec::Single).collect(),
            ))
        }
    }

    fn satisfies(&self, version: &Version) -> bool {
        match self {
            VersionSpec::Single(range) => range.satisfies(version),
            VersionSpec::And(specs) => specs.iter().all(|s| s.satisfies(version)),
            VersionSpec::Or(specs) => specs.iter().any(|s| s.satisfies(version)),
        }
    }
}

/// Split a whitespace-separated conjunction into comparators, joining
/// operators written apart from their operand (`>= 1.0`).
fn split_comparators(part: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut pending_op: Option<&str> = None;

    for word in part.split_whitespace() {
        let is_bare_op = OPERATORS.iter().any(|(op, _)| *op == word);
        match (pending_op, is_bare_op) {
            (Some(op), true) => return Err(format!("operator '{op}' followed by '{word}'")),
            (Some(op), false) => {
                tokens.push(format!("{op}{word}"));
                pending_op = None;
            }
            (None, true) => pending_op = Some(word),
            (None, false) => tokens.push(word.to_string()),
        }
    }

    if let Some(op) = pending_op {
        return Err(format!("missing version after operator '{op}'"));
    }
    Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Exact,
    NotEqual,
    Gt,
    Gte,
    Lt,
    Lte,
    Tilde,
    Caret,
}

/// A single parsed comparator
#[derive(Debug, Clone)]
enum VersionRange {
    /// Any release: `*` or `x`
    Any,
    /// Exact version, or the whole span of a partial version
    Exact(PartialVersion),
    /// Anything outside `Exact`
    NotEqual(PartialVersion),
    /// Greater than; `>1.2` means `>=1.3.0`
    Gt(PartialVersion),
    /// Greater than or equal
    Gte(PartialVersion),
    /// Less than
    Lt(PartialVersion),
    /// Less than or equal; `<=1.2` means `<1.3.0`
    Lte(PartialVersion),
    /// Tilde range: ~1.2.3 means >=1.2.3 <1.3.0
    Tilde(PartialVersion),
    /// Caret range: ^1.2.3 means >=1.2.3 <2.0.0 (or narrower for 0.x)
    Caret(PartialVersion),
    /// Hyphen range: 1.0.0 - 2.0.0 means >=1.0.0 <=2.0.0
    Hyphen {
        from: PartialVersion,
        to: PartialVersion,
    },
}

impl VersionRange {
    fn parse(token: &str) -> Result<Self, String> {
        let (op, operand) = OPERATORS
            .iter()
            .find_map(|(prefix, op)| token.strip_prefix(prefix).map(|rest| (*op, rest)))
            .unwrap_or((Op::Exact, token));

        let operand = operand.trim();
        if operand.is_empty() {
            return Err(format!("missing version in '{token}'"));
        }

        let Some(version) = PartialVersion::parse(operand)? else {
            return match op {
                Op::Exact | Op::Gte | Op::Lte | Op::Tilde | Op::Caret => Ok(VersionRange::Any),
                _ => Err(format!("wildcard cannot be used in '{token}'")),
            };
        };

        Ok(match op {
            Op::Exact => VersionRange::Exact(version),
            Op::NotEqual => VersionRange::NotEqual(version),
            Op::Gt => VersionRange::Gt(version),
            Op::Gte => VersionRange::Gte(version),
            Op::Lt => VersionRange::Lt(version),
            Op::Lte => VersionRange::Lte(version),
            Op::Tilde => VersionRange::Tilde(version),
            Op::Caret => VersionRange::Caret(version),
        })
    }

    /// Parse hyphen range like "1.0.0 - 2.0.0"
    ///
    /// Returns `Ok(None)` when the comparator is not a hyphen range.
    fn parse_hyphen(part: &str) -> Result<Option<Self>, String> {
        let Some((from, to)) = part.split_once(" - ") else {
            return Ok(None);
        };
        if to.contains(" - ") {
            return Err(format!("multiple hyphen ranges in '{part}'"));
        }

        let endpoint = |text: &str| -> Result<PartialVersion, String> {
            PartialVersion::parse(text.trim())?
                .ok_or_else(|| format!("wildcard cannot bound hyphen range '{part}'"))
        };

        Ok(Some(VersionRange::Hyphen {
            from: endpoint(from)?,
            to: endpoint(to)?,
        }))
    }

    fn allows_prerelease(&self) -> bool {
        match self {
            VersionRange::Any => false,
            VersionRange::Exact(v)
            | VersionRange::NotEqual(v)
            | VersionRange::Gt(v)
            | VersionRange::Gte(v)
            | VersionRange::Lt(v)
            | VersionRange::Lte(v)
            | VersionRange::Tilde(v)
            | VersionRange::Caret(v) => !v.pre.is_empty(),
            VersionRange::Hyphen { from, to } => !from.pre.is_empty() || !to.pre.is_empty(),
        }
    }

    fn satisfies(&self, version: &Version) -> bool {
        if !version.pre.is_empty() && !self.allows_prerelease() {
            return false;
        }

        let cmp = |bound: &Version| cmp_precedence(version, bound);
        match self {
            VersionRange::Any => true,
            VersionRange::Exact(v) => v.contains(version),
            VersionRange::NotEqual(v) => !v.contains(version),
            VersionRange::Gt(v) if v.is_partial() => cmp(&v.span_end()).is_ge(),
            VersionRange::Gt(v) => cmp(&v.floor()).is_gt(),
            VersionRange::Gte(v) => cmp(&v.floor()).is_ge(),
            VersionRange::Lt(v) => cmp(&v.floor()).is_lt(),
            VersionRange::Lte(v) => v.at_or_below(version),
            VersionRange::Tilde(v) => cmp(&v.floor()).is_ge() && cmp(&v.tilde_end()).is_lt(),
            VersionRange::Caret(v) => cmp(&v.floor()).is_ge() && cmp(&v.caret_end()).is_lt(),
            VersionRange::Hyphen { from, to } => {
                cmp(&from.floor()).is_ge() && to.at_or_below(version)
            }
        }
    }
}

/// A constraint operand; `None` components were omitted or wildcarded
#[derive(Debug, Clone, PartialEq, Eq)]
struct PartialVersion {
    major: u64,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

impl PartialVersion {
    /// Parse an operand such as `1`, `v1.2`, `1.2.x` or `1.2.3-rc.1`.
    ///
    /// Returns `Ok(None)` for a bare wildcard (`*`, `x`, `X`).
    fn parse(text: &str) -> Result<Option<Self>, String> {
        let text = text.strip_prefix('v').unwrap_or(text);
        let (core, suffix) = match text.find(['-', '+']) {
            Some(idx) => (&text[..idx], Some(&text[idx..])),
            None => (text, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 3 {
            return Err(format!("too many components in '{text}'"));
        }

        let mut numbers = Vec::with_capacity(3);
        let mut wildcard_seen = false;
        for part in &parts {
            match parse_component(part) {
                Some(Component::Wildcard) => wildcard_seen = true,
                Some(Component::Number(_)) if wildcard_seen => {
                    return Err(format!("number after wildcard in '{text}'"));
                }
                Some(Component::Number(n)) => numbers.push(n),
                None => return Err(format!("invalid version component '{part}' in '{text}'")),
            }
        }

        let Some(&major) = numbers.first() else {
            return match suffix {
                None => Ok(None),
                Some(_) => Err(format!("unexpected suffix on wildcard '{text}'")),
            };
        };

        let pre = match suffix {
            None => Prerelease::EMPTY,
            Some(_) if numbers.len() < 3 => {
                return Err(format!("pre-release or build on partial version '{text}'"));
            }
            // full parse validates the pre-release and build identifiers
            Some(_) => Version::parse(text).map_err(|e| e.to_string())?.pre,
        };

        Ok(Some(Self {
            major,
            minor: numbers.get(1).copied(),
            patch: numbers.get(2).copied(),
            pre,
        }))
    }

    fn is_partial(&self) -> bool {
        self.minor.is_none() || self.patch.is_none()
    }

    /// Lowest version covered by this operand
    fn floor(&self) -> Version {
        Version {
            major: self.major,
            minor: self.minor.unwrap_or(0),
            patch: self.patch.unwrap_or(0),
            pre: self.pre.clone(),
            build: BuildMetadata::EMPTY,
        }
    }

    /// Exclusive upper end of the span a partial operand covers
    fn span_end(&self) -> Version {
        match (self.minor, self.patch) {
            (None, _) => Version::new(self.major.saturating_add(1), 0, 0),
            (Some(minor), None) => Version::new(self.major, minor.saturating_add(1), 0),
            (Some(minor), Some(patch)) => Version::new(self.major, minor, patch.saturating_add(1)),
        }
    }

    fn tilde_end(&self) -> Version {
        match self.minor {
            None => Version::new(self.major.saturating_add(1), 0, 0),
            Some(minor) => Version::new(self.major, minor.saturating_add(1), 0),
        }
    }

    fn caret_end(&self) -> Version {
        match (self.major, self.minor, self.patch) {
            (0, None, _) => Version::new(1, 0, 0),
            (0, Some(0), None) => Version::new(0, 1, 0),
            (0, Some(0), Some(patch)) => Version::new(0, 0, patch.saturating_add(1)),
            (0, Some(minor), _) => Version::new(0, minor.saturating_add(1), 0),
            (major, _, _) => Version::new(major.saturating_add(1), 0, 0),
        }
    }

    /// Whether the version falls inside this operand's span
    fn contains(&self, version: &Version) -> bool {
        if self.is_partial() {
            cmp_precedence(version, &self.floor()).is_ge()
                && cmp_precedence(version, &self.span_end()).is_lt()
        } else {
            cmp_precedence(version, &self.floor()) == Ordering::Equal
        }
    }

    /// `version <= self`, where a partial operand includes its whole span
    fn at_or_below(&self, version: &Version) -> bool {
        if self.is_partial() {
            cmp_precedence(version, &self.span_end()).is_lt()
        } else {
            cmp_precedence(version, &self.floor()).is_le()
        }
    }
}

enum Component {
    Number(u64),
    Wildcard,
}

fn parse_component(part: &str) -> Option<Component> {
    match part {
        "x" | "X" | "*" => Some(Component::Wildcard),
        _ if !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) => {
            part.parse().ok().map(Component::Number)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn version(v: &str) -> Version {
        Version::parse(v).unwrap()
    }

    #[rstest]
    #[case("1.0.x")]
    #[case("^1.0")]
    #[case("=1.0.0")]
    #[case("~1.0")]
    #[case(">=1.0")]
    #[case(">0,<2.0")]
    #[case("*")]
    #[case("v1.2.3")]
    #[case(">= 1.0 < 2.0")]
    #[case("1.2 - 1.4.5")]
    #[case("^1.0 || ^2.0")]
    #[case("~>1.2")]
    #[case(">=1.0.0-alpha")]
    fn parse_accepts_valid_ranges(#[case] expr: &str) {
        assert!(Constraint::parse(expr).is_ok(), "expected '{expr}' to parse");
    }

    #[rstest]
    #[case("1.0.0p")]
    #[case("1x")]
    #[case("x1")]
    #[case("-1")]
    #[case("a")]
    #[case("")]
    #[case("   ")]
    #[case("1.2.3.4")]
    #[case("1.x.3")]
    #[case(">")]
    #[case(">= <2.0")]
    #[case("^1.0 ||")]
    #[case(">1.0,")]
    #[case(">*")]
    #[case("1.2-beta")]
    fn parse_rejects_invalid_ranges(#[case] expr: &str) {
        let err = Constraint::parse(expr).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidRange { .. }));
    }

    #[rstest]
    // exact and wildcard spans
    #[case("1.2.3", "1.2.3", true)]
    #[case("1.2.3", "1.2.4", false)]
    #[case("=1.2.3", "1.2.3+build", true)]
    #[case("1.0.x", "1.0.9", true)]
    #[case("1.0.x", "1.1.0", false)]
    #[case("1.2", "1.2.7", true)]
    #[case("1", "1.9.0", true)]
    #[case("1", "2.0.0", false)]
    #[case("*", "42.0.0", true)]
    #[case("!=1.2.3", "1.2.3", false)]
    #[case("!=1.2", "1.3.0", true)]
    // comparisons
    #[case(">1.0.0", "1.0.1", true)]
    #[case(">1.0.0", "1.0.0", false)]
    #[case(">1.2", "1.2.9", false)]
    #[case(">1.2", "1.3.0", true)]
    #[case(">=1.0", "1.0.0", true)]
    #[case("<2.0", "1.99.99", true)]
    #[case("<2.0", "2.0.0", false)]
    #[case("<=1.2", "1.2.9", true)]
    #[case("<=1.2.3", "1.2.4", false)]
    #[case(">0,<2.0", "1.5.0", true)]
    #[case(">0,<2.0", "0.5.0", false)]
    #[case(">0,<2.0", "0.0.0", false)]
    #[case(">= 1.0 < 2.0", "2.0.0", false)]
    // tilde
    #[case("~1.2.3", "1.2.9", true)]
    #[case("~1.2.3", "1.3.0", false)]
    #[case("~1.0", "1.0.5", true)]
    #[case("~1", "1.9.0", true)]
    #[case("~1", "2.0.0", false)]
    // caret
    #[case("^1.2.3", "1.9.9", true)]
    #[case("^1.2.3", "2.0.0", false)]
    #[case("^1.2.3", "1.2.2", false)]
    #[case("^0.2.3", "0.2.9", true)]
    #[case("^0.2.3", "0.3.0", false)]
    #[case("^0.0.3", "0.0.3", true)]
    #[case("^0.0.3", "0.0.4", false)]
    #[case("^0.0", "0.0.9", true)]
    #[case("^0.0", "0.1.0", false)]
    #[case("^0", "0.9.0", true)]
    #[case("^0", "1.0.0", false)]
    // hyphen and disjunction
    #[case("1.2 - 1.4.5", "1.2.0", true)]
    #[case("1.2 - 1.4.5", "1.4.5", true)]
    #[case("1.2 - 1.4.5", "1.4.6", false)]
    #[case("1.0 - 2", "2.9.0", true)]
    #[case("^1.0 || ^3.0", "3.1.0", true)]
    #[case("^1.0 || ^3.0", "2.1.0", false)]
    // pre-releases only match operands carrying a pre-release
    #[case("^1.0", "1.1.0-rc.1", false)]
    #[case("*", "1.0.0-alpha", false)]
    #[case(">=1.0.0-alpha", "1.0.0-beta", true)]
    #[case(">=1.0.0-alpha", "1.0.0", true)]
    #[case("~1.2.3-beta.2", "1.2.3-beta.4", true)]
    fn matches_returns_expected(#[case] expr: &str, #[case] v: &str, #[case] expected: bool) {
        let constraint: Constraint = expr.parse().unwrap();
        assert_eq!(
            constraint.matches(&version(v)),
            expected,
            "'{v}' against '{expr}'"
        );
    }

    #[test]
    fn chained_hyphen_ranges_are_rejected() {
        let err = Constraint::parse("1.2.3 - 4.5.6 - 7").unwrap_err();
        assert_eq!(
            err,
            PolicyError::InvalidRange {
                range: "1.2.3 - 4.5.6 - 7".to_string(),
                reason: "multiple hyphen ranges in '1.2.3 - 4.5.6 - 7'".to_string(),
            }
        );
    }

    #[test]
    fn invalid_range_error_carries_expression() {
        let err = Constraint::parse("1.0.0p").unwrap_err();
        assert_eq!(
            err,
            PolicyError::InvalidRange {
                range: "1.0.0p".to_string(),
                reason: "invalid version component '0p' in '1.0.0p'".to_string(),
            }
        );
    }
}
