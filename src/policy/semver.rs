//! Semver range policy
//!
//! Picks the highest tag that parses as a semantic version and satisfies the
//! configured range. Tags that are not versions are skipped, not rejected.

use semver::Version;
use tracing::debug;

use crate::policy::constraint::Constraint;
use crate::policy::error::PolicyError;
use crate::policy::filter::TagPrefixMatcher;
use crate::policy::version::{cmp_precedence, parse_tag_version};
use crate::policy::TagPolicy;

#[derive(Debug, Clone)]
pub struct SemVer {
    range: String,
    constraint: Constraint,
}

impl SemVer {
    /// Build a policy from a range expression, validating it up front
    pub fn new(range: &str) -> Result<Self, PolicyError> {
        let constraint = Constraint::parse(range)?;
        Ok(Self {
            range: range.to_string(),
            constraint,
        })
    }

    /// The range expression this policy was built from
    pub fn range(&self) -> &str {
        &self.range
    }
}

impl TagPolicy for SemVer {
    fn latest(
        &self,
        versions: &[String],
        matcher: Option<&TagPrefixMatcher>,
    ) -> Result<String, PolicyError> {
        if versions.is_empty() {
            return Err(PolicyError::EmptyInput);
        }

        let candidates: Vec<&str> = match matcher {
            Some(matcher) => matcher.filter(versions),
            None => versions.iter().map(String::as_str).collect(),
        };

        // (version, trimmed text, original tag) of the current winner
        let mut latest: Option<(Version, &str, &str)> = None;
        for tag in candidates {
            let processed = matcher.map_or(tag, |m| m.trim_tag(tag));
            let Some(version) = parse_tag_version(processed) else {
                debug!(tag, "skipping tag that is not a semantic version");
                continue;
            };

            if !self.constraint.matches(&version) {
                continue;
            }

            if let Some((best, best_processed, best_tag)) = latest.as_mut() {
                if cmp_precedence(&version, best).is_le() {
                    // a later tag trimming to the winner's exact text takes its place
                    if processed == *best_processed {
                        *best_tag = tag;
                    }
                    continue;
                }
            }
            latest = Some((version, processed, tag));
        }

        let (_, _, tag) = latest.ok_or(PolicyError::NoMatch)?;
        debug!(tag, range = %self.range, "selected latest tag");
        Ok(tag.to_string())
    }
}
