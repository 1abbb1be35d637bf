//! Prefix-based tag filtering shared by all policies

use serde::Deserialize;

/// Include/exclude prefix rules applied to a tag list before comparison
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TagPrefixMatcher {
    /// Prefixes a tag must start with; empty accepts every tag
    pub include: Vec<String>,
    /// Prefixes that reject a tag, even when it also matches `include`
    pub exclude: Vec<String>,
    /// Strip matched include prefixes before parsing the tag as a version
    pub trim: bool,
}

impl TagPrefixMatcher {
    /// Keep tags passing this matcher's include and exclude rules
    pub fn filter<'a>(&self, tags: &'a [String]) -> Vec<&'a str> {
        prefix_match_filter(tags, &self.include, &self.exclude)
    }

    /// Strip every include prefix the tag starts with, in include order.
    ///
    /// Returns the tag unchanged when `trim` is off.
    pub fn trim_tag<'a>(&self, tag: &'a str) -> &'a str {
        if !self.trim {
            return tag;
        }
        self.include
            .iter()
            .fold(tag, |acc, prefix| acc.strip_prefix(prefix.as_str()).unwrap_or(acc))
    }
}

/// Filter `list` down to the items surviving the include and exclude prefix rules.
///
/// Input order is preserved. An item matching both lists is dropped.
pub fn prefix_match_filter<'a, S: AsRef<str>>(
    list: &'a [S],
    include: &[String],
    exclude: &[String],
) -> Vec<&'a str> {
    list.iter()
        .map(AsRef::as_ref)
        .filter(|item| include.is_empty() || include.iter().any(|p| item.starts_with(p.as_str())))
        .filter(|item| !exclude.iter().any(|p| item.starts_with(p.as_str())))
        .collect()
}
