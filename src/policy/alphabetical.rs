//! Alphabetical policy
//!
//! Orders raw tag text byte-wise. Useful for CalVer, timestamps and release
//! code names where the tag itself sorts naturally.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::policy::error::PolicyError;
use crate::policy::filter::TagPrefixMatcher;
use crate::policy::TagPolicy;

/// Ascending order: the lexicographically greatest tag is the latest
pub const ALPHABETICAL_ORDER_ASC: &str = "asc";
/// Descending order: the lexicographically smallest tag is the latest
pub const ALPHABETICAL_ORDER_DESC: &str = "desc";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | ALPHABETICAL_ORDER_ASC => Ok(SortOrder::Ascending),
            ALPHABETICAL_ORDER_DESC => Ok(SortOrder::Descending),
            other => Err(PolicyError::InvalidOrder(other.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => f.write_str(ALPHABETICAL_ORDER_ASC),
            SortOrder::Descending => f.write_str(ALPHABETICAL_ORDER_DESC),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Alphabetical {
    order: SortOrder,
}

impl Alphabetical {
    /// Build a policy from an order string; empty means ascending
    pub fn new(order: &str) -> Result<Self, PolicyError> {
        Ok(Self {
            order: order.parse()?,
        })
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }
}

impl TagPolicy for Alphabetical {
    fn latest(
        &self,
        versions: &[String],
        matcher: Option<&TagPrefixMatcher>,
    ) -> Result<String, PolicyError> {
        if versions.is_empty() {
            return Err(PolicyError::EmptyInput);
        }

        // trimming never applies here: the raw tag is what gets ordered
        let candidates: Vec<&str> = match matcher {
            Some(matcher) => matcher.filter(versions),
            None => versions.iter().map(String::as_str).collect(),
        };

        let latest = match self.order {
            SortOrder::Ascending => candidates.into_iter().max(),
            SortOrder::Descending => candidates.into_iter().min(),
        }
        .ok_or(PolicyError::NoMatch)?;

        debug!(tag = latest, order = %self.order, "selected latest tag");
        Ok(latest.to_string())
    }
}
