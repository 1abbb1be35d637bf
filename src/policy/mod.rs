//! Tag selection policies
//!
//! A policy picks the single "latest" tag from an unordered tag list. Policies
//! are validated when built and are immutable afterwards, so one instance can
//! serve any number of evaluations, from any number of threads.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  tag list   │────▶│   Filter    │────▶│  TagPolicy  │──▶ latest tag
//! │ (caller)    │     │ (prefixes)  │     │  (compare)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                  ┌─────────────┴─────────────┐
//!                                  ▼                           ▼
//!                           ┌─────────────┐             ┌─────────────┐
//!                           │Alphabetical │             │   SemVer    │
//!                           │ (raw text)  │             │(constraint) │
//!                           └─────────────┘             └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`alphabetical`]: Lexicographic ordering, ascending or descending
//! - [`semver`]: Highest semantic version satisfying a range
//! - [`constraint`]: Range expression parser and matcher
//! - [`filter`]: Include/exclude prefix filtering and trimming
//! - [`version`]: Tag-to-version parsing and precedence
//! - [`error`]: Error types for policy construction and evaluation

pub mod alphabetical;
pub mod constraint;
pub mod error;
pub mod filter;
pub mod semver;
pub mod version;

pub use alphabetical::{ALPHABETICAL_ORDER_ASC, ALPHABETICAL_ORDER_DESC, Alphabetical, SortOrder};
pub use constraint::Constraint;
pub use error::{ConfigError, ErrorKind, PolicyError};
pub use filter::{TagPrefixMatcher, prefix_match_filter};
pub use self::semver::SemVer;

/// Trait for picking the latest tag from a list
///
/// Implementations differ only in how they compare tags:
/// - Alphabetical: byte-wise ordering of the raw tag
/// - SemVer: semantic version precedence within a range
pub trait TagPolicy: Send + Sync {
    /// Select the latest tag from `versions`
    ///
    /// When `matcher` is given, tags are first reduced by its include/exclude
    /// prefixes. The returned tag is always one of the input strings, unmodified.
    ///
    /// # Errors
    /// * `PolicyError::EmptyInput` - `versions` is empty
    /// * `PolicyError::NoMatch` - no tag is eligible after filtering
    fn latest(
        &self,
        versions: &[String],
        matcher: Option<&TagPrefixMatcher>,
    ) -> Result<String, PolicyError>;
}

/// A policy selected from configuration
#[derive(Debug, Clone)]
pub enum Policy {
    Alphabetical(Alphabetical),
    SemVer(SemVer),
}

impl TagPolicy for Policy {
    fn latest(
        &self,
        versions: &[String],
        matcher: Option<&TagPrefixMatcher>,
    ) -> Result<String, PolicyError> {
        match self {
            Policy::Alphabetical(policy) => policy.latest(versions, matcher),
            Policy::SemVer(policy) => policy.latest(versions, matcher),
        }
    }
}

impl From<Alphabetical> for Policy {
    fn from(policy: Alphabetical) -> Self {
        Policy::Alphabetical(policy)
    }
}

impl From<SemVer> for Policy {
    fn from(policy: SemVer) -> Self {
        Policy::SemVer(policy)
    }
}
