//! Select the latest tag from a tag list.
//!
//! Two policies are provided: [`policy::Alphabetical`] orders raw tag text and
//! [`policy::SemVer`] picks the highest semantic version inside a range. Both
//! accept an optional [`policy::TagPrefixMatcher`] that filters tags by prefix
//! before comparison.
//!
//! ```
//! use tag_policy::policy::{SemVer, TagPolicy, TagPrefixMatcher};
//!
//! let policy = SemVer::new("1.0.x").unwrap();
//! let tags = vec!["dev-v1.0.2".to_string(), "dev-v1.0.0".to_string(), "v1.1.0".to_string()];
//! let matcher = TagPrefixMatcher {
//!     include: vec!["dev-".to_string()],
//!     exclude: vec![],
//!     trim: true,
//! };
//!
//! assert_eq!(policy.latest(&tags, Some(&matcher)).unwrap(), "dev-v1.0.2");
//! ```

pub mod config;
pub mod policy;
