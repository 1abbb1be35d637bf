use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::policy::{
    Alphabetical, ConfigError, Policy, PolicyError, SemVer, TagPolicy, TagPrefixMatcher,
};

/// Policy configuration document
///
/// ```json
/// {
///   "policy": { "semver": { "range": "^1.0" } },
///   "filterTags": { "include": ["v"], "trim": true }
/// }
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfig {
    pub policy: PolicyChoice,
    #[serde(default)]
    pub filter_tags: Option<TagPrefixMatcher>,
}

/// Exactly one policy kind must be set
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PolicyChoice {
    pub semver: Option<SemVerPolicyConfig>,
    pub alphabetical: Option<AlphabeticalPolicyConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SemVerPolicyConfig {
    pub range: String,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AlphabeticalPolicyConfig {
    /// `asc` or `desc`; empty means ascending
    pub order: String,
}

impl PolicyChoice {
    /// Build and validate the chosen policy
    pub fn build(&self) -> Result<Policy, PolicyError> {
        match (&self.semver, &self.alphabetical) {
            (Some(semver), None) => SemVer::new(&semver.range).map(Policy::from),
            (None, Some(alphabetical)) => Alphabetical::new(&alphabetical.order).map(Policy::from),
            (None, None) => Err(PolicyError::InvalidChoice(
                "one of semver or alphabetical must be set".to_string(),
            )),
            (Some(_), Some(_)) => Err(PolicyError::InvalidChoice(
                "only one of semver or alphabetical may be set".to_string(),
            )),
        }
    }
}

impl TryFrom<&PolicyChoice> for Policy {
    type Error = PolicyError;

    fn try_from(choice: &PolicyChoice) -> Result<Self, Self::Error> {
        choice.build()
    }
}

impl PolicyConfig {
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Build the configured policy and select the latest of `tags`
    pub fn evaluate(&self, tags: &[String]) -> Result<String, PolicyError> {
        self.policy.build()?.latest(tags, self.filter_tags.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn policy_config_from_semver_object_parses_all_fields() {
        let result = serde_json::from_value::<PolicyConfig>(json!({
            "policy": {
                "semver": { "range": "1.0.x" }
            },
            "filterTags": {
                "include": ["dev-"],
                "exclude": ["dev-old"],
                "trim": true
            }
        }))
        .unwrap();

        assert_eq!(
            result,
            PolicyConfig {
                policy: PolicyChoice {
                    semver: Some(SemVerPolicyConfig {
                        range: "1.0.x".to_string()
                    }),
                    alphabetical: None,
                },
                filter_tags: Some(TagPrefixMatcher {
                    include: vec!["dev-".to_string()],
                    exclude: vec!["dev-old".to_string()],
                    trim: true,
                }),
            }
        );
    }

    #[test]
    fn policy_config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<PolicyConfig>(json!({
            "policy": { "alphabetical": {} },
            "filterTags": { "include": ["rel-"] }
        }))
        .unwrap();

        assert_eq!(
            result.policy.alphabetical,
            Some(AlphabeticalPolicyConfig::default())
        );
        let matcher = result.filter_tags.unwrap();
        assert!(matcher.exclude.is_empty());
        assert!(!matcher.trim);
    }

    #[test]
    fn semver_choice_requires_range() {
        let result = serde_json::from_value::<PolicyConfig>(json!({
            "policy": { "semver": {} }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn build_rejects_missing_and_conflicting_choices() {
        let none = PolicyChoice::default();
        assert!(matches!(none.build(), Err(PolicyError::InvalidChoice(_))));

        let both = PolicyChoice {
            semver: Some(SemVerPolicyConfig {
                range: "^1.0".to_string(),
            }),
            alphabetical: Some(AlphabeticalPolicyConfig::default()),
        };
        assert!(matches!(both.build(), Err(PolicyError::InvalidChoice(_))));
    }

    #[test]
    fn build_propagates_invalid_configuration() {
        let choice = PolicyChoice {
            alphabetical: Some(AlphabeticalPolicyConfig {
                order: "sideways".to_string(),
            }),
            ..Default::default()
        };
        assert_eq!(
            Policy::try_from(&choice).unwrap_err(),
            PolicyError::InvalidOrder("sideways".to_string())
        );
    }

    #[test]
    fn evaluate_applies_filter_tags() {
        let config = PolicyConfig::from_json_str(
            r#"{
                "policy": { "semver": { "range": "1.0.x" } },
                "filterTags": { "include": ["dev-"], "trim": true }
            }"#,
        )
        .unwrap();
        let tags: Vec<String> = ["ver1.0.3", "dev-v1.0.2", "dev-v1.0.0"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(config.evaluate(&tags).unwrap(), "dev-v1.0.2");
    }

    #[test]
    fn from_json_str_reports_malformed_json() {
        let err = PolicyConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
