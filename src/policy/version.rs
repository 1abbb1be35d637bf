use std::cmp::Ordering;

use semver::Version;

/// Parse a tag as a strict semantic version.
///
/// A single leading `v` is tolerated. Partial versions ("1.2") and extra
/// components ("1.0.0.1") are rejected.
///
/// Examples:
/// - "1.2.3" -> Some(Version(1, 2, 3))
/// - "v1.2.3-rc.1" -> Some(Version(1, 2, 3, rc.1))
/// - "1.0.0p" -> None
pub fn parse_tag_version(tag: &str) -> Option<Version> {
    let stripped = tag.strip_prefix('v').unwrap_or(tag);
    Version::parse(stripped).ok()
}

/// Compare two versions by semver precedence, ignoring build metadata.
pub fn cmp_precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.3", Some("1.2.3"))]
    #[case("v1.2.3", Some("1.2.3"))]
    #[case("v1.0.0-rc.1+build.5", Some("1.0.0-rc.1+build.5"))]
    #[case("1.0.0.1", None)]
    #[case("1.0.0p", None)]
    #[case("1.2", None)]
    #[case("vv1.2.3", None)]
    #[case("b1.0.0", None)]
    #[case("01.2.3", None)]
    #[case("", None)]
    fn parse_tag_version_returns_expected(#[case] tag: &str, #[case] expected: Option<&str>) {
        assert_eq!(
            parse_tag_version(tag),
            expected.map(|v| Version::parse(v).unwrap())
        );
    }

    #[rstest]
    #[case("1.0.0", "2.0.0", Ordering::Less)]
    #[case("1.10.0", "1.9.0", Ordering::Greater)]
    #[case("1.0.0-alpha", "1.0.0", Ordering::Less)]
    #[case("1.0.0-alpha.2", "1.0.0-alpha.10", Ordering::Less)]
    #[case("1.0.0-beta", "1.0.0-alpha.1", Ordering::Greater)]
    #[case("1.0.0+build.1", "1.0.0+build.2", Ordering::Equal)]
    fn cmp_precedence_follows_semver_rules(
        #[case] a: &str,
        #[case] b: &str,
        #[case] expected: Ordering,
    ) {
        let a = Version::parse(a).unwrap();
        let b = Version::parse(b).unwrap();
        assert_eq!(cmp_precedence(&a, &b), expected);
    }
}
