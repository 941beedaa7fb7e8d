//! Tolerant semantic-version parsing.
//!
//! Upstream listings mix strict `MAJOR.MINOR.PATCH` strings with shortened
//! forms such as `16`, `4.3` or `16.04`. Missing components are padded with
//! zero and leading zeros dropped before handing the string to
//! [`semver::Version::parse`].

use semver::Version;

/// The version alias that always resolves to the newest release.
pub const LATEST: &str = "latest";

/// Parse a version string, padding a missing minor or patch component.
///
/// Accepts an optional leading `v`. Purely numeric versions may carry
/// leading zeros (`16.04` is `16.4.0`). Pre-release and build metadata are
/// only recognised on full three-component versions.
pub fn parse_version(input: &str) -> Result<Version, semver::Error> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

    if let Ok(version) = Version::parse(trimmed) {
        return Ok(version);
    }

    let numeric = !trimmed.is_empty()
        && trimmed
            .split('.')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));

    let parts: Vec<&str> = trimmed.split('.').collect();
    if !numeric || parts.len() > 3 {
        return Version::parse(trimmed);
    }

    let mut components: Vec<&str> = parts
        .iter()
        .map(|part| match part.trim_start_matches('0') {
            "" => "0",
            stripped => stripped,
        })
        .collect();
    components.resize(3, "0");

    Version::parse(&components.join("."))
}

/// Strip pre-release and build metadata, keeping `major.minor.patch`.
pub fn release_core(version: &Version) -> Version {
    Version::new(version.major, version.minor, version.patch)
}

/// Whether the string is the `latest` alias.
pub fn is_latest(input: &str) -> bool {
    input.trim() == LATEST
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_version() {
        assert_eq!(parse_version("16.0.0").unwrap(), Version::new(16, 0, 0));
        assert_eq!(parse_version(" 4.3.2 ").unwrap(), Version::new(4, 3, 2));
    }

    #[test]
    fn test_parse_pads_short_versions() {
        assert_eq!(parse_version("16").unwrap(), Version::new(16, 0, 0));
        assert_eq!(parse_version("16.1").unwrap(), Version::new(16, 1, 0));
    }

    #[test]
    fn test_parse_leading_zeros() {
        assert_eq!(parse_version("16.04").unwrap(), Version::new(16, 4, 0));
        assert_eq!(parse_version("16.04.1").unwrap(), Version::new(16, 4, 1));
        assert_eq!(parse_version("007").unwrap(), Version::new(7, 0, 0));
        assert_eq!(parse_version("1.00.0").unwrap(), Version::new(1, 0, 0));
        assert!(parse_version("16.04-rc.1").is_err());
    }

    #[test]
    fn test_parse_leading_v() {
        assert_eq!(parse_version("v21.3.1").unwrap(), Version::new(21, 3, 1));
    }

    #[test]
    fn test_parse_prerelease() {
        let v = parse_version("14.15.6-rc.1").unwrap();
        assert_eq!(release_core(&v), Version::new(14, 15, 6));
        assert!(!v.pre.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_version("").is_err());
        assert!(parse_version("latest").is_err());
        assert!(parse_version("1..2").is_err());
        assert!(parse_version("one.two.three").is_err());
        assert!(parse_version("1.2.3.4").is_err());
    }

    #[test]
    fn test_is_latest() {
        assert!(is_latest("latest"));
        assert!(!is_latest("16.0.0"));
    }
}
