//! Three-component bound arithmetic shared by the dialect compilers
//!
//! Bounds are plain `major.minor.patch` strings. Components are read
//! leniently: anything after `-` or `+` is dropped, each dotted part
//! contributes its leading digits (or 0), and missing parts are 0.

/// Loosely read up to three numeric components
pub fn triple(version: &str) -> [u64; 3] {
    let release = version
        .split(['-', '+'])
        .next()
        .unwrap_or_default();

    let mut nums = [0u64; 3];
    for (slot, part) in nums.iter_mut().zip(release.split('.')) {
        let digits_end = part
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(part.len());
        *slot = part[..digits_end].parse().unwrap_or(0);
    }
    nums
}

/// Pad or truncate a version to `major.minor.patch`
pub fn ensure_three(version: &str) -> String {
    let [major, minor, patch] = triple(version);
    format!("{major}.{minor}.{patch}")
}

pub fn next_major(version: &str) -> String {
    let [major, ..] = triple(version);
    format!("{}.0.0", major.saturating_add(1))
}

pub fn next_minor(version: &str) -> String {
    let [major, minor, _] = triple(version);
    format!("{major}.{}.0", minor.saturating_add(1))
}

pub fn next_patch(version: &str) -> String {
    let [major, minor, patch] = triple(version);
    format!("{major}.{minor}.{}", patch.saturating_add(1))
}

/// Number of dotted components written in the release part
pub fn component_count(version: &str) -> usize {
    version
        .split(['-', '+'])
        .next()
        .map(|release| release.split('.').count())
        .unwrap_or(0)
}

/// Only ASCII digits and dots, and at least one digit
pub fn is_numeric_version(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit()) && s.chars().all(|c| c == '.' || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", "1.0.0")]
    #[case("1.2", "1.2.0")]
    #[case("1.2.3", "1.2.3")]
    #[case("1.2.3.4", "1.2.3")]
    #[case("1.2.3-beta.1", "1.2.3")]
    #[case("1.2.3+build", "1.2.3")]
    #[case("1.2rc1", "1.2.0")]
    #[case("x.y", "0.0.0")]
    #[case("", "0.0.0")]
    fn ensure_three_pads_and_truncates(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(ensure_three(input), expected);
    }

    #[rstest]
    #[case("1.2.3", "2.0.0", "1.3.0", "1.2.4")]
    #[case("0.0.0", "1.0.0", "0.1.0", "0.0.1")]
    #[case("4", "5.0.0", "4.1.0", "4.0.1")]
    fn increments(
        #[case] input: &str,
        #[case] major: &str,
        #[case] minor: &str,
        #[case] patch: &str,
    ) {
        assert_eq!(next_major(input), major);
        assert_eq!(next_minor(input), minor);
        assert_eq!(next_patch(input), patch);
    }

    #[test]
    fn increment_saturates_instead_of_overflowing() {
        let max = format!("{}.0.0", u64::MAX);
        assert_eq!(next_major(&max), max);
    }

    #[rstest]
    #[case("1", 1)]
    #[case("1.4", 2)]
    #[case("1.4.5", 3)]
    #[case("1.4.5.6-rc.1", 4)]
    fn counts_release_components(#[case] input: &str, #[case] expected: usize) {
        assert_eq!(component_count(input), expected);
    }

    #[rstest]
    #[case("1.0", true)]
    #[case("10", true)]
    #[case("1.0-beta", false)]
    #[case(".", false)]
    #[case("", false)]
    fn numeric_version_check(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_numeric_version(input), expected);
    }
}
