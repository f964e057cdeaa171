//! Stage alias and weight table
//!
//! Maps informal pre-release spellings (`a`, `cr`, `ga`, ...) onto a canonical
//! stage name and assigns each canonical stage a precedence weight.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Weight of stages missing from [`STAGE_WEIGHTS`]; sits between `rc` and `stable`
pub const DEFAULT_STAGE_WEIGHT: u32 = 70;

/// Known spellings and the canonical stage they stand for
static STAGE_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("a", "alpha"),
        ("alpha", "alpha"),
        ("b", "beta"),
        ("beta", "beta"),
        ("gamma", "gamma"),
        ("chi", "chi"),
        ("rc", "rc"),
        ("cr", "rc"),
        ("m", "m"),
        ("milestone", "m"),
        ("preview", "preview"),
        ("preview1", "preview"),
        ("preview2", "preview"),
        ("preview3", "preview"),
        ("pre", "pre"),
        ("prerelease", "pre"),
        ("final", "final"),
        ("ga", "final"),
        ("release", "release"),
        ("stable", "stable"),
        ("rtm", "rtm"),
        ("snapshot", "snapshot"),
        ("nightly", "nightly"),
        ("insiders", "insiders"),
        ("candidate", "candidate"),
        ("security", "security"),
        ("test", "test"),
        ("esm", "esm"),
        ("canary", "canary"),
        ("next", "next"),
        ("dev", "dev"),
        ("ci", "ci"),
        ("edge", "edge"),
        ("exp", "experimental"),
        ("experimental", "experimental"),
    ])
});

static STAGE_WEIGHTS: LazyLock<HashMap<&'static str, u32>> = LazyLock::new(|| {
    HashMap::from([
        ("alpha", 10),
        ("a", 10),
        ("beta", 20),
        ("b", 20),
        ("preview", 30),
        ("pre", 30),
        ("prerelease", 30),
        ("rc", 40),
        ("release-candidate", 40),
        ("stable", 100),
    ])
});

/// Resolve a stage spelling to its canonical name
///
/// Lookup is case-insensitive; unknown names are returned lower-cased.
pub fn canonical_stage(raw: &str) -> String {
    let lower = raw.to_lowercase();
    match STAGE_ALIASES.get(lower.as_str()) {
        Some(name) => (*name).to_string(),
        None => lower,
    }
}

/// Precedence weight of a stage name (case-insensitive)
pub fn stage_weight(name: &str) -> u32 {
    STAGE_WEIGHTS
        .get(name.to_lowercase().as_str())
        .copied()
        .unwrap_or(DEFAULT_STAGE_WEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a", "alpha")]
    #[case("ALPHA", "alpha")]
    #[case("b", "beta")]
    #[case("cr", "rc")]
    #[case("RC", "rc")]
    #[case("ga", "final")]
    #[case("exp", "experimental")]
    #[case("milestone", "m")]
    #[case("prerelease", "pre")]
    #[case("Weird", "weird")]
    fn canonical_stage_resolves_aliases(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(canonical_stage(raw), expected);
    }

    #[test]
    fn stage_weights_follow_release_progression() {
        let ordered = ["alpha", "beta", "preview", "rc", "snapshot", "stable"];
        for pair in ordered.windows(2) {
            assert!(
                stage_weight(pair[0]) < stage_weight(pair[1]),
                "{} should weigh less than {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn unknown_stage_sits_between_rc_and_stable() {
        let unknown = stage_weight("nightly");
        assert_eq!(unknown, DEFAULT_STAGE_WEIGHT);
        assert!(stage_weight("rc") < unknown);
        assert!(unknown < stage_weight("stable"));
    }

    #[test]
    fn pre_and_preview_share_a_weight() {
        assert_eq!(stage_weight("pre"), stage_weight("preview"));
        assert_eq!(stage_weight("Release-Candidate"), stage_weight("rc"));
    }
}
