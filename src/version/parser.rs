//! Best-effort parser for free-form version strings
//!
//! Never fails: input without a recognizable numeric core becomes a
//! [`Core::Unparsed`] value that keeps the whole string as its prefix.
//!
//! Pipeline:
//! 1. strip quotes, whitespace and known junk sequences
//! 2. locate the core (`1.2`, `1.2.3`, `1.2.3.4`, or a lone `v3` / `3`)
//! 3. split the rest at the first `+` into pre-release and build segments
//! 4. pull `git describe` suffixes (`-N-g<hash>`, `-g<hash>`) out of both
//! 5. classify the remaining tokens (timestamp, hash, number, stage, opaque)
//! 6. re-derive the canonical string

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, SecondsFormat};
use regex::Regex;
use tracing::debug;

use crate::version::stage::canonical_stage;
use crate::version::types::{
    CommitHashInfo, Core, MetadataTag, Revision, Segment, StageTag, StructuredVersion,
    TimestampInfo,
};

/// Literal sequences that leak into version fields from scraped HTML/JSON
const JUNK_SEQUENCES: &[&str] = &[r"\u003cbr\u003e", "<br>"];

static CORE_DOTTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+(?:\.\d+){0,2}").unwrap());

static DESCRIBE_WITH_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-([0-9]+)-g([0-9a-f]{7,40})").unwrap());

static DESCRIBE_HASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-g([0-9a-f]{7,40})").unwrap());

static TIMESTAMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{14}|\d{8})$").unwrap());

static HEX_COMMIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[0-9a-f]{7,40}$").unwrap());

/// Parse a raw version string into its structured form
pub fn parse(raw: &str) -> StructuredVersion {
    let cleaned = remove_noise(raw);

    let Some((start, end)) = find_core(&cleaned) else {
        debug!("No version core found in {:?}", raw);
        return StructuredVersion::blank(raw, &cleaned);
    };
    let end = start + core_without_stamp(&cleaned[start..end]).len();

    let mut version = StructuredVersion::blank(raw, &cleaned[..start]);
    let numbers = parse_core_numbers(&cleaned[start..end]);
    let component = |i: usize| numbers.get(i).copied().unwrap_or(0);
    version.core = Core::Parsed {
        major: component(0),
        minor: component(1),
        patch: component(2),
    };
    version.revision = numbers.get(3).copied().map(Revision::Core);

    let rest = &cleaned[end..];
    let (pre, build) = match rest.split_once('+') {
        Some((pre, build)) => (pre, build),
        None => (rest, ""),
    };

    let pre = pre.trim_start_matches([' ', '.', '_']);
    if !pre.is_empty() {
        let pre = extract_describe(pre, Segment::PreRelease, &mut version.commit_hashes);
        classify_pre_release(&pre, &mut version);
    }

    if !build.is_empty() {
        let build = extract_describe(build, Segment::Build, &mut version.commit_hashes);
        classify_build(&build, &mut version);
    }

    version.canonical = render_canonical(&version);
    version
}

/// Parse every string of a list, keeping order
pub fn parse_all<S: AsRef<str>>(raws: &[S]) -> Vec<StructuredVersion> {
    raws.iter().map(|raw| parse(raw.as_ref())).collect()
}

fn remove_noise(raw: &str) -> String {
    let mut s = raw
        .trim_matches([' ', '\t', '\r', '\n', '"', '\''])
        .to_string();
    for junk in JUNK_SEQUENCES {
        s = s.replace(junk, "");
    }
    s.trim().to_string()
}

/// Byte range of the version core: a dotted run first, then a lone `v?\d+`
fn find_core(s: &str) -> Option<(usize, usize)> {
    if let Some(m) = CORE_DOTTED_RE.find(s) {
        return Some((m.start(), m.end()));
    }

    let bytes = s.as_bytes();
    (0..bytes.len()).find_map(|i| {
        let mut j = i;
        if matches!(bytes[j], b'v' | b'V') {
            j += 1;
        }
        let digits_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        (j > digits_start).then_some((i, j))
    })
}

/// Drop a fourth component that reads as a timestamp or commit hash
///
/// `1.2.3.20201221` is a dated build of 1.2.3, so the stamp is left for
/// pre-release classification instead of becoming the revision.
fn core_without_stamp(core: &str) -> &str {
    match core.match_indices('.').nth(2) {
        Some((dot, _)) if is_stamp(&core[dot + 1..]) => &core[..dot],
        _ => core,
    }
}

fn is_stamp(token: &str) -> bool {
    TIMESTAMP_RE.is_match(token) || HEX_COMMIT_RE.is_match(token)
}

/// Up to four leading numeric components; stops at the first that overflows
fn parse_core_numbers(core: &str) -> Vec<u64> {
    let core = core.trim_start_matches(['v', 'V']);
    core.split('.')
        .take(4)
        .map_while(|part| part.parse::<u64>().ok())
        .collect()
}

/// Remove `git describe` suffixes from a segment, recording them in encounter order
fn extract_describe(segment: &str, origin: Segment, hashes: &mut Vec<CommitHashInfo>) -> String {
    for caps in DESCRIBE_WITH_COUNT_RE.captures_iter(segment) {
        hashes.push(CommitHashInfo {
            original: format!("g{}", &caps[2]),
            parsed: caps[2].to_string(),
            origin,
            commits_since_tag: caps[1].parse().ok(),
        });
    }
    let segment = DESCRIBE_WITH_COUNT_RE.replace_all(segment, "");

    for caps in DESCRIBE_HASH_RE.captures_iter(&segment) {
        hashes.push(CommitHashInfo {
            original: format!("g{}", &caps[1]),
            parsed: caps[1].to_string(),
            origin,
            commits_since_tag: None,
        });
    }
    DESCRIBE_HASH_RE.replace_all(&segment, "").into_owned()
}

fn split_tokens(s: &str) -> Vec<&str> {
    s.split(['-', '.', '_', ' '])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// What a single pre-release token looks like, decided in priority order
#[derive(Debug, PartialEq, Eq)]
enum TokenKind<'a> {
    Timestamp,
    CommitHash,
    Number(u64),
    /// Alphabetic head plus a numeric tail (`alpha10`)
    TaggedStage(&'a str, u64),
    /// Alphabetic head; `rest` is whatever follows it
    Stage { name: &'a str, rest: &'a str },
    Opaque,
}

fn classify(token: &str) -> TokenKind<'_> {
    if TIMESTAMP_RE.is_match(token) {
        return TokenKind::Timestamp;
    }
    if HEX_COMMIT_RE.is_match(token) {
        return TokenKind::CommitHash;
    }
    if token.bytes().all(|b| b.is_ascii_digit()) {
        return match token.parse() {
            Ok(n) => TokenKind::Number(n),
            Err(_) => TokenKind::Opaque,
        };
    }

    let digits_at = token.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let (head, tail) = token.split_at(digits_at);
    if !tail.is_empty() && !head.is_empty() && head.chars().all(char::is_alphabetic) {
        if HEX_COMMIT_RE.is_match(head) {
            return TokenKind::Opaque;
        }
        return match tail.parse() {
            Ok(n) => TokenKind::TaggedStage(head, n),
            Err(_) => TokenKind::Stage {
                name: head,
                rest: tail,
            },
        };
    }

    let alpha_len: usize = token
        .chars()
        .take_while(|c| c.is_alphabetic())
        .map(char::len_utf8)
        .sum();
    if alpha_len > 0 {
        let (name, rest) = token.split_at(alpha_len);
        if HEX_COMMIT_RE.is_match(name) {
            return TokenKind::Opaque;
        }
        return TokenKind::Stage { name, rest };
    }

    TokenKind::Opaque
}

fn classify_pre_release(pre: &str, version: &mut StructuredVersion) {
    let tokens = split_tokens(pre);
    let last = tokens.len().saturating_sub(1);

    for (i, &token) in tokens.iter().enumerate() {
        match classify(token) {
            TokenKind::Timestamp => version.timestamps.push(timestamp_info(token)),
            TokenKind::CommitHash => version.commit_hashes.push(bare_hash(token, Segment::PreRelease)),
            TokenKind::Number(n) => {
                if i == 0 && version.stages.is_empty() && version.revision.is_none() {
                    version.revision = Some(Revision::PreRelease(n));
                } else if let Some(stage) = version.stages.last_mut().filter(|s| s.tag == 0) {
                    stage.tag = n;
                } else if i == last && version.extra.is_none() {
                    version.extra = Some(n);
                } else {
                    push_metadata(version, token, Segment::PreRelease);
                }
            }
            TokenKind::TaggedStage(name, tag) => {
                version.stages.push(StageTag::new(canonical_stage(name), tag));
            }
            TokenKind::Stage { name, rest } => {
                version.stages.push(StageTag::new(canonical_stage(name), 0));
                if rest.is_empty() {
                    continue;
                }
                match rest.parse::<u64>() {
                    Ok(tag) if rest.bytes().all(|b| b.is_ascii_digit()) => {
                        if let Some(stage) = version.stages.last_mut() {
                            stage.tag = tag;
                        }
                    }
                    _ => push_metadata(version, rest, Segment::PreRelease),
                }
            }
            TokenKind::Opaque => push_metadata(version, token, Segment::PreRelease),
        }
    }

    if !tokens.is_empty() && version.revision.is_none() {
        version.revision = Some(Revision::Implied);
    }
}

fn classify_build(build: &str, version: &mut StructuredVersion) {
    for token in split_tokens(build) {
        if TIMESTAMP_RE.is_match(token) {
            version.timestamps.push(timestamp_info(token));
        } else if HEX_COMMIT_RE.is_match(token) {
            version.commit_hashes.push(bare_hash(token, Segment::Build));
        } else {
            push_metadata(version, token, Segment::Build);
        }
    }
}

fn push_metadata(version: &mut StructuredVersion, tag: &str, origin: Segment) {
    version.metadata.push(MetadataTag {
        tag: tag.to_string(),
        origin,
    });
}

fn bare_hash(token: &str, origin: Segment) -> CommitHashInfo {
    CommitHashInfo {
        original: token.to_string(),
        parsed: token.to_string(),
        origin,
        commits_since_tag: None,
    }
}

fn timestamp_info(token: &str) -> TimestampInfo {
    TimestampInfo {
        original: token.to_string(),
        parsed: normalize_timestamp(token),
    }
}

/// `YYYYMMDDHHMMSS` / `YYYYMMDD` as RFC 3339 UTC; impossible dates pass through
fn normalize_timestamp(token: &str) -> String {
    let parsed = if token.len() == 14 {
        NaiveDateTime::parse_from_str(token, "%Y%m%d%H%M%S").ok()
    } else {
        NaiveDate::parse_from_str(token, "%Y%m%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    };

    match parsed {
        Some(datetime) => datetime
            .and_utc()
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        None => {
            debug!("Token {:?} looks like a timestamp but is not a valid date", token);
            token.to_string()
        }
    }
}

fn render_canonical(version: &StructuredVersion) -> String {
    let Core::Parsed {
        major,
        minor,
        patch,
    } = version.core
    else {
        return String::new();
    };

    let mut canonical = format!("{major}.{minor}.{patch}");

    let mut pre: Vec<String> = version.stages.iter().map(render_stage).collect();
    if let (true, Some(revision)) = (pre.is_empty(), version.revision) {
        pre.push(revision.value().to_string());
    }
    if let Some(extra) = version.extra {
        pre.push(extra.to_string());
    }
    if !pre.is_empty() {
        canonical.push('-');
        canonical.push_str(&pre.join("."));
    }

    let build: Vec<&str> = version.build_metadata().collect();
    if !build.is_empty() {
        canonical.push('+');
        canonical.push_str(&build.join("."));
    }

    canonical
}

/// `name.tag`, or `nametag` when the tag alone would read as a timestamp or hash
fn render_stage(stage: &StageTag) -> String {
    match stage.tag {
        0 => stage.name.clone(),
        tag if is_stamp(&tag.to_string()) => format!("{}{}", stage.name, tag),
        tag => format!("{}.{}", stage.name, tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.3", "1.2.3")]
    #[case("v1.2.3", "1.2.3")]
    #[case("1.2", "1.2.0")]
    #[case("v3", "3.0.0")]
    #[case("  \"1.0.0\"  ", "1.0.0")]
    #[case("1.0.0-alpha", "1.0.0-alpha")]
    #[case("1.0.0-a1", "1.0.0-alpha.1")]
    #[case("1.0.0.RC2", "1.0.0-rc.2")]
    #[case("2.0.0-beta.3", "2.0.0-beta.3")]
    #[case("2.0.0-cr1", "2.0.0-rc.1")]
    #[case("1.0.0-1", "1.0.0-1")]
    #[case("1.0.0-1.2", "1.0.0-1.2")]
    #[case("1.2.3.4", "1.2.3-4")]
    #[case("1.0.0-alpha.1.2", "1.0.0-alpha.1.2")]
    #[case("1.0.0+build.5", "1.0.0+build.5")]
    #[case("1.0.0-rc.1+exp.sha", "1.0.0-rc.1+exp.sha")]
    #[case("1.0.0_preview3", "1.0.0-preview.3")]
    #[case("5.0.0\\u003cbr\\u003e", "5.0.0")]
    // stamps never end up as a bare dotted number
    #[case("1.0.0-post20201221", "1.0.0-post20201221")]
    #[case("1.0.0-beta1234567", "1.0.0-beta1234567")]
    #[case("1.2.3.20201221", "1.2.3-0")]
    #[case("1.0.0-FACADED", "1.0.0-0")]
    fn parse_renders_canonical(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(parse(raw).canonical(), expected);
    }

    #[test]
    fn parse_keeps_original_untouched() {
        let raw = "  'v1.2.3-beta'  ";
        assert_eq!(parse(raw).original(), raw);
    }

    #[rstest]
    #[case("v1.2.3", "v")]
    #[case("release-1.4.0", "release-")]
    #[case("go1.21.5", "go")]
    #[case("1.0.0", "")]
    fn parse_keeps_prefix(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(parse(raw).prefix(), expected);
    }

    #[test]
    fn dated_fourth_component_is_a_timestamp() {
        let v = parse("1.2.3.20201221");
        assert_eq!(v.core(), Core::Parsed { major: 1, minor: 2, patch: 3 });
        assert_eq!(v.revision(), Some(Revision::Implied));
        assert_eq!(v.timestamps()[0].parsed, "2020-12-21T00:00:00Z");
    }

    #[test]
    fn large_stage_tag_is_kept() {
        let v = parse("1.0.0-post20201221");
        assert_eq!(v.stages(), &[StageTag::new("post", 20201221)]);
        assert!(v.timestamps().is_empty());
    }

    #[test]
    fn parse_reads_four_component_core() {
        let v = parse("1.2.3.4");
        assert_eq!(v.core(), Core::Parsed { major: 1, minor: 2, patch: 3 });
        assert_eq!(v.revision(), Some(Revision::Core(4)));
    }

    #[test]
    fn parse_without_core_yields_unparsed_value() {
        let v = parse("latest");
        assert!(v.is_unparsed());
        assert_eq!(v.prefix(), "latest");
        assert_eq!(v.major(), None);
        assert_eq!(v.canonical(), "");
        assert!(v.stages().is_empty());
    }

    #[test]
    fn parse_of_empty_string_is_unparsed() {
        assert!(parse("").is_unparsed());
        assert!(parse("   ").is_unparsed());
    }

    #[test]
    fn leading_number_of_pre_release_becomes_revision() {
        let v = parse("1.0.0-7");
        assert_eq!(v.revision(), Some(Revision::PreRelease(7)));
        assert!(v.stages().is_empty());
    }

    #[test]
    fn number_after_stage_attaches_as_tag() {
        let v = parse("1.0.0-beta-2");
        assert_eq!(v.stages(), &[StageTag::new("beta", 2)]);
        assert_eq!(v.revision(), Some(Revision::Implied));
    }

    #[test]
    fn trailing_number_after_tagged_stage_becomes_extra() {
        let v = parse("1.0.0-rc.1.5");
        assert_eq!(v.stages(), &[StageTag::new("rc", 1)]);
        assert_eq!(v.extra(), Some(5));
    }

    #[test]
    fn surplus_numbers_become_metadata() {
        let v = parse("1.0.0-rc.1.5.6");
        assert_eq!(v.stages(), &[StageTag::new("rc", 1)]);
        assert_eq!(v.extra(), Some(6));
        assert_eq!(v.metadata()[0].tag, "5");
        assert_eq!(v.metadata()[0].origin, Segment::PreRelease);
    }

    #[test]
    fn stage_order_is_preserved() {
        let v = parse("1.0.0-rc.alpha.beta2");
        let names: Vec<&str> = v.stages().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["rc", "alpha", "beta"]);
        assert_eq!(v.stages()[2].tag, 2);
    }

    #[test]
    fn alpha_leading_token_keeps_non_numeric_rest_as_metadata() {
        let v = parse("1.0.0-dev~x");
        assert_eq!(v.stages(), &[StageTag::new("dev", 0)]);
        assert_eq!(v.metadata()[0].tag, "~x");
    }

    #[test]
    fn overflowing_number_is_demoted_to_metadata() {
        let huge = "9".repeat(45);
        let v = parse(&format!("1.0.0-beta.1.{huge}.x"));
        assert!(v.metadata().iter().any(|m| m.tag == huge));
    }

    #[test]
    fn parse_extracts_git_describe_with_count() {
        let v = parse("1.2.3-14-gabc1234");
        assert_eq!(v.commit_hashes().len(), 1);
        let hash = &v.commit_hashes()[0];
        assert_eq!(hash.original, "gabc1234");
        assert_eq!(hash.parsed, "abc1234");
        assert_eq!(hash.commits_since_tag, Some(14));
        assert_eq!(hash.origin, Segment::PreRelease);
        assert_eq!(v.canonical(), "1.2.3");
    }

    #[test]
    fn parse_extracts_bare_describe_hash() {
        let v = parse("1.2.3-beta-gdeadbeef");
        assert_eq!(v.commit_hashes()[0].parsed, "deadbeef");
        assert_eq!(v.commit_hashes()[0].commits_since_tag, None);
        assert_eq!(v.stages(), &[StageTag::new("beta", 0)]);
    }

    #[test]
    fn parse_extracts_hashes_from_build_segment() {
        let v = parse("1.2.3+meta-3-g0123456");
        assert_eq!(v.commit_hashes()[0].origin, Segment::Build);
        assert_eq!(v.commit_hashes()[0].commits_since_tag, Some(3));
        assert_eq!(v.canonical(), "1.2.3+meta");
    }

    #[test]
    fn go_pseudo_version_captures_timestamp_and_hash() {
        let v = parse("v0.0.0-20191109021931-daa7c04131f5");
        assert_eq!(v.timestamps().len(), 1);
        assert_eq!(v.timestamps()[0].original, "20191109021931");
        assert_eq!(v.timestamps()[0].parsed, "2019-11-09T02:19:31Z");
        assert_eq!(v.commit_hashes()[0].parsed, "daa7c04131f5");
        assert_eq!(v.canonical(), "0.0.0-0");
    }

    #[test]
    fn eight_digit_timestamp_is_midnight_utc() {
        let v = parse("1.0.0-nightly.20201221");
        assert_eq!(v.timestamps()[0].parsed, "2020-12-21T00:00:00Z");
        assert_eq!(v.stages(), &[StageTag::new("nightly", 0)]);
    }

    #[test]
    fn impossible_timestamp_passes_through_raw() {
        let v = parse("1.0.0-20209999");
        assert_eq!(v.timestamps()[0].parsed, "20209999");
    }

    #[test]
    fn build_timestamps_are_recognized() {
        let v = parse("1.0.0+20240102");
        assert_eq!(v.timestamps()[0].parsed, "2024-01-02T00:00:00Z");
        assert_eq!(v.canonical(), "1.0.0");
    }

    #[rstest]
    #[case(TokenKind::Timestamp, "20240102")]
    #[case(TokenKind::CommitHash, "abcdef1")]
    #[case(TokenKind::Number(42), "42")]
    #[case(TokenKind::TaggedStage("alpha", 10), "alpha10")]
    #[case(TokenKind::Stage { name: "beta", rest: "" }, "beta")]
    #[case(TokenKind::Stage { name: "postx", rest: "1y" }, "postx1y")]
    #[case(TokenKind::Opaque, "~build")]
    #[case(TokenKind::CommitHash, "FACADED")]
    #[case(TokenKind::Opaque, "facaded~x")]
    fn classify_follows_priority(#[case] expected: TokenKind<'static>, #[case] token: &'static str) {
        assert_eq!(classify(token), expected);
    }

    #[test]
    fn parse_all_keeps_input_order() {
        let parsed = parse_all(&["2.0.0", "1.0.0"]);
        assert_eq!(parsed[0].canonical(), "2.0.0");
        assert_eq!(parsed[1].canonical(), "1.0.0");
    }
}
