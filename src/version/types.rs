//! Structured representation of a parsed version string

use serde::ser::{Serialize, Serializer};

/// Numeric core of a version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Core {
    /// A dotted run or lone integer was found; absent components are 0
    Parsed { major: u64, minor: u64, patch: u64 },
    /// No numeric core could be located in the input
    Unparsed,
}

/// Where a revision number came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revision {
    /// Fourth dotted component of the core (`1.2.3.4`)
    Core(u64),
    /// Leading numeric token of the pre-release segment (`1.2.3-4`)
    PreRelease(u64),
    /// No number was given but a pre-release segment was present
    Implied,
}

impl Revision {
    pub fn value(&self) -> u64 {
        match self {
            Revision::Core(n) | Revision::PreRelease(n) => *n,
            Revision::Implied => 0,
        }
    }
}

/// Segment of the input a tag was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Segment {
    #[serde(rename = "pre")]
    PreRelease,
    #[serde(rename = "build")]
    Build,
}

/// Named pre-release phase with an optional numeric sub-tag (0 = none)
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StageTag {
    pub name: String,
    pub tag: u64,
}

impl StageTag {
    pub fn new(name: impl Into<String>, tag: u64) -> Self {
        Self {
            name: name.into(),
            tag,
        }
    }
}

/// Opaque token that is kept but never ordered on
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MetadataTag {
    pub tag: String,
    #[serde(rename = "in")]
    pub origin: Segment,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TimestampInfo {
    /// Token as it appeared in the input
    pub original: String,
    /// RFC 3339 rendering in UTC, or the raw token when it is not a real date
    pub parsed: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CommitHashInfo {
    pub original: String,
    pub parsed: String,
    #[serde(rename = "in")]
    pub origin: Segment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commits_since_tag: Option<u64>,
}

/// Canonicalized form of a raw version string
///
/// Produced once by [`crate::version::parser::parse`] and never mutated.
/// Equality and ordering are defined by [`crate::version::compare::compare`].
#[derive(Debug, Clone)]
pub struct StructuredVersion {
    pub(crate) prefix: String,
    pub(crate) core: Core,
    pub(crate) revision: Option<Revision>,
    pub(crate) stages: Vec<StageTag>,
    pub(crate) metadata: Vec<MetadataTag>,
    pub(crate) extra: Option<u64>,
    pub(crate) canonical: String,
    pub(crate) original: String,
    pub(crate) timestamps: Vec<TimestampInfo>,
    pub(crate) commit_hashes: Vec<CommitHashInfo>,
}

impl StructuredVersion {
    /// Value with an unparsed core and nothing extracted yet
    pub(crate) fn blank(original: &str, prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            core: Core::Unparsed,
            revision: None,
            stages: Vec::new(),
            metadata: Vec::new(),
            extra: None,
            canonical: String::new(),
            original: original.to_string(),
            timestamps: Vec::new(),
            commit_hashes: Vec::new(),
        }
    }

    /// Text that preceded the core, kept for display only
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn core(&self) -> Core {
        self.core
    }

    pub fn is_unparsed(&self) -> bool {
        self.core == Core::Unparsed
    }

    pub fn major(&self) -> Option<u64> {
        match self.core {
            Core::Parsed { major, .. } => Some(major),
            Core::Unparsed => None,
        }
    }

    pub fn minor(&self) -> Option<u64> {
        match self.core {
            Core::Parsed { minor, .. } => Some(minor),
            Core::Unparsed => None,
        }
    }

    pub fn patch(&self) -> Option<u64> {
        match self.core {
            Core::Parsed { patch, .. } => Some(patch),
            Core::Unparsed => None,
        }
    }

    pub fn revision(&self) -> Option<Revision> {
        self.revision
    }

    /// Stage tags in the order they were tokenized
    pub fn stages(&self) -> &[StageTag] {
        &self.stages
    }

    pub fn metadata(&self) -> &[MetadataTag] {
        &self.metadata
    }

    pub fn extra(&self) -> Option<u64> {
        self.extra
    }

    /// Re-derived `major.minor.patch[-prerelease][+build]` form
    ///
    /// Empty for [`Core::Unparsed`] values.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// The untouched input string
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn timestamps(&self) -> &[TimestampInfo] {
        &self.timestamps
    }

    pub fn commit_hashes(&self) -> &[CommitHashInfo] {
        &self.commit_hashes
    }

    /// Build-segment metadata tags in order
    pub fn build_metadata(&self) -> impl Iterator<Item = &str> {
        self.metadata
            .iter()
            .filter(|m| m.origin == Segment::Build)
            .map(|m| m.tag.as_str())
    }
}

impl std::fmt::Display for StructuredVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_unparsed() {
            write!(f, "{}", self.original)
        } else {
            write!(f, "{}{}", self.prefix, self.canonical)
        }
    }
}

#[derive(serde::Serialize)]
struct WireVersion<'a> {
    prefix: &'a str,
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    revision: Option<u64>,
    #[serde(rename = "type")]
    stages: &'a [StageTag],
    build_metadata: &'a [MetadataTag],
    extra: Option<u64>,
    canonical: &'a str,
    original: &'a str,
    timestamp: &'a [TimestampInfo],
    commit_hash: &'a [CommitHashInfo],
}

impl StructuredVersion {
    /// Absent revisions of a parsed core go out as 0
    fn wire_revision(&self) -> Option<u64> {
        match self.core {
            Core::Parsed { .. } => Some(self.revision.map_or(0, |r| r.value())),
            Core::Unparsed => None,
        }
    }
}

impl Serialize for StructuredVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireVersion {
            prefix: &self.prefix,
            major: self.major(),
            minor: self.minor(),
            patch: self.patch(),
            revision: self.wire_revision(),
            stages: &self.stages,
            build_metadata: &self.metadata,
            extra: self.extra,
            canonical: &self.canonical,
            original: &self.original,
            timestamp: &self.timestamps,
            commit_hash: &self.commit_hashes,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::parser::parse;
    use serde_json::json;

    #[test]
    fn serializes_with_wire_field_names() {
        let value = serde_json::to_value(parse("v1.2.3-rc.1+build.5")).unwrap();

        assert_eq!(
            value,
            json!({
                "prefix": "v",
                "major": 1,
                "minor": 2,
                "patch": 3,
                "revision": 0,
                "type": [{ "name": "rc", "tag": 1 }],
                "build_metadata": [
                    { "tag": "build", "in": "build" },
                    { "tag": "5", "in": "build" }
                ],
                "extra": null,
                "canonical": "1.2.3-rc.1+build.5",
                "original": "v1.2.3-rc.1+build.5",
                "timestamp": [],
                "commit_hash": []
            })
        );
    }

    #[test]
    fn stable_version_serializes_zero_revision() {
        let value = serde_json::to_value(parse("2.0.0")).unwrap();
        assert_eq!(value["revision"], 0);

        let value = serde_json::to_value(parse("1.2.3.4")).unwrap();
        assert_eq!(value["revision"], 4);
    }

    #[test]
    fn unparsed_core_serializes_as_null() {
        let value = serde_json::to_value(parse("latest")).unwrap();

        assert_eq!(value["prefix"], "latest");
        assert!(value["major"].is_null());
        assert!(value["revision"].is_null());
        assert_eq!(value["canonical"], "");
    }

    #[test]
    fn display_prepends_prefix() {
        assert_eq!(parse("release-1.2").to_string(), "release-1.2.0");
        assert_eq!(parse("nonsense").to_string(), "nonsense");
    }

    #[test]
    fn revision_value_defaults_to_zero_when_implied() {
        assert_eq!(Revision::Implied.value(), 0);
        assert_eq!(Revision::Core(4).value(), 4);
        assert_eq!(Revision::PreRelease(7).value(), 7);
    }
}
