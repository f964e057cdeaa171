//! Total order over structured versions
//!
//! Ordering, from most to least significant:
//! 1. unparsed values sort below everything and are equal to each other
//! 2. `(major, minor, patch, core revision)` numerically
//! 3. a release sorts above any pre-release of the same core
//! 4. pre-release identifier lists compared position by position

use std::cmp::Ordering;

use crate::version::stage::stage_weight;
use crate::version::types::{Core, Revision, StructuredVersion};

/// One position of a pre-release identifier list
#[derive(Debug, Clone)]
enum Identifier<'a> {
    Numeric(u64),
    Named { name: &'a str, weight: u32 },
}

impl Ord for Identifier<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Identifier::Numeric(a), Identifier::Numeric(b)) => a.cmp(b),
            (Identifier::Numeric(_), Identifier::Named { .. }) => Ordering::Less,
            (Identifier::Named { .. }, Identifier::Numeric(_)) => Ordering::Greater,
            (
                Identifier::Named { name: a, weight: wa },
                Identifier::Named { name: b, weight: wb },
            ) => wa
                .cmp(wb)
                .then_with(|| a.to_lowercase().cmp(&b.to_lowercase())),
        }
    }
}

impl PartialEq for Identifier<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Identifier<'_> {}

impl PartialOrd for Identifier<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pre-release identifiers in significance order; empty for a release
///
/// A leading pre-release number (`1.0.0-4`) comes first, then each stage
/// followed by its tag when non-zero, then the trailing extra number.
fn identifiers(version: &StructuredVersion) -> Vec<Identifier<'_>> {
    let mut out = Vec::with_capacity(version.stages.len() * 2 + 2);
    if let Some(Revision::PreRelease(n)) = version.revision {
        out.push(Identifier::Numeric(n));
    }
    for stage in &version.stages {
        out.push(Identifier::Named {
            name: &stage.name,
            weight: stage_weight(&stage.name),
        });
        if stage.tag != 0 {
            out.push(Identifier::Numeric(stage.tag));
        }
    }
    if let Some(extra) = version.extra {
        out.push(Identifier::Numeric(extra));
    }
    out
}

fn core_key(version: &StructuredVersion) -> Option<(u64, u64, u64, u64)> {
    let Core::Parsed {
        major,
        minor,
        patch,
    } = version.core
    else {
        return None;
    };
    let revision = match version.revision {
        Some(Revision::Core(n)) => n,
        _ => 0,
    };
    Some((major, minor, patch, revision))
}

/// Compare two versions; `Less`, `Equal` or `Greater`
pub fn compare(a: &StructuredVersion, b: &StructuredVersion) -> Ordering {
    if a.original == b.original {
        return Ordering::Equal;
    }

    match (core_key(a), core_key(b)) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Less,
        (Some(_), None) => return Ordering::Greater,
        (Some(ka), Some(kb)) => {
            if ka != kb {
                return ka.cmp(&kb);
            }
        }
    }

    let (ia, ib) = (identifiers(a), identifiers(b));
    match (ia.is_empty(), ib.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        // Vec ordering is positional with a shorter prefix sorting first
        (false, false) => ia.cmp(&ib),
    }
}

impl PartialEq for StructuredVersion {
    fn eq(&self, other: &Self) -> bool {
        compare(self, other) == Ordering::Equal
    }
}

impl Eq for StructuredVersion {}

impl PartialOrd for StructuredVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StructuredVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

impl StructuredVersion {
    pub fn less_than(&self, other: &Self) -> bool {
        compare(self, other) == Ordering::Less
    }

    pub fn greater_than(&self, other: &Self) -> bool {
        compare(self, other) == Ordering::Greater
    }

    pub fn equal(&self, other: &Self) -> bool {
        compare(self, other) == Ordering::Equal
    }

    pub fn less_or_equal(&self, other: &Self) -> bool {
        compare(self, other) != Ordering::Greater
    }

    pub fn greater_or_equal(&self, other: &Self) -> bool {
        compare(self, other) != Ordering::Less
    }

    /// No stage tags, or a stage literally named `stable`
    pub fn is_stable(&self) -> bool {
        self.stages.is_empty() || self.has_stage(&["stable"])
    }

    pub fn is_alpha(&self) -> bool {
        !self.is_stable() && self.has_stage(&["alpha"])
    }

    pub fn is_beta(&self) -> bool {
        !self.is_stable() && self.has_stage(&["beta"])
    }

    pub fn is_rc(&self) -> bool {
        !self.is_stable() && self.has_stage(&["rc", "release-candidate"])
    }

    pub fn is_preview(&self) -> bool {
        !self.is_stable() && self.has_stage(&["preview"])
    }

    /// A VCS snapshot: both a timestamp and a commit hash were captured
    pub fn is_pseudo(&self) -> bool {
        !self.timestamps.is_empty() && !self.commit_hashes.is_empty()
    }

    /// Same stage sequence and extra number, ignoring the core
    pub fn same_stages(&self, other: &Self) -> bool {
        self.stages.len() == other.stages.len()
            && self
                .stages
                .iter()
                .zip(&other.stages)
                .all(|(a, b)| a.name.eq_ignore_ascii_case(&b.name) && a.tag == b.tag)
            && self.extra == other.extra
    }

    fn has_stage(&self, names: &[&str]) -> bool {
        self.stages
            .iter()
            .any(|stage| names.iter().any(|n| stage.name.eq_ignore_ascii_case(n)))
    }
}

/// Stable in-place sort; equal versions keep their input order
pub fn sort(versions: &mut [StructuredVersion], descending: bool) {
    if descending {
        versions.sort_by(|a, b| compare(b, a));
    } else {
        versions.sort_by(compare);
    }
}
