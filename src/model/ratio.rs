use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::record::{GroupKey, WoundCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: WoundCategory,
    pub n: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryShare {
    pub category: WoundCategory,
    pub n: u64,
    pub pct: u32,
}

/// Render rule for one category of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// The category holds 100% of the group and prints bare.
    Dominant(WoundCategory),
    Share { category: WoundCategory, pct: u32 },
}

impl Segment {
    pub fn new(category: WoundCategory, pct: u32) -> Self {
        if pct == 100 {
            Segment::Dominant(category)
        } else {
            Segment::Share { category, pct }
        }
    }

    pub fn category(&self) -> WoundCategory {
        match self {
            Segment::Dominant(category) | Segment::Share { category, .. } => *category,
        }
    }
}

impl From<&CategoryShare> for Segment {
    fn from(share: &CategoryShare) -> Self {
        Segment::new(share.category, share.pct)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Dominant(category) => write!(f, "{category}"),
            Segment::Share { category, pct } => write!(f, "{category}:{pct}%"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatioAnnotation(String);

impl RatioAnnotation {
    pub fn from_segments(segments: &[Segment]) -> Self {
        let parts = segments.iter().map(ToString::to_string).collect::<Vec<_>>();
        Self(parts.join(","))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RatioAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Flat form of one map entry, used for export and the on-disk cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioEntry {
    pub procedure_code: String,
    pub diagnosis_name: String,
    pub ratio: RatioAnnotation,
}

/// GroupKey -> RatioAnnotation, iterated in the order keys were first seen
/// in the reference data. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct RatioMap {
    index: HashMap<GroupKey, usize>,
    entries: Vec<(GroupKey, RatioAnnotation)>,
}

impl RatioMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first annotation for a key; a repeated key is ignored.
    pub(crate) fn insert(&mut self, key: GroupKey, annotation: RatioAnnotation) {
        if self.index.contains_key(&key) {
            return;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, annotation));
    }

    pub fn get(&self, key: &GroupKey) -> Option<&RatioAnnotation> {
        self.index.get(key).map(|&idx| &self.entries[idx].1)
    }

    pub fn lookup(&self, procedure_code: &str, diagnosis_name: &str) -> Option<&RatioAnnotation> {
        self.get(&GroupKey::new(procedure_code, diagnosis_name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &RatioAnnotation)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn to_entries(&self) -> Vec<RatioEntry> {
        self.entries
            .iter()
            .map(|(key, ratio)| RatioEntry {
                procedure_code: key.procedure_code.clone(),
                diagnosis_name: key.diagnosis_name.clone(),
                ratio: ratio.clone(),
            })
            .collect()
    }

    pub fn from_entries(entries: Vec<RatioEntry>) -> Self {
        let mut map = Self::new();
        for entry in entries {
            map.insert(
                GroupKey::new(entry.procedure_code, entry.diagnosis_name),
                entry.ratio,
            );
        }
        map
    }
}

impl PartialEq for RatioMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for RatioMap {}

#[cfg(test)]
#[path = "../../tests/src_inline/model/ratio.rs"]
mod tests;
