//! Records and the displayed arrangement they live in.
//!
//! A [`RecordList`] is the list exactly as it is shown: index order is
//! visual order and ids are unique. Every algorithm in this crate takes one
//! as input and every sort step snapshots one.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use crate::error::{Error, Result};

/// Stable identity of a record across reorderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RecordId(pub u64);

impl RecordId {
    /// Create from a raw id.
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id value.
    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ids a step or probe wants visually emphasized.
pub type HighlightSet = BTreeSet<RecordId>;

/// A contact or group entry as loaded by the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    /// Display-only fields (phone number, description, ...).
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub fields: BTreeMap<String, String>,
}

impl Record {
    /// Create a record with no extra display fields.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: RecordId(id),
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Attach a display field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// The record's name, as displayed.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a display field.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// Normalize a search key: surrounding whitespace trimmed, lowercased.
///
/// Lowercasing is per character, so ordering normalized keys agrees with
/// [`compare_keys`] exactly.
pub fn normalize_key(key: &str) -> String {
    key.trim().chars().flat_map(char::to_lowercase).collect()
}

/// Compare two keys the way [`normalize_key`] would, without allocating.
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    a.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.trim().chars().flat_map(char::to_lowercase))
}

/// Ascending comparator on normalized names.
pub fn by_name(a: &Record, b: &Record) -> Ordering {
    compare_keys(&a.name, &b.name)
}

/// Descending comparator on normalized names.
pub fn by_name_desc(a: &Record, b: &Record) -> Ordering {
    compare_keys(&b.name, &a.name)
}

/// The displayed arrangement of records.
///
/// Invariant: no two records share an id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RecordList {
    records: Vec<Record>,
}

impl RecordList {
    /// Build a list, rejecting duplicate ids.
    pub fn new(records: Vec<Record>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id) {
                return Err(Error::DuplicateId(record.id));
            }
        }
        Ok(Self { records })
    }

    /// Wrap records already known to have unique ids.
    pub(crate) fn from_unchecked(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// An empty list.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn into_vec(self) -> Vec<Record> {
        self.records
    }

    /// Ids in display order.
    pub fn ids(&self) -> Vec<RecordId> {
        self.records.iter().map(|r| r.id).collect()
    }

    /// Display index of the record with this id.
    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.position(id).is_some()
    }

    /// Whether `other` holds exactly the same ids, in any order.
    pub fn is_permutation_of(&self, other: &RecordList) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let mine: HashSet<RecordId> = self.records.iter().map(|r| r.id).collect();
        other.records.iter().all(|r| mine.contains(&r.id))
    }

    /// Rearrange this list into the given id order.
    pub fn reordered(&self, order: &[RecordId]) -> Result<RecordList> {
        if order.len() != self.len() {
            return Err(Error::NotAPermutation {
                expected: self.len(),
                actual: order.len(),
            });
        }
        let mut taken = vec![false; self.len()];
        let mut records = Vec::with_capacity(order.len());
        for &id in order {
            let index = self.position(id).ok_or(Error::UnknownId(id))?;
            if std::mem::replace(&mut taken[index], true) {
                return Err(Error::DuplicateId(id));
            }
            records.push(self.records[index].clone());
        }
        Ok(Self { records })
    }

    /// Check every id of a highlight set against this list.
    pub fn check_highlight(&self, highlight: &HighlightSet) -> Result<()> {
        match highlight.iter().find(|id| !self.contains(**id)) {
            Some(&id) => Err(Error::UnknownId(id)),
            None => Ok(()),
        }
    }

    /// Whether the list is non-decreasing under the normalized key.
    ///
    /// Binary search assumes this but does not check it.
    pub fn is_sorted_by_key<K>(&self, key: K) -> bool
    where
        K: Fn(&Record) -> &str,
    {
        self.records
            .windows(2)
            .all(|pair| compare_keys(key(&pair[0]), key(&pair[1])) != Ordering::Greater)
    }
}

impl<'a> IntoIterator for &'a RecordList {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RecordList {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let records = Vec::<Record>::deserialize(deserializer)?;
        RecordList::new(records).map_err(serde::de::Error::custom)
    }
}
