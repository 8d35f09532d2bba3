//! Ordered header list shared by requests and replies.
//!
//! Header names keep the spelling they were received or inserted with, lookups are
//! ASCII case-insensitive, and iteration yields entries in insertion order. The write
//! path relies on that order: headers go on the wire exactly as they are iterated.

use bytes::Bytes;

/// An ordered list of header name/value pairs.
///
/// Duplicate names are allowed (see [`Headers::append`]); [`Headers::set`] collapses
/// them into a single entry that keeps the position of the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(Bytes, Bytes)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity) }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the first value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&Bytes> {
        self.entries.iter().find(|(n, _)| n.eq_ignore_ascii_case(name.as_bytes())).map(|(_, v)| v)
    }

    /// Returns the first value stored under `name` if it is valid utf-8.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|value| std::str::from_utf8(value).ok())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Adds an entry at the end, even if `name` is already present.
    pub fn append(&mut self, name: impl Into<Bytes>, value: impl Into<Bytes>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replaces the value of `name`, or appends a new entry if it is absent.
    ///
    /// The first matching entry keeps its position and spelling, later duplicates are removed.
    pub fn set(&mut self, name: impl Into<Bytes>, value: impl Into<Bytes>) {
        let name = name.into();
        let value = value.into();

        let Some(first) = self.entries.iter().position(|(n, _)| n.eq_ignore_ascii_case(&name)) else {
            self.entries.push((name, value));
            return;
        };

        self.entries[first].1 = value;

        let mut index = 0;
        self.entries.retain(|(n, _)| {
            let keep = index <= first || !n.eq_ignore_ascii_case(&name);
            index += 1;
            keep
        });
    }

    /// Removes every entry named `name`, returning the first removed value.
    pub fn remove(&mut self, name: &str) -> Option<Bytes> {
        let first = self.get(name).cloned();
        if first.is_some() {
            self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(name.as_bytes()));
        }
        first
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.entries.iter().map(|(n, v)| (n.as_ref(), v.as_ref()))
    }
}
