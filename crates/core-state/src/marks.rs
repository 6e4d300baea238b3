//! Growable per-line marker set used by save reconciliation.
//!
//! Dense bit-per-line storage that grows on insert; querying an index past the
//! end is simply "not marked".

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineMarks {
    bits: Vec<bool>,
}

impl LineMarks {
    pub fn new() -> Self {
        Self { bits: Vec::new() }
    }

    /// Set with lines `0..count` marked.
    pub fn with_all(count: usize) -> Self {
        Self {
            bits: vec![true; count],
        }
    }

    pub fn contains(&self, line: usize) -> bool {
        self.bits.get(line).copied().unwrap_or(false)
    }

    /// Mark `line`, growing as needed. Returns `true` if it was not marked before.
    pub fn insert(&mut self, line: usize) -> bool {
        if line >= self.bits.len() {
            self.bits.resize(line + 1, false);
        }
        !std::mem::replace(&mut self.bits[line], true)
    }

    pub fn clear(&mut self) {
        self.bits.clear();
    }

    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|b| *b)
    }

    /// Marked line indices, ascending.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(|(i, _)| i)
    }
}

impl FromIterator<usize> for LineMarks {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut marks = Self::new();
        for line in iter {
            marks.insert(line);
        }
        marks
    }
}

/// Which lines a save actually wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavedLines {
    /// Whole-document save.
    All,
    /// Only these line indices reached the disk.
    Only(LineMarks),
}

impl SavedLines {
    pub fn contains(&self, line: usize) -> bool {
        match self {
            SavedLines::All => true,
            SavedLines::Only(marks) => marks.contains(line),
        }
    }
}
