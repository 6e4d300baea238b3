//! Run-length encoded highlight attributes for a single line.
//!
//! Contract:
//! - Runs are stored sorted ascending by `offset` and never overlap.
//! - Two consecutive runs never share an `attribute_value` when the first
//!   ends exactly where the second starts (`AttributeRuns::push` merges them).
//! - Ordering is a caller contract: the highlighter emits runs left to right.
//!   It is not re-validated here.
//! - Value `0` means "no attribute" and is what lookups return for gaps.

/// One highlight span: `length` characters starting at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attribute {
    pub offset: usize,
    pub length: usize,
    pub attribute_value: i32,
}

impl Attribute {
    pub const fn new(offset: usize, length: usize, attribute_value: i32) -> Self {
        Self {
            offset,
            length,
            attribute_value,
        }
    }

    /// Exclusive end of the span.
    pub const fn end(&self) -> usize {
        self.offset + self.length
    }

    pub const fn contains(&self, pos: usize) -> bool {
        self.offset <= pos && pos < self.end()
    }
}

/// Ordered, merged list of attribute runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeRuns {
    runs: Vec<Attribute>,
}

impl AttributeRuns {
    pub fn new() -> Self {
        Self { runs: Vec::new() }
    }

    /// Append a run, extending the previous one in place when it carries the same
    /// value and ends exactly at `attribute.offset`.
    pub fn push(&mut self, attribute: Attribute) {
        if let Some(last) = self.runs.last_mut()
            && last.attribute_value == attribute.attribute_value
            && last.end() == attribute.offset
        {
            last.length += attribute.length;
            return;
        }
        self.runs.push(attribute);
    }

    /// Value of the run covering `pos`, or `0` when `pos` falls in a gap or past the last run.
    pub fn value_at(&self, pos: usize) -> i32 {
        // First run whose end lies beyond pos; only that run can contain it.
        let idx = self.runs.partition_point(|run| run.end() <= pos);
        match self.runs.get(idx) {
            Some(run) if run.contains(pos) => run.attribute_value,
            _ => 0,
        }
    }

    pub fn as_slice(&self) -> &[Attribute] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn clear(&mut self) {
        self.runs.clear();
    }
}
