//! Single text line: characters, highlight runs and on-disk modification state.
//!
//! Columns are character indices (not bytes). Virtual columns expand each tab
//! to the next multiple of the tab width; every other character occupies one
//! column. Out-of-range queries clamp or return `None`, they never panic.
//!
//! `to_virtual_column` and `from_virtual_column` are not exact inverses: a
//! virtual column falling inside a tab's expansion maps back to the tab's own
//! index plus the leftover distance.

use crate::attribute::{Attribute, AttributeRuns};

/// Modification state of a line relative to the file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineState {
    /// Untouched since load.
    #[default]
    Clean,
    /// Content differs from what was last written.
    Modified,
    /// Content was written by the last save and not touched since.
    SavedOnDisk,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextLine {
    text: String,
    attributes: AttributeRuns,
    modified: bool,
    saved_on_disk: bool,
}

fn is_tab(c: char) -> bool {
    c == '\t'
}

#[inline]
fn tab_advance(x: usize, tab_width: usize) -> usize {
    tab_width - (x % tab_width)
}

#[inline]
fn checked_tab_width(tab_width: usize) -> usize {
    debug_assert!(tab_width >= 1, "tab width must be at least 1");
    tab_width.max(1)
}

impl TextLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn char_at(&self, column: usize) -> Option<char> {
        self.text.chars().nth(column)
    }

    /// Up to `len` characters starting at `column` (clamped to the line).
    pub fn substring(&self, column: usize, len: usize) -> String {
        self.text.chars().skip(column).take(len).collect()
    }

    pub fn starts_with(&self, pattern: &str) -> bool {
        self.text.starts_with(pattern)
    }

    pub fn ends_with(&self, pattern: &str) -> bool {
        self.text.ends_with(pattern)
    }

    /// Byte offset of character `column`; clamps to the end of the text.
    fn byte_index(&self, column: usize) -> usize {
        self.text
            .char_indices()
            .nth(column)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    // ---- column arithmetic ------------------------------------------------

    /// Index of the first non-whitespace character.
    pub fn first_char(&self) -> Option<usize> {
        self.next_non_space_char(0)
    }

    /// Index of the last non-whitespace character.
    pub fn last_char(&self) -> Option<usize> {
        self.previous_non_space_char(usize::MAX)
    }

    /// First non-whitespace character at or after `pos`.
    pub fn next_non_space_char(&self, pos: usize) -> Option<usize> {
        self.text
            .chars()
            .enumerate()
            .skip(pos)
            .find(|(_, c)| !c.is_whitespace())
            .map(|(i, _)| i)
    }

    /// Last non-whitespace character at or before `pos`. A `pos` past the end is
    /// clamped to the last character.
    pub fn previous_non_space_char(&self, pos: usize) -> Option<usize> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        let pos = pos.min(len - 1);
        let chars: Vec<char> = self.text.chars().take(pos + 1).collect();
        chars.iter().rposition(|c| !c.is_whitespace())
    }

    /// Text before the first non-whitespace character (the whole line if blank).
    pub fn leading_whitespace(&self) -> &str {
        match self.first_char() {
            Some(col) => &self.text[..self.byte_index(col)],
            None => &self.text,
        }
    }

    /// Visual width of the leading whitespace.
    pub fn indent_depth(&self, tab_width: usize) -> usize {
        let tab_width = checked_tab_width(tab_width);
        let mut depth = 0;
        for c in self.text.chars() {
            if !c.is_whitespace() {
                break;
            }
            if is_tab(c) {
                depth += tab_advance(depth, tab_width);
            } else {
                depth += 1;
            }
        }
        depth
    }

    /// True when `pattern` occurs starting exactly at `column`.
    pub fn matches_at(&self, column: usize, pattern: &str) -> bool {
        let pattern_len = pattern.chars().count();
        if column.saturating_add(pattern_len) > self.len() {
            return false;
        }
        self.text[self.byte_index(column)..].starts_with(pattern)
    }

    /// Convert a character column to a virtual (tab expanded) column. Columns past
    /// the end count one virtual column each.
    pub fn to_virtual_column(&self, column: usize, tab_width: usize) -> usize {
        let tab_width = checked_tab_width(tab_width);
        let mut x = 0;
        let mut walked = 0;
        for c in self.text.chars().take(column) {
            if is_tab(c) {
                x += tab_advance(x, tab_width);
            } else {
                x += 1;
            }
            walked += 1;
        }
        x + (column - walked)
    }

    /// Convert a virtual column back to a character column. Stops at the character
    /// whose expansion would overshoot `column` and adds whatever distance remains.
    pub fn from_virtual_column(&self, column: usize, tab_width: usize) -> usize {
        let tab_width = checked_tab_width(tab_width);
        let mut x = 0;
        let mut z = 0;
        for c in self.text.chars().take(column) {
            let diff = if is_tab(c) {
                tab_advance(x, tab_width)
            } else {
                1
            };
            if x + diff > column {
                break;
            }
            x += diff;
            z += 1;
        }
        z + column.saturating_sub(x)
    }

    /// Visual width of the whole line.
    pub fn virtual_length(&self, tab_width: usize) -> usize {
        let tab_width = checked_tab_width(tab_width);
        self.text.chars().fold(0, |x, c| {
            if is_tab(c) {
                x + tab_advance(x, tab_width)
            } else {
                x + 1
            }
        })
    }

    // ---- attributes -------------------------------------------------------

    /// Append a highlight run. Runs must be added in non-decreasing offset order.
    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// Attribute value at `pos`, `0` when none covers it.
    pub fn attribute(&self, pos: usize) -> i32 {
        self.attributes.value_at(pos)
    }

    pub fn attributes(&self) -> &[Attribute] {
        self.attributes.as_slice()
    }

    pub fn clear_attributes(&mut self) {
        self.attributes.clear();
    }

    // ---- modification state -----------------------------------------------

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn is_saved_on_disk(&self) -> bool {
        self.saved_on_disk
    }

    pub fn mark_as_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    pub fn mark_as_saved_on_disk(&mut self, saved: bool) {
        self.saved_on_disk = saved;
    }

    pub fn state(&self) -> LineState {
        if self.modified {
            LineState::Modified
        } else if self.saved_on_disk {
            LineState::SavedOnDisk
        } else {
            LineState::Clean
        }
    }

    pub fn set_state(&mut self, state: LineState) {
        self.modified = state == LineState::Modified;
        self.saved_on_disk = state == LineState::SavedOnDisk;
    }

    // ---- text mutation (driven by the owning buffer) ----------------------

    /// Insert `text` at `column` (clamped to the end of the line).
    pub fn insert_text(&mut self, column: usize, text: &str) {
        let at = self.byte_index(column);
        self.text.insert_str(at, text);
    }

    /// Remove up to `len` characters at `column`, returning them.
    pub fn remove_text(&mut self, column: usize, len: usize) -> String {
        let start = self.byte_index(column);
        let end = self.byte_index(column.saturating_add(len));
        self.text.drain(start..end).collect()
    }

    /// Split the line at `column`, keeping the head and returning the tail.
    pub fn split_off(&mut self, column: usize) -> String {
        let at = self.byte_index(column);
        self.text.split_off(at)
    }

    pub fn append(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn prepend(&mut self, text: &str) {
        self.text.insert_str(0, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_and_last_char() {
        let l = TextLine::new("  ab c \t");
        assert_eq!(l.first_char(), Some(2));
        assert_eq!(l.last_char(), Some(5));
    }

    #[test]
    fn blank_line_has_no_first_or_last_char() {
        let l = TextLine::new(" \t  ");
        assert_eq!(l.first_char(), None);
        assert_eq!(l.last_char(), None);
        assert_eq!(TextLine::new("").last_char(), None);
    }

    #[test]
    fn next_and_previous_non_space() {
        let l = TextLine::new("a  b  ");
        assert_eq!(l.next_non_space_char(1), Some(3));
        assert_eq!(l.next_non_space_char(4), None);
        assert_eq!(l.next_non_space_char(99), None);
        assert_eq!(l.previous_non_space_char(2), Some(0));
        // Past the end clamps to the last index.
        assert_eq!(l.previous_non_space_char(99), Some(3));
    }

    #[test]
    fn leading_whitespace_variants() {
        assert_eq!(TextLine::new("\t  foo").leading_whitespace(), "\t  ");
        assert_eq!(TextLine::new("foo").leading_whitespace(), "");
        assert_eq!(TextLine::new(" \t ").leading_whitespace(), " \t ");
    }

    #[test]
    fn indent_depth_rounds_tabs() {
        assert_eq!(TextLine::new("  \tx").indent_depth(4), 4);
        assert_eq!(TextLine::new("\t\tx").indent_depth(4), 8);
        assert_eq!(TextLine::new("   x").indent_depth(4), 3);
        assert_eq!(TextLine::new(" \t ").indent_depth(8), 9);
    }

    #[test]
    fn matches_at_bounds() {
        let l = TextLine::new("hello world");
        assert!(l.matches_at(6, "world"));
        assert!(l.matches_at(0, ""));
        assert!(!l.matches_at(7, "world"));
        assert!(!l.matches_at(11, "x"));
        assert!(l.matches_at(11, ""));
    }

    #[test]
    fn matches_at_counts_characters_not_bytes() {
        let l = TextLine::new("äöü");
        assert!(l.matches_at(1, "öü"));
        assert!(!l.matches_at(2, "üx"));
    }

    #[test]
    fn to_virtual_column_expands_tabs() {
        let l = TextLine::new("a\tb");
        assert_eq!(l.to_virtual_column(0, 4), 0);
        assert_eq!(l.to_virtual_column(1, 4), 1);
        assert_eq!(l.to_virtual_column(2, 4), 4);
        assert_eq!(l.to_virtual_column(3, 4), 5);
        // Past the end counts 1:1.
        assert_eq!(l.to_virtual_column(5, 4), 7);
    }

    #[test]
    fn from_virtual_column_inside_tab_expansion() {
        let l = TextLine::new("a\tb");
        assert_eq!(l.from_virtual_column(0, 4), 0);
        assert_eq!(l.from_virtual_column(1, 4), 1);
        // Columns 2 and 3 sit inside the tab's expansion: tab index plus leftover.
        assert_eq!(l.from_virtual_column(2, 4), 2);
        assert_eq!(l.from_virtual_column(3, 4), 3);
        assert_eq!(l.from_virtual_column(4, 4), 2);
        assert_eq!(l.from_virtual_column(5, 4), 3);
        assert_eq!(l.from_virtual_column(8, 4), 6);
    }

    #[test]
    fn virtual_round_trip_breaks_inside_tab() {
        // Boundary case: v=2 lands mid-tab, so the round trip does not return 2.
        let l = TextLine::new("a\tb");
        let c = l.from_virtual_column(2, 4);
        assert_eq!(l.to_virtual_column(c, 4), 4);
    }

    #[test]
    fn all_tab_line_virtual_length() {
        let l = TextLine::new("\t\t\t\t\t");
        assert_eq!(l.virtual_length(4), 20);
        assert_eq!(TextLine::new("ab\tc").virtual_length(4), 5);
        assert_eq!(TextLine::new("").virtual_length(4), 0);
    }

    #[test]
    fn state_transitions() {
        let mut l = TextLine::new("x");
        assert_eq!(l.state(), LineState::Clean);
        l.mark_as_modified(true);
        assert_eq!(l.state(), LineState::Modified);
        l.set_state(LineState::SavedOnDisk);
        assert!(!l.is_modified());
        assert!(l.is_saved_on_disk());
    }

    #[test]
    fn mutation_helpers_use_char_columns() {
        let mut l = TextLine::new("añb");
        l.insert_text(2, "XY");
        assert_eq!(l.text(), "añXYb");
        assert_eq!(l.remove_text(1, 2), "ñX");
        assert_eq!(l.text(), "aYb");
        let tail = l.split_off(1);
        assert_eq!((l.text(), tail.as_str()), ("a", "Yb"));
        l.prepend(">");
        l.append("<");
        assert_eq!(l.text(), ">a<");
        assert_eq!(l.substring(1, 10), "a<");
        assert_eq!(l.char_at(2), Some('<'));
    }

    #[test]
    fn attributes_via_line() {
        let mut l = TextLine::new("let x = 1;");
        l.add_attribute(Attribute::new(0, 3, 7));
        l.add_attribute(Attribute::new(4, 1, 2));
        l.add_attribute(Attribute::new(5, 1, 2));
        assert_eq!(l.attributes().len(), 2);
        assert_eq!(l.attribute(1), 7);
        assert_eq!(l.attribute(3), 0);
        assert_eq!(l.attribute(5), 2);
        l.clear_attributes();
        assert_eq!(l.attribute(1), 0);
    }

    fn line_text() -> impl Strategy<Value = String> {
        prop::collection::vec(prop::sample::select(vec!['a', ' ', '\t', 'z']), 0..24)
            .prop_map(|v| v.into_iter().collect())
    }

    proptest! {
        // Character boundaries round trip exactly.
        #[test]
        fn virtual_round_trip_on_char_boundaries(text in line_text(), w in 1usize..9, extra in 0usize..4) {
            let l = TextLine::new(text);
            for col in 0..=l.len() + extra {
                let v = l.to_virtual_column(col, w);
                prop_assert_eq!(l.from_virtual_column(v, w), col);
                prop_assert_eq!(l.to_virtual_column(l.from_virtual_column(v, w), w), v);
            }
        }

        #[test]
        fn virtual_length_is_virtual_column_of_end(text in line_text(), w in 1usize..9) {
            let l = TextLine::new(text);
            prop_assert_eq!(l.virtual_length(w), l.to_virtual_column(l.len(), w));
        }

        #[test]
        fn all_tabs_expand_fully(n in 0usize..32, w in 1usize..9) {
            let l = TextLine::new("\t".repeat(n));
            prop_assert_eq!(l.virtual_length(w), w * n);
        }
    }
}
