//! Per-record modification flags.
//!
//! Each undo record remembers, for up to two line slots and for each replay
//! direction, whether the line ends up `Modified` or `SavedOnDisk`. At most one
//! of the pair is set; an empty pair means "leave the line as it is".

use bitflags::bitflags;
use core_text::LineState;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct UndoFlags: u8 {
        const REDO_LINE1_MODIFIED = 0b0000_0001;
        const REDO_LINE1_SAVED    = 0b0000_0010;
        const REDO_LINE2_MODIFIED = 0b0000_0100;
        const REDO_LINE2_SAVED    = 0b0000_1000;
        const UNDO_LINE1_MODIFIED = 0b0001_0000;
        const UNDO_LINE1_SAVED    = 0b0010_0000;
        const UNDO_LINE2_MODIFIED = 0b0100_0000;
        const UNDO_LINE2_SAVED    = 0b1000_0000;
    }
}

/// Replay direction a flag pair applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Undo,
    Redo,
}

/// Which of a record's (at most two) lines a flag pair describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Line1,
    Line2,
}

impl Slot {
    /// Line index of this slot for a record anchored at `line`.
    pub const fn line(self, line: usize) -> usize {
        match self {
            Slot::Line1 => line,
            Slot::Line2 => line + 1,
        }
    }
}

const ALL_PAIRS: [(Direction, Slot); 4] = [
    (Direction::Redo, Slot::Line1),
    (Direction::Redo, Slot::Line2),
    (Direction::Undo, Slot::Line1),
    (Direction::Undo, Slot::Line2),
];

impl UndoFlags {
    pub const fn modified(dir: Direction, slot: Slot) -> Self {
        match (dir, slot) {
            (Direction::Redo, Slot::Line1) => Self::REDO_LINE1_MODIFIED,
            (Direction::Redo, Slot::Line2) => Self::REDO_LINE2_MODIFIED,
            (Direction::Undo, Slot::Line1) => Self::UNDO_LINE1_MODIFIED,
            (Direction::Undo, Slot::Line2) => Self::UNDO_LINE2_MODIFIED,
        }
    }

    pub const fn saved(dir: Direction, slot: Slot) -> Self {
        match (dir, slot) {
            (Direction::Redo, Slot::Line1) => Self::REDO_LINE1_SAVED,
            (Direction::Redo, Slot::Line2) => Self::REDO_LINE2_SAVED,
            (Direction::Undo, Slot::Line1) => Self::UNDO_LINE1_SAVED,
            (Direction::Undo, Slot::Line2) => Self::UNDO_LINE2_SAVED,
        }
    }

    /// State this pair asks for, `None` when neither flag is set.
    pub fn state(self, dir: Direction, slot: Slot) -> Option<LineState> {
        if self.contains(Self::modified(dir, slot)) {
            Some(LineState::Modified)
        } else if self.contains(Self::saved(dir, slot)) {
            Some(LineState::SavedOnDisk)
        } else {
            None
        }
    }

    /// Record `state` for a pair. `Clean` clears the pair.
    pub fn set_state(&mut self, dir: Direction, slot: Slot, state: LineState) {
        self.remove(Self::modified(dir, slot) | Self::saved(dir, slot));
        match state {
            LineState::Modified => self.insert(Self::modified(dir, slot)),
            LineState::SavedOnDisk => self.insert(Self::saved(dir, slot)),
            LineState::Clean => {}
        }
    }

    /// `Modified` when the line is modified, else `SavedOnDisk`.
    pub fn set_modified_or_saved(&mut self, dir: Direction, slot: Slot, modified: bool) {
        let state = if modified {
            LineState::Modified
        } else {
            LineState::SavedOnDisk
        };
        self.set_state(dir, slot, state);
    }

    /// Turn a `Modified` pair into `Saved`. Returns whether the pair changed.
    pub fn promote_to_saved(&mut self, dir: Direction, slot: Slot) -> bool {
        if !self.contains(Self::modified(dir, slot)) {
            return false;
        }
        self.set_state(dir, slot, LineState::SavedOnDisk);
        true
    }

    /// Turn a `Saved` pair back into `Modified`. Returns whether the pair changed.
    pub fn demote_saved(&mut self, dir: Direction, slot: Slot) -> bool {
        if !self.contains(Self::saved(dir, slot)) {
            return false;
        }
        self.set_state(dir, slot, LineState::Modified);
        true
    }

    /// Every (direction, slot) pair.
    pub fn pairs() -> impl Iterator<Item = (Direction, Slot)> {
        ALL_PAIRS.into_iter()
    }
}
