//! Undo records carrying per-line modification state.
//!
//! A record is built from the buffer *before* its edit is applied: it captures
//! the positional payload plus, for every line it will touch, the state that
//! line must take on undo and on redo. Replaying applies the text mutation
//! first and then the recorded states; an empty flag pair leaves the line alone.
//!
//! Slots touched per kind (redo / undo):
//!
//! | kind        | redo         | undo         |
//! |-------------|--------------|--------------|
//! | InsertText  | line         | line         |
//! | RemoveText  | line         | line         |
//! | WrapLine    | line, line+1 | line         |
//! | UnwrapLine  | line         | line, line+1 |
//! | InsertLine  | line         | -            |
//! | RemoveLine  | -            | line         |

use core_text::{BufferError, BufferResult, TextBuffer, TextLine};

use crate::flags::{Direction, Slot, UndoFlags};
use crate::marks::{LineMarks, SavedLines};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKind {
    InsertText {
        line: usize,
        col: usize,
        text: String,
    },
    RemoveText {
        line: usize,
        col: usize,
        text: String,
    },
    /// `len` characters after `col` moved to the next line; `new_line` when that line was created.
    WrapLine {
        line: usize,
        col: usize,
        len: usize,
        new_line: bool,
    },
    /// `len` characters of the next line appended at `col`; `remove_line` when the next line went away.
    UnwrapLine {
        line: usize,
        col: usize,
        len: usize,
        remove_line: bool,
    },
    InsertLine {
        line: usize,
        text: String,
    },
    RemoveLine {
        line: usize,
        text: String,
    },
}

const LINE1: &[Slot] = &[Slot::Line1];
const BOTH: &[Slot] = &[Slot::Line1, Slot::Line2];
const NONE: &[Slot] = &[];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoRecord {
    kind: RecordKind,
    flags: UndoFlags,
}

fn column_in_range(tl: &TextLine, line: usize, column: usize) -> BufferResult<()> {
    let len = tl.len();
    if column > len {
        return Err(BufferError::ColumnOutOfRange { line, column, len });
    }
    Ok(())
}

impl UndoRecord {
    pub fn insert_text<B: TextBuffer + ?Sized>(
        buffer: &B,
        line: usize,
        col: usize,
        text: impl Into<String>,
    ) -> BufferResult<Self> {
        let tl = buffer.checked_line(line)?;
        column_in_range(tl, line, col)?;
        Ok(Self {
            kind: RecordKind::InsertText {
                line,
                col,
                text: text.into(),
            },
            flags: single_line_flags(tl),
        })
    }

    /// Captures the `len` characters at `col` that the edit will remove.
    pub fn remove_text<B: TextBuffer + ?Sized>(
        buffer: &B,
        line: usize,
        col: usize,
        len: usize,
    ) -> BufferResult<Self> {
        let tl = buffer.checked_line(line)?;
        column_in_range(tl, line, col.saturating_add(len))?;
        Ok(Self {
            kind: RecordKind::RemoveText {
                line,
                col,
                text: tl.substring(col, len),
            },
            flags: single_line_flags(tl),
        })
    }

    pub fn wrap_line<B: TextBuffer + ?Sized>(
        buffer: &B,
        line: usize,
        col: usize,
        new_line: bool,
    ) -> BufferResult<Self> {
        let tl = buffer.checked_line(line)?;
        column_in_range(tl, line, col)?;
        if !new_line {
            buffer.checked_line(line + 1)?;
        }
        let len = tl.len() - col;
        let modified = tl.is_modified();
        let saved = tl.is_saved_on_disk();

        let mut flags = UndoFlags::empty();
        if len > 0 || modified {
            flags |= UndoFlags::REDO_LINE1_MODIFIED;
        } else if saved {
            flags |= UndoFlags::REDO_LINE1_SAVED;
        }

        if col > 0 || len == 0 || modified {
            flags |= UndoFlags::REDO_LINE2_MODIFIED;
        } else if saved {
            flags |= UndoFlags::REDO_LINE2_SAVED;
        }

        if modified {
            flags |= UndoFlags::UNDO_LINE1_MODIFIED;
        } else if (len > 0 && col > 0) || saved {
            flags |= UndoFlags::UNDO_LINE1_SAVED;
        }

        Ok(Self {
            kind: RecordKind::WrapLine {
                line,
                col,
                len,
                new_line,
            },
            flags,
        })
    }

    /// Join `line` with the whole of the following line.
    pub fn unwrap_line<B: TextBuffer + ?Sized>(
        buffer: &B,
        line: usize,
        remove_line: bool,
    ) -> BufferResult<Self> {
        let tl = buffer.checked_line(line)?;
        let next = buffer.checked_line(line + 1)?;
        let len1 = tl.len();
        let len2 = next.len();

        let mut flags = UndoFlags::empty();
        if len1 > 0 && len2 > 0 {
            flags |= UndoFlags::REDO_LINE1_MODIFIED;
            flags.set_modified_or_saved(Direction::Undo, Slot::Line1, tl.is_modified());
            flags.set_modified_or_saved(Direction::Undo, Slot::Line2, next.is_modified());
        } else if len1 == 0 {
            flags.set_state(Direction::Redo, Slot::Line1, next.state());
            flags.set_modified_or_saved(Direction::Undo, Slot::Line1, tl.is_modified());
            flags.set_state(Direction::Undo, Slot::Line2, next.state());
        } else {
            flags.set_state(Direction::Redo, Slot::Line1, next.state());
            flags.set_state(Direction::Undo, Slot::Line1, tl.state());
            flags.set_modified_or_saved(Direction::Undo, Slot::Line2, next.is_modified());
        }

        Ok(Self {
            kind: RecordKind::UnwrapLine {
                line,
                col: len1,
                len: len2,
                remove_line,
            },
            flags,
        })
    }

    pub fn insert_line(line: usize, text: impl Into<String>) -> Self {
        Self {
            kind: RecordKind::InsertLine {
                line,
                text: text.into(),
            },
            flags: UndoFlags::REDO_LINE1_MODIFIED,
        }
    }

    pub fn remove_line<B: TextBuffer + ?Sized>(buffer: &B, line: usize) -> BufferResult<Self> {
        let tl = buffer.checked_line(line)?;
        let mut flags = UndoFlags::empty();
        flags.set_modified_or_saved(Direction::Undo, Slot::Line1, tl.is_modified());
        Ok(Self {
            kind: RecordKind::RemoveLine {
                line,
                text: tl.text().to_string(),
            },
            flags,
        })
    }

    pub fn kind(&self) -> &RecordKind {
        &self.kind
    }

    pub fn flags(&self) -> UndoFlags {
        self.flags
    }

    /// Line the record is anchored at (slot `Line1`).
    pub fn line(&self) -> usize {
        match self.kind {
            RecordKind::InsertText { line, .. }
            | RecordKind::RemoveText { line, .. }
            | RecordKind::WrapLine { line, .. }
            | RecordKind::UnwrapLine { line, .. }
            | RecordKind::InsertLine { line, .. }
            | RecordKind::RemoveLine { line, .. } => line,
        }
    }

    /// Slots whose state is restored when replaying in `dir`.
    pub fn slots(&self, dir: Direction) -> &'static [Slot] {
        match (&self.kind, dir) {
            (RecordKind::InsertText { .. } | RecordKind::RemoveText { .. }, _) => LINE1,
            (RecordKind::WrapLine { .. }, Direction::Redo) => BOTH,
            (RecordKind::WrapLine { .. }, Direction::Undo) => LINE1,
            (RecordKind::UnwrapLine { .. }, Direction::Redo) => LINE1,
            (RecordKind::UnwrapLine { .. }, Direction::Undo) => BOTH,
            (RecordKind::InsertLine { .. }, Direction::Redo) => LINE1,
            (RecordKind::InsertLine { .. }, Direction::Undo) => NONE,
            (RecordKind::RemoveLine { .. }, Direction::Redo) => NONE,
            (RecordKind::RemoveLine { .. }, Direction::Undo) => LINE1,
        }
    }

    /// Lines whose content or flags a replay may change.
    fn touched_lines(&self) -> Vec<usize> {
        let line = self.line();
        match self.kind {
            RecordKind::WrapLine { .. } | RecordKind::UnwrapLine { .. } => vec![line, line + 1],
            _ => vec![line],
        }
    }

    /// Re-apply the edit. Returns the lines to repaint.
    pub fn redo<B: TextBuffer + ?Sized>(&self, buffer: &mut B) -> BufferResult<Vec<usize>> {
        match &self.kind {
            RecordKind::InsertText { line, col, text } => buffer.insert_text(*line, *col, text)?,
            RecordKind::RemoveText { line, col, text } => {
                buffer.remove_text(*line, *col, text.chars().count())?;
            }
            RecordKind::WrapLine {
                line,
                col,
                new_line,
                ..
            } => buffer.wrap_line(*line, *col, *new_line)?,
            RecordKind::UnwrapLine {
                line,
                len,
                remove_line,
                ..
            } => buffer.unwrap_line(*line, *len, *remove_line)?,
            RecordKind::InsertLine { line, text } => buffer.insert_line(*line, text)?,
            RecordKind::RemoveLine { line, .. } => {
                buffer.remove_line(*line)?;
            }
        }
        self.restore_states(buffer, Direction::Redo);
        Ok(self.touched_lines())
    }

    /// Revert the edit. Returns the lines to repaint.
    pub fn undo<B: TextBuffer + ?Sized>(&self, buffer: &mut B) -> BufferResult<Vec<usize>> {
        match &self.kind {
            RecordKind::InsertText { line, col, text } => {
                buffer.remove_text(*line, *col, text.chars().count())?;
            }
            RecordKind::RemoveText { line, col, text } => buffer.insert_text(*line, *col, text)?,
            RecordKind::WrapLine {
                line,
                len,
                new_line,
                ..
            } => buffer.unwrap_line(*line, *len, *new_line)?,
            RecordKind::UnwrapLine {
                line,
                col,
                remove_line,
                ..
            } => buffer.wrap_line(*line, *col, *remove_line)?,
            RecordKind::InsertLine { line, .. } => {
                buffer.remove_line(*line)?;
            }
            RecordKind::RemoveLine { line, text } => buffer.insert_line(*line, text)?,
        }
        self.restore_states(buffer, Direction::Undo);
        Ok(self.touched_lines())
    }

    fn restore_states<B: TextBuffer + ?Sized>(&self, buffer: &mut B, dir: Direction) {
        let line = self.line();
        for &slot in self.slots(dir) {
            if let Some(state) = self.flags.state(dir, slot)
                && let Some(tl) = buffer.line_mut(slot.line(line))
            {
                tl.set_state(state);
            }
        }
    }

    /// Demote every `Saved` pair whose line was written by the new save.
    pub fn demote_saved_flags(&mut self, saved: &SavedLines) -> usize {
        let line = self.line();
        let mut changed = 0;
        for (dir, slot) in UndoFlags::pairs() {
            if saved.contains(slot.line(line)) && self.flags.demote_saved(dir, slot) {
                changed += 1;
            }
        }
        changed
    }

    /// Promote `Modified` pairs in `dir` to `Saved` for lines not yet in `marks`,
    /// marking them. Returns how many pairs changed.
    pub fn mark_saved(
        &mut self,
        dir: Direction,
        marks: &mut LineMarks,
        saved: &SavedLines,
    ) -> usize {
        let line = self.line();
        let mut changed = 0;
        for &slot in self.slots(dir) {
            let idx = slot.line(line);
            // Single-line kinds always hold Modified here once demotion has run.
            if !self.flags.contains(UndoFlags::modified(dir, slot)) || !saved.contains(idx) {
                continue;
            }
            if marks.insert(idx) && self.flags.promote_to_saved(dir, slot) {
                changed += 1;
            }
        }
        changed
    }
}

fn single_line_flags(tl: &TextLine) -> UndoFlags {
    let mut flags = UndoFlags::REDO_LINE1_MODIFIED;
    flags.set_modified_or_saved(Direction::Undo, Slot::Line1, tl.is_modified());
    flags
}
