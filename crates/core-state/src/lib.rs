//! Modification-state undo ledger.
//!
//! Tracks, per line, whether the content differs from the file on disk, and
//! keeps that answer exact across undo, redo and saves made while history is
//! still undoable or redoable.
//!
//! Pieces:
//! - `flags::UndoFlags`: per record, per line slot, per direction "becomes
//!   Modified / becomes SavedOnDisk" bits.
//! - `record::UndoRecord`: the six edit kinds (insert/remove text, wrap/unwrap,
//!   insert/remove line). Flags are derived once, from the buffer state before
//!   the edit, and only rewritten by save reconciliation.
//! - `undo::UndoLedger`: records plus a cursor; `undo`/`redo` replay strictly in
//!   order and `on_document_saved` runs the reconciliation pass to completion.
//! - `DocumentState`: a minimal owning document wiring a `TextBuffer`, the
//!   ledger and the save step together.
//!
//! Telemetry:
//! - Record lifecycle emits trace events under `state.undo` (`push_record`,
//!   `undo`, `redo`, `undo_history_trimmed`); reconciliation logs a debug
//!   summary under `state.save`. Line text is never logged.

use std::path::PathBuf;

use anyhow::{Context, Result};
use core_config::Config;
use core_text::{BufferResult, LineBuffer, LineState, TextBuffer};
use tracing::debug;

pub mod flags;
pub mod marks;
pub mod record;
pub mod undo;

pub use flags::{Direction, Slot, UndoFlags};
pub use marks::{LineMarks, SavedLines};
pub use record::{RecordKind, UndoRecord};
pub use undo::{ReconcileStats, UNDO_HISTORY_MAX, UndoLedger};

/// A line buffer together with its undo ledger.
///
/// Every edit goes through a record so the ledger is the only writer of the
/// lines' modification flags.
pub struct DocumentState<B: TextBuffer = LineBuffer> {
    buffer: B,
    ledger: UndoLedger,
    tab_width: usize,
}

impl DocumentState<LineBuffer> {
    /// Build a document from text, reading configuration from `config_path`
    /// (or the discovered default location).
    pub fn load(content: &str, config_path: Option<PathBuf>) -> Result<Self> {
        let config = core_config::load_from(config_path).context("loading configuration")?;
        Ok(Self::with_config(LineBuffer::from_str(content), &config))
    }
}

impl<B: TextBuffer> DocumentState<B> {
    pub fn new(buffer: B) -> Self {
        Self::with_config(buffer, &Config::default())
    }

    pub fn with_config(buffer: B, config: &Config) -> Self {
        Self {
            buffer,
            ledger: UndoLedger::from_config(config.undo()),
            tab_width: config.effective_tab_width(),
        }
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn ledger(&self) -> &UndoLedger {
        &self.ledger
    }

    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// State of `line`, `None` if it does not exist.
    pub fn line_state(&self, line: usize) -> Option<LineState> {
        self.buffer.line(line).map(|l| l.state())
    }

    /// Indices of lines currently differing from disk.
    pub fn modified_lines(&self) -> Vec<usize> {
        (0..self.buffer.line_count())
            .filter(|&i| self.line_state(i) == Some(LineState::Modified))
            .collect()
    }

    pub fn is_modified(&self) -> bool {
        !self.modified_lines().is_empty()
    }

    /// Virtual (tab expanded) column of `col` on `line` using the configured tab width.
    pub fn virtual_column(&self, line: usize, col: usize) -> Option<usize> {
        self.buffer
            .line(line)
            .map(|l| l.to_virtual_column(col, self.tab_width))
    }

    fn apply(&mut self, record: UndoRecord) -> BufferResult<Vec<usize>> {
        self.ledger.push(&mut self.buffer, record)
    }

    pub fn insert_text(&mut self, line: usize, col: usize, text: &str) -> BufferResult<Vec<usize>> {
        let record = UndoRecord::insert_text(&self.buffer, line, col, text)?;
        self.apply(record)
    }

    pub fn remove_text(&mut self, line: usize, col: usize, len: usize) -> BufferResult<Vec<usize>> {
        let record = UndoRecord::remove_text(&self.buffer, line, col, len)?;
        self.apply(record)
    }

    /// Split `line` at `col` into a new line (`new_line`) or onto the existing next line.
    pub fn wrap_line(&mut self, line: usize, col: usize, new_line: bool) -> BufferResult<Vec<usize>> {
        let record = UndoRecord::wrap_line(&self.buffer, line, col, new_line)?;
        self.apply(record)
    }

    /// Join `line` with the next one, deleting the emptied next line when `remove_line`.
    pub fn unwrap_line(&mut self, line: usize, remove_line: bool) -> BufferResult<Vec<usize>> {
        let record = UndoRecord::unwrap_line(&self.buffer, line, remove_line)?;
        self.apply(record)
    }

    pub fn insert_line(&mut self, line: usize, text: &str) -> BufferResult<Vec<usize>> {
        self.apply(UndoRecord::insert_line(line, text))
    }

    pub fn remove_line(&mut self, line: usize) -> BufferResult<Vec<usize>> {
        let record = UndoRecord::remove_line(&self.buffer, line)?;
        self.apply(record)
    }

    pub fn undo(&mut self) -> BufferResult<Option<Vec<usize>>> {
        self.ledger.undo(&mut self.buffer)
    }

    pub fn redo(&mut self) -> BufferResult<Option<Vec<usize>>> {
        self.ledger.redo(&mut self.buffer)
    }

    /// Record a full save: modified lines become saved on disk, then recorded
    /// history is reconciled against the new on-disk content.
    pub fn save(&mut self) -> ReconcileStats {
        let mut written = 0usize;
        for i in 0..self.buffer.line_count() {
            if let Some(line) = self.buffer.line_mut(i)
                && line.is_modified()
            {
                line.set_state(LineState::SavedOnDisk);
                written += 1;
            }
        }
        debug!(target: "state.save", lines = self.buffer.line_count(), written, "document_saved");
        self.ledger.on_document_saved(&SavedLines::All)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_mark_lines_modified_and_save_clears_them() {
        let mut doc = DocumentState::new(LineBuffer::from_str("a\nb"));
        assert!(!doc.is_modified());
        doc.insert_text(1, 1, "c").unwrap();
        assert_eq!(doc.modified_lines(), vec![1]);
        doc.save();
        assert!(!doc.is_modified());
        assert_eq!(doc.line_state(1), Some(LineState::SavedOnDisk));
        assert_eq!(doc.line_state(0), Some(LineState::Clean));
    }

    #[test]
    fn config_drives_tab_width_and_history() {
        let cfg = Config::from_toml_str("[editor]\ntab_width = 4\n[undo]\nmax_records = 1\n");
        let mut doc = DocumentState::with_config(LineBuffer::from_str("\tx"), &cfg);
        assert_eq!(doc.virtual_column(0, 1), Some(4));
        doc.insert_text(0, 0, "a").unwrap();
        doc.insert_text(0, 0, "b").unwrap();
        assert_eq!(doc.ledger().undo_depth(), 1);
    }

    #[test]
    fn load_uses_defaults_without_config_file() {
        let doc = DocumentState::load("x\ny", Some(PathBuf::from("__missing_config__.toml"))).unwrap();
        assert_eq!(doc.buffer().line_count(), 2);
        assert_eq!(doc.tab_width(), 8);
    }
}
