use core_config::UndoConfig;
use core_text::{BufferResult, TextBuffer};
use tracing::{debug, trace};

use crate::flags::Direction;
use crate::marks::{LineMarks, SavedLines};
use crate::record::UndoRecord;

/// Default number of undoable records retained.
pub const UNDO_HISTORY_MAX: usize = 1000;

/// Outcome of a save reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileStats {
    /// `Saved` pairs turned back into `Modified` before marking.
    pub demoted: usize,
    /// Redo-side pairs of applied records promoted to `Saved`.
    pub promoted_redo: usize,
    /// Undo-side pairs of redoable records promoted to `Saved`.
    pub promoted_undo: usize,
}

/// Ordered undo history with a single cursor: `records[..cursor]` are applied
/// (undoable), `records[cursor..]` are redoable.
pub struct UndoLedger {
    records: Vec<UndoRecord>,
    cursor: usize,
    /// 0 keeps everything.
    max_records: usize,
}

impl Default for UndoLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoLedger {
    pub fn new() -> Self {
        Self::with_limit(UNDO_HISTORY_MAX)
    }

    pub fn with_limit(max_records: usize) -> Self {
        Self {
            records: Vec::new(),
            cursor: 0,
            max_records,
        }
    }

    pub fn from_config(cfg: &UndoConfig) -> Self {
        Self::with_limit(cfg.max_records)
    }

    pub fn undo_depth(&self) -> usize {
        self.cursor
    }
    pub fn redo_depth(&self) -> usize {
        self.records.len() - self.cursor
    }
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }
    pub fn can_redo(&self) -> bool {
        self.cursor < self.records.len()
    }

    /// Applied records, oldest first.
    pub fn applied(&self) -> &[UndoRecord] {
        &self.records[..self.cursor]
    }

    /// Redoable records, nearest to the cursor first.
    pub fn pending(&self) -> &[UndoRecord] {
        &self.records[self.cursor..]
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.cursor = 0;
        trace!(target: "state.undo", "ledger_cleared");
    }

    /// Apply a freshly built record and append it to the history, discarding
    /// anything redoable. Returns the lines to repaint.
    pub fn push<B: TextBuffer + ?Sized>(
        &mut self,
        buffer: &mut B,
        record: UndoRecord,
    ) -> BufferResult<Vec<usize>> {
        let changed = record.redo(buffer)?;
        let discarded = self.redo_depth();
        self.records.truncate(self.cursor);
        self.records.push(record);
        self.cursor += 1;
        trace!(target: "state.undo", undo_depth = self.undo_depth(), discarded, "push_record");
        self.trim();
        Ok(changed)
    }

    fn trim(&mut self) {
        if self.max_records == 0 || self.cursor <= self.max_records {
            return;
        }
        let excess = self.cursor - self.max_records;
        self.records.drain(..excess);
        self.cursor -= excess;
        trace!(target: "state.undo", excess, undo_depth = self.cursor, "undo_history_trimmed");
    }

    /// Revert the most recent applied record. `None` when there is nothing to undo.
    pub fn undo<B: TextBuffer + ?Sized>(
        &mut self,
        buffer: &mut B,
    ) -> BufferResult<Option<Vec<usize>>> {
        if self.cursor == 0 {
            return Ok(None);
        }
        let changed = self.records[self.cursor - 1].undo(buffer)?;
        self.cursor -= 1;
        trace!(target: "state.undo", undo_depth = self.undo_depth(), redo_depth = self.redo_depth(), "undo");
        Ok(Some(changed))
    }

    /// Re-apply the next redoable record. `None` when there is nothing to redo.
    pub fn redo<B: TextBuffer + ?Sized>(
        &mut self,
        buffer: &mut B,
    ) -> BufferResult<Option<Vec<usize>>> {
        let Some(record) = self.records.get(self.cursor) else {
            return Ok(None);
        };
        let changed = record.redo(buffer)?;
        self.cursor += 1;
        trace!(target: "state.undo", undo_depth = self.undo_depth(), redo_depth = self.redo_depth(), "redo");
        Ok(Some(changed))
    }

    /// Rewrite recorded flags after the document was written to disk.
    ///
    /// Every `Saved` pair for a written line is first demoted to `Modified`
    /// (the older on-disk content is gone). Then, per direction and with its own
    /// marker set, the record nearest the save point that touches a line gets
    /// that line's `Modified` pair promoted to `Saved`: applied records on their
    /// redo side (newest first), redoable records on their undo side (nearest
    /// first). Older records keep `Modified`.
    pub fn on_document_saved(&mut self, saved: &SavedLines) -> ReconcileStats {
        let mut stats = ReconcileStats::default();
        for record in &mut self.records {
            stats.demoted += record.demote_saved_flags(saved);
        }

        let (applied, pending) = self.records.split_at_mut(self.cursor);

        let mut marks = LineMarks::new();
        for record in applied.iter_mut().rev() {
            stats.promoted_redo += record.mark_saved(Direction::Redo, &mut marks, saved);
        }

        marks.clear();
        for record in pending.iter_mut() {
            stats.promoted_undo += record.mark_saved(Direction::Undo, &mut marks, saved);
        }

        debug!(
            target: "state.save",
            undo_depth = self.cursor,
            redo_depth = self.records.len() - self.cursor,
            demoted = stats.demoted,
            promoted_redo = stats.promoted_redo,
            promoted_undo = stats.promoted_undo,
            "reconciled_after_save"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{Slot, UndoFlags};
    use core_text::{LineBuffer, LineState};

    fn modified_buffer(content: &str) -> LineBuffer {
        let mut b = LineBuffer::from_str(content);
        for l in b.lines_mut() {
            l.set_state(LineState::Modified);
        }
        b
    }

    #[test]
    fn push_undo_redo_moves_cursor() {
        let mut b = LineBuffer::from_str("abc");
        let mut ledger = UndoLedger::new();
        let r = UndoRecord::insert_text(&b, 0, 3, "d").unwrap();
        assert_eq!(ledger.push(&mut b, r).unwrap(), vec![0]);
        assert_eq!(b.to_text(), "abcd");
        assert_eq!((ledger.undo_depth(), ledger.redo_depth()), (1, 0));

        assert_eq!(ledger.undo(&mut b).unwrap(), Some(vec![0]));
        assert_eq!(b.to_text(), "abc");
        assert!(ledger.can_redo());
        assert_eq!(ledger.undo(&mut b).unwrap(), None);

        assert_eq!(ledger.redo(&mut b).unwrap(), Some(vec![0]));
        assert_eq!(b.to_text(), "abcd");
        assert_eq!(ledger.redo(&mut b).unwrap(), None);
    }

    #[test]
    fn push_discards_redo_tail() {
        let mut b = LineBuffer::from_str("");
        let mut ledger = UndoLedger::new();
        for t in ["a", "b", "c"] {
            let col = b.line(0).unwrap().len();
            let r = UndoRecord::insert_text(&b, 0, col, t).unwrap();
            ledger.push(&mut b, r).unwrap();
        }
        ledger.undo(&mut b).unwrap();
        ledger.undo(&mut b).unwrap();
        assert_eq!(ledger.redo_depth(), 2);
        let r = UndoRecord::insert_text(&b, 0, 1, "z").unwrap();
        ledger.push(&mut b, r).unwrap();
        assert_eq!(b.to_text(), "az");
        assert_eq!((ledger.undo_depth(), ledger.redo_depth()), (2, 0));
    }

    #[test]
    fn history_is_trimmed_to_limit() {
        let mut b = LineBuffer::from_str("");
        let mut ledger = UndoLedger::from_config(&UndoConfig { max_records: 2 });
        for _ in 0..5 {
            let r = UndoRecord::insert_text(&b, 0, 0, "x").unwrap();
            ledger.push(&mut b, r).unwrap();
        }
        assert_eq!(ledger.undo_depth(), 2);
        while ledger.undo(&mut b).unwrap().is_some() {}
        assert_eq!(b.to_text(), "xxx");
    }

    #[test]
    fn unlimited_history_keeps_everything() {
        let mut b = LineBuffer::from_str("");
        let mut ledger = UndoLedger::from_config(&UndoConfig::unlimited());
        for _ in 0..50 {
            let r = UndoRecord::insert_line(0, "x");
            ledger.push(&mut b, r).unwrap();
        }
        assert_eq!(ledger.undo_depth(), 50);
        ledger.clear();
        assert!(!ledger.can_undo() && !ledger.can_redo());
    }

    #[test]
    fn failed_undo_keeps_cursor() {
        let mut b = LineBuffer::from_str("abc");
        let mut ledger = UndoLedger::new();
        let r = UndoRecord::insert_text(&b, 0, 0, "xyz").unwrap();
        ledger.push(&mut b, r).unwrap();
        b.remove_line(0).unwrap();
        assert!(ledger.undo(&mut b).is_err());
        assert_eq!(ledger.undo_depth(), 1);
    }

    #[test]
    fn only_newest_applied_record_per_line_is_promoted() {
        let mut b = modified_buffer("abc");
        let mut ledger = UndoLedger::new();
        for _ in 0..3 {
            let r = UndoRecord::insert_text(&b, 0, 0, "x").unwrap();
            ledger.push(&mut b, r).unwrap();
        }
        let stats = ledger.on_document_saved(&SavedLines::All);
        assert_eq!(stats.promoted_redo, 1);
        let redo_states: Vec<_> = ledger
            .applied()
            .iter()
            .map(|r| r.flags().state(Direction::Redo, Slot::Line1))
            .collect();
        assert_eq!(
            redo_states,
            vec![
                Some(LineState::Modified),
                Some(LineState::Modified),
                Some(LineState::SavedOnDisk)
            ]
        );
    }

    #[test]
    fn pending_records_promote_undo_side_nearest_first() {
        let mut b = modified_buffer("abc");
        let mut ledger = UndoLedger::new();
        for _ in 0..2 {
            let r = UndoRecord::insert_text(&b, 0, 0, "x").unwrap();
            ledger.push(&mut b, r).unwrap();
        }
        ledger.undo(&mut b).unwrap();
        ledger.undo(&mut b).unwrap();
        let stats = ledger.on_document_saved(&SavedLines::All);
        assert_eq!((stats.promoted_redo, stats.promoted_undo), (0, 1));
        let pending = ledger.pending();
        assert!(pending[0].flags().contains(UndoFlags::UNDO_LINE1_SAVED));
        assert!(pending[1].flags().contains(UndoFlags::UNDO_LINE1_MODIFIED));
    }

    #[test]
    fn reconciliation_twice_is_stable() {
        let mut b = modified_buffer("one\ntwo");
        let mut ledger = UndoLedger::new();
        let r = UndoRecord::wrap_line(&b, 0, 1, true).unwrap();
        ledger.push(&mut b, r).unwrap();
        let r = UndoRecord::insert_text(&b, 2, 0, "x").unwrap();
        ledger.push(&mut b, r).unwrap();
        ledger.undo(&mut b).unwrap();

        ledger.on_document_saved(&SavedLines::All);
        let first: Vec<_> = ledger.records.iter().map(UndoRecord::flags).collect();
        ledger.on_document_saved(&SavedLines::All);
        let second: Vec<_> = ledger.records.iter().map(UndoRecord::flags).collect();
        assert_eq!(first, second);
    }
}
