//! Line-sequence collaborator used by the undo ledger.
//!
//! `TextBuffer` is the narrow surface an owning document exposes: line lookup
//! plus the six structural edits that undo records replay. `LineBuffer` is the
//! plain `Vec<TextLine>` implementation.
//!
//! Edits validate every index before touching any line so a failed call leaves
//! the buffer unchanged. Newly created lines start `Clean`; modification flags
//! are owned by the undo ledger and never touched here.

use thiserror::Error;
use tracing::trace;

use crate::line::TextLine;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("line {line} out of range (buffer has {count} lines)")]
    LineOutOfRange { line: usize, count: usize },
    #[error("column {column} out of range on line {line} (length {len})")]
    ColumnOutOfRange {
        line: usize,
        column: usize,
        len: usize,
    },
}

pub type BufferResult<T> = Result<T, BufferError>;

pub trait TextBuffer {
    fn line_count(&self) -> usize;
    fn line(&self, line: usize) -> Option<&TextLine>;
    fn line_mut(&mut self, line: usize) -> Option<&mut TextLine>;

    /// Insert `text` into `line` at character column `col`.
    fn insert_text(&mut self, line: usize, col: usize, text: &str) -> BufferResult<()>;
    /// Remove `len` characters of `line` starting at `col`, returning them.
    fn remove_text(&mut self, line: usize, col: usize, len: usize) -> BufferResult<String>;
    /// Move the text after `col` to a new line below (`new_line`), or prepend it to
    /// the existing next line.
    fn wrap_line(&mut self, line: usize, col: usize, new_line: bool) -> BufferResult<()>;
    /// Append the first `len` characters of the next line to `line`; delete the next
    /// line afterwards when `remove_line`.
    fn unwrap_line(&mut self, line: usize, len: usize, remove_line: bool) -> BufferResult<()>;
    /// Insert a new line with `text` so that it becomes index `line`.
    fn insert_line(&mut self, line: usize, text: &str) -> BufferResult<()>;
    /// Delete `line`, returning it.
    fn remove_line(&mut self, line: usize) -> BufferResult<TextLine>;

    /// Lookup that reports a missing line as an error.
    fn checked_line(&self, line: usize) -> BufferResult<&TextLine> {
        let count = self.line_count();
        self.line(line)
            .ok_or(BufferError::LineOutOfRange { line, count })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<TextLine>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Split `content` on `\n` into lines. A trailing newline yields a final empty line.
    pub fn from_str(content: &str) -> Self {
        Self {
            lines: content.split('\n').map(TextLine::new).collect(),
        }
    }

    pub fn from_lines(lines: Vec<TextLine>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut [TextLine] {
        &mut self.lines
    }

    /// Content joined with `\n`.
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(TextLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn index(&self, line: usize) -> BufferResult<usize> {
        if line < self.lines.len() {
            Ok(line)
        } else {
            Err(BufferError::LineOutOfRange {
                line,
                count: self.lines.len(),
            })
        }
    }

    fn column(&self, line: usize, column: usize) -> BufferResult<usize> {
        let len = self.lines[line].len();
        if column <= len {
            Ok(column)
        } else {
            Err(BufferError::ColumnOutOfRange { line, column, len })
        }
    }
}

impl TextBuffer for LineBuffer {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, line: usize) -> Option<&TextLine> {
        self.lines.get(line)
    }

    fn line_mut(&mut self, line: usize) -> Option<&mut TextLine> {
        self.lines.get_mut(line)
    }

    fn insert_text(&mut self, line: usize, col: usize, text: &str) -> BufferResult<()> {
        let line = self.index(line)?;
        let col = self.column(line, col)?;
        self.lines[line].insert_text(col, text);
        trace!(target: "text.buffer", line, col, chars = text.chars().count(), "insert_text");
        Ok(())
    }

    fn remove_text(&mut self, line: usize, col: usize, len: usize) -> BufferResult<String> {
        let line = self.index(line)?;
        let col = self.column(line, col)?;
        self.column(line, col.saturating_add(len))?;
        let removed = self.lines[line].remove_text(col, len);
        trace!(target: "text.buffer", line, col, len, "remove_text");
        Ok(removed)
    }

    fn wrap_line(&mut self, line: usize, col: usize, new_line: bool) -> BufferResult<()> {
        let line = self.index(line)?;
        let col = self.column(line, col)?;
        if !new_line {
            self.index(line + 1)?;
        }
        let tail = self.lines[line].split_off(col);
        if new_line {
            self.lines.insert(line + 1, TextLine::new(tail));
        } else {
            self.lines[line + 1].prepend(&tail);
        }
        trace!(target: "text.buffer", line, col, new_line, lines = self.lines.len(), "wrap_line");
        Ok(())
    }

    fn unwrap_line(&mut self, line: usize, len: usize, remove_line: bool) -> BufferResult<()> {
        let line = self.index(line)?;
        let next = self.index(line + 1)?;
        self.column(next, len)?;
        let moved = self.lines[next].remove_text(0, len);
        self.lines[line].append(&moved);
        if remove_line {
            self.lines.remove(next);
        }
        trace!(target: "text.buffer", line, len, remove_line, lines = self.lines.len(), "unwrap_line");
        Ok(())
    }

    fn insert_line(&mut self, line: usize, text: &str) -> BufferResult<()> {
        if line > self.lines.len() {
            return Err(BufferError::LineOutOfRange {
                line,
                count: self.lines.len(),
            });
        }
        self.lines.insert(line, TextLine::new(text));
        trace!(target: "text.buffer", line, lines = self.lines.len(), "insert_line");
        Ok(())
    }

    fn remove_line(&mut self, line: usize) -> BufferResult<TextLine> {
        let line = self.index(line)?;
        let removed = self.lines.remove(line);
        trace!(target: "text.buffer", line, lines = self.lines.len(), "remove_line");
        Ok(removed)
    }
}
