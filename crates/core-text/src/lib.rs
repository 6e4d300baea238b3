//! Attributed line storage.
//!
//! `TextLine` holds one line's characters, its highlight runs and its
//! modified / saved-on-disk flags, and answers the column arithmetic an editor
//! needs (non-space scans, indentation depth, tab expanded virtual columns).
//! `TextBuffer` is the line-sequence surface the undo ledger replays edits
//! against; `LineBuffer` implements it over a `Vec<TextLine>`.

pub mod attribute;
pub mod buffer;
pub mod line;

pub use attribute::{Attribute, AttributeRuns};
pub use buffer::{BufferError, BufferResult, LineBuffer, TextBuffer};
pub use line::{LineState, TextLine};
