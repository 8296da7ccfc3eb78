//! source — the sequential record-source contract and its DBF implementation.
//!
//! A record source is a forward-only cursor over a fixed-schema table with
//! seek support: the paged model resumes it at the last consumed position,
//! advances record by record, and (in read-write mode) writes a full record
//! back to the slot it came from. Exactly one model owns one open source.

pub mod dbf;

pub use dbf::DbfTable;

use anyhow::Result;

use crate::field::FieldDescriptor;
use crate::record::DbfRecord;

/// How a source is opened. Read-write unlocks `persist` and makes the
/// model's cells editable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenMode {
    ReadOnly,
    ReadWrite,
}

/// Sequential, seekable cursor over a fixed-schema table.
///
/// Soft failures (`seek`, `next`, `persist`) are `bool`, matching the
/// cursor-style contract: a false from `next` means "exhausted" (read errors
/// are logged and reported the same way), a false from `seek`/`persist`
/// means the operation did not happen. Only `open` can fail with a real
/// error worth a backtrace.
pub trait RecordSource {
    fn open(&mut self, mode: OpenMode) -> Result<()>;

    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Mode of the current open, None when closed.
    fn open_mode(&self) -> Option<OpenMode>;

    /// Total records in the source, deleted slots included.
    fn record_count(&self) -> usize;

    /// Current cursor position; `BEFORE_FIRST` right after open.
    fn position(&self) -> i64;

    /// Reposition the cursor. Valid positions are `BEFORE_FIRST..record_count`.
    /// False on a closed source or an out-of-range position.
    fn seek(&mut self, pos: i64) -> bool;

    /// Advance to the next record, loading it into the accessor.
    /// False when exhausted (or on a read error, which is logged).
    fn next(&mut self) -> bool;

    /// The record loaded by the last successful `next`.
    fn record(&self) -> &DbfRecord;

    /// Write `record`'s field values back to its source slot.
    /// False unless open read-write with a valid slot position.
    fn persist(&mut self, record: &DbfRecord) -> bool;

    /// Schema snapshot: one descriptor per column, fixed at open.
    fn fields(&self) -> &[FieldDescriptor];
}
