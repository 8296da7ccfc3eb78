//! model/data — per-cell read and write.
//!
//! Reads never mutate storage: an edit-purpose read of a Character value
//! returns a trimmed copy, the cached value keeps its padding. Writes are
//! optimistic with rollback: the cache is updated first, then the full
//! record is persisted to its source slot; a persist failure restores the
//! snapshot and reports false with no event.

use crate::source::RecordSource;
use crate::subs::GridEvent;
use crate::value::FieldValue;

use super::{PagedModel, Purpose};

impl<S: RecordSource> PagedModel<S> {
    /// Cell value for a purpose. None for out-of-range coordinates or a
    /// purpose other than Display/Edit — an empty result, not an error.
    pub fn cell(&self, row: usize, col: usize, purpose: Purpose) -> Option<FieldValue> {
        if row >= self.row_count() || col >= self.column_count() {
            return None;
        }
        let value = self.rows[row].value(col)?;
        match purpose {
            Purpose::Display => Some(value.clone()),
            Purpose::Edit => Some(value.trimmed()),
            Purpose::Custom(_) => None,
        }
    }

    /// Write one cell and persist its record. Only the Edit purpose writes;
    /// anything else, a closed source, or bad coordinates return false
    /// without touching anything.
    ///
    /// The single transactional guarantee: either the cached value and the
    /// on-disk slot both hold `value` afterwards (true, one CellChanged
    /// event), or both hold the pre-write value (false, no event).
    pub fn set_cell(&mut self, row: usize, col: usize, value: FieldValue, purpose: Purpose) -> bool {
        if !self.source.is_open() || purpose != Purpose::Edit {
            return false;
        }
        if row >= self.rows.len() || col >= self.column_count() {
            return false;
        }

        let old = match self.rows[row].value(col) {
            Some(v) => v.clone(),
            None => return false,
        };
        self.rows[row].set_value(col, value);

        if !self.source.persist(&self.rows[row]) {
            self.rows[row].set_value(col, old);
            return false;
        }

        self.subs.publish(&GridEvent::CellChanged { row, col });
        true
    }
}
