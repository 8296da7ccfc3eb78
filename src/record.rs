//! One table record: ordered field values, a deleted flag, and the source
//! slot it was read from. The slot position is what `persist` writes back to,
//! so a record cached by the model keeps its write-back handle even after the
//! source cursor has moved on.

use crate::consts::BEFORE_FIRST;
use crate::value::FieldValue;

#[derive(Clone, Debug, PartialEq)]
pub struct DbfRecord {
    position: i64,
    deleted: bool,
    values: Vec<FieldValue>,
}

impl DbfRecord {
    /// Blank record with `columns` Null values and no source slot.
    pub fn blank(columns: usize) -> Self {
        Self {
            position: BEFORE_FIRST,
            deleted: false,
            values: vec![FieldValue::Null; columns],
        }
    }

    /// Assemble a record for a known source slot. Mostly for sources; the
    /// model only ever sees records built by the source it is bound to.
    pub fn from_parts(position: i64, deleted: bool, values: Vec<FieldValue>) -> Self {
        Self {
            position,
            deleted,
            values,
        }
    }

    /// Source slot index this record was read from; `BEFORE_FIRST` when the
    /// record was never read from a source.
    #[inline]
    pub fn position(&self) -> i64 {
        self.position
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Set the logical-deletion mark. Takes effect on disk the next time the
    /// record is persisted.
    pub fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    /// Number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `col`, None when out of range.
    #[inline]
    pub fn value(&self, col: usize) -> Option<&FieldValue> {
        self.values.get(col)
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    /// Overwrite the value at `col`. False when out of range.
    pub fn set_value(&mut self, col: usize, value: FieldValue) -> bool {
        match self.values.get_mut(col) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}
