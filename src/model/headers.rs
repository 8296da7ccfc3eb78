//! model/headers — per-column header overrides.
//!
//! Overrides layer over the schema: an exact (column, purpose) override wins;
//! for the display purpose an edit override doubles as the display label,
//! then the schema column name, then the 1-based ordinal. The row axis never
//! stores anything and answers with ordinals only.

use std::collections::HashMap;

use crate::consts::HEADER_BLOCK;
use crate::source::RecordSource;
use crate::subs::GridEvent;
use crate::value::FieldValue;

use super::{Axis, PagedModel, Purpose};

impl<S: RecordSource> PagedModel<S> {
    /// Store a header override for (col, purpose). Rejected for the row axis
    /// and for columns outside the schema.
    pub fn set_header(&mut self, col: usize, axis: Axis, purpose: Purpose, value: FieldValue) -> bool {
        if axis != Axis::Columns || col >= self.column_count() {
            return false;
        }

        if self.headers.len() <= col {
            // Amortized growth; the block size is not observable.
            let new_len = (col + 1).max(HEADER_BLOCK);
            self.headers.resize_with(new_len, HashMap::new);
        }
        self.headers[col].insert(purpose, value);

        self.subs.publish(&GridEvent::HeaderChanged { col });
        true
    }

    /// Header value for (col, axis, purpose), walking the fallback chain.
    /// Returns None only for a non-display purpose with nothing stored.
    pub fn header(&self, col: usize, axis: Axis, purpose: Purpose) -> Option<FieldValue> {
        if axis == Axis::Columns {
            let overrides = self.headers.get(col);
            if let Some(v) = overrides.and_then(|m| m.get(&purpose)) {
                return Some(v.clone());
            }
            if purpose == Purpose::Display {
                // An edit label doubles as the display label.
                if let Some(v) = overrides.and_then(|m| m.get(&Purpose::Edit)) {
                    return Some(v.clone());
                }
                if let Some(fd) = self.fields.get(col) {
                    return Some(FieldValue::Character(fd.name.clone()));
                }
            }
        }

        if purpose == Purpose::Display {
            return Some(FieldValue::Integer(col as i64 + 1));
        }
        None
    }
}
