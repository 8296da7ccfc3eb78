//! model/fetch — the two-call pagination protocol.
//!
//! Callers drive it explicitly: `while model.has_more(Scope::Table)
//! { model.fetch_next_batch(Scope::Table)?; }` drains the source;
//! one call per scroll event loads incrementally. Each batch appends at most
//! `prefetch` live records, so one call is bounded work.

use anyhow::{bail, Result};
use log::{debug, warn};

use crate::source::RecordSource;
use crate::subs::GridEvent;

use super::{PagedModel, Scope};

impl<S: RecordSource> PagedModel<S> {
    /// True when another batch can be fetched: whole-table scope, source
    /// open, not exhausted, and not every source record consumed yet.
    /// Pure predicate.
    pub fn has_more(&self, scope: Scope) -> bool {
        scope == Scope::Table
            && !self.exhausted
            && self.source.is_open()
            && self.rows.len() + self.deleted_count < self.source.record_count()
    }

    /// Fetch the next batch of live records into the cache. Returns the
    /// number of rows appended.
    ///
    /// A non-table scope or an exhausted source is a no-op returning 0.
    /// A source that cannot resume at the last consumed position (closed,
    /// stale) is an error; nothing is emitted or cached in that case.
    /// A source that stops delivering before its declared record count (a
    /// short or truncated file) ends the protocol: the batch keeps whatever
    /// was read and `has_more` answers false from then on.
    ///
    /// Observers see `RowsAboutToBeInserted` (the announced 1-based range)
    /// before the cache changes and `RowsInserted` (the count actually
    /// appended) after — the bracket closes even when the source runs out
    /// mid-batch.
    pub fn fetch_next_batch(&mut self, scope: Scope) -> Result<usize> {
        if scope != Scope::Table || !self.has_more(scope) {
            return Ok(0);
        }

        if !self.source.seek(self.last_position) {
            bail!("fetch: source cannot resume at position {}", self.last_position);
        }

        let remaining = self.source.record_count() - self.rows.len() - self.deleted_count;
        let batch = remaining.min(self.prefetch);
        let first = self.rows.len() + 1;
        let last = self.rows.len() + batch;
        self.subs.publish(&GridEvent::RowsAboutToBeInserted { first, last });

        let mut appended = 0usize;
        while appended < batch {
            if !self.source.next() {
                // The source ran out before its declared count. Latch
                // exhaustion so the drain loop terminates on short files.
                self.exhausted = true;
                let consumed = (self.last_position + 1) as usize;
                if consumed < self.source.record_count() {
                    warn!(
                        "fetch: source ended after {} of {} records",
                        consumed,
                        self.source.record_count()
                    );
                }
                break;
            }
            let record = self.source.record().clone();
            self.last_position = self.source.position();
            if record.is_deleted() {
                self.deleted_count += 1;
                continue;
            }
            self.rows.push(record);
            appended += 1;
        }

        self.subs.publish(&GridEvent::RowsInserted { appended });
        debug!(
            "fetched {} rows (cache {}, deleted {})",
            appended,
            self.rows.len(),
            self.deleted_count
        );
        Ok(appended)
    }

    /// Drain the source completely. Returns the total rows appended.
    pub fn fetch_all(&mut self) -> Result<usize> {
        let mut total = 0;
        while self.has_more(Scope::Table) {
            total += self.fetch_next_batch(Scope::Table)?;
        }
        Ok(total)
    }
}
