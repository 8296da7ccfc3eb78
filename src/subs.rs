//! In-process subscriptions (live grid events) for PagedModel.
//!
//! Scope:
//! - Local pub/sub: the model publishes an event at every documented
//!   notification point (row-insert brackets, cell change, header change).
//! - Subscribe with an EventFilter to receive only one family of events.
//! - Drop of SubscriptionHandle unsubscribes.
//!
//! Notes:
//! - Callbacks run synchronously on the thread that mutated the model, right
//!   at the notification point. Keep them fast and non-blocking.
//! - The registry is owned by the model (one per instance).
//! - This module does not depend on the DBF format and can be reused.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

/// A single change event published by the model.
///
/// Row indices in `RowsAboutToBeInserted` follow the 1-based inclusive
/// display convention: a batch growing the grid from `n` rows announces
/// `first = n + 1, last = n + batch`. `RowsInserted` closes the bracket with
/// the count actually appended, which is smaller than announced when the
/// source ran out mid-batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridEvent {
    RowsAboutToBeInserted { first: usize, last: usize },
    RowsInserted { appended: usize },
    CellChanged { row: usize, col: usize },
    HeaderChanged { col: usize },
}

/// Which event family a subscriber wants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventFilter {
    All,
    Rows,
    Cells,
    Headers,
}

impl EventFilter {
    fn matches(self, ev: &GridEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Rows => matches!(
                ev,
                GridEvent::RowsAboutToBeInserted { .. } | GridEvent::RowsInserted { .. }
            ),
            EventFilter::Cells => matches!(ev, GridEvent::CellChanged { .. }),
            EventFilter::Headers => matches!(ev, GridEvent::HeaderChanged { .. }),
        }
    }
}

type Callback = Arc<dyn Fn(&GridEvent) + Send + Sync + 'static>;

#[derive(Default)]
struct SubInner {
    next_id: u64,
    subs: HashMap<u64, (EventFilter, Callback)>,
}

/// Subscription registry (held inside the model).
pub struct SubRegistry {
    inner: Mutex<SubInner>,
}

impl SubRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(SubInner::default()),
        })
    }

    /// Subscribe for events matching `filter`.
    /// Returns a handle; dropping it unsubscribes.
    pub fn subscribe(self: &Arc<Self>, filter: EventFilter, cb: Callback) -> SubscriptionHandle {
        let mut g = self.inner.lock().unwrap();
        let id = g.next_id;
        g.next_id = g.next_id.wrapping_add(1);
        g.subs.insert(id, (filter, cb));
        drop(g);
        SubscriptionHandle {
            id,
            reg: Arc::downgrade(self),
        }
    }

    /// Publish an event to all subscribers whose filter matches.
    pub fn publish(&self, ev: &GridEvent) {
        let callbacks: Vec<Callback> = {
            let g = self.inner.lock().unwrap();
            g.subs
                .values()
                .filter_map(|(filter, cb)| {
                    if filter.matches(ev) {
                        Some(cb.clone())
                    } else {
                        None
                    }
                })
                .collect()
        };
        // Execute outside the lock
        for cb in callbacks {
            cb(ev);
        }
    }

    fn unsubscribe(&self, id: u64) {
        let mut g = self.inner.lock().unwrap();
        g.subs.remove(&id);
    }
}

/// RAII handle: unsubscribes on drop.
pub struct SubscriptionHandle {
    id: u64,
    reg: Weak<SubRegistry>,
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(reg) = self.reg.upgrade() {
            reg.unsubscribe(self.id);
        }
    }
}

/// Helper for building callbacks without spelling the Arc type.
pub fn callback<F>(f: F) -> Callback
where
    F: Fn(&GridEvent) + Send + Sync + 'static,
{
    Arc::new(f)
}
