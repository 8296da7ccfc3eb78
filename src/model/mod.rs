//! model — the paged view adapter: a grid-like, randomly-addressable view
//! over a sequential record source.
//!
//! The model owns one open source exclusively and materializes it
//! incrementally: callers drive the two-call protocol (`has_more` /
//! `fetch_next_batch`) and the model appends live records to an ordered
//! in-memory cache. A cached row's index is its public handle and is stable
//! for the model's lifetime — rows are appended, never reordered or evicted.
//! Deleted records are counted, never cached.
//!
//! Split:
//! - mod.rs    — state, construction, counts, flags, subscriptions
//! - fetch.rs  — pagination protocol
//! - data.rs   — per-cell read/write with rollback
//! - headers.rs — per-column header overrides and fallback chain

pub mod data;
pub mod fetch;
pub mod headers;

use anyhow::{bail, Result};
use std::collections::HashMap;
use std::ops::BitOr;
use std::path::Path;
use std::sync::Arc;

use crate::config::GridConfig;
use crate::consts::BEFORE_FIRST;
use crate::field::FieldDescriptor;
use crate::record::DbfRecord;
use crate::source::{DbfTable, OpenMode, RecordSource};
use crate::subs::{callback, EventFilter, GridEvent, SubRegistry, SubscriptionHandle};
use crate::value::FieldValue;

/// Named intent of a cell or header access. Cells answer Display and Edit;
/// headers can store overrides under any purpose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Purpose {
    Display,
    Edit,
    Custom(u32),
}

/// Header axis. Only column headers carry overrides; the row axis always
/// answers with ordinals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Columns,
    Rows,
}

/// What a fetch call refers to. Only the whole table can be fetched; any
/// narrower scope makes the protocol a documented no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Table,
    Cell { row: usize, col: usize },
}

/// Per-cell capability flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellFlags(u32);

impl CellFlags {
    pub const ENABLED: CellFlags = CellFlags(0x1);
    pub const SELECTABLE: CellFlags = CellFlags(0x2);
    pub const EDITABLE: CellFlags = CellFlags(0x4);

    pub const fn empty() -> Self {
        CellFlags(0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: CellFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for CellFlags {
    type Output = CellFlags;
    fn bitor(self, rhs: CellFlags) -> CellFlags {
        CellFlags(self.0 | rhs.0)
    }
}

/// Grid view over one record source.
pub struct PagedModel<S: RecordSource> {
    pub(crate) source: S,
    /// Schema snapshot taken at bind time; column count is fixed from here.
    pub(crate) fields: Vec<FieldDescriptor>,
    /// Cached live rows, in source order. Index = public row index.
    pub(crate) rows: Vec<DbfRecord>,
    /// Deleted records skipped so far (bookkeeping only, never cached).
    pub(crate) deleted_count: usize,
    /// Source position of the last consumed record (live or deleted); the
    /// resume point.
    pub(crate) last_position: i64,
    /// Latched when the source stops delivering before its declared record
    /// count (short file, unreadable tail); ends the fetch protocol.
    pub(crate) exhausted: bool,
    /// Per-column header overrides, keyed by purpose. Grown on demand.
    pub(crate) headers: Vec<HashMap<Purpose, FieldValue>>,
    pub(crate) prefetch: usize,
    pub(crate) subs: Arc<SubRegistry>,
}

impl PagedModel<DbfTable> {
    /// Open a DBF file and bind a model to it, pre-fetching the first batch.
    pub fn open(path: &Path, mode: OpenMode) -> Result<Self> {
        Self::open_with_config(path, mode, GridConfig::from_env())
    }

    pub fn open_with_config(path: &Path, mode: OpenMode, cfg: GridConfig) -> Result<Self> {
        let mut table = DbfTable::with_config(path, cfg.clone());
        table.open(mode)?;
        let mut model = Self::bind_with_config(table, &cfg)?;
        if model.has_more(Scope::Table) {
            model.fetch_next_batch(Scope::Table)?;
        }
        Ok(model)
    }
}

impl<S: RecordSource> PagedModel<S> {
    /// Bind a model to an already-open source. The model takes exclusive
    /// ownership; no batch is fetched yet.
    pub fn bind(source: S) -> Result<Self> {
        Self::bind_with_config(source, &GridConfig::from_env())
    }

    pub fn bind_with_config(source: S, cfg: &GridConfig) -> Result<Self> {
        if !source.is_open() {
            bail!("bind: record source is not open");
        }
        let fields = source.fields().to_vec();
        Ok(Self {
            source,
            fields,
            rows: Vec::new(),
            deleted_count: 0,
            last_position: BEFORE_FIRST,
            exhausted: false,
            headers: Vec::new(),
            prefetch: cfg.prefetch.max(1),
            subs: SubRegistry::new(),
        })
    }

    /// Number of cached rows. Grows only through fetch batches.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Schema column count, fixed at bind time.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.fields.len()
    }

    /// Deleted records skipped so far.
    #[inline]
    pub fn deleted_count(&self) -> usize {
        self.deleted_count
    }

    /// Schema snapshot.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Read access to the bound source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Capability flags for a cell. Out-of-range coordinates are enabled
    /// only; in-range cells are selectable, and editable when the source is
    /// open read-write.
    pub fn flags(&self, row: usize, col: usize) -> CellFlags {
        if row >= self.row_count() || col >= self.column_count() {
            return CellFlags::ENABLED;
        }
        match self.source.open_mode() {
            Some(OpenMode::ReadWrite) => {
                CellFlags::ENABLED | CellFlags::SELECTABLE | CellFlags::EDITABLE
            }
            _ => CellFlags::ENABLED | CellFlags::SELECTABLE,
        }
    }

    /// Subscribe to grid events. Dropping the handle unsubscribes.
    pub fn subscribe<F>(&self, filter: EventFilter, f: F) -> SubscriptionHandle
    where
        F: Fn(&GridEvent) + Send + Sync + 'static,
    {
        self.subs.subscribe(filter, callback(f))
    }

    /// Close the underlying source. Cached rows and headers stay readable;
    /// fetching and editing stop working.
    pub fn close(&mut self) {
        self.source.close();
    }
}
