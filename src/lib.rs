//! dbfgrid — an incrementally-paged, randomly-addressable grid view over
//! dBASE (DBF) table files.
//!
//! The table layer (`source`) is a sequential, seekable cursor over the
//! fixed-schema file; the model layer (`model`) adapts it into a grid with
//! stable row indices, demand-driven batch fetching, per-cell edit with
//! rollback, and per-column header overrides. Observers subscribe to grid
//! events through `subs`.

// Base modules
pub mod consts;
pub mod config;
pub mod util;

// Data model
pub mod value;
pub mod field;
pub mod record;

// Layers
pub mod source; // src/source/{mod,dbf}.rs
pub mod model;  // src/model/{mod,fetch,data,headers}.rs
pub mod subs;

// Convenience re-exports
pub use config::GridConfig;
pub use field::{FieldDescriptor, FieldType};
pub use model::{Axis, CellFlags, PagedModel, Purpose, Scope};
pub use record::DbfRecord;
pub use source::{DbfTable, OpenMode, RecordSource};
pub use subs::{EventFilter, GridEvent, SubscriptionHandle};
pub use value::{Date, FieldValue};
