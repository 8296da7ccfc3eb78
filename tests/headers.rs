use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use dbfgrid::{
    Axis, DbfTable, EventFilter, FieldDescriptor, FieldValue, GridEvent, OpenMode, PagedModel,
    Purpose,
};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_path(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join("dbfgrid-test-headers");
    fs::create_dir_all(&dir).unwrap();
    dir.join(format!("{prefix}-{pid}-{t}-{id}.dbf"))
}

fn open_model(prefix: &str) -> Result<PagedModel<DbfTable>> {
    let path = unique_path(prefix);
    DbfTable::create(
        &path,
        &[
            FieldDescriptor::character("NAME", 10),
            FieldDescriptor::numeric("AGE", 3, 0),
        ],
    )?;
    PagedModel::open(&path, OpenMode::ReadOnly)
}

fn chr(s: &str) -> FieldValue {
    FieldValue::Character(s.to_string())
}

#[test]
fn fallback_chain() -> Result<()> {
    let mut model = open_model("chain")?;

    // Nothing set: display falls back to the schema name.
    assert_eq!(model.header(0, Axis::Columns, Purpose::Display), Some(chr("NAME")));
    assert_eq!(model.header(1, Axis::Columns, Purpose::Display), Some(chr("AGE")));
    // Past the schema: 1-based ordinal.
    assert_eq!(
        model.header(5, Axis::Columns, Purpose::Display),
        Some(FieldValue::Integer(6))
    );
    // Non-display purpose with nothing stored: no value.
    assert_eq!(model.header(0, Axis::Columns, Purpose::Edit), None);
    assert_eq!(model.header(0, Axis::Columns, Purpose::Custom(3)), None);

    // An edit override doubles as the display label.
    assert!(model.set_header(0, Axis::Columns, Purpose::Edit, chr("edit label")));
    assert_eq!(
        model.header(0, Axis::Columns, Purpose::Display),
        Some(chr("edit label"))
    );
    assert_eq!(
        model.header(0, Axis::Columns, Purpose::Edit),
        Some(chr("edit label"))
    );

    // An explicit display override takes precedence over everything.
    assert!(model.set_header(0, Axis::Columns, Purpose::Display, chr("Display")));
    assert_eq!(
        model.header(0, Axis::Columns, Purpose::Display),
        Some(chr("Display"))
    );
    assert_eq!(
        model.header(0, Axis::Columns, Purpose::Edit),
        Some(chr("edit label"))
    );

    // Custom purposes only answer exact matches.
    assert!(model.set_header(1, Axis::Columns, Purpose::Custom(9), chr("tooltip")));
    assert_eq!(
        model.header(1, Axis::Columns, Purpose::Custom(9)),
        Some(chr("tooltip"))
    );
    assert_eq!(model.header(1, Axis::Columns, Purpose::Display), Some(chr("AGE")));
    Ok(())
}

#[test]
fn row_axis_answers_ordinals_only() -> Result<()> {
    let mut model = open_model("rows")?;

    assert_eq!(
        model.header(0, Axis::Rows, Purpose::Display),
        Some(FieldValue::Integer(1))
    );
    assert_eq!(
        model.header(41, Axis::Rows, Purpose::Display),
        Some(FieldValue::Integer(42))
    );
    assert_eq!(model.header(0, Axis::Rows, Purpose::Edit), None);

    // Writes to the row axis are rejected.
    assert!(!model.set_header(0, Axis::Rows, Purpose::Display, chr("nope")));
    assert_eq!(
        model.header(0, Axis::Rows, Purpose::Display),
        Some(FieldValue::Integer(1))
    );
    Ok(())
}

#[test]
fn out_of_range_column_rejected() -> Result<()> {
    let mut model = open_model("range")?;
    assert!(!model.set_header(2, Axis::Columns, Purpose::Display, chr("x")));
    assert!(!model.set_header(99, Axis::Columns, Purpose::Display, chr("x")));
    Ok(())
}

#[test]
fn header_changes_are_published() -> Result<()> {
    let mut model = open_model("events")?;

    let events: Arc<Mutex<Vec<GridEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let ev = events.clone();
    let _h = model.subscribe(EventFilter::Headers, move |e| {
        ev.lock().unwrap().push(e.clone());
    });

    assert!(model.set_header(1, Axis::Columns, Purpose::Display, chr("Age")));
    assert!(!model.set_header(1, Axis::Rows, Purpose::Display, chr("nope")));
    assert!(!model.set_header(7, Axis::Columns, Purpose::Display, chr("nope")));

    let got = events.lock().unwrap().clone();
    // Only the accepted write notifies.
    assert_eq!(got, vec![GridEvent::HeaderChanged { col: 1 }]);
    Ok(())
}
