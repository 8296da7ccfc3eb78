use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Result};
use dbfgrid::{
    CellFlags, DbfRecord, DbfTable, EventFilter, FieldDescriptor, FieldValue, GridEvent,
    OpenMode, PagedModel, Purpose, RecordSource, Scope,
};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_path(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join("dbfgrid-test-edit");
    fs::create_dir_all(&dir).unwrap();
    dir.join(format!("{prefix}-{pid}-{t}-{id}.dbf"))
}

fn build_people(path: &PathBuf) -> Result<()> {
    let fields = vec![
        FieldDescriptor::character("NAME", 10),
        FieldDescriptor::character("CITY", 10),
        FieldDescriptor::numeric("AGE", 3, 0),
    ];
    DbfTable::create(path, &fields)?;
    let mut table = DbfTable::new(path);
    table.open(OpenMode::ReadWrite)?;
    table.append(&[
        FieldValue::Character("ada".into()),
        FieldValue::Character("london".into()),
        FieldValue::Integer(36),
    ])?;
    table.append(&[
        FieldValue::Character("grace".into()),
        FieldValue::Character("arlington".into()),
        FieldValue::Integer(45),
    ])?;
    Ok(())
}

#[test]
fn write_then_read_back() -> Result<()> {
    let path = unique_path("write");
    build_people(&path)?;

    let mut model = PagedModel::open(&path, OpenMode::ReadWrite)?;
    assert!(model.flags(0, 1).contains(CellFlags::EDITABLE));

    assert!(model.set_cell(0, 1, FieldValue::Character("X".into()), Purpose::Edit));
    assert_eq!(
        model.cell(0, 1, Purpose::Edit),
        Some(FieldValue::Character("X".to_string()))
    );
    drop(model);

    // The write went to disk: a fresh model sees it (padded in storage,
    // trimmed through the edit purpose).
    let model = PagedModel::open(&path, OpenMode::ReadOnly)?;
    assert_eq!(
        model.cell(0, 1, Purpose::Display),
        Some(FieldValue::Character("X         ".to_string()))
    );
    assert_eq!(
        model.cell(0, 1, Purpose::Edit),
        Some(FieldValue::Character("X".to_string()))
    );
    Ok(())
}

#[test]
fn only_the_edit_purpose_writes() -> Result<()> {
    let path = unique_path("purpose");
    build_people(&path)?;

    let mut model = PagedModel::open(&path, OpenMode::ReadWrite)?;
    let before = model.cell(0, 0, Purpose::Display);

    assert!(!model.set_cell(0, 0, FieldValue::Character("nope".into()), Purpose::Display));
    assert!(!model.set_cell(0, 0, FieldValue::Character("nope".into()), Purpose::Custom(7)));
    assert_eq!(model.cell(0, 0, Purpose::Display), before);

    // Bad coordinates fail without touching anything.
    assert!(!model.set_cell(99, 0, FieldValue::Null, Purpose::Edit));
    assert!(!model.set_cell(0, 99, FieldValue::Null, Purpose::Edit));
    Ok(())
}

#[test]
fn reads_outside_the_grid_are_empty() -> Result<()> {
    let path = unique_path("reads");
    build_people(&path)?;

    let model = PagedModel::open(&path, OpenMode::ReadOnly)?;
    assert_eq!(model.cell(99, 0, Purpose::Edit), None);
    assert_eq!(model.cell(0, 99, Purpose::Display), None);
    // Cells only answer the display and edit purposes.
    assert_eq!(model.cell(0, 0, Purpose::Custom(7)), None);
    Ok(())
}

#[test]
fn closed_source_rejects_writes() -> Result<()> {
    let path = unique_path("closed");
    build_people(&path)?;

    let mut model = PagedModel::open(&path, OpenMode::ReadWrite)?;
    model.close();
    assert!(!model.set_cell(0, 0, FieldValue::Character("X".into()), Purpose::Edit));
    Ok(())
}

#[test]
fn encode_overflow_rolls_back() -> Result<()> {
    let path = unique_path("overflow");
    build_people(&path)?;

    let mut model = PagedModel::open(&path, OpenMode::ReadWrite)?;
    // AGE is N:3 — 1000 does not fit, so persistence fails and the cached
    // value must roll back.
    assert!(!model.set_cell(0, 2, FieldValue::Integer(1000), Purpose::Edit));
    assert_eq!(model.cell(0, 2, Purpose::Display), Some(FieldValue::Integer(36)));
    Ok(())
}

// ---------------- mock source: scripted failures ----------------

/// In-memory source whose persist/seek can be made to fail on demand.
struct MockSource {
    fields: Vec<FieldDescriptor>,
    slots: Vec<DbfRecord>,
    open: bool,
    mode: Option<OpenMode>,
    position: i64,
    current: DbfRecord,
    fail_persist: Arc<AtomicBool>,
    fail_seek: Arc<AtomicBool>,
}

impl MockSource {
    fn new(fields: Vec<FieldDescriptor>, rows: Vec<Vec<FieldValue>>) -> Self {
        let slots: Vec<DbfRecord> = rows
            .into_iter()
            .enumerate()
            .map(|(i, values)| DbfRecord::from_parts(i as i64, false, values))
            .collect();
        let columns = fields.len();
        Self {
            fields,
            slots,
            open: false,
            mode: None,
            position: -1,
            current: DbfRecord::blank(columns),
            fail_persist: Arc::new(AtomicBool::new(false)),
            fail_seek: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl RecordSource for MockSource {
    fn open(&mut self, mode: OpenMode) -> Result<()> {
        if self.open {
            bail!("already open");
        }
        self.open = true;
        self.mode = Some(mode);
        self.position = -1;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
        self.mode = None;
        self.position = -1;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn open_mode(&self) -> Option<OpenMode> {
        self.mode
    }

    fn record_count(&self) -> usize {
        self.slots.len()
    }

    fn position(&self) -> i64 {
        self.position
    }

    fn seek(&mut self, pos: i64) -> bool {
        if !self.open || self.fail_seek.load(Ordering::Relaxed) {
            return false;
        }
        if pos < -1 || pos >= self.slots.len() as i64 {
            return false;
        }
        self.position = pos;
        true
    }

    fn next(&mut self) -> bool {
        if !self.open || self.position + 1 >= self.slots.len() as i64 {
            return false;
        }
        self.position += 1;
        self.current = self.slots[self.position as usize].clone();
        true
    }

    fn record(&self) -> &DbfRecord {
        &self.current
    }

    fn persist(&mut self, record: &DbfRecord) -> bool {
        if !self.open
            || self.mode != Some(OpenMode::ReadWrite)
            || self.fail_persist.load(Ordering::Relaxed)
        {
            return false;
        }
        let pos = record.position();
        if pos < 0 || pos >= self.slots.len() as i64 {
            return false;
        }
        self.slots[pos as usize] = record.clone();
        true
    }

    fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

fn mock_with_rows() -> (MockSource, Arc<AtomicBool>, Arc<AtomicBool>) {
    let fields = vec![
        FieldDescriptor::character("A", 6),
        FieldDescriptor::character("B", 6),
    ];
    let rows = vec![
        vec![FieldValue::Character("a0".into()), FieldValue::Character("b0".into())],
        vec![FieldValue::Character("a1".into()), FieldValue::Character("b1".into())],
    ];
    let src = MockSource::new(fields, rows);
    let fp = src.fail_persist.clone();
    let fs_ = src.fail_seek.clone();
    (src, fp, fs_)
}

#[test]
fn persist_failure_rolls_back_and_stays_silent() -> Result<()> {
    let (mut src, fail_persist, _) = mock_with_rows();
    src.open(OpenMode::ReadWrite)?;
    let mut model = PagedModel::bind(src)?;
    model.fetch_all()?;
    assert_eq!(model.row_count(), 2);

    let events: Arc<Mutex<Vec<GridEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let ev = events.clone();
    let _h = model.subscribe(EventFilter::Cells, move |e| {
        ev.lock().unwrap().push(e.clone());
    });

    // First write succeeds.
    assert!(model.set_cell(0, 1, FieldValue::Character("X".into()), Purpose::Edit));
    assert_eq!(
        model.cell(0, 1, Purpose::Edit),
        Some(FieldValue::Character("X".to_string()))
    );

    // Second write to the same cell fails persistence: the cached value
    // stays "X" and no event is published.
    fail_persist.store(true, Ordering::Relaxed);
    assert!(!model.set_cell(0, 1, FieldValue::Character("Y".into()), Purpose::Edit));
    assert_eq!(
        model.cell(0, 1, Purpose::Edit),
        Some(FieldValue::Character("X".to_string()))
    );

    let got = events.lock().unwrap().clone();
    assert_eq!(got, vec![GridEvent::CellChanged { row: 0, col: 1 }]);
    Ok(())
}

#[test]
fn stale_resume_position_is_an_error() -> Result<()> {
    let (mut src, _, fail_seek) = mock_with_rows();
    src.open(OpenMode::ReadOnly)?;
    let mut model = PagedModel::bind(src)?;

    let events: Arc<Mutex<Vec<GridEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let ev = events.clone();
    let _h = model.subscribe(EventFilter::Rows, move |e| {
        ev.lock().unwrap().push(e.clone());
    });

    fail_seek.store(true, Ordering::Relaxed);
    assert!(model.has_more(Scope::Table));
    assert!(model.fetch_next_batch(Scope::Table).is_err());

    // Nothing was cached and nothing was announced.
    assert_eq!(model.row_count(), 0);
    assert!(events.lock().unwrap().is_empty());
    Ok(())
}
