use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

use dbfgrid::{OpenMode, PagedModel, Purpose, Scope};

use super::util::parse_value;

pub fn exec(path: PathBuf, row: usize, col: usize, value: String) -> Result<()> {
    let mut model = PagedModel::open(&path, OpenMode::ReadWrite)?;

    // Fetch until the target row is cached.
    while model.row_count() <= row && model.has_more(Scope::Table) {
        model.fetch_next_batch(Scope::Table)?;
    }
    if row >= model.row_count() {
        bail!("row {} out of range ({} rows)", row, model.row_count());
    }
    let fd = model
        .fields()
        .get(col)
        .ok_or_else(|| anyhow!("col {} out of range ({} columns)", col, model.column_count()))?
        .clone();

    let parsed = parse_value(&fd, &value)?;
    if !model.set_cell(row, col, parsed, Purpose::Edit) {
        bail!("write to ({}, {}) failed (persist rejected)", row, col);
    }

    let now = model.cell(row, col, Purpose::Edit).unwrap_or_default();
    println!("({}, {}) {} = {}", row, col, fd.name, now);
    Ok(())
}
