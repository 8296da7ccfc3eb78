use anyhow::Result;
use std::path::PathBuf;

use dbfgrid::{OpenMode, PagedModel, Purpose, Scope};

use super::util::value_to_json;

pub fn exec(path: PathBuf, limit: Option<usize>, json: bool) -> Result<()> {
    let mut model = PagedModel::open(&path, OpenMode::ReadOnly)?;

    // Drive the protocol until the limit is covered (or the table drained).
    let want = limit.unwrap_or(usize::MAX);
    while model.row_count() < want && model.has_more(Scope::Table) {
        model.fetch_next_batch(Scope::Table)?;
    }
    let shown = model.row_count().min(want);

    if json {
        let mut out = Vec::with_capacity(shown);
        for row in 0..shown {
            let mut obj = serde_json::Map::new();
            for (col, fd) in model.fields().iter().enumerate() {
                let v = model.cell(row, col, Purpose::Display).unwrap_or_default();
                obj.insert(fd.name.clone(), value_to_json(&v));
            }
            out.push(serde_json::Value::Object(obj));
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let names: Vec<&str> = model.fields().iter().map(|f| f.name.as_str()).collect();
    println!("{}", names.join(" | "));
    for row in 0..shown {
        let cells: Vec<String> = (0..model.column_count())
            .map(|col| {
                model
                    .cell(row, col, Purpose::Edit)
                    .map(|v| v.to_string())
                    .unwrap_or_default()
            })
            .collect();
        println!("{}", cells.join(" | "));
    }
    println!(
        "({} rows, {} deleted records skipped)",
        shown,
        model.deleted_count()
    );
    Ok(())
}
