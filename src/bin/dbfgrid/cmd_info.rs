use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use dbfgrid::{DbfTable, FieldDescriptor, OpenMode, RecordSource};

#[derive(Serialize)]
struct TableInfo<'a> {
    path: String,
    version: u8,
    last_update: String,
    records: usize,
    columns: usize,
    fields: &'a [FieldDescriptor],
}

pub fn exec(path: PathBuf, json: bool) -> Result<()> {
    let mut table = DbfTable::new(&path);
    table.open(OpenMode::ReadOnly)?;

    let (y, m, d) = table.last_update();
    if json {
        let info = TableInfo {
            path: path.display().to_string(),
            version: table.version(),
            last_update: format!("{:04}-{:02}-{:02}", y, m, d),
            records: table.record_count(),
            columns: table.fields().len(),
            fields: table.fields(),
        };
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", path.display());
    println!("  version:     0x{:02X}", table.version());
    println!("  last update: {:04}-{:02}-{:02}", y, m, d);
    println!("  records:     {}", table.record_count());
    println!("  columns:     {}", table.fields().len());
    for (i, fd) in table.fields().iter().enumerate() {
        println!(
            "  [{:>2}] {:<11} {:?} len {} dec {}",
            i, fd.name, fd.field_type, fd.length, fd.decimals
        );
    }
    Ok(())
}
