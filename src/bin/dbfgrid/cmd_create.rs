use anyhow::Result;
use std::path::PathBuf;

use dbfgrid::DbfTable;

use super::util::parse_field_spec;

pub fn exec(path: PathBuf, fields: String) -> Result<()> {
    let descriptors = fields
        .split(',')
        .map(|s| parse_field_spec(s.trim()))
        .collect::<Result<Vec<_>>>()?;

    DbfTable::create(&path, &descriptors)?;
    println!("created {} ({} columns)", path.display(), descriptors.len());
    Ok(())
}
