//! CSV persistence of flat record tables.

use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Write records to `path` as CSV with a header row.
///
/// Parent directories are created when missing.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_records_to(file, records)
}

/// Write records as CSV to any writer.
pub fn write_records_to<W: Write, T: Serialize>(writer: W, records: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read every record from the CSV file at `path`.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path)?;
    read_records_from(file)
}

/// Read every record from CSV text produced by any reader.
pub fn read_records_from<R: Read, T: DeserializeOwned>(reader: R) -> Result<Vec<T>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for record in rdr.deserialize() {
        records.push(record?);
    }
    Ok(records)
}
