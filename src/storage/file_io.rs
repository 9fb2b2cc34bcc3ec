//! File I/O utilities with atomic writes
//!
//! A crash mid-write leaves either the old file or the new one, never a
//! truncated mix: data goes to a uniquely named sibling temp file that is
//! synced and then renamed over the target.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;

use crate::error::{HearthError, HearthResult};

/// Read JSON from a file, returning `T::default()` if the file doesn't exist
pub fn read_json<T, P>(path: P) -> HearthResult<T>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| HearthError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| HearthError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write JSON to a file atomically (write to temp, sync, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> HearthResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::create_dir_all(dir).map_err(|e| {
        HearthError::Storage(format!(
            "Failed to create directory {}: {}",
            dir.display(),
            e
        ))
    })?;

    // Dropping the temp file on an early return removes it.
    let mut temp = NamedTempFile::new_in(dir)
        .map_err(|e| HearthError::Storage(format!("Failed to create temp file: {}", e)))?;

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, data)
            .map_err(|e| HearthError::Storage(format!("Failed to serialize data: {}", e)))?;
        writer
            .flush()
            .map_err(|e| HearthError::Storage(format!("Failed to flush data: {}", e)))?;
    }
    temp.as_file()
        .sync_all()
        .map_err(|e| HearthError::Storage(format!("Failed to sync data: {}", e)))?;

    temp.persist(path)
        .map_err(|e| HearthError::Storage(format!("Failed to rename temp file: {}", e)))?;
    Ok(())
}
