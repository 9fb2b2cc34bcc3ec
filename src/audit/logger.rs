//! Append-only JSONL audit log

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::entry::{AuditEntry, EntityType};
use crate::error::{HearthError, HearthResult};

/// Writes audit entries, one JSON object per line
#[derive(Debug, Clone)]
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
        }
    }

    /// Append one entry and flush it.
    ///
    /// Updates that changed nothing but timestamps are skipped.
    pub fn log(&self, entry: &AuditEntry) -> HearthResult<()> {
        if !entry.has_changes() {
            return Ok(());
        }
        self.append(entry)
    }

    fn append(&self, entry: &AuditEntry) -> HearthResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| HearthError::Io(format!("Failed to open audit log: {}", e)))?;

        let line = serde_json::to_string(entry)
            .map_err(|e| HearthError::Json(format!("Failed to serialize audit entry: {}", e)))?;
        writeln!(file, "{}", line)
            .map_err(|e| HearthError::Io(format!("Failed to write audit entry: {}", e)))?;

        file.flush()
            .map_err(|e| HearthError::Io(format!("Failed to flush audit log: {}", e)))?;

        debug!(entity = %entry.entity_id, path = %self.log_path.display(), "appended audit entry");
        Ok(())
    }

    /// Every entry in the log, oldest first
    pub fn read_all(&self) -> HearthResult<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| HearthError::Io(format!("Failed to open audit log: {}", e)))?;

        let mut entries = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                HearthError::Io(format!("Failed to read audit log line {}: {}", index + 1, e))
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line).map_err(|e| {
                HearthError::Json(format!("Malformed audit entry at line {}: {}", index + 1, e))
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// The last `count` entries, oldest first
    pub fn read_recent(&self, count: usize) -> HearthResult<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        let skip = entries.len().saturating_sub(count);
        Ok(entries.split_off(skip))
    }

    /// History of a single entity, oldest first
    pub fn history_of(&self, entity_type: EntityType, entity_id: &str) -> HearthResult<Vec<AuditEntry>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|e| e.entity_type == entity_type && e.entity_id == entity_id)
            .collect())
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use serde_json::json;
    use tempfile::TempDir;

    fn logger() -> (AuditLogger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let logger = AuditLogger::new(temp_dir.path().join("audit.log"));
        (logger, temp_dir)
    }

    #[test]
    fn test_empty_log_reads_nothing() {
        let (logger, _temp) = logger();
        assert!(logger.read_all().unwrap().is_empty());
        assert!(logger.read_recent(5).unwrap().is_empty());
    }

    #[test]
    fn test_log_and_read_back() {
        let (logger, _temp) = logger();
        logger
            .log(&AuditEntry::created(EntityType::Expense, "e1", &json!({"amount": 4.5})))
            .unwrap();
        logger
            .log(&AuditEntry::deleted(EntityType::Expense, "e1", &json!({"amount": 4.5})))
            .unwrap();

        let entries = logger.read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].operation, Operation::Create);
        assert_eq!(entries[1].operation, Operation::Delete);
        assert!(entries[1].after.is_none());
    }

    #[test]
    fn test_read_recent_keeps_order() {
        let (logger, _temp) = logger();
        for i in 0..6 {
            logger
                .log(&AuditEntry::created(EntityType::Category, format!("c{}", i), &json!({"i": i})))
                .unwrap();
        }

        let recent = logger.read_recent(2).unwrap();
        let ids: Vec<&str> = recent.iter().map(|e| e.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["c4", "c5"]);
    }

    #[test]
    fn test_noop_updates_are_skipped() {
        let (logger, _temp) = logger();
        let state = json!({"name": "Rent"});
        logger
            .log(&AuditEntry::updated(EntityType::Category, "c1", &state, &state))
            .unwrap();
        assert!(logger.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_history_of_filters_by_entity() {
        let (logger, _temp) = logger();
        logger
            .log(&AuditEntry::created(EntityType::Budget, "b1", &json!({})))
            .unwrap();
        logger
            .log(&AuditEntry::created(EntityType::Category, "b1", &json!({})))
            .unwrap();
        logger
            .log(&AuditEntry::updated(EntityType::Budget, "b1", &json!({"n": 1}), &json!({"n": 2})))
            .unwrap();

        let history = logger.history_of(EntityType::Budget, "b1").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].changes.as_deref(), Some("n: 1 -> 2"));
    }

    #[test]
    fn test_reopen_reads_existing_entries() {
        let (logger, temp) = logger();
        logger
            .log(&AuditEntry::created(EntityType::Expense, "e1", &json!({})))
            .unwrap();

        let reopened = AuditLogger::new(temp.path().join("audit.log"));
        assert_eq!(reopened.read_all().unwrap().len(), 1);
    }
}
