//! Audit log persistence
//!
//! JSON-lines file, one event per line, append-only. Appends run the full
//! open-write-flush cycle under a single mutex so concurrent enforcement
//! calls cannot interleave partial lines; readers always observe whole
//! events. Entries are never reordered or deleted.

use crate::audit::AuditEvent;
use complyflow_core::{Error, Result};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Append-only audit log backed by a JSON-lines file
pub struct AuditLog {
    path: PathBuf,
    writer: Mutex<Option<BufWriter<File>>>,
}

impl AuditLog {
    /// Create a handle for the log at `path`. The file is created on the
    /// first append, not here, so a log that was never written reads back
    /// as an empty sequence.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(None),
        }
    }

    /// File path backing this log
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event and flush it to disk.
    pub fn append(&self, event: &AuditEvent) -> Result<()> {
        let line = serde_json::to_string(event)
            .map_err(|e| Error::audit_write(format!("failed to serialize event: {}", e)))?;

        let mut guard = self.writer.lock();
        if guard.is_none() {
            *guard = Some(self.open_for_append()?);
        }

        let writer = guard.as_mut().unwrap();
        let written = writeln!(writer, "{}", line).and_then(|_| writer.flush());
        if let Err(e) = written {
            // Drop the broken writer so the next append reopens the file.
            *guard = None;
            return Err(Error::audit_write(format!("failed to append event: {}", e)));
        }

        Ok(())
    }

    /// Read the full ordered event sequence. A log file that does not exist
    /// yet is not an error; it yields an empty sequence. Unparseable lines
    /// are skipped.
    pub fn read_all(&self) -> Result<Vec<AuditEvent>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut events = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<AuditEvent>(&line) {
                Ok(event) => events.push(event),
                Err(e) => {
                    debug!("skipping unparseable audit line: {}", e);
                }
            }
        }

        Ok(events)
    }

    /// Events recorded for one policy, in insertion order
    pub fn events_for_policy(&self, policy_id: &str) -> Result<Vec<AuditEvent>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|event| event.policy_id == policy_id)
            .collect())
    }

    fn open_for_append(&self) -> Result<BufWriter<File>> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| Error::audit_write(format!("failed to create audit dir: {}", e)))?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::audit_write(format!("failed to open audit log: {}", e)))?;

        Ok(BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample(policy_id: &str, success: bool) -> AuditEvent {
        AuditEvent::new(
            policy_id,
            "rule-1",
            "flag",
            success,
            "Data flagged for manual review",
            "2026-03-04T10:00:00+00:00",
        )
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::new(dir.path().join("audit_log.jsonl"));

        assert!(log.read_all().unwrap().is_empty());
        assert!(!log.path().exists());
    }

    #[test]
    fn test_append_then_read_preserves_order() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::new(dir.path().join("audit_log.jsonl"));

        log.append(&sample("policy_a", true)).unwrap();
        log.append(&sample("policy_b", false)).unwrap();
        log.append(&sample("policy_a", true)).unwrap();

        let events = log.read_all().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].policy_id, "policy_a");
        assert_eq!(events[1].policy_id, "policy_b");

        let for_a = log.events_for_policy("policy_a").unwrap();
        assert_eq!(for_a.len(), 2);
    }

    #[test]
    fn test_creates_parent_directory_on_first_append() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::new(dir.path().join("compliance/audit_log.jsonl"));

        log.append(&sample("policy_a", true)).unwrap();
        assert!(log.path().exists());
    }

    #[test]
    fn test_unparseable_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit_log.jsonl");
        let log = AuditLog::new(&path);

        log.append(&sample("policy_a", true)).unwrap();
        std::fs::write(
            &path,
            format!(
                "{}\nnot json\n",
                std::fs::read_to_string(&path).unwrap().trim_end()
            ),
        )
        .unwrap();

        assert_eq!(log.read_all().unwrap().len(), 1);
    }
}
