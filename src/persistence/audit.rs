//! Append-only audit log of combined records.
//!
//! One JSON object per line. The file is never rotated or truncated by the
//! pipeline.

use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::PersistenceError;
use crate::domain::CombinedRecord;

/// JSON-lines audit sink for [`CombinedRecord`]s.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl AuditLog {
    /// Opens (creating if needed) the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Audit`] if the file cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record as a single line.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Encode`] or [`PersistenceError::Audit`] on
    /// failure.
    pub async fn append(&self, record: &CombinedRecord) -> Result<(), PersistenceError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut file = self.file.lock().await;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::price::parse_last_updated;

    fn record(fuel: &str) -> CombinedRecord {
        let Ok(last_updated) = parse_last_updated("01/01/2024 10:00:00") else {
            panic!("valid timestamp");
        };
        CombinedRecord {
            fuel_type: fuel.to_string(),
            price: 180.5,
            last_updated,
            code: "X1".to_string(),
            station_id: None,
            brand_id: None,
            brand: "BP".to_string(),
            name: "BP Ultimo".to_string(),
            address: "1 Harris St".to_string(),
            latitude: -33.8,
            longitude: 151.2,
        }
    }

    #[tokio::test]
    async fn appends_one_line_per_record() {
        let path = std::env::temp_dir().join(format!("audit-{}.jsonl", uuid::Uuid::new_v4()));
        let Ok(log) = AuditLog::open(&path).await else {
            panic!("audit log should open");
        };
        assert!(log.append(&record("E10")).await.is_ok());
        assert!(log.append(&record("U91")).await.is_ok());
        drop(log);

        let Ok(contents) = tokio::fs::read_to_string(&path).await else {
            panic!("audit log should be readable");
        };
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.first().is_some_and(|l| l.contains("\"fueltype\":\"E10\"")));
        assert!(lines.last().is_some_and(|l| l.contains("\"fueltype\":\"U91\"")));

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn reopening_appends_instead_of_truncating() {
        let path = std::env::temp_dir().join(format!("audit-{}.jsonl", uuid::Uuid::new_v4()));
        for fuel in ["E10", "P98"] {
            let Ok(log) = AuditLog::open(&path).await else {
                panic!("audit log should open");
            };
            assert!(log.append(&record(fuel)).await.is_ok());
        }

        let Ok(contents) = tokio::fs::read_to_string(&path).await else {
            panic!("audit log should be readable");
        };
        assert_eq!(contents.lines().count(), 2);

        let _ = tokio::fs::remove_file(&path).await;
    }
}
