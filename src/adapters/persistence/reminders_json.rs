//! Implements ReminderPersistencePort using a JSON file.
//!
//! The whole reminder list is rewritten on every save; lists are small (the provider caps
//! active geofences well below a size where this matters).

use crate::domain::{DomainError, Reminder};
use crate::ports::ReminderPersistencePort;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

pub const REMINDERS_FILE: &str = "reminders.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct RemindersFile {
    reminders: Vec<Reminder>,
}

/// JSON file-based reminder storage.
pub struct RemindersJson {
    path: PathBuf,
}

impl RemindersJson {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `<data_dir>/reminders.json`
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(REMINDERS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl ReminderPersistencePort for RemindersJson {
    async fn load_all(&self) -> Result<Vec<Reminder>, DomainError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no reminders file yet");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(DomainError::Persistence(format!(
                    "read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };
        match serde_json::from_str::<RemindersFile>(&raw) {
            Ok(file) => Ok(file.reminders),
            Err(e) => {
                // A corrupt file must not keep the app from starting; the next save overwrites it.
                warn!(path = %self.path.display(), error = %e, "reminders file unreadable, starting empty");
                Ok(Vec::new())
            }
        }
    }

    /// Atomic save: write temp file, sync_all, rename over the target.
    async fn save_all(&self, reminders: &[Reminder]) -> Result<(), DomainError> {
        let file = RemindersFile {
            reminders: reminders.to_vec(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| DomainError::Persistence(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Persistence(format!("create data dir: {}", e)))?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Persistence(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::Persistence(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Persistence(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| DomainError::Persistence(format!("atomic rename failed: {}", e)))?;

        debug!(path = %self.path.display(), count = reminders.len(), "reminders saved");
        Ok(())
    }
}
