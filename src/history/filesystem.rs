use super::storage::HistoryStore;
use crate::error::{Result, VeoError};
use crate::models::Turn;
use colored::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Keeps the whole log as one pretty-printed JSON array.
pub struct FileHistoryStore {
    path: PathBuf,
    verbose: bool,
}

impl FileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| VeoError::HistoryWrite {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }
        Ok(())
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> Vec<Turn> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                if self.verbose && e.kind() != ErrorKind::NotFound {
                    eprintln!(
                        "{}",
                        format!("[veo] Could not read {}: {}", self.path.display(), e).dimmed()
                    );
                }
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Turn>>(&content) {
            Ok(turns) => turns,
            Err(e) => {
                if self.verbose {
                    eprintln!(
                        "{}",
                        format!(
                            "[veo] Ignoring malformed history {}: {}",
                            self.path.display(),
                            e
                        )
                        .dimmed()
                    );
                }
                Vec::new()
            }
        }
    }

    fn save(&self, turns: &[Turn]) -> Result<()> {
        self.ensure_parent_dir()?;
        let content = serde_json::to_string_pretty(turns)?;
        fs::write(&self.path, content).map_err(|source| VeoError::HistoryWrite {
            path: self.path.clone(),
            source,
        })
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
