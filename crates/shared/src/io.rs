use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::models::PostedRecord;

/// Identifiers already published, kept in insertion order for stable output.
///
/// Identifiers are only ever added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostedSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl PostedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Returns `false` if the identifier was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.seen.contains(&id) {
            return false;
        }
        self.seen.insert(id.clone());
        self.order.push(id);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for PostedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

/// JSON file holding `{ "posted": [...] }`.
///
/// Single writer only: two runs sharing one store file can both post the same
/// item and the later save wins. Serialize runs externally (cron lock, systemd
/// unit) when scheduling.
#[derive(Debug, Clone)]
pub struct PostedStore {
    path: PathBuf,
}

impl PostedStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load previously posted identifiers.
    ///
    /// A missing, empty or malformed file yields an empty set; this never fails.
    pub fn load(&self) -> PostedSet {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %self.path.display(),
                    "no posted-set store yet, starting empty"
                );
                return PostedSet::new();
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "could not read posted-set store, starting empty"
                );
                return PostedSet::new();
            }
        };

        if content.trim().is_empty() {
            return PostedSet::new();
        }

        match serde_json::from_str::<PostedRecord>(&content) {
            Ok(record) => {
                let set: PostedSet = record.posted.into_iter().collect();
                tracing::debug!(
                    path = %self.path.display(),
                    count = set.len(),
                    "loaded posted-set store"
                );
                set
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "posted-set store is corrupt, starting empty"
                );
                PostedSet::new()
            }
        }
    }

    /// Persist the full set, replacing the previous file.
    ///
    /// Writes a sibling temp file, flushes it to disk and renames it over the
    /// target so neither a crash nor a power loss leaves a half-written store.
    pub fn save(&self, set: &PostedSet) -> Result<(), PipelineError> {
        let write_err = |source: std::io::Error| PipelineError::StoreWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let record = PostedRecord {
            posted: set.iter().map(str::to_string).collect(),
        };
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| write_err(std::io::Error::other(e)))?;

        let tmp_path = self.tmp_path();
        write_synced(&tmp_path, json.as_bytes()).map_err(write_err)?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            write_err(e)
        })?;

        tracing::debug!(
            path = %self.path.display(),
            count = set.len(),
            "saved posted-set store"
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "posted.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
