//! JSON snapshot storage for matches
//!
//! Each match lives in `.crease/matches/{id}.json`. Writers serialize on an
//! exclusive `fs2` lock over a sibling `{id}.lock` file and replace the
//! snapshot with temp file + rename, so readers never see half a file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use thiserror::Error;

use super::config::PROJECT_DIR;
use crate::domain::{Match, MatchId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),
}

/// Held for the duration of a read-modify-write on one match.
/// The lock is released when the guard is dropped.
pub struct MatchGuard {
    _file: File,
}

/// Store for match snapshots
pub struct MatchStore {
    dir: PathBuf,
    backup_dir: Option<PathBuf>,
}

impl MatchStore {
    /// Creates a store over `dir` with backups disabled
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            backup_dir: None,
        }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(PROJECT_DIR).join("matches"))
    }

    /// Copies every snapshot into `dir` before it is overwritten or deleted
    pub fn with_backups(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = Some(dir.into());
        self
    }

    /// Returns the matches directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn snapshot_path(&self, id: &MatchId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    fn lock_path(&self, id: &MatchId) -> PathBuf {
        self.dir.join(format!("{}.lock", id))
    }

    /// Returns true if a snapshot exists for `id`
    pub fn exists(&self, id: &MatchId) -> bool {
        self.snapshot_path(id).is_file()
    }

    /// Blocks until this process holds the write lock for `id`
    pub fn lock(&self, id: &MatchId) -> Result<MatchGuard> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;

        let path = self.lock_path(id);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to open lock file: {}", path.display()))?;

        file.lock_exclusive()
            .with_context(|| format!("Failed to acquire write lock on match {}", id))?;

        Ok(MatchGuard { _file: file })
    }

    /// Reads one match
    pub fn read(&self, id: &MatchId) -> Result<Match> {
        let path = self.snapshot_path(id);
        if !path.exists() {
            return Err(StoreError::MatchNotFound(id.clone()).into());
        }

        let file = File::open(&path)
            .with_context(|| format!("Failed to open match: {}", path.display()))?;

        file.lock_shared()
            .context("Failed to acquire read lock on match")?;

        let state: Match = serde_json::from_reader(BufReader::new(&file))
            .with_context(|| format!("Failed to parse match: {}", path.display()))?;

        Ok(state)
    }

    /// Writes a match snapshot (full rewrite)
    pub fn write(&self, state: &Match) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;

        let path = self.snapshot_path(&state.id);
        if path.exists() {
            self.backup(&state.id)?;
        }

        let temp_path = path.with_extension("json.tmp");
        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            file.lock_exclusive()
                .context("Failed to acquire write lock on match")?;

            let mut writer = BufWriter::new(&file);
            serde_json::to_writer_pretty(&mut writer, state).context("Failed to serialize match")?;
            writeln!(writer).context("Failed to write match")?;
            writer.flush().context("Failed to flush match")?;
        }

        fs::rename(&temp_path, &path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                path.display()
            )
        })?;

        tracing::debug!(match_id = %state.id, balls = state.ball_log.len(), "snapshot written");
        Ok(())
    }

    /// Copies the current snapshot of `id` into the backup directory
    fn backup(&self, id: &MatchId) -> Result<()> {
        let Some(backup_dir) = &self.backup_dir else {
            return Ok(());
        };

        fs::create_dir_all(backup_dir)
            .with_context(|| format!("Failed to create directory: {}", backup_dir.display()))?;

        let target = backup_dir.join(format!("{}.json", id));
        fs::copy(self.snapshot_path(id), &target)
            .with_context(|| format!("Failed to back up match to {}", target.display()))?;

        Ok(())
    }

    /// Reads every stored match, oldest first
    pub fn read_all(&self) -> Result<Vec<Match>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read directory: {}", self.dir.display()))?;

        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let id = match path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<MatchId>().ok())
            {
                Some(id) => id,
                None => {
                    tracing::warn!(path = %path.display(), "skipping file with unexpected name");
                    continue;
                }
            };

            matches.push(self.read(&id)?);
        }

        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(matches)
    }

    /// Removes a match. Returns false if it did not exist.
    ///
    /// The lock file stays behind; callers may still hold it.
    pub fn remove(&self, id: &MatchId) -> Result<bool> {
        let path = self.snapshot_path(id);
        if !path.exists() {
            return Ok(false);
        }

        self.backup(id)?;
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove match: {}", path.display()))?;

        Ok(true)
    }
}
