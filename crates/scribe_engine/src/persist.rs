use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::JobId;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    // Writability check: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: impl AsRef<[u8]>) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_ref())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // `persist` replaces an existing target, so readers see either the old or the new file.
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// Files produced while monitoring a job.
pub struct JobOutputs {
    writer: AtomicFileWriter,
}

impl JobOutputs {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
        }
    }

    pub fn artifact_filename(job_id: JobId) -> String {
        format!("job-{job_id}-graph.html")
    }

    pub fn transcript_filename(job_id: JobId) -> String {
        format!("job-{job_id}-console.log")
    }

    /// Overwrites the job's artifact with the latest payload.
    pub fn save_artifact(&self, job_id: JobId, html: &str) -> Result<PathBuf, PersistError> {
        self.writer.write(&Self::artifact_filename(job_id), html)
    }

    /// Writes the full console transcript, one line per log entry.
    pub fn save_transcript(&self, job_id: JobId, logs: &[String]) -> Result<PathBuf, PersistError> {
        let mut content = logs.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        self.writer.write(&Self::transcript_filename(job_id), content)
    }
}
