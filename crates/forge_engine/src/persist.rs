use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use forge_core::Download;
use forge_logging::forge_info;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Creates `dir` when missing and checks that files can be created in it.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Saves downloads under a fixed directory with their well-known names.
///
/// Each write goes to a temp file first and is renamed into place, so a
/// previous download of the same kind is either kept whole or replaced whole.
pub struct DownloadWriter {
    dir: PathBuf,
}

impl DownloadWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save(&self, download: &Download) -> Result<PathBuf, PersistError> {
        let path = self.write(download.filename(), &download.bytes)?;
        forge_info!("saved {} bytes to {}", download.bytes.len(), path.display());
        Ok(path)
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}
