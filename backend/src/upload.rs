use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Uploaded bytes spooled to a uniquely named file for the lifetime of one
/// request. The file is removed on drop, so every exit path (success,
/// validation failure, decode failure) cleans up after itself.
pub struct TempUpload {
    path: PathBuf,
    file: Option<File>,
    size: usize,
}

impl TempUpload {
    pub fn create(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("upload-{}", Uuid::new_v4()));
        let file = File::create(&path)?;
        Ok(Self {
            path,
            file: Some(file),
            size: 0,
        })
    }

    pub fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::other("upload already finished"))?;
        file.write_all(chunk)?;
        self.size += chunk.len();
        Ok(())
    }

    /// Flushes and closes the handle; the spooled file stays on disk until
    /// the guard is dropped.
    pub fn finish(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        self.file.take();
        if let Err(e) = fs::remove_file(&self.path) {
            log::debug!("Failed to remove temp upload {}: {}", self.path.display(), e);
        }
    }
}
