//! Per-repository scratch folder
//!
//! Generated bundles and PR body drafts live under `<git-dir>/pr-command/` so
//! they never show up in `git status` and never block a rewrite.

use crate::error::Result;
use crate::git::GitRepo;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

const SCRATCH_DIR_NAME: &str = "pr-command";

/// Write-once, read-once files scoped to one repository
#[derive(Debug, Clone)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Scratch folder of `repo`
    pub fn for_repo(repo: &GitRepo) -> Self {
        Self {
            path: repo.git_dir().join(SCRATCH_DIR_NAME),
        }
    }

    /// Folder location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `content` to `name`, replacing any previous file
    pub async fn write(&self, name: &str, content: &str) -> Result<PathBuf> {
        self.write_chunks(name, [content]).await
    }

    /// Write `chunks` to `name` one after another
    pub async fn write_chunks<I, S>(&self, name: &str, chunks: I) -> Result<PathBuf>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fs::create_dir_all(&self.path).await?;
        let path = self.path.join(name);
        let mut out = BufWriter::new(fs::File::create(&path).await?);
        for chunk in chunks {
            out.write_all(chunk.as_ref().as_bytes()).await?;
        }
        out.flush().await?;
        debug!(path = %path.display(), "wrote scratch file");
        Ok(path)
    }

    /// Remove the folder and everything in it
    pub async fn clear(&self) -> Result<()> {
        match fs::remove_dir_all(&self.path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
