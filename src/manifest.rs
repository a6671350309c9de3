use std::collections::HashMap;
use std::path::{Path, PathBuf};

use futures::{stream, StreamExt, TryStreamExt};
use md5::{Digest, Md5};
use walkdir::WalkDir;

/// How many files are read and hashed at once.
const CONCURRENT_READS: usize = 8;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("Unable to walk {0}: {1}")]
    Walk(String, String),

    #[error("No files found in {0}")]
    EmptyDir(String),

    #[error("Unable to read file {0}: {1}")]
    ReadFile(String, String),
}

/// A single file in the dist tree: where it lives locally and the key it
/// deploys under. Keys are relative to the tree root and always use `/`,
/// regardless of the host separator.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub key: String,
}

/// Enumerate every regular file under `dir`. An empty tree is an error;
/// there is nothing to deploy.
pub fn walk(dir: &Path) -> Result<Vec<FileEntry>, Error> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(dir) {
        let entry =
            entry.map_err(|error| Error::Walk(dir.display().to_string(), error.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|error| Error::Walk(dir.display().to_string(), error.to_string()))?;
        let key = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        entries.push(FileEntry {
            path: entry.into_path(),
            key,
        });
    }

    if entries.is_empty() {
        return Err(Error::EmptyDir(dir.display().to_string()));
    }

    log::debug!("manifest for {} holds {} files", dir.display(), entries.len());

    Ok(entries)
}

/// The Amplify deployment file map: relative key to MD5 hex digest of the
/// file contents. Files are read concurrently.
pub async fn hashed(dir: &Path) -> Result<HashMap<String, String>, Error> {
    let entries = walk(dir)?;

    stream::iter(entries.into_iter().map(|entry| async move {
        let bytes = tokio::fs::read(&entry.path)
            .await
            .map_err(|error| Error::ReadFile(entry.path.display().to_string(), error.to_string()))?;

        Ok((entry.key, hex::encode(Md5::digest(&bytes))))
    }))
    .buffer_unordered(CONCURRENT_READS)
    .try_collect::<HashMap<String, String>>()
    .await
}
