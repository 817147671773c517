//! Content hashing for files and directory trees.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use walkdir::WalkDir;

use crate::error::{AppError, Result};

const CHUNK_SIZE: usize = 8192;

/// SHA-256 digest of a file or directory tree, as lowercase hex.
///
/// Directories are traversed recursively with entries sorted by relative
/// path, so the digest of an unmodified tree is reproducible regardless of
/// the order the filesystem yields entries in.
pub async fn digest(path: &Path) -> Result<String> {
    let metadata = tokio::fs::metadata(path).await?;
    let mut hasher = Sha256::new();
    if metadata.is_dir() {
        for file in collect_files(path)? {
            digest_file_into(&mut hasher, &file).await?;
        }
    } else {
        digest_file_into(&mut hasher, path).await?;
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Stream one file through the digest in fixed-size chunks.
async fn digest_file_into(hasher: &mut Sha256, path: &Path) -> Result<()> {
    let mut file = File::open(path).await?;
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let read = file.read(&mut buf).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(())
}

/// All regular files under `root`, sorted lexicographically by relative path.
fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            AppError::Io(e.into_io_error().unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::Other, "directory walk failed")
            }))
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort_by(|a, b| {
        a.strip_prefix(root)
            .unwrap_or(a)
            .cmp(b.strip_prefix(root).unwrap_or(b))
    });
    Ok(files)
}
