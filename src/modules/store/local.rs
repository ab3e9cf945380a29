// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::Path;

use crate::{
    modules::{
        error::{code::ErrorCode, GmailerResult},
        store::{LocalFileReader, OutputSink},
    },
    raise_error,
};

/// Local disk, used both as attachment source and as download target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFileReader for LocalFs {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    async fn read_all(&self, path: &Path) -> GmailerResult<Vec<u8>> {
        tokio::fs::read(path).await.map_err(|e| {
            raise_error!(
                format!("Failed to read {}: {}", path.display(), e),
                ErrorCode::IoError
            )
        })
    }

    async fn type_of(&self, path: &Path) -> Option<String> {
        mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string())
    }
}

impl OutputSink for LocalFs {
    async fn write(&self, path: &Path, bytes: &[u8]) -> GmailerResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                raise_error!(
                    format!("Failed to create directory {}: {}", parent.display(), e),
                    ErrorCode::IoError
                )
            })?;
        }
        tokio::fs::write(path, bytes).await.map_err(|e| {
            raise_error!(
                format!("Failed to write {}: {}", path.display(), e),
                ErrorCode::IoError
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_fs_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.csv");
        let fs = LocalFs;

        assert!(!fs.exists(&path).await);
        fs.write(&path, b"a,b\n1,2\n").await.unwrap();
        assert!(fs.exists(&path).await);
        assert_eq!(fs.read_all(&path).await.unwrap(), b"a,b\n1,2\n");
        assert_eq!(fs.type_of(&path).await.as_deref(), Some("text/csv"));
        // directories are not attachable files
        assert!(!fs.exists(dir.path()).await);
    }

    #[tokio::test]
    async fn test_read_missing_file_is_io_error() {
        let err = LocalFs
            .read_all(Path::new("/definitely/not/here.bin"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::IoError);
    }
}
