// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    base64_encode,
    modules::{
        common::parallel::run_with_limit,
        error::{code::ErrorCode, GmailerResult},
        mime::payload::normalize,
        store::{BlobStore, LocalFileReader},
    },
    raise_error,
};

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";
pub const DEFAULT_FILENAME: &str = "attachment.bin";

/// Number of sources resolved at the same time.
const RESOLVE_CONCURRENCY: usize = 4;

const EXTENSION_MIME_TYPES: &[(&str, &str)] = &[
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".webp", "image/webp"),
    (".gif", "image/gif"),
    (".pdf", "application/pdf"),
    (".txt", "text/plain"),
    (".csv", "text/csv"),
];

/// Where the bytes of an outbound attachment live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum AttachmentSource {
    Local {
        path: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
    Remote {
        file_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
}

impl AttachmentSource {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        AttachmentSource::Local {
            path: path.into(),
            filename: None,
            mime_type: None,
        }
    }

    pub fn remote(file_id: impl Into<String>) -> Self {
        AttachmentSource::Remote {
            file_id: file_id.into(),
            filename: None,
            mime_type: None,
        }
    }
}

/// Attachment ready to be embedded in a MIME part. `filename` and
/// `mime_type` are never empty; `base64_payload` uses the standard alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAttachment {
    pub filename: String,
    pub mime_type: String,
    pub base64_payload: String,
}

/// Case-insensitive suffix match against the known extensions.
pub fn infer_mime_type(name: &str) -> &'static str {
    let lower = name.to_ascii_lowercase();
    EXTENSION_MIME_TYPES
        .iter()
        .find(|(extension, _)| lower.ends_with(extension))
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME_TYPE)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

pub struct AttachmentResolver<'a, L, B> {
    files: &'a L,
    blobs: &'a B,
}

impl<'a, L, B> AttachmentResolver<'a, L, B>
where
    L: LocalFileReader,
    B: BlobStore,
{
    pub fn new(files: &'a L, blobs: &'a B) -> Self {
        Self { files, blobs }
    }

    /// Resolves every source, one result per source and in the same order.
    /// Fails as a whole if any single source fails.
    pub async fn resolve(
        &self,
        sources: &[AttachmentSource],
    ) -> GmailerResult<Vec<ResolvedAttachment>> {
        run_with_limit(RESOLVE_CONCURRENCY, sources.iter(), |source| {
            self.resolve_one(source)
        })
        .await
    }

    pub async fn resolve_one(&self, source: &AttachmentSource) -> GmailerResult<ResolvedAttachment> {
        let resolved = match source {
            AttachmentSource::Local {
                path,
                filename,
                mime_type,
            } => {
                if !self.files.exists(path).await {
                    return Err(raise_error!(
                        format!("Attachment not found: {}", path.display()),
                        ErrorCode::AttachmentNotFound
                    ));
                }

                let filename = non_empty(filename.as_deref())
                    .map(str::to_string)
                    .or_else(|| {
                        path.file_name()
                            .map(|name| name.to_string_lossy().into_owned())
                            .filter(|name| !name.is_empty())
                    })
                    .unwrap_or_else(|| DEFAULT_FILENAME.to_string());

                let mime_type = match non_empty(mime_type.as_deref()) {
                    Some(explicit) => explicit.to_string(),
                    None => match self.files.type_of(path).await {
                        Some(reported) if !reported.trim().is_empty() => reported,
                        _ => infer_mime_type(&path.to_string_lossy()).to_string(),
                    },
                };

                let bytes = self.files.read_all(path).await?;
                ResolvedAttachment {
                    filename,
                    mime_type,
                    base64_payload: base64_encode!(&bytes),
                }
            }
            AttachmentSource::Remote {
                file_id,
                filename,
                mime_type,
            } => {
                let (metadata, content) =
                    futures::join!(self.blobs.metadata(file_id), self.blobs.content(file_id));
                let metadata = match metadata {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        // release the download before giving up on the file
                        if let Ok(payload) = content {
                            if let Err(drain) = normalize(payload).await {
                                debug!("discarded content of {} also failed: {}", file_id, drain);
                            }
                        }
                        return Err(e);
                    }
                };
                let content = content?;

                let filename = non_empty(filename.as_deref())
                    .or(non_empty(metadata.name.as_deref()))
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("drive-file-{}", file_id));

                let mime_type = non_empty(mime_type.as_deref())
                    .or(non_empty(metadata.mime_type.as_deref()))
                    .map(str::to_string)
                    .unwrap_or_else(|| infer_mime_type(&filename).to_string());

                let bytes = normalize(content).await?;
                ResolvedAttachment {
                    filename,
                    mime_type,
                    base64_payload: base64_encode!(&bytes),
                }
            }
        };
        debug!(
            "resolved attachment {} ({}, {} base64 chars)",
            resolved.filename,
            resolved.mime_type,
            resolved.base64_payload.len()
        );
        Ok(resolved)
    }
}
