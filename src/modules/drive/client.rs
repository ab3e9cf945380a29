// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use futures::{StreamExt, TryStreamExt};
use tracing::debug;

use crate::{
    modules::{
        error::{code::ErrorCode, GmailerResult},
        http::HttpClient,
        mime::payload::RawPayload,
        store::{BlobMetadata, BlobStore},
    },
    raise_error,
};

const METADATA_FIELDS: &str = "name,mimeType";

/// Read access to Google Drive files used as outbound attachments.
pub struct DriveClient {
    http: HttpClient,
    base_url: String,
    buffered: bool,
}

impl DriveClient {
    /// With `buffered` set, file content is read in one piece and handed out
    /// as a single buffer; otherwise it is handed out as a chunk stream.
    pub fn new(http: HttpClient, base_url: impl Into<String>, buffered: bool) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            buffered,
        }
    }

    fn file_url(&self, file_id: &str) -> String {
        format!("{}/files/{}", self.base_url, file_id)
    }
}

impl BlobStore for DriveClient {
    async fn metadata(&self, file_id: &str) -> GmailerResult<BlobMetadata> {
        let value = self
            .http
            .get(
                &self.file_url(file_id),
                &[("fields", METADATA_FIELDS), ("supportsAllDrives", "true")],
            )
            .await?;
        serde_json::from_value(value).map_err(|e| {
            raise_error!(
                format!(
                    "Failed to deserialize Drive metadata for file {}: {:#?}",
                    file_id, e
                ),
                ErrorCode::DriveApiCallFailed
            )
        })
    }

    async fn content(&self, file_id: &str) -> GmailerResult<RawPayload> {
        let response = self
            .http
            .get_raw(
                &self.file_url(file_id),
                &[("alt", "media"), ("supportsAllDrives", "true")],
            )
            .await?;

        if self.buffered {
            let bytes = response.bytes().await.map_err(|e| {
                raise_error!(
                    format!("Failed to download Drive file {}: {:#?}", file_id, e),
                    ErrorCode::NetworkError
                )
            })?;
            debug!("drive file {} downloaded, {} bytes", file_id, bytes.len());
            return Ok(RawPayload::Buffer(bytes));
        }

        let file_id = file_id.to_string();
        let stream = response
            .bytes_stream()
            .map_err(move |e| {
                raise_error!(
                    format!("Drive file {} download interrupted: {:#?}", file_id, e),
                    ErrorCode::NetworkError
                )
            })
            .boxed();
        Ok(RawPayload::Stream(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_file_url() {
        let http = HttpClient::new("token", Duration::from_secs(1)).unwrap();
        let client = DriveClient::new(http, "https://www.googleapis.com/drive/v3/", false);
        assert_eq!(
            client.file_url("1AbC"),
            "https://www.googleapis.com/drive/v3/files/1AbC"
        );
    }

    #[test]
    fn test_metadata_model() {
        let metadata: BlobMetadata =
            serde_json::from_value(serde_json::json!({"name": "q3.pdf", "mimeType": "application/pdf"}))
                .unwrap();
        assert_eq!(metadata.name.as_deref(), Some("q3.pdf"));
        assert_eq!(metadata.mime_type.as_deref(), Some("application/pdf"));
    }
}
