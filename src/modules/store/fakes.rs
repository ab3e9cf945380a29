// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

//! In-memory stand-ins for the remote and local services.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};

use bytes::Bytes;
use futures::{stream, StreamExt};

use crate::{
    modules::{
        error::{code::ErrorCode, GmailerResult},
        gmail::model::{
            drafts::Draft,
            filters::{Filter, FilterAction, FilterCriteria},
            labels::Label,
            messages::{
                FullMessage, Header, MessageFormat, MessageIndex, MessageMeta, Payload,
                SentMessage,
            },
        },
        mime::{builder::RawMessage, payload::RawPayload},
        store::{
            AttachmentFetcher, BlobMetadata, BlobStore, DraftStore, FilterStore, LabelStore,
            LocalFileReader, MessageStore, OutputSink,
        },
    },
    raise_error,
};

#[derive(Default)]
pub struct FakeFiles {
    files: HashMap<PathBuf, (Vec<u8>, Option<String>)>,
}

impl FakeFiles {
    pub fn with(mut self, path: &str, bytes: &[u8], reported_type: Option<&str>) -> Self {
        self.files.insert(
            PathBuf::from(path),
            (bytes.to_vec(), reported_type.map(str::to_string)),
        );
        self
    }
}

impl LocalFileReader for FakeFiles {
    async fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    async fn read_all(&self, path: &Path) -> GmailerResult<Vec<u8>> {
        self.files
            .get(path)
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| raise_error!(format!("no file {}", path.display()), ErrorCode::IoError))
    }

    async fn type_of(&self, path: &Path) -> Option<String> {
        self.files.get(path).and_then(|(_, t)| t.clone())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum BlobShape {
    Buffer,
    Array,
    View,
    Text,
    Stream,
    Unrecognized,
}

pub struct FakeBlob {
    pub metadata: BlobMetadata,
    pub bytes: Vec<u8>,
    pub shape: BlobShape,
    pub delay_ms: u64,
}

#[derive(Default)]
pub struct FakeBlobs {
    blobs: HashMap<String, FakeBlob>,
}

impl FakeBlobs {
    pub fn with(mut self, file_id: &str, blob: FakeBlob) -> Self {
        self.blobs.insert(file_id.to_string(), blob);
        self
    }

    fn blob(&self, file_id: &str) -> GmailerResult<&FakeBlob> {
        self.blobs.get(file_id).ok_or_else(|| {
            raise_error!(
                format!("no drive file {}", file_id),
                ErrorCode::DriveApiCallFailed
            )
        })
    }
}

impl BlobStore for FakeBlobs {
    async fn metadata(&self, file_id: &str) -> GmailerResult<BlobMetadata> {
        Ok(self.blob(file_id)?.metadata.clone())
    }

    async fn content(&self, file_id: &str) -> GmailerResult<RawPayload> {
        let blob = self.blob(file_id)?;
        if blob.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(blob.delay_ms)).await;
        }
        let bytes = blob.bytes.clone();
        Ok(match blob.shape {
            BlobShape::Buffer => RawPayload::Buffer(Bytes::from(bytes)),
            BlobShape::Array => RawPayload::Array(bytes),
            BlobShape::View => {
                let mut padded = b"xx".to_vec();
                padded.extend_from_slice(&bytes);
                padded.extend_from_slice(b"yyy");
                RawPayload::View {
                    buffer: Bytes::from(padded),
                    offset: 2,
                    length: bytes.len(),
                }
            }
            BlobShape::Text => RawPayload::Text(String::from_utf8_lossy(&bytes).into_owned()),
            BlobShape::Stream => {
                let chunks: Vec<GmailerResult<Bytes>> = bytes
                    .chunks(3)
                    .map(|c| Ok(Bytes::copy_from_slice(c)))
                    .collect();
                RawPayload::Stream(stream::iter(chunks).boxed())
            }
            BlobShape::Unrecognized => RawPayload::Unrecognized {
                type_tag: "application/vnd.google-apps.document".into(),
            },
        })
    }
}

#[derive(Default)]
pub struct MemorySink {
    pub written: Mutex<Vec<(PathBuf, Vec<u8>)>>,
}

impl OutputSink for MemorySink {
    async fn write(&self, path: &Path, bytes: &[u8]) -> GmailerResult<()> {
        self.written
            .lock()
            .unwrap()
            .push((path.to_path_buf(), bytes.to_vec()));
        Ok(())
    }
}

/// Mailbox keeping messages, drafts, labels and filters in memory and
/// recording every mutation.
#[derive(Default)]
pub struct FakeMailbox {
    pub messages: Vec<FullMessage>,
    pub attachments: HashMap<(String, String), String>,
    pub labels: Vec<Label>,
    pub sent: Mutex<Vec<(String, Option<String>)>>,
    pub drafts: Mutex<Vec<(String, Option<String>)>>,
    pub filters: Mutex<Vec<Filter>>,
    pub label_changes: Mutex<Vec<(String, Vec<String>, Vec<String>)>>,
    pub trashed: Mutex<Vec<String>>,
}

impl FakeMailbox {
    pub fn with_message(mut self, message: FullMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_attachment(mut self, message_id: &str, attachment_id: &str, data: &str) -> Self {
        self.attachments.insert(
            (message_id.to_string(), attachment_id.to_string()),
            data.to_string(),
        );
        self
    }

    fn find(&self, id: &str) -> GmailerResult<&FullMessage> {
        self.messages.iter().find(|m| m.id == id).ok_or_else(|| {
            raise_error!(
                format!("message {} not found", id),
                ErrorCode::GmailApiCallFailed
            )
        })
    }
}

impl MessageStore for FakeMailbox {
    async fn list(
        &self,
        _query: Option<&str>,
        limit: Option<u32>,
    ) -> GmailerResult<Vec<MessageIndex>> {
        let limit = limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(self
            .messages
            .iter()
            .take(limit)
            .map(|m| MessageIndex {
                id: m.id.clone(),
                thread_id: m.thread_id.clone(),
                snippet: None,
            })
            .collect())
    }

    async fn get(&self, id: &str, _format: MessageFormat) -> GmailerResult<FullMessage> {
        self.find(id).cloned()
    }

    async fn get_metadata(&self, id: &str, headers: &[&str]) -> GmailerResult<MessageMeta> {
        let message = self.find(id)?;
        let headers: Vec<Header> = message
            .payload
            .headers
            .iter()
            .filter(|h| headers.iter().any(|name| h.name.eq_ignore_ascii_case(name)))
            .cloned()
            .collect();
        Ok(MessageMeta {
            id: message.id.clone(),
            thread_id: message.thread_id.clone(),
            label_ids: message.label_ids.clone(),
            payload: Some(Payload {
                mime_type: Some(message.payload.mime_type.clone()),
                headers,
            }),
            snippet: Some(message.snippet.clone()),
        })
    }

    async fn send(&self, raw: &RawMessage, thread_id: Option<&str>) -> GmailerResult<SentMessage> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((raw.as_str().to_string(), thread_id.map(str::to_string)));
        Ok(SentMessage {
            id: format!("sent-{}", sent.len()),
            thread_id: thread_id
                .map(str::to_string)
                .unwrap_or_else(|| format!("thread-{}", sent.len())),
            label_ids: vec!["SENT".into()],
        })
    }

    async fn modify_labels(&self, id: &str, add: &[String], remove: &[String]) -> GmailerResult<()> {
        self.find(id)?;
        self.label_changes
            .lock()
            .unwrap()
            .push((id.to_string(), add.to_vec(), remove.to_vec()));
        Ok(())
    }

    async fn trash(&self, id: &str) -> GmailerResult<()> {
        self.find(id)?;
        self.trashed.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn untrash(&self, id: &str) -> GmailerResult<()> {
        self.find(id)?;
        self.trashed.lock().unwrap().retain(|t| t != id);
        Ok(())
    }
}

impl DraftStore for FakeMailbox {
    async fn create(&self, raw: &RawMessage, thread_id: Option<&str>) -> GmailerResult<Draft> {
        let mut drafts = self.drafts.lock().unwrap();
        drafts.push((raw.as_str().to_string(), thread_id.map(str::to_string)));
        Ok(Draft {
            id: format!("r-{}", drafts.len()),
            message: Some(SentMessage {
                id: format!("draft-message-{}", drafts.len()),
                thread_id: thread_id.unwrap_or_default().to_string(),
                label_ids: vec!["DRAFT".into()],
            }),
        })
    }

    async fn list(&self) -> GmailerResult<Vec<Draft>> {
        let drafts = self.drafts.lock().unwrap();
        Ok((1..=drafts.len())
            .map(|i| Draft {
                id: format!("r-{}", i),
                message: None,
            })
            .collect())
    }
}

impl LabelStore for FakeMailbox {
    async fn list(&self) -> GmailerResult<Vec<Label>> {
        Ok(self.labels.clone())
    }
}

impl FilterStore for FakeMailbox {
    async fn list(&self) -> GmailerResult<Vec<Filter>> {
        Ok(self.filters.lock().unwrap().clone())
    }

    async fn create(&self, criteria: FilterCriteria, action: FilterAction) -> GmailerResult<Filter> {
        let mut filters = self.filters.lock().unwrap();
        let filter = Filter {
            id: format!("f-{}", filters.len() + 1),
            criteria,
            action,
        };
        filters.push(filter.clone());
        Ok(filter)
    }

    async fn delete(&self, id: &str) -> GmailerResult<()> {
        self.filters.lock().unwrap().retain(|f| f.id != id);
        Ok(())
    }
}

impl AttachmentFetcher for FakeMailbox {
    async fn fetch(&self, message_id: &str, attachment_id: &str) -> GmailerResult<String> {
        self.attachments
            .get(&(message_id.to_string(), attachment_id.to_string()))
            .cloned()
            .ok_or_else(|| {
                raise_error!(
                    format!("attachment {} not found", attachment_id),
                    ErrorCode::GmailApiCallFailed
                )
            })
    }
}
