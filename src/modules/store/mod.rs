// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

//! Contracts of the services the MIME layer talks to. The Gmail and Drive
//! clients implement them against the REST APIs, `LocalFs` against the local
//! disk, and tests against in-memory fakes.

#![allow(async_fn_in_trait)]

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::modules::{
    error::GmailerResult,
    gmail::model::{
        drafts::Draft,
        filters::{Filter, FilterAction, FilterCriteria},
        labels::Label,
        messages::{FullMessage, MessageFormat, MessageIndex, MessageMeta, SentMessage},
    },
    mime::{builder::RawMessage, payload::RawPayload},
};

pub mod local;

pub trait MessageStore {
    async fn list(&self, query: Option<&str>, limit: Option<u32>)
        -> GmailerResult<Vec<MessageIndex>>;
    async fn get(&self, id: &str, format: MessageFormat) -> GmailerResult<FullMessage>;
    /// Fetches only the named headers of a message.
    async fn get_metadata(&self, id: &str, headers: &[&str]) -> GmailerResult<MessageMeta>;
    async fn send(&self, raw: &RawMessage, thread_id: Option<&str>) -> GmailerResult<SentMessage>;
    async fn modify_labels(&self, id: &str, add: &[String], remove: &[String])
        -> GmailerResult<()>;
    async fn trash(&self, id: &str) -> GmailerResult<()>;
    async fn untrash(&self, id: &str) -> GmailerResult<()>;
}

pub trait DraftStore {
    async fn create(&self, raw: &RawMessage, thread_id: Option<&str>) -> GmailerResult<Draft>;
    async fn list(&self) -> GmailerResult<Vec<Draft>>;
}

pub trait LabelStore {
    async fn list(&self) -> GmailerResult<Vec<Label>>;
}

pub trait FilterStore {
    async fn list(&self) -> GmailerResult<Vec<Filter>>;
    async fn create(&self, criteria: FilterCriteria, action: FilterAction) -> GmailerResult<Filter>;
    async fn delete(&self, id: &str) -> GmailerResult<()>;
}

pub trait AttachmentFetcher {
    /// Returns the base64url encoded bytes of an externalized attachment.
    async fn fetch(&self, message_id: &str, attachment_id: &str) -> GmailerResult<String>;
}

pub trait LocalFileReader {
    async fn exists(&self, path: &Path) -> bool;
    async fn read_all(&self, path: &Path) -> GmailerResult<Vec<u8>>;
    async fn type_of(&self, path: &Path) -> Option<String>;
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct BlobMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "mimeType")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

pub trait BlobStore {
    async fn metadata(&self, file_id: &str) -> GmailerResult<BlobMetadata>;
    async fn content(&self, file_id: &str) -> GmailerResult<RawPayload>;
}

pub trait OutputSink {
    async fn write(&self, path: &Path, bytes: &[u8]) -> GmailerResult<()>;
}

#[cfg(test)]
pub mod fakes;
