// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

/// Lightweight reference returned by `messages.list`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct MessageIndex {
    pub id: String,
    #[serde(rename = "threadId", default)]
    pub thread_id: String,
    /// Not part of the list response; filled in by callers that already know it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MessageList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<MessageIndex>>,
    #[serde(rename = "nextPageToken")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(rename = "resultSizeEstimate")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_size_estimate: Option<i64>,
}

/// `messages.get` with `format=metadata`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MessageMeta {
    pub id: String,
    #[serde(rename = "threadId", default)]
    pub thread_id: String,
    #[serde(rename = "labelIds", default)]
    pub label_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl MessageMeta {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload
            .as_ref()
            .and_then(|payload| find_header(&payload.headers, name))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Payload {
    #[serde(rename = "mimeType")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub headers: Vec<Header>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Header names are case-insensitive; the first occurrence wins.
pub fn find_header<'a>(headers: &'a [Header], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

/// Body of a part: inline base64url `data`, or an `attachmentId` pointing at
/// bytes that must be fetched separately.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PartBody {
    #[serde(rename = "attachmentId")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// One node of an inbound MIME tree. Children are owned by value.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct MessagePart {
    #[serde(rename = "partId")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<Header>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<PartBody>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<MessagePart>,
}

impl MessagePart {
    pub fn inline_data(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.data.as_deref())
            .filter(|d| !d.is_empty())
    }

    pub fn attachment_id(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.attachment_id.as_deref())
            .filter(|id| !id.is_empty())
    }

    pub fn size(&self) -> u64 {
        self.body.as_ref().and_then(|b| b.size).unwrap_or(0)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// `messages.get` with `format=full`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FullMessage {
    pub id: String,
    #[serde(rename = "threadId", default)]
    pub thread_id: String,
    #[serde(rename = "labelIds")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub label_ids: Vec<String>,
    #[serde(default)]
    pub payload: MessagePart,
    #[serde(default)]
    pub snippet: String,
}

impl FullMessage {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload.header(name)
    }
}

/// Result of `messages.send`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SentMessage {
    pub id: String,
    #[serde(rename = "threadId", default)]
    pub thread_id: String,
    #[serde(rename = "labelIds", default)]
    pub label_ids: Vec<String>,
}

/// Response body of `messages.attachments.get`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AttachmentBody {
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    Full,
    Metadata,
}

impl MessageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageFormat::Full => "full",
            MessageFormat::Metadata => "metadata",
        }
    }
}
