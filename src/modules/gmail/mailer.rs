// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    base64_decode_url_safe,
    modules::{
        error::{code::ErrorCode, GmailerResult},
        gmail::{
            model::{
                drafts::Draft,
                filters::{Filter, FilterAction, FilterCriteria},
                labels::Label,
                messages::{MessageFormat, SentMessage},
            },
            summary::{summarize_in_batches, MessageListSummary, DEFAULT_SUMMARY_BATCH_SIZE, SUMMARY_HEADERS},
        },
        mime::{
            builder::{EnvelopeBuilder, RawMessage, ReplyContext},
            resolver::{AttachmentResolver, AttachmentSource},
            walker::{AttachmentDescriptor, TreeWalker},
        },
        store::{
            AttachmentFetcher, BlobStore, DraftStore, FilterStore, LabelStore, LocalFileReader,
            MessageStore, OutputSink,
        },
    },
    raise_error,
};

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";

const REPLY_HEADERS: &[&str] = &["From", "Subject", "Message-ID"];

/// Readable rendition of one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: String,
    pub thread_id: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub date: String,
    pub body: String,
    pub attachments: Vec<AttachmentDescriptor>,
}

/// An outbound message before it is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compose {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub content_type: String,
    pub attachments: Vec<AttachmentSource>,
}

impl Compose {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            content_type: TEXT_PLAIN.to_string(),
            attachments: Vec::new(),
        }
    }

    pub fn html(mut self) -> Self {
        self.content_type = TEXT_HTML.to_string();
        self
    }

    pub fn attach(mut self, source: AttachmentSource) -> Self {
        self.attachments.push(source);
        self
    }
}

/// Mailbox operations on top of the Gmail stores, with outbound attachments
/// taken from the local disk or from Drive and downloads written to `sink`.
pub struct Mailer<G, L, B, S> {
    gmail: G,
    files: L,
    blobs: B,
    sink: S,
    summary_batch_size: usize,
}

impl<G, L, B, S> Mailer<G, L, B, S>
where
    G: MessageStore + DraftStore + LabelStore + FilterStore + AttachmentFetcher,
    L: LocalFileReader,
    B: BlobStore,
    S: OutputSink,
{
    pub fn new(gmail: G, files: L, blobs: B, sink: S) -> Self {
        Self {
            gmail,
            files,
            blobs,
            sink,
            summary_batch_size: DEFAULT_SUMMARY_BATCH_SIZE,
        }
    }

    pub fn with_summary_batch_size(mut self, batch_size: usize) -> Self {
        self.summary_batch_size = batch_size.max(1);
        self
    }

    pub async fn send(&self, compose: &Compose) -> GmailerResult<SentMessage> {
        let raw = self.encode(compose).await?;
        let sent = MessageStore::send(&self.gmail, &raw, None).await?;
        info!(
            "sent message {} to {} with {} attachment(s)",
            sent.id,
            compose.to,
            compose.attachments.len()
        );
        Ok(sent)
    }

    pub async fn create_draft(&self, compose: &Compose) -> GmailerResult<Draft> {
        let raw = self.encode(compose).await?;
        let draft = DraftStore::create(&self.gmail, &raw, None).await?;
        info!("created draft {} for {}", draft.id, compose.to);
        Ok(draft)
    }

    /// Answers `message_id` on its own thread, addressed to the original sender.
    pub async fn reply(
        &self,
        message_id: &str,
        body: &str,
        content_type: &str,
    ) -> GmailerResult<SentMessage> {
        let original = self.gmail.get_metadata(message_id, REPLY_HEADERS).await?;
        let to = original
            .header("From")
            .filter(|from| !from.trim().is_empty())
            .ok_or_else(|| {
                raise_error!(
                    format!("Message {} has no sender to reply to", message_id),
                    ErrorCode::InvalidParameter
                )
            })?
            .to_string();

        let context = ReplyContext {
            message_id: original
                .header("Message-ID")
                .filter(|id| !id.is_empty())
                .unwrap_or(original.id.as_str())
                .to_string(),
            thread_id: original.thread_id.clone(),
            subject: original.header("Subject").unwrap_or_default().to_string(),
        };
        let raw = EnvelopeBuilder::build_reply(&context, &to, body, content_type);
        let sent = MessageStore::send(&self.gmail, &raw, Some(&context.thread_id)).await?;
        info!("replied to {} on thread {}", message_id, context.thread_id);
        Ok(sent)
    }

    pub async fn read_message(&self, id: &str) -> GmailerResult<MessageView> {
        let message = self.gmail.get(id, MessageFormat::Full).await?;
        let header = |name: &str| message.header(name).unwrap_or_default().to_string();
        Ok(MessageView {
            id: message.id.clone(),
            thread_id: message.thread_id.clone(),
            from: header("From"),
            to: header("To"),
            subject: header("Subject"),
            date: header("Date"),
            body: TreeWalker::extract_body(&message.payload),
            attachments: TreeWalker::attachment_descriptors(&message.payload),
        })
    }

    pub async fn list_attachments(&self, id: &str) -> GmailerResult<Vec<AttachmentDescriptor>> {
        let message = self.gmail.get(id, MessageFormat::Full).await?;
        Ok(TreeWalker::attachment_descriptors(&message.payload))
    }

    /// Saves the decoded bytes of part `part_id` to `out` and returns how
    /// many bytes were written.
    pub async fn download_attachment(
        &self,
        message_id: &str,
        part_id: &str,
        out: &Path,
    ) -> GmailerResult<usize> {
        let message = self.gmail.get(message_id, MessageFormat::Full).await?;
        let part = TreeWalker::find_part(&message.payload, part_id).ok_or_else(|| {
            raise_error!(
                format!("Message {} has no part {}", message_id, part_id),
                ErrorCode::AttachmentPartNotFound
            )
        })?;

        let data = match (part.inline_data(), part.attachment_id()) {
            (Some(inline), _) => inline.to_string(),
            (None, Some(attachment_id)) => self.gmail.fetch(message_id, attachment_id).await?,
            (None, None) => {
                return Err(raise_error!(
                    format!(
                        "Part {} of message {} carries neither data nor an attachment id",
                        part_id, message_id
                    ),
                    ErrorCode::AttachmentDataUnavailable
                ))
            }
        };

        let bytes = base64_decode_url_safe!(&data).map_err(|e| {
            raise_error!(
                format!(
                    "Part {} of message {} is not valid base64url: {}",
                    part_id, message_id, e
                ),
                ErrorCode::AttachmentDataUnavailable
            )
        })?;
        self.sink.write(out, &bytes).await?;
        info!(
            "saved part {} of {} to {} ({} bytes)",
            part_id,
            message_id,
            out.display(),
            bytes.len()
        );
        Ok(bytes.len())
    }

    pub async fn list_summaries(
        &self,
        query: Option<&str>,
        limit: Option<u32>,
    ) -> GmailerResult<Vec<MessageListSummary>> {
        let refs = MessageStore::list(&self.gmail, query, limit).await?;
        let gmail = &self.gmail;
        Ok(summarize_in_batches(&refs, self.summary_batch_size, move |id: String| async move {
            gmail.get_metadata(&id, SUMMARY_HEADERS).await
        })
        .await)
    }

    pub async fn list_drafts(&self) -> GmailerResult<Vec<Draft>> {
        DraftStore::list(&self.gmail).await
    }

    pub async fn list_labels(&self) -> GmailerResult<Vec<Label>> {
        LabelStore::list(&self.gmail).await
    }

    pub async fn modify_labels(&self, id: &str, add: &[String], remove: &[String]) -> GmailerResult<()> {
        if add.is_empty() && remove.is_empty() {
            return Err(raise_error!(
                "At least one label to add or remove is required".into(),
                ErrorCode::InvalidParameter
            ));
        }
        self.gmail.modify_labels(id, add, remove).await
    }

    pub async fn trash(&self, id: &str) -> GmailerResult<()> {
        self.gmail.trash(id).await
    }

    pub async fn untrash(&self, id: &str) -> GmailerResult<()> {
        self.gmail.untrash(id).await
    }

    pub async fn list_filters(&self) -> GmailerResult<Vec<Filter>> {
        FilterStore::list(&self.gmail).await
    }

    pub async fn create_filter(
        &self,
        criteria: FilterCriteria,
        action: FilterAction,
    ) -> GmailerResult<Filter> {
        if criteria == FilterCriteria::default() {
            return Err(raise_error!(
                "A filter needs at least one criterion".into(),
                ErrorCode::InvalidParameter
            ));
        }
        FilterStore::create(&self.gmail, criteria, action).await
    }

    pub async fn delete_filter(&self, id: &str) -> GmailerResult<()> {
        FilterStore::delete(&self.gmail, id).await
    }

    async fn encode(&self, compose: &Compose) -> GmailerResult<RawMessage> {
        if compose.attachments.is_empty() {
            return Ok(EnvelopeBuilder::build_plain(
                &compose.to,
                &compose.subject,
                &compose.body,
                &compose.content_type,
                &[],
            ));
        }
        if compose.content_type != TEXT_PLAIN {
            warn!(
                "body of a message with attachments is sent as {}, not {}",
                TEXT_PLAIN, compose.content_type
            );
        }
        let resolved = AttachmentResolver::new(&self.files, &self.blobs)
            .resolve(&compose.attachments)
            .await?;
        Ok(EnvelopeBuilder::build_with_attachments(
            &compose.to,
            &compose.subject,
            &compose.body,
            &resolved,
        ))
    }
}
