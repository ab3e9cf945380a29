// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::modules::{
    common::parallel::run_in_batches,
    error::GmailerResult,
    gmail::model::messages::{MessageIndex, MessageMeta},
};

pub const DEFAULT_SUMMARY_BATCH_SIZE: usize = 5;

/// Headers requested for every summarized message.
pub const SUMMARY_HEADERS: &[&str] = &["From", "Subject", "Date"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MessageListSummary {
    pub id: String,
    pub thread_id: String,
    pub from: String,
    pub subject: String,
    pub date: String,
    pub snippet: String,
}

/// [`summarize_in_batches`] with the default batch size.
pub async fn summarize<F, Fut>(refs: &[MessageIndex], fetch_detail: F) -> Vec<MessageListSummary>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = GmailerResult<MessageMeta>>,
{
    summarize_in_batches(refs, DEFAULT_SUMMARY_BATCH_SIZE, fetch_detail).await
}

/// Joins each reference with its fetched header metadata.
///
/// Details are fetched `batch_size` at a time; a batch must finish entirely
/// before the next one is started. The output has one summary per reference,
/// in reference order. A reference whose detail cannot be fetched keeps its
/// own id, thread id and snippet with empty header fields.
pub async fn summarize_in_batches<F, Fut>(
    refs: &[MessageIndex],
    batch_size: usize,
    fetch_detail: F,
) -> Vec<MessageListSummary>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = GmailerResult<MessageMeta>>,
{
    let fetch_detail = &fetch_detail;
    run_in_batches(batch_size, refs.iter().collect(), |reference| async move {
        let detail = match fetch_detail(reference.id.clone()).await {
            Ok(detail) => Some(detail),
            Err(e) => {
                warn!("no details for message {}, using list data: {}", reference.id, e);
                None
            }
        };
        assemble(reference, detail.as_ref())
    })
    .await
}

fn assemble(reference: &MessageIndex, detail: Option<&MessageMeta>) -> MessageListSummary {
    let header = |name: &str| detail.and_then(|d| d.header(name)).unwrap_or_default().to_string();

    MessageListSummary {
        id: pick(detail.map(|d| d.id.as_str()), Some(reference.id.as_str())),
        thread_id: pick(detail.map(|d| d.thread_id.as_str()), Some(reference.thread_id.as_str())),
        from: header("From"),
        subject: header("Subject"),
        date: header("Date"),
        snippet: pick(
            detail.and_then(|d| d.snippet.as_deref()),
            reference.snippet.as_deref(),
        ),
    }
}

fn pick(from_detail: Option<&str>, from_reference: Option<&str>) -> String {
    from_detail
        .filter(|v| !v.is_empty())
        .or(from_reference)
        .unwrap_or_default()
        .to_string()
}
