// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::{
    modules::{
        error::{code::ErrorCode, GmailerResult},
        gmail::model::{
            drafts::{Draft, DraftList},
            filters::{Filter, FilterAction, FilterCriteria, FilterList},
            labels::{Label, LabelList},
            messages::{
                AttachmentBody, FullMessage, MessageFormat, MessageIndex, MessageList,
                MessageMeta, SentMessage,
            },
        },
        http::HttpClient,
        mime::builder::RawMessage,
        store::{AttachmentFetcher, DraftStore, FilterStore, LabelStore, MessageStore},
    },
    raise_error,
};

/// Gmail REST API for one authorized user.
pub struct GmailClient {
    http: HttpClient,
    base_url: String,
}

impl GmailClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn parse<T: DeserializeOwned>(value: serde_json::Value, model: &str) -> GmailerResult<T> {
        serde_json::from_value::<T>(value).map_err(|e| {
            raise_error!(
                format!(
                    "Failed to deserialize Gmail API response into {}: {:#?}. Possible model mismatch or API change.",
                    model, e
                ),
                ErrorCode::GmailApiCallFailed
            )
        })
    }
}

impl MessageStore for GmailClient {
    async fn list(
        &self,
        query: Option<&str>,
        limit: Option<u32>,
    ) -> GmailerResult<Vec<MessageIndex>> {
        let limit = limit.map(|l| l.to_string());
        let mut params = Vec::new();
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            params.push(("q", q));
        }
        if let Some(limit) = limit.as_deref() {
            params.push(("maxResults", limit));
        }
        let value = self.http.get(&self.url("messages"), &params).await?;
        let list: MessageList = Self::parse(value, "MessageList")?;
        Ok(list.messages.unwrap_or_default())
    }

    async fn get(&self, id: &str, format: MessageFormat) -> GmailerResult<FullMessage> {
        let url = self.url(&format!("messages/{}", id));
        let value = self.http.get(&url, &[("format", format.as_str())]).await?;
        Self::parse(value, "FullMessage")
    }

    async fn get_metadata(&self, id: &str, headers: &[&str]) -> GmailerResult<MessageMeta> {
        let url = self.url(&format!("messages/{}", id));
        let mut params = vec![("format", MessageFormat::Metadata.as_str())];
        params.extend(headers.iter().map(|h| ("metadataHeaders", *h)));
        let value = self.http.get(&url, &params).await?;
        Self::parse(value, "MessageMeta")
    }

    async fn send(&self, raw: &RawMessage, thread_id: Option<&str>) -> GmailerResult<SentMessage> {
        let mut body = json!({ "raw": raw.as_str() });
        if let Some(thread_id) = thread_id {
            body["threadId"] = json!(thread_id);
        }
        let value = self.http.post(&self.url("messages/send"), Some(&body)).await?;
        Self::parse(value, "SentMessage")
    }

    async fn modify_labels(&self, id: &str, add: &[String], remove: &[String]) -> GmailerResult<()> {
        let body = json!({
            "addLabelIds": add,
            "removeLabelIds": remove,
        });
        let url = self.url(&format!("messages/{}/modify", id));
        self.http.post(&url, Some(&body)).await?;
        Ok(())
    }

    async fn trash(&self, id: &str) -> GmailerResult<()> {
        let url = self.url(&format!("messages/{}/trash", id));
        self.http.post(&url, None::<&()>).await?;
        Ok(())
    }

    async fn untrash(&self, id: &str) -> GmailerResult<()> {
        let url = self.url(&format!("messages/{}/untrash", id));
        self.http.post(&url, None::<&()>).await?;
        Ok(())
    }
}

impl DraftStore for GmailClient {
    async fn create(&self, raw: &RawMessage, thread_id: Option<&str>) -> GmailerResult<Draft> {
        let mut message = json!({ "raw": raw.as_str() });
        if let Some(thread_id) = thread_id {
            message["threadId"] = json!(thread_id);
        }
        let body = json!({ "message": message });
        let value = self.http.post(&self.url("drafts"), Some(&body)).await?;
        Self::parse(value, "Draft")
    }

    async fn list(&self) -> GmailerResult<Vec<Draft>> {
        let value = self.http.get(&self.url("drafts"), &[]).await?;
        let list: DraftList = Self::parse(value, "DraftList")?;
        Ok(list.drafts.unwrap_or_default())
    }
}

impl LabelStore for GmailClient {
    async fn list(&self) -> GmailerResult<Vec<Label>> {
        let value = self.http.get(&self.url("labels"), &[]).await?;
        let list: LabelList = Self::parse(value, "LabelList")?;
        Ok(list.labels)
    }
}

impl FilterStore for GmailClient {
    async fn list(&self) -> GmailerResult<Vec<Filter>> {
        let value = self.http.get(&self.url("settings/filters"), &[]).await?;
        let list: FilterList = Self::parse(value, "FilterList")?;
        Ok(list.filter.unwrap_or_default())
    }

    async fn create(&self, criteria: FilterCriteria, action: FilterAction) -> GmailerResult<Filter> {
        let body = json!({ "criteria": criteria, "action": action });
        let value = self
            .http
            .post(&self.url("settings/filters"), Some(&body))
            .await?;
        Self::parse(value, "Filter")
    }

    async fn delete(&self, id: &str) -> GmailerResult<()> {
        self.http
            .delete(&self.url(&format!("settings/filters/{}", id)))
            .await
    }
}

impl AttachmentFetcher for GmailClient {
    async fn fetch(&self, message_id: &str, attachment_id: &str) -> GmailerResult<String> {
        let url = self.url(&format!(
            "messages/{}/attachments/{}",
            message_id, attachment_id
        ));
        let value = self.http.get(&url, &[]).await?;
        let body: AttachmentBody = Self::parse(value, "AttachmentBody")?;
        Ok(body.data)
    }
}
