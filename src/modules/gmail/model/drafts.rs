// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use crate::modules::gmail::model::messages::SentMessage;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Draft {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<SentMessage>,
}

impl Draft {
    pub fn message_id(&self) -> Option<&str> {
        self.message.as_ref().map(|m| m.id.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DraftList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drafts: Option<Vec<Draft>>,
    #[serde(rename = "nextPageToken")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}
