// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{base64_decode_url_safe, modules::gmail::model::messages::MessagePart};

const TEXT_PLAIN: &str = "text/plain";
const TEXT_HTML: &str = "text/html";

/// Flat, read-only view of one attachment-bearing part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentDescriptor {
    pub part_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_id: Option<String>,
    pub filename: String,
    pub mime_type: String,
    pub size: u64,
}

/// Read-only queries over an inbound MIME tree. None of them fail: a tree
/// without usable content yields empty results.
pub struct TreeWalker;

impl TreeWalker {
    /// Readable body of the message.
    ///
    /// Inline data on `part` itself wins. Otherwise the first `text/plain`
    /// child with data, then the first `text/html` child with data, then the
    /// first non-empty result of descending into each child in order.
    pub fn extract_body(part: &MessagePart) -> String {
        if let Some(text) = part.inline_data().and_then(Self::decode_text) {
            return text;
        }

        for wanted in [TEXT_PLAIN, TEXT_HTML] {
            let found = part
                .parts
                .iter()
                .filter(|child| child.mime_type.eq_ignore_ascii_case(wanted))
                .find_map(|child| child.inline_data().and_then(Self::decode_text));
            if let Some(text) = found {
                return text;
            }
        }

        part.parts
            .iter()
            .map(Self::extract_body)
            .find(|body| !body.is_empty())
            .unwrap_or_default()
    }

    /// Every node of the tree, root included, each exactly once.
    pub fn flatten(root: &MessagePart) -> Vec<&MessagePart> {
        let mut nodes = Vec::new();
        let mut pending = vec![root];
        while let Some(part) = pending.pop() {
            nodes.push(part);
            pending.extend(part.parts.iter().rev());
        }
        nodes
    }

    /// Parts carrying a filename or an externalized attachment handle.
    /// Structural containers carry neither and are skipped.
    pub fn attachment_descriptors(root: &MessagePart) -> Vec<AttachmentDescriptor> {
        Self::flatten(root)
            .into_iter()
            .filter_map(|part| {
                let filename = part.filename.as_deref().unwrap_or_default();
                let attachment_id = part.attachment_id();
                if filename.is_empty() && attachment_id.is_none() {
                    return None;
                }
                Some(AttachmentDescriptor {
                    part_id: part.part_id.clone().unwrap_or_default(),
                    attachment_id: attachment_id.map(str::to_string),
                    filename: filename.to_string(),
                    mime_type: part.mime_type.clone(),
                    size: part.size(),
                })
            })
            .collect()
    }

    pub fn find_part<'a>(root: &'a MessagePart, part_id: &str) -> Option<&'a MessagePart> {
        Self::flatten(root)
            .into_iter()
            .find(|part| part.part_id.as_deref() == Some(part_id))
    }

    fn decode_text(data: &str) -> Option<String> {
        match base64_decode_url_safe!(data) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                debug!("skipping part with undecodable body: {}", e);
                None
            }
        }
    }
}
