// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use rand::{distr::Alphanumeric, Rng};

use crate::{
    base64_decode_url_safe, base64_encode_url_safe,
    modules::{
        error::{code::ErrorCode, GmailerResult},
        mime::resolver::ResolvedAttachment,
    },
    raise_error, utc_now,
};

/// Maximum length of a base64 line inside a MIME body.
pub const MIME_LINE_LENGTH: usize = 76;

const CRLF: &str = "\r\n";
const BOUNDARY_PREFIX: &str = "gmailer";
const REPLY_PREFIX: &str = "Re:";

/// A complete RFC 2822 message, base64url encoded for the Gmail API `raw` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage(String);

impl RawMessage {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The message bytes as they will be delivered.
    pub fn decode(&self) -> GmailerResult<Vec<u8>> {
        base64_decode_url_safe!(&self.0).map_err(|e| {
            raise_error!(
                format!("Raw message is not valid base64url: {}", e),
                ErrorCode::InternalError
            )
        })
    }

    fn encode(message: &str) -> Self {
        Self(base64_encode_url_safe!(message.as_bytes()))
    }
}

/// What a reply needs to know about the message it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyContext {
    /// `Message-ID` of the original, used for `In-Reply-To` and `References`.
    pub message_id: String,
    pub thread_id: String,
    pub subject: String,
}

pub struct EnvelopeBuilder;

impl EnvelopeBuilder {
    /// Single-part message. Extra headers are written verbatim after the
    /// standard ones, in the given order.
    pub fn build_plain(
        to: &str,
        subject: &str,
        body: &str,
        content_type: &str,
        extra_headers: &[(String, String)],
    ) -> RawMessage {
        let mut message = String::with_capacity(body.len() + 256);
        Self::push_header(&mut message, "To", to);
        Self::push_header(&mut message, "Subject", subject);
        Self::push_header(&mut message, "MIME-Version", "1.0");
        Self::push_header(
            &mut message,
            "Content-Type",
            &format!("{}; charset=\"UTF-8\"", content_type),
        );
        for (name, value) in extra_headers {
            Self::push_header(&mut message, name, value);
        }
        message.push_str(CRLF);
        message.push_str(body);
        RawMessage::encode(&message)
    }

    /// `multipart/mixed` message with a text body followed by the attachments
    /// in the given order. Without attachments this is exactly the
    /// `text/plain` single-part message.
    pub fn build_with_attachments(
        to: &str,
        subject: &str,
        body: &str,
        attachments: &[ResolvedAttachment],
    ) -> RawMessage {
        if attachments.is_empty() {
            return Self::build_plain(to, subject, body, "text/plain", &[]);
        }
        Self::build_multipart(to, subject, body, attachments, &Self::boundary_token())
    }

    /// Single-part reply threaded onto `original`.
    pub fn build_reply(
        original: &ReplyContext,
        to: &str,
        body: &str,
        content_type: &str,
    ) -> RawMessage {
        let extra_headers = vec![
            ("In-Reply-To".to_string(), original.message_id.clone()),
            ("References".to_string(), original.message_id.clone()),
        ];
        Self::build_plain(
            to,
            &Self::reply_subject(&original.subject),
            body,
            content_type,
            &extra_headers,
        )
    }

    /// Prefixes `Re: ` unless the subject already starts with the literal `Re:`.
    pub fn reply_subject(subject: &str) -> String {
        if subject.starts_with(REPLY_PREFIX) {
            subject.to_string()
        } else {
            format!("{} {}", REPLY_PREFIX, subject)
        }
    }

    /// Replaces characters that could end a quoted header parameter or the header itself.
    pub fn sanitize_header_value(value: &str) -> String {
        value
            .chars()
            .map(|c| match c {
                '\r' | '\n' | '"' => '_',
                c => c,
            })
            .collect()
    }

    /// Hard-wraps a base64 payload at [`MIME_LINE_LENGTH`] characters.
    pub fn wrap_base64(payload: &str) -> String {
        let mut wrapped = String::with_capacity(payload.len() + payload.len() / MIME_LINE_LENGTH * 2);
        // base64 output is ASCII, so byte chunks are char boundaries
        for (i, line) in payload.as_bytes().chunks(MIME_LINE_LENGTH).enumerate() {
            if i > 0 {
                wrapped.push_str(CRLF);
            }
            wrapped.push_str(&String::from_utf8_lossy(line));
        }
        wrapped
    }

    fn build_multipart(
        to: &str,
        subject: &str,
        body: &str,
        attachments: &[ResolvedAttachment],
        boundary: &str,
    ) -> RawMessage {
        let payload_len: usize = attachments.iter().map(|a| a.base64_payload.len()).sum();
        let mut message = String::with_capacity(body.len() + payload_len * 2 + 512);

        Self::push_header(&mut message, "To", to);
        Self::push_header(&mut message, "Subject", subject);
        Self::push_header(&mut message, "MIME-Version", "1.0");
        Self::push_header(
            &mut message,
            "Content-Type",
            &format!("multipart/mixed; boundary=\"{}\"", boundary),
        );
        message.push_str(CRLF);

        message.push_str(&format!("--{}{}", boundary, CRLF));
        Self::push_header(&mut message, "Content-Type", "text/plain; charset=\"UTF-8\"");
        Self::push_header(&mut message, "Content-Transfer-Encoding", "7bit");
        message.push_str(CRLF);
        message.push_str(body);
        message.push_str(CRLF);

        for attachment in attachments {
            let filename = Self::sanitize_header_value(&attachment.filename);
            let mime_type = Self::sanitize_header_value(&attachment.mime_type);
            message.push_str(&format!("--{}{}", boundary, CRLF));
            Self::push_header(
                &mut message,
                "Content-Type",
                &format!("{}; name=\"{}\"", mime_type, filename),
            );
            Self::push_header(
                &mut message,
                "Content-Disposition",
                &format!("attachment; filename=\"{}\"", filename),
            );
            Self::push_header(&mut message, "Content-Transfer-Encoding", "base64");
            message.push_str(CRLF);
            message.push_str(&Self::wrap_base64(&attachment.base64_payload));
            message.push_str(CRLF);
        }

        message.push_str(&format!("--{}--", boundary));
        RawMessage::encode(&message)
    }

    fn boundary_token() -> String {
        let nonce: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();
        format!("{}_{}_{}", BOUNDARY_PREFIX, utc_now!(), nonce)
    }

    fn push_header(message: &mut String, name: &str, value: &str) {
        message.push_str(name);
        message.push_str(": ");
        message.push_str(value);
        message.push_str(CRLF);
    }
}
