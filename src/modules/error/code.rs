// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorCode {
    // Client-side errors (10000–10999)
    InvalidParameter = 10000,
    MissingConfiguration = 10020,

    // Attachment and MIME errors (30000–30999)
    AttachmentNotFound = 30000,
    UnsupportedPayloadType = 30010,
    AttachmentPartNotFound = 30020,
    AttachmentDataUnavailable = 30030,

    // Network connection errors (40000–40999)
    NetworkError = 40000,
    HttpResponseError = 40030,

    // Remote service errors (50000–50999)
    GmailApiCallFailed = 50070,
    DriveApiCallFailed = 50090,

    // Internal system errors (70000–70999)
    InternalError = 70000,
    IoError = 70020,
}

impl ErrorCode {
    /// Whether the error is raised by the MIME and attachment handling itself
    /// rather than by a collaborator.
    pub fn is_core(&self) -> bool {
        matches!(
            self,
            ErrorCode::AttachmentNotFound
                | ErrorCode::UnsupportedPayloadType
                | ErrorCode::AttachmentPartNotFound
                | ErrorCode::AttachmentDataUnavailable
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, *self as u32)
    }
}
