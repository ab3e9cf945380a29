// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use code::ErrorCode;
use snafu::{Location, Snafu};

pub mod code;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum GmailerError {
    #[snafu(display("{message}"))]
    Generic {
        message: String,
        #[snafu(implicit)]
        location: Location,
        code: ErrorCode,
    },
}

pub type GmailerResult<T, E = GmailerError> = std::result::Result<T, E>;

impl GmailerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            GmailerError::Generic { code, .. } => *code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            GmailerError::Generic { message, .. } => message,
        }
    }
}
