// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

pub mod cmd;
pub mod common;
pub mod drive;
pub mod error;
pub mod gmail;
pub mod http;
pub mod logger;
pub mod mime;
pub mod settings;
pub mod store;
pub mod utils;
