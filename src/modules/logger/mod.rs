// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::error::GmailerResult;
use crate::modules::logger::file::setup_file_logger;
use crate::modules::settings::cli::SETTINGS;
use crate::raise_error;
use chrono::Local;
use std::process;
use tracing::Level;
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

mod file;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

pub fn initialize_logging() {
    let level = validate_log_level(&SETTINGS.gmailer_log_level);
    let result = if SETTINGS.gmailer_log_to_file {
        setup_file_logger(level)
    } else {
        setup_stdout_logger(level)
    };
    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {}", e.message());
        process::exit(1);
    }
}

fn setup_stdout_logger(level: Level) -> GmailerResult<()> {
    let with_ansi = SETTINGS.gmailer_ansi_logs;

    let format = tracing_subscriber::fmt::format()
        .with_level(true)
        .with_target(true)
        .with_timer(LocalTimer);

    // stdout carries command output
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(with_ansi)
        .with_writer(std::io::stderr)
        .event_format(format)
        .finish();

    tracing::subscriber::set_global_default(subscriber).map_err(|e| {
        raise_error!(
            format!("Failed to install stdout logger: {}", e),
            ErrorCode::InternalError
        )
    })
}

fn validate_log_level(value: &str) -> Level {
    match value.parse::<Level>() {
        Ok(level) => level,
        Err(_) => {
            eprintln!(
                "Invalid log level specified. Use one of: error, warn, info, debug, trace. 
        The log level you currently specified is 'gmailer_log_level'='{}'",
                value
            );
            process::exit(1);
        }
    }
}
