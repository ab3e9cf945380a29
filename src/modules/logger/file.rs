// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::error::GmailerResult;
use crate::modules::logger::LocalTimer;
use crate::modules::settings::cli::SETTINGS;
use crate::raise_error;
use std::path::Path;
use std::sync::OnceLock;
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;

pub static LOG_WORKER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

pub fn setup_file_logger(level: Level) -> GmailerResult<()> {
    let with_ansi = SETTINGS.gmailer_ansi_logs;

    let (writer, guard) = log_writer(&SETTINGS.gmailer_log_dir, SETTINGS.gmailer_max_log_files)?;
    keep_worker_guard(guard)?;

    let layer = fmt::layer()
        .with_timer(LocalTimer)
        .with_ansi(with_ansi)
        .with_level(true)
        .with_writer(writer)
        .with_target(true);

    let subscriber = tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(layer);

    tracing::subscriber::set_global_default(subscriber).map_err(|e| {
        raise_error!(
            format!("Failed to install file logger: {}", e),
            ErrorCode::InternalError
        )
    })
}

/// The worker must outlive the process, otherwise buffered lines are lost.
fn keep_worker_guard(guard: WorkerGuard) -> GmailerResult<()> {
    LOG_WORKER_GUARD.set(guard).map_err(|_| {
        raise_error!(
            "File logger is already initialized".into(),
            ErrorCode::InternalError
        )
    })
}

fn log_writer(dir: &Path, max_log_files: usize) -> GmailerResult<(NonBlocking, WorkerGuard)> {
    let rolling = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("gmailer")
        .max_log_files(max_log_files)
        .build(dir)
        .map_err(|e| {
            raise_error!(
                format!(
                    "Failed to initialize rolling file appender in {}: {}",
                    dir.display(),
                    e
                ),
                ErrorCode::InternalError
            )
        })?;
    Ok(tracing_appender::non_blocking(rolling))
}
