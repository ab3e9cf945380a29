// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use clap::{Args, Parser, Subcommand};
use std::{path::PathBuf, sync::LazyLock};

#[cfg(not(test))]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::parse);

#[cfg(test)]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::new_for_test);

#[derive(Debug, Parser)]
#[clap(
    name = "gmailer",
    about = "Read, compose, reply to, label and filter Gmail messages, with attachments from local files or Google Drive.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Settings {
    /// gmailer log level (default: "info")
    #[clap(
        long,
        default_value = "info",
        env,
        help = "Set the log level for gmailer"
    )]
    pub gmailer_log_level: String,

    /// Enable ANSI logs (default: true)
    #[clap(long, default_value = "true", env, help = "Enable ANSI formatted logs")]
    pub gmailer_ansi_logs: bool,

    /// Enable log file output (default: false)
    /// If false, logs will be printed to stdout
    #[clap(
        long,
        default_value = "false",
        env,
        help = "Enable log file output (otherwise logs go to stdout)"
    )]
    pub gmailer_log_to_file: bool,

    #[clap(
        long,
        default_value = "logs",
        env,
        help = "Directory for rolling log files when file logging is enabled"
    )]
    pub gmailer_log_dir: PathBuf,

    /// Maximum number of log files (default: 5)
    #[clap(
        long,
        default_value = "5",
        env,
        help = "Set the maximum number of log files kept on disk"
    )]
    pub gmailer_max_log_files: usize,

    /// OAuth2 bearer token used for both the Gmail and the Drive API.
    /// Acquiring and refreshing it is left to the caller.
    #[clap(long, env, hide_env_values = true, help = "OAuth2 access token")]
    pub gmailer_access_token: Option<String>,

    #[clap(
        long,
        default_value = "https://gmail.googleapis.com/gmail/v1/users/me",
        env,
        help = "Base URL of the Gmail API for the authorized user"
    )]
    pub gmailer_gmail_api_url: String,

    #[clap(
        long,
        default_value = "https://www.googleapis.com/drive/v3",
        env,
        help = "Base URL of the Google Drive API"
    )]
    pub gmailer_drive_api_url: String,

    #[clap(
        long,
        default_value = "30",
        env,
        help = "Timeout in seconds for a single API request"
    )]
    pub gmailer_http_timeout_secs: u64,

    #[clap(
        long,
        default_value = "5",
        env,
        help = "Number of message details fetched concurrently when listing",
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub gmailer_summary_batch_size: u16,

    #[clap(
        long,
        default_value = "false",
        env,
        help = "Read Drive downloads into memory in one piece instead of streaming them"
    )]
    pub gmailer_drive_buffered: bool,

    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List message summaries, newest first
    List {
        #[clap(long, help = "Gmail search query, e.g. \"is:unread from:alice\"")]
        query: Option<String>,
        #[clap(long, default_value = "10")]
        limit: u32,
    },
    /// Print the readable body of a message
    Read { id: String },
    /// List the attachments of a message
    Attachments { id: String },
    /// Save one attachment of a message to disk
    Download {
        id: String,
        part_id: String,
        #[clap(long)]
        out: PathBuf,
    },
    /// Send a new message
    Send(ComposeArgs),
    /// Create a draft
    Draft(ComposeArgs),
    /// Reply to a message on its thread
    Reply {
        id: String,
        #[clap(long)]
        body: String,
        #[clap(long, default_value = "false")]
        html: bool,
    },
    /// List labels
    Labels,
    /// Add or remove labels on a message
    Label {
        id: String,
        #[clap(long)]
        add: Vec<String>,
        #[clap(long)]
        remove: Vec<String>,
    },
    /// Move a message to the trash
    Trash { id: String },
    /// Restore a message from the trash
    Untrash { id: String },
    /// List filters
    Filters,
    /// Create a filter
    FilterCreate(FilterArgs),
    /// Delete a filter
    FilterDelete { id: String },
}

#[derive(Debug, Clone, Args)]
pub struct ComposeArgs {
    #[clap(long)]
    pub to: String,
    #[clap(long)]
    pub subject: String,
    #[clap(long)]
    pub body: String,
    #[clap(long, default_value = "false", help = "Send the body as text/html")]
    pub html: bool,
    #[clap(long = "attach", help = "Local file to attach, may be repeated")]
    pub attach: Vec<PathBuf>,
    #[clap(long = "drive-file", help = "Google Drive file id to attach, may be repeated")]
    pub drive_file: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    #[clap(long)]
    pub from: Option<String>,
    #[clap(long)]
    pub to: Option<String>,
    #[clap(long)]
    pub subject: Option<String>,
    #[clap(long)]
    pub query: Option<String>,
    #[clap(long = "add-label")]
    pub add_label: Vec<String>,
    #[clap(long = "remove-label")]
    pub remove_label: Vec<String>,
    #[clap(long)]
    pub forward: Option<String>,
}

impl Settings {
    #[cfg(test)]
    fn new_for_test() -> Self {
        Self {
            gmailer_log_level: "info".to_string(),
            gmailer_ansi_logs: false,
            gmailer_log_to_file: false,
            gmailer_log_dir: PathBuf::from("logs"),
            gmailer_max_log_files: 5,
            gmailer_access_token: None,
            gmailer_gmail_api_url: "https://gmail.googleapis.com/gmail/v1/users/me".to_string(),
            gmailer_drive_api_url: "https://www.googleapis.com/drive/v3".to_string(),
            gmailer_http_timeout_secs: 30,
            gmailer_summary_batch_size: 5,
            gmailer_drive_buffered: false,
            command: None,
        }
    }
}
