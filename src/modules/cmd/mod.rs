// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::{
    modules::{
        drive::client::DriveClient,
        error::{code::ErrorCode, GmailerResult},
        gmail::{
            client::GmailClient,
            mailer::{Compose, Mailer, TEXT_HTML, TEXT_PLAIN},
            model::filters::{FilterAction, FilterCriteria},
        },
        http::HttpClient,
        mime::resolver::AttachmentSource,
        settings::cli::{Command, ComposeArgs, FilterArgs, Settings},
        store::local::LocalFs,
    },
    raise_error,
};

pub type CliMailer = Mailer<GmailClient, LocalFs, DriveClient, LocalFs>;

/// Wires the API clients from the settings.
pub fn build_mailer(settings: &Settings) -> GmailerResult<CliMailer> {
    let token = settings
        .gmailer_access_token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| {
            raise_error!(
                "An OAuth2 access token is required: pass --gmailer-access-token or set GMAILER_ACCESS_TOKEN".into(),
                ErrorCode::MissingConfiguration
            )
        })?;

    let http = HttpClient::new(
        token,
        Duration::from_secs(settings.gmailer_http_timeout_secs),
    )?;
    let gmail = GmailClient::new(http.clone(), settings.gmailer_gmail_api_url.as_str());
    let drive = DriveClient::new(
        http,
        settings.gmailer_drive_api_url.as_str(),
        settings.gmailer_drive_buffered,
    );
    Ok(Mailer::new(gmail, LocalFs, drive, LocalFs)
        .with_summary_batch_size(settings.gmailer_summary_batch_size as usize))
}

pub async fn execute(settings: &Settings, command: &Command) -> GmailerResult<()> {
    let mailer = build_mailer(settings)?;
    debug!("executing {:?}", command);
    match command {
        Command::List { query, limit } => {
            print_json(&mailer.list_summaries(query.as_deref(), Some(*limit)).await?)
        }
        Command::Read { id } => print_json(&mailer.read_message(id).await?),
        Command::Attachments { id } => print_json(&mailer.list_attachments(id).await?),
        Command::Download { id, part_id, out } => {
            let bytes = mailer.download_attachment(id, part_id, out).await?;
            print_json(&json!({ "path": out, "bytes": bytes }))
        }
        Command::Send(args) => print_json(&mailer.send(&compose(args)).await?),
        Command::Draft(args) => print_json(&mailer.create_draft(&compose(args)).await?),
        Command::Reply { id, body, html } => {
            let content_type = if *html { TEXT_HTML } else { TEXT_PLAIN };
            print_json(&mailer.reply(id, body, content_type).await?)
        }
        Command::Labels => print_json(&mailer.list_labels().await?),
        Command::Label { id, add, remove } => {
            mailer.modify_labels(id, add, remove).await?;
            print_json(&json!({ "id": id, "added": add, "removed": remove }))
        }
        Command::Trash { id } => {
            mailer.trash(id).await?;
            print_json(&json!({ "id": id, "trashed": true }))
        }
        Command::Untrash { id } => {
            mailer.untrash(id).await?;
            print_json(&json!({ "id": id, "trashed": false }))
        }
        Command::Filters => print_json(&mailer.list_filters().await?),
        Command::FilterCreate(args) => {
            let (criteria, action) = filter(args);
            print_json(&mailer.create_filter(criteria, action).await?)
        }
        Command::FilterDelete { id } => {
            mailer.delete_filter(id).await?;
            print_json(&json!({ "id": id, "deleted": true }))
        }
    }
}

fn compose(args: &ComposeArgs) -> Compose {
    let mut compose = Compose::new(&args.to, &args.subject, &args.body);
    if args.html {
        compose = compose.html();
    }
    let local = args.attach.iter().cloned().map(AttachmentSource::local);
    let remote = args.drive_file.iter().cloned().map(AttachmentSource::remote);
    local.chain(remote).fold(compose, Compose::attach)
}

fn filter(args: &FilterArgs) -> (FilterCriteria, FilterAction) {
    let criteria = FilterCriteria {
        from: args.from.clone(),
        to: args.to.clone(),
        subject: args.subject.clone(),
        query: args.query.clone(),
        ..Default::default()
    };
    let action = FilterAction {
        add_label_ids: args.add_label.clone(),
        remove_label_ids: args.remove_label.clone(),
        forward: args.forward.clone(),
    };
    (criteria, action)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> GmailerResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| {
        raise_error!(
            format!("Failed to render output: {:#?}", e),
            ErrorCode::InternalError
        )
    })?;
    println!("{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::settings::cli::SETTINGS;
    use std::path::PathBuf;

    #[test]
    fn test_missing_token_is_reported() {
        let err = build_mailer(&SETTINGS).err().unwrap();
        assert_eq!(err.code(), ErrorCode::MissingConfiguration);
    }

    #[test]
    fn test_compose_keeps_local_before_drive() {
        let args = ComposeArgs {
            to: "bob@example.com".into(),
            subject: "Files".into(),
            body: "<p>hi</p>".into(),
            html: true,
            attach: vec![PathBuf::from("/tmp/a.pdf"), PathBuf::from("/tmp/b.png")],
            drive_file: vec!["1AbC".into()],
        };
        let compose = compose(&args);
        assert_eq!(compose.content_type, TEXT_HTML);
        assert_eq!(
            compose.attachments,
            vec![
                AttachmentSource::local("/tmp/a.pdf"),
                AttachmentSource::local("/tmp/b.png"),
                AttachmentSource::remote("1AbC"),
            ]
        );
    }

    #[test]
    fn test_filter_args() {
        let args = FilterArgs {
            from: Some("billing@example.com".into()),
            to: None,
            subject: None,
            query: Some("has:attachment".into()),
            add_label: vec!["Label_3".into()],
            remove_label: vec!["INBOX".into()],
            forward: None,
        };
        let (criteria, action) = filter(&args);
        assert_eq!(criteria.from.as_deref(), Some("billing@example.com"));
        assert_eq!(criteria.query.as_deref(), Some("has:attachment"));
        assert_eq!(action.remove_label_ids, vec!["INBOX".to_string()]);
    }
}
