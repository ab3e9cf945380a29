// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use clap::CommandFactory;
use gmailer::{
    gmailer_version,
    modules::{
        cmd,
        error::{code::ErrorCode, GmailerResult},
        logger,
        settings::cli::{Settings, SETTINGS},
    },
    raise_error,
};
use mimalloc::MiMalloc;
use tracing::{error, info};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> GmailerResult<()> {
    logger::initialize_logging();
    info!("gmailer {} [{}]", gmailer_version!(), env!("GIT_HASH"));

    let Some(command) = SETTINGS.command.as_ref() else {
        return Settings::command().print_help().map_err(|e| {
            raise_error!(
                format!("Failed to print usage: {:#?}", e),
                ErrorCode::IoError
            )
        });
    };

    if let Err(error) = cmd::execute(&SETTINGS, command).await {
        if error.code().is_core() {
            error!("attachment handling failed: {} {}", error.code(), error.message());
        } else {
            error!("{} {}", error.code(), error.message());
        }
        return Err(error);
    }
    Ok(())
}
