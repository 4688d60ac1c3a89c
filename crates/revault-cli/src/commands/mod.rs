//! Command execution against the file storage facade.

use std::path::Path;

use anyhow::{Context, bail};
use revault_storage::{FileStorage, UploadResult};

use crate::TRACING_TARGET_COMMAND;
use crate::config::Command;

/// Runs a single storage command.
pub async fn execute(command: Command, storage: &FileStorage) -> anyhow::Result<()> {
    tracing::debug!(target: TRACING_TARGET_COMMAND, command = ?command, "executing command");

    match command {
        Command::Check => {
            if !storage.check_connectivity().await {
                bail!("bucket '{}' is not reachable", storage.client().bucket());
            }
            println!("ok");
        }
        Command::UploadPaper { file, name } => {
            let (data, name) = read_upload(&file, name).await?;
            let result = storage.upload_research_paper(data, &name).await?;
            print_upload(&result)?;
        }
        Command::UploadAvatar {
            user_id,
            file,
            name,
        } => {
            let (data, name) = read_upload(&file, name).await?;
            let result = storage.upload_profile_picture(data, &name, &user_id).await?;
            print_upload(&result)?;
        }
        Command::DeleteAvatar { user_id, file_name } => {
            if !storage.delete_profile_picture(&user_id, &file_name).await {
                bail!("failed to delete profile picture '{file_name}' of user '{user_id}'");
            }
        }
        Command::List { prefix } => match prefix {
            Some(prefix) => storage.list_files_with_prefix(&prefix).await,
            None => storage.list_files().await,
        },
        Command::Provision => storage.create_bucket_if_not_exists().await?,
        Command::MakePublic => storage.make_bucket_public().await?,
    }

    Ok(())
}

/// Reads an upload's contents and resolves the original file name to record.
async fn read_upload(file: &Path, name: Option<String>) -> anyhow::Result<(Vec<u8>, String)> {
    let name = match name {
        Some(name) => name,
        None => file_name(file)?,
    };

    let data = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read '{}'", file.display()))?;

    Ok((data, name))
}

fn file_name(file: &Path) -> anyhow::Result<String> {
    file.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .with_context(|| format!("'{}' has no usable file name", file.display()))
}

fn print_upload(result: &UploadResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(result).context("failed to serialize upload result")?;
    println!("{json}");
    Ok(())
}
