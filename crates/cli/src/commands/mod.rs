//! Command implementations.

pub mod certifications;
pub mod contacts;
pub mod projects;

use std::path::{Path, PathBuf};

use portfolio_console::{ApiError, ConfigError};
use portfolio_core::{Attachment, AttachmentError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A local file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A payload file is not valid JSON for the record.
    #[error("Invalid payload in {}: {source}", path.display())]
    Payload {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The attachment was rejected before upload.
    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    /// Output could not be rendered.
    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Read a JSON payload file.
pub async fn read_payload<T: DeserializeOwned>(path: &Path) -> Result<T, CommandError> {
    let bytes = read(path).await?;
    serde_json::from_slice(&bytes).map_err(|source| CommandError::Payload {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a file for upload, guessing its content type from the extension.
pub async fn read_attachment(path: &Path) -> Result<Attachment, CommandError> {
    let bytes = read(path).await?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = Attachment::content_type_for(&file_name);

    tracing::debug!(file_name = %file_name, content_type, size = bytes.len(), "Loaded attachment");
    Ok(Attachment::new(file_name, content_type, bytes)?)
}

async fn read(path: &Path) -> Result<Vec<u8>, CommandError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| CommandError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Print a value as pretty JSON on stdout.
#[allow(clippy::print_stdout)]
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
