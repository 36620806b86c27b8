//! Saves the request currently being typed so it survives a restart.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde_json::Error as SerdeError;
use tracing::{debug, warn};

use crate::domain::TransportRequest;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "TransportQuote";
const APP_NAME: &str = "TransportQuote";
const DRAFT_FILENAME: &str = "draft_request.json";

pub fn draft_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(DRAFT_FILENAME))
}

pub fn load_draft() -> Option<TransportRequest> {
    load_draft_from(&draft_file()?)
}

pub fn save_draft(request: &TransportRequest) -> Result<(), DraftError> {
    let path = draft_file().ok_or(DraftError::StorageUnavailable)?;
    save_draft_to(&path, request)
}

pub fn clear_draft() -> Result<(), DraftError> {
    let path = draft_file().ok_or(DraftError::StorageUnavailable)?;
    clear_draft_at(&path)
}

/// A missing or unreadable draft is treated as no draft.
pub fn load_draft_from(path: &Path) -> Option<TransportRequest> {
    let data = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&data) {
        Ok(request) => {
            debug!(path = %path.display(), "loaded draft request");
            Some(request)
        }
        Err(err) => {
            warn!(path = %path.display(), "ignoring unreadable draft: {err}");
            None
        }
    }
}

pub fn save_draft_to(path: &Path, request: &TransportRequest) -> Result<(), DraftError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(request)?;
    fs::write(path, json)?;
    debug!(path = %path.display(), "saved draft request");
    Ok(())
}

pub fn clear_draft_at(path: &Path) -> Result<(), DraftError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}
