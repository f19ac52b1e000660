use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("NR_STATE_DIR is required but not set")]
    StateDirUnset,

    #[error(
        "State directory {} does not exist. Set NR_ALLOW_INIT_DIR=true to create it automatically.",
        .0.display()
    )]
    StateDirMissing(PathBuf),

    #[error("State directory {} is not accessible: {reason}", .path.display())]
    StateDirInaccessible { path: PathBuf, reason: String },

    #[error("fileName is required")]
    EmptyFileName,

    #[error("Invalid file path {0}")]
    PathEscape(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
