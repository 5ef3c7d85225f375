use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::fmdl::{EncodeError, FormatError};

/// Failure of a whole import or export call.
#[derive(Error, Debug)]
pub enum FmdlError {
    #[error("malformed FMDL data: {0}")]
    Format(#[from] FormatError),

    #[error("scene cannot be encoded: {0}")]
    Encode(#[from] EncodeError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("host adapter failed: {0}")]
    Host(String),

    #[error("invalid options: {0}")]
    Options(String),
}

impl FmdlError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        FmdlError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Keep the adapter's whole context chain in the message.
    pub fn host(err: anyhow::Error) -> Self {
        FmdlError::Host(format!("{:#}", err))
    }
}
