//! Error types
//!
//! Loading the room model is the only operation that can fail once the window
//! and GPU are up. Set-up failures are reported through `anyhow` by the app.

use std::path::PathBuf;

use thiserror::Error;

/// Why a model could not be loaded
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("loader for {path} stopped without a result")]
    Interrupted { path: PathBuf },
}

impl LoadError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::Io { path, .. }
            | LoadError::Parse { path, .. }
            | LoadError::Interrupted { path } => path,
        }
    }
}

pub type LoadResult<T> = Result<T, LoadError>;
