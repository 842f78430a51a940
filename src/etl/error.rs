use crate::warehouse::PersistenceError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can stop a load.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("Cannot discover files under {}: {reason}", .root.display())]
    Discovery { root: PathBuf, reason: String },

    #[error("Parse error{}: {message}", location(.path, .line))]
    Parse {
        path: Option<PathBuf>,
        line: Option<usize>,
        message: String,
    },

    #[error("Transform error{}: {message}", location(.path, .line))]
    Transform {
        path: Option<PathBuf>,
        line: Option<usize>,
        message: String,
    },

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

fn location(path: &Option<PathBuf>, line: &Option<usize>) -> String {
    match (path, line) {
        (Some(path), Some(line)) => format!(" in {}:{}", path.display(), line),
        (Some(path), None) => format!(" in {}", path.display()),
        (None, Some(line)) => format!(" at line {}", line),
        (None, None) => String::new(),
    }
}

impl EtlError {
    pub fn discovery(root: &Path, reason: impl ToString) -> Self {
        EtlError::Discovery {
            root: root.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn parse(line: Option<usize>, message: impl Into<String>) -> Self {
        EtlError::Parse {
            path: None,
            line,
            message: message.into(),
        }
    }

    pub fn transform(line: Option<usize>, message: impl Into<String>) -> Self {
        EtlError::Transform {
            path: None,
            line,
            message: message.into(),
        }
    }

    /// Attaches the source file to parse and transform errors that lack one.
    pub fn in_file(self, file: &Path) -> Self {
        match self {
            EtlError::Parse {
                path: None,
                line,
                message,
            } => EtlError::Parse {
                path: Some(file.to_path_buf()),
                line,
                message,
            },
            EtlError::Transform {
                path: None,
                line,
                message,
            } => EtlError::Transform {
                path: Some(file.to_path_buf()),
                line,
                message,
            },
            other => other,
        }
    }
}
