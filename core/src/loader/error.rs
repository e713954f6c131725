use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong turning source text into a [`crate::board::Program`].
/// Loading is the only fallible stage — once a `Program` exists, evaluation
/// never fails (see [`crate::run_state::RunState`]).
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}:{line}:{column}: {message}")]
    Syntax {
        file: String,
        line: u32,
        column: u32,
        message: String,
    },

    #[error("{file}:{line}: {message}")]
    Semantic {
        file: String,
        line: u32,
        message: String,
    },

    #[error("#include \"{path}\" forms a cycle")]
    IncludeCycle { path: String },
}

impl LoadError {
    pub fn syntax(file: impl Into<String>, line: u32, column: u32, message: impl Into<String>) -> Self {
        LoadError::Syntax {
            file: file.into(),
            line,
            column,
            message: message.into(),
        }
    }

    pub fn semantic(file: impl Into<String>, line: u32, message: impl Into<String>) -> Self {
        LoadError::Semantic {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}
