use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while registering routes or serving a request.
///
/// Anything a verb method returns as `Err` is a handler fault: the
/// dispatcher turns it into a 500 response and keeps serving.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no argument {0}")]
    MissingArgument(String),

    #[error("view {} not found", path.display())]
    ViewNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid placeholder in view {view}: {reason}")]
    Template { view: String, reason: String },

    #[error("view name {0:?} leaves the view directory")]
    InvalidView(String),

    #[error("no binding for placeholder ${0}")]
    MissingBinding(String),

    #[error("failed to serialize response body: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid route pattern {pattern:?}")]
    InvalidRoute {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{0}")]
    Handler(String),

    #[error("handler panicked: {0}")]
    Panic(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Free-form failure raised from inside a verb method.
    pub fn handler(message: impl Into<String>) -> Self {
        Error::Handler(message.into())
    }

    /// The error and each of its sources, one per line.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            out.push_str("\ncaused by: ");
            out.push_str(&err.to_string());
            source = err.source();
        }
        out
    }
}

pub type Result<T> = std::result::Result<T, Error>;
