use std::time::Duration;
use thiserror::Error;

/// Errors raised while sampling the host
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to start `{program}`: {source}")]
    ProcessStart {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {what}: {detail}")]
    Parse { what: &'static str, detail: String },

    #[error("`{program}` did not finish within {timeout:?}")]
    CommandTimeout { program: String, timeout: Duration },

    #[error("`{program}` exited with {status} and produced no output")]
    CommandFailed { program: String, status: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn process_start<S: Into<String>>(program: S, source: std::io::Error) -> Self {
        Self::ProcessStart {
            program: program.into(),
            source,
        }
    }

    pub fn parse<S: Into<String>>(what: &'static str, detail: S) -> Self {
        Self::Parse {
            what,
            detail: detail.into(),
        }
    }

    pub fn command_timeout<S: Into<String>>(program: S, timeout: Duration) -> Self {
        Self::CommandTimeout {
            program: program.into(),
            timeout,
        }
    }

    pub fn command_failed<S: Into<String>, T: ToString>(program: S, status: T) -> Self {
        Self::CommandFailed {
            program: program.into(),
            status: status.to_string(),
        }
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the failure came from tool output not matching its expected shape
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
