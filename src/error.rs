use std::io;
use thiserror::Error;
use tokio::time::error::Elapsed as TimeElapsed;

pub type Result<T> = std::result::Result<T, Error>;

/// Stderr fragments recognised on every command, in match order.
pub(crate) const DEFAULT_HINTS: &[(&str, ErrorKind)] = &[
    ("No such file or directory", ErrorKind::NotFound),
    ("Permission denied", ErrorKind::PermissionDenied),
    ("File exists", ErrorKind::AlreadyExists),
];

/// Exit status used by `ssh` itself when the connection fails.
const SSH_CONNECTION_FAILURE: i32 = 255;

/// Enum for library errors
///
/// Local and remote failures are reported through the same variants, so a
/// missing file is [`Error::NotFound`] whether `tokio::fs` or a remote `cat`
/// noticed it.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("No such file or directory: {0}")]
    NotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("File exists: {0}")]
    AlreadyExists(String),
    /// The ssh client could not reach or authenticate with the host
    #[error("Connection: {0}")]
    Connection(String),
    /// A command exited unsuccessfully and its stderr matched nothing known
    #[error("Command failed ({}): {stderr}", .status.map_or("signal".to_owned(), |s| s.to_string()))]
    Command { status: Option<i32>, stderr: String },
    /// Time limit for the command exceeded
    #[error("Timeout")]
    Timeout,
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Hosts must match: '{left}' and '{right}'")]
    HostMismatch { left: String, right: String },
    #[error("'{path}' is not relative to '{base}'")]
    NotRelative { path: String, base: String },
    #[error("Invalid glob pattern: {0}")]
    InvalidPattern(String),
    /// A command succeeded but printed something we could not interpret
    #[error("Unexpected output: {0}")]
    UnexpectedOutput(String),
    #[error("I/O: {0}")]
    IO(String),
}

/// Classes of failure a stderr hint can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    AlreadyExists,
}

impl ErrorKind {
    fn into_error(self, message: String) -> Error {
        match self {
            Self::NotFound => Error::NotFound(message),
            Self::PermissionDenied => Error::PermissionDenied(message),
            Self::AlreadyExists => Error::AlreadyExists(message),
        }
    }
}

impl Error {
    /// Classify a failed command from its exit status and stderr.
    ///
    /// `hints` are checked before [`DEFAULT_HINTS`], so a command can
    /// reclassify a fragment the defaults already know about.
    pub(crate) fn from_failure(status: Option<i32>, stderr: &str, hints: &[(&str, ErrorKind)]) -> Self {
        let stderr = stderr.trim();

        let hinted = hints
            .iter()
            .chain(DEFAULT_HINTS)
            .find(|(fragment, _)| stderr.contains(fragment));

        match hinted {
            Some((_, kind)) => kind.into_error(stderr.to_owned()),
            None if status == Some(SSH_CONNECTION_FAILURE) => Self::Connection(stderr.to_owned()),
            None => Self::Command {
                status,
                stderr: stderr.to_owned(),
            },
        }
    }

    /// Returns `true` for [`Error::NotFound`]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(error.to_string()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(error.to_string()),
            io::ErrorKind::AlreadyExists => Self::AlreadyExists(error.to_string()),
            _ => Self::IO(error.to_string()),
        }
    }
}

impl From<TimeElapsed> for Error {
    fn from(_: TimeElapsed) -> Self {
        Self::Timeout
    }
}

impl From<glob::PatternError> for Error {
    fn from(error: glob::PatternError) -> Self {
        Self::InvalidPattern(error.to_string())
    }
}

impl From<Error> for io::Error {
    fn from(error: Error) -> Self {
        let kind = match error {
            Error::NotFound(_) => io::ErrorKind::NotFound,
            Error::PermissionDenied(_) => io::ErrorKind::PermissionDenied,
            Error::AlreadyExists(_) => io::ErrorKind::AlreadyExists,
            Error::Timeout => io::ErrorKind::TimedOut,
            Error::InvalidAddress(_)
            | Error::HostMismatch { .. }
            | Error::NotRelative { .. }
            | Error::InvalidPattern(_) => io::ErrorKind::InvalidInput,
            Error::UnexpectedOutput(_) => io::ErrorKind::InvalidData,
            Error::Connection(_) | Error::Command { .. } | Error::IO(_) => io::ErrorKind::Other,
        };

        io::Error::new(kind, error.to_string())
    }
}
