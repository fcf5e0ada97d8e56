use std::{io, path::PathBuf};

/// An error from an unsuccessful generation step
///
/// Malformed schema text never ends up here: the parser degrades to defaults
/// and reports a [`crate::Diagnostic`] instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing a file failed
    #[error("I/O error on `{}`: {source}", path.display())]
    Io {
        /// The file being read or written
        path: PathBuf,
        /// The underlying failure
        #[source]
        source: io::Error,
    },
    /// The template for one artifact could not be located
    #[error("Template `{0}` not found")]
    TemplateNotFound(String),
    /// A configuration file could not be read or parsed
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// An insertion anchor is not a valid regular expression
    #[error("Invalid anchor pattern `{pattern}`: {reason}")]
    InvalidAnchor {
        /// The pattern as written
        pattern: String,
        /// Why it was rejected
        reason: String,
    },
    /// A generation option has an unsupported value
    #[error("Unsupported option value '{value}' for {option}")]
    InvalidOption {
        /// Name of the option
        option: &'static str,
        /// The rejected value
        value: String,
    },
}

impl Error {
    /// Attach the offending path to an [`io::Error`]
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
