//! Definition of errors.

/// A specialized Result type for Cwseg.
pub type Result<T, E = CwsegError> = std::result::Result<T, E>;

/// The error type for Cwseg.
#[derive(Debug, thiserror::Error)]
pub enum CwsegError {
    /// An argument violates a precondition of the called operation.
    #[error("InvalidArgumentError: {arg}: {msg}")]
    InvalidArgument { arg: &'static str, msg: String },

    /// An input corpus or model file is malformed.
    #[error("InvalidFormatError: {arg}: {msg}")]
    InvalidFormat { arg: &'static str, msg: String },

    /// The training corpus has no character to classify.
    #[error("EmptyCorpusError: the training corpus contains no characters")]
    EmptyCorpus,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CwsegError {
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument {
            arg,
            msg: msg.into(),
        }
    }

    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat {
            arg,
            msg: msg.into(),
        }
    }
}
