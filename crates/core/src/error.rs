use thiserror::Error;

/// Result type for cxxdoc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for cxxdoc operations
///
/// Only configuration and I/O problems are errors. Problems found while
/// walking a translation unit are recorded as [`crate::diagnostics::Diagnostic`]s
/// and never abort the walk.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file or value errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument passed to a configuration mutator
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Front-end dump could not be read
    #[error("Front-end error: {0}")]
    FrontEnd(String),

    /// A declaration could not be turned into an entity
    #[error("Classification error: {0}")]
    Classification(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates a front-end error
    pub fn front_end(msg: impl Into<String>) -> Self {
        Self::FrontEnd(msg.into())
    }

    /// Creates a classification error
    pub fn classification(msg: impl Into<String>) -> Self {
        Self::Classification(msg.into())
    }

    /// Adds context to any error
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::with_context(context, e))
    }
}
