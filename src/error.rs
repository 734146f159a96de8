//! Error types for the smartcab crate

use thiserror::Error;

/// Main error type for the smartcab crate
///
/// Every variant except the I/O and serialization wrappers is a broken caller
/// contract: the simulator aborts the run when it sees one.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("unknown {field} value '{value}' (expected one of: {expected})")]
    UnknownCategory {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("invalid state label '{label}' (expected 'waypoint|light|left|right|oncoming')")]
    InvalidStateLabel { label: String },

    #[error("state '{state}' has no Q-table row; ensure() must run first")]
    UnknownState { state: String },

    #[error("action '{action}' is not in the declared set of valid actions")]
    InvalidAction { action: String },

    #[error("environment declared no valid actions")]
    NoValidActions,

    #[error("route planner has no waypoint; the vehicle is already at its destination")]
    MissingWaypoint,

    #[error("decay strategy '{input}' is not recognised (expected 'linear' or 'exponential')")]
    ParseDecayStrategy { input: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

impl Error {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }
}
