use thiserror::Error;
use crate::core::state_machine::CyclePhase;

#[derive(Error, Debug)]
pub enum Error {
    // Sampling Errors
    #[error("Source fetch failed for {url}: {reason}")]
    SourceFetch {
        url: String,
        reason: String,
    },

    #[error("Extraction path {path:?} failed: {reason}")]
    Extraction {
        path: String,
        reason: String,
    },

    // Aggregation Errors
    #[error("Consensus invalid: {0}")]
    ConsensusInvalid(String),

    // Relay Errors
    #[error("Submission to {endpoint} failed: {reason}")]
    Submission {
        endpoint: String,
        reason: String,
    },

    #[error("Action {action} failed on all endpoints after {attempts} attempts")]
    SubmissionExhausted {
        action: String,
        attempts: usize,
    },

    #[error("No ledger endpoints configured")]
    NoEndpoints,

    // Scheduling Errors
    #[error("Invalid cycle transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: CyclePhase,
        to: CyclePhase,
    },

    #[error("Scheduler failed: {0}")]
    SchedulerFailed(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    // Transport Errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // IO Errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout(e.to_string())
        } else {
            Error::Http(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
