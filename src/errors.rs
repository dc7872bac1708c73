/*!
 * Error types for the modloc application.
 *
 * This module contains custom error types for different parts of the pipeline,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when working with provider backends
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// A subprocess-backed provider failed or timed out
    #[error("Provider process error: {0}")]
    ProcessError(String),

    /// The provider call exceeded its deadline
    #[error("Provider call timed out after {0}s")]
    Timeout(u64),

    /// Unknown provider identifier passed to the adapter registry
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
}

/// Errors that can occur while reading or parsing localisation files
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// File could not be read
    #[error("Failed to read localisation file: {0}")]
    ReadFailed(String),

    /// File bytes could not be decoded with any supported encoding
    #[error("Failed to decode file {path}: {reason}")]
    DecodeFailed {
        /// Path of the offending file
        path: String,
        /// Decoder diagnostic
        reason: String,
    },
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider backend
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The response could not be parsed into a list of translations
    #[error("Failed to parse translation response: {0}")]
    ParseFailure(String),

    /// The response had the wrong number of items
    #[error("Translation count mismatch: expected {expected}, got {actual}")]
    CardinalityMismatch {
        /// Number of source texts sent
        expected: usize,
        /// Number of translations received
        actual: usize,
    },

    /// All retry attempts for a batch were exhausted
    #[error("Batch {batch_index} exhausted all {attempts} attempts: {last_error}")]
    BatchExhausted {
        /// Index of the failed batch within its file
        batch_index: usize,
        /// Total attempts made
        attempts: usize,
        /// The final error message
        last_error: String,
    },

    /// A whole translation job failed
    #[error("Job {job_id} failed: {reason}")]
    JobFailure {
        /// The job identifier
        job_id: String,
        /// Failure description
        reason: String,
    },
}

/// Errors that can occur in the checkpoint store
#[derive(Error, Debug)]
pub enum CheckpointError {
    /// Underlying SQLite failure
    #[error("Checkpoint database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored batch payload could not be decoded
    #[error("Corrupt checkpoint payload for batch {0}: {1}")]
    CorruptPayload(usize, String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from localisation file parsing
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from the checkpoint store
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
