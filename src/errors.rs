/*!
 * Error types for the cuesmith library.
 *
 * Library-level failures are thiserror enums; the controller, the binary and
 * file handling wrap them in `anyhow` with context.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
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
}

/// Errors raised by the cue store and the subtitle formats
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// Merge indices out of range or reversed
    #[error("Invalid segment range {start}..={end} for {len} segments")]
    SegmentIndex {
        start: usize,
        end: usize,
        len: usize,
    },

    /// Input could not be parsed into cues
    #[error("Failed to parse subtitles: {0}")]
    Parse(String),

    /// Output extension has no serializer
    #[error("Unsupported subtitle format: {0}")]
    UnsupportedFormat(String),
}

/// Errors that can occur during translation of a batch
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The model answered with the wrong shape or cardinality
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// Restated lines drifted too far from the source lines
    #[error("Alignment repair failed: similarity rate {rate:.2} below acceptance")]
    AlignmentRepairFailure {
        /// Fraction of aligned positions judged similar
        rate: f64,
    },
}
