// src/error.rs
use thiserror::Error;

/// Errors raised by the configuration and setup glue around the detector.
///
/// The detection path itself never fails: a missing document body, a font
/// that never arrives, or an invalid style declaration all degrade silently.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Invalid configuration: {field} = {value}")]
    ConfigurationError { field: String, value: String },

    #[error("Invalid font request: {input:?}")]
    InvalidFontRequest { input: String },

    #[error("Font error: {message}")]
    FontError { message: String },

    #[error("Failed to read font face for {family}: {source}")]
    FaceLoadFailed {
        family: String,
        #[source]
        source: std::io::Error,
    },
}

pub type LoaderResult<T> = Result<T, LoaderError>;
