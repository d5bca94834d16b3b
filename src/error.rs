// src/error.rs

/// Failures surfaced by the sheet pipeline.
///
/// Cache and URL derivation never fail; parse problems are warnings only.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// The sheet key has no configured base URL.
    #[error("no CSV URL configured for sheet `{key}`")]
    Config { key: String },

    /// Every candidate URL failed. Carries only the last failure.
    #[error("CSV request failed: {message}")]
    FetchFailed { message: String },
}
