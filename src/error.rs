use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `booklens`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide how to report a failure; the binary wraps them in
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum LensError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Text generation / moderation ────────────────────────────────────
    #[error("generation: {0}")]
    Generation(#[from] GenerationError),

    // ── Pipeline fail-fast ──────────────────────────────────────────────
    #[error("section {index} ({title}) failed: {source}")]
    Section {
        index: usize,
        title: String,
        #[source]
        source: GenerationError,
    },

    // ── Response repair ─────────────────────────────────────────────────
    #[error("parse: {0}")]
    Parse(#[from] ParseError),

    // ── Engine state ────────────────────────────────────────────────────
    #[error("state: {0}")]
    State(#[from] StateError),

    // ── History import ──────────────────────────────────────────────────
    #[error("history import: {0}")]
    Import(#[from] HistoryImportError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Generation errors ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("provider {provider} has no API key configured")]
    MissingApiKey { provider: String },

    #[error("provider {provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("provider {provider} API error ({status}): {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("provider {provider} returned no content")]
    EmptyResponse { provider: String },

    #[error("response did not match shape {shape}: {message}")]
    Decode { shape: String, message: String },

    #[error("moderation failed: {0}")]
    Moderation(String),
}

// ─── Response repair errors ─────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not repair response for field {field}: {message}")]
    Unrepairable { field: String, message: String },

    #[error("response for field {field} is not a {expected}")]
    ShapeMismatch {
        field: String,
        expected: &'static str,
    },
}

// ─── Engine state errors ────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("no summary loaded")]
    NoSummary,

    #[error("refinement history is empty")]
    EmptyHistory,

    #[error("no refinement entry with timestamp {0}")]
    TimestampNotFound(i64),
}

// ─── History import errors ──────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryImportError {
    #[error("version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("malformed history: {0}")]
    Malformed(String),

    #[error("history timestamps are not strictly increasing")]
    NonMonotonicTimestamps,
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, LensError>;
