//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types used throughout tfjson. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Expression decoding errors carry the dotted field path of the
//!   offending expression (`ingress[1].cidr_blocks`) and, where a parse
//!   failed, the wrapped `serde_json` error.
//! - Format-version gate errors carry the document kind and the expected
//!   vs actual version.
//! - Decoding is all-or-nothing: the first structural problem wins and no
//!   partial document is returned.

use thiserror::Error;

/// Top-level error type for tfjson.
#[derive(Error, Debug)]
pub enum TfjsonError {
    /// A single expression failed to decode.
    #[error("expression error: {0}")]
    Expression(#[from] ExpressionError),

    /// The document failed the format-version gate.
    #[error("version gate: {0}")]
    Gate(#[from] GateError),

    /// Canonical encoding failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The document was not valid JSON or did not match the schema.
    ///
    /// Expression failures inside a document surface here with their
    /// field path embedded in the message alongside the line and column.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error decoding one configuration expression.
#[derive(Error, Debug)]
pub enum ExpressionError {
    /// The raw JSON could not be parsed into the shape its first token
    /// announced.
    #[error("failed to decode expression `{path}`: {source}")]
    Decode {
        /// Dotted path of the expression being decoded.
        path: String,
        /// The underlying parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// The raw JSON parsed, but is not one of the recognised expression
    /// shapes.
    #[error("expression `{path}` has an unsupported shape: {reason}")]
    UnsupportedShape {
        /// Dotted path of the expression being decoded.
        path: String,
        /// What was found instead.
        reason: String,
    },

    /// Nested block lists were deeper than the configured limit.
    #[error("nested blocks at `{path}` exceed the depth limit of {limit}")]
    UnboundedNesting {
        /// Dotted path of the block list that crossed the limit.
        path: String,
        /// The configured limit.
        limit: usize,
    },
}

impl ExpressionError {
    /// The field path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            Self::Decode { path, .. }
            | Self::UnsupportedShape { path, .. }
            | Self::UnboundedNesting { path, .. } => path,
        }
    }
}

/// Error raised by the format-version gate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    /// No document was supplied.
    #[error("{kind} document is missing")]
    MissingDocument {
        /// Document kind, e.g. `plan`.
        kind: &'static str,
    },

    /// The document has an empty `format_version`.
    #[error("{kind} document has no format_version")]
    MissingVersion {
        /// Document kind, e.g. `plan`.
        kind: &'static str,
    },

    /// The document declares a format version this library does not
    /// implement.
    #[error("unsupported {kind} format_version {got:?}, expected {expected:?}")]
    VersionMismatch {
        /// Document kind, e.g. `plan`.
        kind: &'static str,
        /// The version this library implements.
        expected: String,
        /// The version the document declares.
        got: String,
    },
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
