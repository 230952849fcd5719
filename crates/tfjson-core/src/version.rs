//! # Format-Version Gate
//!
//! A shallow, fast-fail check run on every decoded top-level document
//! before any consumer trusts the rest of its structure.
//!
//! The gate looks at exactly one thing: the `format_version` tag. It must
//! be present and must string-equal the single version this library
//! implements for that document kind. Versions are never compared
//! numerically and never auto-corrected.

use crate::error::GateError;

/// Version of the plan JSON format implemented by this crate.
pub const PLAN_FORMAT_VERSION: &str = "0.1";

/// Version of the state JSON format implemented by this crate.
pub const STATE_FORMAT_VERSION: &str = "0.1";

/// A top-level document that carries a `format_version` tag.
pub trait Versioned {
    /// The only version string accepted for this kind.
    const FORMAT_VERSION: &'static str;

    /// Document kind used in error messages, e.g. `plan`.
    const KIND: &'static str;

    /// The version the decoded document declares.
    fn format_version(&self) -> &str;
}

/// Check that `document` is present and declares exactly
/// `D::FORMAT_VERSION`.
///
/// # Errors
///
/// - [`GateError::MissingDocument`] if `document` is `None`.
/// - [`GateError::MissingVersion`] if `format_version` is empty.
/// - [`GateError::VersionMismatch`] if it differs from `D::FORMAT_VERSION`.
pub fn validate<D: Versioned>(document: Option<&D>) -> Result<(), GateError> {
    let document = document.ok_or(GateError::MissingDocument { kind: D::KIND })?;
    let got = document.format_version();

    if got.is_empty() {
        tracing::debug!(kind = D::KIND, "document rejected: no format_version");
        return Err(GateError::MissingVersion { kind: D::KIND });
    }

    if got != D::FORMAT_VERSION {
        tracing::debug!(
            kind = D::KIND,
            expected = D::FORMAT_VERSION,
            got,
            "document rejected: format_version mismatch"
        );
        return Err(GateError::VersionMismatch {
            kind: D::KIND,
            expected: D::FORMAT_VERSION.to_owned(),
            got: got.to_owned(),
        });
    }

    tracing::debug!(kind = D::KIND, version = got, "format_version accepted");
    Ok(())
}

/// Configuration documents carry no version tag, so their gate is the
/// presence check alone.
///
/// # Errors
///
/// [`GateError::MissingDocument`] if `config` is `None`.
pub fn validate_config(config: Option<&crate::config::Config>) -> Result<(), GateError> {
    config
        .map(|_| ())
        .ok_or(GateError::MissingDocument { kind: "config" })
}
