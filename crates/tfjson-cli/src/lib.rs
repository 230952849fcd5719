//! # tfjson-cli: Command-Line Interface for tfjson Documents
//!
//! Provides the `tfjson` binary, a thin wrapper that reads plan, state,
//! and configuration files and hands them to `tfjson-core`.
//!
//! ## Subcommands
//!
//! - `tfjson validate`: Decode a document and run the format-version gate.
//! - `tfjson fmt`: Decode and re-encode with sorted keys, compact or
//!   indented. `--canonical` writes JCS bytes for comparison.
//! - `tfjson summary`: Change counts and unresolved references of a plan.
//!
//! ```bash
//! tfjson validate plan.json
//! tfjson validate --kind state terraform.tfstate.json
//! tfjson --max-depth 8 fmt plan.json --output plan.sorted.json
//! tfjson fmt plan.json --canonical > plan.jcs
//! tfjson summary plan.json --json
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from handler logic.
//! - Handlers delegate to `tfjson-core`; no decoding rules live here.
//! - Handlers return an exit code: 0 on success, 1 on a rejected document.
//!   Operational failures (unreadable files) are `Err`.

pub mod fmt;
pub mod summary;
pub mod validate;

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tfjson_core::{DecodeOptions, Document, DocumentDecoder, DocumentKind, DEFAULT_MAX_DEPTH};

/// Options shared by every subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalOptions {
    /// Nested-block depth limit passed to the decoder.
    pub max_depth: usize,
}

impl Default for GlobalOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl GlobalOptions {
    pub fn decoder(&self) -> DocumentDecoder {
        DocumentDecoder::new(DecodeOptions {
            max_depth: self.max_depth,
        })
    }
}

/// Read an input document, attaching the path to any I/O error.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

/// The `FAIL:` line printed for a rejected document, with the full error
/// chain.
pub fn rejection_line(path: &Path, err: &anyhow::Error) -> String {
    format!("FAIL: {}: {err:#}", path.display())
}

/// Decode and gate a document. When `kind` is `None` it is detected from
/// the top-level keys.
pub fn decode_document(
    bytes: &[u8],
    kind: Option<DocumentKind>,
    opts: &GlobalOptions,
) -> Result<Document> {
    let kind = match kind {
        Some(kind) => kind,
        None => DocumentKind::detect(bytes)?
            .ok_or_else(|| anyhow!("cannot determine document kind; pass --kind"))?,
    };
    tracing::debug!(%kind, max_depth = opts.max_depth, "decoding document");
    Ok(opts.decoder().decode_kind(kind, bytes)?)
}
