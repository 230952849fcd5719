//! # Validate Subcommand
//!
//! Decodes a plan, state, or configuration file and runs the
//! format-version gate on it. The document kind comes from `--kind` or is
//! detected from the top-level keys.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use tfjson_core::DocumentKind;

use crate::GlobalOptions;

/// Arguments for the `tfjson validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Document to validate.
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Document kind: plan, state, or config. Detected when omitted.
    #[arg(long)]
    pub kind: Option<DocumentKind>,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when the document decodes and passes the gate,
/// 1 when it is rejected.
pub fn run_validate(args: &ValidateArgs, opts: &GlobalOptions) -> Result<u8> {
    let bytes = crate::read_input(&args.path)?;
    match crate::decode_document(&bytes, args.kind, opts) {
        Ok(doc) => {
            tracing::info!(path = %args.path.display(), kind = %doc.kind(), "document valid");
            println!("OK: {} ({})", args.path.display(), doc.kind());
            Ok(0)
        }
        Err(e) => {
            tracing::info!(path = %args.path.display(), "document rejected");
            println!("{}", crate::rejection_line(&args.path, &e));
            Ok(1)
        }
    }
}
