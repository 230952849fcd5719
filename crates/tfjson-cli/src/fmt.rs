//! # Fmt Subcommand
//!
//! Decodes a document and re-encodes it as compact JSON with mapping keys
//! sorted. The output decodes back to the same document. `--pretty`
//! indents it.
//!
//! `--canonical` writes RFC 8785 (JCS) bytes instead. JCS prints integral
//! floats without a fraction (`5.0` becomes `5`), so canonical output is
//! for byte comparison and hashing only and does not round-trip.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use tfjson_core::{document, Document, DocumentKind};

use crate::GlobalOptions;

/// Arguments for the `tfjson fmt` subcommand.
#[derive(Args, Debug)]
pub struct FmtArgs {
    /// Document to re-encode.
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Document kind: plan, state, or config. Detected when omitted.
    #[arg(long)]
    pub kind: Option<DocumentKind>,

    /// Write to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Indent the output.
    #[arg(long, conflicts_with = "canonical")]
    pub pretty: bool,

    /// Write JCS canonical bytes, for comparison only. Integral floats
    /// lose their fraction, so the result does not decode to the input.
    #[arg(long)]
    pub canonical: bool,
}

impl FmtArgs {
    fn form(&self) -> OutputForm {
        if self.canonical {
            OutputForm::Canonical
        } else if self.pretty {
            OutputForm::Pretty
        } else {
            OutputForm::Compact
        }
    }
}

/// How `fmt` encodes the decoded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputForm {
    /// Compact JSON, keys of schema-less mappings sorted.
    #[default]
    Compact,
    /// Indented JSON with the same key order.
    Pretty,
    /// RFC 8785 bytes. Not guaranteed to decode to the same document.
    Canonical,
}

/// Execute the fmt subcommand.
///
/// Returns exit code: 0 on success, 1 when the input is rejected.
pub fn run_fmt(args: &FmtArgs, opts: &GlobalOptions) -> Result<u8> {
    let bytes = crate::read_input(&args.path)?;
    let doc = match crate::decode_document(&bytes, args.kind, opts) {
        Ok(doc) => doc,
        Err(e) => {
            println!("{}", crate::rejection_line(&args.path, &e));
            return Ok(1);
        }
    };

    let form = args.form();
    let mut out = encode(&doc, form)?;
    out.push(b'\n');

    match &args.output {
        Some(path) => {
            std::fs::write(path, &out)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(
                input = %args.path.display(),
                output = %path.display(),
                bytes = out.len(),
                ?form,
                "formatted document"
            );
        }
        None => {
            std::io::stdout()
                .lock()
                .write_all(&out)
                .context("failed to write to stdout")?;
        }
    }
    Ok(0)
}

/// Encode a decoded document in the requested form.
pub fn encode(doc: &Document, form: OutputForm) -> Result<Vec<u8>> {
    let bytes = match form {
        OutputForm::Compact => document::to_vec(doc)?,
        OutputForm::Pretty => document::to_vec_pretty(doc)?,
        OutputForm::Canonical => document::to_canonical(doc)?.into_bytes(),
    };
    Ok(bytes)
}
