//! # Document I/O
//!
//! Entry points that turn raw bytes into gated, typed documents and back.
//!
//! Decoding is all-or-nothing: either the whole tree decodes and passes
//! the format-version gate, or the first problem is returned. Nothing is
//! retried, since decoding is a pure function of its input.
//!
//! [`DocumentDecoder`] carries [`DecodeOptions`] into the serde-driven
//! decode of every expression inside the document for the duration of
//! the call.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::str::FromStr;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;

use crate::canonical::CanonicalBytes;
use crate::config::Config;
use crate::error::TfjsonError;
use crate::expression::{DecodeOptions, OptionsScope};
use crate::plan::Plan;
use crate::state::State;
use crate::version;

/// Decodes documents with a fixed set of [`DecodeOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentDecoder {
    options: DecodeOptions,
}

impl DocumentDecoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> DecodeOptions {
        self.options
    }

    /// Decode any document type without gating it.
    pub fn decode<D: DeserializeOwned>(&self, bytes: &[u8]) -> Result<D, TfjsonError> {
        let _scope = OptionsScope::enter(self.options);
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Decode any document type from a reader without gating it.
    pub fn decode_reader<D: DeserializeOwned, R: Read>(&self, reader: R) -> Result<D, TfjsonError> {
        let _scope = OptionsScope::enter(self.options);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Decode a plan and run the format-version gate on it.
    pub fn decode_plan(&self, bytes: &[u8]) -> Result<Plan, TfjsonError> {
        let plan: Plan = self.decode(bytes)?;
        version::validate(Some(&plan))?;
        tracing::debug!(
            resource_changes = plan.resource_changes.len(),
            output_changes = plan.output_changes.len(),
            "decoded plan"
        );
        Ok(plan)
    }

    /// Decode a state document and run the format-version gate on it.
    pub fn decode_state(&self, bytes: &[u8]) -> Result<State, TfjsonError> {
        let state: State = self.decode(bytes)?;
        version::validate(Some(&state))?;
        Ok(state)
    }

    /// Decode a configuration document. Configurations carry no version
    /// tag, so only the presence check applies.
    pub fn decode_config(&self, bytes: &[u8]) -> Result<Config, TfjsonError> {
        let config: Option<Config> = self.decode(bytes)?;
        version::validate_config(config.as_ref())?;
        Ok(config.unwrap_or_default())
    }

    /// Decode and gate a document of the given kind.
    pub fn decode_kind(&self, kind: DocumentKind, bytes: &[u8]) -> Result<Document, TfjsonError> {
        Ok(match kind {
            DocumentKind::Plan => Document::Plan(self.decode_plan(bytes)?),
            DocumentKind::State => Document::State(self.decode_state(bytes)?),
            DocumentKind::Config => Document::Config(self.decode_config(bytes)?),
        })
    }
}

/// Decode and gate a plan with default options.
pub fn decode_plan(bytes: &[u8]) -> Result<Plan, TfjsonError> {
    DocumentDecoder::default().decode_plan(bytes)
}

/// Decode and gate a state document with default options.
pub fn decode_state(bytes: &[u8]) -> Result<State, TfjsonError> {
    DocumentDecoder::default().decode_state(bytes)
}

/// Decode and gate a configuration document with default options.
pub fn decode_config(bytes: &[u8]) -> Result<Config, TfjsonError> {
    DocumentDecoder::default().decode_config(bytes)
}

/// Encode any document as compact JSON. Output is deterministic: every
/// map in the model is key-ordered.
pub fn to_vec<T: Serialize>(doc: &T) -> Result<Vec<u8>, TfjsonError> {
    Ok(serde_json::to_vec(doc)?)
}

/// Encode any document as indented JSON.
pub fn to_vec_pretty<T: Serialize>(doc: &T) -> Result<Vec<u8>, TfjsonError> {
    Ok(serde_json::to_vec_pretty(doc)?)
}

/// Encode any document in JCS canonical form.
pub fn to_canonical<T: Serialize>(doc: &T) -> Result<CanonicalBytes, TfjsonError> {
    Ok(CanonicalBytes::new(doc)?)
}

const PLAN_ONLY_KEYS: [&str; 5] = [
    "resource_changes",
    "planned_values",
    "output_changes",
    "prior_state",
    "configuration",
];

/// The top-level document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Plan,
    State,
    Config,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::State => "state",
            Self::Config => "config",
        }
    }

    /// Guess the kind from the top-level keys.
    ///
    /// Plan-only keys win over `format_version`; a bare `values` key means
    /// state; `root_module` or `provider_config` means configuration.
    /// Returns `None` when nothing identifies the document.
    pub fn detect(bytes: &[u8]) -> Result<Option<Self>, TfjsonError> {
        let keys: BTreeMap<String, IgnoredAny> = serde_json::from_slice(bytes)?;
        let has = |k: &str| keys.contains_key(k);

        let kind = if PLAN_ONLY_KEYS.iter().any(|&k| has(k)) {
            Some(Self::Plan)
        } else if has("values") {
            Some(Self::State)
        } else if has("root_module") || has("provider_config") {
            Some(Self::Config)
        } else {
            None
        };
        Ok(kind)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plan" => Ok(Self::Plan),
            "state" => Ok(Self::State),
            "config" | "configuration" => Ok(Self::Config),
            other => Err(format!("unknown document kind: {other}")),
        }
    }
}

/// A decoded document of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Document {
    Plan(Plan),
    State(State),
    Config(Config),
}

impl Document {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Plan(_) => DocumentKind::Plan,
            Self::State(_) => DocumentKind::State,
            Self::Config(_) => DocumentKind::Config,
        }
    }
}
