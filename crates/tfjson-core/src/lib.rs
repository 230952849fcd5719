//! # tfjson-core: Typed Plan, Configuration, and State Documents
//!
//! This crate decodes the JSON documents an infrastructure-as-code tool
//! writes for plans, configurations, and state into strongly-typed trees,
//! and encodes them back deterministically.
//!
//! ## Key Design Principles
//!
//! 1. **Expressions are a sum type.** A configuration field is exactly one
//!    of constant, unresolved references, nested block list, or unknown.
//!    The decoder picks the shape from the first JSON token, never from
//!    the field name, and recurses through nested blocks with a depth
//!    limit.
//!
//! 2. **Values are never untyped blobs.** Schema-less fields (attribute
//!    values, defaults, outputs) decode into [`Value`], whose ordered maps
//!    give order-independent equality and deterministic encoding.
//!
//! 3. **Configuration and state stay separate.** Configuration fields go
//!    through the expression decoder; state attribute values go through
//!    the plain value model. Similar-looking JSON, different meaning.
//!
//! 4. **Gate before use.** [`version::validate`] checks the
//!    `format_version` tag by exact string match. The `document` entry
//!    points run it on every plan and state they decode.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - No I/O inside the decoder; callers supply bytes or a reader.
//! - Decoding is all-or-nothing and returns the first error found.

pub mod canonical;
pub mod config;
pub mod document;
pub mod error;
pub mod expression;
pub mod plan;
pub mod resource;
pub mod state;
pub mod value;
pub mod version;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use config::{
    Config, ConfigModule, ConfigOutput, ConfigProvisioner, ConfigResource, ConfigVariable,
    ModuleCall, ProviderConfig,
};
pub use document::{
    decode_config, decode_plan, decode_state, Document, DocumentDecoder, DocumentKind,
};
pub use error::{CanonicalizationError, ExpressionError, GateError, TfjsonError};
pub use expression::{
    Block, DecodeOptions, Expression, ExpressionDecoder, ExpressionKind, Expressions, References,
    DEFAULT_MAX_DEPTH,
};
pub use plan::{Action, Actions, Change, ChangeKind, Plan, PlanVariable, ResourceChange};
pub use resource::{ResourceIndex, ResourceMode};
pub use state::{Module, Resource, State, StateOutput, StateValues};
pub use value::Value;
pub use version::{Versioned, PLAN_FORMAT_VERSION, STATE_FORMAT_VERSION};
