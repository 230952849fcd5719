//! # Expression Decoder: Configuration Field Values
//!
//! An [`Expression`] is the decoded form of one configuration field as the
//! producer wrote it into the `expressions` maps of a configuration
//! document. The same JSON position can hold three unrelated shapes:
//!
//! ```text
//! {"constant_value": "t3.micro"}                 constant
//! {"references": ["var.instance_type"]}           unresolved references
//! [{"from_port": {...}, "to_port": {...}}, ...]   nested block list
//! ```
//!
//! ## Dispatch Rule
//!
//! Classification is structural and looks only at the first JSON token:
//!
//! 1. `[`: a nested block list. Every element must be an object, and every
//!    member of every element is decoded recursively with the same rule.
//! 2. `{`: a leaf expression with optional `constant_value` and
//!    `references` members.
//! 3. Anything else is rejected.
//!
//! Field names are never inspected. The producer always wraps literal
//! values in `{"constant_value": ...}`, so a bare array at an expression
//! position is always a block list, even when a provider schema would have
//! read it as a list-valued constant. The format itself is ambiguous here;
//! the block-list reading wins.
//!
//! ## Invariants
//!
//! - The variants of [`Expression`] are mutually exclusive by construction.
//!   An object carrying both `constant_value` and non-empty `references`
//!   is rejected rather than silently dropping one.
//! - `Unresolved` always holds at least one reference ([`References`] has
//!   no empty constructor), so encoding never emits `"references":[]`.
//! - `decode(encode(e)) == e` for every decodable `e`.
//! - Block-list recursion is bounded by [`DecodeOptions::max_depth`].

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::ExpressionError;
use crate::value::Value;

/// Default limit on nested block-list levels.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Tunables for expression decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum number of nested block-list levels. `0` rejects every
    /// block list.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

thread_local! {
    // Options seen by `Deserialize` impls, which have no other channel for
    // caller configuration. Set for the duration of a document decode.
    static AMBIENT_OPTIONS: Cell<DecodeOptions> = const {
        Cell::new(DecodeOptions { max_depth: DEFAULT_MAX_DEPTH })
    };
}

/// Installs decode options for serde-driven decoding on this thread and
/// restores the previous options on drop.
pub(crate) struct OptionsScope {
    previous: DecodeOptions,
}

impl OptionsScope {
    pub(crate) fn enter(options: DecodeOptions) -> Self {
        let previous = AMBIENT_OPTIONS.with(|cell| cell.replace(options));
        Self { previous }
    }
}

impl Drop for OptionsScope {
    fn drop(&mut self) {
        AMBIENT_OPTIONS.with(|cell| cell.set(self.previous));
    }
}

/// One nested block: field name to expression.
pub type Block = BTreeMap<String, Expression>;

/// A non-empty, ordered list of reference identifiers such as
/// `var.region` or `aws_vpc.main.id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct References(Vec<String>);

impl References {
    /// Returns `None` when `refs` is empty.
    pub fn new(refs: Vec<String>) -> Option<Self> {
        if refs.is_empty() {
            None
        } else {
            Some(Self(refs))
        }
    }

    /// The identifiers in source order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of identifiers. Always at least one.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the identifiers.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl<'a> IntoIterator for &'a References {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The decoded value of one configuration field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Expression {
    /// Neither a constant nor references were recorded. The value is
    /// fully unknown at parse time.
    #[default]
    Unknown,
    /// The whole expression is a known constant.
    Constant(Value),
    /// The value depends on other configuration entities.
    Unresolved(References),
    /// Repeated nested configuration blocks, in source order.
    NestedBlocks(Vec<Block>),
}

/// Discriminant of an [`Expression`], for diagnostics and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    /// [`Expression::Unknown`].
    Unknown,
    /// [`Expression::Constant`].
    Constant,
    /// [`Expression::Unresolved`].
    Unresolved,
    /// [`Expression::NestedBlocks`].
    NestedBlocks,
}

impl ExpressionKind {
    /// Returns the kind's name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Constant => "constant",
            Self::Unresolved => "unresolved",
            Self::NestedBlocks => "nested_blocks",
        }
    }
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Expression {
    /// A constant expression.
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::Constant(value.into())
    }

    /// An unresolved expression, or `Unknown` when `refs` is empty (the
    /// same reading the decoder gives `"references": []`).
    pub fn unresolved<I, S>(refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        References::new(refs.into_iter().map(Into::into).collect())
            .map_or(Self::Unknown, Self::Unresolved)
    }

    /// Which shape this expression has.
    pub fn kind(&self) -> ExpressionKind {
        match self {
            Self::Unknown => ExpressionKind::Unknown,
            Self::Constant(_) => ExpressionKind::Constant,
            Self::Unresolved(_) => ExpressionKind::Unresolved,
            Self::NestedBlocks(_) => ExpressionKind::NestedBlocks,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::Unresolved(_))
    }

    pub fn is_nested_blocks(&self) -> bool {
        matches!(self, Self::NestedBlocks(_))
    }

    /// The constant value, if this is a constant.
    pub fn constant_value(&self) -> Option<&Value> {
        match self {
            Self::Constant(v) => Some(v),
            _ => None,
        }
    }

    /// The reference identifiers of this expression. Empty unless this is
    /// `Unresolved`; nested blocks are not searched.
    pub fn references(&self) -> &[String] {
        match self {
            Self::Unresolved(refs) => refs.as_slice(),
            _ => &[],
        }
    }

    /// The nested blocks. Empty unless this is `NestedBlocks`.
    pub fn nested_blocks(&self) -> &[Block] {
        match self {
            Self::NestedBlocks(blocks) => blocks,
            _ => &[],
        }
    }

    /// Every reference in this expression and all nested blocks, in
    /// document order (blocks in order, fields by name).
    pub fn references_recursive(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Unresolved(refs) => out.extend(refs.iter().map(String::as_str)),
            Self::NestedBlocks(blocks) => {
                for expr in blocks.iter().flat_map(BTreeMap::values) {
                    expr.collect_references(out);
                }
            }
            Self::Unknown | Self::Constant(_) => {}
        }
    }
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::NestedBlocks(blocks) => serializer.collect_seq(blocks),
            Self::Constant(value) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("constant_value", value)?;
                map.end()
            }
            Self::Unresolved(refs) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("references", refs)?;
                map.end()
            }
            Self::Unknown => serializer.serialize_map(Some(0))?.end(),
        }
    }
}

impl<'de> Deserialize<'de> for Expression {
    /// Decodes from `serde_json` text only: the dispatch needs the raw
    /// token stream, which other deserializers do not expose.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        ExpressionDecoder::ambient()
            .decode_raw(&raw, &mut FieldPath::default(), 0)
            .map_err(de::Error::custom)
    }
}

/// A map of field name to expression, as found under `expressions` keys.
///
/// Decoding records each field name in the error path, so a failure deep
/// inside a block list reads as `ingress[2].cidr_blocks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Expressions(Block);

impl Expressions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes self and returns the inner map.
    pub fn into_inner(self) -> Block {
        self.0
    }

    /// Every reference across all fields, fields visited by name.
    pub fn references_recursive(&self) -> Vec<&str> {
        self.0
            .values()
            .flat_map(Expression::references_recursive)
            .collect()
    }
}

impl Deref for Expressions {
    type Target = Block;

    fn deref(&self) -> &Block {
        &self.0
    }
}

impl From<Block> for Expressions {
    fn from(block: Block) -> Self {
        Self(block)
    }
}

impl FromIterator<(String, Expression)> for Expressions {
    fn from_iter<I: IntoIterator<Item = (String, Expression)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Expressions {
    type Item = (&'a String, &'a Expression);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Expression>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for Expressions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ExpressionsVisitor)
    }
}

struct ExpressionsVisitor;

impl<'de> Visitor<'de> for ExpressionsVisitor {
    type Value = Expressions;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of field names to expressions")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Expressions, A::Error> {
        let decoder = ExpressionDecoder::ambient();
        let mut block = Block::new();
        while let Some(key) = access.next_key::<String>()? {
            let raw = access.next_value::<Box<RawValue>>()?;
            let mut path = FieldPath::default();
            path.push_key(key);
            let expr = decoder
                .decode_raw(&raw, &mut path, 0)
                .map_err(de::Error::custom)?;
            block.insert(path.pop_key(), expr);
        }
        Ok(Expressions(block))
    }
}

/// Decodes raw field JSON into [`Expression`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressionDecoder {
    options: DecodeOptions,
}

impl ExpressionDecoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    /// A decoder using the options installed for the current document
    /// decode, or the defaults.
    pub(crate) fn ambient() -> Self {
        Self::new(AMBIENT_OPTIONS.with(Cell::get))
    }

    pub fn options(&self) -> DecodeOptions {
        self.options
    }

    /// Decode the raw JSON of the field named `field`.
    ///
    /// # Errors
    ///
    /// - [`ExpressionError::Decode`] if the bytes are not valid JSON of the
    ///   announced shape.
    /// - [`ExpressionError::UnsupportedShape`] for scalars, non-object
    ///   block elements, or conflicting payloads.
    /// - [`ExpressionError::UnboundedNesting`] past the depth limit.
    pub fn decode(&self, field: &str, raw: &[u8]) -> Result<Expression, ExpressionError> {
        let mut path = FieldPath::default();
        path.push_key(field.to_owned());
        let raw: &RawValue = serde_json::from_slice(raw).map_err(|source| {
            ExpressionError::Decode {
                path: path.to_string(),
                source,
            }
        })?;
        self.decode_raw(raw, &mut path, 0)
    }

    /// [`decode`](Self::decode) for text input.
    pub fn decode_str(&self, field: &str, raw: &str) -> Result<Expression, ExpressionError> {
        self.decode(field, raw.as_bytes())
    }

    fn decode_raw(
        &self,
        raw: &RawValue,
        path: &mut FieldPath,
        depth: usize,
    ) -> Result<Expression, ExpressionError> {
        match leading_token(raw.get()) {
            Some(b'[') => self.decode_blocks(raw, path, depth),
            Some(b'{') => decode_leaf(raw, path),
            other => Err(ExpressionError::UnsupportedShape {
                path: path.to_string(),
                reason: format!(
                    "expected an object or an array of objects, found {}",
                    token_name(other)
                ),
            }),
        }
    }

    fn decode_blocks(
        &self,
        raw: &RawValue,
        path: &mut FieldPath,
        depth: usize,
    ) -> Result<Expression, ExpressionError> {
        if depth >= self.options.max_depth {
            return Err(ExpressionError::UnboundedNesting {
                path: path.to_string(),
                limit: self.options.max_depth,
            });
        }

        let elements: Vec<&RawValue> =
            serde_json::from_str(raw.get()).map_err(|source| ExpressionError::Decode {
                path: path.to_string(),
                source,
            })?;

        let mut blocks = Vec::with_capacity(elements.len());
        for (index, element) in elements.into_iter().enumerate() {
            path.push_index(index);
            let token = leading_token(element.get());
            if token != Some(b'{') {
                return Err(ExpressionError::UnsupportedShape {
                    path: path.to_string(),
                    reason: format!("block list element is {}, not an object", token_name(token)),
                });
            }

            let members: BTreeMap<String, &RawValue> = serde_json::from_str(element.get())
                .map_err(|source| ExpressionError::Decode {
                    path: path.to_string(),
                    source,
                })?;

            let mut block = Block::new();
            for (key, member) in members {
                path.push_key(key);
                let expr = self.decode_raw(member, path, depth + 1)?;
                block.insert(path.pop_key(), expr);
            }
            path.pop();
            blocks.push(block);
        }

        tracing::trace!(path = %path, blocks = blocks.len(), depth, "decoded nested block list");
        Ok(Expression::NestedBlocks(blocks))
    }
}

/// Wire shape of a leaf expression.
#[derive(Deserialize)]
struct LeafBody {
    #[serde(default, deserialize_with = "present")]
    constant_value: Option<Value>,
    #[serde(default)]
    references: Option<Vec<String>>,
}

/// Maps a present member to `Some`, including an explicit `null`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

fn decode_leaf(raw: &RawValue, path: &FieldPath) -> Result<Expression, ExpressionError> {
    let body: LeafBody =
        serde_json::from_str(raw.get()).map_err(|source| ExpressionError::Decode {
            path: path.to_string(),
            source,
        })?;

    let refs = References::new(body.references.unwrap_or_default());
    match (body.constant_value, refs) {
        (Some(_), Some(_)) => Err(ExpressionError::UnsupportedShape {
            path: path.to_string(),
            reason: "both constant_value and references are set".into(),
        }),
        (Some(value), None) => Ok(Expression::Constant(value)),
        (None, Some(refs)) => Ok(Expression::Unresolved(refs)),
        (None, None) => Ok(Expression::Unknown),
    }
}

fn leading_token(raw: &str) -> Option<u8> {
    raw.trim_start().bytes().next()
}

fn token_name(token: Option<u8>) -> &'static str {
    match token {
        None => "nothing",
        Some(b'{') => "an object",
        Some(b'[') => "an array",
        Some(b'"') => "a string",
        Some(b't' | b'f') => "a boolean",
        Some(b'n') => "null",
        Some(_) => "a number",
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Location of an expression within its field, for error messages.
#[derive(Debug, Clone, Default)]
struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    fn push_key(&mut self, key: String) {
        self.segments.push(Segment::Key(key));
    }

    fn push_index(&mut self, index: usize) {
        self.segments.push(Segment::Index(index));
    }

    fn pop(&mut self) {
        self.segments.pop();
    }

    /// Pops the last segment, which must be a key, and hands it back.
    fn pop_key(&mut self) -> String {
        match self.segments.pop() {
            Some(Segment::Key(key)) => key,
            Some(Segment::Index(index)) => index.to_string(),
            None => String::new(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => f.write_str(key)?,
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
