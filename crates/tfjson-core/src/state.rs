//! # State Values
//!
//! The common representation of resolved resource values, shared by a
//! plan's `prior_state` and `planned_values` and by the standalone state
//! document.
//!
//! Attribute values here are concrete snapshots decoded through the plain
//! [`Value`] model. They never go through the expression decoder, even
//! when an attribute holds an array of objects: a `Resource`'s `ingress`
//! attribute is data, a `ConfigResource`'s `ingress` expression is a block
//! list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::resource::{ResourceIndex, ResourceMode};
use crate::value::Value;
use crate::version::{Versioned, STATE_FORMAT_VERSION};

/// A standalone state document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Should always equal [`STATE_FORMAT_VERSION`]; check with
    /// [`crate::version::validate`].
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format_version: String,

    /// Version of the tool that wrote the state.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub terraform_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<StateValues>,
}

impl Versioned for State {
    const FORMAT_VERSION: &'static str = STATE_FORMAT_VERSION;
    const KIND: &'static str = "state";

    fn format_version(&self) -> &str {
        &self.format_version
    }
}

/// Resolved values for a whole configuration: outputs plus the module
/// tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateValues {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, StateOutput>,

    #[serde(default)]
    pub root_module: Module,
}

impl StateValues {
    /// Every resource in the module tree, depth-first.
    pub fn all_resources(&self) -> Vec<&Resource> {
        self.root_module.all_resources()
    }

    /// Find a resource by absolute address anywhere in the tree.
    pub fn find_resource(&self, address: &str) -> Option<&Resource> {
        self.all_resources().into_iter().find(|r| r.address == address)
    }
}

/// An output value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateOutput {
    #[serde(default)]
    pub sensitive: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// A module in the state representation: the root module or a child.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Absolute module address; empty for the root module.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_modules: Vec<Module>,
}

impl Module {
    pub fn is_root(&self) -> bool {
        self.address.is_empty()
    }

    /// This module's resources followed by those of its children,
    /// depth-first.
    pub fn all_resources(&self) -> Vec<&Resource> {
        let mut out = Vec::new();
        self.collect_resources(&mut out);
        out
    }

    fn collect_resources<'a>(&'a self, out: &mut Vec<&'a Resource>) {
        out.extend(self.resources.iter());
        for child in &self.child_modules {
            child.collect_resources(out);
        }
    }
}

/// A resource instance in the state representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Absolute resource address, e.g. `module.net.aws_subnet.this[0]`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,

    pub mode: ResourceMode,

    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Instance key for `count`/`for_each` resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<ResourceIndex>,

    /// Provider that owns the resource type. Disambiguates cases such as
    /// `google-beta` offering `google_compute_instance`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub provider_name: String,

    /// Version of the resource type schema `values` conforms to.
    #[serde(default)]
    pub schema_version: u64,

    /// Attribute values. Unknown values are omitted or null.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, Value>,
}
