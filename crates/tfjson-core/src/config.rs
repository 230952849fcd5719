//! # Configuration Document
//!
//! The parsed source configuration that produced a plan: provider
//! configurations, and a tree of modules holding resources, outputs,
//! variables, and calls to child modules.
//!
//! Every configurable field is an [`Expression`]; only variable defaults
//! are plain [`Value`]s, since they are literal by definition.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::expression::{Expression, Expressions};
use crate::resource::ResourceMode;
use crate::value::Value;

/// The complete configuration source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// All provider instances across all modules, keyed as `NAME` or
    /// `NAME.ALIAS`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub provider_config: BTreeMap<String, ProviderConfig>,

    /// The root module. Child modules hang off its module calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_module: Option<ConfigModule>,
}

impl Config {
    /// Every resource in the module tree with the chain of module call
    /// names that leads to it (empty for the root module).
    pub fn all_resources(&self) -> Vec<(Vec<&str>, &ConfigResource)> {
        let mut out = Vec::new();
        if let Some(root) = &self.root_module {
            root.collect_resources(&mut Vec::new(), &mut out);
        }
        out
    }
}

/// A provider configuration instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name, e.g. `aws`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Provider alias, e.g. `us-east-1`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alias: String,

    /// Address of the module the provider is declared in.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub module_address: String,

    /// Non-special configuration values, by key.
    #[serde(default, skip_serializing_if = "Expressions::is_empty")]
    pub expressions: Expressions,
}

/// A module in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigModule {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, ConfigOutput>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ConfigResource>,

    /// `module` blocks within this module, by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub module_calls: BTreeMap<String, ModuleCall>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, ConfigVariable>,
}

impl ConfigModule {
    /// Visit this module's calls depth-first, parents before children.
    /// The callback receives the chain of call names from this module.
    pub fn walk_module_calls<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&[&'a str], &'a ModuleCall),
    {
        self.walk_calls_from(&mut Vec::new(), f);
    }

    fn walk_calls_from<'a, F>(&'a self, chain: &mut Vec<&'a str>, f: &mut F)
    where
        F: FnMut(&[&'a str], &'a ModuleCall),
    {
        for (name, call) in &self.module_calls {
            chain.push(name);
            f(chain, call);
            if let Some(module) = &call.module {
                module.walk_calls_from(chain, f);
            }
            chain.pop();
        }
    }

    fn collect_resources<'a>(
        &'a self,
        chain: &mut Vec<&'a str>,
        out: &mut Vec<(Vec<&'a str>, &'a ConfigResource)>,
    ) {
        out.extend(self.resources.iter().map(|r| (chain.clone(), r)));
        for (name, call) in &self.module_calls {
            if let Some(module) = &call.module {
                chain.push(name);
                module.collect_resources(chain, out);
                chain.pop();
            }
        }
    }
}

/// An output as declared in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigOutput {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,

    /// The declared value of the output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<Expression>,
}

/// The configuration of one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigResource {
    /// Address relative to the containing module, e.g. `aws_instance.web`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,

    pub mode: ResourceMode,

    /// Resource type, e.g. `aws_instance`.
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub resource_type: String,

    /// Resource name, e.g. `web`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Key into [`Config::provider_config`].
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub provider_config_key: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provisioners: Vec<ConfigProvisioner>,

    /// Non-special configuration values, by key. Nested blocks such as
    /// `ingress` rules appear here as block-list expressions.
    #[serde(default, skip_serializing_if = "Expressions::is_empty")]
    pub expressions: Expressions,

    /// Schema version the expressions were written against.
    #[serde(default)]
    pub schema_version: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_expression: Option<Expression>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_each_expression: Option<Expression>,
}

impl ConfigResource {
    /// Every reference the resource's configuration depends on,
    /// including `count` and `for_each`.
    pub fn references(&self) -> Vec<&str> {
        let mut refs = self.expressions.references_recursive();
        for expr in [&self.count_expression, &self.for_each_expression]
            .into_iter()
            .flatten()
        {
            refs.extend(expr.references_recursive());
        }
        refs
    }
}

/// A variable as declared in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigVariable {
    /// The declared default. `None` means no default; an explicit `null`
    /// default is also read as `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// A provisioner declared in a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigProvisioner {
    /// Provisioner type, e.g. `local-exec`.
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub provisioner_type: String,

    #[serde(default, skip_serializing_if = "Expressions::is_empty")]
    pub expressions: Expressions,
}

/// A `module` block, together with the configuration of the called
/// module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleCall {
    /// The resolved contents of `source`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resolved_source: String,

    /// Input variables passed to the module.
    #[serde(default, skip_serializing_if = "Expressions::is_empty")]
    pub expressions: Expressions,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_expression: Option<Expression>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_each_expression: Option<Expression>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<ConfigModule>,
}
