//! # Plan Document
//!
//! The full output of a plan operation: input variables, the prior and
//! planned state, per-resource and per-output change records, and the
//! configuration that produced it.
//!
//! ## Identity Duplication
//!
//! A [`ResourceChange`] does not own or embed a [`Resource`]. It restates
//! the resource's identity fields (`address`, `mode`, `type`, `name`,
//! `index`, `provider_name`) inline. The producer is responsible for
//! keeping those consistent with the matching entries in `prior_state`
//! and `planned_values`; this crate never reconciles them.
//!
//! [`Resource`]: crate::state::Resource

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::resource::{ResourceIndex, ResourceMode};
use crate::state::StateValues;
use crate::value::Value;
use crate::version::{Versioned, PLAN_FORMAT_VERSION};

/// The entire contents of a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Should always equal [`PLAN_FORMAT_VERSION`]; check with
    /// [`crate::version::validate`] before trusting anything else.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format_version: String,

    /// Version of the tool that produced the plan.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub terraform_version: String,

    /// Root module input variables, by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, PlanVariable>,

    /// The prior state merged with this plan's changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_values: Option<StateValues>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_changes: Vec<ResourceChange>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub output_changes: BTreeMap<String, Change>,

    /// State before the plan, in the same shape as `planned_values`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_state: Option<StateValues>,

    /// The configuration the plan was made from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Config>,
}

impl Versioned for Plan {
    const FORMAT_VERSION: &'static str = PLAN_FORMAT_VERSION;
    const KIND: &'static str = "plan";

    fn format_version(&self) -> &str {
        &self.format_version
    }
}

impl Plan {
    /// Resource changes matching `pred`, in document order.
    pub fn resource_changes_where<F>(&self, mut pred: F) -> Vec<&ResourceChange>
    where
        F: FnMut(&ResourceChange) -> bool,
    {
        self.resource_changes.iter().filter(|rc| pred(rc)).collect()
    }

    /// Look up the change for an absolute address.
    pub fn resource_change(&self, address: &str) -> Option<&ResourceChange> {
        self.resource_changes.iter().find(|rc| rc.address == address)
    }

    /// Counts of resource changes per [`ChangeKind`].
    pub fn change_counts(&self) -> BTreeMap<ChangeKind, usize> {
        let mut counts = BTreeMap::new();
        for rc in &self.resource_changes {
            *counts.entry(rc.change.actions.kind()).or_insert(0) += 1;
        }
        counts
    }
}

/// A root module input variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanVariable {
    #[serde(default)]
    pub value: Value,
}

/// One planned change to a resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceChange {
    /// Absolute resource address.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,

    /// Module portion of `address`; empty in the root module.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub module_address: String,

    pub mode: ResourceMode,

    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<ResourceIndex>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub provider_name: String,

    /// The change applies to a deposed object of this instance rather
    /// than its current object.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deposed: bool,

    #[serde(default)]
    pub change: Change,
}

/// A proposed change to an object (a resource instance or an output).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    #[serde(default, skip_serializing_if = "Actions::is_empty")]
    pub actions: Actions,

    /// Object value before the action; absent for creates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,

    /// Object value after the action; absent for deletes. Incomplete when
    /// parts are only known after apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,

    /// A deep object of booleans marking values unknown until apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_unknown: Option<Value>,
}

impl Change {
    /// Whether the attribute `name` of the after value is unknown until
    /// apply (a top-level `true` in `after_unknown`).
    pub fn is_after_unknown(&self, name: &str) -> bool {
        self.after_unknown
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// A single change action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[serde(rename = "no-op")]
    NoOp,
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoOp => "no-op",
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ordered actions of a change. A replacement is two actions:
/// `["delete", "create"]` or `["create", "delete"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actions(pub Vec<Action>);

impl Actions {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Action] {
        &self.0
    }

    fn is_only(&self, action: Action) -> bool {
        self.0 == [action]
    }

    pub fn is_no_op(&self) -> bool {
        self.is_only(Action::NoOp)
    }

    pub fn is_create(&self) -> bool {
        self.is_only(Action::Create)
    }

    pub fn is_read(&self) -> bool {
        self.is_only(Action::Read)
    }

    pub fn is_update(&self) -> bool {
        self.is_only(Action::Update)
    }

    pub fn is_delete(&self) -> bool {
        self.is_only(Action::Delete)
    }

    /// Delete-then-create or create-then-delete.
    pub fn is_replace(&self) -> bool {
        self.0 == [Action::Delete, Action::Create] || self.0 == [Action::Create, Action::Delete]
    }

    /// Collapse the action list into one summary kind.
    pub fn kind(&self) -> ChangeKind {
        if self.is_replace() {
            ChangeKind::Replace
        } else if self.is_create() {
            ChangeKind::Create
        } else if self.is_read() {
            ChangeKind::Read
        } else if self.is_update() {
            ChangeKind::Update
        } else if self.is_delete() {
            ChangeKind::Delete
        } else if self.is_no_op() {
            ChangeKind::NoOp
        } else {
            ChangeKind::Other
        }
    }
}

impl From<Vec<Action>> for Actions {
    fn from(actions: Vec<Action>) -> Self {
        Self(actions)
    }
}

/// Summary classification of an [`Actions`] list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    NoOp,
    Create,
    Read,
    Update,
    Replace,
    Delete,
    /// Empty or unrecognised combinations.
    Other,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoOp => "no_op",
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Delete => "delete",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions(list: &[Action]) -> Actions {
        Actions(list.to_vec())
    }

    #[test]
    fn test_action_wire_names() {
        let parsed: Actions =
            serde_json::from_str(r#"["no-op","create","read","update","delete"]"#).unwrap();
        assert_eq!(
            parsed.as_slice(),
            [Action::NoOp, Action::Create, Action::Read, Action::Update, Action::Delete]
        );
        assert!(serde_json::from_str::<Actions>(r#"["destroy"]"#).is_err());
    }

    #[test]
    fn test_action_predicates() {
        assert!(actions(&[Action::Create]).is_create());
        assert!(actions(&[Action::NoOp]).is_no_op());
        assert!(actions(&[Action::Delete, Action::Create]).is_replace());
        assert!(actions(&[Action::Create, Action::Delete]).is_replace());
        assert!(!actions(&[Action::Delete, Action::Create]).is_delete());
        assert!(!actions(&[Action::Create, Action::Create]).is_replace());
    }

    #[test]
    fn test_change_kind() {
        assert_eq!(actions(&[Action::Update]).kind(), ChangeKind::Update);
        assert_eq!(actions(&[Action::Create, Action::Delete]).kind(), ChangeKind::Replace);
        assert_eq!(actions(&[]).kind(), ChangeKind::Other);
    }

    #[test]
    fn test_resource_change_restates_identity() {
        let raw = r#"{
            "address": "module.net.aws_subnet.this[1]",
            "module_address": "module.net",
            "mode": "resource",
            "type": "aws_subnet",
            "name": "this",
            "index": 1,
            "provider_name": "aws",
            "deposed": true,
            "change": {
                "actions": ["delete"],
                "before": {"cidr_block": "10.0.1.0/24"},
                "after": null
            }
        }"#;
        let rc: ResourceChange = serde_json::from_str(raw).unwrap();
        assert_eq!(rc.index, Some(ResourceIndex::Int(1)));
        assert!(rc.deposed);
        assert!(rc.change.actions.is_delete());
        assert!(rc.change.after.is_none());
        assert_eq!(
            rc.change.before.as_ref().and_then(|b| b.get("cidr_block")).and_then(Value::as_str),
            Some("10.0.1.0/24")
        );
    }

    #[test]
    fn test_after_unknown() {
        let change: Change = serde_json::from_str(
            r#"{"actions":["create"],"after":{"ami":"ami-1"},"after_unknown":{"id":true,"arn":false}}"#,
        )
        .unwrap();
        assert!(change.is_after_unknown("id"));
        assert!(!change.is_after_unknown("arn"));
        assert!(!change.is_after_unknown("ami"));
    }

    #[test]
    fn test_plan_queries() {
        let raw = r#"{
            "format_version": "0.1",
            "resource_changes": [
                {"address": "a.one", "mode": "resource", "type": "a", "name": "one", "change": {"actions": ["create"]}},
                {"address": "a.two", "mode": "resource", "type": "a", "name": "two", "change": {"actions": ["delete", "create"]}},
                {"address": "a.three", "mode": "resource", "type": "a", "name": "three", "change": {"actions": ["create"]}},
                {"address": "data.b.x", "mode": "data", "type": "b", "name": "x", "change": {"actions": ["read"]}}
            ]
        }"#;
        let plan: Plan = serde_json::from_str(raw).unwrap();
        let creates = plan.resource_changes_where(|rc| rc.change.actions.is_create());
        assert_eq!(creates.len(), 2);
        assert_eq!(plan.resource_change("a.two").map(|rc| rc.name.as_str()), Some("two"));

        let counts = plan.change_counts();
        assert_eq!(counts.get(&ChangeKind::Create), Some(&2));
        assert_eq!(counts.get(&ChangeKind::Replace), Some(&1));
        assert_eq!(counts.get(&ChangeKind::Read), Some(&1));
        assert_eq!(counts.get(&ChangeKind::Delete), None);
    }

    #[test]
    fn test_variables_hold_values() {
        let plan: Plan = serde_json::from_str(
            r#"{"format_version":"0.1","variables":{"zones":{"value":["a","b"]},"unset":{}}}"#,
        )
        .unwrap();
        assert_eq!(
            plan.variables["zones"].value.as_array().map(<[Value]>::len),
            Some(2)
        );
        assert!(plan.variables["unset"].value.is_null());
    }
}
