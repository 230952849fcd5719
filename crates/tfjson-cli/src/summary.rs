//! # Summary Subcommand
//!
//! Decodes and gates a plan, then reports how many resource changes fall
//! into each action kind and which references every configured resource
//! still depends on.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use tfjson_core::{ChangeKind, Plan};

use crate::GlobalOptions;

/// Arguments for the `tfjson summary` subcommand.
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Plan to summarize.
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Condensed view of a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub terraform_version: String,
    pub changes: BTreeMap<ChangeKind, usize>,
    /// Module-qualified resource address to its sorted, deduplicated
    /// references. Resources without references are left out.
    pub references: BTreeMap<String, Vec<String>>,
}

impl PlanSummary {
    pub fn from_plan(plan: &Plan) -> Self {
        let mut references = BTreeMap::new();
        if let Some(config) = &plan.configuration {
            for (chain, resource) in config.all_resources() {
                let mut refs: Vec<String> =
                    resource.references().into_iter().map(str::to_owned).collect();
                if refs.is_empty() {
                    continue;
                }
                refs.sort();
                refs.dedup();
                references.insert(qualified_address(&chain, &resource.address), refs);
            }
        }
        Self {
            terraform_version: plan.terraform_version.clone(),
            changes: plan.change_counts(),
            references,
        }
    }

    /// Plain-text rendering.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.terraform_version.is_empty() {
            out.push_str(&format!("Terraform version: {}\n", self.terraform_version));
        }
        let total: usize = self.changes.values().sum();
        out.push_str(&format!("Resource changes: {total}\n"));
        for (kind, n) in &self.changes {
            out.push_str(&format!("  {kind}: {n}\n"));
        }
        if !self.references.is_empty() {
            out.push_str("Unresolved references:\n");
            for (address, refs) in &self.references {
                out.push_str(&format!("  {address}: {}\n", refs.join(", ")));
            }
        }
        out
    }
}

fn qualified_address(chain: &[&str], address: &str) -> String {
    let mut parts: Vec<String> = chain.iter().map(|name| format!("module.{name}")).collect();
    parts.push(address.to_string());
    parts.join(".")
}

/// Execute the summary subcommand.
///
/// Returns exit code: 0 on success, 1 when the plan is rejected.
pub fn run_summary(args: &SummaryArgs, opts: &GlobalOptions) -> Result<u8> {
    let bytes = crate::read_input(&args.path)?;
    let plan = match opts.decoder().decode_plan(&bytes) {
        Ok(plan) => plan,
        Err(e) => {
            println!("{}", crate::rejection_line(&args.path, &e.into()));
            return Ok(1);
        }
    };

    let summary = PlanSummary::from_plan(&plan);
    tracing::info!(
        path = %args.path.display(),
        resources = summary.references.len(),
        "summarized plan"
    );
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", summary.render());
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"{
        "format_version": "0.1",
        "terraform_version": "0.12.0",
        "resource_changes": [
            {"address": "aws_security_group.web", "mode": "resource", "type": "aws_security_group", "name": "web",
             "change": {"actions": ["create"]}},
            {"address": "module.net.aws_vpc.this", "module_address": "module.net", "mode": "resource",
             "type": "aws_vpc", "name": "this", "change": {"actions": ["delete", "create"]}},
            {"address": "null_resource.x", "mode": "resource", "type": "null_resource", "name": "x",
             "change": {"actions": ["no-op"]}}
        ],
        "configuration": {
            "root_module": {
                "resources": [
                    {"address": "aws_security_group.web", "mode": "resource", "type": "aws_security_group", "name": "web",
                     "expressions": {
                        "vpc_id": {"references": ["module.net.vpc_id"]},
                        "ingress": [
                            {"cidr_blocks": {"references": ["var.cidr"]}},
                            {"cidr_blocks": {"references": ["var.cidr"]}}
                        ]
                     }},
                    {"address": "null_resource.x", "mode": "resource", "type": "null_resource", "name": "x"}
                ],
                "module_calls": {
                    "net": {"module": {"resources": [
                        {"address": "aws_vpc.this", "mode": "resource", "type": "aws_vpc", "name": "this",
                         "count_expression": {"references": ["var.enabled"]}}
                    ]}}
                }
            }
        }
    }"#;

    #[test]
    fn summary_counts_and_references() {
        let plan = tfjson_core::decode_plan(PLAN.as_bytes()).unwrap();
        let summary = PlanSummary::from_plan(&plan);

        assert_eq!(summary.changes.get(&ChangeKind::Create), Some(&1));
        assert_eq!(summary.changes.get(&ChangeKind::Replace), Some(&1));
        assert_eq!(summary.changes.get(&ChangeKind::NoOp), Some(&1));

        assert_eq!(
            summary.references["aws_security_group.web"],
            vec!["module.net.vpc_id".to_string(), "var.cidr".to_string()]
        );
        assert_eq!(
            summary.references["module.net.aws_vpc.this"],
            vec!["var.enabled".to_string()]
        );
        assert!(!summary.references.contains_key("null_resource.x"));
    }

    #[test]
    fn summary_render() {
        let plan = tfjson_core::decode_plan(PLAN.as_bytes()).unwrap();
        let text = PlanSummary::from_plan(&plan).render();
        assert!(text.contains("Resource changes: 3\n"));
        assert!(text.contains("  replace: 1\n"));
        assert!(text.contains("  module.net.aws_vpc.this: var.enabled\n"));
    }

    #[test]
    fn summary_json_uses_snake_case_kinds() {
        let plan = tfjson_core::decode_plan(PLAN.as_bytes()).unwrap();
        let json = serde_json::to_value(PlanSummary::from_plan(&plan)).unwrap();
        assert_eq!(json["changes"]["no_op"], 1);
        assert_eq!(json["terraform_version"], "0.12.0");
    }

    #[test]
    fn run_summary_rejects_non_plan() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"values":{}}"#).unwrap();
        let args = SummaryArgs { path, json: false };
        assert_eq!(run_summary(&args, &GlobalOptions::default()).unwrap(), 1);
    }
}
