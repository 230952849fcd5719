//! # Fixture Document Tests
//!
//! Decodes realistic plan, state, and configuration documents end to end
//! and checks that decode, gate, and re-encode agree with each other.
//!
//! The fixtures under `tests/fixtures/` are hand-written in the shape the
//! producing tool emits: unordered keys, nested modules, block-list
//! expressions next to attribute arrays of objects, deposed changes.

use std::path::PathBuf;

use tfjson_core::document::{to_canonical, to_vec};
use tfjson_core::{
    decode_config, decode_plan, decode_state, ChangeKind, DecodeOptions, DocumentDecoder,
    DocumentKind, Expression, ExpressionKind, GateError, ResourceIndex, ResourceMode, TfjsonError,
    Value,
};

fn fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
}

// -- Plan --------------------------------------------------------------

#[test]
fn plan_fixture_decodes_and_passes_gate() {
    let plan = decode_plan(&fixture("plan.json")).unwrap();
    assert_eq!(plan.format_version, "0.1");
    assert_eq!(plan.terraform_version, "0.12.6");
    assert_eq!(plan.variables["instance_count"].value.as_i64(), Some(2));
    assert_eq!(
        plan.variables["tags"].value.get("team").and_then(Value::as_str),
        Some("platform")
    );
}

#[test]
fn plan_change_counts() {
    let plan = decode_plan(&fixture("plan.json")).unwrap();
    let counts = plan.change_counts();
    assert_eq!(counts.get(&ChangeKind::Update), Some(&1));
    assert_eq!(counts.get(&ChangeKind::Replace), Some(&1));
    assert_eq!(counts.get(&ChangeKind::Create), Some(&1));
    assert_eq!(counts.get(&ChangeKind::NoOp), Some(&1));
    assert_eq!(counts.get(&ChangeKind::Delete), Some(&1));
}

#[test]
fn plan_deposed_change_restates_identity() {
    let plan = decode_plan(&fixture("plan.json")).unwrap();
    let deposed = plan.resource_changes_where(|rc| rc.deposed);
    assert_eq!(deposed.len(), 1);
    let rc = deposed[0];
    assert_eq!(rc.address, "aws_instance.web[0]");
    assert_eq!(rc.index, Some(ResourceIndex::Int(0)));
    assert!(rc.change.actions.is_delete());
    assert!(rc.change.after.is_none());

    // The current object of the same instance is being replaced.
    let current = plan
        .resource_changes_where(|rc| rc.address == "aws_instance.web[0]" && !rc.deposed);
    assert_eq!(current.len(), 1);
    assert!(current[0].change.actions.is_replace());
    assert!(current[0].change.is_after_unknown("id"));
}

#[test]
fn plan_state_attributes_stay_values() {
    let plan = decode_plan(&fixture("plan.json")).unwrap();
    let planned = plan.planned_values.as_ref().unwrap();
    let sg = planned.find_resource("aws_security_group.web").unwrap();

    // An attribute array of objects is data, not a block list.
    let ingress = sg.values["ingress"].as_array().unwrap();
    assert_eq!(ingress.len(), 2);
    assert_eq!(ingress[1].get("from_port").and_then(Value::as_i64), Some(22));
    assert!(planned
        .find_resource("aws_instance.web[1]")
        .map(|r| r.values["monitoring"].is_null())
        .unwrap_or(false));

    let prior = plan.prior_state.as_ref().unwrap();
    let ami = prior.find_resource("data.aws_ami.ubuntu").unwrap();
    assert_eq!(ami.mode, ResourceMode::Data);
    assert_eq!(ami.values["size_gb"].as_f64(), Some(8.5));
}

#[test]
fn plan_configuration_expressions() {
    let plan = decode_plan(&fixture("plan.json")).unwrap();
    let config = plan.configuration.as_ref().unwrap();
    assert_eq!(config.provider_config["aws.west"].alias, "west");

    let root = config.root_module.as_ref().unwrap();
    let sg = &root.resources[0];
    assert_eq!(sg.address, "aws_security_group.web");

    let ingress = sg.expressions["ingress"].nested_blocks();
    assert_eq!(ingress.len(), 2);
    assert_eq!(
        ingress[0]["cidr_blocks"]
            .constant_value()
            .and_then(Value::as_array)
            .map(|a| a.len()),
        Some(1)
    );
    assert_eq!(ingress[1]["cidr_blocks"].kind(), ExpressionKind::Unresolved);
    assert_eq!(sg.expressions["vpc_id"].references(), ["module.network.vpc_id"]);

    let web = &root.resources[1];
    assert_eq!(
        web.count_expression.as_ref().map(Expression::references),
        Some(&["var.instance_count".to_string()][..])
    );
    assert_eq!(web.provisioners[0].provisioner_type, "local-exec");
    assert_eq!(
        web.provisioners[0].expressions["command"].references(),
        ["self.private_ip"]
    );

    // Variable defaults are plain values.
    assert_eq!(root.variables["instance_count"].default, Some(Value::from(1i64)));
    assert!(root.variables["admin_cidr"].default.is_none());
}

#[test]
fn plan_configuration_module_tree() {
    let plan = decode_plan(&fixture("plan.json")).unwrap();
    let config = plan.configuration.as_ref().unwrap();

    let resources: Vec<String> = config
        .all_resources()
        .into_iter()
        .map(|(chain, r)| {
            let mut parts: Vec<String> = chain.iter().map(|c| format!("module.{c}")).collect();
            parts.push(r.address.clone());
            parts.join(".")
        })
        .collect();
    assert_eq!(
        resources,
        vec![
            "aws_security_group.web",
            "aws_instance.web",
            "data.aws_ami.ubuntu",
            "module.network.aws_vpc.this",
        ]
    );

    let network = &config.root_module.as_ref().unwrap().module_calls["network"];
    assert_eq!(network.resolved_source, "./modules/network");
    let vpc = &network.module.as_ref().unwrap().resources[0];
    assert_eq!(vpc.references(), vec!["var.cidr"]);
}

#[test]
fn plan_reencode_is_stable() {
    let plan = decode_plan(&fixture("plan.json")).unwrap();
    let first = to_vec(&plan).unwrap();
    let again = decode_plan(&first).unwrap();
    assert_eq!(again, plan);
    assert_eq!(to_vec(&again).unwrap(), first);
    assert_eq!(to_canonical(&again).unwrap(), to_canonical(&plan).unwrap());
}

#[test]
fn plan_depth_limit_applies_to_configuration() {
    let strict = DocumentDecoder::new(DecodeOptions { max_depth: 0 });
    let err = strict.decode_plan(&fixture("plan.json")).unwrap_err();
    assert!(err.to_string().contains("depth limit of 0"), "unexpected: {err}");

    let shallow = DocumentDecoder::new(DecodeOptions { max_depth: 1 });
    assert!(shallow.decode_plan(&fixture("plan.json")).is_ok());
}

#[test]
fn plan_with_bumped_version_is_rejected() {
    let raw = String::from_utf8(fixture("plan.json")).unwrap();
    let bumped = raw.replacen(r#""format_version": "0.1""#, r#""format_version": "0.2""#, 1);
    match decode_plan(bumped.as_bytes()) {
        Err(TfjsonError::Gate(GateError::VersionMismatch { got, expected, .. })) => {
            assert_eq!(got, "0.2");
            assert_eq!(expected, "0.1");
        }
        other => panic!("expected version mismatch, got {other:?}"),
    }
}

// -- State -------------------------------------------------------------

#[test]
fn state_fixture_decodes() {
    let state = decode_state(&fixture("state.json")).unwrap();
    let values = state.values.as_ref().unwrap();
    assert!(values.outputs["db_password"].sensitive);
    assert_eq!(
        values.outputs["vpc_id"].value.as_ref().and_then(Value::as_str),
        Some("vpc-0a1b2c3d")
    );

    let all = values.all_resources();
    assert_eq!(all.len(), 5);
    let record = values.find_resource("aws_route53_record.www[\"blue\"]").unwrap();
    assert_eq!(record.index, Some(ResourceIndex::Key("blue".into())));
    assert_eq!(record.schema_version, 2);
    assert_eq!(record.values["weight"].as_f64(), Some(0.25));

    let subnet = values
        .find_resource("module.network.module.subnets.aws_subnet.this[0]")
        .unwrap();
    assert_eq!(subnet.values["map_public_ip_on_launch"].as_bool(), Some(true));

    let db = values.find_resource("aws_db_instance.main").unwrap();
    assert!(db.values["parameter_group_name"].is_null());
}

#[test]
fn state_reencode_is_stable() {
    let state = decode_state(&fixture("state.json")).unwrap();
    let first = to_vec(&state).unwrap();
    let again = decode_state(&first).unwrap();
    assert_eq!(again, state);
    assert_eq!(to_vec(&again).unwrap(), first);
}

#[test]
fn state_integer_beyond_64_bits_is_rejected() {
    let raw = r#"{
        "format_version": "0.1",
        "values": {"root_module": {"resources": [
            {"address": "null_resource.big", "mode": "resource", "type": "null_resource",
             "name": "big", "values": {"bytes": 18446744073709551616}}
        ]}}
    }"#;
    let err = decode_state(raw.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("18446744073709551616"), "unexpected: {err}");
}

// -- Config ------------------------------------------------------------

#[test]
fn config_fixture_expression_shapes() {
    let config = decode_config(&fixture("config.json")).unwrap();
    let root = config.root_module.as_ref().unwrap();
    let fw = &root.resources[0];

    assert_eq!(fw.expressions["allow"].kind(), ExpressionKind::NestedBlocks);
    assert_eq!(fw.expressions["log_config"], Expression::NestedBlocks(Vec::new()));
    assert_eq!(fw.expressions["source_ranges"], Expression::Unknown);
    assert_eq!(fw.expressions["priority"], Expression::Constant(Value::Null));
    assert_eq!(
        fw.for_each_expression.as_ref().map(Expression::kind),
        Some(ExpressionKind::Unresolved)
    );

    let mut refs = fw.references();
    refs.sort_unstable();
    assert_eq!(
        refs,
        vec!["each.key", "each.value", "google_compute_network.main", "var.rules"]
    );

    assert_eq!(
        root.variables["rules"]
            .default
            .as_ref()
            .and_then(|d| d.get("https"))
            .and_then(Value::as_array)
            .map(|a| a.len()),
        Some(1)
    );
}

#[test]
fn config_reencode_is_stable() {
    let config = decode_config(&fixture("config.json")).unwrap();
    let first = to_vec(&config).unwrap();
    let again = decode_config(&first).unwrap();
    assert_eq!(again, config);
    assert_eq!(to_vec(&again).unwrap(), first);
    assert_eq!(to_canonical(&again).unwrap(), to_canonical(&config).unwrap());
}

#[test]
fn config_constant_beyond_64_bits_is_rejected() {
    let raw = r#"{"root_module": {"resources": [
        {"address": "null_resource.big", "mode": "resource", "type": "null_resource", "name": "big",
         "expressions": {"bytes": {"constant_value": 18446744073709551616}}}
    ]}}"#;
    let err = decode_config(raw.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("bytes"), "unexpected: {err}");
    assert!(err.to_string().contains("18446744073709551616"), "unexpected: {err}");
}

// -- Detection ---------------------------------------------------------

#[test]
fn fixtures_detect_their_kind() {
    for (name, kind) in [
        ("plan.json", DocumentKind::Plan),
        ("state.json", DocumentKind::State),
        ("config.json", DocumentKind::Config),
    ] {
        assert_eq!(
            DocumentKind::detect(&fixture(name)).unwrap(),
            Some(kind),
            "fixture {name}"
        );
        let doc = DocumentDecoder::default()
            .decode_kind(kind, &fixture(name))
            .unwrap();
        assert_eq!(doc.kind(), kind);
    }
}
