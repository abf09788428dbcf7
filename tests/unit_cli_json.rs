#![allow(missing_docs)]

use qtdecode_testkit::{run_json, scratch_path};
use serde_json::Value;

const BIN: &str = env!("CARGO_BIN_EXE_qtdecode");

fn sample_snapshot(name: &str) -> String {
	let path = scratch_path(name);
	let status = std::process::Command::new(BIN)
		.args(["sample", &path.display().to_string(), "--zstd"])
		.status()
		.expect("command executes");
	assert!(status.success(), "sample should succeed");
	path.display().to_string()
}

fn show(path: &str, root: &str) -> Value {
	run_json(BIN, &["show", path, "--root", root, "--depth", "3", "--json"])
}

#[test]
fn vector_root_renders_children() {
	let path = sample_snapshot("cli_vector.json.zst");
	let json = show(&path, "numbers");

	assert_eq!(json["root"], "numbers");
	assert!(json["address"].as_str().is_some_and(|addr| addr.starts_with("0x")));
	assert_eq!(json["value"]["kind"], "vector");
	assert_eq!(json["value"]["summary"], "size=5");
	let children = json["value"]["children"].as_array().expect("children array");
	let values: Vec<_> = children.iter().map(|child| child["summary"].as_str().unwrap_or_default().to_owned()).collect();
	assert_eq!(values, vec!["3", "1", "4", "1", "5"]);
}

#[test]
fn list_of_strings_renders_quoted_text() {
	let path = sample_snapshot("cli_list.json.zst");
	let json = show(&path, "names");

	assert_eq!(json["value"]["kind"], "list");
	assert_eq!(json["value"]["children"][2]["summary"], "\"gamma\"");
}

#[test]
fn map_nodes_render_key_and_value_only() {
	let path = sample_snapshot("cli_map.json.zst");
	let json = show(&path, "buckets");

	assert_eq!(json["value"]["type"], "QMap<int, QVector<int> >");
	assert_eq!(json["value"]["summary"], "size=3");
	let first = &json["value"]["children"][0];
	let fields: Vec<_> = first["children"].as_array().expect("node fields").iter().map(|field| field["name"].clone()).collect();
	assert_eq!(fields, vec![Value::from("key"), Value::from("value")]);
	assert_eq!(first["children"][1]["summary"], "size=2");
}

#[test]
fn classify_reports_decoder_kind() {
	let output = std::process::Command::new(BIN)
		.args(["classify", "const QMap<QString, QList<int> > &"])
		.output()
		.expect("command executes");
	assert!(output.status.success());
	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains("kind: map"), "unexpected output: {stdout}");
	assert!(stdout.contains("arity: 2"));
}
