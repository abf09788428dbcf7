use super::{container_type, element_type, map_node_type, map_node_type_name};
use crate::qt::{SnapshotBuilder, TargetImage, TypeHandle, TypeSpec, ValueHandle};

#[test]
fn node_name_spaces_nested_value_templates() {
	assert_eq!(map_node_type_name("QMapNode", "int", "QVector<int>", true), "QMapNode<int, QVector<int> >");
	assert_eq!(map_node_type_name("QMapNode", "QString", "int", false), "QMapNode<QString, int>");
}

#[test]
fn element_and_node_types_resolve_through_handles() {
	let mut builder = SnapshotBuilder::new();
	let items = [builder.int(3)];
	let vector = builder.qvector("int", &items);
	let key = builder.int(1);
	let map = builder.qmap("int", "QVector<int>", &[(key, vector.clone())]);
	builder.root("v", &vector);
	builder.root("m", &map);
	let image = TargetImage::from_snapshot(builder.finish()).expect("snapshot loads");

	let v = image.root("v").expect("vector root");
	assert_eq!(element_type(&v).expect("element type").name(), "int");

	let m = image.root("m").expect("map root");
	let node = map_node_type(&m, "QMapNode").expect("node type");
	assert_eq!(node.name(), "QMapNode<int, QVector<int> >");
	assert!(map_node_type(&m, "QHashNode").is_err());
}

#[test]
fn references_and_qualifiers_reach_the_container() {
	let mut builder = SnapshotBuilder::new();
	let items = [builder.int(3)];
	let vector = builder.qvector("int", &items);
	builder.declare(TypeSpec::reference("QVector<int>&", "QVector<int>"));
	builder.declare(TypeSpec::structure("const QVector<int>", 8, &[]));
	builder.root("v", &vector);
	let image = TargetImage::from_snapshot(builder.finish()).expect("snapshot loads");

	let v = image.root("v").expect("vector root");
	let reference = v.find_type("QVector<int>&").expect("reference declared");
	assert_eq!(container_type(&reference).name(), "QVector<int>");
	let qualified = v.find_type("const QVector<int>").expect("const declared");
	assert_eq!(container_type(&qualified).name(), "QVector<int>");
}

#[test]
fn plain_types_have_no_element_type() {
	let mut builder = SnapshotBuilder::new();
	let value = builder.int(5);
	builder.root("x", &value);
	let image = TargetImage::from_snapshot(builder.finish()).expect("snapshot loads");
	assert!(element_type(&image.root("x").expect("root")).is_err());
}
