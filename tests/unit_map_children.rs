#![allow(missing_docs)]

use qtdecode::qt::{ImageValue, MapDecoder, SnapshotBuilder, SyntheticChildren, TargetImage, ValueHandle, VectorDecoder, string_summary};

fn int_map(keys: &[i32]) -> TargetImage {
	let mut builder = SnapshotBuilder::new();
	let entries: Vec<_> = keys.iter().map(|key| (builder.int(*key), builder.int(key * 100))).collect();
	let map = builder.qmap("int", "int", &entries);
	builder.root("m", &map);
	TargetImage::from_snapshot(builder.finish()).expect("snapshot loads")
}

/// Keys collected by a plain recursive in-order walk from `d.header.left`.
fn recursive_keys(node: &ImageValue<'_>, out: &mut Vec<u64>) {
	if node.as_unsigned().expect("link") == 0 {
		return;
	}
	recursive_keys(&node.member("left").expect("left"), out);
	let node_type = node.find_type("QMapNode<int, int>").expect("node type");
	let raw = node.read_pointee(0, 32).expect("node bytes");
	let decoded = node.from_data("node", raw, &node_type).expect("node value");
	out.push(decoded.member("key").expect("key").as_unsigned().expect("scalar"));
	recursive_keys(&node.member("right").expect("right"), out);
}

fn decoder_keys(decoder: &mut MapDecoder<ImageValue<'_>>, order: impl IntoIterator<Item = usize>) -> Vec<u64> {
	order
		.into_iter()
		.map(|index| {
			let child = decoder.child_at_index(index).expect("child");
			child.member("key").expect("key").as_unsigned().expect("scalar")
		})
		.collect()
}

#[test]
fn sequential_access_matches_in_order_walk() {
	let keys: Vec<i32> = (1..=20).map(|key| key * 3).collect();
	let image = int_map(&keys);
	let mut decoder = MapDecoder::new(image.root("m").expect("root"));
	decoder.update();
	assert_eq!(decoder.num_children(), keys.len());

	let mut expected = Vec::new();
	recursive_keys(decoder.root().expect("tree root"), &mut expected);
	assert_eq!(decoder_keys(&mut decoder, 0..keys.len()), expected);
	assert!(expected.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn random_access_agrees_with_sequential_access() {
	let keys: Vec<i32> = (0..12).collect();
	let image = int_map(&keys);
	let mut decoder = MapDecoder::new(image.root("m").expect("root"));
	decoder.update();
	let order = [11, 0, 5, 5, 6, 2, 9, 1];
	let keys = decoder_keys(&mut decoder, order);
	assert_eq!(keys, order.iter().map(|index| *index as u64).collect::<Vec<_>>());
}

#[test]
fn children_expose_key_and_value() {
	let image = int_map(&[4, 8]);
	let mut decoder = MapDecoder::new(image.root("m").expect("root"));
	decoder.update();
	assert_eq!(decoder.node_type_name(), Some("QMapNode<int, int>"));
	let child = decoder.child_at_index(1).expect("child");
	assert_eq!(child.name(), "[1]");
	assert_eq!(child.member("value").expect("value").as_unsigned().expect("scalar"), 800);
	assert!(decoder.child_at_index(2).is_none());
}

#[test]
fn nested_template_values_resolve_their_node_type() {
	let mut builder = SnapshotBuilder::new();
	let entries: Vec<_> = [(1, vec![10, 11]), (2, vec![20])]
		.into_iter()
		.map(|(key, values)| {
			let key = builder.int(key);
			let items: Vec<_> = values.into_iter().map(|value| builder.int(value)).collect();
			(key, builder.qvector("int", &items))
		})
		.collect();
	let map = builder.qmap("int", "QVector<int>", &entries);
	builder.root("m", &map);
	let image = TargetImage::from_snapshot(builder.finish()).expect("snapshot loads");

	let mut decoder = MapDecoder::new(image.root("m").expect("root"));
	decoder.update();
	assert_eq!(decoder.node_type_name(), Some("QMapNode<int, QVector<int> >"));

	let first = decoder.child_at_index(0).expect("child");
	let mut inner = VectorDecoder::new(first.member("value").expect("value"));
	inner.update();
	assert_eq!(inner.num_children(), 2);
	assert_eq!(inner.child_at_index(1).expect("element").as_unsigned().expect("scalar"), 11);
}

#[test]
fn string_keys_summarize() {
	let mut builder = SnapshotBuilder::new();
	let entries: Vec<_> = ["ada", "grace"].into_iter().map(|name| (builder.qstring(name), builder.int(1))).collect();
	let map = builder.qmap("QString", "int", &entries);
	builder.root("m", &map);
	let image = TargetImage::from_snapshot(builder.finish()).expect("snapshot loads");

	let mut decoder = MapDecoder::new(image.root("m").expect("root"));
	decoder.update();
	let key = decoder.child_at_index(1).expect("child").member("key").expect("key");
	assert_eq!(string_summary(&key, 512), "\"grace\"");
}

#[test]
fn empty_map_has_no_children() {
	let image = int_map(&[]);
	let mut decoder = MapDecoder::new(image.root("m").expect("root"));
	decoder.update();
	assert_eq!(decoder.num_children(), 0);
	assert!(decoder.child_at_index(0).is_none());
	assert!(!decoder.is_corrupted());
}
