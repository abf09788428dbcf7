#![allow(missing_docs)]

use qtdecode::qt::{MapDecoder, SnapshotBuilder, SnapshotFile, StepBudget, SyntheticChildren, TargetImage, ValueHandle, successor};

/// Two-node map where `A.right = B` and `B.left = B`.
fn self_loop_snapshot() -> SnapshotFile {
	let mut builder = SnapshotBuilder::new();
	let entries: Vec<_> = [1, 2].into_iter().map(|key| (builder.int(key), builder.int(0))).collect();
	let map = builder.qmap("int", "int", &entries);
	builder.root("m", &map);
	let mut file = builder.finish();
	let (a, b) = (map.elements[0], map.elements[1]);
	file.write_ptr(a + 16, b).expect("a.right");
	file.write_ptr(b + 8, b).expect("b.left");
	file
}

#[test]
fn successor_stops_within_budget() {
	let image = TargetImage::from_snapshot(self_loop_snapshot()).expect("snapshot loads");
	let a = image.root("m").expect("root").member("d").expect("d").member("mostLeftNode").expect("leftmost");

	let mut budget = StepBudget::new(2);
	assert!(successor(&a, &mut budget).is_err());
	assert!(budget.spent() <= 2);
}

#[test]
fn cycle_is_reported_once_and_sticks() {
	let image = TargetImage::from_snapshot(self_loop_snapshot()).expect("snapshot loads");
	let mut decoder = MapDecoder::new(image.root("m").expect("root"));
	decoder.update();

	assert_eq!(decoder.num_children(), 2);
	assert!(decoder.child_at_index(1).is_none());
	assert!(decoder.is_corrupted());
	assert!(decoder.child_at_index(0).is_none());
	assert!(decoder.child_at_index(1).is_none());
}

#[test]
fn oversized_count_does_not_walk_forever() {
	let mut file = self_loop_snapshot();
	let map_data = {
		let image = TargetImage::from_snapshot(file.clone()).expect("snapshot loads");
		image.root("m").expect("root").member("d").expect("d").as_unsigned().expect("header address")
	};
	file.write_bytes(map_data + 4, &i32::MAX.to_le_bytes()).expect("size field");
	let image = TargetImage::from_snapshot(file).expect("snapshot loads");

	let mut decoder = MapDecoder::with_options(image.root("m").expect("root"), "QMapNode", 16);
	decoder.update();
	assert_eq!(decoder.num_children(), i32::MAX as usize);
	assert!(decoder.child_at_index(1_000).is_none());
	assert!(decoder.is_corrupted());
}
