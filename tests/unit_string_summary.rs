#![allow(missing_docs)]

use qtdecode::qt::{ARRAY_HEADER_SIZE, MAX_STRING_SUMMARY_SETTING, SnapshotBuilder, TargetImage, ValueHandle, decode_utf16, string_summary};

fn summary_of(units: &[u16], setting: Option<&str>) -> String {
	let mut builder = SnapshotBuilder::new();
	if let Some(value) = setting {
		builder.setting(MAX_STRING_SUMMARY_SETTING, value);
	}
	let text = builder.qstring_units(units);
	builder.root("s", &text);
	let image = TargetImage::from_snapshot(builder.finish()).expect("snapshot loads");
	string_summary(&image.root("s").expect("root"), 512)
}

fn units(text: &str) -> Vec<u16> {
	text.encode_utf16().collect()
}

#[test]
fn stops_at_first_nul() {
	assert_eq!(summary_of(&units("hello\0xxxx"), None), "\"hello\"");
	assert_eq!(summary_of(&[], None), "\"\"");
}

#[test]
fn host_setting_bounds_length() {
	assert_eq!(summary_of(&units("hello"), Some("3")), "\"hel\"");
	assert_eq!(summary_of(&units("hello"), Some("not a number")), "\"hello\"");
}

#[test]
fn long_text_spans_several_chunks() {
	let text = "abcdefghij".repeat(60);
	assert_eq!(summary_of(&units(&text), None), format!("\"{}\"", &text[..512]));
}

#[test]
fn surrogate_pairs_decode_and_lone_halves_are_replaced() {
	assert_eq!(summary_of(&units("Qt \u{1F600}!"), None), "\"Qt \u{1F600}!\"");
	assert_eq!(summary_of(&[0x61, 0xD800, 0x62], None), "\"a\u{FFFD}b\"");
}

#[test]
fn unreadable_tail_keeps_the_readable_prefix() {
	let mut builder = SnapshotBuilder::new();
	let text = builder.qstring("abc");
	builder.root("s", &text);
	let mut file = builder.finish();
	let data = text.data.expect("header");
	// Overwrite the terminator so the scan runs into unmapped memory.
	file.write_bytes(data + ARRAY_HEADER_SIZE as u64 + 6, &[b'A', 0]).expect("terminator");
	let image = TargetImage::from_snapshot(file).expect("snapshot loads");

	assert_eq!(string_summary(&image.root("s").expect("root"), 512), "\"abcA\"");
}

#[test]
fn unresolvable_header_yields_empty_quotes() {
	let mut builder = SnapshotBuilder::new();
	let text = builder.qstring("abc");
	builder.root("s", &text);
	let mut file = builder.finish();
	let slot = file.roots[0].address;
	file.write_ptr(slot, 0).expect("null d");
	let image = TargetImage::from_snapshot(file).expect("snapshot loads");

	assert_eq!(string_summary(&image.root("s").expect("root"), 512), "\"\"");
}

#[test]
fn explicit_offset_and_limit() {
	let mut builder = SnapshotBuilder::new();
	let text = builder.qstring("0123456789");
	builder.root("s", &text);
	let image = TargetImage::from_snapshot(builder.finish()).expect("snapshot loads");
	let d = image.root("s").expect("root").member("d").expect("d");

	let header_units = (ARRAY_HEADER_SIZE / 2) as u64;
	assert_eq!(decode_utf16(&d, header_units + 4, 3), "\"456\"");
	assert_eq!(decode_utf16(&d, header_units, 0), "\"\"");
}
