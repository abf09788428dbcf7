//! Synthetic Qt 5 (64-bit) memory snapshots.
//!
//! Used by tests and the `sample` command to lay out containers exactly as the Qt 5
//! headers do, without a live target.

use std::collections::{BTreeMap, HashSet};

use crate::qt::catalog::TypeSpecKind;
use crate::qt::resolve::{MAP_NODE_TEMPLATE, map_node_type_name};
use crate::qt::tagged::join_tagged_ptr;
use crate::qt::{Region, RootSpec, SnapshotFile, TypeSignature, TypeSpec};

const POINTER_SIZE: usize = 8;
const HEAP_BASE: u64 = 0x1000_0000;
const STACK_BASE: u64 = 0x7ff0_0000;

/// Size of `QArrayData`, which also fixes the default element offset.
pub const ARRAY_HEADER_SIZE: usize = 24;

/// Value ready to be stored inline in a root or in container storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
	/// Declared type name.
	pub type_name: String,
	/// Inline bytes.
	pub bytes: Vec<u8>,
	/// Shared data header (`d`) address for containers and strings.
	pub data: Option<u64>,
	/// Storage address of each element (or node) in logical order.
	pub elements: Vec<u64>,
}

impl Object {
	fn scalar(type_name: &str, bytes: Vec<u8>) -> Self {
		Self {
			type_name: type_name.to_owned(),
			bytes,
			data: None,
			elements: Vec::new(),
		}
	}

	fn handle(type_name: String, data: u64, elements: Vec<u64>) -> Self {
		Self {
			type_name,
			bytes: data.to_le_bytes().to_vec(),
			data: Some(data),
			elements,
		}
	}
}

#[derive(Debug)]
struct Arena {
	base: u64,
	bytes: Vec<u8>,
}

impl Arena {
	fn new(base: u64) -> Self {
		Self { base, bytes: Vec::new() }
	}

	fn reserve(&mut self, size: usize, align: usize) -> u64 {
		let align = align.max(1);
		let start = self.bytes.len().next_multiple_of(align);
		// Keep zero-sized allocations distinct.
		self.bytes.resize(start + size.max(1), 0);
		self.base + start as u64
	}

	fn write(&mut self, addr: u64, bytes: &[u8]) {
		let start = (addr - self.base) as usize;
		self.bytes[start..start + bytes.len()].copy_from_slice(bytes);
	}

	fn place(&mut self, bytes: &[u8], align: usize) -> u64 {
		let addr = self.reserve(bytes.len(), align);
		self.write(addr, bytes);
		addr
	}

	fn into_region(self) -> Option<Region> {
		(!self.bytes.is_empty()).then(|| Region {
			start: self.base,
			bytes: self.bytes,
		})
	}
}

/// Incrementally lays out types, heap storage, and named roots.
#[derive(Debug)]
pub struct SnapshotBuilder {
	types: Vec<TypeSpec>,
	declared: HashSet<String>,
	sizes: BTreeMap<String, usize>,
	settings: BTreeMap<String, String>,
	heap: Arena,
	stack: Arena,
	roots: Vec<RootSpec>,
}

impl Default for SnapshotBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl SnapshotBuilder {
	/// Empty 64-bit snapshot with the Qt scalar typedefs declared.
	pub fn new() -> Self {
		let mut builder = Self {
			types: Vec::new(),
			declared: HashSet::new(),
			sizes: BTreeMap::new(),
			settings: BTreeMap::new(),
			heap: Arena::new(HEAP_BASE),
			stack: Arena::new(STACK_BASE),
			roots: Vec::new(),
		};
		for (name, size) in [("void", 0), ("int", 4), ("uint", 4), ("ushort", 2), ("quintptr", 8), ("qptrdiff", 8)] {
			builder.declare_primitive(name, size);
		}
		builder.declare(TypeSpec::pointer("void*", "void"));
		builder
	}

	/// Record a host setting.
	pub fn setting(&mut self, key: &str, value: &str) -> &mut Self {
		self.settings.insert(key.to_owned(), value.to_owned());
		self
	}

	/// Declare a type unless one with the same name exists.
	pub fn declare(&mut self, spec: TypeSpec) {
		if !self.declared.insert(spec.name.clone()) {
			return;
		}
		let size = match &spec.kind {
			TypeSpecKind::Primitive { size } | TypeSpecKind::Struct { size, .. } => *size,
			TypeSpecKind::Pointer { .. } | TypeSpecKind::Reference { .. } => POINTER_SIZE,
			TypeSpecKind::Array { element, len } => self.size_of(element) * len,
		};
		self.sizes.insert(spec.name.clone(), size);
		self.types.push(spec);
	}

	/// Declare a primitive of `size` bytes.
	pub fn declare_primitive(&mut self, name: &str, size: usize) {
		self.declare(TypeSpec::primitive(name, size));
	}

	/// Size of a declared type, zero when unknown.
	pub fn size_of(&self, type_name: &str) -> usize {
		self.sizes.get(type_name).copied().unwrap_or(0)
	}

	/// A 32-bit `int`.
	pub fn int(&mut self, value: i32) -> Object {
		Object::scalar("int", value.to_le_bytes().to_vec())
	}

	/// A 64-bit `double`.
	pub fn double(&mut self, value: f64) -> Object {
		self.declare_primitive("double", 8);
		Object::scalar("double", value.to_le_bytes().to_vec())
	}

	/// Raw value of a primitive type, declared on first use.
	pub fn primitive(&mut self, type_name: &str, bytes: &[u8]) -> Object {
		self.declare_primitive(type_name, bytes.len());
		Object::scalar(type_name, bytes.to_vec())
	}

	/// Plain struct with naturally aligned fields, declared on first use.
	pub fn structure(&mut self, type_name: &str, fields: &[(&str, Object)]) -> Object {
		let mut bytes = Vec::new();
		let mut layout = Vec::with_capacity(fields.len());
		let mut max_align = 1;
		for (name, field) in fields {
			let align = natural_align(field.bytes.len());
			max_align = max_align.max(align);
			let offset = bytes.len().next_multiple_of(align);
			bytes.resize(offset, 0);
			bytes.extend_from_slice(&field.bytes);
			layout.push((*name, field.type_name.as_str(), offset));
		}
		bytes.resize(bytes.len().next_multiple_of(max_align), 0);
		self.declare(TypeSpec::structure(type_name, bytes.len(), &layout));
		Object::scalar(type_name, bytes)
	}

	/// `QString` holding `text`.
	pub fn qstring(&mut self, text: &str) -> Object {
		let units: Vec<u16> = text.encode_utf16().collect();
		self.qstring_units(&units)
	}

	/// `QString` holding raw UTF-16 code units, NUL-terminated.
	pub fn qstring_units(&mut self, units: &[u16]) -> Object {
		self.declare(array_data_spec("QStringData", None));
		self.declare(TypeSpec::pointer("QStringData*", "QStringData"));
		self.declare(TypeSpec::structure("QString", POINTER_SIZE, &[("d", "QStringData*", 0)]));

		let mut payload = array_header(units.len(), ARRAY_HEADER_SIZE);
		for unit in units.iter().chain([&0_u16]) {
			payload.extend_from_slice(&unit.to_le_bytes());
		}
		let data = self.heap.place(&payload, POINTER_SIZE);
		Object::handle("QString".to_owned(), data, Vec::new())
	}

	/// `QVector<element_type>` with `elements` stored after the array header.
	pub fn qvector(&mut self, element_type: &str, elements: &[Object]) -> Object {
		let header = template_name("QTypedArrayData", &[element_type]);
		let header_ptr = format!("{header}*");
		let container = template_name("QVector", &[element_type]);
		self.declare(array_data_spec(&header, Some(element_type)));
		self.declare(TypeSpec::pointer(&header_ptr, &header));
		self.declare(TypeSpec::structure(&container, POINTER_SIZE, &[("d", header_ptr.as_str(), 0)]).with_template_args(&[element_type]));

		let element_size = self.size_of(element_type);
		let mut payload = array_header(elements.len(), ARRAY_HEADER_SIZE);
		for element in elements {
			let mut bytes = element.bytes.clone();
			bytes.resize(element_size, 0);
			payload.extend_from_slice(&bytes);
		}
		let data = self.heap.place(&payload, POINTER_SIZE);
		let addresses = (0..elements.len()).map(|idx| data + (ARRAY_HEADER_SIZE + idx * element_size) as u64).collect();
		Object::handle(container, data, addresses)
	}

	/// `QList<element_type>`; elements wider than a pointer are boxed on the heap.
	pub fn qlist(&mut self, element_type: &str, elements: &[Object]) -> Object {
		let container = template_name("QList", &[element_type]);
		self.declare(TypeSpec::array("void*[1]", "void*", 1));
		self.declare(TypeSpec::structure(
			"QListData::Data",
			16 + POINTER_SIZE,
			&[("ref", "int", 0), ("alloc", "int", 4), ("begin", "int", 8), ("end", "int", 12), ("array", "void*[1]", 16)],
		));
		self.declare(TypeSpec::pointer("QListData::Data*", "QListData::Data"));
		self.declare(TypeSpec::structure(&container, POINTER_SIZE, &[("d", "QListData::Data*", 0)]).with_template_args(&[element_type]));

		let element_size = self.size_of(element_type);
		let boxed = element_size > POINTER_SIZE;
		let mut slots = Vec::with_capacity(elements.len());
		let mut boxes = Vec::new();
		for element in elements {
			let mut bytes = element.bytes.clone();
			bytes.resize(element_size, 0);
			if boxed {
				let addr = self.heap.place(&bytes, natural_align(element_size));
				boxes.push(addr);
				slots.push(addr.to_le_bytes().to_vec());
			} else {
				bytes.resize(POINTER_SIZE, 0);
				slots.push(bytes);
			}
		}

		let count = elements.len() as i32;
		let mut payload = Vec::with_capacity(16 + POINTER_SIZE * elements.len().max(1));
		payload.extend_from_slice(&1_i32.to_le_bytes());
		payload.extend_from_slice(&count.to_le_bytes());
		payload.extend_from_slice(&0_i32.to_le_bytes());
		payload.extend_from_slice(&count.to_le_bytes());
		for slot in &slots {
			payload.extend_from_slice(slot);
		}
		payload.resize(payload.len().max(16 + POINTER_SIZE), 0);
		let data = self.heap.place(&payload, POINTER_SIZE);

		let addresses = if boxed {
			boxes
		} else {
			(0..elements.len()).map(|idx| data + (16 + idx * POINTER_SIZE) as u64).collect()
		};
		Object::handle(container, data, addresses)
	}

	/// `QMap<key_type, value_type>` over `entries`, which must already be in key order.
	///
	/// Nodes form a balanced tree; the low bit of each parent link carries the node
	/// color, as in the red-black tree Qt keeps.
	pub fn qmap(&mut self, key_type: &str, value_type: &str, entries: &[(Object, Object)]) -> Object {
		let value_is_template = TypeSignature::parse(value_type).is_ok_and(|sig| sig.arity() > 0);
		let node = map_node_type_name(MAP_NODE_TEMPLATE, key_type, value_type, value_is_template);
		let data_name = template_name("QMapData", &[key_type, value_type]);
		let data_ptr = format!("{data_name}*");
		let container = template_name("QMap", &[key_type, value_type]);

		let key_size = self.size_of(key_type);
		let value_size = self.size_of(value_type);
		let key_offset = 3 * POINTER_SIZE;
		let value_offset = (key_offset + key_size).next_multiple_of(natural_align(value_size));
		let node_size = (value_offset + value_size).next_multiple_of(POINTER_SIZE);

		let base_fields = [("p", "quintptr", 0), ("left", "QMapNodeBase*", 8), ("right", "QMapNodeBase*", 16)];
		self.declare(TypeSpec::structure("QMapNodeBase", 3 * POINTER_SIZE, &base_fields));
		self.declare(TypeSpec::pointer("QMapNodeBase*", "QMapNodeBase"));
		let mut node_fields: Vec<(&str, &str, usize)> = base_fields.to_vec();
		node_fields.extend([("key", key_type, key_offset), ("value", value_type, value_offset)]);
		self.declare(TypeSpec::structure(&node, node_size, &node_fields).with_template_args(&[key_type, value_type]));
		self.declare(TypeSpec::structure(
			&data_name,
			5 * POINTER_SIZE,
			&[("ref", "int", 0), ("size", "int", 4), ("header", "QMapNodeBase", 8), ("mostLeftNode", "QMapNodeBase*", 32)],
		));
		self.declare(TypeSpec::pointer(&data_ptr, &data_name));
		self.declare(TypeSpec::structure(&container, POINTER_SIZE, &[("d", data_ptr.as_str(), 0)]).with_template_args(&[key_type, value_type]));

		let data = self.heap.reserve(5 * POINTER_SIZE, POINTER_SIZE);
		let header = data + 8;
		let nodes: Vec<u64> = entries
			.iter()
			.map(|(key, value)| {
				let mut bytes = vec![0; node_size];
				copy_into(&mut bytes, key_offset, &key.bytes, key_size);
				copy_into(&mut bytes, value_offset, &value.bytes, value_size);
				self.heap.place(&bytes, POINTER_SIZE)
			})
			.collect();

		let root = self.link_subtree(&nodes, header, 0);
		let leftmost = nodes.first().copied().unwrap_or(header);

		let mut payload = Vec::with_capacity(5 * POINTER_SIZE);
		payload.extend_from_slice(&1_i32.to_le_bytes());
		payload.extend_from_slice(&(entries.len() as i32).to_le_bytes());
		payload.extend_from_slice(&0_u64.to_le_bytes());
		payload.extend_from_slice(&root.to_le_bytes());
		payload.extend_from_slice(&0_u64.to_le_bytes());
		payload.extend_from_slice(&leftmost.to_le_bytes());
		self.heap.write(data, &payload);

		Object::handle(container, data, nodes)
	}

	/// Wire `nodes` (in key order) into a balanced subtree under `parent`; returns its root.
	fn link_subtree(&mut self, nodes: &[u64], parent: u64, depth: u8) -> u64 {
		if nodes.is_empty() {
			return 0;
		}
		let mid = nodes.len() / 2;
		let node = nodes[mid];
		let left = self.link_subtree(&nodes[..mid], node, depth + 1);
		let right = self.link_subtree(&nodes[mid + 1..], node, depth + 1);

		let mut links = Vec::with_capacity(3 * POINTER_SIZE);
		links.extend_from_slice(&join_tagged_ptr(parent, depth % 2).to_le_bytes());
		links.extend_from_slice(&left.to_le_bytes());
		links.extend_from_slice(&right.to_le_bytes());
		self.heap.write(node, &links);
		node
	}

	/// Store `object` in root storage under `name`; returns its address.
	pub fn root(&mut self, name: &str, object: &Object) -> u64 {
		let addr = self.stack.place(&object.bytes, POINTER_SIZE);
		self.roots.push(RootSpec {
			name: name.to_owned(),
			type_name: object.type_name.clone(),
			address: addr,
		});
		addr
	}

	/// Finished snapshot document.
	pub fn finish(self) -> SnapshotFile {
		SnapshotFile {
			pointer_size: POINTER_SIZE,
			settings: self.settings,
			types: self.types,
			regions: [self.heap, self.stack].into_iter().filter_map(Arena::into_region).collect(),
			roots: self.roots,
		}
	}
}

fn template_name(base: &str, args: &[&str]) -> String {
	TypeSignature {
		base: base.to_owned(),
		args: args.iter().map(|arg| (*arg).to_owned()).collect(),
	}
	.to_string()
}

fn array_data_spec(name: &str, element_type: Option<&str>) -> TypeSpec {
	let spec = TypeSpec::structure(
		name,
		ARRAY_HEADER_SIZE,
		&[("ref", "int", 0), ("size", "int", 4), ("alloc", "uint", 8), ("offset", "qptrdiff", 16)],
	);
	match element_type {
		Some(element) => spec.with_template_args(&[element]),
		None => spec,
	}
}

fn array_header(size: usize, offset: usize) -> Vec<u8> {
	let mut header = Vec::with_capacity(ARRAY_HEADER_SIZE);
	header.extend_from_slice(&1_i32.to_le_bytes());
	header.extend_from_slice(&(size as i32).to_le_bytes());
	header.extend_from_slice(&(size as u32).to_le_bytes());
	header.extend_from_slice(&0_u32.to_le_bytes());
	header.extend_from_slice(&(offset as u64).to_le_bytes());
	header
}

fn natural_align(size: usize) -> usize {
	size.clamp(1, POINTER_SIZE).next_power_of_two()
}

fn copy_into(dst: &mut [u8], offset: usize, src: &[u8], len: usize) {
	let len = len.min(src.len());
	dst[offset..offset + len].copy_from_slice(&src[..len]);
}

#[cfg(test)]
mod tests {
	use super::{ARRAY_HEADER_SIZE, SnapshotBuilder};
	use crate::qt::TargetImage;

	#[test]
	fn vector_payload_follows_header() {
		let mut builder = SnapshotBuilder::new();
		let items = [builder.int(1), builder.int(2)];
		let vector = builder.qvector("int", &items);
		let data = vector.data.expect("vector has header");
		assert_eq!(vector.type_name, "QVector<int>");
		assert_eq!(vector.elements, vec![data + ARRAY_HEADER_SIZE as u64, data + ARRAY_HEADER_SIZE as u64 + 4]);

		builder.root("v", &vector);
		let image = TargetImage::from_snapshot(builder.finish()).expect("snapshot loads");
		assert_eq!(image.memory.read(data + 4, 4).expect("size readable"), &2_i32.to_le_bytes());
	}

	#[test]
	fn nested_value_types_get_spaced_node_names() {
		let mut builder = SnapshotBuilder::new();
		let key = builder.int(1);
		let inner_items = [builder.int(9)];
		let inner = builder.qvector("int", &inner_items);
		let map = builder.qmap("int", "QVector<int>", &[(key, inner)]);
		assert_eq!(map.type_name, "QMap<int, QVector<int> >");
		builder.root("m", &map);

		let image = TargetImage::from_snapshot(builder.finish()).expect("snapshot loads");
		assert!(image.catalog.find("QMapNode<int, QVector<int> >").is_some());
		assert!(image.catalog.find("QMapNode<int, QVector<int>>").is_none());
	}

	#[test]
	fn struct_fields_are_naturally_aligned() {
		let mut builder = SnapshotBuilder::new();
		let a = builder.int(1);
		let b = builder.double(2.0);
		let pair = builder.structure("Pair", &[("a", a), ("b", b)]);
		assert_eq!(pair.bytes.len(), 16);
		assert_eq!(builder.size_of("Pair"), 16);
	}
}
