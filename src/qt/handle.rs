use std::fmt::Debug;

use crate::qt::Result;

/// Host setting that bounds string summaries.
pub const MAX_STRING_SUMMARY_SETTING: &str = "target.max-string-summary-length";

/// Static type of a value living in (or materialized from) target memory.
pub trait TypeHandle: Clone + Debug {
	/// Fully qualified type name as the target spells it.
	fn name(&self) -> &str;

	/// Size of one instance in bytes.
	fn byte_size(&self) -> usize;

	/// Whether this is a reference type.
	fn is_reference(&self) -> bool;

	/// Referenced type for reference types.
	fn dereferenced(&self) -> Option<Self>;

	/// Type with `const`/`volatile` qualifiers removed.
	fn unqualified(&self) -> Self {
		self.clone()
	}

	/// Number of template arguments on this type.
	fn template_arg_count(&self) -> usize;

	/// Template argument at `index`, when it is a type.
	fn template_arg(&self, index: usize) -> Option<Self>;

	/// Pointed-to type for pointers, element type for arrays.
	fn pointee_type(&self) -> Option<Self>;
}

/// Typed location in foreign memory, supplied by the inspecting host.
///
/// All reads go against a paused target and are bounded by their arguments; none of them
/// may block on target execution. Decoders never write through a handle.
pub trait ValueHandle: Clone + Debug {
	/// Type handle flavor of this host.
	type Type: TypeHandle;

	/// Display name of this value.
	fn name(&self) -> &str;

	/// Static type of this value.
	fn type_handle(&self) -> Self::Type;

	/// Named struct member; pointers and references are followed first.
	fn member(&self, name: &str) -> Result<Self>;

	/// Structural child at `index` (struct field or array element).
	fn child_at_index(&self, index: usize) -> Result<Self>;

	/// Scalar value widened to `u64`.
	fn as_unsigned(&self) -> Result<u64>;

	/// Raw bytes of this value.
	fn data(&self) -> Result<Vec<u8>>;

	/// Load address when the value lives in target memory.
	fn address(&self) -> Option<u64>;

	/// Raw bytes at `offset` past the pointee address of a pointer or array value.
	fn read_pointee(&self, offset: u64, len: usize) -> Result<Vec<u8>>;

	/// New value of `ty` at byte `offset`; relative to the pointee for pointer values.
	fn child_at_offset(&self, name: &str, offset: u64, ty: &Self::Type) -> Result<Self>;

	/// New value of `ty` materialized from raw bytes.
	fn from_data(&self, name: &str, data: Vec<u8>, ty: &Self::Type) -> Result<Self>;

	/// Look up a type by name in the target's type catalog.
	fn find_type(&self, name: &str) -> Option<Self::Type>;

	/// Target pointer width in bytes.
	fn pointer_size(&self) -> usize;

	/// Host-wide setting value, if the host exposes one under `key`.
	fn host_setting(&self, key: &str) -> Option<String> {
		let _ = key;
		None
	}

	/// Read `count` pointee-typed items starting at item `index`.
	fn pointee_data(&self, index: usize, count: usize) -> Result<Vec<u8>> {
		let ty = self.type_handle();
		let item_size = ty
			.pointee_type()
			.map(|pointee| pointee.byte_size())
			.ok_or_else(|| crate::qt::QtError::NotPointer {
				type_name: ty.name().to_owned(),
			})?;
		let offset = index.saturating_mul(item_size) as u64;
		self.read_pointee(offset, count.saturating_mul(item_size))
	}
}
