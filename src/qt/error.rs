use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, QtError>;

/// Errors produced while reading target memory, resolving types, and loading snapshots.
#[derive(Debug, Error)]
pub enum QtError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Snapshot or config JSON could not be parsed.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
	/// Leading bytes are neither a zstd frame nor a JSON document.
	#[error("unsupported compression or not a snapshot (magic={magic:?})")]
	UnknownMagic {
		/// First up-to-4 bytes of the stream.
		magic: [u8; 4],
	},
	/// Decompression output exceeded configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Pointer width other than 4 or 8 bytes.
	#[error("unsupported pointer size {size}")]
	UnsupportedPointerSize {
		/// Declared pointer width.
		size: usize,
	},
	/// Requested address range is not covered by any captured region.
	#[error("unmapped read: 0x{addr:016x} (+{len})")]
	UnmappedRead {
		/// First byte address of the read.
		addr: u64,
		/// Requested byte count.
		len: usize,
	},
	/// Two captured regions overlap.
	#[error("overlapping regions at 0x{addr:016x}")]
	OverlappingRegions {
		/// Start address of the later region.
		addr: u64,
	},
	/// Dereference through a null pointer.
	#[error("null pointer dereference in {type_name}")]
	NullPointer {
		/// Pointer type name.
		type_name: String,
	},
	/// Value type has no member with the requested name.
	#[error("missing member {member} on {type_name}")]
	MissingMember {
		/// Struct type name.
		type_name: String,
		/// Requested member name.
		member: String,
	},
	/// Structural child index past the end of a struct or array.
	#[error("child index {index} out of range for {type_name}")]
	ChildIndexOutOfRange {
		/// Parent type name.
		type_name: String,
		/// Requested child index.
		index: usize,
	},
	/// Operation needs a pointer or array value.
	#[error("expected pointer-like value, got {type_name}")]
	NotPointer {
		/// Actual type name.
		type_name: String,
	},
	/// Operation needs a scalar value of at most eight bytes.
	#[error("expected scalar value, got {type_name}")]
	NotScalar {
		/// Actual type name.
		type_name: String,
	},
	/// Value was materialized from fewer bytes than its type needs.
	#[error("value data too short for {type_name}: need={need}, have={have}")]
	DataTooShort {
		/// Type being materialized.
		type_name: String,
		/// Required number of bytes.
		need: usize,
		/// Available bytes.
		have: usize,
	},
	/// Tree traversal ran out of structural hops before finishing a step.
	#[error("traversal step budget exhausted (limit={limit})")]
	StepBudgetExhausted {
		/// Hops the traversal was allowed.
		limit: usize,
	},
	/// Type name is not present in the catalog.
	#[error("type not found: {name}")]
	TypeNotFound {
		/// Requested type name.
		name: String,
	},
	/// Type name defined twice in a catalog.
	#[error("duplicate type definition: {name}")]
	DuplicateType {
		/// Duplicated type name.
		name: String,
	},
	/// Type definition nests into itself without indirection.
	#[error("recursive type definition: {name}")]
	RecursiveType {
		/// Offending type name.
		name: String,
	},
	/// Container type carries no template arguments to take an element type from.
	#[error("no template arguments on {type_name}")]
	NoTemplateArguments {
		/// Container type name.
		type_name: String,
	},
	/// Type name is not a well-formed template signature.
	#[error("invalid type signature: {name}")]
	InvalidTypeSignature {
		/// Offending type name.
		name: String,
	},
	/// Address literal could not be parsed.
	#[error("invalid address literal: {value}")]
	InvalidAddressLiteral {
		/// User-provided literal.
		value: String,
	},
	/// Named snapshot root was not found.
	#[error("root not found: {name}")]
	RootNotFound {
		/// Requested root name.
		name: String,
	},
}
