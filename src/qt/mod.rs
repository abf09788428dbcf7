mod builder;
mod bytes;
mod catalog;
mod compression;
mod contiguous;
mod decoder;
mod error;
mod handle;
mod image;
mod indirect;
mod literal;
mod memory;
mod ordered_map;
mod registry;
mod resolve;
mod signature;
mod tagged;
mod text;
mod value;

/// Synthetic Qt 5 snapshot construction.
pub use builder::{ARRAY_HEADER_SIZE, Object, SnapshotBuilder};
/// Little-endian cursor used by handle implementations.
pub use bytes::{Cursor, ptr_bytes};
/// Target type table and its serialized declarations.
pub use catalog::{FieldInfo, FieldSpec, TypeCatalog, TypeId, TypeInfo, TypeKind, TypeSpec, TypeSpecKind};
/// Snapshot compression detection.
pub use compression::Compression;
/// Contiguous sequence decoder.
pub use contiguous::VectorDecoder;
/// Synthetic-children contract and child naming helpers.
pub use decoder::{SyntheticChildren, child_name, parse_child_name, size_summary};
/// Error and result aliases.
pub use error::{QtError, Result};
/// Host abstraction over foreign memory.
pub use handle::{MAX_STRING_SUMMARY_SETTING, TypeHandle, ValueHandle};
/// Snapshot documents and loaded images.
pub use image::{RootSpec, SnapshotFile, TargetImage};
/// Indirect sequence decoder.
pub use indirect::ListDecoder;
/// Address and hex literal helpers.
pub use literal::{format_addr, parse_addr};
/// Captured memory regions.
pub use memory::{MemoryImage, Region};
/// Ordered map decoder and its bounded traversal primitives.
pub use ordered_map::{DEFAULT_MAX_TRAVERSAL_STEPS, MapDecoder, StepBudget, parent_of, successor};
/// Type-name classification and decoder dispatch.
pub use registry::{ContainerDecoder, ContainerKind, FormatterConfig, FormatterRegistry, FormatterRule};
/// Container type resolution.
pub use resolve::{MAP_NODE_TEMPLATE, container_type, element_type, map_node_type, map_node_type_name};
/// Template type-name parsing.
pub use signature::TypeSignature;
/// Tagged parent pointer accessors.
pub use tagged::{TAG_MASK, join_tagged_ptr, split_tagged_ptr};
/// UTF-16 text decoding.
pub use text::{DEFAULT_MAX_STRING_LEN, decode_utf16, max_string_len, string_summary};
/// Reference host over a loaded image.
pub use value::{ImageType, ImageValue};
