use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::qt::compression::{decode_bytes, encode_zstd};
use crate::qt::literal::addr_literal;
use crate::qt::{Compression, ImageValue, MemoryImage, QtError, Region, Result, TypeCatalog, TypeSpec};

/// On-disk snapshot document: type table, captured memory, and named roots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotFile {
	/// Target pointer width in bytes.
	pub pointer_size: usize,
	/// Host settings visible to formatters.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub settings: BTreeMap<String, String>,
	/// Type declarations.
	pub types: Vec<TypeSpec>,
	/// Captured memory.
	#[serde(default)]
	pub regions: Vec<Region>,
	/// Named values to inspect.
	#[serde(default)]
	pub roots: Vec<RootSpec>,
}

/// Named value in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootSpec {
	/// Variable name.
	pub name: String,
	/// Declared type name.
	#[serde(rename = "type")]
	pub type_name: String,
	/// Load address of the value.
	#[serde(with = "addr_literal")]
	pub address: u64,
}

impl SnapshotFile {
	/// Overwrite captured bytes at `addr`.
	pub fn write_bytes(&mut self, addr: u64, bytes: &[u8]) -> Result<()> {
		let region = self
			.regions
			.iter_mut()
			.find(|region| region.contains(addr, bytes.len()))
			.ok_or(QtError::UnmappedRead { addr, len: bytes.len() })?;
		region.write(addr, bytes)
	}

	/// Overwrite a pointer-sized field at `addr`.
	pub fn write_ptr(&mut self, addr: u64, value: u64) -> Result<()> {
		let bytes = crate::qt::bytes::ptr_bytes(value, self.pointer_size);
		self.write_bytes(addr, &bytes)
	}

	/// Serialize as pretty JSON, optionally zstd-compressed.
	pub fn to_bytes(&self, compression: Compression) -> Result<Vec<u8>> {
		let json = serde_json::to_vec_pretty(self)?;
		match compression {
			Compression::None => Ok(json),
			Compression::Zstd => encode_zstd(&json),
		}
	}
}

/// Loaded snapshot with resolved types and indexed memory.
#[derive(Debug)]
pub struct TargetImage {
	/// Resolved type table.
	pub catalog: TypeCatalog,
	/// Indexed memory regions.
	pub memory: MemoryImage,
	/// Host settings.
	pub settings: BTreeMap<String, String>,
	/// Named roots.
	pub roots: Vec<RootSpec>,
	/// Compression the source file used.
	pub compression: Compression,
}

impl TargetImage {
	/// Read, decompress, and resolve a snapshot file.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let raw = fs::read(path)?;
		let (compression, bytes) = decode_bytes(raw)?;
		let file: SnapshotFile = serde_json::from_slice(&bytes)?;
		let mut image = Self::from_snapshot(file)?;
		image.compression = compression;
		Ok(image)
	}

	/// Resolve an in-memory snapshot document.
	pub fn from_snapshot(file: SnapshotFile) -> Result<Self> {
		let catalog = TypeCatalog::from_specs(file.pointer_size, &file.types)?;
		for root in &file.roots {
			if catalog.find(&root.type_name).is_none() {
				return Err(QtError::TypeNotFound {
					name: root.type_name.clone(),
				});
			}
		}

		Ok(Self {
			catalog,
			memory: MemoryImage::from_regions(file.regions)?,
			settings: file.settings,
			roots: file.roots,
			compression: Compression::None,
		})
	}

	/// Value handle for the named root.
	pub fn root(&self, name: &str) -> Result<ImageValue<'_>> {
		let root = self
			.roots
			.iter()
			.find(|root| root.name == name)
			.ok_or_else(|| QtError::RootNotFound { name: name.to_owned() })?;
		self.value_at(&root.name, &root.type_name, root.address)
	}

	/// Value handle of `type_name` at `address`.
	pub fn value_at(&self, name: &str, type_name: &str, address: u64) -> Result<ImageValue<'_>> {
		let ty = self.catalog.find(type_name).ok_or_else(|| QtError::TypeNotFound {
			name: type_name.to_owned(),
		})?;
		Ok(ImageValue::at_address(self, name, ty, address))
	}

	/// Target pointer width in bytes.
	pub fn pointer_size(&self) -> usize {
		self.catalog.pointer_size()
	}
}

#[cfg(test)]
mod tests {
	use super::{RootSpec, SnapshotFile, TargetImage};
	use crate::qt::{Compression, Region, TypeSpec};

	fn sample() -> SnapshotFile {
		let mut region = Region::zeroed(0x1000, 8);
		region.write(0x1000, &7_u32.to_le_bytes()).expect("write fits");
		SnapshotFile {
			pointer_size: 8,
			types: vec![TypeSpec::primitive("int", 4), TypeSpec::structure("Pair", 8, &[("a", "int", 0), ("b", "int", 4)])],
			regions: vec![region],
			roots: vec![RootSpec {
				name: "pair".to_owned(),
				type_name: "Pair".to_owned(),
				address: 0x1000,
			}],
			..SnapshotFile::default()
		}
	}

	#[test]
	fn json_document_round_trips_through_loader() {
		let json = sample().to_bytes(Compression::None).expect("serializes");
		let text = String::from_utf8(json.clone()).expect("utf8 json");
		assert!(text.contains("\"address\": \"0x0000000000001000\""));
		assert!(text.contains("\"kind\": \"struct\""));

		let file: SnapshotFile = serde_json::from_slice(&json).expect("deserializes");
		let image = TargetImage::from_snapshot(file).expect("image loads");
		assert_eq!(image.roots.len(), 1);
		assert_eq!(image.memory.len(), 1);
		assert!(image.root("pair").is_ok());
		assert!(image.root("missing").is_err());
	}

	#[test]
	fn roots_must_name_known_types() {
		let mut file = sample();
		file.roots[0].type_name = "Nope".to_owned();
		assert!(TargetImage::from_snapshot(file).is_err());
	}

	#[test]
	fn write_ptr_targets_covering_region() {
		let mut file = sample();
		file.write_ptr(0x1000, 0xdead_beef).expect("write fits");
		assert_eq!(&file.regions[0].bytes[..4], &0xdead_beef_u32.to_le_bytes());
		assert!(file.write_ptr(0x1004, 1).is_err(), "pointer would straddle region end");
	}
}
