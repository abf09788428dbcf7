use serde::{Deserialize, Serialize};

use crate::qt::literal::{addr_literal, hex_bytes};
use crate::qt::{QtError, Result};

/// One captured range of target memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
	/// Load address of the first byte.
	#[serde(rename = "address", with = "addr_literal")]
	pub start: u64,
	/// Captured bytes.
	#[serde(with = "hex_bytes")]
	pub bytes: Vec<u8>,
}

impl Region {
	/// Create a zero-filled region.
	pub fn zeroed(start: u64, len: usize) -> Self {
		Self {
			start,
			bytes: vec![0; len],
		}
	}

	/// Exclusive end address.
	pub fn end(&self) -> u64 {
		self.start.saturating_add(self.bytes.len() as u64)
	}

	/// Whether `[addr, addr + len)` lies inside this region.
	pub fn contains(&self, addr: u64, len: usize) -> bool {
		addr >= self.start && addr.checked_add(len as u64).is_some_and(|end| end <= self.end())
	}

	/// Overwrite bytes at absolute address `addr`.
	pub fn write(&mut self, addr: u64, bytes: &[u8]) -> Result<()> {
		if !self.contains(addr, bytes.len()) {
			return Err(QtError::UnmappedRead { addr, len: bytes.len() });
		}
		let start = (addr - self.start) as usize;
		self.bytes[start..start + bytes.len()].copy_from_slice(bytes);
		Ok(())
	}
}

/// Read-only address-range index over captured regions.
#[derive(Debug, Default)]
pub struct MemoryImage {
	starts: Vec<u64>,
	regions: Vec<Region>,
}

impl MemoryImage {
	/// Build a sorted index, rejecting overlapping regions.
	pub fn from_regions(mut regions: Vec<Region>) -> Result<Self> {
		regions.retain(|region| !region.bytes.is_empty());
		regions.sort_by_key(|region| region.start);
		for pair in regions.windows(2) {
			if pair[1].start < pair[0].end() {
				return Err(QtError::OverlappingRegions { addr: pair[1].start });
			}
		}

		let starts = regions.iter().map(|region| region.start).collect();
		Ok(Self { starts, regions })
	}

	/// Borrow `len` bytes at `addr`; the range must fall inside one region.
	pub fn read(&self, addr: u64, len: usize) -> Result<&[u8]> {
		let unmapped = || QtError::UnmappedRead { addr, len };
		let idx = self.starts.partition_point(|start| *start <= addr);
		if idx == 0 {
			return Err(unmapped());
		}

		let region = &self.regions[idx - 1];
		if !region.contains(addr, len) {
			return Err(unmapped());
		}

		let start = (addr - region.start) as usize;
		Ok(&region.bytes[start..start + len])
	}

	/// Return all regions in address order.
	pub fn regions(&self) -> &[Region] {
		&self.regions
	}

	/// Total captured bytes.
	pub fn total_bytes(&self) -> usize {
		self.regions.iter().map(|region| region.bytes.len()).sum()
	}

	/// Return number of regions.
	pub fn len(&self) -> usize {
		self.regions.len()
	}

	/// Return whether no region was captured.
	pub fn is_empty(&self) -> bool {
		self.regions.is_empty()
	}
}
