use crate::qt::{QtError, Result};

/// Simple bounded cursor over an immutable little-endian byte slice.
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(QtError::UnexpectedEof {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Read a little-endian `u16`.
	pub fn read_u16_le(&mut self) -> Result<u16> {
		let raw = self.read_exact(2)?;
		let mut buf = [0_u8; 2];
		buf.copy_from_slice(raw);
		Ok(u16::from_le_bytes(buf))
	}

	/// Read a little-endian `u32`.
	pub fn read_u32_le(&mut self) -> Result<u32> {
		let raw = self.read_exact(4)?;
		let mut buf = [0_u8; 4];
		buf.copy_from_slice(raw);
		Ok(u32::from_le_bytes(buf))
	}

	/// Read a little-endian `u64`.
	pub fn read_u64_le(&mut self) -> Result<u64> {
		let raw = self.read_exact(8)?;
		let mut buf = [0_u8; 8];
		buf.copy_from_slice(raw);
		Ok(u64::from_le_bytes(buf))
	}

	/// Read a 1, 2, 4, or 8 byte unsigned integer and widen to `u64`.
	pub fn read_uint_le(&mut self, size: usize) -> Result<u64> {
		match size {
			1 => Ok(u64::from(self.read_exact(1)?[0])),
			2 => Ok(u64::from(self.read_u16_le()?)),
			4 => Ok(u64::from(self.read_u32_le()?)),
			8 => self.read_u64_le(),
			_ => Err(QtError::UnexpectedEof {
				at: self.pos,
				need: size,
				rem: self.remaining(),
			}),
		}
	}

	/// Read a pointer-sized unsigned integer and widen to `u64`.
	pub fn read_ptr(&mut self, pointer_size: usize) -> Result<u64> {
		match pointer_size {
			4 => Ok(u64::from(self.read_u32_le()?)),
			8 => self.read_u64_le(),
			_ => Err(QtError::UnsupportedPointerSize { size: pointer_size }),
		}
	}
}

/// Encode a pointer value as `pointer_size` little-endian bytes.
pub fn ptr_bytes(value: u64, pointer_size: usize) -> Vec<u8> {
	let bytes = value.to_le_bytes();
	bytes[..pointer_size.min(bytes.len())].to_vec()
}

#[cfg(test)]
mod tests {
	use super::{Cursor, ptr_bytes};

	#[test]
	fn cursor_reads_mixed_widths() {
		let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09];
		let mut cursor = Cursor::new(&bytes);
		assert_eq!(cursor.read_uint_le(1).expect("u8"), 0x01);
		assert_eq!(cursor.read_u16_le().expect("u16"), 0x0302);
		assert_eq!(cursor.read_u32_le().expect("u32"), 0x0706_0504);
		assert_eq!(cursor.pos(), 7);
		assert!(cursor.read_u64_le().is_err());
		assert_eq!(cursor.remaining(), 2);
	}

	#[test]
	fn read_ptr_rejects_odd_width() {
		let bytes = [0_u8; 8];
		let mut cursor = Cursor::new(&bytes);
		assert!(cursor.read_ptr(3).is_err());
		assert_eq!(cursor.read_ptr(4).expect("ptr32"), 0);
	}

	#[test]
	fn ptr_bytes_truncates_to_width() {
		assert_eq!(ptr_bytes(0x1122_3344_5566_7788, 4), vec![0x88, 0x77, 0x66, 0x55]);
		assert_eq!(ptr_bytes(0x10, 8).len(), 8);
	}
}
