use std::io::Read;

use crate::qt::{QtError, Result};

const MAX_DECOMPRESSED_BYTES: usize = 512 * 1024 * 1024;
const ZSTD_LEVEL: i32 = 3;
/// zstd frame magic used by compressed snapshot files.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Compression mode detected for a snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
	/// Raw JSON document.
	#[default]
	None,
	/// zstd-compressed JSON document.
	Zstd,
}

impl Compression {
	/// Render compression mode as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Zstd => "zstd",
		}
	}
}

/// Detect and decode compression, returning `(mode, decoded_bytes)`.
pub fn decode_bytes(raw: Vec<u8>) -> Result<(Compression, Vec<u8>)> {
	if looks_like_json(&raw) {
		return Ok((Compression::None, raw));
	}

	if raw.starts_with(&ZSTD_MAGIC) {
		let out = decode_zstd(&raw)?;
		return Ok((Compression::Zstd, out));
	}

	Err(QtError::UnknownMagic { magic: first4(&raw) })
}

/// Compress a snapshot document with zstd.
pub fn encode_zstd(bytes: &[u8]) -> Result<Vec<u8>> {
	Ok(zstd::stream::encode_all(bytes, ZSTD_LEVEL)?)
}

fn decode_zstd(raw: &[u8]) -> Result<Vec<u8>> {
	let mut decoder = zstd::stream::read::Decoder::new(raw)?;
	let mut out = Vec::new();
	let mut buf = [0_u8; 8192];

	loop {
		let read = decoder.read(&mut buf)?;
		if read == 0 {
			break;
		}

		if out.len() + read > MAX_DECOMPRESSED_BYTES {
			return Err(QtError::DecompressedTooLarge { limit: MAX_DECOMPRESSED_BYTES });
		}

		out.extend_from_slice(&buf[..read]);
	}

	if !looks_like_json(&out) {
		return Err(QtError::UnknownMagic { magic: first4(&out) });
	}

	Ok(out)
}

fn looks_like_json(bytes: &[u8]) -> bool {
	bytes.iter().find(|byte| !byte.is_ascii_whitespace()) == Some(&b'{')
}

fn first4(bytes: &[u8]) -> [u8; 4] {
	let mut magic = [0_u8; 4];
	let take = bytes.len().min(4);
	magic[..take].copy_from_slice(&bytes[..take]);
	magic
}

#[cfg(test)]
mod tests {
	use super::{Compression, decode_bytes, encode_zstd};

	#[test]
	fn plain_json_passes_through() {
		let (mode, bytes) = decode_bytes(b"  {\"pointer_size\": 8}".to_vec()).expect("json accepted");
		assert_eq!(mode, Compression::None);
		assert_eq!(bytes.len(), 21);
	}

	#[test]
	fn zstd_frames_are_inflated() {
		let packed = encode_zstd(b"{\"types\": []}").expect("compresses");
		let (mode, bytes) = decode_bytes(packed).expect("zstd accepted");
		assert_eq!(mode, Compression::Zstd);
		assert_eq!(bytes, b"{\"types\": []}");
	}

	#[test]
	fn unknown_magic_is_rejected() {
		assert!(decode_bytes(b"BLENDER".to_vec()).is_err());
		assert!(decode_bytes(Vec::new()).is_err());
	}
}
