use crate::qt::{QtError, Result};

/// Parse decimal or `0x`-prefixed hex address literal.
pub fn parse_addr(value: &str) -> Result<u64> {
	let trimmed = value.trim();
	let parsed = if let Some(stripped) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
		u64::from_str_radix(stripped, 16)
	} else {
		trimmed.parse::<u64>()
	};

	parsed.map_err(|_| QtError::InvalidAddressLiteral { value: value.to_owned() })
}

/// Render an address as a fixed-width hex literal.
pub fn format_addr(value: u64) -> String {
	format!("0x{value:016x}")
}

/// Encode bytes as lowercase hex.
pub fn encode_hex(bytes: &[u8]) -> String {
	const DIGITS: &[u8; 16] = b"0123456789abcdef";
	let mut out = String::with_capacity(bytes.len() * 2);
	for byte in bytes {
		out.push(char::from(DIGITS[usize::from(byte >> 4)]));
		out.push(char::from(DIGITS[usize::from(byte & 0x0f)]));
	}
	out
}

/// Decode hex text, ignoring ASCII whitespace between digit pairs.
pub fn decode_hex(text: &str) -> Option<Vec<u8>> {
	let digits: Vec<u8> = text.bytes().filter(|byte| !byte.is_ascii_whitespace()).collect();
	if digits.len() % 2 != 0 {
		return None;
	}

	digits
		.chunks_exact(2)
		.map(|pair| {
			let hi = char::from(pair[0]).to_digit(16)?;
			let lo = char::from(pair[1]).to_digit(16)?;
			Some(((hi << 4) | lo) as u8)
		})
		.collect()
}

/// Serde adapter storing addresses as hex literal strings.
pub mod addr_literal {
	use serde::{Deserialize, Deserializer, Serializer};

	/// Serialize as `0x...`.
	pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&super::format_addr(*value))
	}

	/// Deserialize from a hex or decimal literal.
	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
		let text = String::deserialize(deserializer)?;
		super::parse_addr(&text).map_err(serde::de::Error::custom)
	}
}

/// Serde adapter storing byte payloads as hex strings.
pub mod hex_bytes {
	use serde::{Deserialize, Deserializer, Serializer};

	/// Serialize as lowercase hex.
	pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&super::encode_hex(value))
	}

	/// Deserialize from hex text.
	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
		let text = String::deserialize(deserializer)?;
		super::decode_hex(&text).ok_or_else(|| serde::de::Error::custom("invalid hex payload"))
	}
}

#[cfg(test)]
mod tests {
	use super::{decode_hex, encode_hex, format_addr, parse_addr};

	#[test]
	fn addresses_parse_hex_and_decimal() {
		assert_eq!(parse_addr("0x10").expect("hex"), 16);
		assert_eq!(parse_addr("0X1f").expect("hex upper prefix"), 31);
		assert_eq!(parse_addr("4096").expect("decimal"), 4096);
		assert!(parse_addr("0xzz").is_err());
		assert_eq!(format_addr(0x1000), "0x0000000000001000");
	}

	#[test]
	fn hex_payload_tolerates_whitespace() {
		assert_eq!(decode_hex("01 ff\n7a").expect("decodes"), vec![0x01, 0xff, 0x7a]);
		assert_eq!(encode_hex(&[0x01, 0xff, 0x7a]), "01ff7a");
		assert!(decode_hex("abc").is_none());
		assert!(decode_hex("zz").is_none());
	}
}
