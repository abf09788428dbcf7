use std::path::Path;

use qtdecode::qt::{FormatterConfig, FormatterRegistry, Result};
use tracing::debug;

/// Registry from `--config`, or the built-in Qt 5 rules.
pub(crate) fn load_registry(config: Option<&Path>) -> Result<FormatterRegistry> {
	let config = match config {
		Some(path) => {
			debug!(path = %path.display(), "loading formatter config");
			FormatterConfig::load(path)?
		}
		None => FormatterConfig::default(),
	};
	Ok(FormatterRegistry::new(config))
}

/// Render scalar bytes using the conventional C++ meaning of `type_name`.
pub(crate) fn format_scalar(type_name: &str, bytes: &[u8]) -> Option<String> {
	let mut wide = [0_u8; 8];
	let len = bytes.len();
	if !(1..=8).contains(&len) {
		return None;
	}
	wide[..len].copy_from_slice(bytes);
	let unsigned = u64::from_le_bytes(wide);

	let text = match type_name {
		"double" if len == 8 => f64::from_le_bytes(wide).to_string(),
		"float" if len == 4 => f32::from_bits(unsigned as u32).to_string(),
		"bool" => (unsigned != 0).to_string(),
		"char" | "signed char" | "short" | "int" | "long" | "long long" | "qint8" | "qint16" | "qint32" | "qint64" | "qptrdiff" => {
			let shift = 64 - 8 * len as u32;
			(((unsigned << shift) as i64) >> shift).to_string()
		}
		_ => unsigned.to_string(),
	};
	Some(text)
}

#[cfg(test)]
mod tests {
	use super::format_scalar;

	#[test]
	fn signed_types_sign_extend() {
		assert_eq!(format_scalar("int", &(-3_i32).to_le_bytes()).as_deref(), Some("-3"));
		assert_eq!(format_scalar("uint", &u32::MAX.to_le_bytes()).as_deref(), Some("4294967295"));
		assert_eq!(format_scalar("double", &2.5_f64.to_le_bytes()).as_deref(), Some("2.5"));
		assert_eq!(format_scalar("void", &[]), None);
	}
}
