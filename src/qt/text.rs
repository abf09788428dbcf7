use tracing::debug;

use crate::qt::handle::MAX_STRING_SUMMARY_SETTING;
use crate::qt::{Result, ValueHandle};

/// Summary length used when the host exposes no setting.
pub const DEFAULT_MAX_STRING_LEN: usize = 512;

const CHUNK_UNITS: usize = 256;
const UNIT_SIZE: u64 = 2;

/// Decode up to `max_len` UTF-16 code units from the pointee of `data`, starting at code
/// unit `offset` and stopping at the first zero unit. The result is double-quoted.
///
/// Unreadable memory ends the scan early; whatever was read before it is kept.
pub fn decode_utf16<H: ValueHandle>(data: &H, offset: u64, max_len: usize) -> String {
	let mut units = Vec::new();

	'scan: while units.len() < max_len {
		let start = offset.saturating_add(units.len() as u64);
		let want = CHUNK_UNITS.min(max_len - units.len());
		let chunk = match read_units(data, start, want) {
			Ok(chunk) => chunk,
			Err(err) => {
				debug!(value = data.name(), %err, "text chunk unreadable; scanning unit by unit");
				read_units_until_failure(data, start, want)
			}
		};

		let complete = chunk.len() == want;
		for unit in chunk {
			if unit == 0 {
				break 'scan;
			}
			units.push(unit);
		}
		if !complete {
			break;
		}
	}

	let text: String = char::decode_utf16(units).map(|item| item.unwrap_or(char::REPLACEMENT_CHARACTER)).collect();
	format!("\"{text}\"")
}

/// Quoted text of a `QString`-shaped value whose `d` header records a byte `offset`.
pub fn string_summary<H: ValueHandle>(value: &H, fallback_max_len: usize) -> String {
	let max_len = max_string_len(value, fallback_max_len);
	let header = value.member("d").and_then(|data| {
		let offset = data.member("offset")?.as_unsigned()?;
		Ok((data, offset / UNIT_SIZE))
	});

	match header {
		Ok((data, offset)) => decode_utf16(&data, offset, max_len),
		Err(err) => {
			debug!(value = value.name(), %err, "string header unresolved");
			"\"\"".to_owned()
		}
	}
}

/// Host-configured summary length, or `fallback` when unset or unparsable.
pub fn max_string_len<H: ValueHandle>(value: &H, fallback: usize) -> usize {
	value
		.host_setting(MAX_STRING_SUMMARY_SETTING)
		.and_then(|raw| raw.trim().parse().ok())
		.unwrap_or(fallback)
}

fn read_units<H: ValueHandle>(data: &H, start: u64, count: usize) -> Result<Vec<u16>> {
	let raw = data.read_pointee(start.saturating_mul(UNIT_SIZE), count * UNIT_SIZE as usize)?;
	Ok(raw.chunks_exact(2).map(|pair| u16::from_le_bytes([pair[0], pair[1]])).collect())
}

fn read_units_until_failure<H: ValueHandle>(data: &H, start: u64, count: usize) -> Vec<u16> {
	let mut out = Vec::new();
	for idx in 0..count as u64 {
		match read_units(data, start + idx, 1) {
			Ok(unit) => out.extend(unit),
			Err(_) => break,
		}
	}
	out
}
