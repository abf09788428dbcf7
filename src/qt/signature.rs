use std::fmt;

use crate::qt::{QtError, Result};

/// Parsed generic type name: base template name plus its argument spellings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSignature {
	/// Template (or plain type) name without arguments.
	pub base: String,
	/// Trimmed top-level template argument spellings.
	pub args: Vec<String>,
}

impl TypeSignature {
	/// Parse `Name<A, B<C> >` style spellings, ignoring `const` and trailing `&`/`&&`.
	pub fn parse(input: &str) -> Result<Self> {
		let name = strip_qualifiers(input);
		let invalid = || QtError::InvalidTypeSignature { name: input.to_owned() };
		if name.is_empty() {
			return Err(invalid());
		}

		let Some(open) = name.find('<') else {
			if name.contains('>') || name.contains(',') {
				return Err(invalid());
			}
			return Ok(Self {
				base: name.to_owned(),
				args: Vec::new(),
			});
		};

		if !name.ends_with('>') {
			return Err(invalid());
		}

		let base = name[..open].trim_end();
		if base.is_empty() {
			return Err(invalid());
		}

		let inner = &name[open + 1..name.len() - 1];
		let mut args = Vec::new();
		let mut depth = 0_usize;
		let mut start = 0_usize;
		for (idx, ch) in inner.char_indices() {
			match ch {
				'<' | '(' | '[' => depth += 1,
				'>' | ')' | ']' => depth = depth.checked_sub(1).ok_or_else(invalid)?,
				',' if depth == 0 => {
					args.push(inner[start..idx].trim().to_owned());
					start = idx + 1;
				}
				_ => {}
			}
		}
		if depth != 0 {
			return Err(invalid());
		}
		args.push(inner[start..].trim().to_owned());

		if args.iter().any(String::is_empty) {
			return Err(invalid());
		}

		Ok(Self {
			base: base.to_owned(),
			args,
		})
	}

	/// Number of top-level template arguments.
	pub fn arity(&self) -> usize {
		self.args.len()
	}
}

impl fmt::Display for TypeSignature {
	/// Render with the `> >` spacing C++03 compilers emit for nested templates.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.args.is_empty() {
			return f.write_str(&self.base);
		}
		write!(f, "{}<{}", self.base, self.args.join(", "))?;
		let nested = self.args.last().is_some_and(|last| last.ends_with('>'));
		f.write_str(if nested { " >" } else { ">" })
	}
}

fn strip_qualifiers(input: &str) -> &str {
	let mut name = input.trim();
	loop {
		let before = name;
		name = name.trim_end_matches('&').trim_end();
		name = name.strip_prefix("const ").unwrap_or(name).trim();
		name = name.strip_suffix(" const").unwrap_or(name).trim_end();
		if name == before {
			return name;
		}
	}
}
