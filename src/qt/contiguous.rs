use tracing::debug;

use crate::qt::decoder::child_name;
use crate::qt::resolve::element_type;
use crate::qt::{Result, SyntheticChildren, TypeHandle, ValueHandle};

/// Children of a contiguous-storage sequence (`QVector<T>`).
///
/// Elements sit back to back `offset` bytes past the start of the shared data header `d`.
#[derive(Debug, Clone)]
pub struct VectorDecoder<H: ValueHandle> {
	value: H,
	layout: Option<VectorLayout<H>>,
}

#[derive(Debug, Clone)]
struct VectorLayout<H: ValueHandle> {
	data: H,
	element_type: H::Type,
	element_size: u64,
	size: usize,
	offset: u64,
}

impl<H: ValueHandle> VectorDecoder<H> {
	/// Wrap a container value; call [`SyntheticChildren::update`] before reading children.
	pub fn new(value: H) -> Self {
		Self { value, layout: None }
	}

	/// Container value being decoded.
	pub fn value(&self) -> &H {
		&self.value
	}

	fn resolve(&self) -> Result<VectorLayout<H>> {
		let data = self.value.member("d")?;
		let element_type = element_type(&self.value)?;
		let element_size = element_type.byte_size() as u64;
		let size = data.member("size")?.as_unsigned()? as usize;
		let offset = data.member("offset")?.as_unsigned()?;
		Ok(VectorLayout {
			data,
			element_type,
			element_size,
			size,
			offset,
		})
	}
}

impl<H: ValueHandle> SyntheticChildren<H> for VectorDecoder<H> {
	fn update(&mut self) {
		self.layout = match self.resolve() {
			Ok(layout) => Some(layout),
			Err(err) => {
				debug!(value = self.value.name(), %err, "vector layout unresolved");
				None
			}
		};
	}

	fn num_children(&self) -> usize {
		self.layout.as_ref().map_or(0, |layout| layout.size)
	}

	fn child_at_index(&mut self, index: usize) -> Option<H> {
		let layout = self.layout.as_ref()?;
		if index >= layout.size {
			return None;
		}

		let offset = (index as u64).checked_mul(layout.element_size)?.checked_add(layout.offset)?;
		match layout.data.child_at_offset(&child_name(index), offset, &layout.element_type) {
			Ok(child) => Some(child),
			Err(err) => {
				debug!(value = self.value.name(), index, %err, "vector element unreadable");
				None
			}
		}
	}
}
