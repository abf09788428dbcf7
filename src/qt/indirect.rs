use tracing::debug;

use crate::qt::decoder::child_name;
use crate::qt::resolve::element_type;
use crate::qt::{Result, SyntheticChildren, TypeHandle, ValueHandle};

/// Children of an indirect-storage sequence (`QList<T>`).
///
/// Each slot of `d.array` is one pointer wide. Elements that fit in a pointer are stored
/// in the slot itself; larger ones are heap-boxed and the slot points at the box.
#[derive(Debug, Clone)]
pub struct ListDecoder<H: ValueHandle> {
	value: H,
	layout: Option<ListLayout<H>>,
}

#[derive(Debug, Clone)]
struct ListLayout<H: ValueHandle> {
	array: H,
	array_type: H::Type,
	element_type: H::Type,
	element_size: usize,
	pointer_size: usize,
	begin: u64,
	end: u64,
}

impl<H: ValueHandle> ListDecoder<H> {
	/// Wrap a container value; call [`SyntheticChildren::update`] before reading children.
	pub fn new(value: H) -> Self {
		Self { value, layout: None }
	}

	/// Container value being decoded.
	pub fn value(&self) -> &H {
		&self.value
	}

	/// Whether elements are heap-boxed rather than stored in their slots.
	pub fn is_boxed(&self) -> Option<bool> {
		self.layout.as_ref().map(|layout| layout.element_size > layout.pointer_size)
	}

	fn resolve(&self) -> Result<ListLayout<H>> {
		let data = self.value.member("d")?;
		let array = data.member("array")?;
		let array_type = array.type_handle();
		let element_type = element_type(&self.value)?;
		let element_size = element_type.byte_size();
		let begin = data.member("begin")?.as_unsigned()?;
		let end = data.member("end")?.as_unsigned()?;
		Ok(ListLayout {
			pointer_size: self.value.pointer_size(),
			array,
			array_type,
			element_type,
			element_size,
			begin,
			end,
		})
	}

	fn read_slot(layout: &ListLayout<H>, index: usize) -> Result<H> {
		let name = child_name(index);
		let raw = layout.array.pointee_data(index, 1)?;
		let holder = layout.array.from_data("temp", raw, &layout.array_type)?;
		let slot = holder.child_at_index(0)?;
		if layout.element_size > layout.pointer_size {
			return slot.child_at_offset(&name, 0, &layout.element_type);
		}
		slot.from_data(&name, slot.data()?, &layout.element_type)
	}
}

impl<H: ValueHandle> SyntheticChildren<H> for ListDecoder<H> {
	fn update(&mut self) {
		self.layout = match self.resolve() {
			Ok(layout) => Some(layout),
			Err(err) => {
				debug!(value = self.value.name(), %err, "list layout unresolved");
				None
			}
		};
	}

	fn num_children(&self) -> usize {
		self.layout.as_ref().map_or(0, |layout| layout.end.saturating_sub(layout.begin) as usize)
	}

	fn child_at_index(&mut self, index: usize) -> Option<H> {
		if index >= self.num_children() {
			return None;
		}

		let layout = self.layout.as_ref()?;
		match Self::read_slot(layout, index) {
			Ok(child) => Some(child),
			Err(err) => {
				debug!(value = self.value.name(), index, %err, "list element unreadable");
				None
			}
		}
	}
}
