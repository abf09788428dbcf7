use tracing::{debug, warn};

use crate::qt::bytes::ptr_bytes;
use crate::qt::decoder::child_name;
use crate::qt::resolve::{MAP_NODE_TEMPLATE, map_node_type};
use crate::qt::tagged::split_tagged_ptr;
use crate::qt::{QtError, Result, SyntheticChildren, TypeHandle, ValueHandle};

/// Ceiling on hops a single successor step may take, whatever size the map reports.
pub const DEFAULT_MAX_TRAVERSAL_STEPS: usize = 1 << 20;

/// Hop counter bounding one successor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepBudget {
	limit: usize,
	spent: usize,
}

impl StepBudget {
	/// Budget allowing `limit` structural hops.
	pub fn new(limit: usize) -> Self {
		Self { limit, spent: 0 }
	}

	/// Consume one hop; the hop that reaches the limit fails.
	pub fn hop(&mut self) -> Result<()> {
		self.spent = self.spent.saturating_add(1);
		if self.spent >= self.limit {
			return Err(QtError::StepBudgetExhausted { limit: self.limit });
		}
		Ok(())
	}

	/// Hops consumed so far.
	pub fn spent(&self) -> usize {
		self.spent
	}

	/// Hops still available.
	pub fn remaining(&self) -> usize {
		self.limit.saturating_sub(self.spent)
	}
}

/// Parent of `node`, with the tag bits packed into the `p` field masked off.
pub fn parent_of<H: ValueHandle>(node: &H) -> Result<H> {
	let raw = node.member("p")?.as_unsigned()?;
	let (address, _tag) = split_tagged_ptr(raw);
	node.from_data("parent", ptr_bytes(address, node.pointer_size()), &node.type_handle())
}

/// In-order successor of `node` in a parent-linked binary search tree.
///
/// Every descend or ascend consumes one hop from `budget`.
pub fn successor<H: ValueHandle>(node: &H, budget: &mut StepBudget) -> Result<H> {
	let right = node.member("right")?;
	if right.as_unsigned()? != 0 {
		budget.hop()?;
		let mut x = right;
		loop {
			let left = x.member("left")?;
			if left.as_unsigned()? == 0 {
				return Ok(x);
			}
			budget.hop()?;
			x = left;
		}
	}

	let mut x = node.clone();
	budget.hop()?;
	let mut y = parent_of(&x)?;
	while x.as_unsigned()? == y.member("right")?.as_unsigned()? {
		budget.hop()?;
		let next = parent_of(&y)?;
		x = std::mem::replace(&mut y, next);
	}

	if x.member("right")?.as_unsigned()? != y.as_unsigned()? {
		x = y;
	}
	Ok(x)
}

fn same_node<H: ValueHandle>(left: &H, right: &H) -> bool {
	matches!((left.as_unsigned(), right.as_unsigned()), (Ok(a), Ok(b)) if a == b)
}

/// Children of a tree-backed ordered map (`QMap<K, V>`), in key order.
///
/// Child lookups walk forward from the cached leftmost node, resuming from the last
/// visited node when indices are requested in increasing order. A step that exceeds its
/// hop budget marks the instance corrupted until the next [`SyntheticChildren::update`].
#[derive(Debug, Clone)]
pub struct MapDecoder<H: ValueHandle> {
	value: H,
	node_template: String,
	max_traversal_steps: usize,
	layout: Option<MapLayout<H>>,
	cursor: Option<(usize, H)>,
	corrupted: bool,
}

#[derive(Debug, Clone)]
struct MapLayout<H: ValueHandle> {
	root: H,
	leftmost: H,
	node_type: H::Type,
	size: usize,
}

impl<H: ValueHandle> MapDecoder<H> {
	/// Wrap a container value with the default node template and traversal ceiling.
	pub fn new(value: H) -> Self {
		Self::with_options(value, MAP_NODE_TEMPLATE, DEFAULT_MAX_TRAVERSAL_STEPS)
	}

	/// Wrap a container value with an explicit node template name and traversal ceiling.
	pub fn with_options(value: H, node_template: &str, max_traversal_steps: usize) -> Self {
		Self {
			value,
			node_template: node_template.to_owned(),
			max_traversal_steps,
			layout: None,
			cursor: None,
			corrupted: false,
		}
	}

	/// Container value being decoded.
	pub fn value(&self) -> &H {
		&self.value
	}

	/// Whether a traversal ran out of budget since the last update.
	pub fn is_corrupted(&self) -> bool {
		self.corrupted
	}

	/// Tree root recorded in the header (`d.header.left`).
	pub fn root(&self) -> Option<&H> {
		self.layout.as_ref().map(|layout| &layout.root)
	}

	/// Resolved node type name.
	pub fn node_type_name(&self) -> Option<&str> {
		self.layout.as_ref().map(|layout| layout.node_type.name())
	}

	fn mark_corrupted(&mut self) {
		self.corrupted = true;
		self.cursor = None;
	}

	fn resolve(&self) -> Result<MapLayout<H>> {
		let data = self.value.member("d")?;
		let size = data.member("size")?.as_unsigned()? as usize;
		let root = data.member("header")?.member("left")?;
		let leftmost = data.member("mostLeftNode")?;
		let node_type = map_node_type(&self.value, &self.node_template)?;
		Ok(MapLayout {
			root,
			leftmost,
			node_type,
			size,
		})
	}
}

impl<H: ValueHandle> SyntheticChildren<H> for MapDecoder<H> {
	fn update(&mut self) {
		self.corrupted = false;
		self.cursor = None;
		self.layout = match self.resolve() {
			Ok(layout) => Some(layout),
			Err(err) => {
				debug!(value = self.value.name(), %err, "map layout unresolved");
				None
			}
		};
	}

	fn num_children(&self) -> usize {
		self.layout.as_ref().map_or(0, |layout| layout.size)
	}

	fn child_at_index(&mut self, index: usize) -> Option<H> {
		if self.corrupted {
			return None;
		}
		let layout = self.layout.as_ref()?;
		if index >= layout.size {
			return None;
		}

		let (mut at, mut node) = match &self.cursor {
			Some((at, node)) if *at <= index => (*at, node.clone()),
			_ => (0, layout.leftmost.clone()),
		};

		let limit = layout.size.min(self.max_traversal_steps);
		while at < index {
			let mut budget = StepBudget::new(limit);
			let next = match successor(&node, &mut budget) {
				Ok(next) => next,
				Err(QtError::StepBudgetExhausted { limit }) => {
					warn!(value = self.value.name(), index = at, limit, "map traversal exceeded step budget; treating tree as corrupted");
					self.mark_corrupted();
					return None;
				}
				Err(err) => {
					debug!(value = self.value.name(), index = at, %err, "map successor unreadable");
					return None;
				}
			};
			// A step that lands where it started can only come from a looping link.
			if same_node(&node, &next) {
				warn!(value = self.value.name(), index = at, "map successor made no progress; treating tree as corrupted");
				self.mark_corrupted();
				return None;
			}
			node = next;
			at += 1;
		}
		self.cursor = Some((index, node.clone()));

		let decoded = node
			.read_pointee(0, layout.node_type.byte_size())
			.and_then(|data| node.from_data(&child_name(index), data, &layout.node_type));
		match decoded {
			Ok(child) => Some(child),
			Err(err) => {
				debug!(value = self.value.name(), index, %err, "map node unreadable");
				None
			}
		}
	}
}
