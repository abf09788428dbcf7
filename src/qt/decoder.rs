use crate::qt::ValueHandle;

/// Lazily evaluated child view over one container instance.
///
/// Every method is safe to call before [`update`](Self::update) has succeeded; an
/// unresolved decoder reports zero children and no values.
pub trait SyntheticChildren<H: ValueHandle> {
	/// Re-resolve layout state from target memory.
	fn update(&mut self);

	/// Number of logical elements.
	fn num_children(&self) -> usize;

	/// Element at `index`, or `None` when out of bounds or undecodable.
	fn child_at_index(&mut self, index: usize) -> Option<H>;

	/// Index of a child spelled `[n]`.
	fn child_index(&self, name: &str) -> Option<usize> {
		parse_child_name(name)
	}

	/// Whether the view may have children at all.
	fn has_children(&self) -> bool {
		true
	}
}

/// Display name of the child at `index`.
pub fn child_name(index: usize) -> String {
	format!("[{index}]")
}

/// Parse a `[n]` child name back into its index.
pub fn parse_child_name(name: &str) -> Option<usize> {
	name.trim_start_matches('[').trim_end_matches(']').trim().parse().ok()
}

/// Summary line shown for sequence and map containers.
pub fn size_summary(count: usize) -> String {
	format!("size={count}")
}
