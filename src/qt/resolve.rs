use crate::qt::{QtError, Result, TypeHandle, ValueHandle};

/// Default template name of the map's internal node type.
pub const MAP_NODE_TEMPLATE: &str = "QMapNode";

/// Strip qualifiers and follow a reference to the declared container type.
pub fn container_type<T: TypeHandle>(ty: &T) -> T {
	let ty = ty.unqualified();
	if ty.is_reference() {
		return ty.dereferenced().map(|inner| inner.unqualified()).unwrap_or(ty);
	}
	ty
}

/// Element type of a single-parameter sequence container.
pub fn element_type<H: ValueHandle>(container: &H) -> Result<H::Type> {
	let ty = container_type(&container.type_handle());
	if ty.template_arg_count() == 0 {
		return Err(QtError::NoTemplateArguments {
			type_name: ty.name().to_owned(),
		});
	}
	ty.template_arg(0).ok_or_else(|| QtError::NoTemplateArguments {
		type_name: ty.name().to_owned(),
	})
}

/// Spell the node instantiation for a `key`/`value` map.
///
/// A value type that is itself a template gets a space before the outer `>` so the
/// lookup matches catalogs that record `> >` rather than `>>`.
pub fn map_node_type_name(template: &str, key: &str, value: &str, value_is_template: bool) -> String {
	let close = if value_is_template { " >" } else { ">" };
	format!("{template}<{key}, {value}{close}")
}

/// Resolve the internal node type of a two-parameter map container.
pub fn map_node_type<H: ValueHandle>(container: &H, template: &str) -> Result<H::Type> {
	let ty = container_type(&container.type_handle());
	let no_args = || QtError::NoTemplateArguments {
		type_name: ty.name().to_owned(),
	};
	if ty.template_arg_count() == 0 {
		return Err(no_args());
	}

	let key = ty.template_arg(0).ok_or_else(no_args)?;
	let value = ty.template_arg(1).ok_or_else(no_args)?;
	let name = map_node_type_name(template, key.name(), value.name(), value.template_arg_count() > 0);
	container.find_type(&name).ok_or(QtError::TypeNotFound { name })
}

#[cfg(test)]
mod tests;
