use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::qt::{QtError, Result};

/// Index into a [`TypeCatalog`].
pub type TypeId = u32;

const MAX_ARRAY_NESTING: u32 = 32;

/// Serialized type declaration; references other types by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSpec {
	/// Type name as the target spells it.
	pub name: String,
	/// Shape of the type.
	#[serde(flatten)]
	pub kind: TypeSpecKind,
}

/// Serialized type shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeSpecKind {
	/// Opaque scalar of a fixed size.
	Primitive {
		/// Byte size.
		size: usize,
	},
	/// Pointer to `target`.
	Pointer {
		/// Pointed-to type name.
		target: String,
	},
	/// Reference to `target`.
	Reference {
		/// Referenced type name.
		target: String,
	},
	/// Fixed-length inline array.
	Array {
		/// Element type name.
		element: String,
		/// Element count.
		len: usize,
	},
	/// Aggregate with explicit field offsets.
	Struct {
		/// Byte size including padding.
		size: usize,
		/// Fields in declaration order.
		#[serde(default)]
		fields: Vec<FieldSpec>,
		/// Template argument type names.
		#[serde(default, skip_serializing_if = "Vec::is_empty")]
		template_args: Vec<String>,
	},
}

/// Serialized struct field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
	/// Field identifier.
	pub name: String,
	/// Field type name.
	#[serde(rename = "type")]
	pub type_name: String,
	/// Byte offset from the start of the struct.
	pub offset: usize,
}

impl TypeSpec {
	/// Declare a primitive.
	pub fn primitive(name: &str, size: usize) -> Self {
		Self {
			name: name.to_owned(),
			kind: TypeSpecKind::Primitive { size },
		}
	}

	/// Declare a pointer type.
	pub fn pointer(name: &str, target: &str) -> Self {
		Self {
			name: name.to_owned(),
			kind: TypeSpecKind::Pointer { target: target.to_owned() },
		}
	}

	/// Declare a reference type.
	pub fn reference(name: &str, target: &str) -> Self {
		Self {
			name: name.to_owned(),
			kind: TypeSpecKind::Reference { target: target.to_owned() },
		}
	}

	/// Declare an inline array type.
	pub fn array(name: &str, element: &str, len: usize) -> Self {
		Self {
			name: name.to_owned(),
			kind: TypeSpecKind::Array {
				element: element.to_owned(),
				len,
			},
		}
	}

	/// Declare a struct from `(name, type, offset)` triples.
	pub fn structure(name: &str, size: usize, fields: &[(&str, &str, usize)]) -> Self {
		Self {
			name: name.to_owned(),
			kind: TypeSpecKind::Struct {
				size,
				fields: fields
					.iter()
					.map(|(field, type_name, offset)| FieldSpec {
						name: (*field).to_owned(),
						type_name: (*type_name).to_owned(),
						offset: *offset,
					})
					.collect(),
				template_args: Vec::new(),
			},
		}
	}

	/// Attach template arguments to a struct declaration.
	pub fn with_template_args(mut self, args: &[&str]) -> Self {
		if let TypeSpecKind::Struct { template_args, .. } = &mut self.kind {
			*template_args = args.iter().map(|arg| (*arg).to_owned()).collect();
		}
		self
	}
}

/// Resolved type table of one target.
#[derive(Debug)]
pub struct TypeCatalog {
	pointer_size: usize,
	types: Vec<TypeInfo>,
	by_name: HashMap<Box<str>, TypeId>,
}

/// Resolved type entry.
#[derive(Debug, Clone)]
pub struct TypeInfo {
	/// Type name.
	pub name: Box<str>,
	/// Byte size of one instance.
	pub size: usize,
	/// Resolved shape.
	pub kind: TypeKind,
}

/// Resolved type shape with id references.
#[derive(Debug, Clone)]
pub enum TypeKind {
	/// Opaque scalar.
	Primitive,
	/// Pointer to `target`.
	Pointer {
		/// Pointed-to type.
		target: TypeId,
	},
	/// Reference to `target`.
	Reference {
		/// Referenced type.
		target: TypeId,
	},
	/// Inline array.
	Array {
		/// Element type.
		element: TypeId,
		/// Element count.
		len: usize,
	},
	/// Aggregate.
	Struct {
		/// Fields in declaration order.
		fields: Vec<FieldInfo>,
		/// Template argument types.
		template_args: Vec<TypeId>,
	},
}

/// Resolved struct field.
#[derive(Debug, Clone)]
pub struct FieldInfo {
	/// Field identifier.
	pub name: Box<str>,
	/// Field type.
	pub ty: TypeId,
	/// Byte offset in the parent struct.
	pub offset: usize,
}

impl TypeCatalog {
	/// Resolve declarations into a catalog for a target with `pointer_size` pointers.
	pub fn from_specs(pointer_size: usize, specs: &[TypeSpec]) -> Result<Self> {
		if !matches!(pointer_size, 4 | 8) {
			return Err(QtError::UnsupportedPointerSize { size: pointer_size });
		}

		let mut by_name = HashMap::with_capacity(specs.len());
		for (idx, spec) in specs.iter().enumerate() {
			if by_name.insert(spec.name.clone().into_boxed_str(), idx as TypeId).is_some() {
				return Err(QtError::DuplicateType { name: spec.name.clone() });
			}
		}

		let lookup = |name: &str| {
			by_name
				.get(name)
				.copied()
				.ok_or_else(|| QtError::TypeNotFound { name: name.to_owned() })
		};

		let mut kinds = Vec::with_capacity(specs.len());
		for spec in specs {
			let kind = match &spec.kind {
				TypeSpecKind::Primitive { .. } => TypeKind::Primitive,
				TypeSpecKind::Pointer { target } => TypeKind::Pointer { target: lookup(target)? },
				TypeSpecKind::Reference { target } => TypeKind::Reference { target: lookup(target)? },
				TypeSpecKind::Array { element, len } => TypeKind::Array {
					element: lookup(element)?,
					len: *len,
				},
				TypeSpecKind::Struct { fields, template_args, .. } => TypeKind::Struct {
					fields: fields
						.iter()
						.map(|field| -> Result<FieldInfo> {
							Ok(FieldInfo {
								name: field.name.clone().into_boxed_str(),
								ty: lookup(&field.type_name)?,
								offset: field.offset,
							})
						})
						.collect::<Result<Vec<_>>>()?,
					template_args: template_args.iter().map(|arg| lookup(arg)).collect::<Result<Vec<_>>>()?,
				},
			};
			kinds.push(kind);
		}

		let mut types = Vec::with_capacity(specs.len());
		for (spec, kind) in specs.iter().zip(kinds.iter()) {
			types.push(TypeInfo {
				name: spec.name.clone().into_boxed_str(),
				size: spec_size(specs, &kinds, pointer_size, spec, kind, 0)?,
				kind: kind.clone(),
			});
		}

		Ok(Self {
			pointer_size,
			types,
			by_name,
		})
	}

	/// Look up type entry by id.
	pub fn get(&self, id: TypeId) -> Option<&TypeInfo> {
		self.types.get(id as usize)
	}

	/// Look up type id by name.
	pub fn find(&self, name: &str) -> Option<TypeId> {
		self.by_name.get(name).copied()
	}

	/// Return type name by id.
	pub fn type_name(&self, id: TypeId) -> &str {
		self.get(id).map(|item| item.name.as_ref()).unwrap_or("<unknown>")
	}

	/// Return byte size by id.
	pub fn type_size(&self, id: TypeId) -> usize {
		self.get(id).map(|item| item.size).unwrap_or(0)
	}

	/// Target pointer width in bytes.
	pub fn pointer_size(&self) -> usize {
		self.pointer_size
	}

	/// Return number of types.
	pub fn len(&self) -> usize {
		self.types.len()
	}

	/// Return whether the catalog is empty.
	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}
}

fn spec_size(specs: &[TypeSpec], kinds: &[TypeKind], pointer_size: usize, spec: &TypeSpec, kind: &TypeKind, depth: u32) -> Result<usize> {
	match (&spec.kind, kind) {
		(TypeSpecKind::Primitive { size }, _) | (TypeSpecKind::Struct { size, .. }, _) => Ok(*size),
		(TypeSpecKind::Pointer { .. }, _) | (TypeSpecKind::Reference { .. }, _) => Ok(pointer_size),
		(TypeSpecKind::Array { .. }, TypeKind::Array { element, len }) => {
			if depth >= MAX_ARRAY_NESTING {
				return Err(QtError::RecursiveType { name: spec.name.clone() });
			}
			let idx = *element as usize;
			let element_size = spec_size(specs, kinds, pointer_size, &specs[idx], &kinds[idx], depth + 1)?;
			Ok(element_size.saturating_mul(*len))
		}
		(TypeSpecKind::Array { .. }, _) => Ok(0),
	}
}

#[cfg(test)]
mod tests {
	use super::{TypeCatalog, TypeKind, TypeSpec};

	#[test]
	fn resolves_names_and_sizes() {
		let catalog = TypeCatalog::from_specs(
			8,
			&[
				TypeSpec::primitive("int", 4),
				TypeSpec::pointer("int*", "int"),
				TypeSpec::array("int*[3]", "int*", 3),
				TypeSpec::structure("Holder<int>", 32, &[("items", "int*[3]", 0), ("count", "int", 24)]).with_template_args(&["int"]),
				TypeSpec::reference("Holder<int>&", "Holder<int>"),
			],
		)
		.expect("catalog builds");

		let holder = catalog.find("Holder<int>").expect("holder declared");
		assert_eq!(catalog.type_size(holder), 32);
		assert_eq!(catalog.type_size(catalog.find("int*[3]").expect("array declared")), 24);
		assert_eq!(catalog.type_size(catalog.find("Holder<int>&").expect("reference declared")), 8);

		let info = catalog.get(holder).expect("holder entry");
		let TypeKind::Struct { fields, template_args } = &info.kind else {
			panic!("expected struct kind");
		};
		assert_eq!(fields[1].offset, 24);
		assert_eq!(catalog.type_name(template_args[0]), "int");
	}

	#[test]
	fn unknown_reference_is_an_error() {
		let result = TypeCatalog::from_specs(8, &[TypeSpec::pointer("Foo*", "Foo")]);
		assert!(result.is_err());
	}

	#[test]
	fn duplicate_names_are_rejected() {
		let result = TypeCatalog::from_specs(8, &[TypeSpec::primitive("int", 4), TypeSpec::primitive("int", 4)]);
		assert!(result.is_err());
	}

	#[test]
	fn odd_pointer_width_is_rejected() {
		assert!(TypeCatalog::from_specs(6, &[]).is_err());
	}
}
