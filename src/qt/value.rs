use std::borrow::Cow;
use std::sync::Arc;

use crate::qt::bytes::Cursor;
use crate::qt::catalog::{TypeId, TypeKind};
use crate::qt::{QtError, Result, TargetImage, TypeCatalog, TypeHandle, ValueHandle};

/// Type handle backed by a [`TypeCatalog`].
#[derive(Debug, Clone, Copy)]
pub struct ImageType<'a> {
	catalog: &'a TypeCatalog,
	id: TypeId,
}

impl<'a> ImageType<'a> {
	/// Wrap a catalog entry.
	pub fn new(catalog: &'a TypeCatalog, id: TypeId) -> Self {
		Self { catalog, id }
	}

	/// Catalog id of this type.
	pub fn id(&self) -> TypeId {
		self.id
	}

	/// Resolved shape of this type.
	pub fn kind(&self) -> Option<&'a TypeKind> {
		self.catalog.get(self.id).map(|info| &info.kind)
	}

	fn with_id(&self, id: TypeId) -> Self {
		Self::new(self.catalog, id)
	}
}

impl TypeHandle for ImageType<'_> {
	fn name(&self) -> &str {
		self.catalog.type_name(self.id)
	}

	fn byte_size(&self) -> usize {
		self.catalog.type_size(self.id)
	}

	fn is_reference(&self) -> bool {
		matches!(self.kind(), Some(TypeKind::Reference { .. }))
	}

	fn dereferenced(&self) -> Option<Self> {
		match self.kind()? {
			TypeKind::Reference { target } => Some(self.with_id(*target)),
			_ => None,
		}
	}

	fn unqualified(&self) -> Self {
		let name = self.name();
		let stripped = name.strip_prefix("const ").or_else(|| name.strip_suffix(" const")).unwrap_or(name);
		self.catalog.find(stripped).map(|id| self.with_id(id)).unwrap_or(*self)
	}

	fn template_arg_count(&self) -> usize {
		match self.kind() {
			Some(TypeKind::Struct { template_args, .. }) => template_args.len(),
			_ => 0,
		}
	}

	fn template_arg(&self, index: usize) -> Option<Self> {
		match self.kind()? {
			TypeKind::Struct { template_args, .. } => template_args.get(index).map(|id| self.with_id(*id)),
			_ => None,
		}
	}

	fn pointee_type(&self) -> Option<Self> {
		match self.kind()? {
			TypeKind::Pointer { target } => Some(self.with_id(*target)),
			TypeKind::Array { element, .. } => Some(self.with_id(*element)),
			_ => None,
		}
	}
}

#[derive(Debug, Clone)]
enum Location {
	Memory(u64),
	Data(Arc<[u8]>),
}

/// Value handle over a captured [`TargetImage`].
#[derive(Debug, Clone)]
pub struct ImageValue<'a> {
	image: &'a TargetImage,
	name: Arc<str>,
	ty: TypeId,
	location: Location,
}

impl<'a> ImageValue<'a> {
	/// Value of type `ty` living at `address` in the image.
	pub fn at_address(image: &'a TargetImage, name: &str, ty: TypeId, address: u64) -> Self {
		Self {
			image,
			name: Arc::from(name),
			ty,
			location: Location::Memory(address),
		}
	}

	fn ty_handle(&self) -> ImageType<'a> {
		ImageType::new(&self.image.catalog, self.ty)
	}

	fn kind(&self) -> Result<&'a TypeKind> {
		self.ty_handle().kind().ok_or_else(|| QtError::TypeNotFound {
			name: format!("#{}", self.ty),
		})
	}

	fn type_name(&self) -> String {
		self.image.catalog.type_name(self.ty).to_owned()
	}

	fn with(&self, name: &str, ty: TypeId, location: Location) -> Self {
		Self {
			image: self.image,
			name: Arc::from(name),
			ty,
			location,
		}
	}

	fn bytes(&self) -> Result<Cow<'a, [u8]>> {
		let size = self.image.catalog.type_size(self.ty);
		match &self.location {
			Location::Memory(addr) => Ok(Cow::Borrowed(self.image.memory.read(*addr, size)?)),
			Location::Data(data) => {
				let raw = data.get(..size).ok_or_else(|| QtError::DataTooShort {
					type_name: self.type_name(),
					need: size,
					have: data.len(),
				})?;
				Ok(Cow::Owned(raw.to_vec()))
			}
		}
	}

	/// Location `offset` bytes into this value, sized for `ty`.
	fn sub_location(&self, offset: usize, ty: TypeId) -> Result<Location> {
		match &self.location {
			Location::Memory(addr) => Ok(Location::Memory(addr.wrapping_add(offset as u64))),
			Location::Data(data) => {
				let size = self.image.catalog.type_size(ty);
				let end = offset.saturating_add(size);
				let raw = data.get(offset..end).ok_or_else(|| QtError::DataTooShort {
					type_name: self.image.catalog.type_name(ty).to_owned(),
					need: end,
					have: data.len(),
				})?;
				Ok(Location::Data(Arc::from(raw)))
			}
		}
	}

	/// Pointer value of a pointer or reference, rejecting null.
	fn target_address(&self) -> Result<u64> {
		let bytes = self.bytes()?;
		let ptr = Cursor::new(&bytes).read_ptr(self.image.catalog.pointer_size())?;
		if ptr == 0 {
			return Err(QtError::NullPointer { type_name: self.type_name() });
		}
		Ok(ptr)
	}

	/// Follow one pointer or reference level; other values are returned as-is.
	fn through_indirection(&self) -> Result<Self> {
		match self.kind()? {
			TypeKind::Pointer { target } | TypeKind::Reference { target } => {
				let addr = self.target_address()?;
				Ok(self.with(&self.name, *target, Location::Memory(addr)))
			}
			_ => Ok(self.clone()),
		}
	}
}

impl<'a> ValueHandle for ImageValue<'a> {
	type Type = ImageType<'a>;

	fn name(&self) -> &str {
		&self.name
	}

	fn type_handle(&self) -> ImageType<'a> {
		self.ty_handle()
	}

	fn member(&self, name: &str) -> Result<Self> {
		let base = self.through_indirection()?;
		let missing = || QtError::MissingMember {
			type_name: base.type_name(),
			member: name.to_owned(),
		};
		let TypeKind::Struct { fields, .. } = base.kind()? else {
			return Err(missing());
		};
		let field = fields.iter().find(|field| field.name.as_ref() == name).ok_or_else(missing)?;
		let location = base.sub_location(field.offset, field.ty)?;
		Ok(base.with(name, field.ty, location))
	}

	fn child_at_index(&self, index: usize) -> Result<Self> {
		let out_of_range = || QtError::ChildIndexOutOfRange {
			type_name: self.type_name(),
			index,
		};
		match self.kind()? {
			TypeKind::Struct { fields, .. } => {
				let field = fields.get(index).ok_or_else(out_of_range)?;
				let location = self.sub_location(field.offset, field.ty)?;
				Ok(self.with(&field.name, field.ty, location))
			}
			TypeKind::Array { element, len } => {
				if index >= *len {
					return Err(out_of_range());
				}
				let offset = index.saturating_mul(self.image.catalog.type_size(*element));
				let location = self.sub_location(offset, *element)?;
				Ok(self.with(&format!("[{index}]"), *element, location))
			}
			TypeKind::Pointer { target } if index == 0 => {
				let addr = self.target_address()?;
				Ok(self.with(&format!("*{}", self.name), *target, Location::Memory(addr)))
			}
			_ => Err(out_of_range()),
		}
	}

	fn as_unsigned(&self) -> Result<u64> {
		let size = self.image.catalog.type_size(self.ty);
		let scalar = matches!(self.kind()?, TypeKind::Primitive | TypeKind::Pointer { .. }) && matches!(size, 1 | 2 | 4 | 8);
		if !scalar {
			return Err(QtError::NotScalar { type_name: self.type_name() });
		}
		let bytes = self.bytes()?;
		Cursor::new(&bytes).read_uint_le(size)
	}

	fn data(&self) -> Result<Vec<u8>> {
		Ok(self.bytes()?.into_owned())
	}

	fn address(&self) -> Option<u64> {
		match self.location {
			Location::Memory(addr) => Some(addr),
			Location::Data(_) => None,
		}
	}

	fn read_pointee(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
		match self.kind()? {
			TypeKind::Pointer { .. } => {
				let base = self.target_address()?;
				Ok(self.image.memory.read(base.wrapping_add(offset), len)?.to_vec())
			}
			TypeKind::Array { .. } => match &self.location {
				Location::Memory(addr) => Ok(self.image.memory.read(addr.wrapping_add(offset), len)?.to_vec()),
				Location::Data(data) => {
					let start = usize::try_from(offset).unwrap_or(usize::MAX);
					let end = start.saturating_add(len);
					data.get(start..end).map(<[u8]>::to_vec).ok_or_else(|| QtError::DataTooShort {
						type_name: self.type_name(),
						need: end,
						have: data.len(),
					})
				}
			},
			_ => Err(QtError::NotPointer { type_name: self.type_name() }),
		}
	}

	fn child_at_offset(&self, name: &str, offset: u64, ty: &ImageType<'a>) -> Result<Self> {
		let location = match self.kind()? {
			TypeKind::Pointer { .. } => Location::Memory(self.target_address()?.wrapping_add(offset)),
			_ => {
				let offset = usize::try_from(offset).map_err(|_| QtError::UnmappedRead { addr: offset, len: 0 })?;
				self.sub_location(offset, ty.id())?
			}
		};
		Ok(self.with(name, ty.id(), location))
	}

	fn from_data(&self, name: &str, data: Vec<u8>, ty: &ImageType<'a>) -> Result<Self> {
		let need = ty.byte_size();
		if data.len() < need {
			return Err(QtError::DataTooShort {
				type_name: ty.name().to_owned(),
				need,
				have: data.len(),
			});
		}
		Ok(self.with(name, ty.id(), Location::Data(Arc::from(data))))
	}

	fn find_type(&self, name: &str) -> Option<ImageType<'a>> {
		self.image.catalog.find(name).map(|id| ImageType::new(&self.image.catalog, id))
	}

	fn pointer_size(&self) -> usize {
		self.image.catalog.pointer_size()
	}

	fn host_setting(&self, key: &str) -> Option<String> {
		self.image.settings.get(key).cloned()
	}
}
