//! Type registry
//!
//! Maps type descriptors back to constructors so a decoder can allocate the
//! concrete runtime type of every node. Types deriving `Reflectable` submit a
//! [`TypeRegistration`] at link time; [`TypeRegistry::discovered`] collects them.

use crate::handle::ObjectRef;
use crate::reflect::ReflectableType;
use std::collections::HashMap;
use std::fmt;

/// Constructor entry for one reflectable type
#[derive(Clone, Copy)]
pub struct TypeRegistration {
	type_name: &'static str,
	construct: fn() -> ObjectRef,
}

fn construct_default<T: ReflectableType>() -> ObjectRef {
	ObjectRef::new(T::default())
}

impl TypeRegistration {
	/// Registration for `T`, usable in `const` context.
	pub const fn of<T: ReflectableType>() -> Self {
		Self {
			type_name: T::TYPE_NAME,
			construct: construct_default::<T>,
		}
	}

	pub const fn type_name(&self) -> &'static str {
		self.type_name
	}

	/// Allocate a default-valued instance.
	pub fn construct(&self) -> ObjectRef {
		(self.construct)()
	}
}

impl fmt::Debug for TypeRegistration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeRegistration")
			.field("type_name", &self.type_name)
			.finish_non_exhaustive()
	}
}

inventory::collect!(TypeRegistration);

/// Type descriptor to constructor map
///
/// Registries are built once and then shared read-only (codecs hold an
/// `Arc<TypeRegistry>`).
///
/// # Examples
///
/// ```
/// use stowage_core::TypeRegistry;
/// # use stowage_core::{FieldDescriptor, FieldValue, Reflectable, ReflectableType, ReflectResult};
/// # #[derive(Default)]
/// # struct Trigger;
/// # impl Reflectable for Trigger {
/// #     fn type_name(&self) -> &'static str { Self::TYPE_NAME }
/// #     fn field_descriptors(&self) -> &'static [FieldDescriptor] { Self::FIELDS }
/// #     fn get_field_value(&self, _: &str) -> ReflectResult<FieldValue> { Ok(FieldValue::Null) }
/// #     fn set_field_value(&mut self, _: &str, _: FieldValue) -> ReflectResult<()> { Ok(()) }
/// # }
/// # impl ReflectableType for Trigger {
/// #     const TYPE_NAME: &'static str = "jobs.Trigger";
/// #     const FIELDS: &'static [FieldDescriptor] = &[];
/// # }
///
/// let registry = TypeRegistry::new().with::<Trigger>();
///
/// assert!(registry.contains("jobs.Trigger"));
/// let fresh = registry.construct("jobs.Trigger").unwrap();
/// assert_eq!(fresh.type_name(), "jobs.Trigger");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
	types: HashMap<&'static str, TypeRegistration>,
}

impl TypeRegistry {
	/// Create an empty registry
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry holding every type submitted at link time
	///
	/// When two types submit the same descriptor the first one seen wins and
	/// a warning is logged.
	pub fn discovered() -> Self {
		let mut registry = Self::new();
		for registration in inventory::iter::<TypeRegistration> {
			if registry.types.contains_key(registration.type_name) {
				tracing::warn!(
					type_name = registration.type_name,
					"Duplicate type registration ignored"
				);
				continue;
			}
			registry.types.insert(registration.type_name, *registration);
		}
		tracing::debug!(count = registry.len(), "Discovered reflectable types");
		registry
	}

	/// Add a registration, replacing any previous one with the same name.
	pub fn insert(&mut self, registration: TypeRegistration) {
		if self
			.types
			.insert(registration.type_name, registration)
			.is_some()
		{
			tracing::warn!(
				type_name = registration.type_name,
				"Type registration replaced"
			);
		}
	}

	pub fn register<T: ReflectableType>(&mut self) -> &mut Self {
		self.insert(TypeRegistration::of::<T>());
		self
	}

	/// Builder form of [`register`](Self::register)
	pub fn with<T: ReflectableType>(mut self) -> Self {
		self.register::<T>();
		self
	}

	pub fn contains(&self, type_name: &str) -> bool {
		self.types.contains_key(type_name)
	}

	pub fn get(&self, type_name: &str) -> Option<&TypeRegistration> {
		self.types.get(type_name)
	}

	/// Allocate a default instance of the named type.
	pub fn construct(&self, type_name: &str) -> Option<ObjectRef> {
		self.get(type_name).map(TypeRegistration::construct)
	}

	pub fn len(&self) -> usize {
		self.types.len()
	}

	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}

	/// Registered descriptors in sorted order.
	pub fn type_names(&self) -> Vec<&'static str> {
		let mut names: Vec<_> = self.types.keys().copied().collect();
		names.sort_unstable();
		names
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::{ReflectError, ReflectResult};
	use crate::reflect::{FieldDescriptor, Reflectable};
	use crate::value::FieldValue;
	use rstest::rstest;

	macro_rules! empty_type {
		($name:ident, $descriptor:literal) => {
			#[derive(Default)]
			struct $name;

			impl Reflectable for $name {
				fn type_name(&self) -> &'static str {
					Self::TYPE_NAME
				}

				fn field_descriptors(&self) -> &'static [FieldDescriptor] {
					Self::FIELDS
				}

				fn get_field_value(&self, name: &str) -> ReflectResult<FieldValue> {
					Err(ReflectError::UnknownField {
						type_name: Self::TYPE_NAME.to_string(),
						field: name.to_string(),
					})
				}

				fn set_field_value(&mut self, name: &str, _: FieldValue) -> ReflectResult<()> {
					Err(ReflectError::UnknownField {
						type_name: Self::TYPE_NAME.to_string(),
						field: name.to_string(),
					})
				}
			}

			impl ReflectableType for $name {
				const TYPE_NAME: &'static str = $descriptor;
				const FIELDS: &'static [FieldDescriptor] = &[];
			}
		};
	}

	empty_type!(Alpha, "tests.Alpha");
	empty_type!(Beta, "tests.Beta");
	empty_type!(Submitted, "tests.Submitted");

	inventory::submit! { TypeRegistration::of::<Submitted>() }

	#[rstest]
	fn test_construct_returns_concrete_type() {
		let registry = TypeRegistry::new().with::<Alpha>().with::<Beta>();

		let object = registry.construct("tests.Beta").unwrap();
		assert!(object.is::<Beta>());
		assert!(registry.construct("tests.Gamma").is_none());
	}

	#[rstest]
	fn test_type_names_sorted() {
		let registry = TypeRegistry::new().with::<Beta>().with::<Alpha>();
		assert_eq!(registry.type_names(), ["tests.Alpha", "tests.Beta"]);
		assert_eq!(registry.len(), 2);
	}

	#[rstest]
	fn test_register_same_type_twice_keeps_one_entry() {
		let mut registry = TypeRegistry::new();
		registry.register::<Alpha>().register::<Alpha>();
		assert_eq!(registry.len(), 1);
	}

	#[rstest]
	fn test_discovered_includes_submitted_types() {
		let registry = TypeRegistry::discovered();
		assert!(registry.contains("tests.Submitted"));
	}
}
