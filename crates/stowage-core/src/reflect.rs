//! Reflection traits
//!
//! A persistable type exposes its members by name through [`Reflectable`] and
//! publishes a static descriptor table through [`ReflectableType`]. Both are
//! normally generated by `#[derive(Reflectable)]`; hand-written impls are
//! supported for types that need custom member handling.

use crate::error::ReflectResult;
use crate::value::FieldValue;

/// Whether a member can be assigned after construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldAccess {
	/// Readable and assignable
	ReadWrite,
	/// Readable only (computed members, members marked `readonly`)
	ReadOnly,
}

impl FieldAccess {
	pub fn is_writable(self) -> bool {
		matches!(self, FieldAccess::ReadWrite)
	}
}

/// Static description of one member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
	name: &'static str,
	access: FieldAccess,
}

impl FieldDescriptor {
	/// Describe an assignable member
	///
	/// # Examples
	///
	/// ```
	/// use stowage_core::{FieldAccess, FieldDescriptor};
	///
	/// const NAME: FieldDescriptor = FieldDescriptor::read_write("name");
	/// assert_eq!(NAME.name(), "name");
	/// assert_eq!(NAME.access(), FieldAccess::ReadWrite);
	/// ```
	pub const fn read_write(name: &'static str) -> Self {
		Self {
			name,
			access: FieldAccess::ReadWrite,
		}
	}

	/// Describe a member that can only be read
	pub const fn read_only(name: &'static str) -> Self {
		Self {
			name,
			access: FieldAccess::ReadOnly,
		}
	}

	pub const fn name(&self) -> &'static str {
		self.name
	}

	pub const fn access(&self) -> FieldAccess {
		self.access
	}

	pub const fn is_writable(&self) -> bool {
		matches!(self.access, FieldAccess::ReadWrite)
	}
}

/// Object-safe member access
///
/// Implementors are the nodes of a persistable object graph. `type_name`
/// returns the descriptor of the *concrete* type, which is what a codec
/// records, whatever handle the instance is reached through.
pub trait Reflectable: Send + Sync + 'static {
	/// Registered name of the concrete type.
	fn type_name(&self) -> &'static str;

	/// Every member of the type, in declaration order.
	fn field_descriptors(&self) -> &'static [FieldDescriptor];

	/// Read a member by name.
	fn get_field_value(&self, name: &str) -> ReflectResult<FieldValue>;

	/// Assign a member by name.
	///
	/// Read-only members reject assignment with
	/// [`ReflectError::ReadOnlyField`](crate::ReflectError::ReadOnlyField).
	fn set_field_value(&mut self, name: &str, value: FieldValue) -> ReflectResult<()>;
}

/// Static side of [`Reflectable`]
///
/// Needed to construct fresh instances during reconstruction, hence the
/// `Default` bound.
pub trait ReflectableType: Reflectable + Default + Sized {
	const TYPE_NAME: &'static str;
	const FIELDS: &'static [FieldDescriptor];
}

/// Conversion between a Rust value and a [`FieldValue`]
///
/// # Examples
///
/// ```
/// use stowage_core::{FieldValue, ReflectValue};
///
/// let value = vec![1_i32, 2, 3].to_field_value().unwrap();
/// let restored = Vec::<i64>::from_field_value(value).unwrap();
/// assert_eq!(restored, vec![1, 2, 3]);
///
/// assert!(u8::from_field_value(FieldValue::Integer(256)).is_err());
/// ```
pub trait ReflectValue: Sized {
	fn to_field_value(&self) -> ReflectResult<FieldValue>;

	fn from_field_value(value: FieldValue) -> ReflectResult<Self>;
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(FieldDescriptor::read_write("a"), true)]
	#[case(FieldDescriptor::read_only("b"), false)]
	fn test_descriptor_writability(#[case] descriptor: FieldDescriptor, #[case] writable: bool) {
		assert_eq!(descriptor.is_writable(), writable);
		assert_eq!(descriptor.access().is_writable(), writable);
	}
}
