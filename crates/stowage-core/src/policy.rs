//! Member selection

use crate::reflect::{FieldAccess, FieldDescriptor};

/// Decides which members of an object take part in serialization
///
/// With `include_only_read_write_fields` on (the default) only members that
/// can be both read and assigned are written. Turning it off also writes
/// read-only members; they are still never assigned when reading back.
///
/// # Examples
///
/// ```
/// use stowage_core::{FieldDescriptor, FieldSelectionPolicy};
///
/// let policy = FieldSelectionPolicy::default();
/// assert!(policy.includes(&FieldDescriptor::read_write("name")));
/// assert!(!policy.includes(&FieldDescriptor::read_only("length")));
///
/// let all = FieldSelectionPolicy::new(false);
/// assert!(all.includes(&FieldDescriptor::read_only("length")));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelectionPolicy {
	include_only_read_write_fields: bool,
}

impl FieldSelectionPolicy {
	pub const fn new(include_only_read_write_fields: bool) -> Self {
		Self {
			include_only_read_write_fields,
		}
	}

	pub const fn include_only_read_write_fields(&self) -> bool {
		self.include_only_read_write_fields
	}

	pub fn includes(&self, descriptor: &FieldDescriptor) -> bool {
		self.includes_access(descriptor.access())
	}

	pub fn includes_access(&self, access: FieldAccess) -> bool {
		!self.include_only_read_write_fields || access.is_writable()
	}
}

impl Default for FieldSelectionPolicy {
	fn default() -> Self {
		Self::new(true)
	}
}
