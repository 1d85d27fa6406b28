//! Dynamic member values
//!
//! [`FieldValue`] is what a [`Reflectable`](crate::Reflectable) hands to a codec
//! and what a codec hands back. Reference-typed members carry live handles so
//! the codec can see node identity; everything else is plain data.

use crate::reflect::FieldAccess;
use crate::{ObjectRef, WeakRef};
use std::collections::BTreeMap;

/// Dynamic value of a single member
///
/// Equality on [`FieldValue::Reference`] and [`FieldValue::WeakReference`] is
/// identity equality, not content equality.
///
/// # Examples
///
/// ```
/// use stowage_core::FieldValue;
///
/// let value = FieldValue::Array(vec![FieldValue::Integer(1), FieldValue::Null]);
/// assert_eq!(value.kind(), "array");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
	/// Absent value
	#[default]
	Null,
	/// Boolean value
	Boolean(bool),
	/// Signed integer
	Integer(i64),
	/// Unsigned integer
	Unsigned(u64),
	/// Floating point value
	Float(f64),
	/// String value
	String(String),
	/// Ordered sequence
	Array(Vec<FieldValue>),
	/// String-keyed map
	Object(BTreeMap<String, FieldValue>),
	/// Inline struct value without identity
	Record(Record),
	/// Shared object (a graph edge)
	Reference(ObjectRef),
	/// Non-owning back edge
	WeakReference(WeakRef),
}

impl FieldValue {
	/// Short name of the value's shape, used in error messages.
	pub fn kind(&self) -> &'static str {
		match self {
			FieldValue::Null => "null",
			FieldValue::Boolean(_) => "boolean",
			FieldValue::Integer(_) => "integer",
			FieldValue::Unsigned(_) => "unsigned integer",
			FieldValue::Float(_) => "float",
			FieldValue::String(_) => "string",
			FieldValue::Array(_) => "array",
			FieldValue::Object(_) => "object",
			FieldValue::Record(_) => "record",
			FieldValue::Reference(_) => "reference",
			FieldValue::WeakReference(_) => "weak reference",
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, FieldValue::Null)
	}

	/// The referenced object, if this is a live strong or weak reference.
	pub fn as_reference(&self) -> Option<ObjectRef> {
		match self {
			FieldValue::Reference(object) => Some(object.clone()),
			FieldValue::WeakReference(weak) => weak.upgrade(),
			_ => None,
		}
	}
}

/// Inline struct value
///
/// Records are nested by value: they have a type descriptor but no identity,
/// so two equal records are never aliased.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
	type_name: String,
	fields: Vec<RecordField>,
}

/// One member of a [`Record`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
	pub name: String,
	pub access: FieldAccess,
	pub value: FieldValue,
}

impl Record {
	/// Create an empty record for the given type descriptor
	///
	/// # Examples
	///
	/// ```
	/// use stowage_core::{FieldAccess, FieldValue, Record};
	///
	/// let mut record = Record::new("jobs.Window");
	/// record.push("minutes", FieldAccess::ReadWrite, FieldValue::Unsigned(15));
	///
	/// assert_eq!(record.type_name(), "jobs.Window");
	/// assert_eq!(record.get("minutes"), Some(&FieldValue::Unsigned(15)));
	/// ```
	pub fn new(type_name: impl Into<String>) -> Self {
		Self {
			type_name: type_name.into(),
			fields: Vec::new(),
		}
	}

	pub fn push(&mut self, name: impl Into<String>, access: FieldAccess, value: FieldValue) {
		self.fields.push(RecordField {
			name: name.into(),
			access,
			value,
		});
	}

	pub fn type_name(&self) -> &str {
		&self.type_name
	}

	pub fn fields(&self) -> &[RecordField] {
		&self.fields
	}

	pub fn get(&self, name: &str) -> Option<&FieldValue> {
		self.fields
			.iter()
			.find(|field| field.name == name)
			.map(|field| &field.value)
	}

	pub fn into_fields(self) -> Vec<RecordField> {
		self.fields
	}
}
