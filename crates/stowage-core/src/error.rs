//! Error types for member access and value conversion.

use thiserror::Error;

/// Errors raised while reading, writing or converting object members.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflectError {
	/// The type has no member with this name.
	#[error("Type '{type_name}' has no member named '{field}'")]
	UnknownField { type_name: String, field: String },

	/// The member can be read but not assigned.
	#[error("Member '{field}' of type '{type_name}' is read-only")]
	ReadOnlyField { type_name: String, field: String },

	/// The value has a different shape than the target type expects.
	#[error("Expected {expected} value, found {found}")]
	ValueMismatch {
		expected: &'static str,
		found: &'static str,
	},

	/// A numeric value does not fit into the target type.
	#[error("Value {value} is out of range for {target}")]
	OutOfRange { value: String, target: &'static str },

	/// A reference or record points at an instance of another type.
	#[error("Expected instance of '{expected}', found '{found}'")]
	TypeMismatch { expected: String, found: String },

	/// The value has the right shape but its content cannot be parsed.
	#[error("Invalid {target} value: {message}")]
	InvalidValue {
		target: &'static str,
		message: String,
	},

	/// Wraps an error with the member it occurred in.
	#[error("In member '{field}' of '{type_name}': {source}")]
	InField {
		type_name: String,
		field: String,
		#[source]
		source: Box<ReflectError>,
	},
}

/// Result type alias for reflection operations.
pub type ReflectResult<T> = Result<T, ReflectError>;

impl ReflectError {
	/// Attach the member the error occurred in.
	///
	/// # Examples
	///
	/// ```
	/// use stowage_core::ReflectError;
	///
	/// let err = ReflectError::ValueMismatch { expected: "integer", found: "string" }
	///     .in_field("jobs.Email", "retries");
	/// assert_eq!(
	///     err.to_string(),
	///     "In member 'retries' of 'jobs.Email': Expected integer value, found string"
	/// );
	/// ```
	pub fn in_field(self, type_name: &str, field: &str) -> Self {
		ReflectError::InField {
			type_name: type_name.to_string(),
			field: field.to_string(),
			source: Box::new(self),
		}
	}

	/// The innermost error, skipping member context.
	pub fn root_cause(&self) -> &ReflectError {
		match self {
			ReflectError::InField { source, .. } => source.root_cause(),
			other => other,
		}
	}

	pub(crate) fn mismatch(expected: &'static str, found: &crate::FieldValue) -> Self {
		ReflectError::ValueMismatch {
			expected,
			found: found.kind(),
		}
	}

	pub(crate) fn out_of_range(value: impl ToString, target: &'static str) -> Self {
		ReflectError::OutOfRange {
			value: value.to_string(),
			target,
		}
	}
}
