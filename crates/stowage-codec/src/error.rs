//! Codec error taxonomy

use stowage_core::ReflectError;
use thiserror::Error;

/// Boxed error carried as a source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by [`ObjectSerializer`](crate::ObjectSerializer) implementations
///
/// Every failure is reported as one of these variants; a failed call never
/// yields a partially built object.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CodecError {
	/// A required input was absent.
	#[error("Invalid argument: {message}")]
	InvalidArgument { message: String },

	/// A reachable value cannot be represented or reconstructed.
	#[error("Unsupported type '{type_name}': {reason}")]
	UnsupportedType { type_name: String, reason: String },

	/// The wire encoder failed.
	#[error("Serialization failed: {message}")]
	SerializationFailure {
		message: String,
		#[source]
		source: Option<BoxError>,
	},

	/// Input bytes are not a valid serialized graph.
	#[error("Malformed data: {reason}")]
	MalformedData { reason: String },

	/// A type descriptor names no registered type.
	#[error("Cannot resolve type '{type_name}'")]
	UnresolvableType { type_name: String },

	/// The reconstructed value is not of the requested type.
	#[error("Type mismatch: expected '{expected}', found '{found}'")]
	TypeMismatch { expected: String, found: String },

	/// The tree strategy met an object that is its own ancestor.
	#[error("Cyclic reference through '{type_name}' cannot be written as a tree")]
	CyclicReference { type_name: String },

	/// Nesting exceeded the configured object limit or the document
	/// nesting limit.
	#[error("Maximum nesting depth {max_depth} exceeded")]
	MaxDepthExceeded { max_depth: usize },

	/// Codec configuration is invalid.
	#[error("Invalid settings: {message}")]
	InvalidSettings { message: String },
}

/// Result type alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

impl CodecError {
	pub fn malformed(reason: impl Into<String>) -> Self {
		CodecError::MalformedData {
			reason: reason.into(),
		}
	}

	pub fn serialization_failure(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
		CodecError::SerializationFailure {
			message: message.into(),
			source: Some(source.into()),
		}
	}

	/// Map a member error raised while rebuilding a graph.
	///
	/// Type mismatches keep their meaning, everything else means the bytes
	/// describe a value the target cannot hold.
	pub(crate) fn from_decode_reflect(err: ReflectError) -> Self {
		match err.root_cause() {
			ReflectError::TypeMismatch { expected, found } => CodecError::TypeMismatch {
				expected: expected.clone(),
				found: found.clone(),
			},
			_ => CodecError::MalformedData {
				reason: err.to_string(),
			},
		}
	}

	/// Map a member error raised while reading a graph.
	pub(crate) fn from_encode_reflect(err: ReflectError) -> Self {
		CodecError::SerializationFailure {
			message: err.to_string(),
			source: Some(Box::new(err)),
		}
	}
}
