//! The object serializer capability
//!
//! [`ObjectSerializer`] is the object-safe interface a storage layer holds
//! (usually as `Arc<dyn ObjectSerializer>`). [`ObjectSerializerExt`] adds the
//! typed `serialize` / `deserialize` pair on top of it.

use crate::error::{CodecError, CodecResult};
use crate::format::StrategyKind;
use stowage_core::{ObjectRef, ReflectableType, Typed};

/// Converts object graphs to bytes and back
///
/// Implementations hold no mutable state, so one instance can serve any
/// number of threads at once.
pub trait ObjectSerializer: Send + Sync {
	/// Strategy this serializer writes.
	fn strategy(&self) -> StrategyKind;

	/// Serialize the graph reachable from `root`.
	fn serialize_object(&self, root: &ObjectRef) -> CodecResult<Vec<u8>>;

	/// Rebuild a graph from bytes produced by [`serialize_object`](Self::serialize_object).
	fn deserialize_object(&self, bytes: &[u8]) -> CodecResult<ObjectRef>;
}

/// Root handle types accepted by [`ObjectSerializerExt`]
pub trait RootRef: Sized {
	/// The root object, or `None` when absent.
	fn as_root(&self) -> Option<ObjectRef>;

	/// Convert a rebuilt root into this handle type.
	fn from_root(root: ObjectRef) -> CodecResult<Self>;
}

impl RootRef for ObjectRef {
	fn as_root(&self) -> Option<ObjectRef> {
		Some(self.clone())
	}

	fn from_root(root: ObjectRef) -> CodecResult<Self> {
		Ok(root)
	}
}

impl<T: ReflectableType> RootRef for Typed<T> {
	fn as_root(&self) -> Option<ObjectRef> {
		Some(self.as_object())
	}

	fn from_root(root: ObjectRef) -> CodecResult<Self> {
		root.downcast::<T>().ok_or_else(|| CodecError::TypeMismatch {
			expected: T::TYPE_NAME.to_string(),
			found: root.type_name().to_string(),
		})
	}
}

impl<R: RootRef> RootRef for Option<R> {
	fn as_root(&self) -> Option<ObjectRef> {
		self.as_ref().and_then(RootRef::as_root)
	}

	fn from_root(root: ObjectRef) -> CodecResult<Self> {
		R::from_root(root).map(Some)
	}
}

/// Typed entry points for any [`ObjectSerializer`]
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use stowage_codec::{CodecError, GraphCodec, ObjectSerializerExt};
/// use stowage_core::{ObjectRef, TypeRegistry};
///
/// let codec = GraphCodec::new(Arc::new(TypeRegistry::new()));
/// let err = codec.serialize(&None::<ObjectRef>).unwrap_err();
/// assert!(matches!(err, CodecError::InvalidArgument { .. }));
/// ```
pub trait ObjectSerializerExt: ObjectSerializer {
	/// Serialize the graph rooted at `root`.
	///
	/// Fails with [`CodecError::InvalidArgument`] when the root is absent.
	fn serialize<T: RootRef>(&self, root: &T) -> CodecResult<Vec<u8>> {
		let root = root.as_root().ok_or_else(|| CodecError::InvalidArgument {
			message: "root object must not be None".to_string(),
		})?;
		self.serialize_object(&root)
	}

	/// Rebuild a graph and return its root as `T`.
	///
	/// Fails with [`CodecError::TypeMismatch`] when the root is not a `T`.
	fn deserialize<T: RootRef>(&self, bytes: &[u8]) -> CodecResult<T> {
		let root = self.deserialize_object(bytes)?;
		T::from_root(root)
	}
}

impl<S: ObjectSerializer + ?Sized> ObjectSerializerExt for S {}
