//! # Stowage
//!
//! Pluggable, reference-preserving object-graph serialization for durable job
//! stores.
//!
//! A scheduler persists job data, triggers and state snapshots as opaque byte
//! blobs and rebuilds them later, possibly in another process. Stowage keeps
//! enough type and identity information that the rebuilt graph is equivalent
//! to the original:
//!
//! - a member declared as a type-erased handle comes back holding the same
//!   concrete type
//! - two members pointing at the same object still point at one object
//! - cycles are restored as cycles
//!
//! ## Crates
//!
//! - [`stowage_core`]: reflection traits, shared handles, field values and the
//!   type registry (re-exported at the root and in [`model`])
//! - [`stowage_codec`]: serializers, strategies and settings (re-exported at
//!   the root and in [`codec`])
//! - `stowage_macros`: `#[derive(Reflectable)]`
//!
//! ## Quick Example
//!
//! ```rust
//! use std::sync::Arc;
//! use stowage::prelude::*;
//!
//! #[derive(Default, Reflectable)]
//! #[reflect(type_name = "jobs.Reminder")]
//! struct Reminder {
//!     message: String,
//!     follow_up: Option<ObjectRef>,
//! }
//!
//! let serializer = SerializerSettings::default()
//!     .build(Arc::new(TypeRegistry::discovered()))
//!     .unwrap();
//!
//! let reminder = Typed::new(Reminder {
//!     message: "renew certificates".to_string(),
//!     follow_up: None,
//! });
//! reminder.write().follow_up = Some(reminder.as_object());
//!
//! let bytes = serializer.serialize(&reminder).unwrap();
//! let restored: Typed<Reminder> = serializer.deserialize(&bytes).unwrap();
//!
//! let follow_up = restored.read().follow_up.clone().unwrap();
//! assert!(follow_up.ptr_eq(&restored.as_object()));
//! # restored.write().follow_up = None;
//! # reminder.write().follow_up = None;
//! ```

pub mod codec;
pub mod model;

pub use stowage_codec::{
	BoxError, CodecError, CodecResult, DEFAULT_MAX_DEPTH, GraphCodec, MAX_DOCUMENT_DEPTH,
	ObjectSerializer, ObjectSerializerExt, RootRef, SerializerSettings, StrategyKind, TreeCodec,
	WireFormat,
};
pub use stowage_core::{
	FieldAccess, FieldDescriptor, FieldSelectionPolicy, FieldValue, ObjectRef, Record,
	RecordField, ReflectError, ReflectResult, ReflectValue, Reflectable, ReflectableType,
	TypeRegistration, TypeRegistry, Typed, WeakRef, apply_fields, capture_record, restore_record,
};
pub use stowage_macros::Reflectable;

#[doc(hidden)]
pub use stowage_core::__private;

/// Items needed to define persistable types and (de)serialize them
pub mod prelude {
	pub use crate::{
		CodecError, CodecResult, FieldValue, ObjectRef, ObjectSerializer, ObjectSerializerExt,
		Reflectable, SerializerSettings, TypeRegistry, Typed, WeakRef,
	};
}
