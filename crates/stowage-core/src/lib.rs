//! # stowage-core
//!
//! Object model shared by every stowage serialization strategy.
//!
//! This crate knows nothing about bytes. It describes *what* a persistable
//! object graph looks like so that a codec can walk it and rebuild it:
//!
//! - **Reflection**: [`Reflectable`] exposes members by name, [`ReflectableType`]
//!   carries the static type descriptor and field table (usually generated by
//!   `#[derive(Reflectable)]`)
//! - **Handles**: [`ObjectRef`], [`WeakRef`] and [`Typed`] give graph nodes a
//!   stable identity so aliasing and cycles survive a round trip
//! - **Values**: [`FieldValue`] is the dynamic representation exchanged with
//!   codecs, [`ReflectValue`] converts Rust types to and from it
//! - **Policy**: [`FieldSelectionPolicy`] decides which members participate
//! - **Registry**: [`TypeRegistry`] resolves type descriptors back to constructors
//!
//! ## Example
//!
//! ```
//! use stowage_core::{FieldValue, ObjectRef, ReflectValue};
//!
//! let value = Some(42_u32).to_field_value().unwrap();
//! assert_eq!(value, FieldValue::Unsigned(42));
//!
//! let restored: Option<u32> = ReflectValue::from_field_value(value).unwrap();
//! assert_eq!(restored, Some(42));
//! ```

// Generated code refers to this crate as `::stowage_core`, which must also
// resolve from inside the crate itself.
extern crate self as stowage_core;

mod convert;
pub mod error;
pub mod handle;
pub mod policy;
pub mod record;
pub mod reflect;
pub mod registry;
pub mod value;

pub use error::{ReflectError, ReflectResult};
pub use handle::{ObjectRef, Typed, WeakRef};
pub use policy::FieldSelectionPolicy;
pub use record::{apply_fields, capture_record, restore_record};
pub use reflect::{FieldAccess, FieldDescriptor, ReflectValue, Reflectable, ReflectableType};
pub use registry::{TypeRegistration, TypeRegistry};
pub use value::{FieldValue, Record, RecordField};

#[doc(hidden)]
pub mod __private {
	pub use inventory;
}
