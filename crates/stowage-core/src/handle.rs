//! Shared object handles
//!
//! Graph nodes live behind `Arc<RwLock<_>>`. The allocation address is the
//! node's identity: two handles alias when they point at the same allocation,
//! regardless of content.

use crate::reflect::{Reflectable, ReflectableType};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

type DynNode = RwLock<dyn Reflectable>;
type AnyNode = dyn Any + Send + Sync;

/// Type-erased shared handle to a graph node
///
/// # Examples
///
/// ```
/// use stowage_core::{ObjectRef, Reflectable};
/// # use stowage_core::{FieldDescriptor, FieldValue, ReflectableType, ReflectResult, ReflectError};
/// # #[derive(Default)]
/// # struct Counter { hits: u64 }
/// # impl Reflectable for Counter {
/// #     fn type_name(&self) -> &'static str { Self::TYPE_NAME }
/// #     fn field_descriptors(&self) -> &'static [FieldDescriptor] { Self::FIELDS }
/// #     fn get_field_value(&self, _: &str) -> ReflectResult<FieldValue> { Ok(FieldValue::Unsigned(self.hits)) }
/// #     fn set_field_value(&mut self, _: &str, _: FieldValue) -> ReflectResult<()> { Ok(()) }
/// # }
/// # impl ReflectableType for Counter {
/// #     const TYPE_NAME: &'static str = "Counter";
/// #     const FIELDS: &'static [FieldDescriptor] = &[FieldDescriptor::read_write("hits")];
/// # }
///
/// let a = ObjectRef::new(Counter::default());
/// let b = a.clone();
/// let c = ObjectRef::new(Counter::default());
///
/// assert!(a.ptr_eq(&b));
/// assert!(!a.ptr_eq(&c));
/// assert_eq!(a.type_name(), "Counter");
/// ```
#[derive(Clone)]
pub struct ObjectRef {
	inner: Arc<DynNode>,
	any: Arc<AnyNode>,
	type_name: &'static str,
}

impl ObjectRef {
	/// Allocate a new node
	pub fn new<T: ReflectableType>(value: T) -> Self {
		Self::from_arc(Arc::new(RwLock::new(value)))
	}

	/// Wrap an existing allocation, keeping its identity
	pub fn from_arc<T: ReflectableType>(arc: Arc<RwLock<T>>) -> Self {
		let any: Arc<AnyNode> = arc.clone();
		let inner: Arc<DynNode> = arc;
		Self {
			inner,
			any,
			type_name: T::TYPE_NAME,
		}
	}

	/// Type descriptor of the concrete type behind this handle.
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	pub fn read(&self) -> RwLockReadGuard<'_, dyn Reflectable> {
		self.inner.read()
	}

	pub fn write(&self) -> RwLockWriteGuard<'_, dyn Reflectable> {
		self.inner.write()
	}

	pub fn with<R>(&self, f: impl FnOnce(&dyn Reflectable) -> R) -> R {
		f(&*self.inner.read())
	}

	pub fn with_mut<R>(&self, f: impl FnOnce(&mut dyn Reflectable) -> R) -> R {
		f(&mut *self.inner.write())
	}

	/// Allocation address, stable for the lifetime of the node.
	pub fn identity(&self) -> usize {
		Arc::as_ptr(&self.inner) as *const () as usize
	}

	pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
		self.identity() == other.identity()
	}

	pub fn is<T: ReflectableType>(&self) -> bool {
		self.any.is::<RwLock<T>>()
	}

	/// Recover the statically typed handle, sharing this identity.
	pub fn downcast<T: ReflectableType>(&self) -> Option<Typed<T>> {
		self.any
			.clone()
			.downcast::<RwLock<T>>()
			.ok()
			.map(|arc| Typed { arc })
	}

	pub fn downgrade(&self) -> WeakRef {
		WeakRef {
			inner: Some((Arc::downgrade(&self.inner), Arc::downgrade(&self.any))),
			type_name: self.type_name,
		}
	}

	/// Number of strong handles to this node.
	pub fn strong_count(&self) -> usize {
		Arc::strong_count(&self.inner)
	}
}

impl PartialEq for ObjectRef {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}

impl Eq for ObjectRef {}

impl Hash for ObjectRef {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.identity().hash(state);
	}
}

impl fmt::Debug for ObjectRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ObjectRef")
			.field("type_name", &self.type_name)
			.field("identity", &format_args!("{:#x}", self.identity()))
			.finish()
	}
}

/// Non-owning handle to a graph node
///
/// Used for back edges (child to parent) so that ownership stays acyclic.
/// A default `WeakRef` is dangling.
#[derive(Clone, Default)]
pub struct WeakRef {
	inner: Option<(Weak<DynNode>, Weak<AnyNode>)>,
	type_name: &'static str,
}

impl WeakRef {
	/// A handle that never upgrades
	pub fn new() -> Self {
		Self::default()
	}

	pub fn upgrade(&self) -> Option<ObjectRef> {
		let (inner, any) = self.inner.as_ref()?;
		Some(ObjectRef {
			inner: inner.upgrade()?,
			any: any.upgrade()?,
			type_name: self.type_name,
		})
	}

	pub fn is_dangling(&self) -> bool {
		self.upgrade().is_none()
	}

	/// Whether both handles refer to the same allocation (two dangling
	/// handles compare equal).
	pub fn ptr_eq(&self, other: &WeakRef) -> bool {
		match (self.upgrade(), other.upgrade()) {
			(Some(a), Some(b)) => a.ptr_eq(&b),
			(None, None) => true,
			_ => false,
		}
	}
}

impl PartialEq for WeakRef {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}

impl fmt::Debug for WeakRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.upgrade() {
			Some(object) => f.debug_tuple("WeakRef").field(&object).finish(),
			None => f.write_str("WeakRef(dangling)"),
		}
	}
}

impl From<&ObjectRef> for WeakRef {
	fn from(object: &ObjectRef) -> Self {
		object.downgrade()
	}
}

/// Statically typed handle to a graph node
///
/// `Typed<T>` and the [`ObjectRef`] obtained from it share the same
/// allocation, so identity is preserved across the conversion.
///
/// # Examples
///
/// ```
/// use stowage_core::{ObjectRef, Typed};
/// # use stowage_core::{FieldDescriptor, FieldValue, Reflectable, ReflectableType, ReflectResult};
/// # #[derive(Default)]
/// # struct Counter { hits: u64 }
/// # impl Reflectable for Counter {
/// #     fn type_name(&self) -> &'static str { Self::TYPE_NAME }
/// #     fn field_descriptors(&self) -> &'static [FieldDescriptor] { Self::FIELDS }
/// #     fn get_field_value(&self, _: &str) -> ReflectResult<FieldValue> { Ok(FieldValue::Unsigned(self.hits)) }
/// #     fn set_field_value(&mut self, _: &str, _: FieldValue) -> ReflectResult<()> { Ok(()) }
/// # }
/// # impl ReflectableType for Counter {
/// #     const TYPE_NAME: &'static str = "Counter";
/// #     const FIELDS: &'static [FieldDescriptor] = &[FieldDescriptor::read_write("hits")];
/// # }
///
/// let counter = Typed::new(Counter { hits: 3 });
/// counter.write().hits += 1;
///
/// let erased: ObjectRef = counter.clone().into();
/// let again = erased.downcast::<Counter>().unwrap();
/// assert!(again.ptr_eq(&counter));
/// assert_eq!(again.read().hits, 4);
/// ```
pub struct Typed<T: ReflectableType> {
	arc: Arc<RwLock<T>>,
}

impl<T: ReflectableType> Typed<T> {
	pub fn new(value: T) -> Self {
		Self {
			arc: Arc::new(RwLock::new(value)),
		}
	}

	pub fn from_arc(arc: Arc<RwLock<T>>) -> Self {
		Self { arc }
	}

	pub fn read(&self) -> RwLockReadGuard<'_, T> {
		self.arc.read()
	}

	pub fn write(&self) -> RwLockWriteGuard<'_, T> {
		self.arc.write()
	}

	pub fn as_object(&self) -> ObjectRef {
		ObjectRef::from_arc(self.arc.clone())
	}

	pub fn downgrade(&self) -> WeakRef {
		self.as_object().downgrade()
	}

	pub fn ptr_eq(&self, other: &Typed<T>) -> bool {
		Arc::ptr_eq(&self.arc, &other.arc)
	}

	pub fn into_arc(self) -> Arc<RwLock<T>> {
		self.arc
	}
}

impl<T: ReflectableType> Clone for Typed<T> {
	fn clone(&self) -> Self {
		Self {
			arc: self.arc.clone(),
		}
	}
}

impl<T: ReflectableType> PartialEq for Typed<T> {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}

impl<T: ReflectableType> fmt::Debug for Typed<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Typed")
			.field("type_name", &T::TYPE_NAME)
			.field(
				"identity",
				&format_args!("{:#x}", Arc::as_ptr(&self.arc) as *const () as usize),
			)
			.finish()
	}
}

impl<T: ReflectableType> From<Typed<T>> for ObjectRef {
	fn from(typed: Typed<T>) -> Self {
		ObjectRef::from_arc(typed.arc)
	}
}
