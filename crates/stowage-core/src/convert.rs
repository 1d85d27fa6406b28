//! [`ReflectValue`] implementations for standard and ecosystem types.

use crate::error::{ReflectError, ReflectResult};
use crate::handle::{ObjectRef, Typed, WeakRef};
use crate::reflect::{ReflectValue, ReflectableType};
use crate::value::FieldValue;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

impl ReflectValue for FieldValue {
	fn to_field_value(&self) -> ReflectResult<FieldValue> {
		Ok(self.clone())
	}

	fn from_field_value(value: FieldValue) -> ReflectResult<Self> {
		Ok(value)
	}
}

impl ReflectValue for bool {
	fn to_field_value(&self) -> ReflectResult<FieldValue> {
		Ok(FieldValue::Boolean(*self))
	}

	fn from_field_value(value: FieldValue) -> ReflectResult<Self> {
		match value {
			FieldValue::Boolean(b) => Ok(b),
			other => Err(ReflectError::mismatch("boolean", &other)),
		}
	}
}

macro_rules! impl_signed {
	($($ty:ty),*) => {
		$(
			impl ReflectValue for $ty {
				fn to_field_value(&self) -> ReflectResult<FieldValue> {
					Ok(FieldValue::Integer(i64::from(*self)))
				}

				fn from_field_value(value: FieldValue) -> ReflectResult<Self> {
					match value {
						FieldValue::Integer(n) => <$ty>::try_from(n)
							.map_err(|_| ReflectError::out_of_range(n, stringify!($ty))),
						FieldValue::Unsigned(n) => <$ty>::try_from(n)
							.map_err(|_| ReflectError::out_of_range(n, stringify!($ty))),
						other => Err(ReflectError::mismatch("integer", &other)),
					}
				}
			}
		)*
	};
}

macro_rules! impl_unsigned {
	($($ty:ty),*) => {
		$(
			impl ReflectValue for $ty {
				fn to_field_value(&self) -> ReflectResult<FieldValue> {
					Ok(FieldValue::Unsigned(u64::from(*self)))
				}

				fn from_field_value(value: FieldValue) -> ReflectResult<Self> {
					match value {
						FieldValue::Unsigned(n) => <$ty>::try_from(n)
							.map_err(|_| ReflectError::out_of_range(n, stringify!($ty))),
						FieldValue::Integer(n) => <$ty>::try_from(n)
							.map_err(|_| ReflectError::out_of_range(n, stringify!($ty))),
						other => Err(ReflectError::mismatch("unsigned integer", &other)),
					}
				}
			}
		)*
	};
}

impl_signed!(i8, i16, i32, i64);
impl_unsigned!(u8, u16, u32, u64);

impl ReflectValue for isize {
	fn to_field_value(&self) -> ReflectResult<FieldValue> {
		i64::try_from(*self)
			.map(FieldValue::Integer)
			.map_err(|_| ReflectError::out_of_range(self, "i64"))
	}

	fn from_field_value(value: FieldValue) -> ReflectResult<Self> {
		let n = i64::from_field_value(value)?;
		isize::try_from(n).map_err(|_| ReflectError::out_of_range(n, "isize"))
	}
}

impl ReflectValue for usize {
	fn to_field_value(&self) -> ReflectResult<FieldValue> {
		u64::try_from(*self)
			.map(FieldValue::Unsigned)
			.map_err(|_| ReflectError::out_of_range(self, "u64"))
	}

	fn from_field_value(value: FieldValue) -> ReflectResult<Self> {
		let n = u64::from_field_value(value)?;
		usize::try_from(n).map_err(|_| ReflectError::out_of_range(n, "usize"))
	}
}

impl ReflectValue for f64 {
	fn to_field_value(&self) -> ReflectResult<FieldValue> {
		Ok(FieldValue::Float(*self))
	}

	fn from_field_value(value: FieldValue) -> ReflectResult<Self> {
		match value {
			FieldValue::Float(f) => Ok(f),
			FieldValue::Integer(n) => Ok(n as f64),
			FieldValue::Unsigned(n) => Ok(n as f64),
			other => Err(ReflectError::mismatch("float", &other)),
		}
	}
}

impl ReflectValue for f32 {
	fn to_field_value(&self) -> ReflectResult<FieldValue> {
		Ok(FieldValue::Float(f64::from(*self)))
	}

	fn from_field_value(value: FieldValue) -> ReflectResult<Self> {
		f64::from_field_value(value).map(|f| f as f32)
	}
}

impl ReflectValue for char {
	fn to_field_value(&self) -> ReflectResult<FieldValue> {
		Ok(FieldValue::String(self.to_string()))
	}

	fn from_field_value(value: FieldValue) -> ReflectResult<Self> {
		match value {
			FieldValue::String(s) => {
				let mut chars = s.chars();
				match (chars.next(), chars.next()) {
					(Some(c), None) => Ok(c),
					_ => Err(ReflectError::InvalidValue {
						target: "char",
						message: format!("expected exactly one character, got {:?}", s),
					}),
				}
			}
			other => Err(ReflectError::mismatch("string", &other)),
		}
	}
}

impl ReflectValue for String {
	fn to_field_value(&self) -> ReflectResult<FieldValue> {
		Ok(FieldValue::String(self.clone()))
	}

	fn from_field_value(value: FieldValue) -> ReflectResult<Self> {
		match value {
			FieldValue::String(s) => Ok(s),
			other => Err(ReflectError::mismatch("string", &other)),
		}
	}
}

impl<T: ReflectValue> ReflectValue for Option<T> {
	fn to_field_value(&self) -> ReflectResult<FieldValue> {
		match self {
			Some(inner) => inner.to_field_value(),
			None => Ok(FieldValue::Null),
		}
	}

	fn from_field_value(value: FieldValue) -> ReflectResult<Self> {
		match value {
			FieldValue::Null => Ok(None),
			other => T::from_field_value(other).map(Some),
		}
	}
}

impl<T: ReflectValue> ReflectValue for Box<T> {
	fn to_field_value(&self) -> ReflectResult<FieldValue> {
		(**self).to_field_value()
	}

	fn from_field_value(value: FieldValue) -> ReflectResult<Self> {
		T::from_field_value(value).map(Box::new)
	}
}

impl<T: ReflectValue> ReflectValue for Vec<T> {
	fn to_field_value(&self) -> ReflectResult<FieldValue> {
		self.iter()
			.map(ReflectValue::to_field_value)
			.collect::<ReflectResult<Vec<_>>>()
			.map(FieldValue::Array)
	}

	fn from_field_value(value: FieldValue) -> ReflectResult<Self> {
		match value {
			FieldValue::Array(items) => items.into_iter().map(T::from_field_value).collect(),
			other => Err(ReflectError::mismatch("array", &other)),
		}
	}
}

impl<T: ReflectValue> ReflectValue for BTreeMap<String, T> {
	fn to_field_value(&self) -> ReflectResult<FieldValue> {
		self.iter()
			.map(|(k, v)| Ok((k.clone(), v.to_field_value()?)))
			.collect::<ReflectResult<BTreeMap<_, _>>>()
			.map(FieldValue::Object)
	}

	fn from_field_value(value: FieldValue) -> ReflectResult<Self> {
		match value {
			FieldValue::Object(entries) => entries
				.into_iter()
				.map(|(k, v)| Ok((k, T::from_field_value(v)?)))
				.collect(),
			other => Err(ReflectError::mismatch("object", &other)),
		}
	}
}

impl<T: ReflectValue> ReflectValue for HashMap<String, T> {
	fn to_field_value(&self) -> ReflectResult<FieldValue> {
		self.iter()
			.map(|(k, v)| Ok((k.clone(), v.to_field_value()?)))
			.collect::<ReflectResult<BTreeMap<_, _>>>()
			.map(FieldValue::Object)
	}

	fn from_field_value(value: FieldValue) -> ReflectResult<Self> {
		match value {
			FieldValue::Object(entries) => entries
				.into_iter()
				.map(|(k, v)| Ok((k, T::from_field_value(v)?)))
				.collect(),
			other => Err(ReflectError::mismatch("object", &other)),
		}
	}
}

impl ReflectValue for DateTime<Utc> {
	fn to_field_value(&self) -> ReflectResult<FieldValue> {
		Ok(FieldValue::String(
			self.to_rfc3339_opts(SecondsFormat::AutoSi, true),
		))
	}

	fn from_field_value(value: FieldValue) -> ReflectResult<Self> {
		match value {
			FieldValue::String(s) => DateTime::parse_from_rfc3339(&s)
				.map(|dt| dt.with_timezone(&Utc))
				.map_err(|e| ReflectError::InvalidValue {
					target: "timestamp",
					message: e.to_string(),
				}),
			other => Err(ReflectError::mismatch("string", &other)),
		}
	}
}

impl ReflectValue for Uuid {
	fn to_field_value(&self) -> ReflectResult<FieldValue> {
		Ok(FieldValue::String(self.to_string()))
	}

	fn from_field_value(value: FieldValue) -> ReflectResult<Self> {
		match value {
			FieldValue::String(s) => Uuid::parse_str(&s).map_err(|e| ReflectError::InvalidValue {
				target: "uuid",
				message: e.to_string(),
			}),
			other => Err(ReflectError::mismatch("string", &other)),
		}
	}
}

impl ReflectValue for ObjectRef {
	fn to_field_value(&self) -> ReflectResult<FieldValue> {
		Ok(FieldValue::Reference(self.clone()))
	}

	fn from_field_value(value: FieldValue) -> ReflectResult<Self> {
		match value {
			FieldValue::Reference(object) => Ok(object),
			other => Err(ReflectError::mismatch("reference", &other)),
		}
	}
}

impl ReflectValue for WeakRef {
	fn to_field_value(&self) -> ReflectResult<FieldValue> {
		Ok(FieldValue::WeakReference(self.clone()))
	}

	fn from_field_value(value: FieldValue) -> ReflectResult<Self> {
		match value {
			FieldValue::WeakReference(weak) => Ok(weak),
			FieldValue::Reference(object) => Ok(object.downgrade()),
			FieldValue::Null => Ok(WeakRef::new()),
			other => Err(ReflectError::mismatch("weak reference", &other)),
		}
	}
}

impl<T: ReflectableType> ReflectValue for Typed<T> {
	fn to_field_value(&self) -> ReflectResult<FieldValue> {
		Ok(FieldValue::Reference(self.as_object()))
	}

	fn from_field_value(value: FieldValue) -> ReflectResult<Self> {
		let object = ObjectRef::from_field_value(value)?;
		object
			.downcast::<T>()
			.ok_or_else(|| ReflectError::TypeMismatch {
				expected: T::TYPE_NAME.to_string(),
				found: object.type_name().to_string(),
			})
	}
}
