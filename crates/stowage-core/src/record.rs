//! Conversion between reflectable values and inline [`Record`]s.

use crate::error::{ReflectError, ReflectResult};
use crate::reflect::{Reflectable, ReflectableType};
use crate::value::{FieldValue, Record};

/// Capture every member of `value` into a [`Record`].
///
/// Read-only members are included; selection happens in the codec.
pub fn capture_record<T: Reflectable + ?Sized>(value: &T) -> ReflectResult<Record> {
	let type_name = value.type_name();
	let mut record = Record::new(type_name);
	for descriptor in value.field_descriptors() {
		let field_value = value
			.get_field_value(descriptor.name())
			.map_err(|e| e.in_field(type_name, descriptor.name()))?;
		record.push(descriptor.name(), descriptor.access(), field_value);
	}
	Ok(record)
}

/// Assign named values onto `target`.
///
/// Names the type does not declare are ignored, and read-only members are
/// never assigned, so data written by an older or newer version of a type
/// still loads. Conversion failures are reported with the member name.
///
/// # Examples
///
/// ```
/// use stowage_core::{apply_fields, FieldValue, Reflectable};
/// # use stowage_core::{FieldDescriptor, ReflectableType, ReflectResult, ReflectValue};
/// # #[derive(Default)]
/// # struct Job { name: String }
/// # impl Reflectable for Job {
/// #     fn type_name(&self) -> &'static str { "Job" }
/// #     fn field_descriptors(&self) -> &'static [FieldDescriptor] { const F: &[FieldDescriptor] = &[FieldDescriptor::read_write("name")]; F }
/// #     fn get_field_value(&self, _: &str) -> ReflectResult<FieldValue> { self.name.to_field_value() }
/// #     fn set_field_value(&mut self, _: &str, v: FieldValue) -> ReflectResult<()> {
/// #         self.name = String::from_field_value(v)?; Ok(())
/// #     }
/// # }
///
/// let mut job = Job::default();
/// apply_fields(&mut job, [
///     ("name".to_string(), FieldValue::String("nightly".to_string())),
///     ("removed_in_v2".to_string(), FieldValue::Boolean(true)),
/// ]).unwrap();
///
/// assert_eq!(job.name, "nightly");
/// ```
pub fn apply_fields<T, I>(target: &mut T, fields: I) -> ReflectResult<()>
where
	T: Reflectable + ?Sized,
	I: IntoIterator<Item = (String, FieldValue)>,
{
	let type_name = target.type_name();
	let descriptors = target.field_descriptors();
	for (name, value) in fields {
		let Some(descriptor) = descriptors.iter().find(|d| d.name() == name) else {
			tracing::warn!(type_name, field = %name, "Ignoring unknown member");
			continue;
		};
		if !descriptor.is_writable() {
			tracing::trace!(type_name, field = %name, "Skipping read-only member");
			continue;
		}
		target
			.set_field_value(&name, value)
			.map_err(|e| e.in_field(type_name, &name))?;
	}
	Ok(())
}

/// Rebuild a value of type `T` from an inline record.
///
/// Starts from `T::default()`, so members missing from the record keep their
/// default value.
pub fn restore_record<T: ReflectableType>(value: FieldValue) -> ReflectResult<T> {
	let record = match value {
		FieldValue::Record(record) => record,
		other => return Err(ReflectError::mismatch("record", &other)),
	};
	if record.type_name() != T::TYPE_NAME {
		return Err(ReflectError::TypeMismatch {
			expected: T::TYPE_NAME.to_string(),
			found: record.type_name().to_string(),
		});
	}
	let mut target = T::default();
	apply_fields(
		&mut target,
		record
			.into_fields()
			.into_iter()
			.map(|field| (field.name, field.value)),
	)?;
	Ok(target)
}
