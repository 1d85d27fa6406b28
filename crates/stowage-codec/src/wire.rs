//! Wire model shared by both strategies
//!
//! Object graphs are lowered into serde-friendly documents before encoding
//! and raised back into [`FieldValue`]s after decoding. References are the
//! only place the strategies differ, so they are delegated to a
//! [`ReferenceSink`] on the way out and a [`ReferenceResolver`] on the way in.

use crate::envelope::{Header, write_header};
use crate::error::{CodecError, CodecResult};
use crate::format::{StrategyKind, WireFormat};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Cursor;
use stowage_core::{
	FieldAccess, FieldSelectionPolicy, FieldValue, ObjectRef, Record, WeakRef, apply_fields,
};

/// Deepest container nesting written into a document.
///
/// Every map, array, struct and data-carrying variant counts as one level.
/// The JSON reader counts the same way and the MessagePack reader counts a
/// subset of these. Both refuse input nested 128 levels deep,
/// so anything written under this limit can be read back.
pub const MAX_DOCUMENT_DEPTH: usize = 100;

/// Nesting at which both readers stop with an error.
const READ_DEPTH_LIMIT: usize = 128;

/// Level of a node record inside a [`GraphDocument`] (document, node list, node).
pub(crate) const GRAPH_NODE_LEVEL: usize = 3;

/// Level of the root record inside a [`TreeDocument`] (document, root).
pub(crate) const TREE_ROOT_LEVEL: usize = 2;

/// Index of a node within one document.
pub(crate) type NodeId = u32;

/// Serialized form of a [`FieldValue`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) enum WireValue {
	Null,
	Boolean(bool),
	Integer(i64),
	Unsigned(u64),
	Float(f64),
	String(String),
	Array(Vec<WireValue>),
	Object(BTreeMap<String, WireValue>),
	Record(WireRecord),
	/// Strong edge to a node of the graph document
	Ref(NodeId),
	/// Weak edge to a node of the graph document
	WeakRef(NodeId),
	/// Object written in place (tree documents)
	Node(Box<WireRecord>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WireRecord {
	#[serde(rename = "type")]
	pub type_name: String,
	pub fields: Vec<WireField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WireField {
	pub name: String,
	pub value: WireValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WireNode {
	pub id: NodeId,
	#[serde(rename = "type")]
	pub type_name: String,
	pub fields: Vec<WireField>,
}

/// Node table written by the graph strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct GraphDocument {
	pub root: NodeId,
	pub nodes: Vec<WireNode>,
}

/// Nested dump written by the tree strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct TreeDocument {
	pub root: WireRecord,
}

/// Strategy hook for reference-valued members while encoding
///
/// `level` is the document level a record written in place would occupy.
pub(crate) trait ReferenceSink {
	fn strong(&mut self, object: &ObjectRef, level: usize) -> CodecResult<WireValue>;

	fn weak(&mut self, weak: &WeakRef, level: usize) -> CodecResult<WireValue>;
}

/// Strategy hook for reference-valued members while decoding
pub(crate) trait ReferenceResolver {
	fn strong(&mut self, id: NodeId) -> CodecResult<ObjectRef>;

	fn nested(&mut self, record: WireRecord) -> CodecResult<ObjectRef>;
}

/// Encoding parameters that do not depend on the strategy
#[derive(Debug, Clone, Copy)]
pub(crate) struct Lowering {
	pub policy: FieldSelectionPolicy,
	pub format: WireFormat,
}

impl Lowering {
	/// Snapshot the selected members of a node.
	///
	/// The read lock is released before the values are lowered, so no two
	/// node locks are held at the same time.
	pub fn read_members(&self, object: &ObjectRef) -> CodecResult<Vec<(String, FieldValue)>> {
		let guard = object.read();
		let type_name = guard.type_name();
		guard
			.field_descriptors()
			.iter()
			.filter(|descriptor| self.policy.includes(descriptor))
			.map(|descriptor| {
				guard
					.get_field_value(descriptor.name())
					.map(|value| (descriptor.name().to_string(), value))
					.map_err(|e| {
						CodecError::from_encode_reflect(e.in_field(type_name, descriptor.name()))
					})
			})
			.collect()
	}

	/// Lower the members of a record sitting at document level `level`.
	pub fn lower_fields(
		&self,
		fields: Vec<(String, FieldValue)>,
		level: usize,
		sink: &mut impl ReferenceSink,
	) -> CodecResult<Vec<WireField>> {
		enter(level + 1)?;
		if !fields.is_empty() {
			enter(level + 2)?;
		}
		fields
			.into_iter()
			.map(|(name, value)| {
				Ok(WireField {
					name,
					value: self.lower_value(value, level + 3, sink)?,
				})
			})
			.collect()
	}

	pub fn lower_value(
		&self,
		value: FieldValue,
		level: usize,
		sink: &mut impl ReferenceSink,
	) -> CodecResult<WireValue> {
		if value.is_null() {
			return Ok(WireValue::Null);
		}
		enter(level)?;
		Ok(match value {
			FieldValue::Null => WireValue::Null,
			FieldValue::Boolean(b) => WireValue::Boolean(b),
			FieldValue::Integer(n) => WireValue::Integer(n),
			FieldValue::Unsigned(n) => WireValue::Unsigned(n),
			FieldValue::Float(f) => {
				if self.format == WireFormat::Json && !f.is_finite() {
					return Err(CodecError::UnsupportedType {
						type_name: "f64".to_string(),
						reason: format!("{} cannot be represented in JSON", f),
					});
				}
				WireValue::Float(f)
			}
			FieldValue::String(s) => WireValue::String(s),
			FieldValue::Array(items) => {
				enter(level + 1)?;
				WireValue::Array(
					items
						.into_iter()
						.map(|item| self.lower_value(item, level + 2, sink))
						.collect::<CodecResult<_>>()?,
				)
			}
			FieldValue::Object(entries) => {
				enter(level + 1)?;
				WireValue::Object(
					entries
						.into_iter()
						.map(|(key, item)| Ok((key, self.lower_value(item, level + 2, sink)?)))
						.collect::<CodecResult<_>>()?,
				)
			}
			FieldValue::Record(record) => {
				WireValue::Record(self.lower_record(record, level + 1, sink)?)
			}
			FieldValue::Reference(object) => sink.strong(&object, level + 1)?,
			FieldValue::WeakReference(weak) => sink.weak(&weak, level + 1)?,
		})
	}

	fn lower_record(
		&self,
		record: Record,
		level: usize,
		sink: &mut impl ReferenceSink,
	) -> CodecResult<WireRecord> {
		enter(level)?;
		let type_name = record.type_name().to_string();
		let fields = record
			.into_fields()
			.into_iter()
			.filter(|field| self.policy.includes_access(field.access))
			.map(|field| (field.name, field.value))
			.collect();
		Ok(WireRecord {
			type_name,
			fields: self.lower_fields(fields, level, sink)?,
		})
	}
}

/// Fail once a container would sit deeper than [`MAX_DOCUMENT_DEPTH`].
pub(crate) fn enter(level: usize) -> CodecResult<()> {
	if level > MAX_DOCUMENT_DEPTH {
		return Err(CodecError::MaxDepthExceeded {
			max_depth: MAX_DOCUMENT_DEPTH,
		});
	}
	Ok(())
}

pub(crate) fn raise_fields(
	fields: Vec<WireField>,
	resolver: &mut impl ReferenceResolver,
) -> CodecResult<Vec<(String, FieldValue)>> {
	fields
		.into_iter()
		.map(|field| Ok((field.name, raise_value(field.value, resolver)?)))
		.collect()
}

pub(crate) fn raise_value(
	value: WireValue,
	resolver: &mut impl ReferenceResolver,
) -> CodecResult<FieldValue> {
	Ok(match value {
		WireValue::Null => FieldValue::Null,
		WireValue::Boolean(b) => FieldValue::Boolean(b),
		WireValue::Integer(n) => FieldValue::Integer(n),
		WireValue::Unsigned(n) => FieldValue::Unsigned(n),
		WireValue::Float(f) => FieldValue::Float(f),
		WireValue::String(s) => FieldValue::String(s),
		WireValue::Array(items) => FieldValue::Array(
			items
				.into_iter()
				.map(|item| raise_value(item, resolver))
				.collect::<CodecResult<_>>()?,
		),
		WireValue::Object(entries) => FieldValue::Object(
			entries
				.into_iter()
				.map(|(key, item)| Ok((key, raise_value(item, resolver)?)))
				.collect::<CodecResult<_>>()?,
		),
		WireValue::Record(wire) => {
			let mut record = Record::new(wire.type_name);
			for (name, value) in raise_fields(wire.fields, resolver)? {
				record.push(name, FieldAccess::ReadWrite, value);
			}
			FieldValue::Record(record)
		}
		WireValue::Ref(id) => FieldValue::Reference(resolver.strong(id)?),
		WireValue::WeakRef(id) => FieldValue::WeakReference(resolver.strong(id)?.downgrade()),
		WireValue::Node(record) => FieldValue::Reference(resolver.nested(*record)?),
	})
}

/// Assign decoded members onto a freshly constructed node.
pub(crate) fn assign_members(
	object: &ObjectRef,
	fields: Vec<(String, FieldValue)>,
) -> CodecResult<()> {
	let mut guard = object.write();
	apply_fields(&mut *guard, fields).map_err(CodecError::from_decode_reflect)
}

/// Put every assignable member of `object` back to its value in `blank`.
pub(crate) fn reset_members(object: &ObjectRef, blank: &ObjectRef) {
	let defaults: Vec<(String, FieldValue)> = {
		let guard = blank.read();
		guard
			.field_descriptors()
			.iter()
			.filter(|descriptor| descriptor.is_writable())
			.filter_map(|descriptor| {
				let value = guard.get_field_value(descriptor.name()).ok()?;
				Some((descriptor.name().to_string(), value))
			})
			.collect()
	};
	let mut guard = object.write();
	if let Err(e) = apply_fields(&mut *guard, defaults) {
		tracing::warn!(
			type_name = object.type_name(),
			error = %e,
			"Could not reset members of a discarded node"
		);
	}
}

pub(crate) fn encode_document<D: Serialize>(
	strategy: StrategyKind,
	format: WireFormat,
	document: &D,
) -> CodecResult<Vec<u8>> {
	let mut buf = Vec::with_capacity(256);
	write_header(&mut buf, Header { strategy, format });
	match format {
		WireFormat::MessagePack => rmp_serde::encode::write_named(&mut buf, document)
			.map_err(|e| CodecError::serialization_failure("MessagePack encoding failed", e))?,
		WireFormat::Json => serde_json::to_writer(&mut buf, document)
			.map_err(|e| CodecError::serialization_failure("JSON encoding failed", e))?,
	}
	Ok(buf)
}

pub(crate) fn decode_document<D: DeserializeOwned>(
	format: WireFormat,
	payload: &[u8],
) -> CodecResult<D> {
	match format {
		WireFormat::MessagePack => {
			let mut deserializer = rmp_serde::Deserializer::new(Cursor::new(payload));
			deserializer.set_max_depth(READ_DEPTH_LIMIT);
			let document = D::deserialize(&mut deserializer).map_err(|e| {
				CodecError::malformed(format!("invalid MessagePack document: {}", e))
			})?;
			let consumed = deserializer.position();
			if consumed != payload.len() as u64 {
				return Err(CodecError::malformed(format!(
					"{} trailing bytes after MessagePack document",
					payload.len() as u64 - consumed
				)));
			}
			Ok(document)
		}
		// serde_json stops at READ_DEPTH_LIMIT levels and rejects trailing input.
		WireFormat::Json => serde_json::from_slice(payload)
			.map_err(|e| CodecError::malformed(format!("invalid JSON document: {}", e))),
	}
}
