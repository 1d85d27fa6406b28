//! Plain nested-dump strategy
//!
//! Every reference is written in place as a nested node. Identity is not
//! recorded: an object reached twice is written twice and comes back as two
//! separate objects. Weak references are written as `Null`. Cycles cannot be
//! expressed and are rejected.
//!
//! Nesting is bounded twice: by the codec's object limit and by
//! [`MAX_DOCUMENT_DEPTH`], which keeps every written document readable.

use crate::envelope::expect_strategy;
use crate::error::{CodecError, CodecResult};
use crate::format::{StrategyKind, WireFormat};
use crate::serializer::ObjectSerializer;
use crate::wire::{
	Lowering, NodeId, ReferenceResolver, ReferenceSink, TREE_ROOT_LEVEL, TreeDocument, WireField,
	WireRecord, WireValue, assign_members, decode_document, encode_document, enter, raise_fields,
};

pub use crate::wire::MAX_DOCUMENT_DEPTH;
use std::collections::HashSet;
use std::sync::Arc;
use stowage_core::{FieldSelectionPolicy, ObjectRef, TypeRegistry, WeakRef};

/// Default limit on object nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Tracks nesting depth and the ancestors of the object being written
#[derive(Debug, Clone)]
pub(crate) struct TraversalContext {
	current_depth: usize,
	max_depth: usize,
	ancestors: HashSet<usize>,
}

impl TraversalContext {
	pub fn new(max_depth: usize) -> Self {
		Self {
			current_depth: 0,
			max_depth,
			ancestors: HashSet::new(),
		}
	}

	#[cfg(test)]
	pub fn current_depth(&self) -> usize {
		self.current_depth
	}

	pub fn max_depth(&self) -> usize {
		self.max_depth
	}

	pub fn can_go_deeper(&self) -> bool {
		self.current_depth < self.max_depth
	}

	/// Enter `object`. Returns `false` if it is already an ancestor.
	pub fn visit(&mut self, object: &ObjectRef) -> bool {
		if !self.ancestors.insert(object.identity()) {
			return false;
		}
		self.current_depth += 1;
		true
	}

	pub fn leave(&mut self, object: &ObjectRef) {
		if self.ancestors.remove(&object.identity()) {
			self.current_depth -= 1;
		}
	}
}

/// Tree strategy codec
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use stowage_codec::{ObjectSerializer, StrategyKind, TreeCodec};
/// use stowage_core::TypeRegistry;
///
/// let codec = TreeCodec::new(Arc::new(TypeRegistry::new())).with_max_depth(8);
/// assert_eq!(codec.strategy(), StrategyKind::Tree);
/// assert_eq!(codec.max_depth(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct TreeCodec {
	registry: Arc<TypeRegistry>,
	policy: FieldSelectionPolicy,
	format: WireFormat,
	max_depth: usize,
}

impl TreeCodec {
	pub fn new(registry: Arc<TypeRegistry>) -> Self {
		Self {
			registry,
			policy: FieldSelectionPolicy::default(),
			format: WireFormat::default(),
			max_depth: DEFAULT_MAX_DEPTH,
		}
	}

	pub fn with_policy(mut self, policy: FieldSelectionPolicy) -> Self {
		self.policy = policy;
		self
	}

	pub fn with_format(mut self, format: WireFormat) -> Self {
		self.format = format;
		self
	}

	pub fn with_max_depth(mut self, max_depth: usize) -> Self {
		self.max_depth = max_depth;
		self
	}

	pub fn registry(&self) -> &TypeRegistry {
		&self.registry
	}

	pub fn policy(&self) -> FieldSelectionPolicy {
		self.policy
	}

	pub fn format(&self) -> WireFormat {
		self.format
	}

	pub fn max_depth(&self) -> usize {
		self.max_depth
	}

	fn encode(&self, root: &ObjectRef) -> CodecResult<Vec<u8>> {
		let mut encoder = TreeEncoder {
			registry: &self.registry,
			lowering: Lowering {
				policy: self.policy,
				format: self.format,
			},
			context: TraversalContext::new(self.max_depth),
			nodes: 0,
		};
		let document = TreeDocument {
			root: encoder.node(root, TREE_ROOT_LEVEL)?,
		};
		let bytes = encode_document(StrategyKind::Tree, self.format, &document)?;
		tracing::debug!(
			nodes = encoder.nodes,
			bytes = bytes.len(),
			format = %self.format,
			"Serialized object tree"
		);
		Ok(bytes)
	}

	fn decode(&self, bytes: &[u8]) -> CodecResult<ObjectRef> {
		let (format, payload) = expect_strategy(bytes, StrategyKind::Tree)?;
		let document: TreeDocument = decode_document(format, payload)?;
		let mut decoder = TreeDecoder {
			registry: &self.registry,
			depth: 0,
			max_depth: self.max_depth,
		};
		let root = decoder.build(document.root)?;
		tracing::debug!(
			bytes = bytes.len(),
			format = %format,
			root_type = root.type_name(),
			"Deserialized object tree"
		);
		Ok(root)
	}
}

impl ObjectSerializer for TreeCodec {
	fn strategy(&self) -> StrategyKind {
		StrategyKind::Tree
	}

	fn serialize_object(&self, root: &ObjectRef) -> CodecResult<Vec<u8>> {
		self.encode(root)
	}

	fn deserialize_object(&self, bytes: &[u8]) -> CodecResult<ObjectRef> {
		self.decode(bytes)
	}
}

struct TreeEncoder<'a> {
	registry: &'a TypeRegistry,
	lowering: Lowering,
	context: TraversalContext,
	nodes: usize,
}

impl TreeEncoder<'_> {
	/// Write `object` as a record at document level `level`.
	fn node(&mut self, object: &ObjectRef, level: usize) -> CodecResult<WireRecord> {
		if !self.registry.contains(object.type_name()) {
			return Err(CodecError::UnsupportedType {
				type_name: object.type_name().to_string(),
				reason: "type is not registered and could not be reconstructed".to_string(),
			});
		}
		if !self.context.can_go_deeper() {
			return Err(CodecError::MaxDepthExceeded {
				max_depth: self.context.max_depth(),
			});
		}
		enter(level)?;
		if !self.context.visit(object) {
			return Err(CodecError::CyclicReference {
				type_name: object.type_name().to_string(),
			});
		}
		let fields = self.node_fields(object, level);
		self.context.leave(object);
		self.nodes += 1;

		Ok(WireRecord {
			type_name: object.type_name().to_string(),
			fields: fields?,
		})
	}

	fn node_fields(&mut self, object: &ObjectRef, level: usize) -> CodecResult<Vec<WireField>> {
		let lowering = self.lowering;
		let members = lowering.read_members(object)?;
		lowering.lower_fields(members, level, self)
	}
}

impl ReferenceSink for TreeEncoder<'_> {
	fn strong(&mut self, object: &ObjectRef, level: usize) -> CodecResult<WireValue> {
		self.node(object, level).map(|record| WireValue::Node(Box::new(record)))
	}

	fn weak(&mut self, _weak: &WeakRef, _level: usize) -> CodecResult<WireValue> {
		Ok(WireValue::Null)
	}
}

struct TreeDecoder<'a> {
	registry: &'a TypeRegistry,
	depth: usize,
	max_depth: usize,
}

impl TreeDecoder<'_> {
	fn build(&mut self, record: WireRecord) -> CodecResult<ObjectRef> {
		if self.depth >= self.max_depth {
			return Err(CodecError::MaxDepthExceeded {
				max_depth: self.max_depth,
			});
		}
		let object = self.registry.construct(&record.type_name).ok_or_else(|| {
			CodecError::UnresolvableType {
				type_name: record.type_name.clone(),
			}
		})?;

		self.depth += 1;
		let fields = raise_fields(record.fields, self);
		self.depth -= 1;

		assign_members(&object, fields?)?;
		Ok(object)
	}
}

impl ReferenceResolver for TreeDecoder<'_> {
	fn strong(&mut self, id: NodeId) -> CodecResult<ObjectRef> {
		Err(CodecError::malformed(format!(
			"tree document refers to node {} by id",
			id
		)))
	}

	fn nested(&mut self, record: WireRecord) -> CodecResult<ObjectRef> {
		self.build(record)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use stowage_core::{FieldDescriptor, FieldValue, Reflectable, ReflectableType, ReflectResult};

	#[derive(Default)]
	struct Leaf;

	impl Reflectable for Leaf {
		fn type_name(&self) -> &'static str {
			Self::TYPE_NAME
		}

		fn field_descriptors(&self) -> &'static [FieldDescriptor] {
			Self::FIELDS
		}

		fn get_field_value(&self, _name: &str) -> ReflectResult<FieldValue> {
			Ok(FieldValue::Null)
		}

		fn set_field_value(&mut self, _name: &str, _value: FieldValue) -> ReflectResult<()> {
			Ok(())
		}
	}

	impl ReflectableType for Leaf {
		const TYPE_NAME: &'static str = "tests.Leaf";
		const FIELDS: &'static [FieldDescriptor] = &[];
	}

	#[rstest]
	fn test_context_tracks_ancestors() {
		let a = ObjectRef::new(Leaf);
		let b = ObjectRef::new(Leaf);
		let mut context = TraversalContext::new(2);

		assert!(context.visit(&a));
		assert!(!context.visit(&a));
		assert!(context.visit(&b));
		assert_eq!(context.current_depth(), 2);
		assert!(!context.can_go_deeper());

		context.leave(&b);
		context.leave(&a);
		assert_eq!(context.current_depth(), 0);
		assert!(context.visit(&a));
	}

	#[rstest]
	#[case(WireFormat::MessagePack)]
	#[case(WireFormat::Json)]
	fn test_document_depth_bounds_unlimited_object_depth(#[case] format: WireFormat) {
		let registry = TypeRegistry::new().with::<Leaf>();
		let mut encoder = TreeEncoder {
			registry: &registry,
			lowering: Lowering {
				policy: FieldSelectionPolicy::default(),
				format,
			},
			context: TraversalContext::new(usize::MAX),
			nodes: 0,
		};
		let leaf = ObjectRef::new(Leaf);

		assert!(encoder.node(&leaf, MAX_DOCUMENT_DEPTH - 1).is_ok());
		let err = encoder.node(&leaf, MAX_DOCUMENT_DEPTH).unwrap_err();
		assert!(matches!(
			err,
			CodecError::MaxDepthExceeded {
				max_depth: MAX_DOCUMENT_DEPTH
			}
		));
	}

	#[rstest]
	fn test_zero_depth_rejects_root() {
		let codec = TreeCodec::new(Arc::new(TypeRegistry::new().with::<Leaf>())).with_max_depth(0);
		let err = codec.serialize_object(&ObjectRef::new(Leaf)).unwrap_err();
		assert!(matches!(err, CodecError::MaxDepthExceeded { max_depth: 0 }));
	}
}
