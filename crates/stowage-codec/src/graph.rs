//! Reference-preserving graph strategy
//!
//! The graph is written as a flat node table. Each distinct instance becomes
//! one node; every reference to it is written as its node id. Encoding walks
//! the graph breadth-first with an explicit queue and decoding allocates all
//! nodes before linking them, so neither direction recurses along references.

use crate::envelope::expect_strategy;
use crate::error::{CodecError, CodecResult};
use crate::format::{StrategyKind, WireFormat};
use crate::serializer::ObjectSerializer;
use crate::wire::{
	GRAPH_NODE_LEVEL, GraphDocument, Lowering, NodeId, ReferenceResolver, ReferenceSink, WireNode,
	WireRecord, WireValue, assign_members, decode_document, encode_document, raise_fields,
	reset_members,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use stowage_core::{FieldSelectionPolicy, ObjectRef, TypeRegistry, WeakRef};

/// Graph strategy codec
///
/// Preserves node identity: aliased references stay aliased and cycles are
/// rebuilt as cycles.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use stowage_codec::{GraphCodec, ObjectSerializer, StrategyKind, WireFormat};
/// use stowage_core::TypeRegistry;
///
/// let codec = GraphCodec::new(Arc::new(TypeRegistry::discovered()))
///     .with_format(WireFormat::Json);
///
/// assert_eq!(codec.strategy(), StrategyKind::Graph);
/// assert_eq!(codec.format(), WireFormat::Json);
/// assert!(codec.policy().include_only_read_write_fields());
/// ```
#[derive(Debug, Clone)]
pub struct GraphCodec {
	registry: Arc<TypeRegistry>,
	policy: FieldSelectionPolicy,
	format: WireFormat,
}

impl GraphCodec {
	/// Create a codec with the default policy and wire format
	pub fn new(registry: Arc<TypeRegistry>) -> Self {
		Self {
			registry,
			policy: FieldSelectionPolicy::default(),
			format: WireFormat::default(),
		}
	}

	pub fn with_policy(mut self, policy: FieldSelectionPolicy) -> Self {
		self.policy = policy;
		self
	}

	/// Format used when writing; any format is accepted when reading.
	pub fn with_format(mut self, format: WireFormat) -> Self {
		self.format = format;
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

	fn encode(&self, root: &ObjectRef) -> CodecResult<Vec<u8>> {
		let lowering = Lowering {
			policy: self.policy,
			format: self.format,
		};
		let mut encoder = GraphEncoder::new(&self.registry);
		let root_id = encoder.intern(root)?;

		let mut nodes = Vec::new();
		while let Some((id, object)) = encoder.pending.pop_front() {
			let members = lowering.read_members(&object)?;
			let fields = lowering.lower_fields(members, GRAPH_NODE_LEVEL, &mut encoder)?;
			nodes.push(WireNode {
				id,
				type_name: object.type_name().to_string(),
				fields,
			});
		}

		let document = GraphDocument {
			root: root_id,
			nodes,
		};
		let bytes = encode_document(StrategyKind::Graph, self.format, &document)?;
		tracing::debug!(
			nodes = document.nodes.len(),
			bytes = bytes.len(),
			format = %self.format,
			"Serialized object graph"
		);
		Ok(bytes)
	}

	fn decode(&self, bytes: &[u8]) -> CodecResult<ObjectRef> {
		let (format, payload) = expect_strategy(bytes, StrategyKind::Graph)?;
		let document: GraphDocument = decode_document(format, payload)?;
		if document.nodes.is_empty() {
			return Err(CodecError::malformed("graph document has no nodes"));
		}

		let mut table = HashMap::with_capacity(document.nodes.len());
		for node in &document.nodes {
			let object = self.registry.construct(&node.type_name).ok_or_else(|| {
				CodecError::UnresolvableType {
					type_name: node.type_name.clone(),
				}
			})?;
			if table.insert(node.id, object).is_some() {
				return Err(CodecError::malformed(format!("duplicate node id {}", node.id)));
			}
		}
		let root = table.get(&document.root).cloned().ok_or_else(|| {
			CodecError::malformed(format!("root node {} is missing", document.root))
		})?;

		let node_count = document.nodes.len();
		let mut resolver = NodeTable { nodes: &table };
		let mut assigned = Vec::with_capacity(node_count);
		for node in document.nodes {
			let object = resolver.strong(node.id)?;
			assigned.push(object.clone());
			let linked = raise_fields(node.fields, &mut resolver)
				.and_then(|fields| assign_members(&object, fields));
			if let Err(err) = linked {
				self.unlink(&assigned);
				return Err(err);
			}
		}

		tracing::debug!(
			nodes = node_count,
			bytes = bytes.len(),
			format = %format,
			root_type = root.type_name(),
			"Deserialized object graph"
		);
		Ok(root)
	}
}

impl GraphCodec {
	/// Reset members of placeholders linked before a decode failed, so that
	/// reference cycles among them do not keep them alive.
	fn unlink(&self, nodes: &[ObjectRef]) {
		for object in nodes {
			if let Some(blank) = self.registry.construct(object.type_name()) {
				reset_members(object, &blank);
			}
		}
		tracing::debug!(nodes = nodes.len(), "Unlinked partially decoded graph");
	}
}

impl ObjectSerializer for GraphCodec {
	fn strategy(&self) -> StrategyKind {
		StrategyKind::Graph
	}

	fn serialize_object(&self, root: &ObjectRef) -> CodecResult<Vec<u8>> {
		self.encode(root)
	}

	fn deserialize_object(&self, bytes: &[u8]) -> CodecResult<ObjectRef> {
		self.decode(bytes)
	}
}

/// Identity to node id assignment for one encode call
struct GraphEncoder<'a> {
	registry: &'a TypeRegistry,
	ids: HashMap<usize, NodeId>,
	pending: VecDeque<(NodeId, ObjectRef)>,
	// Interned nodes stay alive until the call ends so that an address
	// cannot be reused by another allocation while it is in `ids`.
	retained: Vec<ObjectRef>,
}

impl<'a> GraphEncoder<'a> {
	fn new(registry: &'a TypeRegistry) -> Self {
		Self {
			registry,
			ids: HashMap::new(),
			pending: VecDeque::new(),
			retained: Vec::new(),
		}
	}

	fn intern(&mut self, object: &ObjectRef) -> CodecResult<NodeId> {
		if let Some(id) = self.ids.get(&object.identity()) {
			return Ok(*id);
		}
		if !self.registry.contains(object.type_name()) {
			return Err(CodecError::UnsupportedType {
				type_name: object.type_name().to_string(),
				reason: "type is not registered and could not be reconstructed".to_string(),
			});
		}
		let id = NodeId::try_from(self.retained.len()).map_err(|_| CodecError::UnsupportedType {
			type_name: object.type_name().to_string(),
			reason: "graph has too many nodes".to_string(),
		})?;
		self.ids.insert(object.identity(), id);
		self.retained.push(object.clone());
		self.pending.push_back((id, object.clone()));
		Ok(id)
	}
}

impl ReferenceSink for GraphEncoder<'_> {
	fn strong(&mut self, object: &ObjectRef, _level: usize) -> CodecResult<WireValue> {
		self.intern(object).map(WireValue::Ref)
	}

	fn weak(&mut self, weak: &WeakRef, _level: usize) -> CodecResult<WireValue> {
		match weak.upgrade() {
			Some(object) => self.intern(&object).map(WireValue::WeakRef),
			None => Ok(WireValue::Null),
		}
	}
}

/// Placeholder lookup for one decode call
struct NodeTable<'a> {
	nodes: &'a HashMap<NodeId, ObjectRef>,
}

impl ReferenceResolver for NodeTable<'_> {
	fn strong(&mut self, id: NodeId) -> CodecResult<ObjectRef> {
		self.nodes
			.get(&id)
			.cloned()
			.ok_or_else(|| CodecError::malformed(format!("reference to unknown node {}", id)))
	}

	fn nested(&mut self, record: WireRecord) -> CodecResult<ObjectRef> {
		Err(CodecError::malformed(format!(
			"graph document contains an inline '{}' node",
			record.type_name
		)))
	}
}
