//! # stowage-codec
//!
//! Object-graph serializers for durable storage.
//!
//! An [`ObjectSerializer`] turns the graph reachable from a root object into
//! bytes and rebuilds an equivalent graph from them later, possibly in another
//! process. Two strategies implement it:
//!
//! - [`GraphCodec`]: node table keyed by identity; aliasing, cycles and the
//!   concrete type of every node survive the round trip (default)
//! - [`TreeCodec`]: nested dump; shared objects are duplicated and cycles are
//!   rejected
//!
//! Both write a small envelope (magic, version, strategy, wire format)
//! followed by a MessagePack or JSON document. [`SerializerSettings`] picks
//! the strategy at runtime.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use stowage_codec::{ObjectSerializer, SerializerSettings};
//! use stowage_core::TypeRegistry;
//!
//! let serializer = SerializerSettings::default()
//!     .build(Arc::new(TypeRegistry::discovered()))
//!     .unwrap();
//!
//! // Bytes not written by stowage are rejected.
//! assert!(serializer.deserialize_object(b"not a graph").is_err());
//! ```

mod envelope;
pub mod error;
pub mod format;
pub mod graph;
pub mod serializer;
pub mod settings;
pub mod tree;
mod wire;

pub use error::{BoxError, CodecError, CodecResult};
pub use format::{StrategyKind, WireFormat};
pub use graph::GraphCodec;
pub use serializer::{ObjectSerializer, ObjectSerializerExt, RootRef};
pub use settings::SerializerSettings;
pub use tree::{DEFAULT_MAX_DEPTH, MAX_DOCUMENT_DEPTH, TreeCodec};
