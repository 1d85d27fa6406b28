//! Object serializers.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use stowage::codec::{GraphCodec, ObjectSerializer, StrategyKind};
//! use stowage::model::TypeRegistry;
//!
//! let codec = GraphCodec::new(Arc::new(TypeRegistry::new()));
//! assert_eq!(codec.strategy(), StrategyKind::Graph);
//! ```

pub use stowage_codec::*;
