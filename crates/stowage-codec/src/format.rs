//! Strategy and wire format selectors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Document encoding written after the envelope header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
	/// Compact binary (MessagePack)
	#[default]
	#[serde(rename = "msgpack", alias = "messagepack")]
	MessagePack,
	/// Structured text (JSON)
	Json,
}

impl WireFormat {
	pub(crate) const fn tag(self) -> u8 {
		match self {
			WireFormat::MessagePack => 1,
			WireFormat::Json => 2,
		}
	}

	pub(crate) const fn from_tag(tag: u8) -> Option<Self> {
		match tag {
			1 => Some(WireFormat::MessagePack),
			2 => Some(WireFormat::Json),
			_ => None,
		}
	}

	pub const fn name(self) -> &'static str {
		match self {
			WireFormat::MessagePack => "msgpack",
			WireFormat::Json => "json",
		}
	}
}

impl fmt::Display for WireFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Serialization strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
	/// Node table preserving identity, aliasing and cycles
	#[default]
	Graph,
	/// Nested dump; shared objects are duplicated, cycles rejected
	Tree,
}

impl StrategyKind {
	pub(crate) const fn tag(self) -> u8 {
		match self {
			StrategyKind::Graph => 1,
			StrategyKind::Tree => 2,
		}
	}

	pub(crate) const fn from_tag(tag: u8) -> Option<Self> {
		match tag {
			1 => Some(StrategyKind::Graph),
			2 => Some(StrategyKind::Tree),
			_ => None,
		}
	}

	pub const fn name(self) -> &'static str {
		match self {
			StrategyKind::Graph => "graph",
			StrategyKind::Tree => "tree",
		}
	}
}

impl fmt::Display for StrategyKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}
