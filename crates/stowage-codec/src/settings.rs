//! Serializer configuration
//!
//! Selects the strategy, wire format and field selection policy at runtime.
//! Settings are usually loaded from a TOML table:
//!
//! ```toml
//! strategy = "graph"
//! format = "msgpack"
//! include_only_read_write_fields = true
//! max_depth = 64
//! ```

use crate::error::{CodecError, CodecResult};
use crate::format::{StrategyKind, WireFormat};
use crate::graph::GraphCodec;
use crate::serializer::ObjectSerializer;
use crate::tree::{DEFAULT_MAX_DEPTH, MAX_DOCUMENT_DEPTH, TreeCodec};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use stowage_core::{FieldSelectionPolicy, TypeRegistry};

/// Object serializer settings
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use stowage_codec::{ObjectSerializer, SerializerSettings, StrategyKind, WireFormat};
/// use stowage_core::TypeRegistry;
///
/// let settings = SerializerSettings::from_toml_str(r#"
///     strategy = "tree"
///     format = "json"
///     IncludeOnlyReadWriteFields = false
/// "#).unwrap();
///
/// assert_eq!(settings.strategy, StrategyKind::Tree);
/// assert_eq!(settings.format, WireFormat::Json);
/// assert!(!settings.include_only_read_write_fields);
///
/// let serializer = settings.build(Arc::new(TypeRegistry::new())).unwrap();
/// assert_eq!(serializer.strategy(), StrategyKind::Tree);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerializerSettings {
	/// Serialization strategy
	pub strategy: StrategyKind,
	/// Wire format used when writing
	pub format: WireFormat,
	/// Write only members that are both readable and assignable
	#[serde(alias = "IncludeOnlyReadWriteFields")]
	pub include_only_read_write_fields: bool,
	/// Object nesting limit for the tree strategy, at most
	/// [`MAX_DOCUMENT_DEPTH`]
	pub max_depth: usize,
}

impl Default for SerializerSettings {
	fn default() -> Self {
		Self {
			strategy: StrategyKind::default(),
			format: WireFormat::default(),
			include_only_read_write_fields: true,
			max_depth: DEFAULT_MAX_DEPTH,
		}
	}
}

impl SerializerSettings {
	/// Parse and validate settings from a TOML document.
	pub fn from_toml_str(source: &str) -> CodecResult<Self> {
		let settings: Self = toml::from_str(source).map_err(|e| CodecError::InvalidSettings {
			message: e.to_string(),
		})?;
		settings.validate()?;
		Ok(settings)
	}

	/// Load settings from a TOML file.
	pub fn from_toml_file(path: impl AsRef<Path>) -> CodecResult<Self> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|e| CodecError::InvalidSettings {
			message: format!("cannot read {}: {}", path.display(), e),
		})?;
		Self::from_toml_str(&source)
	}

	pub fn to_toml_string(&self) -> CodecResult<String> {
		toml::to_string(self).map_err(|e| CodecError::InvalidSettings {
			message: e.to_string(),
		})
	}

	pub fn validate(&self) -> CodecResult<()> {
		if self.max_depth == 0 {
			return Err(CodecError::InvalidSettings {
				message: "max_depth must be at least 1".to_string(),
			});
		}
		if self.max_depth > MAX_DOCUMENT_DEPTH {
			return Err(CodecError::InvalidSettings {
				message: format!(
					"max_depth {} is above the document nesting limit of {}",
					self.max_depth, MAX_DOCUMENT_DEPTH
				),
			});
		}
		Ok(())
	}

	pub fn policy(&self) -> FieldSelectionPolicy {
		FieldSelectionPolicy::new(self.include_only_read_write_fields)
	}

	/// Build the configured serializer over `registry`.
	pub fn build(&self, registry: Arc<TypeRegistry>) -> CodecResult<Arc<dyn ObjectSerializer>> {
		self.validate()?;
		tracing::debug!(
			strategy = %self.strategy,
			format = %self.format,
			include_only_read_write_fields = self.include_only_read_write_fields,
			types = registry.len(),
			"Building object serializer"
		);
		Ok(match self.strategy {
			StrategyKind::Graph => Arc::new(
				GraphCodec::new(registry)
					.with_policy(self.policy())
					.with_format(self.format),
			),
			StrategyKind::Tree => Arc::new(
				TreeCodec::new(registry)
					.with_policy(self.policy())
					.with_format(self.format)
					.with_max_depth(self.max_depth),
			),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_empty_document_gives_defaults() {
		let settings = SerializerSettings::from_toml_str("").unwrap();
		assert_eq!(settings, SerializerSettings::default());
		assert_eq!(settings.strategy, StrategyKind::Graph);
		assert_eq!(settings.format, WireFormat::MessagePack);
		assert!(settings.include_only_read_write_fields);
		assert_eq!(settings.max_depth, 64);
	}

	#[rstest]
	#[case("compression = true")]
	#[case("strategy = \"binary\"")]
	#[case("format = 3")]
	#[case("max_depth = 0")]
	#[case("max_depth = 101")]
	#[case("max_depth = 100000")]
	fn test_invalid_settings(#[case] source: &str) {
		assert!(matches!(
			SerializerSettings::from_toml_str(source),
			Err(CodecError::InvalidSettings { .. })
		));
	}

	#[rstest]
	fn test_build_rejects_depth_above_document_limit() {
		let settings = SerializerSettings {
			strategy: StrategyKind::Tree,
			max_depth: MAX_DOCUMENT_DEPTH + 1,
			..Default::default()
		};
		assert!(matches!(
			settings.build(Arc::new(TypeRegistry::new())),
			Err(CodecError::InvalidSettings { .. })
		));

		let settings = SerializerSettings {
			max_depth: MAX_DOCUMENT_DEPTH,
			..settings
		};
		assert!(settings.build(Arc::new(TypeRegistry::new())).is_ok());
	}

	#[rstest]
	fn test_toml_round_trip() {
		let settings = SerializerSettings {
			strategy: StrategyKind::Tree,
			format: WireFormat::Json,
			include_only_read_write_fields: false,
			max_depth: 12,
		};
		let source = settings.to_toml_string().unwrap();
		assert_eq!(SerializerSettings::from_toml_str(&source).unwrap(), settings);
	}

	#[rstest]
	fn test_build_selects_strategy() {
		let registry = Arc::new(TypeRegistry::new());
		for (strategy, expected) in [
			(StrategyKind::Graph, StrategyKind::Graph),
			(StrategyKind::Tree, StrategyKind::Tree),
		] {
			let settings = SerializerSettings {
				strategy,
				..Default::default()
			};
			assert_eq!(settings.build(registry.clone()).unwrap().strategy(), expected);
		}
	}
}
