use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::qt::decoder::size_summary;
use crate::qt::ordered_map::DEFAULT_MAX_TRAVERSAL_STEPS;
use crate::qt::resolve::{MAP_NODE_TEMPLATE, container_type};
use crate::qt::text::{DEFAULT_MAX_STRING_LEN, string_summary};
use crate::qt::{ListDecoder, MapDecoder, Result, SyntheticChildren, TypeHandle, TypeSignature, ValueHandle, VectorDecoder};

/// Decoder family selected for a container type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
	/// Contiguous storage (`QVector<T>`).
	Vector,
	/// Pointer-slot storage (`QList<T>`).
	List,
	/// Ordered tree map (`QMap<K, V>`).
	Map,
	/// UTF-16 text (`QString`).
	String,
}

impl ContainerKind {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Vector => "vector",
			Self::List => "list",
			Self::Map => "map",
			Self::String => "string",
		}
	}
}

/// Maps one template name and arity to a decoder family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatterRule {
	/// Base template name, without arguments.
	pub template: String,
	/// Number of template arguments the rule applies to.
	pub arity: usize,
	/// Decoder family to use.
	pub kind: ContainerKind,
}

impl FormatterRule {
	/// Build a rule.
	pub fn new(template: &str, arity: usize, kind: ContainerKind) -> Self {
		Self {
			template: template.to_owned(),
			arity,
			kind,
		}
	}
}

/// Formatter configuration; every field falls back to the Qt 5 defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
	/// Classification rules, first match wins.
	pub rules: Vec<FormatterRule>,
	/// Template name of the map's internal node type.
	pub map_node_template: String,
	/// String summary length used when the host exposes no setting.
	pub max_string_len: usize,
	/// Ceiling on hops per map successor step.
	pub max_traversal_steps: usize,
}

impl Default for FormatterConfig {
	fn default() -> Self {
		Self {
			rules: vec![
				FormatterRule::new("QVector", 1, ContainerKind::Vector),
				FormatterRule::new("QList", 1, ContainerKind::List),
				FormatterRule::new("QMap", 2, ContainerKind::Map),
				FormatterRule::new("QString", 0, ContainerKind::String),
			],
			map_node_template: MAP_NODE_TEMPLATE.to_owned(),
			max_string_len: DEFAULT_MAX_STRING_LEN,
			max_traversal_steps: DEFAULT_MAX_TRAVERSAL_STEPS,
		}
	}
}

impl FormatterConfig {
	/// Load a JSON configuration file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let raw = fs::read(path)?;
		Ok(serde_json::from_slice(&raw)?)
	}
}

/// One of the synthetic-children decoders, chosen at classification time.
#[derive(Debug, Clone)]
pub enum ContainerDecoder<H: ValueHandle> {
	/// Contiguous sequence.
	Vector(VectorDecoder<H>),
	/// Indirect sequence.
	List(ListDecoder<H>),
	/// Ordered map.
	Map(MapDecoder<H>),
}

impl<H: ValueHandle> ContainerDecoder<H> {
	/// Decoder family of this instance.
	pub fn kind(&self) -> ContainerKind {
		match self {
			Self::Vector(_) => ContainerKind::Vector,
			Self::List(_) => ContainerKind::List,
			Self::Map(_) => ContainerKind::Map,
		}
	}

	/// Whether a map traversal gave up on a malformed tree.
	pub fn is_corrupted(&self) -> bool {
		matches!(self, Self::Map(decoder) if decoder.is_corrupted())
	}

	fn inner(&self) -> &dyn SyntheticChildren<H> {
		match self {
			Self::Vector(decoder) => decoder,
			Self::List(decoder) => decoder,
			Self::Map(decoder) => decoder,
		}
	}

	fn inner_mut(&mut self) -> &mut dyn SyntheticChildren<H> {
		match self {
			Self::Vector(decoder) => decoder,
			Self::List(decoder) => decoder,
			Self::Map(decoder) => decoder,
		}
	}
}

impl<H: ValueHandle> SyntheticChildren<H> for ContainerDecoder<H> {
	fn update(&mut self) {
		self.inner_mut().update();
	}

	fn num_children(&self) -> usize {
		self.inner().num_children()
	}

	fn child_at_index(&mut self, index: usize) -> Option<H> {
		self.inner_mut().child_at_index(index)
	}
}

/// Type-name classifier and decoder factory.
#[derive(Debug, Clone, Default)]
pub struct FormatterRegistry {
	config: FormatterConfig,
}

impl FormatterRegistry {
	/// Registry over `config`.
	pub fn new(config: FormatterConfig) -> Self {
		Self { config }
	}

	/// Active configuration.
	pub fn config(&self) -> &FormatterConfig {
		&self.config
	}

	/// Decoder family for a type name, if any rule matches its signature.
	pub fn classify(&self, type_name: &str) -> Option<ContainerKind> {
		let signature = match TypeSignature::parse(type_name) {
			Ok(signature) => signature,
			Err(err) => {
				debug!(type_name, %err, "type name not classifiable");
				return None;
			}
		};
		self.config
			.rules
			.iter()
			.find(|rule| rule.template == signature.base && rule.arity == signature.arity())
			.map(|rule| rule.kind)
	}

	/// Decoder family for the declared type of `value`.
	pub fn classify_value<H: ValueHandle>(&self, value: &H) -> Option<ContainerKind> {
		self.classify(container_type(&value.type_handle()).name())
	}

	/// Updated synthetic-children decoder for `value`, when its type is a container.
	pub fn decoder_for<H: ValueHandle>(&self, value: &H) -> Option<ContainerDecoder<H>> {
		let mut decoder = match self.classify_value(value)? {
			ContainerKind::Vector => ContainerDecoder::Vector(VectorDecoder::new(value.clone())),
			ContainerKind::List => ContainerDecoder::List(ListDecoder::new(value.clone())),
			ContainerKind::Map => ContainerDecoder::Map(MapDecoder::with_options(
				value.clone(),
				&self.config.map_node_template,
				self.config.max_traversal_steps,
			)),
			ContainerKind::String => return None,
		};
		decoder.update();
		Some(decoder)
	}

	/// One-line summary: `size=N` for containers, quoted text for strings.
	pub fn summary<H: ValueHandle>(&self, value: &H) -> Option<String> {
		match self.classify_value(value)? {
			ContainerKind::String => Some(string_summary(value, self.config.max_string_len)),
			_ => self.decoder_for(value).map(|decoder| size_summary(decoder.num_children())),
		}
	}
}
