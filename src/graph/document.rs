//! A named graph loaded from raw text.

use log::{error, info};

use super::data::GraphData;
use super::import::import_traversal_log;
use super::model::Graph;
use super::parser::{self, DataFormat};
use crate::config::GraphSettings;
use crate::error::{ChronographError, Result};

/// A stored graph: identity, parsed source and the model built from it.
///
/// The model is built on first access. A failed build leaves no model
/// behind, so the next access tries again from the source.
#[derive(Clone, Debug)]
pub struct GraphDocument {
	id: Option<String>,
	name: String,
	source: GraphData,
	settings: GraphSettings,
	graph: Option<Graph>,
}

impl GraphDocument {
	pub fn new(id: Option<String>, name: impl Into<String>, source: GraphData) -> Self {
		Self {
			id,
			name: name.into(),
			source,
			settings: GraphSettings::default(),
			graph: None,
		}
	}

	/// Parses `raw` in the given format.
	pub fn load(
		id: Option<String>,
		name: impl Into<String>,
		raw: &str,
		format: DataFormat,
	) -> Result<Self> {
		let source = parser::parse(raw, format)?;
		Ok(Self::new(id, name, source))
	}

	pub fn with_settings(mut self, settings: GraphSettings) -> Self {
		self.settings = settings;
		self.graph = None;
		self
	}

	pub fn id(&self) -> Option<&str> {
		self.id.as_deref()
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Whether the document has agents to play back.
	pub fn has_traversal(&self) -> bool {
		match &self.graph {
			Some(graph) => graph.agents().next().is_some(),
			None => self.source.has_traversal(),
		}
	}

	/// The model, building it from the source if needed.
	pub fn graph(&mut self) -> Result<&mut Graph> {
		let graph = match self.graph.take() {
			Some(graph) => graph,
			None => Graph::build_with(&self.source, self.settings.clone()).inspect_err(|e| {
				error!("Cannot initialize graph {}: {e}", self.name);
			})?,
		};
		Ok(self.graph.insert(graph))
	}

	/// The model if it has been built.
	pub fn built_graph(&self) -> Option<&Graph> {
		self.graph.as_ref()
	}

	/// Imports a traversal log as a new agent and returns the agent's id.
	pub fn import_traversal(&mut self, raw: &str, label: &str, format: DataFormat) -> Result<String> {
		if format != DataFormat::RawTraversal {
			return Err(ChronographError::format(format!(
				"cannot import {format} data, only raw traversal logs are supported"
			)));
		}
		let graph = self.graph()?;
		let id = import_traversal_log(graph, raw, label)?.id.clone();
		info!("Imported traversal {id} into {}", self.name);
		Ok(id)
	}

	/// The current normalized document.
	pub fn export_data(&self) -> GraphData {
		match &self.graph {
			Some(graph) => graph.export_data(),
			None => self.source.clone(),
		}
	}
}
