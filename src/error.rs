//! Error type shared by the graph core.

use thiserror::Error;

/// Result alias used across the graph core.
pub type Result<T> = std::result::Result<T, ChronographError>;

/// Failures raised while loading, building or importing graph data.
///
/// Edit-time leniencies (adding an edge that already exists, deleting a node
/// that is not there) are not errors and never produce one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChronographError {
	/// The source document could not be parsed or lacks required fields.
	#[error("invalid graph document: {0}")]
	Format(String),

	/// A node lists a neighbor that is not part of the graph, or itself.
	#[error("graph contains an invalid edge from `{from}` to `{to}`")]
	InvalidEdge { from: String, to: String },

	/// An agent starts at a node that does not exist.
	#[error("agent `{agent}` must start at a valid node, `{start}` does not exist")]
	InvalidStart { agent: String, start: String },

	/// An agent step references an unknown node or breaks the step chain.
	#[error("agent `{agent}` has an invalid step at index {index}: {reason}")]
	InvalidStep {
		agent: String,
		index: usize,
		reason: String,
	},

	/// A raw traversal log does not match the graph it is imported into.
	#[error("invalid traversal data: {0}")]
	InvalidData(String),

	/// A node with the same id is already part of the graph.
	#[error("node `{0}` already exists")]
	DuplicateNode(String),
}

impl ChronographError {
	pub(crate) fn format(message: impl Into<String>) -> Self {
		ChronographError::Format(message.into())
	}

	pub(crate) fn invalid_data(message: impl Into<String>) -> Self {
		ChronographError::InvalidData(message.into())
	}
}

impl From<serde_json::Error> for ChronographError {
	fn from(value: serde_json::Error) -> Self {
		ChronographError::Format(value.to_string())
	}
}

impl From<roxmltree::Error> for ChronographError {
	fn from(value: roxmltree::Error) -> Self {
		ChronographError::Format(value.to_string())
	}
}
