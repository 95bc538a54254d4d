//! Normalized graph documents.
//!
//! [`GraphData`] is the structured shape every source format parses into and
//! that [`Graph::export_data`](super::Graph::export_data) produces. Key order
//! of nodes, agents and edge lists is preserved so a document survives a
//! load/export cycle unchanged.

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// A whole graph document: nodes plus optional traversal data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	pub nodes: IndexMap<String, NodeData>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub traversal: Option<TraversalData>,
}

/// Attributes of a single node and the ids of its neighbors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
	pub id: String,
	#[serde(deserialize_with = "de_coordinate")]
	pub x: i32,
	#[serde(deserialize_with = "de_coordinate")]
	pub y: i32,
	#[serde(default)]
	pub color: String,
	#[serde(default)]
	pub label: String,
	#[serde(default)]
	pub edges: Vec<String>,
}

/// The agents moving over a graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TraversalData {
	#[serde(default)]
	pub agents: IndexMap<String, AgentData>,
}

/// Serialized form of an agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentData {
	pub id: String,
	pub start: String,
	#[serde(default)]
	pub label: String,
	#[serde(default)]
	pub steps: Vec<Step>,
}

/// One edge traversal: the agent walks from `from` to `to` over `timespan`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
	pub from: String,
	pub to: String,
	#[serde(deserialize_with = "de_timespan")]
	pub timespan: f64,
}

impl Step {
	/// Creates a step between two node ids.
	pub fn new(from: impl Into<String>, to: impl Into<String>, timespan: f64) -> Self {
		Self {
			from: from.into(),
			to: to.into(),
			timespan,
		}
	}
}

impl GraphData {
	/// Parses the structured (JSON) document form.
	pub fn from_json(raw: &str) -> Result<Self> {
		Ok(serde_json::from_str(raw)?)
	}

	/// Serializes into the structured document form.
	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string(self)?)
	}

	/// Same as [`to_json`](Self::to_json) but indented for display.
	pub fn to_json_pretty(&self) -> Result<String> {
		Ok(serde_json::to_string_pretty(self)?)
	}

	/// Writes the tagged markup form accepted by [`parse_xml`](super::parser::parse_xml).
	pub fn to_xml(&self) -> String {
		let mut out = String::from("<graph>\n");
		for node in self.nodes.values() {
			out.push_str(&format!(
				"\t<node id=\"{}\" color=\"{}\" x=\"{}\" y=\"{}\" label=\"{}\">\n",
				escape(&node.id),
				escape(&node.color),
				node.x,
				node.y,
				escape(&node.label),
			));
			for to in &node.edges {
				out.push_str(&format!("\t\t<edge to=\"{}\"/>\n", escape(to)));
			}
			out.push_str("\t</node>\n");
		}
		if let Some(traversal) = &self.traversal {
			out.push_str("\t<traversal>\n");
			for agent in traversal.agents.values() {
				out.push_str(&format!(
					"\t\t<agent id=\"{}\" label=\"{}\" start=\"{}\">\n",
					escape(&agent.id),
					escape(&agent.label),
					escape(&agent.start),
				));
				for step in &agent.steps {
					out.push_str(&format!(
						"\t\t\t<step from=\"{}\" to=\"{}\">{}</step>\n",
						escape(&step.from),
						escape(&step.to),
						step.timespan,
					));
				}
				out.push_str("\t\t</agent>\n");
			}
			out.push_str("\t</traversal>\n");
		}
		out.push_str("</graph>\n");
		out
	}

	/// Whether the document carries at least one agent.
	pub fn has_traversal(&self) -> bool {
		self.traversal
			.as_ref()
			.is_some_and(|traversal| !traversal.agents.is_empty())
	}
}

fn escape(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for ch in text.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&apos;"),
			_ => out.push(ch),
		}
	}
	out
}

/// Numbers may arrive as JSON numbers or, from markup, as text.
#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
	Int(i64),
	Float(f64),
	Text(String),
}

/// Reads an integer coordinate, truncating any fractional part.
pub(crate) fn parse_coordinate(text: &str) -> Option<i32> {
	let value: f64 = text.trim().parse().ok()?;
	coordinate_from_f64(value)
}

fn coordinate_from_f64(value: f64) -> Option<i32> {
	let truncated = value.trunc();
	if truncated.is_finite() && truncated >= i32::MIN as f64 && truncated <= i32::MAX as f64 {
		Some(truncated as i32)
	} else {
		None
	}
}

/// Reads a non-negative, finite duration.
pub(crate) fn parse_timespan(text: &str) -> Option<f64> {
	let value: f64 = text.trim().parse().ok()?;
	valid_timespan(value)
}

fn valid_timespan(value: f64) -> Option<f64> {
	(value.is_finite() && value >= 0.0).then_some(value)
}

fn de_coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i32, D::Error> {
	let parsed = match Numeric::deserialize(deserializer)? {
		Numeric::Int(value) => i32::try_from(value).ok(),
		Numeric::Float(value) => coordinate_from_f64(value),
		Numeric::Text(text) => parse_coordinate(&text),
	};
	parsed.ok_or_else(|| D::Error::custom("coordinate must be an integer"))
}

fn de_timespan<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
	let parsed = match Numeric::deserialize(deserializer)? {
		Numeric::Int(value) => valid_timespan(value as f64),
		Numeric::Float(value) => valid_timespan(value),
		Numeric::Text(text) => parse_timespan(&text),
	};
	parsed.ok_or_else(|| D::Error::custom("timespan must be a non-negative number"))
}
