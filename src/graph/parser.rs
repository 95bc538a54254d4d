//! Source document parsing.

use std::fmt;
use std::str::FromStr;

use log::debug;
use roxmltree::{Document, Node as XmlNode};

use super::data::{AgentData, GraphData, NodeData, Step, TraversalData, parse_coordinate, parse_timespan};
use crate::error::{ChronographError, Result};

/// Formats chronograph can read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataFormat {
	/// Tagged markup with `<node>` and `<agent>` elements.
	Xml,
	/// The structured document produced by [`GraphData::to_json`].
	Json,
	/// A semicolon-delimited traversal log, see [`import`](super::import).
	RawTraversal,
}

impl FromStr for DataFormat {
	type Err = ChronographError;

	fn from_str(s: &str) -> Result<Self> {
		match s.to_ascii_lowercase().as_str() {
			"xml" => Ok(DataFormat::Xml),
			"json" => Ok(DataFormat::Json),
			"raw_traversal" => Ok(DataFormat::RawTraversal),
			other => Err(ChronographError::format(format!("unknown data format `{other}`"))),
		}
	}
}

impl fmt::Display for DataFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			DataFormat::Xml => "xml",
			DataFormat::Json => "json",
			DataFormat::RawTraversal => "raw_traversal",
		};
		f.write_str(name)
	}
}

/// Parses a graph document in the given format.
pub fn parse(raw: &str, format: DataFormat) -> Result<GraphData> {
	match format {
		DataFormat::Json => GraphData::from_json(raw),
		DataFormat::Xml => parse_xml(raw),
		DataFormat::RawTraversal => Err(ChronographError::format(
			"raw traversal data describes an agent, not a graph",
		)),
	}
}

/// Parses the tagged markup form.
///
/// Every `<node>` below the root becomes a node; its `<edge to="..">`
/// children list its neighbors in order. `<agent>` elements are optional and
/// produce a traversal section only when at least one is present.
pub fn parse_xml(raw: &str) -> Result<GraphData> {
	let doc = Document::parse(raw)?;
	let mut data = GraphData::default();

	for element in doc.descendants().filter(|n| n.has_tag_name("node")) {
		let node = parse_node(element)?;
		if data.nodes.contains_key(&node.id) {
			return Err(ChronographError::DuplicateNode(node.id));
		}
		data.nodes.insert(node.id.clone(), node);
	}

	let mut agents = doc.descendants().filter(|n| n.has_tag_name("agent")).peekable();
	if agents.peek().is_some() {
		let mut traversal = TraversalData::default();
		for element in agents {
			let agent = parse_agent(element)?;
			traversal.agents.insert(agent.id.clone(), agent);
		}
		data.traversal = Some(traversal);
	}

	debug!(
		"Parsed markup graph with {} nodes and {} agents",
		data.nodes.len(),
		data.traversal.as_ref().map_or(0, |t| t.agents.len())
	);
	Ok(data)
}

fn required<'a>(element: XmlNode<'a, '_>, name: &str) -> Result<&'a str> {
	element.attribute(name).ok_or_else(|| {
		ChronographError::format(format!(
			"<{}> is missing the `{name}` attribute",
			element.tag_name().name()
		))
	})
}

fn coordinate(element: XmlNode<'_, '_>, name: &str) -> Result<i32> {
	let text = required(element, name)?;
	parse_coordinate(text).ok_or_else(|| {
		ChronographError::format(format!("`{name}` must be an integer, found `{text}`"))
	})
}

fn parse_node(element: XmlNode<'_, '_>) -> Result<NodeData> {
	let edges = element
		.descendants()
		.filter(|n| n.has_tag_name("edge"))
		.map(|edge| required(edge, "to").map(str::to_string))
		.collect::<Result<Vec<_>>>()?;

	Ok(NodeData {
		id: required(element, "id")?.to_string(),
		x: coordinate(element, "x")?,
		y: coordinate(element, "y")?,
		color: element.attribute("color").unwrap_or_default().to_string(),
		label: element.attribute("label").unwrap_or_default().to_string(),
		edges,
	})
}

fn parse_agent(element: XmlNode<'_, '_>) -> Result<AgentData> {
	let steps = element
		.descendants()
		.filter(|n| n.has_tag_name("step"))
		.map(parse_step)
		.collect::<Result<Vec<_>>>()?;

	Ok(AgentData {
		id: required(element, "id")?.to_string(),
		start: required(element, "start")?.to_string(),
		label: element.attribute("label").unwrap_or_default().to_string(),
		steps,
	})
}

fn parse_step(element: XmlNode<'_, '_>) -> Result<Step> {
	let text = element.text().unwrap_or_default();
	let timespan = parse_timespan(text).ok_or_else(|| {
		ChronographError::format(format!("step timespan must be a non-negative number, found `{text}`"))
	})?;
	Ok(Step::new(required(element, "from")?, required(element, "to")?, timespan))
}
