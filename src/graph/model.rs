//! The in-memory graph: nodes, undirected edges, agents and edit state.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use indexmap::IndexMap;
use log::{debug, info, warn};

use super::data::{AgentData, GraphData, NodeData, Step, TraversalData};
use crate::config::GraphSettings;
use crate::error::{ChronographError, Result};

/// A point in graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Linear interpolation towards `to`; `fraction` 0 is `self`, 1 is `to`.
	pub fn lerp(self, to: Point, fraction: f64) -> Point {
		Point {
			x: self.x + (to.x - self.x) * fraction,
			y: self.y + (to.y - self.y) * fraction,
		}
	}
}

/// An undirected edge. `Edge::new(a, b) == Edge::new(b, a)`.
#[derive(Clone, Debug, Eq)]
pub struct Edge {
	node1: String,
	node2: String,
}

impl Edge {
	pub fn new(node1: impl Into<String>, node2: impl Into<String>) -> Self {
		Self {
			node1: node1.into(),
			node2: node2.into(),
		}
	}

	pub fn node1(&self) -> &str {
		&self.node1
	}

	pub fn node2(&self) -> &str {
		&self.node2
	}

	/// The endpoint opposite to `id`, if `id` is an endpoint.
	pub fn other(&self, id: &str) -> Option<&str> {
		if self.node1 == id {
			Some(&self.node2)
		} else if self.node2 == id {
			Some(&self.node1)
		} else {
			None
		}
	}

	fn ordered(&self) -> (&str, &str) {
		if self.node1 <= self.node2 {
			(&self.node1, &self.node2)
		} else {
			(&self.node2, &self.node1)
		}
	}
}

impl PartialEq for Edge {
	fn eq(&self, other: &Self) -> bool {
		self.ordered() == other.ordered()
	}
}

impl Hash for Edge {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.ordered().hash(state);
	}
}

impl fmt::Display for Edge {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Edge({} to {})", self.node1, self.node2)
	}
}

/// A graph vertex. Its edge map is keyed by neighbor id.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: String,
	pub x: i32,
	pub y: i32,
	pub color: String,
	pub label: String,
	edges: IndexMap<String, Edge>,
}

impl Node {
	pub fn new(
		id: impl Into<String>,
		x: i32,
		y: i32,
		color: impl Into<String>,
		label: impl Into<String>,
	) -> Self {
		Self {
			id: id.into(),
			x,
			y,
			color: color.into(),
			label: label.into(),
			edges: IndexMap::new(),
		}
	}

	pub fn point(&self) -> Point {
		Point::new(self.x as f64, self.y as f64)
	}

	/// Edges keyed by the id of the node on the other end.
	pub fn edges(&self) -> &IndexMap<String, Edge> {
		&self.edges
	}

	pub fn neighbors(&self) -> impl Iterator<Item = &str> {
		self.edges.keys().map(String::as_str)
	}

	pub fn is_adjacent(&self, id: &str) -> bool {
		self.edges.contains_key(id)
	}

	fn export(&self) -> NodeData {
		NodeData {
			id: self.id.clone(),
			x: self.x,
			y: self.y,
			color: self.color.clone(),
			label: self.label.clone(),
			edges: self.edges.keys().cloned().collect(),
		}
	}
}

impl fmt::Display for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Node({})", self.id)
	}
}

/// An entity walking a fixed sequence of steps through the graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
	pub id: String,
	pub start: String,
	pub label: String,
	steps: Vec<Step>,
	pub(super) position: Option<Point>,
	selected: bool,
}

impl Agent {
	pub fn new(
		id: impl Into<String>,
		start: impl Into<String>,
		label: impl Into<String>,
		steps: Vec<Step>,
	) -> Self {
		Self {
			id: id.into(),
			start: start.into(),
			label: label.into(),
			steps,
			position: None,
			selected: false,
		}
	}

	pub fn steps(&self) -> &[Step] {
		&self.steps
	}

	/// Where the agent was last placed, `None` if its nodes are gone.
	pub fn position(&self) -> Option<Point> {
		self.position
	}

	pub fn is_selected(&self) -> bool {
		self.selected
	}

	fn export(&self) -> AgentData {
		AgentData {
			id: self.id.clone(),
			start: self.start.clone(),
			label: self.label.clone(),
			steps: self.steps.clone(),
		}
	}
}

impl fmt::Display for Agent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Agent({})", self.id)
	}
}

/// Whether the graph is being looked at or changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
	#[default]
	View,
	Edit,
}

impl fmt::Display for Mode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Mode::View => "view",
			Mode::Edit => "edit",
		})
	}
}

/// The structural tool active while in [`Mode::Edit`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EditMode {
	#[default]
	Select,
	AddNode,
	DeleteNode,
	AddEdge,
	DeleteEdge,
}

impl EditMode {
	/// Toolbar order.
	pub const ALL: [EditMode; 5] = [
		EditMode::Select,
		EditMode::AddNode,
		EditMode::DeleteNode,
		EditMode::AddEdge,
		EditMode::DeleteEdge,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			EditMode::Select => "select",
			EditMode::AddNode => "add_node",
			EditMode::DeleteNode => "delete_node",
			EditMode::AddEdge => "add_edge",
			EditMode::DeleteEdge => "delete_edge",
		}
	}
}

impl fmt::Display for EditMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for EditMode {
	type Err = ChronographError;

	fn from_str(s: &str) -> Result<Self> {
		EditMode::ALL
			.into_iter()
			.find(|mode| mode.as_str() == s)
			.ok_or_else(|| ChronographError::format(format!("unknown edit mode `{s}`")))
	}
}

/// What a click on a node did.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeClick {
	/// Selection toggled; holds the node selected afterwards.
	Selected(Option<String>),
	/// The node is marked for deletion and awaits confirmation.
	ConfirmDelete(String),
	/// First endpoint of an edge gesture chosen.
	EdgeStarted(String),
	/// The pending first endpoint was clicked again and the gesture dropped.
	EdgeCancelled(String),
	/// Second endpoint chosen; `changed` is false when the graph was already in the requested state.
	EdgeFinished { edge: Edge, changed: bool },
	/// Nothing happened.
	Ignored,
}

/// Counts shown in the info panel.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphSummary {
	pub nodes: usize,
	pub edges: usize,
	pub agents: usize,
	pub current_step: f64,
	pub max_steps: usize,
}

/// A graph with its agents, time cursor and edit state.
#[derive(Clone, Debug)]
pub struct Graph {
	pub(super) nodes: IndexMap<String, Node>,
	pub(super) edges: Vec<Edge>,
	pub(super) agents: IndexMap<String, Agent>,
	pub(super) settings: GraphSettings,

	pub(super) current_step: f64,
	pub(super) calculated_step: usize,
	pub(super) max_steps: usize,
	pub(super) traversal_map: IndexMap<String, u32>,
	pub(super) max_traverse: u32,

	mode: Mode,
	edit_mode: EditMode,
	selected_node: Option<String>,
	pending_edge: Option<String>,
	next_node_id: usize,
}

impl Graph {
	/// An empty graph with no nodes or agents.
	pub fn new(settings: GraphSettings) -> Self {
		Self {
			nodes: IndexMap::new(),
			edges: Vec::new(),
			agents: IndexMap::new(),
			settings,
			current_step: 0.0,
			calculated_step: 0,
			max_steps: 0,
			traversal_map: IndexMap::new(),
			max_traverse: 0,
			mode: Mode::default(),
			edit_mode: EditMode::default(),
			selected_node: None,
			pending_edge: None,
			next_node_id: 0,
		}
	}

	/// Builds a graph from a parsed document with default settings.
	pub fn build(data: &GraphData) -> Result<Self> {
		Self::build_with(data, GraphSettings::default())
	}

	/// Builds a graph from a parsed document.
	///
	/// Neighbor lists may name each edge from one or both ends; either way a
	/// single edge is created per pair and registered on both endpoints.
	pub fn build_with(data: &GraphData, settings: GraphSettings) -> Result<Self> {
		let mut graph = Graph::new(settings);

		for node in data.nodes.values() {
			if graph.nodes.contains_key(&node.id) {
				return Err(ChronographError::DuplicateNode(node.id.clone()));
			}
			graph.nodes.insert(
				node.id.clone(),
				Node::new(&node.id, node.x, node.y, &node.color, &node.label),
			);
		}
		graph.next_node_id = graph.nodes.len();

		for node in data.nodes.values() {
			for to in &node.edges {
				if *to == node.id || !graph.nodes.contains_key(to) {
					return Err(ChronographError::InvalidEdge {
						from: node.id.clone(),
						to: to.clone(),
					});
				}
				graph.link(&node.id, to);
			}
		}

		if let Some(traversal) = &data.traversal {
			for agent in traversal.agents.values() {
				graph.validate_agent(agent)?;
				graph.agents.insert(
					agent.id.clone(),
					Agent::new(&agent.id, &agent.start, &agent.label, agent.steps.clone()),
				);
			}
		}

		graph.set_max_steps();
		graph.refresh_time();
		info!(
			"Built graph with {} nodes, {} edges and {} agents",
			graph.nodes.len(),
			graph.edges.len(),
			graph.agents.len()
		);
		Ok(graph)
	}

	fn validate_agent(&self, agent: &AgentData) -> Result<()> {
		if !self.nodes.contains_key(&agent.start) {
			return Err(ChronographError::InvalidStart {
				agent: agent.id.clone(),
				start: agent.start.clone(),
			});
		}

		let mut at = agent.start.as_str();
		for (index, step) in agent.steps.iter().enumerate() {
			let invalid = |reason: String| ChronographError::InvalidStep {
				agent: agent.id.clone(),
				index,
				reason,
			};
			if let Some(unknown) = [&step.from, &step.to]
				.into_iter()
				.find(|id| !self.nodes.contains_key(id.as_str()))
			{
				return Err(invalid(format!("node `{unknown}` does not exist")));
			}
			if step.from != at {
				return Err(invalid(format!(
					"step leaves `{}` but the agent is at `{at}`",
					step.from
				)));
			}
			at = step.to.as_str();
		}
		Ok(())
	}

	/// Registers an edge on both endpoints unless they are already adjacent.
	fn link(&mut self, a: &str, b: &str) -> bool {
		if self.nodes.get(a).is_some_and(|node| node.is_adjacent(b)) {
			return false;
		}
		let edge = Edge::new(a, b);
		for (from, to) in [(a, b), (b, a)] {
			if let Some(node) = self.nodes.get_mut(from) {
				node.edges.insert(to.to_string(), edge.clone());
			}
		}
		self.edges.push(edge);
		true
	}

	pub fn settings(&self) -> &GraphSettings {
		&self.settings
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.get(id)
	}

	pub fn contains_node(&self, id: &str) -> bool {
		self.nodes.contains_key(id)
	}

	pub fn nodes(&self) -> impl Iterator<Item = &Node> {
		self.nodes.values()
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn agent(&self, id: &str) -> Option<&Agent> {
		self.agents.get(id)
	}

	pub fn agents(&self) -> impl Iterator<Item = &Agent> {
		self.agents.values()
	}

	pub fn mode(&self) -> Mode {
		self.mode
	}

	pub fn edit_mode(&self) -> EditMode {
		self.edit_mode
	}

	pub fn selected_node(&self) -> Option<&str> {
		self.selected_node.as_deref()
	}

	pub fn is_selected(&self, id: &str) -> bool {
		self.selected_node.as_deref() == Some(id)
	}

	/// First endpoint of an unfinished add/delete edge gesture.
	pub fn pending_edge(&self) -> Option<&str> {
		self.pending_edge.as_deref()
	}

	/// Switches between viewing and editing. Either way the edit tool falls
	/// back to [`EditMode::Select`] and the selection is cleared.
	pub fn set_mode(&mut self, mode: Mode) {
		info!("Setting graph to {mode} mode.");
		self.set_edit_mode(EditMode::Select);
		self.mode = mode;
		self.select_node(None);
	}

	pub fn set_edit_mode(&mut self, edit_mode: EditMode) {
		debug!("Setting graph edit mode to {edit_mode}");
		self.edit_mode = edit_mode;
		self.pending_edge = None;
		if matches!(
			edit_mode,
			EditMode::AddNode | EditMode::AddEdge | EditMode::DeleteNode
		) {
			self.select_node(None);
		}
	}

	/// Toggles `id` as the only selected node; `None` clears the selection.
	pub fn select_node(&mut self, id: Option<&str>) {
		match id {
			None => self.selected_node = None,
			Some(id) if self.is_selected(id) => self.selected_node = None,
			Some(id) if self.nodes.contains_key(id) => self.selected_node = Some(id.to_string()),
			Some(id) => debug!("Ignoring selection of unknown node {id}"),
		}
	}

	/// Adds a node with no edges and selects it.
	pub fn add_node(&mut self, node: Node) -> Result<()> {
		if self.nodes.contains_key(&node.id) {
			return Err(ChronographError::DuplicateNode(node.id));
		}
		self.insert_node(node);
		Ok(())
	}

	fn insert_node(&mut self, mut node: Node) {
		node.edges.clear();
		let id = node.id.clone();
		debug!("Adding {node}");
		self.nodes.insert(id.clone(), node);
		self.selected_node = Some(id);
		self.refresh_time();
	}

	/// Creates a node at a graph-space position with a fresh id, the next
	/// palette color and a default label. Returns the new id.
	pub fn create_node_at(&mut self, x: f64, y: f64) -> String {
		let mut id = format!("{}{}", self.settings.node_prefix, self.next_node_id);
		while self.nodes.contains_key(&id) {
			self.next_node_id += 1;
			id = format!("{}{}", self.settings.node_prefix, self.next_node_id);
		}
		let palette = self.settings.palette;
		let color = if palette.is_empty() {
			""
		} else {
			palette[self.next_node_id.saturating_sub(1) % palette.len()]
		};
		let node = Node::new(
			id.clone(),
			x as i32,
			y as i32,
			color,
			format!("Node {}", self.next_node_id),
		);
		self.next_node_id += 1;
		self.insert_node(node);
		id
	}

	/// Removes a node and every edge touching it. Unknown ids are ignored.
	pub fn delete_node(&mut self, id: &str) -> bool {
		let Some(node) = self.nodes.shift_remove(id) else {
			return false;
		};
		for (other, edge) in &node.edges {
			if let Some(neighbor) = self.nodes.get_mut(other) {
				neighbor.edges.shift_remove(id);
			}
			self.edges.retain(|e| e != edge);
		}
		if self.is_selected(id) {
			self.selected_node = None;
		}
		if self.pending_edge.as_deref() == Some(id) {
			self.pending_edge = None;
		}
		self.traversal_map.shift_remove(id);

		let stranded = self
			.agents
			.values()
			.filter(|agent| {
				agent.start == id || agent.steps.iter().any(|s| s.from == id || s.to == id)
			})
			.count();
		if stranded > 0 {
			warn!("Deleted {node} is still on the path of {stranded} agents");
		}
		info!("Deleted {node} and {} edges", node.edges.len());
		self.refresh_time();
		true
	}

	/// Connects two nodes. Self-loops, unknown nodes and existing edges are
	/// left alone and reported by returning false.
	pub fn add_edge(&mut self, a: &str, b: &str) -> bool {
		if a == b {
			debug!("Refusing self-loop on {a}");
			return false;
		}
		if !self.nodes.contains_key(a) || !self.nodes.contains_key(b) {
			warn!("Cannot connect {a} and {b}: unknown node");
			return false;
		}
		let edge = Edge::new(a, b);
		if self.edges.contains(&edge) {
			info!("Only one edge can exist between two nodes.");
			return false;
		}
		self.link(a, b)
	}

	/// Disconnects two nodes. Returns false if they were not adjacent.
	pub fn remove_edge(&mut self, a: &str, b: &str) -> bool {
		let edge = Edge::new(a, b);
		let before = self.edges.len();
		self.edges.retain(|e| *e != edge);
		if self.edges.len() == before {
			debug!("No edge between {a} and {b}");
			return false;
		}
		for (from, to) in [(a, b), (b, a)] {
			if let Some(node) = self.nodes.get_mut(from) {
				node.edges.shift_remove(to);
			}
		}
		debug!("Removed {edge}");
		true
	}

	/// Moves a node and re-places the agents at the current time.
	pub fn move_node(&mut self, id: &str, x: i32, y: i32) -> bool {
		let Some(node) = self.nodes.get_mut(id) else {
			return false;
		};
		node.x = x;
		node.y = y;
		self.position_agents();
		true
	}

	/// Dispatches a click on a node according to the mode and edit tool.
	pub fn handle_node_click(&mut self, id: &str) -> NodeClick {
		if !self.nodes.contains_key(id) {
			return NodeClick::Ignored;
		}
		if self.mode == Mode::View {
			self.select_node(Some(id));
			return NodeClick::Selected(self.selected_node.clone());
		}
		match self.edit_mode {
			EditMode::Select | EditMode::AddNode => {
				self.select_node(Some(id));
				NodeClick::Selected(self.selected_node.clone())
			}
			EditMode::DeleteNode => {
				self.selected_node = Some(id.to_string());
				NodeClick::ConfirmDelete(id.to_string())
			}
			EditMode::AddEdge | EditMode::DeleteEdge => match self.pending_edge.take() {
				None => {
					debug!("Starting an edge gesture at {id}");
					self.pending_edge = Some(id.to_string());
					NodeClick::EdgeStarted(id.to_string())
				}
				Some(from) if from == id => {
					debug!("Cancelled the edge gesture at {id}");
					NodeClick::EdgeCancelled(from)
				}
				Some(from) => {
					let changed = if self.edit_mode == EditMode::AddEdge {
						self.add_edge(&from, id)
					} else {
						self.remove_edge(&from, id)
					};
					NodeClick::EdgeFinished {
						edge: Edge::new(from, id),
						changed,
					}
				}
			},
		}
	}

	/// Dropping a pending delete keeps the node and clears the selection.
	pub fn cancel_delete(&mut self) {
		self.select_node(None);
	}

	/// Dispatches a click on empty canvas. In the add-node tool this creates
	/// a node at the given graph-space position and returns its id.
	pub fn handle_canvas_click(&mut self, x: f64, y: f64) -> Option<String> {
		(self.mode == Mode::Edit && self.edit_mode == EditMode::AddNode)
			.then(|| self.create_node_at(x, y))
	}

	/// Toggles an agent's selection; several agents may be selected at once.
	pub fn toggle_agent_selection(&mut self, id: &str) -> bool {
		match self.agents.get_mut(id) {
			Some(agent) => {
				agent.selected = !agent.selected;
				agent.selected
			}
			None => false,
		}
	}

	/// An agent is dimmed while some other agent is selected and it is not.
	pub fn is_agent_dimmed(&self, id: &str) -> bool {
		let selected = self.agents.get(id).is_some_and(Agent::is_selected);
		!selected && self.agents.values().any(Agent::is_selected)
	}

	/// Next free agent id, probing upwards from the agent count plus one.
	pub(super) fn next_agent_id(&self) -> String {
		let mut n = self.agents.len() + 1;
		loop {
			let id = format!("{}{}", self.settings.agent_prefix, n);
			if !self.agents.contains_key(&id) {
				return id;
			}
			n += 1;
		}
	}

	/// Appends an agent and brings lengths, positions and counts up to date.
	pub(super) fn insert_agent(&mut self, agent: Agent) -> &Agent {
		info!("Adding {agent} with {} steps", agent.steps.len());
		let (index, _) = self.agents.insert_full(agent.id.clone(), agent);
		self.set_max_steps();
		self.refresh_time();
		&self.agents[index]
	}

	/// Exports the normalized document, without selection or positions.
	pub fn export_data(&self) -> GraphData {
		let nodes = self
			.nodes
			.values()
			.map(|node| (node.id.clone(), node.export()))
			.collect();
		let traversal = (!self.agents.is_empty()).then(|| TraversalData {
			agents: self
				.agents
				.values()
				.map(|agent| (agent.id.clone(), agent.export()))
				.collect(),
		});
		GraphData { nodes, traversal }
	}

	pub fn summary(&self) -> GraphSummary {
		GraphSummary {
			nodes: self.nodes.len(),
			edges: self.edges.len(),
			agents: self.agents.len(),
			current_step: (self.current_step * 100.0).round() / 100.0,
			max_steps: self.max_steps,
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn node_data(id: &str, x: i32, y: i32, edges: &[&str]) -> NodeData {
		NodeData {
			id: id.into(),
			x,
			y,
			color: "#1f77b4".into(),
			label: id.to_uppercase(),
			edges: edges.iter().map(|e| e.to_string()).collect(),
		}
	}

	fn triangle() -> GraphData {
		let mut data = GraphData::default();
		for node in [
			node_data("g0", 0, 0, &["g1", "g2"]),
			node_data("g1", 100, 0, &["g0", "g2"]),
			node_data("g2", 50, 80, &["g0", "g1"]),
		] {
			data.nodes.insert(node.id.clone(), node);
		}
		data
	}

	fn assert_adjacency_in_sync(graph: &Graph) {
		for node in graph.nodes() {
			for (other, edge) in node.edges() {
				assert_eq!(edge.other(&node.id), Some(other.as_str()));
				assert!(graph.node(other).unwrap().is_adjacent(&node.id));
				assert!(graph.edges().contains(edge));
			}
		}
		let registered: usize = graph.nodes().map(|n| n.edges().len()).sum();
		assert_eq!(registered, graph.edges().len() * 2);
	}

	#[test]
	fn edges_are_undirected() {
		assert_eq!(Edge::new("a", "b"), Edge::new("b", "a"));
		assert_ne!(Edge::new("a", "b"), Edge::new("a", "c"));
		assert_eq!(Edge::new("a", "b").to_string(), "Edge(a to b)");
	}

	#[test]
	fn build_creates_one_edge_per_pair() {
		let graph = Graph::build(&triangle()).unwrap();
		assert_eq!(graph.edges().len(), 3);
		assert_adjacency_in_sync(&graph);
	}

	#[test]
	fn one_sided_neighbor_lists_are_mirrored() {
		let mut data = GraphData::default();
		data.nodes.insert("a".into(), node_data("a", 0, 0, &["b"]));
		data.nodes.insert("b".into(), node_data("b", 1, 1, &[]));
		let graph = Graph::build(&data).unwrap();
		assert!(graph.node("b").unwrap().is_adjacent("a"));
		assert_adjacency_in_sync(&graph);
	}

	#[test]
	fn build_rejects_unknown_neighbors_and_self_loops() {
		let mut data = triangle();
		data.nodes["g2"].edges.push("g9".into());
		assert_eq!(
			Graph::build(&data).unwrap_err(),
			ChronographError::InvalidEdge {
				from: "g2".into(),
				to: "g9".into()
			}
		);

		let mut data = triangle();
		data.nodes["g0"].edges.push("g0".into());
		assert!(matches!(
			Graph::build(&data),
			Err(ChronographError::InvalidEdge { .. })
		));
	}

	#[test]
	fn build_rejects_agents_off_the_graph() {
		let mut data = triangle();
		let mut traversal = TraversalData::default();
		traversal.agents.insert(
			"a1".into(),
			AgentData {
				id: "a1".into(),
				start: "g7".into(),
				label: String::new(),
				steps: vec![],
			},
		);
		data.traversal = Some(traversal);
		assert!(matches!(
			Graph::build(&data),
			Err(ChronographError::InvalidStart { .. })
		));
	}

	#[test]
	fn build_rejects_broken_step_chains() {
		let mut data = triangle();
		let mut traversal = TraversalData::default();
		traversal.agents.insert(
			"a1".into(),
			AgentData {
				id: "a1".into(),
				start: "g0".into(),
				label: String::new(),
				steps: vec![Step::new("g0", "g1", 1.0), Step::new("g2", "g0", 1.0)],
			},
		);
		data.traversal = Some(traversal);
		assert_eq!(
			Graph::build(&data).unwrap_err(),
			ChronographError::InvalidStep {
				agent: "a1".into(),
				index: 1,
				reason: "step leaves `g2` but the agent is at `g1`".into(),
			}
		);
	}

	#[test]
	fn export_round_trips() {
		let data = triangle();
		assert_eq!(Graph::build(&data).unwrap().export_data(), data);
	}

	#[test]
	fn add_edge_twice_keeps_one_edge() {
		let mut data = triangle();
		for node in data.nodes.values_mut() {
			node.edges.clear();
		}
		let mut graph = Graph::build(&data).unwrap();
		assert!(graph.add_edge("g0", "g1"));
		assert!(!graph.add_edge("g0", "g1"));
		assert!(!graph.add_edge("g1", "g0"));
		assert!(!graph.add_edge("g1", "g1"));
		assert!(!graph.add_edge("g1", "nope"));
		assert_eq!(graph.edges(), &[Edge::new("g0", "g1")]);
		assert_adjacency_in_sync(&graph);
	}

	#[test]
	fn delete_node_cascades_to_edges() {
		let mut graph = Graph::build(&triangle()).unwrap();
		graph.select_node(Some("g1"));
		assert!(graph.delete_node("g1"));
		assert!(!graph.delete_node("g1"));

		assert_eq!(graph.edges(), &[Edge::new("g0", "g2")]);
		assert_eq!(graph.node("g0").unwrap().neighbors().collect::<Vec<_>>(), ["g2"]);
		assert_eq!(graph.selected_node(), None);
		assert!(!graph.traversal_map().contains_key("g1"));
		assert_adjacency_in_sync(&graph);
	}

	#[test]
	fn remove_edge_detaches_both_ends() {
		let mut graph = Graph::build(&triangle()).unwrap();
		assert!(graph.remove_edge("g1", "g0"));
		assert!(!graph.remove_edge("g0", "g1"));
		assert!(!graph.node("g0").unwrap().is_adjacent("g1"));
		assert_eq!(graph.edges().len(), 2);
		assert_adjacency_in_sync(&graph);
	}

	#[test]
	fn selection_is_exclusive() {
		let mut graph = Graph::build(&triangle()).unwrap();
		graph.select_node(Some("g0"));
		graph.select_node(Some("g1"));
		assert_eq!(graph.selected_node(), Some("g1"));
		graph.select_node(Some("g1"));
		assert_eq!(graph.selected_node(), None);
	}

	#[test]
	fn added_nodes_get_fresh_ids_and_selection() {
		let mut graph = Graph::build(&triangle()).unwrap();
		graph.set_mode(Mode::Edit);
		graph.set_edit_mode(EditMode::AddNode);

		let id = graph.handle_canvas_click(12.7, 40.2).unwrap();
		assert_eq!(id, "g3");
		let node = graph.node(&id).unwrap();
		assert_eq!((node.x, node.y), (12, 40));
		assert_eq!(node.label, "Node 3");
		assert_eq!(node.color, CATEGORY20_THIRD);
		assert_eq!(graph.selected_node(), Some("g3"));

		assert_eq!(graph.create_node_at(0.0, 0.0), "g4");
		assert_eq!(
			graph.add_node(Node::new("g4", 0, 0, "", "")),
			Err(ChronographError::DuplicateNode("g4".into()))
		);
	}

	const CATEGORY20_THIRD: &str = "#ff7f0e";

	#[test]
	fn canvas_clicks_outside_add_node_do_nothing() {
		let mut graph = Graph::build(&triangle()).unwrap();
		graph.set_edit_mode(EditMode::AddNode);
		assert_eq!(graph.handle_canvas_click(0.0, 0.0), None);
		graph.set_mode(Mode::Edit);
		assert_eq!(graph.handle_canvas_click(0.0, 0.0), None);
	}

	#[test]
	fn entering_edit_mode_resets_tool_and_selection() {
		let mut graph = Graph::build(&triangle()).unwrap();
		graph.select_node(Some("g2"));
		graph.set_edit_mode(EditMode::DeleteEdge);
		graph.set_mode(Mode::Edit);
		assert_eq!(graph.mode(), Mode::Edit);
		assert_eq!(graph.edit_mode(), EditMode::Select);
		assert_eq!(graph.selected_node(), None);
	}

	#[test]
	fn two_clicks_add_then_delete_an_edge() {
		let mut data = triangle();
		data.nodes["g0"].edges.retain(|e| e != "g1");
		data.nodes["g1"].edges.retain(|e| e != "g0");
		let mut graph = Graph::build(&data).unwrap();
		graph.set_mode(Mode::Edit);
		graph.set_edit_mode(EditMode::AddEdge);

		assert_eq!(graph.handle_node_click("g0"), NodeClick::EdgeStarted("g0".into()));
		assert_eq!(graph.handle_node_click("g0"), NodeClick::EdgeCancelled("g0".into()));
		assert_eq!(graph.pending_edge(), None);
		assert_eq!(graph.handle_node_click("g0"), NodeClick::EdgeStarted("g0".into()));
		assert_eq!(graph.pending_edge(), Some("g0"));
		assert_eq!(
			graph.handle_node_click("g1"),
			NodeClick::EdgeFinished {
				edge: Edge::new("g0", "g1"),
				changed: true
			}
		);
		assert_eq!(graph.pending_edge(), None);
		assert_eq!(graph.edges().len(), 3);

		graph.set_edit_mode(EditMode::DeleteEdge);
		graph.handle_node_click("g1");
		assert!(matches!(
			graph.handle_node_click("g0"),
			NodeClick::EdgeFinished { changed: true, .. }
		));
		assert_eq!(graph.edges().len(), 2);
	}

	#[test]
	fn repeated_node_ids_are_rejected() {
		let mut data = triangle();
		data.nodes.insert("other".into(), node_data("g1", 5, 5, &[]));
		assert_eq!(
			Graph::build(&data).unwrap_err(),
			ChronographError::DuplicateNode("g1".into())
		);
	}

	#[test]
	fn delete_tool_asks_for_confirmation() {
		let mut graph = Graph::build(&triangle()).unwrap();
		graph.set_mode(Mode::Edit);
		graph.set_edit_mode(EditMode::DeleteNode);
		assert_eq!(graph.handle_node_click("g2"), NodeClick::ConfirmDelete("g2".into()));
		assert!(graph.contains_node("g2"));
		graph.cancel_delete();
		assert_eq!(graph.selected_node(), None);
	}

	#[test]
	fn agent_selection_dims_the_others() {
		let mut data = triangle();
		let mut traversal = TraversalData::default();
		for id in ["a1", "a2"] {
			traversal.agents.insert(
				id.into(),
				AgentData {
					id: id.into(),
					start: "g0".into(),
					label: String::new(),
					steps: vec![Step::new("g0", "g1", 1.0)],
				},
			);
		}
		data.traversal = Some(traversal);
		let mut graph = Graph::build(&data).unwrap();

		assert!(!graph.is_agent_dimmed("a2"));
		assert!(graph.toggle_agent_selection("a1"));
		assert!(graph.is_agent_dimmed("a2"));
		assert!(!graph.is_agent_dimmed("a1"));
		assert!(!graph.toggle_agent_selection("a1"));
		assert!(!graph.is_agent_dimmed("a2"));
	}

	#[test]
	fn edit_modes_parse_from_toolbar_names() {
		for mode in EditMode::ALL {
			assert_eq!(mode.as_str().parse::<EditMode>().unwrap(), mode);
		}
	}
}
