//! Agent playback over continuous time and the derived visit counts.
//!
//! Time is measured in steps: at `t = 2.5` an agent is halfway through its
//! third step. The traversal map counts, per node, how many completed steps
//! ended there up to `floor(t)`. It is rebuilt from scratch whenever the
//! integer part of the time cursor changes, which costs a rescan of every
//! agent's completed steps. That is fine for the graph sizes this tool draws.

use indexmap::IndexMap;
use log::trace;

use super::model::{Agent, Graph, Node, Point};

/// Number of whole steps finished at time `step` out of `len`.
fn completed_steps(step: f64, len: usize) -> usize {
	if step > 0.0 {
		step.min(len as f64).floor() as usize
	} else {
		0
	}
}

impl Agent {
	/// Interpolated position at time `step`.
	///
	/// Past the last step the agent stays parked on the final node; an agent
	/// without steps stays on its start node. Returns `None` if a node the
	/// agent needs has been deleted.
	pub fn position_at(&self, step: f64, nodes: &IndexMap<String, Node>) -> Option<Point> {
		let steps = self.steps();
		let Some(last) = steps.last() else {
			return nodes.get(&self.start).map(Node::point);
		};

		let actual = step.max(0.0).min(steps.len() as f64);
		let index = actual.floor() as usize;
		match steps.get(index) {
			Some(current) => {
				let from = nodes.get(&current.from)?.point();
				let to = nodes.get(&current.to)?.point();
				Some(from.lerp(to, actual - index as f64))
			}
			None => nodes.get(&last.to).map(Node::point),
		}
	}

	/// Places the agent at time `step` and returns the new position.
	pub fn set_to_time_step(&mut self, step: f64, nodes: &IndexMap<String, Node>) -> Option<Point> {
		self.position = self.position_at(step, nodes);
		self.position
	}

	/// Visits per node from the steps completed by time `step`.
	pub fn traversal_counts(&self, step: f64) -> IndexMap<&str, u32> {
		let steps = self.steps();
		let mut counts = IndexMap::new();
		for finished in &steps[..completed_steps(step, steps.len())] {
			*counts.entry(finished.to.as_str()).or_insert(0) += 1;
		}
		counts
	}
}

impl Graph {
	pub fn current_step(&self) -> f64 {
		self.current_step
	}

	/// Integer time the traversal map was last computed for.
	pub fn calculated_step(&self) -> usize {
		self.calculated_step
	}

	/// Length of the longest agent trip; the time cursor's upper bound.
	pub fn max_steps(&self) -> usize {
		self.max_steps
	}

	/// Visit counts per node; every node has an entry.
	pub fn traversal_map(&self) -> &IndexMap<String, u32> {
		&self.traversal_map
	}

	pub fn traversal_count(&self, id: &str) -> u32 {
		self.traversal_map.get(id).copied().unwrap_or(0)
	}

	/// Highest count in the traversal map.
	pub fn max_traverse(&self) -> u32 {
		self.max_traverse
	}

	/// A node's count scaled into `0.0..=1.0` against the busiest node.
	pub fn heat(&self, id: &str) -> f64 {
		if self.max_traverse == 0 {
			0.0
		} else {
			self.traversal_count(id) as f64 / self.max_traverse as f64
		}
	}

	pub(super) fn set_max_steps(&mut self) {
		self.max_steps = self
			.agents
			.values()
			.map(|agent| agent.steps().len())
			.max()
			.unwrap_or(0);
	}

	/// Moves the time cursor, re-places every agent and refreshes the
	/// traversal map when a whole step boundary was crossed.
	pub fn set_arbitrary_time_step(&mut self, step: f64) {
		let step = if step.is_finite() { step.max(0.0) } else { 0.0 };
		self.current_step = step;
		self.position_agents();
		if step.floor() as usize != self.calculated_step {
			self.calculate_traversal_map(step);
		}
	}

	pub(super) fn position_agents(&mut self) {
		let step = self.current_step;
		for agent in self.agents.values_mut() {
			agent.set_to_time_step(step, &self.nodes);
		}
	}

	/// Recounts node visits for time `step` across all agents.
	pub fn calculate_traversal_map(&mut self, step: f64) {
		self.traversal_map = self.nodes.keys().map(|id| (id.clone(), 0)).collect();
		for agent in self.agents.values() {
			for (id, count) in agent.traversal_counts(step) {
				if let Some(total) = self.traversal_map.get_mut(id) {
					*total += count;
				}
			}
		}
		self.max_traverse = self.traversal_map.values().copied().max().unwrap_or(0);
		self.calculated_step = if step > 0.0 { step.floor() as usize } else { 0 };
		trace!(
			"Traversal map at step {} peaks at {}",
			self.calculated_step, self.max_traverse
		);
	}

	/// Brings positions and counts in line with the current time after a
	/// structural change.
	pub(super) fn refresh_time(&mut self) {
		self.position_agents();
		self.calculate_traversal_map(self.current_step);
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::graph::data::{AgentData, GraphData, NodeData, Step, TraversalData};

	fn node(id: &str, x: i32, y: i32, edges: &[&str]) -> NodeData {
		NodeData {
			id: id.into(),
			x,
			y,
			color: String::new(),
			label: String::new(),
			edges: edges.iter().map(|e| e.to_string()).collect(),
		}
	}

	fn line_graph(agents: Vec<AgentData>) -> Graph {
		let mut data = GraphData::default();
		for n in [
			node("g0", 0, 0, &["g1"]),
			node("g1", 100, 0, &["g0", "g2"]),
			node("g2", 100, 50, &["g1"]),
		] {
			data.nodes.insert(n.id.clone(), n);
		}
		data.traversal = Some(TraversalData {
			agents: agents.into_iter().map(|a| (a.id.clone(), a)).collect(),
		});
		Graph::build(&data).unwrap()
	}

	fn agent(id: &str, steps: Vec<Step>) -> AgentData {
		AgentData {
			id: id.into(),
			start: steps.first().map_or("g0".into(), |s| s.from.clone()),
			label: id.into(),
			steps,
		}
	}

	#[test]
	fn agent_interpolates_along_its_step() {
		let mut graph = line_graph(vec![agent("a1", vec![Step::new("g0", "g1", 10.0)])]);

		assert_eq!(graph.agent("a1").unwrap().position(), Some(Point::new(0.0, 0.0)));
		graph.set_arbitrary_time_step(0.5);
		assert_eq!(graph.agent("a1").unwrap().position(), Some(Point::new(50.0, 0.0)));
		assert_eq!(graph.traversal_count("g1"), 0);

		graph.set_arbitrary_time_step(1.0);
		assert_eq!(graph.agent("a1").unwrap().position(), Some(Point::new(100.0, 0.0)));
		assert_eq!(
			graph.traversal_map().clone(),
			IndexMap::from([("g0".to_string(), 0), ("g1".to_string(), 1), ("g2".to_string(), 0)])
		);
	}

	#[test]
	fn finished_agents_stay_parked() {
		let graph = line_graph(vec![agent(
			"a1",
			vec![Step::new("g0", "g1", 1.0), Step::new("g1", "g2", 1.0)],
		)]);
		let a1 = graph.agent("a1").unwrap();
		let end = Some(Point::new(100.0, 50.0));
		assert_eq!(a1.position_at(2.0, &graph.nodes), end);
		assert_eq!(a1.position_at(7.25, &graph.nodes), end);
		assert_eq!(a1.position_at(1.5, &graph.nodes), Some(Point::new(100.0, 25.0)));
		assert_eq!(a1.position_at(-3.0, &graph.nodes), Some(Point::new(0.0, 0.0)));
	}

	#[test]
	fn idle_agents_sit_on_their_start() {
		let mut idle = agent("a1", vec![]);
		idle.start = "g2".into();
		let graph = line_graph(vec![idle]);
		let a1 = graph.agent("a1").unwrap();
		assert_eq!(a1.position_at(3.0, &graph.nodes), Some(Point::new(100.0, 50.0)));
		assert!(a1.traversal_counts(3.0).is_empty());
	}

	#[test]
	fn counts_sum_across_agents() {
		let mut graph = line_graph(vec![
			agent(
				"a1",
				vec![
					Step::new("g0", "g1", 1.0),
					Step::new("g1", "g0", 1.0),
					Step::new("g0", "g1", 1.0),
				],
			),
			agent("a2", vec![Step::new("g2", "g1", 4.0)]),
		]);
		assert_eq!(graph.max_steps(), 3);

		graph.set_arbitrary_time_step(2.9);
		assert_eq!(graph.calculated_step(), 2);
		assert_eq!(graph.traversal_count("g1"), 2);
		assert_eq!(graph.traversal_count("g0"), 1);
		assert_eq!(graph.max_traverse(), 2);
		assert_eq!(graph.heat("g0"), 0.5);

		graph.set_arbitrary_time_step(3.0);
		assert_eq!(graph.traversal_count("g1"), 3);

		graph.set_arbitrary_time_step(0.2);
		assert_eq!(graph.traversal_map().values().sum::<u32>(), 0);
		assert_eq!(graph.heat("g1"), 0.0);
	}

	#[test]
	fn deleting_a_node_on_the_path_leaves_the_agent_unplaced() {
		let mut graph = line_graph(vec![agent("a1", vec![Step::new("g0", "g1", 1.0)])]);
		graph.set_arbitrary_time_step(0.5);
		graph.delete_node("g1");
		assert_eq!(graph.agent("a1").unwrap().position(), None);
		assert_eq!(graph.traversal_map().len(), 2);
	}

	#[test]
	fn re_adding_a_node_places_its_agents_again() {
		let mut graph = line_graph(vec![agent(
			"a1",
			vec![Step::new("g0", "g1", 1.0), Step::new("g1", "g0", 1.0)],
		)]);
		graph.set_arbitrary_time_step(1.5);
		assert_eq!(graph.traversal_count("g1"), 1);

		graph.delete_node("g1");
		assert_eq!(graph.agent("a1").unwrap().position(), None);
		graph.add_node(Node::new("g1", 100, 0, "", "")).unwrap();

		assert_eq!(graph.agent("a1").unwrap().position(), Some(Point::new(50.0, 0.0)));
		assert_eq!(graph.traversal_count("g1"), 1);
		assert_eq!(graph.traversal_map().values().sum::<u32>(), 1);
		assert_eq!(graph.max_traverse(), 1);
	}

	#[test]
	fn moving_a_node_moves_agents_on_it() {
		let mut graph = line_graph(vec![agent("a1", vec![Step::new("g0", "g1", 1.0)])]);
		graph.set_arbitrary_time_step(1.0);
		graph.move_node("g1", 200, 10);
		assert_eq!(graph.agent("a1").unwrap().position(), Some(Point::new(200.0, 10.0)));
	}

	#[test]
	fn non_finite_time_resets_to_start() {
		let mut graph = line_graph(vec![agent("a1", vec![Step::new("g0", "g1", 1.0)])]);
		graph.set_arbitrary_time_step(f64::NAN);
		assert_eq!(graph.current_step(), 0.0);
		assert_eq!(graph.agent("a1").unwrap().position(), Some(Point::new(0.0, 0.0)));
	}
}
