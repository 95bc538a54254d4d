use log::debug;

use crate::config::TimelineSettings;
use crate::error::Result;
use crate::graph::{Graph, GraphDocument, Timeline};

pub const NODE_RADIUS: f64 = 15.0;
pub const AGENT_RADIUS: f64 = 5.0;
const AGENT_HIT_RADIUS: f64 = 8.0;

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub moved: bool,
	pub node_id: Option<String>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: i32,
	pub node_start_y: i32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Everything the canvas needs between frames: the document being shown,
/// playback and the view transform.
pub struct ChronographState {
	pub document: GraphDocument,
	pub timeline: Timeline,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: Option<String>,
	pub width: f64,
	pub height: f64,
}

impl ChronographState {
	pub fn new(mut document: GraphDocument, width: f64, height: f64) -> Result<Self> {
		let max_steps = document.graph()?.max_steps();
		Ok(Self {
			document,
			timeline: Timeline::new(max_steps, TimelineSettings::default()),
			transform: ViewTransform {
				x: 0.0,
				y: 0.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: None,
			width,
			height,
		})
	}

	pub fn graph(&self) -> Option<&Graph> {
		self.document.built_graph()
	}

	pub fn graph_mut(&mut self) -> Option<&mut Graph> {
		self.document.graph().ok()
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under a screen position.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<String> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.graph()?
			.nodes()
			.filter(|node| {
				let (dx, dy) = (node.x as f64 - gx, node.y as f64 - gy);
				(dx * dx + dy * dy).sqrt() < NODE_RADIUS
			})
			.last()
			.map(|node| node.id.clone())
	}

	/// Topmost agent under a screen position.
	pub fn agent_at_position(&self, sx: f64, sy: f64) -> Option<String> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.graph()?
			.agents()
			.filter(|agent| {
				agent.position().is_some_and(|p| {
					let (dx, dy) = (p.x - gx, p.y - gy);
					(dx * dx + dy * dy).sqrt() < AGENT_HIT_RADIUS
				})
			})
			.last()
			.map(|agent| agent.id.clone())
	}

	/// Applies a slider position and returns the graph time it maps to.
	pub fn slide_to(&mut self, value: f64) -> f64 {
		let time = self.timeline.slide(value);
		if let Some(graph) = self.graph_mut() {
			graph.set_arbitrary_time_step(time);
		}
		time
	}

	/// Advances playback by one tick. Returns the new slider position, or
	/// `None` when playback has ended.
	pub fn play_tick(&mut self) -> Option<f64> {
		let time = self.timeline.play_step()?;
		if let Some(graph) = self.graph_mut() {
			graph.set_arbitrary_time_step(time);
		}
		Some(self.timeline.current_value())
	}

	/// Imports a raw traversal log and widens the timeline to fit it.
	pub fn import_traversal(&mut self, raw: &str, label: &str) -> Result<String> {
		let id = self
			.document
			.import_traversal(raw, label, crate::graph::DataFormat::RawTraversal)?;
		let max_steps = self.document.graph()?.max_steps();
		self.timeline.set_range(max_steps);
		debug!("Timeline now spans {max_steps} steps");
		Ok(id)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
