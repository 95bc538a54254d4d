//! Tunable settings for graphs and playback.

/// The twenty-color categorical palette new nodes cycle through.
pub const CATEGORY20: &[&str] = &[
	"#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
	"#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
	"#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

/// Naming and coloring rules for a graph.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphSettings {
	/// Prefix of generated node ids; traversal logs refer to nodes by the suffix.
	pub node_prefix: String,
	/// Prefix of generated agent ids.
	pub agent_prefix: String,
	/// Colors assigned to nodes created in edit mode.
	pub palette: &'static [&'static str],
}

impl Default for GraphSettings {
	fn default() -> Self {
		Self {
			node_prefix: "g".into(),
			agent_prefix: "a".into(),
			palette: CATEGORY20,
		}
	}
}

/// Timeline slider and play loop parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineSettings {
	/// Upper end of the slider domain; the lower end is 0.
	pub slider_max: f64,
	/// Interval between play ticks, in milliseconds.
	pub play_resolution_ms: i32,
	/// Number of ticks a full playback takes at speed 1.
	pub play_num_steps: f64,
	/// Multiplier applied to each tick.
	pub play_speed: f64,
}

impl Default for TimelineSettings {
	fn default() -> Self {
		Self {
			slider_max: 500.0,
			play_resolution_ms: 20,
			play_num_steps: 500.0,
			play_speed: 1.0,
		}
	}
}
