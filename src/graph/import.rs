//! Raw traversal log import.
//!
//! A log is a list of `<node suffix>,<timestamp>` stops separated by `;`,
//! with a trailing `;`:
//!
//! ```text
//! 0,100;1,150;2,300;
//! ```
//!
//! Suffixes are resolved against the graph's node prefix, so with prefix `g`
//! the stops above are `g0`, `g1` and `g2`. Timestamps are absolute; the
//! resulting steps carry the difference between consecutive stops.

use log::{debug, info};

use super::data::Step;
use super::model::{Agent, Graph};
use crate::error::{ChronographError, Result};

/// A resolved stop: full node id and absolute timestamp.
#[derive(Clone, Debug, PartialEq)]
struct Stop {
	node: String,
	timestamp: f64,
}

/// Builds a new agent from a raw log and adds it to `graph`.
///
/// Nothing is changed when the log does not fit the graph.
pub fn import_traversal_log<'g>(graph: &'g mut Graph, raw: &str, label: &str) -> Result<&'g Agent> {
	let stops = parse_stops(graph, raw)?;
	if stops.len() < 2 {
		return Err(too_few_stops());
	}

	let steps = stops
		.windows(2)
		.map(|pair| {
			let timespan = pair[1].timestamp - pair[0].timestamp;
			if timespan < 0.0 {
				return Err(ChronographError::invalid_data(format!(
					"timestamps must not decrease, {} follows {}",
					pair[1].timestamp, pair[0].timestamp
				)));
			}
			Ok(Step::new(&pair[0].node, &pair[1].node, timespan))
		})
		.collect::<Result<Vec<_>>>()?;

	let id = graph.next_agent_id();
	info!("Importing traversal for {id} with {} steps", steps.len());
	let agent = Agent::new(id, &stops[0].node, label, steps);
	Ok(graph.insert_agent(agent))
}

fn too_few_stops() -> ChronographError {
	ChronographError::invalid_data("agents must make more than one stop")
}

fn parse_stops(graph: &Graph, raw: &str) -> Result<Vec<Stop>> {
	let mut tokens: Vec<&str> = raw.split(';').collect();
	if tokens.last().is_some_and(|last| last.trim().is_empty()) {
		tokens.pop();
	}
	debug!("Parsing {} traversal stops", tokens.len());

	let prefix = &graph.settings().node_prefix;
	tokens
		.into_iter()
		.map(|token| {
			let (suffix, timestamp) = token.split_once(',').ok_or_else(|| {
				ChronographError::invalid_data(format!("`{token}` is not a `node,timestamp` pair"))
			})?;
			let node = format!("{prefix}{}", suffix.trim());
			if !graph.contains_node(&node) {
				return Err(ChronographError::invalid_data(format!(
					"the imported structure does not match the graph, node `{node}` does not exist"
				)));
			}
			let timestamp = timestamp
				.trim()
				.parse::<f64>()
				.ok()
				.filter(|t| t.is_finite())
				.ok_or_else(|| {
					ChronographError::invalid_data(format!("`{timestamp}` is not a timestamp"))
				})?;
			Ok(Stop { node, timestamp })
		})
		.collect()
}
