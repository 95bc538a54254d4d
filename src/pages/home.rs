use leptos::prelude::*;
use log::error;

use crate::components::chronograph::ChronographCanvas;
use crate::graph::{DataFormat, GraphData, GraphDocument};

/// A small campus map with two walkers.
const CAMPUS: &str = r##"<?xml version="1.0"?>
<graph>
	<node id="g0" color="#1f77b4" x="120" y="120" label="Library">
		<edge to="g1"/>
		<edge to="g3"/>
	</node>
	<node id="g1" color="#aec7e8" x="320" y="90" label="Cafeteria">
		<edge to="g0"/>
		<edge to="g2"/>
		<edge to="g4"/>
	</node>
	<node id="g2" color="#ff7f0e" x="520" y="160" label="Gym">
		<edge to="g1"/>
		<edge to="g5"/>
	</node>
	<node id="g3" color="#ffbb78" x="160" y="320" label="Dorms">
		<edge to="g0"/>
		<edge to="g4"/>
	</node>
	<node id="g4" color="#2ca02c" x="360" y="300" label="Lecture hall">
		<edge to="g1"/>
		<edge to="g3"/>
		<edge to="g5"/>
	</node>
	<node id="g5" color="#98df8a" x="560" y="360" label="Lab">
		<edge to="g2"/>
		<edge to="g4"/>
	</node>
	<traversal>
		<agent id="a1" label="Early riser" start="g3">
			<step from="g3" to="g0">20</step>
			<step from="g0" to="g1">45</step>
			<step from="g1" to="g4">15</step>
			<step from="g4" to="g5">60</step>
		</agent>
		<agent id="a2" label="Athlete" start="g3">
			<step from="g3" to="g4">10</step>
			<step from="g4" to="g1">30</step>
			<step from="g1" to="g2">90</step>
		</agent>
	</traversal>
</graph>"##;

/// A triangle without agents, for trying out edits and imports.
const TRIANGLE: &str = r##"{"nodes":{
	"g0":{"id":"g0","x":200,"y":150,"color":"#1f77b4","label":"Node 1","edges":["g1","g2"]},
	"g1":{"id":"g1","x":400,"y":150,"color":"#aec7e8","label":"Node 2","edges":["g0","g2"]},
	"g2":{"id":"g2","x":300,"y":320,"color":"#ff7f0e","label":"Node 3","edges":["g0","g1"]}
}}"##;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Sample {
	Campus,
	Triangle,
}

impl Sample {
	fn load(self) -> GraphDocument {
		let (id, name, raw, format) = match self {
			Sample::Campus => ("campus", "Campus", CAMPUS, DataFormat::Xml),
			Sample::Triangle => ("triangle", "Triangle", TRIANGLE, DataFormat::Json),
		};
		GraphDocument::load(Some(id.into()), name, raw, format).unwrap_or_else(|e| {
			error!("Sample graph {name} does not load: {e}");
			GraphDocument::new(Some(id.into()), name, GraphData::default())
		})
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let sample = RwSignal::new(Sample::Campus);
	let document = Signal::derive(move || sample.get().load());

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ChronographCanvas document=document fullscreen=true />
				<div class="graph-overlay">
					<h1>"Chronograph"</h1>
					<p class="subtitle">
						"Play the timeline to watch agents walk the graph. Import a log such as "
						<code>"3,0;0,20;1,65;"</code> " to add another."
					</p>
					<nav class="graph-samples">
						<button
							class:active=move || sample.get() == Sample::Campus
							on:click=move |_| sample.set(Sample::Campus)
						>
							"Campus"
						</button>
						<button
							class:active=move || sample.get() == Sample::Triangle
							on:click=move |_| sample.set(Sample::Triangle)
						>
							"Triangle"
						</button>
					</nav>
				</div>
			</div>
		</ErrorBoundary>
	}
}
