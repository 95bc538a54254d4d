//! Loading, editing and exporting whole documents.

use chronograph::ChronographError;
use chronograph::graph::{
	DataFormat, EditMode, Edge, Graph, GraphData, GraphDocument, Mode, NodeClick, parse,
};
use pretty_assertions::assert_eq;

const MARKUP: &str = r##"<?xml version="1.0"?>
<graph>
	<node id="g0" color="#1f77b4" x="0" y="0" label="Home">
		<edge to="g1"/>
		<edge to="g2"/>
	</node>
	<node id="g1" color="#aec7e8" x="100" y="0" label="Work">
		<edge to="g0"/>
	</node>
	<node id="g2" color="#ff7f0e" x="0" y="100" label="Park">
		<edge to="g0"/>
	</node>
	<traversal>
		<agent id="a1" label="Commuter" start="g0">
			<step from="g0" to="g1">30</step>
			<step from="g1" to="g0">35.5</step>
		</agent>
	</traversal>
</graph>"##;

const JSON: &str = r##"{"nodes":{
	"g0":{"id":"g0","x":0,"y":0,"color":"#1f77b4","label":"Home","edges":["g1","g2"]},
	"g1":{"id":"g1","x":100,"y":0,"color":"#aec7e8","label":"Work","edges":["g0"]},
	"g2":{"id":"g2","x":0,"y":100,"color":"#ff7f0e","label":"Park","edges":["g0"]}
},"traversal":{"agents":{
	"a1":{"id":"a1","start":"g0","label":"Commuter","steps":[
		{"from":"g0","to":"g1","timespan":30},
		{"from":"g1","to":"g0","timespan":35.5}
	]}
}}}"##;

#[test]
fn both_formats_describe_the_same_graph() {
	let markup = parse(MARKUP, DataFormat::Xml).unwrap();
	let json = parse(JSON, DataFormat::Json).unwrap();
	assert_eq!(markup, json);

	let graph = Graph::build(&markup).unwrap();
	assert_eq!(graph.edges(), &[Edge::new("g0", "g1"), Edge::new("g0", "g2")]);
	assert_eq!(graph.max_steps(), 2);
}

#[test]
fn exports_load_back_unchanged() {
	let graph = Graph::build(&parse(MARKUP, DataFormat::Xml).unwrap()).unwrap();
	let exported = graph.export_data();

	let from_json = GraphData::from_json(&exported.to_json().unwrap()).unwrap();
	assert_eq!(from_json, exported);
	let from_xml = parse(&exported.to_xml(), DataFormat::Xml).unwrap();
	assert_eq!(from_xml, exported);
	assert_eq!(Graph::build(&from_xml).unwrap().export_data(), exported);
}

#[test]
fn broken_documents_are_rejected() {
	let dangling = r#"{"nodes":{"g0":{"id":"g0","x":0,"y":0,"edges":["g9"]}}}"#;
	assert_eq!(
		Graph::build(&parse(dangling, DataFormat::Json).unwrap()).unwrap_err(),
		ChronographError::InvalidEdge {
			from: "g0".into(),
			to: "g9".into()
		}
	);

	let lost = JSON.replace(r#""start":"g0""#, r#""start":"g7""#);
	assert!(matches!(
		Graph::build(&parse(&lost, DataFormat::Json).unwrap()),
		Err(ChronographError::InvalidStart { .. })
	));

	assert!(matches!(
		parse("<graph><node id=\"g0\" y=\"1\"/></graph>", DataFormat::Xml),
		Err(ChronographError::Format(_))
	));
}

#[test]
fn editing_through_clicks() {
	let mut graph = Graph::build(&parse(JSON, DataFormat::Json).unwrap()).unwrap();
	graph.set_mode(Mode::Edit);

	graph.set_edit_mode(EditMode::AddNode);
	let id = graph.handle_canvas_click(50.4, 75.9).unwrap();
	assert_eq!(id, "g3");
	let node = graph.node(&id).unwrap();
	assert_eq!((node.x, node.y), (50, 75));
	assert_eq!(node.color, "#ff7f0e");
	assert_eq!(node.label, "Node 3");
	assert_eq!(graph.selected_node(), Some("g3"));

	graph.set_edit_mode(EditMode::AddEdge);
	assert_eq!(graph.handle_node_click("g3"), NodeClick::EdgeStarted("g3".into()));
	assert_eq!(
		graph.handle_node_click("g2"),
		NodeClick::EdgeFinished {
			edge: Edge::new("g2", "g3"),
			changed: true
		}
	);
	graph.handle_node_click("g3");
	assert_eq!(
		graph.handle_node_click("g2"),
		NodeClick::EdgeFinished {
			edge: Edge::new("g3", "g2"),
			changed: false
		}
	);
	assert_eq!(graph.edges().len(), 3);

	graph.set_edit_mode(EditMode::DeleteNode);
	assert_eq!(graph.handle_node_click("g3"), NodeClick::ConfirmDelete("g3".into()));
	graph.cancel_delete();
	assert!(graph.contains_node("g3"));
	assert!(graph.delete_node("g3"));
	assert_eq!(graph.edges().len(), 2);
	assert_eq!(graph.summary().nodes, 3);
}

#[test]
fn documents_import_and_export() {
	let mut document = GraphDocument::load(Some("7".into()), "Town", MARKUP, DataFormat::Xml).unwrap();
	assert_eq!(document.id(), Some("7"));
	assert!(document.has_traversal());

	let id = document
		.import_traversal("2,0;0,12;1,20;", "Jogger", DataFormat::RawTraversal)
		.unwrap();
	assert_eq!(id, "a2");

	let graph = document.graph().unwrap();
	graph.set_arbitrary_time_step(1.0);
	assert_eq!(graph.traversal_count("g0"), 1);
	assert_eq!(graph.traversal_count("g1"), 1);
	graph.set_arbitrary_time_step(2.0);
	assert_eq!(graph.traversal_count("g0"), 2);
	assert_eq!(graph.traversal_count("g2"), 0);
	assert_eq!(graph.max_traverse(), 2);

	let exported = document.export_data();
	assert_eq!(exported.traversal.unwrap().agents.len(), 2);
}
