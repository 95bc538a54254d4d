//! Graph core: documents, the in-memory model and agent playback.
//!
//! ```
//! use chronograph::graph::{DataFormat, Graph, parse};
//!
//! let raw = r#"{"nodes":{
//!     "g0":{"id":"g0","x":0,"y":0,"color":"red","label":"A","edges":["g1"]},
//!     "g1":{"id":"g1","x":100,"y":0,"color":"blue","label":"B","edges":["g0"]}
//! },"traversal":{"agents":{
//!     "a1":{"id":"a1","start":"g0","label":"walker","steps":[{"from":"g0","to":"g1","timespan":10}]}
//! }}}"#;
//!
//! let mut graph = Graph::build(&parse(raw, DataFormat::Json)?)?;
//! graph.set_arbitrary_time_step(0.5);
//! let position = graph.agent("a1").and_then(|a| a.position()).unwrap();
//! assert_eq!((position.x, position.y), (50.0, 0.0));
//! # Ok::<(), chronograph::ChronographError>(())
//! ```

pub mod data;
pub mod document;
pub mod import;
pub mod model;
pub mod parser;
pub mod timeline;
mod traversal;

pub use data::{AgentData, GraphData, NodeData, Step, TraversalData};
pub use document::GraphDocument;
pub use import::import_traversal_log;
pub use model::{Agent, EditMode, Edge, Graph, GraphSummary, Mode, Node, NodeClick, Point};
pub use parser::{DataFormat, parse, parse_xml};
pub use timeline::Timeline;
