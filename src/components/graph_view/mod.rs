mod component;
mod handle;
mod render;
mod state;
mod types;

pub use component::GraphView;
pub use handle::{GraphHandle, GraphSurface};
pub use types::{Deletion, EdgeDraft, GraphData, GraphEdge, GraphEvent, GraphNode, Selection};
