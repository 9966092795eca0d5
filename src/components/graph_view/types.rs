//! Data the graph view consumes and the events it emits.

use serde::Deserialize;

/// A node as delivered by the topology endpoint.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphNode {
	pub id: String,
	#[serde(default)]
	pub label: Option<String>,
	/// Optional CSS color override for the node outline.
	#[serde(default)]
	pub color: Option<String>,
	/// Group name used to pick an outline color from the palette.
	#[serde(default)]
	pub group: Option<String>,
}

/// An undirected-for-layout, directed-for-display edge.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphEdge {
	#[serde(default)]
	pub id: Option<String>,
	pub from: String,
	pub to: String,
	#[serde(default)]
	pub label: Option<String>,
}

impl GraphEdge {
	/// Explicit id, or `"<from> -- <to>"` when the payload carries none.
	pub fn key(&self) -> String {
		self.id
			.clone()
			.unwrap_or_else(|| format!("{} -- {}", self.from, self.to))
	}
}

/// Complete graph payload: `{ "nodes": [...], "edges": [...] }`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphData {
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	#[serde(default)]
	pub edges: Vec<GraphEdge>,
}

/// Current selection, in the order items were picked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
	pub nodes: Vec<String>,
	pub edges: Vec<String>,
}

impl Selection {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}
}

/// Edge the user drew between two nodes, not yet committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeDraft {
	pub from: String,
	pub to: String,
}

/// Items the user asked to delete, not yet committed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Deletion {
	pub nodes: Vec<String>,
	pub edges: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphEvent {
	Select(Selection),
}
