use std::collections::{HashMap, HashSet};

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::types::{EdgeDraft, GraphData, GraphEdge, GraphNode, Selection};
use crate::config::{GraphOptions, PhysicsOptions};

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

pub const NODE_RADIUS: f64 = 6.0;
pub const HIT_RADIUS: f64 = 12.0;
pub const EDGE_HIT_RADIUS: f64 = 5.0;
/// Pointer travel, in screen pixels, below which a press counts as a click.
pub const CLICK_SLOP: f64 = 4.0;

const NODE_MASS: f32 = 10.0;
const STABILIZATION_STEPS: usize = 200;
const GOLDEN_ANGLE: f64 = 2.399_963;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub label: Option<String>,
	pub color: String,
}

#[derive(Clone, Debug)]
pub struct EdgeEntry {
	pub id: String,
	pub label: Option<String>,
	pub src: DefaultNodeIdx,
	pub tgt: DefaultNodeIdx,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Where the current press started and whether it has turned into a drag.
#[derive(Clone, Debug, Default)]
pub struct PressState {
	pub x: f64,
	pub y: f64,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditMode {
	#[default]
	Select,
	AddEdge,
}

/// Rubber-band line from a node to the pointer while drawing an edge.
#[derive(Clone, Debug)]
pub struct DraftEdge {
	pub from: DefaultNodeIdx,
	pub x: f64,
	pub y: f64,
}

pub struct GraphViewState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub press: Option<PressState>,
	pub hover: HoverState,
	pub mode: EditMode,
	pub draft: Option<DraftEdge>,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	pub flow_time: f64,
	pub options: GraphOptions,
	index: HashMap<String, DefaultNodeIdx>,
	edges: Vec<EdgeEntry>,
	selection: Selection,
}

fn simulation_parameters(physics: &PhysicsOptions) -> SimulationParameters {
	SimulationParameters {
		force_charge: physics.charge,
		force_spring: physics.spring,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: physics.damping,
	}
}

fn node_color(node: &GraphNode) -> String {
	node.color.clone().unwrap_or_else(|| {
		node.group
			.as_deref()
			.map(|g| {
				let hash = g.bytes().fold(0usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize));
				COLORS[hash % COLORS.len()].into()
			})
			.unwrap_or(COLORS[0].into())
	})
}

fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let len2 = dx * dx + dy * dy;
	let t = if len2 < f64::EPSILON {
		0.0
	} else {
		(((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.0 + t * dx - p.0, a.1 + t * dy - p.1);
	(cx * cx + cy * cy).sqrt()
}

impl GraphViewState {
	pub fn new(options: &GraphOptions) -> Self {
		Self {
			graph: ForceGraph::new(simulation_parameters(&options.physics)),
			transform: ViewTransform {
				x: 0.0,
				y: 0.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			press: None,
			hover: HoverState::default(),
			mode: EditMode::Select,
			draft: None,
			width: 0.0,
			height: options.height,
			animation_running: true,
			flow_time: 0.0,
			options: options.clone(),
			index: HashMap::new(),
			edges: Vec::new(),
			selection: Selection::default(),
		}
	}

	/// Replace everything with `data` and settle the layout.
	pub fn set_data(&mut self, data: &GraphData) {
		self.graph = ForceGraph::new(simulation_parameters(&self.options.physics));
		self.index.clear();
		self.edges.clear();
		self.selection = Selection::default();
		self.hover = HoverState::default();
		self.drag = DragState::default();
		self.draft = None;

		self.add_nodes(&data.nodes);
		self.add_edges(&data.edges);
		if self.options.physics.stabilization {
			self.stabilize();
		}
	}

	/// Add nodes whose ids are not present yet.
	pub fn add_nodes(&mut self, nodes: &[GraphNode]) {
		for node in nodes {
			if self.index.contains_key(&node.id) {
				continue;
			}
			let i = self.index.len() as f64;
			let (angle, radius) = (i * GOLDEN_ANGLE, 40.0 + 15.0 * i.sqrt());
			let idx = self.graph.add_node(NodeData {
				x: (radius * angle.cos()) as f32,
				y: (radius * angle.sin()) as f32,
				mass: NODE_MASS,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: node.label.clone().or_else(|| Some(node.id.clone())),
					color: node_color(node),
				},
			});
			self.index.insert(node.id.clone(), idx);
		}
	}

	/// Add edges whose endpoints exist and whose id is not present yet.
	pub fn add_edges(&mut self, edges: &[GraphEdge]) {
		for edge in edges {
			let id = edge.key();
			if self.edges.iter().any(|e| e.id == id) {
				continue;
			}
			if let (Some(&src), Some(&tgt)) = (self.index.get(&edge.from), self.index.get(&edge.to))
			{
				self.graph.add_edge(src, tgt, EdgeData::default());
				self.edges.push(EdgeEntry {
					id,
					label: edge.label.clone(),
					src,
					tgt,
				});
			}
		}
	}

	/// Remove nodes and every edge touching them.
	pub fn remove_nodes(&mut self, ids: &[String]) {
		let drop: HashSet<&str> = ids.iter().map(String::as_str).collect();
		self.selection.nodes.retain(|id| !drop.contains(id.as_str()));
		self.rebuild(&drop, &HashSet::new());
	}

	pub fn remove_edges(&mut self, ids: &[String]) {
		let drop: HashSet<&str> = ids.iter().map(String::as_str).collect();
		self.selection.edges.retain(|id| !drop.contains(id.as_str()));
		self.rebuild(&HashSet::new(), &drop);
	}

	/// The simulation has no edge removal, so rebuild it from the survivors,
	/// keeping their positions.
	fn rebuild(&mut self, drop_nodes: &HashSet<&str>, drop_edges: &HashSet<&str>) {
		let mut kept = Vec::new();
		self.graph.visit_nodes(|node| {
			if !drop_nodes.contains(node.data.user_data.id.as_str()) {
				kept.push((
					node.index(),
					node.data.x,
					node.data.y,
					node.data.is_anchor,
					node.data.user_data.clone(),
				));
			}
		});

		let mut graph = ForceGraph::new(simulation_parameters(&self.options.physics));
		let mut remap = HashMap::new();
		self.index.clear();
		for (old, x, y, is_anchor, info) in kept {
			let id = info.id.clone();
			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: NODE_MASS,
				is_anchor,
				user_data: info,
			});
			remap.insert(old, idx);
			self.index.insert(id, idx);
		}

		for edge in std::mem::take(&mut self.edges) {
			if drop_edges.contains(edge.id.as_str()) {
				continue;
			}
			if let (Some(&src), Some(&tgt)) = (remap.get(&edge.src), remap.get(&edge.tgt)) {
				graph.add_edge(src, tgt, EdgeData::default());
				self.edges.push(EdgeEntry { src, tgt, ..edge });
			}
		}

		let live: HashSet<&str> = self.edges.iter().map(|e| e.id.as_str()).collect();
		self.selection.edges.retain(|id| live.contains(id.as_str()));

		self.graph = graph;
		self.hover = HoverState::default();
		self.drag = DragState::default();
		self.draft = None;
	}

	pub fn stabilize(&mut self) {
		for _ in 0..STABILIZATION_STEPS {
			self.graph.update(0.016);
		}
	}

	#[cfg(test)]
	pub(super) fn node_count(&self) -> usize {
		self.index.len()
	}

	pub fn edges(&self) -> &[EdgeEntry] {
		&self.edges
	}

	pub fn node_id(&self, idx: DefaultNodeIdx) -> Option<&str> {
		self.index
			.iter()
			.find(|&(_, &i)| i == idx)
			.map(|(id, _)| id.as_str())
	}

	#[cfg(test)]
	pub(super) fn node_position(&self, id: &str) -> Option<(f64, f64)> {
		let idx = *self.index.get(id)?;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut out = HashMap::new();
		self.graph.visit_nodes(|node| {
			out.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		out
	}

	pub fn connected_edges(&self, id: &str) -> Vec<String> {
		let Some(&idx) = self.index.get(id) else {
			return Vec::new();
		};
		self.edges
			.iter()
			.filter(|e| e.src == idx || e.tgt == idx)
			.map(|e| e.id.clone())
			.collect()
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// HIT_RADIUS is in world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn edge_at_position(&self, sx: f64, sy: f64) -> Option<String> {
		let p = self.screen_to_graph(sx, sy);
		let positions = self.positions();
		self.edges
			.iter()
			.find(|edge| match (positions.get(&edge.src), positions.get(&edge.tgt)) {
				(Some(&a), Some(&b)) => segment_distance(p, a, b) < EDGE_HIT_RADIUS,
				_ => false,
			})
			.map(|edge| edge.id.clone())
	}

	pub fn selection(&self) -> &Selection {
		&self.selection
	}

	pub fn is_node_selected(&self, id: &str) -> bool {
		self.selection.nodes.iter().any(|n| n == id)
	}

	pub fn is_edge_selected(&self, id: &str) -> bool {
		self.selection.edges.iter().any(|e| e == id)
	}

	/// Select a node. `additive` toggles it within the current selection.
	pub fn select_node(&mut self, id: &str, additive: bool) {
		let additive = additive && self.options.interaction.multiselect;
		let connected = if self.options.interaction.select_connected_edges {
			self.connected_edges(id)
		} else {
			Vec::new()
		};

		if !additive {
			self.selection = Selection {
				nodes: vec![id.to_owned()],
				edges: connected,
			};
			return;
		}

		if let Some(pos) = self.selection.nodes.iter().position(|n| n == id) {
			self.selection.nodes.remove(pos);
			self.selection.edges.retain(|e| !connected.contains(e));
		} else {
			self.selection.nodes.push(id.to_owned());
			for edge in connected {
				if !self.selection.edges.contains(&edge) {
					self.selection.edges.push(edge);
				}
			}
		}
	}

	pub fn select_edge(&mut self, id: &str, additive: bool) {
		if !(additive && self.options.interaction.multiselect) {
			self.selection = Selection {
				nodes: Vec::new(),
				edges: vec![id.to_owned()],
			};
			return;
		}
		if let Some(pos) = self.selection.edges.iter().position(|e| e == id) {
			self.selection.edges.remove(pos);
		} else {
			self.selection.edges.push(id.to_owned());
		}
	}

	pub fn unselect_all(&mut self) {
		self.selection = Selection::default();
	}

	pub fn start_draft(&mut self, from: DefaultNodeIdx, sx: f64, sy: f64) {
		let (x, y) = self.screen_to_graph(sx, sy);
		self.draft = Some(DraftEdge { from, x, y });
	}

	pub fn move_draft(&mut self, sx: f64, sy: f64) {
		let (x, y) = self.screen_to_graph(sx, sy);
		if let Some(draft) = self.draft.as_mut() {
			draft.x = x;
			draft.y = y;
		}
	}

	/// End the rubber band. Yields a draft when released over a node.
	pub fn finish_draft(&mut self, sx: f64, sy: f64) -> Option<EdgeDraft> {
		let draft = self.draft.take()?;
		let target = self.node_at_position(sx, sy)?;
		Some(EdgeDraft {
			from: self.node_id(draft.from)?.to_owned(),
			to: self.node_id(target)?.to_owned(),
		})
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		let node = if self.options.interaction.hover {
			node
		} else {
			None
		};
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Save previous state for fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for edge in &self.edges {
				if edge.src == idx {
					self.hover.neighbors.insert(edge.tgt);
				} else if edge.tgt == idx {
					self.hover.neighbors.insert(edge.src);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
		self.flow_time += dt as f64;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		// First real size: put the graph origin in the middle.
		if self.width <= 0.0 {
			self.transform.x = width / 2.0;
			self.transform.y = height / 2.0;
		}
		self.width = width;
		self.height = height;
	}

	/// Zoom around the canvas center.
	pub fn zoom_by(&mut self, factor: f64) {
		let (cx, cy) = (self.width / 2.0, self.height / 2.0);
		self.zoom_at(cx, cy, factor);
	}

	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Scale and center so every node is visible.
	pub fn fit(&mut self) {
		let positions = self.positions();
		if positions.is_empty() || self.width <= 0.0 {
			return;
		}
		let (mut min_x, mut min_y, mut max_x, mut max_y) =
			(f64::MAX, f64::MAX, f64::MIN, f64::MIN);
		for &(x, y) in positions.values() {
			min_x = min_x.min(x);
			min_y = min_y.min(y);
			max_x = max_x.max(x);
			max_y = max_y.max(y);
		}
		let pad = 4.0 * HIT_RADIUS;
		let k = (self.width / (max_x - min_x + pad))
			.min(self.height / (max_y - min_y + pad))
			.clamp(0.1, 2.0);
		let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: &str) -> GraphNode {
		GraphNode {
			id: id.into(),
			..GraphNode::default()
		}
	}

	fn edge(from: &str, to: &str) -> GraphEdge {
		GraphEdge {
			from: from.into(),
			to: to.into(),
			..GraphEdge::default()
		}
	}

	/// Deterministic layout: skip the settling pass.
	fn sample(options: &GraphOptions) -> GraphViewState {
		let mut options = options.clone();
		options.physics.stabilization = false;
		let mut state = GraphViewState::new(&options);
		state.set_data(&GraphData {
			nodes: vec![node("a"), node("b"), node("c")],
			edges: vec![edge("a", "b"), edge("b", "c"), edge("c", "zz")],
		});
		state
	}

	#[test]
	fn drops_edges_with_unknown_endpoints() {
		let state = sample(&GraphOptions::network());
		assert_eq!(state.node_count(), 3);
		let ids: Vec<_> = state.edges().iter().map(|e| e.id.as_str()).collect();
		assert_eq!(ids, vec!["a -- b", "b -- c"]);
	}

	#[test]
	fn add_nodes_skips_existing_ids() {
		let mut state = sample(&GraphOptions::network());
		state.add_nodes(&[node("a"), node("d")]);
		assert_eq!(state.node_count(), 4);
	}

	#[test]
	fn finds_node_under_pointer() {
		let state = sample(&GraphOptions::network());
		let (x, y) = state.node_position("b").unwrap();
		let idx = state.node_at_position(x + 1.0, y - 1.0).unwrap();
		assert_eq!(state.node_id(idx), Some("b"));
	}

	#[test]
	fn segment_distance_measures_to_nearest_point() {
		assert_eq!(segment_distance((5.0, 3.0), (0.0, 0.0), (10.0, 0.0)), 3.0);
		assert_eq!(segment_distance((-4.0, 3.0), (0.0, 0.0), (10.0, 0.0)), 5.0);
	}

	#[test]
	fn selecting_node_pulls_connected_edges_when_enabled() {
		let mut state = sample(&GraphOptions::network());
		state.select_node("b", false);
		assert_eq!(state.selection().nodes, vec!["b"]);
		assert_eq!(state.selection().edges.len(), 2);

		let mut sandbox = sample(&GraphOptions::sandbox());
		sandbox.select_node("b", false);
		assert!(sandbox.selection().edges.is_empty());
	}

	#[test]
	fn additive_selection_keeps_click_order_and_toggles() {
		let mut state = sample(&GraphOptions::sandbox());
		state.select_node("c", true);
		state.select_node("a", true);
		assert_eq!(state.selection().nodes, vec!["c", "a"]);
		state.select_node("c", true);
		assert_eq!(state.selection().nodes, vec!["a"]);
		state.select_node("b", false);
		assert_eq!(state.selection().nodes, vec!["b"]);
	}

	#[test]
	fn removing_node_drops_its_edges_and_keeps_positions() {
		let mut state = sample(&GraphOptions::sandbox());
		let before = state.node_position("c").unwrap();
		state.select_node("a", false);
		state.remove_nodes(&["a".to_string()]);

		assert_eq!(state.node_count(), 2);
		let ids: Vec<_> = state.edges().iter().map(|e| e.id.as_str()).collect();
		assert_eq!(ids, vec!["b -- c"]);
		assert_eq!(state.node_position("c"), Some(before));
		assert!(state.selection().is_empty());
	}

	#[test]
	fn removing_edge_keeps_nodes() {
		let mut state = sample(&GraphOptions::sandbox());
		state.select_edge("a -- b", false);
		state.remove_edges(&["a -- b".to_string(), "missing".to_string()]);
		assert_eq!(state.node_count(), 3);
		assert_eq!(state.edges().len(), 1);
		assert!(state.selection().edges.is_empty());
	}

	#[test]
	fn draft_released_over_node_yields_edge() {
		let mut state = sample(&GraphOptions::sandbox());
		let (ax, ay) = state.node_position("a").unwrap();
		let (cx, cy) = state.node_position("c").unwrap();
		let from = state.node_at_position(ax, ay).unwrap();
		state.start_draft(from, ax, ay);
		state.move_draft(cx, cy);
		let draft = state.finish_draft(cx, cy).unwrap();
		assert_eq!(draft.from, "a");
		assert_eq!(draft.to, "c");
		assert!(state.draft.is_none());
	}

	#[test]
	fn hover_is_ignored_when_disabled() {
		let mut state = sample(&GraphOptions::network());
		let (x, y) = state.node_position("a").unwrap();
		let idx = state.node_at_position(x, y);
		state.set_hover(idx);
		assert!(!state.has_active_highlight());
	}
}
