//! Shared handle to a mounted (or not yet mounted) graph view.
//!
//! Owners mutate the data source and query the selection through the handle,
//! subscribe to selection events, and install manipulation hooks. A hook
//! receives the user's request plus an `accept` callback; the view only
//! changes if the hook calls `accept`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::debug;

use super::state::GraphViewState;
use super::types::{Deletion, EdgeDraft, GraphData, GraphEdge, GraphEvent, GraphNode, Selection};
use crate::config::GraphOptions;

pub type AcceptEdge = Box<dyn FnOnce(GraphEdge)>;
pub type AcceptDeletion = Box<dyn FnOnce(Deletion)>;

type Listener = Rc<dyn Fn(&GraphEvent)>;
type EdgeHook = Rc<dyn Fn(EdgeDraft, AcceptEdge)>;
type DeletionHook = Rc<dyn Fn(Deletion, AcceptDeletion)>;

#[derive(Clone, Default)]
struct Hooks {
	add_edge: Option<EdgeHook>,
	delete_edge: Option<DeletionHook>,
	delete_node: Option<DeletionHook>,
}

/// What an owner needs from a graph view: read and clear the selection, and
/// push new items into its data source.
pub trait GraphSurface {
	fn selected_nodes(&self) -> Vec<String>;
	fn unselect_all(&self);
	fn add_nodes(&self, nodes: Vec<GraphNode>);
	fn add_edges(&self, edges: Vec<GraphEdge>);
}

#[derive(Clone)]
pub struct GraphHandle {
	pub(super) state: Rc<RefCell<GraphViewState>>,
	listeners: Rc<RefCell<Vec<Listener>>>,
	hooks: Rc<RefCell<Hooks>>,
}

impl GraphHandle {
	pub fn new(options: &GraphOptions) -> Self {
		Self {
			state: Rc::new(RefCell::new(GraphViewState::new(options))),
			listeners: Rc::new(RefCell::new(Vec::new())),
			hooks: Rc::new(RefCell::new(Hooks::default())),
		}
	}

	pub fn options(&self) -> GraphOptions {
		self.state.borrow().options.clone()
	}

	pub fn set_data(&self, data: &GraphData) {
		self.state.borrow_mut().set_data(data);
	}

	pub fn remove_nodes(&self, ids: &[String]) {
		self.state.borrow_mut().remove_nodes(ids);
	}

	pub fn remove_edges(&self, ids: &[String]) {
		self.state.borrow_mut().remove_edges(ids);
	}

	pub fn selection(&self) -> Selection {
		self.state.borrow().selection().clone()
	}

	pub fn zoom_by(&self, factor: f64) {
		self.state.borrow_mut().zoom_by(factor);
	}

	pub fn fit(&self) {
		self.state.borrow_mut().fit();
	}

	/// Subscribe to selection events.
	pub fn on(&self, listener: impl Fn(&GraphEvent) + 'static) {
		self.listeners.borrow_mut().push(Rc::new(listener));
	}

	pub fn set_add_edge_hook(&self, hook: impl Fn(EdgeDraft, AcceptEdge) + 'static) {
		self.hooks.borrow_mut().add_edge = Some(Rc::new(hook));
	}

	pub fn set_delete_edge_hook(&self, hook: impl Fn(Deletion, AcceptDeletion) + 'static) {
		self.hooks.borrow_mut().delete_edge = Some(Rc::new(hook));
	}

	pub fn set_delete_node_hook(&self, hook: impl Fn(Deletion, AcceptDeletion) + 'static) {
		self.hooks.borrow_mut().delete_node = Some(Rc::new(hook));
	}

	/// Notify listeners. Must not be called while the view state is borrowed.
	pub(super) fn emit(&self, event: GraphEvent) {
		let listeners = self.listeners.borrow().clone();
		for listener in listeners {
			listener(&event);
		}
	}

	pub(super) fn emit_selection(&self) {
		let selection = self.selection();
		self.emit(GraphEvent::Select(selection));
	}

	/// Offer a drawn edge to the add-edge hook. Without a hook the edge is
	/// committed as drawn.
	pub fn request_add_edge(&self, draft: EdgeDraft) {
		let hook = self.hooks.borrow().add_edge.clone();
		let state = self.state.clone();
		let accept: AcceptEdge = Box::new(move |edge| state.borrow_mut().add_edges(&[edge]));
		match hook {
			Some(hook) => hook(draft, accept),
			None => accept(GraphEdge {
				id: None,
				from: draft.from,
				to: draft.to,
				label: None,
			}),
		}
	}

	/// Offer the current selection for deletion. Selected nodes go to the
	/// delete-node hook together with every edge touching them; a selection of
	/// edges only goes to the delete-edge hook.
	pub fn request_delete_selected(&self) {
		let (deletion, node_delete) = {
			let state = self.state.borrow();
			let selection = state.selection();
			if selection.is_empty() {
				return;
			}
			let mut edges = selection.edges.clone();
			for node in &selection.nodes {
				for edge in state.connected_edges(node) {
					if !edges.contains(&edge) {
						edges.push(edge);
					}
				}
			}
			let deletion = Deletion {
				nodes: selection.nodes.clone(),
				edges,
			};
			let node_delete = !deletion.nodes.is_empty();
			(deletion, node_delete)
		};

		let (manipulation, hook) = {
			let hooks = self.hooks.borrow();
			let options = self.options().manipulation;
			if node_delete {
				(options.delete_node, hooks.delete_node.clone())
			} else {
				(options.delete_edge, hooks.delete_edge.clone())
			}
		};
		if !manipulation {
			debug!("Deletion disabled for this view");
			return;
		}

		let committed = Rc::new(Cell::new(false));
		let (handle, flag) = (self.clone(), committed.clone());
		let accept: AcceptDeletion = Box::new(move |deletion| {
			handle.remove_edges(&deletion.edges);
			handle.remove_nodes(&deletion.nodes);
			flag.set(true);
		});
		match hook {
			Some(hook) => hook(deletion, accept),
			None => accept(deletion),
		}

		if committed.get() {
			self.emit_selection();
		}
	}
}

impl GraphSurface for GraphHandle {
	fn selected_nodes(&self) -> Vec<String> {
		self.state.borrow().selection().nodes.clone()
	}

	fn unselect_all(&self) {
		self.state.borrow_mut().unselect_all();
	}

	fn add_nodes(&self, nodes: Vec<GraphNode>) {
		self.state.borrow_mut().add_nodes(&nodes);
	}

	fn add_edges(&self, edges: Vec<GraphEdge>) {
		self.state.borrow_mut().add_edges(&edges);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sandbox() -> GraphHandle {
		let mut options = GraphOptions::sandbox();
		options.physics.stabilization = false;
		let handle = GraphHandle::new(&options);
		handle.add_nodes(vec![
			GraphNode {
				id: "a".into(),
				..GraphNode::default()
			},
			GraphNode {
				id: "b".into(),
				..GraphNode::default()
			},
		]);
		handle.add_edges(vec![GraphEdge {
			from: "a".into(),
			to: "b".into(),
			..GraphEdge::default()
		}]);
		handle
	}

	#[test]
	fn unaccepted_edge_is_not_added() {
		let handle = sandbox();
		handle.set_add_edge_hook(|_, _accept| {});
		handle.request_add_edge(EdgeDraft {
			from: "b".into(),
			to: "a".into(),
		});
		assert_eq!(handle.state.borrow().edges().len(), 1);
	}

	#[test]
	fn accepted_edge_uses_hook_supplied_id() {
		let handle = sandbox();
		handle.set_add_edge_hook(|draft, accept| {
			accept(GraphEdge {
				id: Some(format!("{} -- {}", draft.from, draft.to)),
				from: draft.from,
				to: draft.to,
				label: None,
			})
		});
		handle.request_add_edge(EdgeDraft {
			from: "b".into(),
			to: "a".into(),
		});
		let ids: Vec<_> = handle
			.state
			.borrow()
			.edges()
			.iter()
			.map(|e| e.id.clone())
			.collect();
		assert_eq!(ids, vec!["a -- b", "b -- a"]);
	}

	#[test]
	fn node_deletion_carries_connected_edges_and_notifies_once_committed() {
		let handle = sandbox();
		let seen = Rc::new(RefCell::new(Vec::new()));
		let events = Rc::new(Cell::new(0));

		let sink = seen.clone();
		handle.set_delete_node_hook(move |deletion, accept| {
			sink.borrow_mut().push(deletion.clone());
			accept(deletion);
		});
		let counter = events.clone();
		handle.on(move |_| counter.set(counter.get() + 1));

		handle.state.borrow_mut().select_node("a", false);
		handle.request_delete_selected();

		assert_eq!(
			seen.borrow().as_slice(),
			&[Deletion {
				nodes: vec!["a".into()],
				edges: vec!["a -- b".into()],
			}]
		);
		assert_eq!(handle.state.borrow().node_count(), 1);
		assert_eq!(events.get(), 1);
	}

	#[test]
	fn rejected_deletion_leaves_view_alone() {
		let handle = sandbox();
		handle.set_delete_edge_hook(|_, _accept| {});
		let events = Rc::new(Cell::new(0));
		let counter = events.clone();
		handle.on(move |_| counter.set(counter.get() + 1));

		handle.state.borrow_mut().select_edge("a -- b", false);
		handle.request_delete_selected();

		assert_eq!(handle.state.borrow().edges().len(), 1);
		assert_eq!(events.get(), 0);
	}

	#[test]
	fn edge_deletion_without_hook_clears_the_edge_and_selection() {
		let handle = sandbox();
		let events = Rc::new(Cell::new(0));
		let counter = events.clone();
		handle.on(move |_| counter.set(counter.get() + 1));

		handle.request_delete_selected();
		assert_eq!(events.get(), 0);

		handle.state.borrow_mut().select_edge("a -- b", false);
		handle.request_delete_selected();

		assert!(handle.state.borrow().edges().is_empty());
		assert_eq!(handle.state.borrow().node_count(), 2);
		assert!(handle.selection().edges.is_empty());
		assert_eq!(events.get(), 1);
	}
}
