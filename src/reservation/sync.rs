//! Keeps the draft reservation and the sandbox graph in step.
//!
//! Two event sources drive it: committed selections on the topology map, and
//! direct edits or selections in the sandbox. Handlers run to completion on
//! the UI thread and publish the outcome to subscribers.

use log::{debug, info};

use super::model::{Junction, Pipe, Reservation};
use crate::components::graph_view::{
	Deletion, EdgeDraft, GraphEdge, GraphNode, GraphSurface, Selection,
};
use crate::error::EdgeRejection;

/// Which detail cards the sandbox selection calls for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PanelVisibility {
	pub show_pipe_panel: bool,
	pub show_junction_panel: bool,
}

impl From<&Selection> for PanelVisibility {
	fn from(selection: &Selection) -> Self {
		Self {
			show_pipe_panel: !selection.edges.is_empty(),
			show_junction_panel: !selection.nodes.is_empty(),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum SyncEvent {
	ReservationChanged(Reservation),
	PanelsChanged {
		visibility: PanelVisibility,
		selection: Selection,
	},
}

impl From<&Junction> for GraphNode {
	fn from(junction: &Junction) -> Self {
		GraphNode {
			id: junction.id.clone(),
			label: Some(junction.label.clone()),
			..GraphNode::default()
		}
	}
}

impl From<&Pipe> for GraphEdge {
	fn from(pipe: &Pipe) -> Self {
		GraphEdge {
			id: Some(pipe.id.clone()),
			from: pipe.from.clone(),
			to: pipe.to.clone(),
			label: None,
		}
	}
}

type Listener = Box<dyn Fn(&SyncEvent)>;

#[derive(Default)]
pub struct ReservationSync {
	reservation: Reservation,
	last: Option<String>,
	listeners: Vec<Listener>,
}

impl ReservationSync {
	pub fn new(reservation: Reservation) -> Self {
		Self {
			reservation,
			..Self::default()
		}
	}

	pub fn subscribe(&mut self, listener: impl Fn(&SyncEvent) + 'static) {
		self.listeners.push(Box::new(listener));
	}

	#[cfg(test)]
	fn reservation(&self) -> &Reservation {
		&self.reservation
	}

	#[cfg(test)]
	fn last_junction(&self) -> Option<&str> {
		self.last.as_deref()
	}

	fn publish(&self, event: SyncEvent) {
		for listener in &self.listeners {
			listener(&event);
		}
	}

	fn replace(&mut self, next: Reservation) {
		if next == self.reservation {
			return;
		}
		self.reservation = next;
		self.publish(SyncEvent::ReservationChanged(self.reservation.clone()));
	}

	/// Fold the topology selection into the reservation and mirror the new
	/// junctions and pipes into the sandbox. Returns whether anything was
	/// added. The topology selection is only cleared when something was
	/// added, so an empty commit leaves the user's picks in place.
	pub fn on_topology_selection_committed(
		&mut self,
		topology: &impl GraphSurface,
		sandbox: &impl GraphSurface,
	) -> bool {
		let selected = topology.selected_nodes();
		let commit = self
			.reservation
			.commit_selection(self.last.as_deref(), &selected);
		let changed = !commit.is_empty();

		if changed {
			info!(
				"Adding {} junction(s) and {} pipe(s) to the reservation",
				commit.junctions.len(),
				commit.pipes.len()
			);
			self.last = commit.last;
			self.replace(commit.reservation);
			sandbox.add_nodes(commit.junctions.iter().map(GraphNode::from).collect());
			sandbox.add_edges(commit.pipes.iter().map(GraphEdge::from).collect());
			topology.unselect_all();
		} else {
			debug!("Selection of {} node(s) added nothing", selected.len());
		}

		changed
	}

	/// A user drew an edge in the sandbox. Valid edges are committed to the
	/// view through `accept` and recorded as pipes; rejected ones are dropped
	/// without calling `accept`.
	pub fn on_sandbox_edge_added(
		&mut self,
		draft: EdgeDraft,
		accept: impl FnOnce(GraphEdge),
	) -> Result<Pipe, EdgeRejection> {
		match self.reservation.with_pipe(&draft.from, &draft.to) {
			Ok((next, pipe)) => {
				accept(GraphEdge::from(&pipe));
				self.replace(next);
				Ok(pipe)
			}
			Err(rejection) => {
				debug!("Ignoring sandbox edge: {}", rejection);
				Err(rejection)
			}
		}
	}

	pub fn on_sandbox_edge_deleted(&mut self, deletion: Deletion, accept: impl FnOnce(Deletion)) {
		accept(deletion.clone());
		let next = self.reservation.without_pipes(&deletion.edges);
		self.replace(next);
	}

	/// Junction removal also drops every pipe touching the junction.
	pub fn on_sandbox_node_deleted(&mut self, deletion: Deletion, accept: impl FnOnce(Deletion)) {
		accept(deletion.clone());
		if self
			.last
			.as_ref()
			.is_some_and(|last| deletion.nodes.contains(last))
		{
			self.last = None;
		}
		let next = self
			.reservation
			.without_junctions(&deletion.nodes)
			.without_pipes(&deletion.edges);
		self.replace(next);
	}

	pub fn on_sandbox_selection_changed(&mut self, selection: Selection) -> PanelVisibility {
		let visibility = PanelVisibility::from(&selection);
		self.publish(SyncEvent::PanelsChanged {
			visibility,
			selection,
		});
		visibility
	}
}
