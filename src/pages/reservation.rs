use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, warn};

use crate::components::graph_view::{GraphEvent, GraphHandle, Selection};
use crate::components::panels::{NetworkPanel, ReservationDetailsPanel};
use crate::config::AppConfig;
use crate::reservation::{PanelVisibility, Reservation, ReservationSync, SyncEvent};
use crate::topology;

/// Wire the sandbox's manipulation hooks and selection events into `sync`.
fn connect_sandbox(sandbox: &GraphHandle, sync: &Rc<RefCell<ReservationSync>>) {
	let s = sync.clone();
	sandbox.set_add_edge_hook(move |draft, accept| {
		if let Ok(pipe) = s.borrow_mut().on_sandbox_edge_added(draft, accept) {
			debug!("Pipe {} added from the sandbox", pipe.id);
		}
	});

	let s = sync.clone();
	sandbox.set_delete_edge_hook(move |deletion, accept| {
		s.borrow_mut().on_sandbox_edge_deleted(deletion, accept);
	});

	let s = sync.clone();
	sandbox.set_delete_node_hook(move |deletion, accept| {
		s.borrow_mut().on_sandbox_node_deleted(deletion, accept);
	});

	let s = sync.clone();
	sandbox.on(move |event| match event {
		GraphEvent::Select(selection) => {
			debug!(
				"Sandbox selection: {} node(s), {} edge(s)",
				selection.nodes.len(),
				selection.edges.len()
			);
			s.borrow_mut().on_sandbox_selection_changed(selection.clone());
		}
	});
}

/// Topology map on top, draft reservation below.
#[component]
pub fn ReservationPage() -> impl IntoView {
	let config = use_context::<AppConfig>().unwrap_or_default();
	let network = GraphHandle::new(&config.network);
	let sandbox = GraphHandle::new(&config.sandbox);

	let reservation = RwSignal::new(Reservation::default());
	let panels = RwSignal::new(PanelVisibility::default());
	let selection = RwSignal::new(Selection::default());
	let load_error = RwSignal::new(None::<String>);

	let sync = Rc::new(RefCell::new(ReservationSync::new(reservation.get_untracked())));
	sync.borrow_mut().subscribe(move |event| match event {
		SyncEvent::ReservationChanged(next) => reservation.set(next.clone()),
		SyncEvent::PanelsChanged {
			visibility,
			selection: picked,
		} => {
			panels.set(*visibility);
			selection.set(picked.clone());
		}
	});
	connect_sandbox(&sandbox, &sync);

	let loader = network.clone();
	let path = config.topology_path.clone();
	spawn_local(async move {
		match topology::load(&path).await {
			Ok(data) => {
				loader.set_data(&data);
				loader.fit();
			}
			Err(e) => {
				warn!("Topology unavailable: {}", e);
				load_error.set(Some(e.to_string()));
			}
		}
	});

	let (network_add, sandbox_add) = (network.clone(), sandbox.clone());
	let on_add = move || {
		sync.borrow_mut()
			.on_topology_selection_committed(&network_add, &sandbox_add);
	};

	view! {
		<div class="container-fluid reservation-app">
			<NetworkPanel graph=network on_add=on_add load_error=load_error />
			<ReservationDetailsPanel
				sandbox=sandbox
				reservation=reservation
				panels=panels
				selection=selection
			/>
		</div>
	}
}
