//! Collapsible panels around the two graph views.
//!
//! Visibility here is view state only. Graph views stay mounted when their
//! panel is collapsed so the handles keep pointing at live canvases.

use leptos::prelude::*;

use crate::components::graph_view::{GraphHandle, GraphView, Selection};
use crate::reservation::{PanelVisibility, Reservation};

/// Clickable panel title that flips `open`.
#[component]
pub fn Heading(#[prop(into)] title: String, open: RwSignal<bool>) -> impl IntoView {
	view! {
		<div class="panel-heading">
			<h4 class="panel-title">
				<a
					href="#"
					on:click=move |ev| {
						ev.prevent_default();
						open.update(|o| *o = !*o);
					}
				>
					{title}
				</a>
			</h4>
		</div>
	}
}

fn display(open: RwSignal<bool>) -> impl Fn() -> &'static str + Copy {
	move || if open.get() { "block" } else { "none" }
}

/// Topology map with the button that commits its selection.
#[component]
pub fn NetworkPanel<F>(
	graph: GraphHandle,
	on_add: F,
	#[prop(into)] load_error: Signal<Option<String>>,
) -> impl IntoView
where
	F: Fn() + 'static,
{
	let open = RwSignal::new(true);

	view! {
		<div class="panel-group">
			<div class="panel panel-default">
				<Heading title="Show / hide network" open=open />
				<div id="network_panel" class="panel-body" style:display=display(open)>
					{move || {
						load_error
							.get()
							.map(|e| {
								view! {
									<div class="alert alert-warning">
										"Could not load the network map: " {e}
									</div>
								}
							})
					}}
					<div class="col-md-10">
						<GraphView handle=graph id="network_viz" />
					</div>
					<AddJunctionButton on_click=on_add />
				</div>
			</div>
		</div>
	}
}

#[component]
pub fn AddJunctionButton<F>(on_click: F) -> impl IntoView
where
	F: Fn() + 'static,
{
	view! {
		<div id="add_junction_div" class="col-md-2 affix-top">
			<input
				type="button"
				id="add_junction_btn"
				class="btn btn-primary active"
				value="Add to request"
				on:click=move |_| on_click()
			/>
		</div>
	}
}

/// Sandbox graph, parameter summary, and the detail cards the sandbox
/// selection asks for.
#[component]
pub fn ReservationDetailsPanel(
	sandbox: GraphHandle,
	#[prop(into)] reservation: Signal<Reservation>,
	#[prop(into)] panels: Signal<PanelVisibility>,
	#[prop(into)] selection: Signal<Selection>,
) -> impl IntoView {
	let open = RwSignal::new(true);

	view! {
		<div class="panel-group">
			<div class="panel panel-default">
				<Heading title="Show / hide reservation" open=open />
				<div id="reservation_panel" class="panel-body" style:display=display(open)>
					<div class="col-md-6">
						<GraphView handle=sandbox id="reservation_viz" />
					</div>
					<ParameterForm reservation=reservation />
				</div>
			</div>
			<div style:display=display(open)>
				{move || {
					if panels.get().show_pipe_panel {
						view! { <PipePanel reservation=reservation selection=selection /> }.into_any()
					} else {
						view! { <div /> }.into_any()
					}
				}}
				{move || {
					if panels.get().show_junction_panel {
						view! { <JunctionPanel reservation=reservation selection=selection /> }
							.into_any()
					} else {
						view! { <div /> }.into_any()
					}
				}}
			</div>
		</div>
	}
}

#[component]
pub fn ParameterForm(#[prop(into)] reservation: Signal<Reservation>) -> impl IntoView {
	view! {
		<div id="resv_common_params_form" class="panel panel-default col-md-6">
			<dl class="dl-horizontal">
				<dt>"Junctions"</dt>
				<dd>{move || reservation.get().junction_count()}</dd>
				<dt>"Pipes"</dt>
				<dd>{move || reservation.get().pipe_count()}</dd>
			</dl>
		</div>
	}
}

#[component]
pub fn PipePanel(
	#[prop(into)] reservation: Signal<Reservation>,
	#[prop(into)] selection: Signal<Selection>,
) -> impl IntoView {
	let rows = move || {
		let reservation = reservation.get();
		selection
			.get()
			.edges
			.iter()
			.filter_map(|id| reservation.pipe(id).cloned())
			.map(|pipe| {
				view! {
					<tr>
						<td>{pipe.id}</td>
						<td>{pipe.from}</td>
						<td>{pipe.to}</td>
					</tr>
				}
			})
			.collect_view()
	};

	view! {
		<div id="pipe_card" class="panel panel-default">
			<div class="panel-heading">"Pipe details"</div>
			<table class="table table-condensed">
				<thead>
					<tr>
						<th>"Pipe"</th>
						<th>"From"</th>
						<th>"To"</th>
					</tr>
				</thead>
				<tbody>{rows}</tbody>
			</table>
		</div>
	}
}

#[component]
pub fn JunctionPanel(
	#[prop(into)] reservation: Signal<Reservation>,
	#[prop(into)] selection: Signal<Selection>,
) -> impl IntoView {
	let rows = move || {
		let reservation = reservation.get();
		selection
			.get()
			.nodes
			.iter()
			.filter_map(|id| reservation.junction(id).cloned())
			.map(|junction| {
				let pipes = reservation
					.pipes()
					.filter(|p| p.touches(&junction.id))
					.count();
				view! {
					<tr>
						<td>{junction.label}</td>
						<td>{pipes}</td>
					</tr>
				}
			})
			.collect_view()
	};

	view! {
		<div id="junction_card" class="panel panel-default">
			<div class="panel-heading">"Junction details"</div>
			<table class="table table-condensed">
				<thead>
					<tr>
						<th>"Junction"</th>
						<th>"Pipes"</th>
					</tr>
				</thead>
				<tbody>{rows}</tbody>
			</table>
		</div>
	}
}
