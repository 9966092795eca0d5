use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::handle::GraphHandle;
use super::render;
use super::state::{CLICK_SLOP, EditMode, PressState};

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn additive(ev: &MouseEvent) -> bool {
	ev.ctrl_key() || ev.meta_key() || ev.shift_key()
}

/// Canvas-rendered, force-directed graph driven through a [`GraphHandle`].
#[component]
pub fn GraphView(handle: GraphHandle, #[prop(optional, into)] id: String) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let options = handle.options();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (handle_init, animate_init) = (handle.clone(), animate.clone());
	let height = options.height;

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let w = canvas
			.parent_element()
			.map(|p| p.client_width() as f64)
			.filter(|w| *w > 0.0)
			.unwrap_or(800.0);
		canvas.set_width(w as u32);
		canvas.set_height(height as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("Canvas 2d context unavailable; graph view disabled");
			return;
		};
		handle_init.state.borrow_mut().resize(w, height);

		let (state_anim, animate_inner) = (handle_init.state.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Ok(mut s) = state_anim.try_borrow_mut() {
				if s.animation_running {
					s.tick(0.016);
				}
				render::render(&s, &ctx);
			}
			if let (Some(cb), Some(window)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let (Some(cb), Some(window)) = (&*animate_init.borrow(), web_sys::window()) {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let handle_md = handle.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		let mut s = handle_md.state.borrow_mut();
		s.press = Some(PressState { x, y, moved: false });

		let hit = s.node_at_position(x, y);
		match (s.mode, hit) {
			(EditMode::AddEdge, Some(idx)) => s.start_draft(idx, x, y),
			(_, Some(idx)) => {
				s.drag.active = true;
				s.drag.node_idx = Some(idx);
				s.drag.start_x = x;
				s.drag.start_y = y;
				let (mut nx, mut ny) = (0.0, 0.0);
				s.graph.visit_nodes(|node| {
					if node.index() == idx {
						nx = node.x();
						ny = node.y();
					}
				});
				s.drag.node_start_x = nx;
				s.drag.node_start_y = ny;
			}
			(_, None) if s.options.interaction.drag_view => {
				s.pan.active = true;
				s.pan.start_x = x;
				s.pan.start_y = y;
				s.pan.transform_start_x = s.transform.x;
				s.pan.transform_start_y = s.transform.y;
			}
			_ => {}
		}
	};

	let handle_mm = handle.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		let mut s = handle_mm.state.borrow_mut();
		if let Some(press) = s.press.as_mut() {
			if (x - press.x).abs() > CLICK_SLOP || (y - press.y).abs() > CLICK_SLOP {
				press.moved = true;
			}
		}

		if s.draft.is_some() {
			s.move_draft(x, y);
			return;
		}

		// Update hover state when not dragging
		if !s.drag.active {
			let hovered = s.node_at_position(x, y);
			s.set_hover(hovered);
		}

		if s.drag.active {
			if let Some(idx) = s.drag.node_idx {
				let (dx, dy) = (
					(x - s.drag.start_x) / s.transform.k,
					(y - s.drag.start_y) / s.transform.k,
				);
				let (nx, ny) = (
					s.drag.node_start_x + dx as f32,
					s.drag.node_start_y + dy as f32,
				);
				s.graph.visit_nodes_mut(|node| {
					if node.index() == idx {
						node.data.x = nx;
						node.data.y = ny;
						node.data.is_anchor = true;
					}
				});
			}
		} else if s.pan.active {
			s.transform.x = s.pan.transform_start_x + (x - s.pan.start_x);
			s.transform.y = s.pan.transform_start_y + (y - s.pan.start_y);
		}
	};

	let handle_mu = handle.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		// Work out what the press meant, then release the borrow before
		// anything reaches hooks or listeners.
		let (draft, selection_changed) = {
			let mut s = handle_mu.state.borrow_mut();
			let press = s.press.take();
			let clicked = press.is_some_and(|p| !p.moved);
			let draft = if s.draft.is_some() {
				s.finish_draft(x, y)
			} else {
				None
			};

			let mut changed = false;
			if clicked && s.mode == EditMode::Select {
				let before = s.selection().clone();
				if let Some(idx) = s.node_at_position(x, y) {
					if let Some(id) = s.node_id(idx).map(str::to_owned) {
						s.select_node(&id, additive(&ev));
					}
				} else if let Some(edge) = s.edge_at_position(x, y) {
					s.select_edge(&edge, additive(&ev));
				} else {
					s.unselect_all();
				}
				changed = *s.selection() != before;
			}

			s.drag.active = false;
			s.drag.node_idx = None;
			s.pan.active = false;
			(draft, changed)
		};

		if let Some(draft) = draft {
			debug!("Edge drawn: {} -> {}", draft.from, draft.to);
			handle_mu.request_add_edge(draft);
		}
		if selection_changed {
			handle_mu.emit_selection();
		}
	};

	let handle_ml = handle.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let mut s = handle_ml.state.borrow_mut();
		s.drag.active = false;
		s.drag.node_idx = None;
		s.pan.active = false;
		s.press = None;
		s.draft = None;
		s.set_hover(None);
	};

	let handle_wh = handle.clone();
	let on_wheel = move |ev: WheelEvent| {
		if !handle_wh.state.borrow().options.interaction.zoom_view {
			return;
		}
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		handle_wh.state.borrow_mut().zoom_at(x, y, factor);
	};

	let navigation = options.interaction.navigation_buttons.then(|| {
		let (zoom_in, zoom_out, fit) = (handle.clone(), handle.clone(), handle.clone());
		view! {
			<div class="graph-navigation">
				<button class="btn btn-default btn-xs" on:click=move |_| zoom_in.zoom_by(1.2)>"+"</button>
				<button class="btn btn-default btn-xs" on:click=move |_| zoom_out.zoom_by(1.0 / 1.2)>"-"</button>
				<button class="btn btn-default btn-xs" on:click=move |_| fit.fit()>"Fit"</button>
			</div>
		}
	});

	let manipulation = options.manipulation.enabled.then(|| {
		let adding = RwSignal::new(false);
		let (toggle, delete) = (handle.clone(), handle.clone());
		let show_add = options.manipulation.add_edge;
		let show_delete = options.manipulation.delete_edge || options.manipulation.delete_node;
		view! {
			<div class="graph-manipulation">
				<button
					class="btn btn-default btn-xs"
					class:active=move || adding.get()
					style:display=if show_add { "inline-block" } else { "none" }
					on:click=move |_| {
						let mut s = toggle.state.borrow_mut();
						s.mode = match s.mode {
							EditMode::Select => EditMode::AddEdge,
							EditMode::AddEdge => EditMode::Select,
						};
						s.draft = None;
						adding.set(s.mode == EditMode::AddEdge);
					}
				>
					"Add edge"
				</button>
				<button
					class="btn btn-default btn-xs"
					style:display=if show_delete { "inline-block" } else { "none" }
					on:click=move |_| delete.request_delete_selected()
				>
					"Delete selected"
				</button>
			</div>
		}
	});

	view! {
		<div class="graph-view" id=id>
			{navigation}
			{manipulation}
			<canvas
				node_ref=canvas_ref
				class="graph-view-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
		</div>
	}
}
