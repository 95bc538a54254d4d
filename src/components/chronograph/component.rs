use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::state::{ChronographState, DragState, PanState};
use crate::config::TimelineSettings;
use crate::graph::{EditMode, GraphDocument, GraphSummary, Mode, NodeClick};

type Shared<T> = Rc<RefCell<Option<T>>>;

/// Pointer travel, in screen pixels, below which a press counts as a click.
const CLICK_TOLERANCE: f64 = 3.0;

/// Reactive mirrors of the canvas state shown in the controls.
#[derive(Clone, Copy)]
struct Panel {
	summary: RwSignal<Option<GraphSummary>>,
	mode: RwSignal<Mode>,
	tool: RwSignal<EditMode>,
	slider: RwSignal<f64>,
	playing: RwSignal<bool>,
	status: RwSignal<String>,
}

impl Panel {
	fn new() -> Self {
		Self {
			summary: RwSignal::new(None),
			mode: RwSignal::new(Mode::View),
			tool: RwSignal::new(EditMode::Select),
			slider: RwSignal::new(0.0),
			playing: RwSignal::new(false),
			status: RwSignal::new(String::new()),
		}
	}

	fn sync(&self, state: &ChronographState) {
		if let Some(graph) = state.graph() {
			self.summary.set(Some(graph.summary()));
			self.mode.set(graph.mode());
			self.tool.set(graph.edit_mode());
		}
		self.slider.set(state.timeline.current_value());
		self.playing.set(state.timeline.is_playing());
	}
}

fn with_state(state: &Shared<ChronographState>, panel: Panel, f: impl FnOnce(&mut ChronographState)) {
	if let Some(s) = state.borrow_mut().as_mut() {
		f(s);
		panel.sync(s);
	}
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn confirm_delete(id: &str) -> bool {
	web_sys::window()
		.and_then(|w| {
			w.confirm_with_message(&format!(
				"Node {id} will be permanently deleted and cannot be recovered. Are you sure?"
			))
			.ok()
		})
		.unwrap_or(false)
}

/// A press and release without travel: agents first since they sit on top,
/// then nodes, then the empty canvas.
fn click(state: &mut ChronographState, x: f64, y: f64) {
	if let Some(id) = state.agent_at_position(x, y) {
		if let Some(graph) = state.graph_mut() {
			let selected = graph.toggle_agent_selection(&id);
			debug!("Agent {id} selected: {selected}");
		}
		return;
	}

	if let Some(id) = state.node_at_position(x, y) {
		let Some(graph) = state.graph_mut() else {
			return;
		};
		match graph.handle_node_click(&id) {
			NodeClick::ConfirmDelete(id) => {
				if confirm_delete(&id) {
					graph.delete_node(&id);
				} else {
					graph.cancel_delete();
				}
			}
			NodeClick::EdgeFinished {
				edge,
				changed: false,
			} => debug!("{edge} left as it was"),
			_ => {}
		}
		return;
	}

	let (gx, gy) = state.screen_to_graph(x, y);
	if let Some(graph) = state.graph_mut() {
		match graph.handle_canvas_click(gx, gy) {
			Some(id) => info!("Created node {id}"),
			None => graph.select_node(None),
		}
	}
}

fn stop_timer(timer: &Rc<RefCell<Option<i32>>>) {
	if let Some(handle) = timer.borrow_mut().take() {
		if let Some(window) = web_sys::window() {
			window.clear_interval_with_handle(handle);
		}
	}
}

#[component]
pub fn ChronographCanvas(
	#[prop(into)] document: Signal<GraphDocument>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let panel = Panel::new();
	let exported = RwSignal::new(String::new());
	let import_text = RwSignal::new(String::new());
	let import_label = RwSignal::new(String::new());

	let state: Shared<ChronographState> = Rc::new(RefCell::new(None));
	let animate: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let resize_cb: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let tick_cb: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let timer: Rc<RefCell<Option<i32>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init, timer_init) =
		(state.clone(), animate.clone(), resize_cb.clone(), timer.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = match window_size(&window) {
			Some(size) if fullscreen => size,
			_ => (
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			),
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("Canvas has no 2d context");
			return;
		};

		stop_timer(&timer_init);
		let doc = document.get();
		info!("Showing graph {}", doc.name());
		match ChronographState::new(doc, w, h) {
			Ok(s) => {
				panel.sync(&s);
				panel.status.set(String::new());
				*state_init.borrow_mut() = Some(s);
			}
			Err(e) => {
				panel.status.set(e.to_string());
				*state_init.borrow_mut() = None;
			}
		}

		if fullscreen && resize_cb_init.borrow().is_none() {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		if animate_init.borrow().is_some() {
			return;
		}
		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref s) = *state_anim.borrow() {
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		let mut guard = state_md.borrow_mut();
		let Some(s) = guard.as_mut() else {
			return;
		};

		let draggable = s
			.graph()
			.is_some_and(|g| g.mode() == Mode::Edit && g.edit_mode() == EditMode::Select);
		let grabbed = s.node_at_position(x, y).filter(|_| draggable);
		let start = grabbed
			.as_deref()
			.and_then(|id| s.graph()?.node(id))
			.map(|node| (node.x, node.y));
		match (grabbed, start) {
			(Some(id), Some((node_start_x, node_start_y))) => {
				s.drag = DragState {
					active: true,
					moved: false,
					node_id: Some(id),
					start_x: x,
					start_y: y,
					node_start_x,
					node_start_y,
				};
			}
			_ => {
				s.pan = PanState {
					active: true,
					moved: false,
					start_x: x,
					start_y: y,
					transform_start_x: s.transform.x,
					transform_start_y: s.transform.y,
				};
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		let mut guard = state_mm.borrow_mut();
		let Some(s) = guard.as_mut() else {
			return;
		};

		if !s.drag.active {
			s.hover = s.node_at_position(x, y);
		}

		if s.drag.active {
			let (sx, sy) = (x - s.drag.start_x, y - s.drag.start_y);
			s.drag.moved |= sx.hypot(sy) > CLICK_TOLERANCE;
			if !s.drag.moved {
				return;
			}
			let (dx, dy) = (sx / s.transform.k, sy / s.transform.k);
			let (nx, ny) = (
				s.drag.node_start_x + dx.round() as i32,
				s.drag.node_start_y + dy.round() as i32,
			);
			if let Some(id) = s.drag.node_id.clone() {
				if let Some(graph) = s.graph_mut() {
					graph.move_node(&id, nx, ny);
				}
			}
		} else if s.pan.active {
			let (dx, dy) = (x - s.pan.start_x, y - s.pan.start_y);
			s.pan.moved |= dx.hypot(dy) > CLICK_TOLERANCE;
			if s.pan.moved {
				s.transform.x = s.pan.transform_start_x + dx;
				s.transform.y = s.pan.transform_start_y + dy;
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		with_state(&state_mu, panel, |s| {
			let clicked = (s.drag.active && !s.drag.moved) || (s.pan.active && !s.pan.moved);
			s.drag = DragState::default();
			s.pan = PanState::default();
			if clicked {
				click(s, x, y);
			}
		});
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.drag = DragState::default();
			s.pan = PanState::default();
			s.hover = None;
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};

		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (s.transform.k * factor).clamp(0.1, 10.0);
			let ratio = new_k / s.transform.k;
			s.transform.x = x - (x - s.transform.x) * ratio;
			s.transform.y = y - (y - s.transform.y) * ratio;
			s.transform.k = new_k;
		}
	};

	let state_mode = state.clone();
	let set_mode = move |mode: Mode| {
		with_state(&state_mode, panel, |s| {
			if let Some(graph) = s.graph_mut() {
				graph.set_mode(mode);
			}
		});
	};

	let state_tool = state.clone();
	let set_tool = move |tool: EditMode| {
		with_state(&state_tool, panel, |s| {
			if let Some(graph) = s.graph_mut() {
				graph.set_edit_mode(tool);
			}
		});
	};

	let state_slide = state.clone();
	let slide = move |value: f64| {
		with_state(&state_slide, panel, |s| {
			s.slide_to(value);
		});
	};

	let state_speed = state.clone();
	let set_speed = move |speed: f64| {
		with_state(&state_speed, panel, |s| s.timeline.set_play_speed(speed));
	};

	let (state_play, timer_play) = (state.clone(), timer.clone());
	let on_play = move |_: MouseEvent| {
		let mut playing = false;
		let mut resolution = TimelineSettings::default().play_resolution_ms;
		with_state(&state_play, panel, |s| {
			playing = s.timeline.toggle_play();
			resolution = s.timeline.settings().play_resolution_ms;
		});
		stop_timer(&timer_play);
		if !playing {
			return;
		}

		let (state_tick, timer_tick) = (state_play.clone(), timer_play.clone());
		*tick_cb.borrow_mut() = Some(Closure::new(move || {
			let mut finished = false;
			with_state(&state_tick, panel, |s| finished = s.play_tick().is_none());
			if finished {
				stop_timer(&timer_tick);
			}
		}));
		let Some(window) = web_sys::window() else {
			return;
		};
		let tick = tick_cb.borrow();
		let Some(cb) = tick.as_ref() else {
			return;
		};
		match window.set_interval_with_callback_and_timeout_and_arguments_0(
			cb.as_ref().unchecked_ref(),
			resolution,
		) {
			Ok(handle) => *timer_play.borrow_mut() = Some(handle),
			Err(e) => error!("Cannot start playback: {e:?}"),
		}
	};

	let state_import = state.clone();
	let on_import = move |_: MouseEvent| {
		let (raw, label) = (import_text.get_untracked(), import_label.get_untracked());
		with_state(&state_import, panel, |s| match s.import_traversal(&raw, &label) {
			Ok(id) => {
				panel.status.set(format!("Imported traversal as {id}"));
				import_text.set(String::new());
			}
			Err(e) => {
				error!("Traversal import failed: {e}");
				panel.status.set(e.to_string());
			}
		});
	};

	let state_export = state.clone();
	let on_export_json = move |_: MouseEvent| {
		with_state(&state_export, panel, |s| {
			match s.document.export_data().to_json_pretty() {
				Ok(json) => exported.set(json),
				Err(e) => panel.status.set(e.to_string()),
			}
		});
	};

	let state_export_xml = state.clone();
	let on_export_xml = move |_: MouseEvent| {
		with_state(&state_export_xml, panel, |s| {
			exported.set(s.document.export_data().to_xml())
		});
	};

	let slider_max = TimelineSettings::default().slider_max;
	let tools = EditMode::ALL
		.into_iter()
		.map(|tool| {
			let set_tool = set_tool.clone();
			view! {
				<button
					class:active=move || panel.tool.get() == tool
					on:click=move |_| set_tool(tool)
				>
					{tool.as_str().replace('_', " ")}
				</button>
			}
		})
		.collect_view();
	let (set_view, set_edit) = (set_mode.clone(), set_mode);

	view! {
		<div class="chronograph">
			<canvas
				node_ref=canvas_ref
				class="chronograph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>

			<div class="chronograph-toolbar">
				<button
					class:active=move || panel.mode.get() == Mode::View
					on:click=move |_| set_view(Mode::View)
				>
					"View"
				</button>
				<button
					class:active=move || panel.mode.get() == Mode::Edit
					on:click=move |_| set_edit(Mode::Edit)
				>
					"Edit"
				</button>
				<span class="chronograph-tools" class:hidden=move || panel.mode.get() != Mode::Edit>
					{tools}
				</span>
			</div>

			<div class="chronograph-timeline">
				<button on:click=on_play>
					{move || if panel.playing.get() { "Pause" } else { "Play" }}
				</button>
				<input
					type="range"
					min="0"
					max=slider_max.to_string()
					step="any"
					prop:value=move || panel.slider.get().to_string()
					on:input=move |ev| slide(event_target_value(&ev).parse().unwrap_or(0.0))
				/>
				<select on:change=move |ev| {
					set_speed(event_target_value(&ev).parse().unwrap_or(1.0))
				}>
					<option value="0.5">"0.5x"</option>
					<option value="1" selected=true>"1x"</option>
					<option value="2">"2x"</option>
					<option value="4">"4x"</option>
				</select>
				<span class="chronograph-step">
					{move || {
						panel
							.summary
							.get()
							.map(|s| format!("Timestep {} of {}", s.current_step, s.max_steps))
							.unwrap_or_default()
					}}
				</span>
			</div>

			<dl class="chronograph-summary">
				{move || {
					panel
						.summary
						.get()
						.map(|s| {
							view! {
								<dt>"Nodes"</dt>
								<dd>{s.nodes}</dd>
								<dt>"Edges"</dt>
								<dd>{s.edges}</dd>
								<dt>"Agents"</dt>
								<dd>{s.agents}</dd>
							}
						})
				}}
			</dl>

			<div class="chronograph-import">
				<textarea
					placeholder="0,100;1,150;2,300;"
					prop:value=move || import_text.get()
					on:input=move |ev| import_text.set(event_target_value(&ev))
				/>
				<input
					type="text"
					placeholder="Label"
					prop:value=move || import_label.get()
					on:input=move |ev| import_label.set(event_target_value(&ev))
				/>
				<button on:click=on_import>"Import traversal"</button>
			</div>

			<div class="chronograph-export">
				<button on:click=on_export_json>"Export JSON"</button>
				<button on:click=on_export_xml>"Export XML"</button>
				<pre>{move || exported.get()}</pre>
			</div>

			<p class="chronograph-status">{move || panel.status.get()}</p>
		</div>
	}
}
