pub mod backend;
pub mod egl;

use crate::app::UiEvent;
use crate::gfx::math::Vec2;
use log::{debug, info};
use wayland_client::{
    delegate_noop,
    protocol::{
        wl_compositor, wl_keyboard, wl_output, wl_pointer, wl_region, wl_registry, wl_seat,
        wl_surface,
    },
    Connection, Dispatch, QueueHandle, WEnum,
};
use wayland_protocols::wp::pointer_constraints::zv1::client::{
    zwp_locked_pointer_v1, zwp_pointer_constraints_v1,
};
use wayland_protocols::wp::relative_pointer::zv1::client::{
    zwp_relative_pointer_manager_v1, zwp_relative_pointer_v1,
};
use wayland_protocols_wlr::layer_shell::v1::client::{
    zwlr_layer_shell_v1, zwlr_layer_surface_v1,
};

const BTN_LEFT: u32 = 0x110;

/// Axis units the compositor reports for one wheel click.
const AXIS_PER_NOTCH: f64 = 10.0;

/// How pointer motion reaches us while the overlay is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Pointer locked to the surface, deltas from `zwp_relative_pointer_v1`.
    Locked,
    /// Absolute `wl_pointer.motion`, differenced against the last sample.
    Absolute,
}

impl DragMode {
    /// Locking suppresses absolute motion, so it needs relative events to
    /// take its place.
    pub fn select(has_constraints: bool, has_relative_pointer: bool) -> Self {
        if has_constraints && has_relative_pointer {
            DragMode::Locked
        } else {
            DragMode::Absolute
        }
    }
}

/// Turns vertical axis events into whole wheel notches. Positive notches
/// grow the pointer.
#[derive(Debug, Default)]
pub struct WheelNotches {
    continuous: f64,
    discrete_in_frame: bool,
}

impl WheelNotches {
    pub fn discrete(&mut self, steps: i32) -> i32 {
        self.discrete_in_frame = true;
        self.continuous = 0.0;
        -steps
    }

    pub fn continuous(&mut self, value: f64) -> i32 {
        // The discrete event of the same frame already counted this one.
        if self.discrete_in_frame {
            return 0;
        }
        self.continuous += value;
        let notches = (self.continuous / AXIS_PER_NOTCH).trunc();
        self.continuous -= notches * AXIS_PER_NOTCH;
        -(notches as i32)
    }

    pub fn end_frame(&mut self) {
        self.discrete_in_frame = false;
    }
}

/// Protocol objects and the input translated from them, waiting for the
/// scheduler to pick it up.
pub struct WaylandState {
    pub configured: bool,
    pub size: [u32; 2],
    pub compositor: Option<wl_compositor::WlCompositor>,
    pub layer_shell: Option<zwlr_layer_shell_v1::ZwlrLayerShellV1>,
    pub surface: Option<wl_surface::WlSurface>,
    pub layer_surface: Option<zwlr_layer_surface_v1::ZwlrLayerSurfaceV1>,
    pub seat: Option<wl_seat::WlSeat>,
    pub output: Option<wl_output::WlOutput>,
    pub output_size: Option<[u32; 2]>,
    pub pointer: Option<wl_pointer::WlPointer>,
    pub keyboard: Option<wl_keyboard::WlKeyboard>,
    pub relative_manager: Option<zwp_relative_pointer_manager_v1::ZwpRelativePointerManagerV1>,
    pub relative_pointer: Option<zwp_relative_pointer_v1::ZwpRelativePointerV1>,
    pub constraints: Option<zwp_pointer_constraints_v1::ZwpPointerConstraintsV1>,
    pub locked_pointer: Option<zwp_locked_pointer_v1::ZwpLockedPointerV1>,
    pub enter_serial: Option<u32>,
    pub cursor_hidden: bool,
    pub surface_pos: Option<Vec2>,
    pub wheel: WheelNotches,
    pub pending_events: Vec<UiEvent>,
}

impl WaylandState {
    pub fn new() -> Self {
        Self {
            configured: false,
            size: [0, 0],
            compositor: None,
            layer_shell: None,
            surface: None,
            layer_surface: None,
            seat: None,
            output: None,
            output_size: None,
            pointer: None,
            keyboard: None,
            relative_manager: None,
            relative_pointer: None,
            constraints: None,
            locked_pointer: None,
            enter_serial: None,
            cursor_hidden: false,
            surface_pos: None,
            wheel: WheelNotches::default(),
            pending_events: Vec::new(),
        }
    }

    pub fn drag_mode(&self) -> DragMode {
        DragMode::select(
            self.constraints.is_some() && self.pointer.is_some(),
            self.relative_pointer.is_some(),
        )
    }

    fn push_notches(&mut self, notches: i32) {
        let delta = notches.signum() as f32;
        for _ in 0..notches.unsigned_abs() {
            self.pending_events.push(UiEvent::Scroll { delta });
        }
    }

    /// Hides the cursor glyph if we currently hold pointer focus.
    pub fn apply_cursor(&self) {
        if !self.cursor_hidden {
            return;
        }
        if let (Some(pointer), Some(serial)) = (&self.pointer, self.enter_serial) {
            pointer.set_cursor(serial, None, 0, 0);
        }
    }

    fn bind_relative_pointer(&mut self, qh: &QueueHandle<Self>) {
        if self.relative_pointer.is_some() {
            return;
        }
        if let (Some(manager), Some(pointer)) = (&self.relative_manager, &self.pointer) {
            self.relative_pointer = Some(manager.get_relative_pointer(pointer, qh, ()));
            debug!("Bound relative pointer");
        }
    }
}

impl Default for WaylandState {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatch<wl_registry::WlRegistry, ()> for WaylandState {
    fn event(
        state: &mut Self,
        registry: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_registry::Event::Global {
            name,
            interface,
            version,
        } = event
        {
            match &interface[..] {
                "wl_compositor" => {
                    state.compositor = Some(registry.bind(name, version.min(4), qh, ()));
                }
                "zwlr_layer_shell_v1" => {
                    state.layer_shell = Some(registry.bind(name, version.min(4), qh, ()));
                }
                "wl_seat" => {
                    state.seat = Some(registry.bind(name, version.min(5), qh, ()));
                }
                "wl_output" if state.output.is_none() => {
                    state.output = Some(registry.bind(name, version.min(2), qh, ()));
                }
                "zwp_relative_pointer_manager_v1" => {
                    state.relative_manager = Some(registry.bind(name, 1, qh, ()));
                    state.bind_relative_pointer(qh);
                }
                "zwp_pointer_constraints_v1" => {
                    state.constraints = Some(registry.bind(name, 1, qh, ()));
                }
                _ => {}
            }
        }
    }
}

impl Dispatch<wl_pointer::WlPointer, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &wl_pointer::WlPointer,
        event: wl_pointer::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            wl_pointer::Event::Enter {
                serial,
                surface_x,
                surface_y,
                ..
            } => {
                state.enter_serial = Some(serial);
                state.surface_pos = Some(Vec2::new(surface_x as f32, surface_y as f32));
                state.apply_cursor();
            }
            wl_pointer::Event::Leave { .. } => {
                state.enter_serial = None;
                state.surface_pos = None;
            }
            wl_pointer::Event::Motion {
                surface_x,
                surface_y,
                ..
            } => {
                let pos = Vec2::new(surface_x as f32, surface_y as f32);
                // Relative events already carry the movement.
                if state.relative_pointer.is_none() {
                    if let Some(last) = state.surface_pos {
                        state
                            .pending_events
                            .push(UiEvent::PointerMotion { delta: pos - last });
                    }
                }
                state.surface_pos = Some(pos);
            }
            wl_pointer::Event::Button {
                button: BTN_LEFT,
                state: btn_state,
                ..
            } => {
                let ev = match btn_state {
                    WEnum::Value(wl_pointer::ButtonState::Pressed) => UiEvent::PointerDown,
                    WEnum::Value(wl_pointer::ButtonState::Released) => UiEvent::PointerUp,
                    _ => return,
                };
                state.pending_events.push(ev);
            }
            wl_pointer::Event::AxisDiscrete {
                axis: WEnum::Value(wl_pointer::Axis::VerticalScroll),
                discrete,
            } => {
                let notches = state.wheel.discrete(discrete);
                state.push_notches(notches);
            }
            wl_pointer::Event::Axis {
                axis: WEnum::Value(wl_pointer::Axis::VerticalScroll),
                value,
                ..
            } => {
                let notches = state.wheel.continuous(value);
                state.push_notches(notches);
            }
            wl_pointer::Event::Frame => state.wheel.end_frame(),
            _ => {}
        }
    }
}

impl Dispatch<zwp_relative_pointer_v1::ZwpRelativePointerV1, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &zwp_relative_pointer_v1::ZwpRelativePointerV1,
        event: zwp_relative_pointer_v1::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let zwp_relative_pointer_v1::Event::RelativeMotion { dx, dy, .. } = event {
            state.pending_events.push(UiEvent::PointerMotion {
                delta: Vec2::new(dx as f32, dy as f32),
            });
        }
    }
}

impl Dispatch<zwp_locked_pointer_v1::ZwpLockedPointerV1, ()> for WaylandState {
    fn event(
        _: &mut Self,
        _: &zwp_locked_pointer_v1::ZwpLockedPointerV1,
        event: zwp_locked_pointer_v1::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            zwp_locked_pointer_v1::Event::Locked => debug!("Pointer locked"),
            zwp_locked_pointer_v1::Event::Unlocked => debug!("Pointer unlocked"),
            _ => {}
        }
    }
}

impl Dispatch<wl_seat::WlSeat, ()> for WaylandState {
    fn event(
        state: &mut Self,
        seat: &wl_seat::WlSeat,
        event: wl_seat::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_seat::Event::Capabilities {
            capabilities: WEnum::Value(caps),
        } = event
        {
            if caps.contains(wl_seat::Capability::Pointer) && state.pointer.is_none() {
                state.pointer = Some(seat.get_pointer(qh, ()));
                state.bind_relative_pointer(qh);
            }
            if caps.contains(wl_seat::Capability::Keyboard) && state.keyboard.is_none() {
                state.keyboard = Some(seat.get_keyboard(qh, ()));
            }
        }
    }
}

impl Dispatch<wl_keyboard::WlKeyboard, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &wl_keyboard::WlKeyboard,
        event: wl_keyboard::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        // Raw evdev codes are enough for the one key we care about.
        if let wl_keyboard::Event::Key {
            key,
            state: WEnum::Value(wl_keyboard::KeyState::Pressed),
            ..
        } = event
        {
            state.pending_events.push(UiEvent::Key(key));
        }
    }
}

impl Dispatch<wl_output::WlOutput, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &wl_output::WlOutput,
        event: wl_output::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let wl_output::Event::Mode { width, height, .. } = event {
            state.output_size = Some([width as u32, height as u32]);
        }
    }
}

impl Dispatch<zwlr_layer_surface_v1::ZwlrLayerSurfaceV1, ()> for WaylandState {
    fn event(
        state: &mut Self,
        surface: &zwlr_layer_surface_v1::ZwlrLayerSurfaceV1,
        event: zwlr_layer_surface_v1::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            zwlr_layer_surface_v1::Event::Configure {
                serial,
                width,
                height,
            } => {
                debug!("Layer surface configured: {}x{} (serial {})", width, height, serial);
                surface.ack_configure(serial);
                state.configured = true;

                if width > 0 && height > 0 && [width, height] != state.size {
                    state.size = [width, height];
                    state.pending_events.push(UiEvent::Resize { width, height });
                }
            }
            zwlr_layer_surface_v1::Event::Closed => {
                info!("Layer surface closed by compositor");
                state.pending_events.push(UiEvent::Destroy);
            }
            _ => {}
        }
    }
}

delegate_noop!(WaylandState: ignore wl_compositor::WlCompositor);
delegate_noop!(WaylandState: ignore wl_surface::WlSurface);
delegate_noop!(WaylandState: ignore wl_region::WlRegion);
delegate_noop!(WaylandState: ignore zwlr_layer_shell_v1::ZwlrLayerShellV1);
delegate_noop!(WaylandState: ignore zwp_relative_pointer_manager_v1::ZwpRelativePointerManagerV1);
delegate_noop!(WaylandState: ignore zwp_pointer_constraints_v1::ZwpPointerConstraintsV1);
