use super::egl::EglContext;
use super::{DragMode, WaylandState};
use crate::app::{MenuCommand, UiEvent, VisibilitySink};
use crate::gfx::{
    bitmap::Pixels,
    draw::DrawContext,
    gl::load_sprite_program,
    math::{Mat3x2, Size},
    surface::{Bitmap, RenderSurface},
};
use crate::scheduler::{EventSource, Wait};
use anyhow::{anyhow, bail, Context, Result};
use calloop::{
    generic::Generic,
    signals::{Signal, Signals},
    EventLoop, Interest, Mode, PostAction,
};
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;
use wayland_client::{backend::WaylandError, Connection, EventQueue, Proxy, QueueHandle};
use wayland_protocols::wp::pointer_constraints::zv1::client::zwp_pointer_constraints_v1;
use wayland_protocols_wlr::layer_shell::v1::client::{
    zwlr_layer_shell_v1, zwlr_layer_surface_v1,
};

/// What the calloop sources report back for one dispatch.
#[derive(Default)]
struct Wakeup {
    wayland_readable: bool,
    signals: Vec<Signal>,
}

/// Full-screen transparent overlay on the wlr layer shell. The surface is
/// created once and stays mapped; hiding only drops its input region and
/// keyboard focus and presents an empty frame.
pub struct WaylandBackend {
    conn: Connection,
    event_queue: EventQueue<WaylandState>,
    qh: QueueHandle<WaylandState>,
    state: WaylandState,
    event_loop: EventLoop<'static, Wakeup>,
    wakeup: Wakeup,
    queued: VecDeque<UiEvent>,
    // Declared before `egl`: GL objects must be deleted while the context
    // still exists.
    draw: DrawContext,
    egl: EglContext,
    buffer_size: [u32; 2],
}

impl WaylandBackend {
    pub fn connect(shaders_dir: &Path) -> Result<Self> {
        let conn = Connection::connect_to_env().context("Connecting to Wayland")?;
        let display = conn.display();

        let mut event_queue = conn.new_event_queue();
        let qh = event_queue.handle();
        let _registry = display.get_registry(&qh, ());

        let mut state = WaylandState::new();
        event_queue.roundtrip(&mut state)?;
        // Seat capabilities arrive after the bind.
        event_queue.roundtrip(&mut state)?;

        let compositor = state
            .compositor
            .clone()
            .ok_or_else(|| anyhow!("Compositor does not offer wl_compositor"))?;
        let layer_shell = state
            .layer_shell
            .clone()
            .ok_or_else(|| anyhow!("Compositor does not offer zwlr_layer_shell_v1"))?;
        if state.pointer.is_none() {
            warn!("No pointer on this seat; the overlay will not follow mouse input");
        } else {
            info!("Drag mode: {:?}", state.drag_mode());
        }

        let surface = compositor.create_surface(&qh, ());
        let layer_surface = layer_shell.get_layer_surface(
            &surface,
            state.output.as_ref(),
            zwlr_layer_shell_v1::Layer::Overlay,
            "fingerpoint".to_string(),
            &qh,
            (),
        );
        layer_surface.set_anchor(
            zwlr_layer_surface_v1::Anchor::Top
                | zwlr_layer_surface_v1::Anchor::Bottom
                | zwlr_layer_surface_v1::Anchor::Left
                | zwlr_layer_surface_v1::Anchor::Right,
        );
        layer_surface.set_exclusive_zone(-1);
        layer_surface.set_size(0, 0);
        layer_surface.set_keyboard_interactivity(
            zwlr_layer_surface_v1::KeyboardInteractivity::None,
        );

        // Start hidden: clicks pass straight through.
        let empty = compositor.create_region(&qh, ());
        surface.set_input_region(Some(&empty));
        empty.destroy();
        surface.commit();

        state.surface = Some(surface.clone());
        state.layer_surface = Some(layer_surface);

        while !state.configured {
            event_queue.blocking_dispatch(&mut state)?;
        }

        let buffer_size = match (state.size, state.output_size) {
            ([w, h], _) if w > 0 && h > 0 => [w, h],
            (_, Some(output)) => output,
            _ => bail!("Compositor configured the overlay with no size"),
        };
        info!("Overlay surface {}x{}", buffer_size[0], buffer_size[1]);

        let mut egl = EglContext::new(display.id().as_ptr() as *mut _)?;
        egl.create_surface(&surface, buffer_size[0] as i32, buffer_size[1] as i32)?;

        let gl = unsafe { glow::Context::from_loader_function(|s| egl.get_proc_address(s)) };
        let program = load_sprite_program(&gl, shaders_dir)?;
        let draw = DrawContext::new(gl, program)?;

        let event_loop: EventLoop<'static, Wakeup> =
            EventLoop::try_new().context("Creating event loop")?;
        let handle = event_loop.handle();

        let fd = conn
            .backend()
            .poll_fd()
            .try_clone_to_owned()
            .context("Duplicating Wayland socket")?;
        handle
            .insert_source(
                Generic::new(fd, Interest::READ, Mode::Level),
                |_, _, wakeup: &mut Wakeup| {
                    wakeup.wayland_readable = true;
                    Ok(PostAction::Continue)
                },
            )
            .map_err(|e| anyhow!("Failed to watch Wayland socket: {}", e.error))?;

        let signals = Signals::new(&[Signal::SIGUSR1, Signal::SIGINT, Signal::SIGTERM])?;
        handle
            .insert_source(signals, |event, _, wakeup: &mut Wakeup| {
                wakeup.signals.push(event.signal());
            })
            .map_err(|e| anyhow!("Failed to watch signals: {}", e.error))?;

        let mut backend = Self {
            conn,
            event_queue,
            qh,
            state,
            event_loop,
            wakeup: Wakeup::default(),
            queued: VecDeque::new(),
            draw,
            egl,
            buffer_size,
        };

        // The initial configure is already reflected in buffer_size.
        backend
            .state
            .pending_events
            .retain(|e| !matches!(e, UiEvent::Resize { .. }));
        backend.flush()?;
        Ok(backend)
    }

    pub fn size(&self) -> Size {
        Size::new(self.buffer_size[0] as f32, self.buffer_size[1] as f32)
    }

    pub fn upload(&mut self, pixels: &Pixels) -> Result<Bitmap> {
        self.egl.make_current()?;
        self.draw.upload(pixels)
    }

    /// Reads and dispatches whatever the compositor and the signal handlers
    /// have for us, blocking for at most `timeout` (`None` = indefinitely).
    fn pump(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.event_queue.dispatch_pending(&mut self.state)?;
        self.event_queue.flush()?;

        let timeout = if self.state.pending_events.is_empty() {
            timeout
        } else {
            Some(Duration::ZERO)
        };

        // None means events were queued meanwhile; dispatch those first.
        if let Some(guard) = self.event_queue.prepare_read() {
            self.event_loop
                .dispatch(timeout, &mut self.wakeup)
                .context("Waiting for events")?;

            if self.wakeup.wayland_readable {
                match guard.read() {
                    Ok(_) => {}
                    Err(WaylandError::Io(e)) if e.kind() == ErrorKind::WouldBlock => {}
                    Err(e) => return Err(e).context("Reading from the compositor"),
                }
            }
            self.wakeup.wayland_readable = false;
        }

        self.event_queue.dispatch_pending(&mut self.state)?;

        for signal in self.wakeup.signals.drain(..) {
            let event = match signal {
                Signal::SIGUSR1 => UiEvent::Hotkey,
                _ => UiEvent::Menu(MenuCommand::Exit),
            };
            debug!("Signal {:?} -> {:?}", signal, event);
            self.queued.push_back(event);
        }

        for event in self.state.pending_events.drain(..) {
            if let UiEvent::Resize { width, height } = event {
                self.buffer_size = [width, height];
                self.egl.resize(width as i32, height as i32);
            }
            self.queued.push_back(event);
        }
        Ok(())
    }

    fn commit(&self) {
        if let Some(surface) = &self.state.surface {
            surface.commit();
        }
    }
}

impl Drop for WaylandBackend {
    fn drop(&mut self) {
        // Fields drop after this; `draw` needs the context current.
        if let Err(e) = self.egl.make_current() {
            warn!("Failed to make EGL context current for teardown: {}", e);
        }
    }
}

impl EventSource for WaylandBackend {
    fn next_event(&mut self, wait: Wait) -> Result<Option<UiEvent>> {
        loop {
            if let Some(event) = self.queued.pop_front() {
                return Ok(Some(event));
            }

            let timeout = match wait {
                Wait::Forever => None,
                Wait::Poll => Some(Duration::ZERO),
                Wait::Timeout(d) => Some(d),
            };
            self.pump(timeout)?;

            if let Some(event) = self.queued.pop_front() {
                return Ok(Some(event));
            }
            if wait != Wait::Forever {
                return Ok(None);
            }
        }
    }
}

impl VisibilitySink for WaylandBackend {
    fn show(&mut self) {
        if let Some(layer_surface) = &self.state.layer_surface {
            layer_surface.set_keyboard_interactivity(
                zwlr_layer_surface_v1::KeyboardInteractivity::Exclusive,
            );
        }
        if let Some(surface) = &self.state.surface {
            surface.set_input_region(None);
        }
        if self.state.locked_pointer.is_none() && self.state.drag_mode() == DragMode::Locked {
            self.state.locked_pointer = match (
                &self.state.constraints,
                &self.state.pointer,
                &self.state.surface,
            ) {
                (Some(constraints), Some(pointer), Some(surface)) => Some(constraints.lock_pointer(
                    surface,
                    pointer,
                    None,
                    zwp_pointer_constraints_v1::Lifetime::Persistent,
                    &self.qh,
                    (),
                )),
                _ => None,
            };
        }
        self.commit();
        debug!("Overlay accepts input");
    }

    fn hide(&mut self) {
        if let Some(locked) = self.state.locked_pointer.take() {
            locked.destroy();
        }
        if let Some(layer_surface) = &self.state.layer_surface {
            layer_surface.set_keyboard_interactivity(
                zwlr_layer_surface_v1::KeyboardInteractivity::None,
            );
        }
        if let (Some(compositor), Some(surface)) = (&self.state.compositor, &self.state.surface) {
            let empty = compositor.create_region(&self.qh, ());
            surface.set_input_region(Some(&empty));
            empty.destroy();
        }
        self.commit();
        debug!("Overlay passes input through");
    }

    fn set_cursor_hidden(&mut self, hidden: bool) {
        if self.state.cursor_hidden != hidden {
            self.state.cursor_hidden = hidden;
            self.state.apply_cursor();
        }
    }

    fn recenter_cursor(&mut self) {
        // Only meaningful while locked; the hint takes effect on unlock.
        if let Some(locked) = &self.state.locked_pointer {
            let size = self.size();
            locked.set_cursor_position_hint(size.width as f64 / 2.0, size.height as f64 / 2.0);
        }
    }
}

impl RenderSurface for WaylandBackend {
    fn begin_frame(&mut self) {
        if let Err(e) = self.egl.make_current() {
            warn!("Failed to make EGL context current: {}", e);
        }
        self.draw
            .begin([self.buffer_size[0] as f32, self.buffer_size[1] as f32]);
    }

    fn clear(&mut self) {
        self.draw.clear();
    }

    fn transform(&self) -> Mat3x2 {
        self.draw.transform()
    }

    fn set_transform(&mut self, transform: Mat3x2) {
        self.draw.set_transform(transform);
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap) {
        self.draw.draw_bitmap(bitmap);
    }

    fn end_frame(&mut self) -> Result<()> {
        self.draw.flush();
        self.egl.swap_buffers().context("Presenting frame")?;
        self.conn.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // Present an empty frame so nothing stale stays on screen.
        self.begin_frame();
        self.draw.clear();
        self.end_frame()
    }
}
