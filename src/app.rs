use crate::gfx::{
    math::{Size, Vec2},
    surface::RenderSurface,
};
use crate::pointer::Pointer;
use anyhow::Result;
use log::{debug, info};

/// evdev code for the Escape key.
pub const KEY_ESC: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Show,
    Exit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    PointerDown,
    PointerUp,
    /// Relative pointer movement since the previous sample.
    PointerMotion { delta: Vec2 },
    Scroll { delta: f32 },
    Key(u32),
    Hotkey,
    Menu(MenuCommand),
    Resize { width: u32, height: u32 },
    Destroy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

/// Window-side effects of the overlay's visibility and cursor handling.
pub trait VisibilitySink {
    fn show(&mut self);
    fn hide(&mut self);
    fn set_cursor_hidden(&mut self, hidden: bool);
    /// Puts the system cursor back at the reference point motion deltas
    /// are measured from.
    fn recenter_cursor(&mut self);
}

/// Session state of the overlay: routes input to the pointer and owns the
/// single visibility flag the scheduler keys off.
pub struct App {
    pub pointer: Pointer,
    visible: bool,
    bounds: Size,
}

impl App {
    pub fn new(mut pointer: Pointer, bounds: Size) -> Self {
        pointer.center_in(bounds);
        Self {
            pointer,
            visible: false,
            bounds,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn handle_event<S>(&mut self, event: UiEvent, shell: &mut S) -> Result<Control>
    where
        S: VisibilitySink + RenderSurface + ?Sized,
    {
        match event {
            UiEvent::PointerDown => self.pointer.press(),
            UiEvent::PointerUp => self.pointer.release(),
            UiEvent::PointerMotion { delta } => {
                self.pointer.move_by(delta, self.bounds);
                shell.recenter_cursor();
                shell.set_cursor_hidden(true);
            }
            UiEvent::Scroll { delta } => self.pointer.scroll(delta),
            UiEvent::Key(KEY_ESC) if self.visible => self.toggle_visibility(shell)?,
            UiEvent::Key(key) => debug!("Ignoring key {}", key),
            UiEvent::Hotkey | UiEvent::Menu(MenuCommand::Show) => self.toggle_visibility(shell)?,
            UiEvent::Menu(MenuCommand::Exit) | UiEvent::Destroy => {
                info!("Shutting down");
                self.pointer.silence();
                return Ok(Control::Exit);
            }
            UiEvent::Resize { width, height } => {
                self.bounds = Size::new(width as f32, height as f32);
                debug!("Overlay bounds {}x{}", width, height);
            }
        }
        Ok(Control::Continue)
    }

    pub fn toggle_visibility<S>(&mut self, shell: &mut S) -> Result<()>
    where
        S: VisibilitySink + RenderSurface + ?Sized,
    {
        self.visible = !self.visible;

        if self.visible {
            shell.show();
            shell.set_cursor_hidden(true);
            info!("Overlay shown");
        } else {
            if self.pointer.is_pressed() {
                self.pointer.release();
            }
            self.pointer.silence();
            shell.hide();
            shell.flush()?;
            info!("Overlay hidden");
        }
        Ok(())
    }

    pub fn update(&mut self, delta: f32) {
        self.pointer.update(delta);
    }

    pub fn render<R: RenderSurface + ?Sized>(&self, surface: &mut R) -> Result<()> {
        surface.begin_frame();
        surface.clear();
        self.pointer.draw(surface);
        surface.end_frame()
    }
}
