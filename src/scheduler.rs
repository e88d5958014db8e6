use crate::app::{App, Control, UiEvent, VisibilitySink};
use crate::gfx::surface::RenderSurface;
use crate::timer::{Clock, TickSource};
use anyhow::Result;
use log::{debug, info};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// Block until an event arrives.
    Forever,
    /// Return immediately if nothing is pending.
    Poll,
    /// Block for at most this long.
    Timeout(Duration),
}

pub trait EventSource {
    /// Next input event, or `None` if none arrived within `wait`. With
    /// `Wait::Forever`, `None` means the source has closed.
    fn next_event(&mut self, wait: Wait) -> Result<Option<UiEvent>>;
}

/// Everything the scheduler needs from the windowing side.
pub trait Backend: EventSource + VisibilitySink + RenderSurface {}

impl<T: EventSource + VisibilitySink + RenderSurface> Backend for T {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Hidden: sleep on the event source, never update or render.
    Idle,
    /// Shown: drain pending events, otherwise tick, update and render.
    Active,
    Shutdown,
}

pub struct Scheduler<S: TickSource> {
    clock: Clock<S>,
    frame_budget: Option<Duration>,
    /// False until the first frame after activation, which is never held
    /// back by the frame budget.
    pacing: bool,
    phase: Phase,
    frames: u64,
}

impl<S: TickSource> Scheduler<S> {
    /// `fps_cap` of zero leaves active rendering unthrottled.
    pub fn new(clock: Clock<S>, fps_cap: u32) -> Self {
        let frame_budget = (fps_cap > 0).then(|| Duration::from_secs(1) / fps_cap);
        Self {
            clock,
            frame_budget,
            pacing: false,
            phase: Phase::Idle,
            frames: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn run<B: Backend + ?Sized>(&mut self, app: &mut App, backend: &mut B) -> Result<()> {
        self.pacing = false;
        self.phase = if app.is_visible() {
            self.clock.reset();
            Phase::Active
        } else {
            Phase::Idle
        };
        info!("Scheduler starting in {:?}", self.phase);

        while self.phase != Phase::Shutdown {
            self.step(app, backend)?;
        }

        info!("Scheduler stopped after {} frames", self.frames);
        Ok(())
    }

    pub fn step<B: Backend + ?Sized>(&mut self, app: &mut App, backend: &mut B) -> Result<()> {
        match self.phase {
            Phase::Idle => match backend.next_event(Wait::Forever)? {
                Some(event) => self.dispatch(app, backend, event)?,
                None => {
                    info!("Event source closed");
                    self.phase = Phase::Shutdown;
                }
            },
            Phase::Active => {
                if let Some(event) = backend.next_event(Wait::Poll)? {
                    return self.dispatch(app, backend, event);
                }

                // Keep handling input until the next frame is due.
                if let Some(remaining) = self.until_next_frame() {
                    if let Some(event) = backend.next_event(Wait::Timeout(remaining))? {
                        self.dispatch(app, backend, event)?;
                    }
                    return Ok(());
                }

                self.frame(app, backend)?;
            }
            Phase::Shutdown => {}
        }
        Ok(())
    }

    fn dispatch<B: Backend + ?Sized>(
        &mut self,
        app: &mut App,
        backend: &mut B,
        event: UiEvent,
    ) -> Result<()> {
        debug!("Dispatching {:?}", event);
        let was_visible = app.is_visible();

        if app.handle_event(event, backend)? == Control::Exit {
            self.phase = Phase::Shutdown;
            return Ok(());
        }

        match (was_visible, app.is_visible()) {
            (false, true) => {
                self.clock.reset();
                self.pacing = false;
                self.phase = Phase::Active;
                debug!("Idle -> Active");
            }
            (true, false) => {
                self.phase = Phase::Idle;
                debug!("Active -> Idle");
            }
            _ => {}
        }
        Ok(())
    }

    fn until_next_frame(&self) -> Option<Duration> {
        if !self.pacing {
            return None;
        }
        let budget = self.frame_budget?;
        let spent = Duration::from_secs_f32(self.clock.since_last());
        budget.checked_sub(spent).filter(|remaining| !remaining.is_zero())
    }

    fn frame<B: Backend + ?Sized>(&mut self, app: &mut App, backend: &mut B) -> Result<()> {
        self.clock.tick();
        app.update(self.clock.delta());
        app.render(backend)?;
        self.frames += 1;
        self.pacing = true;
        Ok(())
    }
}
