//! Test doubles for the windowing, audio and timing collaborators.

use crate::app::{UiEvent, VisibilitySink};
use crate::audio::AudioCue;
use crate::gfx::{
    anim::{linear, Tweener},
    math::Mat3x2,
    sprite::Sprite,
    surface::{Bitmap, RenderSurface},
};
use crate::pointer::Pointer;
use crate::scheduler::{EventSource, Wait};
use crate::timer::TickSource;
use anyhow::Result;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct ManualTicks {
    frequency: u64,
    now: Rc<Cell<u64>>,
}

impl ManualTicks {
    pub fn new(frequency: u64) -> Self {
        Self {
            frequency,
            now: Rc::new(Cell::new(0)),
        }
    }

    pub fn advance(&self, ticks: u64) {
        self.now.set(self.now.get() + ticks);
    }
}

impl TickSource for ManualTicks {
    fn frequency(&self) -> u64 {
        self.frequency
    }

    fn now(&self) -> u64 {
        self.now.get()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    BeginFrame,
    Clear,
    SetTransform(Mat3x2),
    DrawBitmap(u32),
    EndFrame,
    Flush,
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<SurfaceCall>,
    current: Mat3x2,
}

impl RecordingSurface {
    pub fn with_transform(current: Mat3x2) -> Self {
        Self {
            calls: Vec::new(),
            current,
        }
    }

    pub fn frames(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == SurfaceCall::EndFrame)
            .count()
    }
}

impl RenderSurface for RecordingSurface {
    fn begin_frame(&mut self) {
        self.calls.push(SurfaceCall::BeginFrame);
    }

    fn clear(&mut self) {
        self.calls.push(SurfaceCall::Clear);
    }

    fn transform(&self) -> Mat3x2 {
        self.current
    }

    fn set_transform(&mut self, transform: Mat3x2) {
        self.current = transform;
        self.calls.push(SurfaceCall::SetTransform(transform));
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap) {
        self.calls.push(SurfaceCall::DrawBitmap(bitmap.id));
    }

    fn end_frame(&mut self) -> Result<()> {
        self.calls.push(SurfaceCall::EndFrame);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.calls.push(SurfaceCall::Flush);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCall {
    Show,
    Hide,
    CursorHidden(bool),
    Recenter,
}

#[derive(Debug, Default)]
pub struct RecordingShell {
    pub calls: Vec<ShellCall>,
    pub surface: RecordingSurface,
}

impl VisibilitySink for RecordingShell {
    fn show(&mut self) {
        self.calls.push(ShellCall::Show);
    }

    fn hide(&mut self) {
        self.calls.push(ShellCall::Hide);
    }

    fn set_cursor_hidden(&mut self, hidden: bool) {
        self.calls.push(ShellCall::CursorHidden(hidden));
    }

    fn recenter_cursor(&mut self) {
        self.calls.push(ShellCall::Recenter);
    }
}

impl RenderSurface for RecordingShell {
    fn begin_frame(&mut self) {
        self.surface.begin_frame();
    }

    fn clear(&mut self) {
        self.surface.clear();
    }

    fn transform(&self) -> Mat3x2 {
        self.surface.transform()
    }

    fn set_transform(&mut self, transform: Mat3x2) {
        self.surface.set_transform(transform);
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap) {
        self.surface.draw_bitmap(bitmap);
    }

    fn end_frame(&mut self) -> Result<()> {
        self.surface.end_frame()
    }

    fn flush(&mut self) -> Result<()> {
        self.surface.flush()
    }
}

#[derive(Debug, Default)]
struct CueState {
    plays: usize,
    stops: usize,
    playing: bool,
    looping: bool,
}

/// Shared view of what a `RecordingCue` was asked to do.
#[derive(Debug, Clone, Default)]
pub struct CueLog(Rc<RefCell<CueState>>);

impl CueLog {
    pub fn cue(&self) -> RecordingCue {
        RecordingCue(self.clone())
    }

    pub fn plays(&self) -> usize {
        self.0.borrow().plays
    }

    pub fn stops(&self) -> usize {
        self.0.borrow().stops
    }

    pub fn playing(&self) -> bool {
        self.0.borrow().playing
    }

    pub fn looping(&self) -> bool {
        self.0.borrow().looping
    }
}

pub struct RecordingCue(CueLog);

impl AudioCue for RecordingCue {
    fn play(&mut self) {
        let mut state = (self.0).0.borrow_mut();
        if !state.playing {
            state.plays += 1;
            state.playing = true;
        }
    }

    fn stop(&mut self) {
        let mut state = (self.0).0.borrow_mut();
        state.stops += 1;
        state.playing = false;
    }

    fn set_looping(&mut self, looping: bool) {
        (self.0).0.borrow_mut().looping = looping;
    }

    fn is_playing(&mut self) -> bool {
        self.0.playing()
    }
}

/// A 100x200 pointer with a linear 0.25 s swing from -45 to 0 degrees.
pub fn test_pointer(scale: f32) -> Pointer {
    let sprite = Sprite::new(Bitmap {
        id: 1,
        width: 100,
        height: 200,
    });
    let tweener = Tweener::new(0.25, -45.0, 0.0).with_easing(Box::new(linear));
    Pointer::new(
        sprite,
        tweener,
        Box::new(CueLog::default().cue()),
        Box::new(CueLog::default().cue()),
        scale,
        0.05,
    )
}

#[derive(Debug, Clone)]
pub enum Step {
    /// Simulated wall-clock time passing with no input.
    Elapse(u64),
    Event(UiEvent),
}

/// Replays a fixed script. Blocking waits skip ahead through elapsed time
/// to the next event; non-blocking waits consume one `Elapse` step and
/// report nothing pending. An exhausted script reports `Destroy`.
pub struct ScriptedBackend {
    pub shell: RecordingShell,
    pub waits: Vec<Wait>,
    ticks: ManualTicks,
    script: VecDeque<Step>,
}

impl ScriptedBackend {
    pub fn new(ticks: ManualTicks, script: Vec<Step>) -> Self {
        Self {
            shell: RecordingShell::default(),
            waits: Vec::new(),
            ticks,
            script: script.into(),
        }
    }
}

impl EventSource for ScriptedBackend {
    fn next_event(&mut self, wait: Wait) -> Result<Option<UiEvent>> {
        self.waits.push(wait);
        loop {
            match self.script.pop_front() {
                None => return Ok(Some(UiEvent::Destroy)),
                Some(Step::Event(event)) => return Ok(Some(event)),
                Some(Step::Elapse(ticks)) => {
                    self.ticks.advance(ticks);
                    if wait != Wait::Forever {
                        return Ok(None);
                    }
                }
            }
        }
    }
}

impl VisibilitySink for ScriptedBackend {
    fn show(&mut self) {
        self.shell.show();
    }

    fn hide(&mut self) {
        self.shell.hide();
    }

    fn set_cursor_hidden(&mut self, hidden: bool) {
        self.shell.set_cursor_hidden(hidden);
    }

    fn recenter_cursor(&mut self) {
        self.shell.recenter_cursor();
    }
}

impl RenderSurface for ScriptedBackend {
    fn begin_frame(&mut self) {
        self.shell.begin_frame();
    }

    fn clear(&mut self) {
        self.shell.clear();
    }

    fn transform(&self) -> Mat3x2 {
        self.shell.transform()
    }

    fn set_transform(&mut self, transform: Mat3x2) {
        self.shell.set_transform(transform);
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap) {
        self.shell.draw_bitmap(bitmap);
    }

    fn end_frame(&mut self) -> Result<()> {
        self.shell.end_frame()
    }

    fn flush(&mut self) -> Result<()> {
        self.shell.flush()
    }
}
