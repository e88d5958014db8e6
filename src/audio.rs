use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

pub trait AudioCue {
    /// Starts playback; does nothing if already playing. A looping cue whose
    /// clip has run out starts over.
    fn play(&mut self);
    fn stop(&mut self);
    fn set_looping(&mut self, looping: bool);
    /// A looping cue counts as playing from `play` until `stop`.
    fn is_playing(&mut self) -> bool;
}

/// Plays a sound file through an external player command (`paplay`,
/// `pw-play`, `aplay`, ...). Looping restarts the player on the next `play`
/// after the clip ends.
pub struct ProcessCue {
    player: String,
    path: PathBuf,
    looping: bool,
    active: bool,
    broken: bool,
    child: Option<Child>,
}

impl ProcessCue {
    pub fn new(player: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            player: player.into(),
            path: path.into(),
            looping: false,
            active: false,
            broken: false,
            child: None,
        }
    }

    fn spawn(&mut self) {
        if self.broken {
            return;
        }

        match Command::new(&self.player)
            .arg(&self.path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => {
                debug!("Playing {} (pid {})", self.path.display(), child.id());
                self.child = Some(child);
            }
            Err(e) => {
                warn!(
                    "Could not run audio player '{}' for {}: {}; cue disabled",
                    self.player,
                    self.path.display(),
                    e
                );
                self.broken = true;
            }
        }
    }

    fn child_running(&mut self) -> bool {
        match self.child.as_mut().map(|child| child.try_wait()) {
            Some(Ok(None)) => true,
            Some(Ok(Some(_))) | Some(Err(_)) => {
                self.child = None;
                false
            }
            None => false,
        }
    }
}

impl AudioCue for ProcessCue {
    fn play(&mut self) {
        self.active = true;
        if !self.child_running() {
            self.spawn();
        }
    }

    fn stop(&mut self) {
        self.active = false;
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn is_playing(&mut self) -> bool {
        let running = self.child_running();
        running || (self.active && self.looping && !self.broken)
    }
}

impl Drop for ProcessCue {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Stand-in for a cue whose sound could not be found.
#[derive(Debug, Default)]
pub struct SilentCue;

impl AudioCue for SilentCue {
    fn play(&mut self) {}

    fn stop(&mut self) {}

    fn set_looping(&mut self, _looping: bool) {}

    fn is_playing(&mut self) -> bool {
        false
    }
}

/// Missing or unconfigured sounds degrade to silence instead of failing
/// startup.
pub fn load_cue(player: &str, path: Option<&Path>, name: &str) -> Box<dyn AudioCue> {
    match path {
        Some(path) if path.is_file() => Box::new(ProcessCue::new(player, path)),
        Some(path) => {
            warn!("{} sound {} not found; cue will be silent", name, path.display());
            Box::new(SilentCue)
        }
        None => {
            debug!("No {} sound configured", name);
            Box::new(SilentCue)
        }
    }
}
