mod app;
mod audio;
mod config;
mod gfx;
mod pointer;
mod scheduler;
#[cfg(test)]
mod testing;
mod timer;
mod wayland;

use anyhow::{Context, Result};
use app::App;
use audio::load_cue;
use config::Config;
use gfx::{anim::Tweener, bitmap::load_png, sprite::Sprite};
use log::{info, warn};
use pointer::Pointer;
use scheduler::Scheduler;
use timer::{Clock, MonotonicTicks};
use wayland::backend::WaylandBackend;

fn main() -> Result<()> {
    env_logger::init();
    info!("Starting fingerpoint {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load().unwrap_or_else(|e| {
        warn!("Ignoring unreadable config: {:#}", e);
        Config::default()
    });

    let mut backend = WaylandBackend::connect(&config.shaders_dir)?;

    let pixels = load_png(&config.sprite_path)?;
    let bitmap = backend
        .upload(&pixels)
        .context("Uploading sprite texture")?;
    info!(
        "Loaded sprite {} ({}x{})",
        config.sprite_path.display(),
        bitmap.width,
        bitmap.height
    );

    let anim = &config.animation;
    let tweener = Tweener::new(anim.duration, anim.start, anim.target).with_easing(anim.easing.boxed());

    let sounds = &config.sounds;
    let pointer = Pointer::new(
        Sprite::new(bitmap),
        tweener,
        load_cue(&sounds.player, sounds.press.as_deref(), "press"),
        load_cue(&sounds.player, sounds.drag.as_deref(), "drag"),
        config.zoom.initial,
        config.zoom.step,
    );

    let mut app = App::new(pointer, backend.size());
    if config.start_visible {
        app.toggle_visibility(&mut backend)?;
    }

    info!("Send SIGUSR1 to toggle the overlay");
    let mut scheduler = Scheduler::new(Clock::new(MonotonicTicks::new()), config.fps_cap);
    scheduler.run(&mut app, &mut backend)
}
