use crate::audio::AudioCue;
use crate::gfx::{
    anim::{Direction, Tweener},
    math::{Size, Vec2},
    sprite::Sprite,
    surface::RenderSurface,
};
use log::debug;

pub const MIN_SCALE: f32 = 0.0;
pub const MAX_SCALE: f32 = 1.0;

/// The on-screen pointer: sprite, press animation, sound cues and zoom.
pub struct Pointer {
    sprite: Sprite,
    tweener: Tweener,
    press_cue: Box<dyn AudioCue>,
    drag_cue: Box<dyn AudioCue>,
    position: Vec2,
    last_position: Vec2,
    scale: f32,
    scale_step: f32,
    scale_dirty: bool,
    pressed: bool,
}

impl Pointer {
    pub fn new(
        sprite: Sprite,
        tweener: Tweener,
        press_cue: Box<dyn AudioCue>,
        mut drag_cue: Box<dyn AudioCue>,
        scale: f32,
        scale_step: f32,
    ) -> Self {
        drag_cue.set_looping(true);

        let position = sprite.position();
        let mut pointer = Self {
            sprite,
            tweener,
            press_cue,
            drag_cue,
            position,
            last_position: position,
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
            scale_step,
            scale_dirty: true,
            pressed: false,
        };
        pointer.apply_scale();
        pointer
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    /// Image size at the current zoom.
    pub fn size(&self) -> Size {
        self.sprite
            .bounding_size()
            .scaled(Vec2::new(self.scale, self.scale))
    }

    /// Places the pointer in the middle of `bounds`.
    pub fn center_in(&mut self, bounds: Size) {
        let size = self.size();
        self.position = Vec2::new(
            (bounds.width - size.width) / 2.0,
            (bounds.height - size.height) / 2.0,
        );
        self.last_position = self.position;
    }

    pub fn press(&mut self) {
        self.pressed = true;
        self.tweener.invert(Direction::Backward);
        self.press_cue.play();
    }

    pub fn release(&mut self) {
        self.pressed = false;
        self.tweener.invert(Direction::Forward);
        self.press_cue.stop();
        self.drag_cue.stop();
    }

    /// Moves by `delta`, allowing the sprite to leave `bounds` by at most
    /// its own size on every edge.
    pub fn move_by(&mut self, delta: Vec2, bounds: Size) {
        let margin = self.size();
        let moved = self.position + delta;
        self.position = Vec2::new(
            moved.x.clamp(-margin.width, bounds.width + margin.width),
            moved.y.clamp(-margin.height, bounds.height + margin.height),
        );
    }

    /// One wheel notch per call; the sign of `delta` picks the direction.
    pub fn scroll(&mut self, delta: f32) {
        let step = if delta > 0.0 {
            self.scale_step
        } else if delta < 0.0 {
            -self.scale_step
        } else {
            return;
        };
        self.scale = (self.scale + step).clamp(MIN_SCALE, MAX_SCALE);
        self.scale_dirty = true;
        debug!("Pointer scale {:.2}", self.scale);
    }

    /// Advances the press animation and syncs the sprite. Returns whether
    /// the animation is still short of its target.
    pub fn update(&mut self, delta: f32) -> bool {
        let dragging = self.pressed && self.position != self.last_position;
        if dragging {
            self.drag_cue.play();
        } else {
            self.drag_cue.stop();
        }
        self.last_position = self.position;

        self.sprite.set_position(self.position);

        if self.scale_dirty {
            self.apply_scale();
        }

        let animating = self.tweener.update(delta);
        self.sprite.set_rotation(self.tweener.value());
        animating
    }

    pub fn draw<R: RenderSurface + ?Sized>(&self, surface: &mut R) {
        self.sprite.draw(surface);
    }

    /// Stops every cue; used when the overlay goes away.
    pub fn silence(&mut self) {
        self.press_cue.stop();
        self.drag_cue.stop();
    }

    fn apply_scale(&mut self) {
        let size = self.size();
        self.sprite.set_scale(Vec2::new(self.scale, self.scale));
        // Pivot on the bottom-centre so the press tilts around the wrist.
        self.sprite
            .set_rotation_pivot(Vec2::new(size.width / 2.0, size.height));
        self.sprite.set_scale_pivot(Vec2::ZERO);
        self.scale_dirty = false;
    }
}
