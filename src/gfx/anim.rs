use serde::{Deserialize, Serialize};

pub fn linear(t: f32) -> f32 {
    t
}

pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

/// Fast start, soft landing: `sqrt(1 - (t - 1)^2)`.
pub fn ease_out_circ(t: f32) -> f32 {
    (1.0 - (t - 1.0).powi(2)).sqrt()
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Maps a normalized ratio in [0, 1] to an eased ratio in [0, 1].
pub trait Easing {
    fn ease(&self, t: f32) -> f32;
}

impl<F: Fn(f32) -> f32> Easing for F {
    fn ease(&self, t: f32) -> f32 {
        self(t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EasingKind {
    Linear,
    EaseInOut,
    #[default]
    EaseOutCirc,
}

impl EasingKind {
    pub fn boxed(self) -> Box<dyn Easing> {
        match self {
            EasingKind::Linear => Box::new(linear),
            EasingKind::EaseInOut => Box::new(ease_in_out),
            EasingKind::EaseOutCirc => Box::new(ease_out_circ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Duration-bounded interpolation between two values that can be turned
/// around mid-flight without snapping.
pub struct Tweener {
    duration: f32,
    start: f32,
    target: f32,
    progress: f32,
    value: f32,
    direction: Direction,
    easing: Box<dyn Easing>,
}

impl std::fmt::Debug for Tweener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tweener")
            .field("duration", &self.duration)
            .field("start", &self.start)
            .field("target", &self.target)
            .field("progress", &self.progress)
            .field("value", &self.value)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

impl Tweener {
    pub fn new(duration: f32, start: f32, target: f32) -> Self {
        Self {
            duration,
            start,
            target,
            progress: 0.0,
            value: start,
            direction: Direction::Forward,
            easing: Box::new(linear),
        }
    }

    pub fn with_easing(mut self, easing: Box<dyn Easing>) -> Self {
        self.easing = easing;
        self
    }

    /// Advances (or retracts, when running backward) by `delta` seconds.
    /// Returns true while progress is short of the full duration.
    pub fn update(&mut self, delta: f32) -> bool {
        if self.duration <= 0.0 {
            self.value = self.target;
            self.progress = self.duration;
            return false;
        }

        let step = match self.direction {
            Direction::Forward => delta,
            Direction::Backward => -delta,
        };
        self.progress = (self.progress + step).clamp(0.0, self.duration);

        let eased = self.easing.ease(self.progress / self.duration);
        self.value = lerp(self.start, self.target, eased);

        self.progress < self.duration
    }

    /// Changes course; progress and value stay where they are.
    pub fn invert(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Rewinds progress and zeroes the value (not the start value).
    pub fn reset(&mut self) {
        self.progress = 0.0;
        self.value = 0.0;
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn rotation_tweener() -> Tweener {
        Tweener::new(0.25, -45.0, 0.0)
    }

    #[test]
    fn starts_settled_at_start_value() {
        let tw = rotation_tweener();
        assert_eq!(tw.value(), -45.0);
        assert_eq!(tw.progress(), 0.0);
        assert_eq!(tw.direction(), Direction::Forward);
    }

    #[test]
    fn full_duration_step_lands_on_target() {
        let mut tw = rotation_tweener();
        assert!(!tw.update(0.25));
        assert_eq!(tw.value(), 0.0);
    }

    #[test]
    fn linear_steps_follow_elapsed_ratio() {
        let mut tw = rotation_tweener();
        let mut expected_progress = 0.0f32;
        for n in 1..=5 {
            let moving = tw.update(0.1);
            expected_progress = (expected_progress + 0.1).min(0.25);
            let expected = -45.0 + 45.0 * (expected_progress / 0.25);
            assert!(
                (tw.value() - expected).abs() < 1e-3,
                "step {}: {} vs {}",
                n,
                tw.value(),
                expected
            );
            assert_eq!(moving, tw.progress() < 0.25);
        }
        assert_eq!(tw.value(), 0.0);
    }

    #[test]
    fn first_two_steps_are_in_motion() {
        let mut tw = rotation_tweener();
        assert!(tw.update(0.1));
        assert!((tw.value() - (-27.0)).abs() < 1e-3);
        assert!(tw.update(0.1));
        assert!((tw.value() - (-9.0)).abs() < 1e-3);
        assert!(!tw.update(0.1));
    }

    #[test]
    fn progress_stays_within_bounds() {
        let mut tw = rotation_tweener();
        for delta in [0.0, 0.07, 1.0, 3.5, 0.001] {
            tw.update(delta);
            assert!(tw.progress() >= 0.0 && tw.progress() <= 0.25);
        }
        tw.invert(Direction::Backward);
        for delta in [0.0, 0.07, 1.0, 3.5, 0.001] {
            tw.update(delta);
            assert!(tw.progress() >= 0.0 && tw.progress() <= 0.25);
        }
        assert_eq!(tw.progress(), 0.0);
        assert_eq!(tw.value(), -45.0);
    }

    #[test]
    fn zero_duration_snaps_to_target() {
        let mut tw = Tweener::new(0.0, 10.0, 20.0);
        tw.invert(Direction::Backward);
        assert!(!tw.update(0.5));
        assert_eq!(tw.value(), 20.0);
        assert!(!tw.update(0.0));
        assert_eq!(tw.value(), 20.0);

        let mut negative = Tweener::new(-1.0, 10.0, 20.0);
        assert!(!negative.update(0.1));
        assert_eq!(negative.value(), 20.0);
        assert_eq!(negative.progress(), -1.0);
    }

    #[test]
    fn invert_mid_flight_retraces_progress() {
        let mut tw = rotation_tweener();
        tw.update(0.15);
        let before = tw.progress();

        tw.invert(Direction::Backward);
        assert!((tw.progress() - before).abs() < EPS);

        tw.update(0.05);
        assert!((tw.progress() - (before - 0.05)).abs() < EPS);

        tw.invert(Direction::Forward);
        tw.update(0.05);
        assert!((tw.progress() - before).abs() < EPS);
    }

    #[test]
    fn invert_does_not_touch_value() {
        let mut tw = rotation_tweener();
        tw.update(0.1);
        let value = tw.value();
        tw.invert(Direction::Backward);
        assert_eq!(tw.value(), value);
    }

    #[test]
    fn reset_zeroes_value_rather_than_restoring_start() {
        let mut tw = rotation_tweener();
        tw.update(0.1);
        tw.reset();
        assert_eq!(tw.progress(), 0.0);
        assert_eq!(tw.value(), 0.0);
    }

    #[test]
    fn ease_out_circ_boundaries_and_monotonic() {
        assert_eq!(ease_out_circ(0.0), 0.0);
        assert_eq!(ease_out_circ(1.0), 1.0);

        let mut last = ease_out_circ(0.0);
        for i in 1..=100 {
            let v = ease_out_circ(i as f32 / 100.0);
            assert!(v > last, "not increasing at {}", i);
            assert!(v <= 1.0);
            last = v;
        }
    }

    #[test]
    fn ease_out_circ_leads_linear() {
        assert!(ease_out_circ(0.25) > 0.25);
        assert!(ease_out_circ(0.5) > 0.5);
    }

    #[test]
    fn closures_are_accepted_as_easing() {
        let mut tw = Tweener::new(1.0, 0.0, 10.0).with_easing(Box::new(|t: f32| t * t));
        tw.update(0.5);
        assert!((tw.value() - 2.5).abs() < EPS);
    }

    #[test]
    fn easing_kinds_resolve() {
        for kind in [EasingKind::Linear, EasingKind::EaseInOut, EasingKind::EaseOutCirc] {
            let easing = kind.boxed();
            assert_eq!(easing.ease(0.0), 0.0);
            assert_eq!(easing.ease(1.0), 1.0);
        }
    }
}
