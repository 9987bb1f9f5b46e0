//! Time-based animation of scalar values.
//!
//! The controller does not advance time itself. It hands `AnimatedValue`
//! handles to an `Animator`, and the host ticks that animator once per frame
//! before calling `LedController::update`. `LinearAnimator` is the stock
//! implementation; hosts with their own scheduler implement `Animator`.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use keyframe::functions::{EaseInOut, Linear};
use keyframe::EasingFunction;
use parking_lot::Mutex;

/// Shared `f32` that an animator can drive
///
/// Clones refer to the same value; identity (not value) is what `cancel`
/// matches on.
#[derive(Debug, Clone)]
pub struct AnimatedValue(Arc<AtomicU32>);

impl AnimatedValue {
    pub fn new(value: f32) -> Self {
        Self(Arc::new(AtomicU32::new(value.to_bits())))
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Release);
    }

    /// Whether both handles point at the same value
    pub fn same(&self, other: &AnimatedValue) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Scheduler that moves values over wall-clock time
pub trait Animator: Send + Sync {
    /// Stop any animation driving `target`, leaving its current value
    fn cancel(&self, target: &AnimatedValue);

    /// Move `target` from its current value to `end` over `duration`
    ///
    /// Replaces any animation already driving `target`. With `use_easing`
    /// the progress follows an ease-in-out curve instead of a straight line.
    fn animate_linear(
        &self,
        target: &AnimatedValue,
        end: f32,
        duration: Duration,
        use_easing: bool,
    );
}

#[derive(Debug)]
struct Animation {
    target: AnimatedValue,
    from: f32,
    to: f32,
    started: Instant,
    duration: Duration,
    use_easing: bool,
}

impl Animation {
    /// Value at `now`, and whether the animation has finished
    fn sample(&self, now: Instant) -> (f32, bool) {
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed >= self.duration {
            return (self.to, true);
        }

        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let progress = if self.use_easing {
            EaseInOut.y(t)
        } else {
            Linear.y(t)
        };
        let value = self.from + (self.to - self.from) * progress as f32;
        (value, false)
    }
}

/// Default `Animator`, advanced explicitly with `tick`
#[derive(Debug, Default)]
pub struct LinearAnimator {
    animations: Mutex<Vec<Animation>>,
}

impl LinearAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance all animations to the current time
    pub fn tick(&self) {
        self.tick_at(Instant::now());
    }

    /// Advance all animations to `now`, dropping finished ones
    pub fn tick_at(&self, now: Instant) {
        self.animations.lock().retain(|anim| {
            let (value, done) = anim.sample(now);
            anim.target.set(value);
            !done
        });
    }

    /// Whether an animation is currently driving `target`
    pub fn is_animating(&self, target: &AnimatedValue) -> bool {
        self.animations.lock().iter().any(|a| a.target.same(target))
    }

    /// Number of running animations
    pub fn len(&self) -> usize {
        self.animations.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.lock().is_empty()
    }
}

impl Animator for LinearAnimator {
    fn cancel(&self, target: &AnimatedValue) {
        self.animations.lock().retain(|a| !a.target.same(target));
    }

    fn animate_linear(
        &self,
        target: &AnimatedValue,
        end: f32,
        duration: Duration,
        use_easing: bool,
    ) {
        let mut animations = self.animations.lock();
        animations.retain(|a| !a.target.same(target));

        if duration.is_zero() {
            target.set(end);
            return;
        }

        animations.push(Animation {
            target: target.clone(),
            from: target.get(),
            to: end,
            started: Instant::now(),
            duration,
            use_easing,
        });
    }
}
