//! Per-key color state
//!
//! Each key carries four colors: the requested (wish) color, a fade
//! multiplier, the computed output color and the color last written to the
//! device. The first two belong to the host thread (`ColorStore`). The last two
//! live in `SyncState`, shared with the sync worker under one short-held lock:
//! only `update()` writes the computed colors, only the worker writes the
//! sent colors.

use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::animation::AnimatedValue;
use crate::color::{Color, LinearColor};

/// Number of illuminated keys
pub const KEYS: usize = simpad_transport::LED_COUNT;

/// Output side of one key, shared with the worker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyColors {
    /// Last color computed by `update()`
    pub current: LinearColor,
    /// Last color successfully written to the device
    pub last_sent: LinearColor,
}

impl KeyColors {
    fn is_dirty(&self) -> bool {
        self.current != self.last_sent
    }
}

impl Default for KeyColors {
    fn default() -> Self {
        Self {
            current: LinearColor::WHITE,
            last_sent: LinearColor::WHITE,
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    keys: [KeyColors; KEYS],
    stop: bool,
}

/// State shared between the host and the sync worker
#[derive(Debug, Default)]
pub struct SyncState {
    shared: Mutex<Shared>,
    changed: Condvar,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store freshly computed colors, waking the worker if any changed
    pub fn publish(&self, colors: &[LinearColor; KEYS]) -> bool {
        let mut shared = self.shared.lock();
        let mut changed = false;
        for (key, &color) in shared.keys.iter_mut().zip(colors) {
            if key.current != color {
                key.current = color;
                changed = true;
            }
        }
        drop(shared);

        if changed {
            self.changed.notify_one();
        }
        changed
    }

    /// Copy of all key colors
    pub fn snapshot(&self) -> [KeyColors; KEYS] {
        self.shared.lock().keys
    }

    /// Keys whose computed color differs from what was last sent
    pub fn pending(&self) -> Vec<(usize, LinearColor)> {
        Self::collect_pending(&self.shared.lock())
    }

    fn collect_pending(shared: &Shared) -> Vec<(usize, LinearColor)> {
        shared
            .keys
            .iter()
            .enumerate()
            .filter(|(_, k)| k.is_dirty())
            .map(|(i, k)| (i, k.current))
            .collect()
    }

    /// Record a successful write of `color` for `key`
    pub fn mark_sent(&self, key: usize, color: LinearColor) {
        if let Some(k) = self.shared.lock().keys.get_mut(key) {
            k.last_sent = color;
        }
    }

    /// Block until there is something to send or a stop is requested
    ///
    /// Returns `None` once stopped. With `retry_after`, first waits up to
    /// that long (or until the next change) so a failing write is not
    /// retried in a tight loop.
    pub fn wait_for_changes(
        &self,
        retry_after: Option<Duration>,
    ) -> Option<Vec<(usize, LinearColor)>> {
        let mut shared = self.shared.lock();

        if let Some(delay) = retry_after {
            if !shared.stop {
                self.changed.wait_for(&mut shared, delay);
            }
        }

        loop {
            if shared.stop {
                return None;
            }
            let pending = Self::collect_pending(&shared);
            if !pending.is_empty() {
                return Some(pending);
            }
            self.changed.wait(&mut shared);
        }
    }

    /// Ask the worker to exit and wake it
    pub fn request_stop(&self) {
        self.shared.lock().stop = true;
        self.changed.notify_all();
    }

    /// Clear a previous stop request before spawning a new worker
    pub fn clear_stop(&self) {
        self.shared.lock().stop = false;
    }
}

/// Host-side per-key intent: wish color and fade multiplier
#[derive(Debug)]
pub struct ColorStore {
    wish: [LinearColor; KEYS],
    fade: [AnimatedValue; KEYS],
}

impl Default for ColorStore {
    fn default() -> Self {
        Self {
            wish: [LinearColor::WHITE; KEYS],
            fade: std::array::from_fn(|_| AnimatedValue::new(1.0)),
        }
    }
}

impl ColorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored (linearized) wish color of a key
    pub fn wish(&self, key: usize) -> Option<LinearColor> {
        self.wish.get(key).copied()
    }

    /// Fade multiplier handle of a key
    pub fn fade(&self, key: usize) -> Option<&AnimatedValue> {
        self.fade.get(key)
    }

    /// Gamma-correct and store a requested color
    pub fn set_wish(&mut self, key: usize, color: Color) {
        if let Some(w) = self.wish.get_mut(key) {
            *w = color.to_linear();
        }
    }

    /// Output colors: wish RGB with alpha scaled by the fade multiplier
    pub fn compute(&self) -> [LinearColor; KEYS] {
        std::array::from_fn(|i| self.wish[i].fade(self.fade[i].get()))
    }
}
