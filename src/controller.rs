//! Public facade: the API the host application drives once per frame.
//!
//! Typical use:
//!
//! ```no_run
//! use std::sync::Arc;
//! use simpad_led::{Color, LedController, LinearAnimator};
//!
//! let animator = Arc::new(LinearAnimator::new());
//! let mut leds = LedController::new(animator.clone());
//! // A missing keypad is not an error for the host; the LEDs just stay dark.
//! let _ = leds.start();
//!
//! leds.set_color(0, Color::rgb(255, 64, 0));
//! leds.start_fade(1);
//!
//! // every frame:
//! animator.tick();
//! leds.update();
//! ```

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use simpad_transport::{select_interface, DeviceDescriptor, HidBackend, HidDiscovery};
use tracing::{debug, info, warn};

use crate::animation::Animator;
use crate::color::Color;
use crate::config::LedConfig;
use crate::error::LedError;
use crate::state::{ColorStore, KeyColors, SyncState, KEYS};
use crate::worker;

/// An open device plus the worker thread that owns its handle
struct Session {
    worker: JoinHandle<()>,
    device: DeviceDescriptor,
}

/// Mirrors per-key colors onto the keypad LEDs
pub struct LedController {
    backend: Box<dyn HidBackend>,
    animator: Arc<dyn Animator>,
    config: LedConfig,
    store: ColorStore,
    sync: Arc<SyncState>,
    session: Option<Session>,
}

impl LedController {
    /// Controller over hidapi with the default configuration
    pub fn new(animator: Arc<dyn Animator>) -> Self {
        Self::with_config(animator, LedConfig::default())
    }

    /// Controller over hidapi with a custom configuration
    pub fn with_config(animator: Arc<dyn Animator>, config: LedConfig) -> Self {
        Self::with_backend(Box::new(HidDiscovery::new()), animator, config)
    }

    /// Controller over an arbitrary HID backend
    pub fn with_backend(
        backend: Box<dyn HidBackend>,
        animator: Arc<dyn Animator>,
        config: LedConfig,
    ) -> Self {
        Self {
            backend,
            animator,
            config,
            store: ColorStore::new(),
            sync: Arc::new(SyncState::new()),
            session: None,
        }
    }

    /// Find and open the LED interface, then start the sync worker
    ///
    /// Any running session is stopped first. On failure the error is logged
    /// and returned, and the controller is left stopped.
    ///
    /// Sent colors are not forgotten across a restart, so after a replug a
    /// key keeps whatever the device shows until its color next changes.
    pub fn start(&mut self) -> Result<(), LedError> {
        self.stop();

        let result = self.open_session();
        if let Err(ref e) = result {
            warn!("SimPad LEDs unavailable: {}", e);
            self.stop();
        }
        result
    }

    fn open_session(&mut self) -> Result<(), LedError> {
        let (vid, pid) = (self.config.vendor_id, self.config.product_id);

        let devices = self.backend.enumerate(vid, pid).map_err(|e| {
            warn!("HID enumeration of {:04X}:{:04X} failed: {}", vid, pid, e);
            LedError::from(e)
        })?;
        let device = select_interface(&devices, self.config.led_interface)?.clone();
        let transport = self.backend.open(&device)?;

        self.sync.clear_stop();
        let worker = worker::spawn(
            transport,
            Arc::clone(&self.sync),
            self.config.retry_interval(),
        )?;

        info!(
            "SimPad LEDs running on {} (interface {})",
            device.path, device.interface_number
        );
        self.session = Some(Session { worker, device });
        Ok(())
    }

    /// Stop the worker and close the device
    ///
    /// Blocks until the worker has exited, so no write can race the close.
    /// Safe to call repeatedly or without a prior `start`.
    pub fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        self.sync.request_stop();
        if session.worker.join().is_err() {
            warn!("LED sync worker panicked");
        }
        info!("Released LED interface {}", session.device.path);
    }

    /// All HID interfaces matching the configured vendor/product pair
    pub fn list_interfaces(&self) -> Result<Vec<DeviceDescriptor>, LedError> {
        let devices = self
            .backend
            .enumerate(self.config.vendor_id, self.config.product_id)?;
        Ok(devices)
    }

    /// Whether a device handle is currently held
    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Interface in use, if running
    pub fn device(&self) -> Option<&DeviceDescriptor> {
        self.session.as_ref().map(|s| &s.device)
    }

    /// Recompute output colors from wish colors and fade multipliers
    ///
    /// Call once per frame, after ticking the animator.
    pub fn update(&self) {
        if self.sync.publish(&self.store.compute()) {
            debug!("LED colors changed");
        }
    }

    /// Set the color of a key, cancelling any fade on it
    ///
    /// Takes effect on the next `update`. Out-of-range keys are ignored.
    pub fn set_color(&mut self, key: usize, color: Color) {
        let Some(fade) = self.store.fade(key) else {
            return;
        };
        self.animator.cancel(fade);
        fade.set(1.0);
        self.store.set_wish(key, color);
    }

    /// Fade a key out over the configured default duration
    pub fn start_fade(&self, key: usize) {
        self.start_fade_with(key, self.config.fade_duration());
    }

    /// Fade a key from full to zero brightness over `duration`
    ///
    /// A later `set_color` or fade on the same key interrupts it.
    /// Out-of-range keys are ignored.
    pub fn start_fade_with(&self, key: usize, duration: Duration) {
        let Some(fade) = self.store.fade(key) else {
            return;
        };
        fade.set(1.0);
        self.animator.animate_linear(fade, 0.0, duration, false);
    }

    /// Last computed output color of a key, rounded to 8 bits
    pub fn current_color(&self, key: usize) -> Option<Color> {
        self.sync.snapshot().get(key).map(|k| k.current.to_color())
    }

    /// Stored (linearized) wish color of a key, rounded to 8 bits
    pub fn wish_color(&self, key: usize) -> Option<Color> {
        self.store.wish(key).map(|w| w.to_color())
    }

    /// Current fade multiplier of a key
    pub fn fade_value(&self, key: usize) -> Option<f32> {
        self.store.fade(key).map(|f| f.get())
    }

    /// Whether every computed color has been written to the device
    pub fn is_synced(&self) -> bool {
        self.sync.pending().is_empty()
    }

    /// Output and sent colors of all keys
    pub fn key_colors(&self) -> [KeyColors; KEYS] {
        self.sync.snapshot()
    }

    pub fn config(&self) -> &LedConfig {
        &self.config
    }
}

impl Drop for LedController {
    fn drop(&mut self) {
        self.stop();
    }
}
