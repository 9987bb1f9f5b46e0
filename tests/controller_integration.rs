//! Integration tests for the LED controller.
//!
//! The controller runs against an in-memory HID backend that records every
//! LED command the sync worker writes.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use simpad_led::{Animator, Color, LedConfig, LedController, LedError, LinearAnimator, KEYS};
use simpad_transport::{
    BoxedTransport, DeviceDescriptor, HidBackend, LedTransport, Rgb, SetLed, TransportError,
};

// ── Mock backend ─────────────────────────────────────────────────────

/// Shared record of what happened on the mock device
#[derive(Default, Clone)]
struct DeviceLog {
    writes: Arc<Mutex<Vec<SetLed>>>,
    failures_left: Arc<AtomicUsize>,
    opens: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl DeviceLog {
    fn writes(&self) -> Vec<SetLed> {
        self.writes.lock().clone()
    }

    fn write_count(&self) -> usize {
        self.writes.lock().len()
    }
}

struct MockTransport {
    info: DeviceDescriptor,
    log: DeviceLog,
}

impl LedTransport for MockTransport {
    fn write_report(&mut self, report: &[u8]) -> Result<usize, TransportError> {
        let failing = self
            .log
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(TransportError::HidError("simulated write failure".into()));
        }
        let cmd = SetLed::parse_report(report).expect("worker wrote a malformed report");
        self.log.writes.lock().push(cmd);
        Ok(report.len())
    }

    fn device_info(&self) -> &DeviceDescriptor {
        &self.info
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        self.log.closed.store(true, Ordering::SeqCst);
    }
}

enum Enumeration {
    Devices(Vec<DeviceDescriptor>),
    Fails,
}

struct MockBackend {
    enumeration: Enumeration,
    open_fails: bool,
    log: DeviceLog,
}

impl HidBackend for MockBackend {
    fn enumerate(&self, vid: u16, pid: u16) -> Result<Vec<DeviceDescriptor>, TransportError> {
        match &self.enumeration {
            Enumeration::Devices(devices) => Ok(devices
                .iter()
                .filter(|d| d.vid == vid && d.pid == pid)
                .cloned()
                .collect()),
            Enumeration::Fails => Err(TransportError::HidError("hid_enumerate failed".into())),
        }
    }

    fn open(&self, device: &DeviceDescriptor) -> Result<BoxedTransport, TransportError> {
        self.log.opens.fetch_add(1, Ordering::SeqCst);
        if self.open_fails {
            return Err(TransportError::OpenFailed {
                path: device.path.clone(),
                reason: "busy".into(),
            });
        }
        Ok(Box::new(MockTransport {
            info: device.clone(),
            log: self.log.clone(),
        }))
    }
}

fn interface(interface_number: i32) -> DeviceDescriptor {
    DeviceDescriptor {
        vid: 0x8088,
        pid: 0x0006,
        interface_number,
        path: format!("mock:{interface_number}"),
        serial: None,
        product_name: Some("SimPad v2 AE".into()),
    }
}

fn simpad() -> Vec<DeviceDescriptor> {
    vec![interface(0), interface(1), interface(2)]
}

fn controller_with(
    enumeration: Enumeration,
    open_fails: bool,
) -> (LedController, Arc<LinearAnimator>, DeviceLog) {
    let log = DeviceLog::default();
    let backend = MockBackend {
        enumeration,
        open_fails,
        log: log.clone(),
    };
    let animator = Arc::new(LinearAnimator::new());
    let config = LedConfig {
        retry_interval_ms: 5,
        ..LedConfig::default()
    };
    let leds = LedController::with_backend(Box::new(backend), animator.clone(), config);
    (leds, animator, log)
}

fn controller() -> (LedController, Arc<LinearAnimator>, DeviceLog) {
    controller_with(Enumeration::Devices(simpad()), false)
}

/// Poll `cond` until it holds or two seconds pass
fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    cond()
}

/// Expected wire byte: gamma-corrected channel times alpha, rounded once
fn wire_byte(c: u8, a: u8) -> u8 {
    let linear = (c as f32 / 255.0).powf(2.2).clamp(0.0, 1.0) * 255.0;
    (linear * (a as f32 / 255.0)).round() as u8
}

// ── Session ──────────────────────────────────────────────────────────

#[test]
fn start_opens_led_interface() {
    let (mut leds, _animator, log) = controller();
    leds.start().unwrap();

    assert!(leds.is_running());
    assert_eq!(leds.device().unwrap().interface_number, 1);
    assert_eq!(log.opens.load(Ordering::SeqCst), 1);

    leds.stop();
    assert!(!leds.is_running());
    assert!(log.closed.load(Ordering::SeqCst));
}

#[test]
fn no_matching_devices_is_not_found() {
    let (mut leds, _animator, log) = controller_with(Enumeration::Devices(Vec::new()), false);

    let err = leds.start().unwrap_err();
    assert!(matches!(err, LedError::DeviceNotFound(_)));
    assert!(!leds.is_running());
    assert_eq!(log.opens.load(Ordering::SeqCst), 0);

    leds.set_color(0, Color::RED);
    leds.update();
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(log.write_count(), 0);
}

#[test]
fn missing_led_interface_is_not_found() {
    let devices = vec![interface(0), interface(2)];
    let (mut leds, _animator, log) = controller_with(Enumeration::Devices(devices), false);

    assert!(matches!(leds.start(), Err(LedError::DeviceNotFound(_))));
    assert!(!leds.is_running());
    assert_eq!(log.opens.load(Ordering::SeqCst), 0);
}

#[test]
fn other_product_is_ignored() {
    let mut other = interface(1);
    other.pid = 0x0005;
    let (mut leds, _animator, _log) = controller_with(Enumeration::Devices(vec![other]), false);

    assert!(matches!(leds.start(), Err(LedError::DeviceNotFound(_))));
}

#[test]
fn enumeration_error_leaves_stopped() {
    let (mut leds, _animator, _log) = controller_with(Enumeration::Fails, false);

    assert!(matches!(leds.start(), Err(LedError::Transport(_))));
    assert!(!leds.is_running());
}

#[test]
fn open_failure_leaves_stopped() {
    let (mut leds, _animator, log) = controller_with(Enumeration::Devices(simpad()), true);

    assert!(matches!(leds.start(), Err(LedError::OpenFailed(_))));
    assert!(!leds.is_running());
    assert_eq!(log.opens.load(Ordering::SeqCst), 1);
}

#[test]
fn list_interfaces_reports_all_matches() {
    let (leds, _animator, log) = controller();
    let interfaces = leds.list_interfaces().unwrap();
    assert_eq!(interfaces.len(), 3);
    assert!(interfaces.iter().any(|d| d.is_interface(1)));
    assert_eq!(log.opens.load(Ordering::SeqCst), 0);

    let (leds, _animator, _log) = controller_with(Enumeration::Fails, false);
    assert!(matches!(leds.list_interfaces(), Err(LedError::Transport(_))));
}

#[test]
fn stop_before_start_is_harmless() {
    let (mut leds, _animator, log) = controller();
    leds.stop();
    leds.stop();
    assert!(!leds.is_running());
    assert_eq!(log.opens.load(Ordering::SeqCst), 0);
}

#[test]
fn restart_replaces_session() {
    let (mut leds, _animator, log) = controller();
    leds.start().unwrap();
    leds.start().unwrap();
    assert!(leds.is_running());
    assert_eq!(log.opens.load(Ordering::SeqCst), 2);

    leds.set_color(1, Color::GREEN);
    leds.update();
    assert!(wait_until(|| leds.is_synced()));
}

#[test]
fn restart_keeps_sent_colors() {
    let (mut leds, _animator, log) = controller();
    leds.start().unwrap();
    leds.set_color(0, Color::RED);
    leds.update();
    assert!(wait_until(|| log.write_count() == 1));

    leds.start().unwrap();
    leds.update();
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(log.write_count(), 1);
    assert!(leds.is_synced());

    leds.set_color(0, Color::GREEN);
    leds.update();
    assert!(wait_until(|| log.write_count() == 2));
}

#[test]
fn drop_closes_device() {
    let (mut leds, _animator, log) = controller();
    leds.start().unwrap();
    drop(leds);
    assert!(log.closed.load(Ordering::SeqCst));
}

// ── Facade ───────────────────────────────────────────────────────────

#[test]
fn out_of_range_keys_are_ignored() {
    let (mut leds, animator, _log) = controller();
    let before = leds.key_colors();

    leds.set_color(KEYS, Color::RED);
    leds.set_color(usize::MAX, Color::BLUE);
    leds.start_fade(KEYS);
    leds.start_fade_with(KEYS + 7, Duration::from_secs(1));
    leds.update();

    assert!(animator.is_empty());
    assert_eq!(leds.key_colors(), before);
    for key in 0..KEYS {
        assert_eq!(leds.wish_color(key), Some(Color::WHITE));
        assert_eq!(leds.fade_value(key), Some(1.0));
    }
    assert_eq!(leds.wish_color(KEYS), None);
}

#[test]
fn set_color_waits_for_update() {
    let (mut leds, _animator, _log) = controller();
    leds.set_color(0, Color::RED);
    assert_eq!(leds.current_color(0), Some(Color::WHITE));
    leds.update();
    assert_eq!(leds.current_color(0), Some(Color::RED));
}

#[test]
fn update_is_idempotent() {
    let (mut leds, _animator, _log) = controller();
    leds.set_color(0, Color::rgba(200, 100, 50, 180));
    leds.set_color(1, Color::rgb(10, 20, 30));

    leds.update();
    let first = leds.key_colors();
    leds.update();
    assert_eq!(leds.key_colors(), first);
}

#[test]
fn set_color_cancels_fade() {
    let (mut leds, animator, _log) = controller();
    leds.start_fade_with(0, Duration::from_millis(100));
    animator.tick_at(Instant::now() + Duration::from_millis(50));
    assert!(leds.fade_value(0).unwrap() < 1.0);

    leds.set_color(0, Color::BLUE);
    assert_eq!(leds.fade_value(0), Some(1.0));
    assert!(animator.is_empty());

    animator.tick_at(Instant::now() + Duration::from_secs(1));
    leds.update();
    assert_eq!(leds.current_color(0), Some(Color::BLUE));
}

#[test]
fn fade_alpha_is_monotonic_and_reaches_zero() {
    let (mut leds, animator, _log) = controller();
    let duration = Duration::from_millis(250);
    leds.set_color(1, Color::rgb(255, 0, 0));

    let t0 = Instant::now();
    leds.start_fade_with(1, duration);

    let mut last_alpha = u8::MAX;
    for ms in [0u64, 20, 60, 100, 150, 200, 240] {
        animator.tick_at(t0 + Duration::from_millis(ms));
        leds.update();
        let alpha = leds.current_color(1).unwrap().a;
        assert!(alpha <= last_alpha, "alpha rose from {last_alpha} to {alpha} at {ms}ms");
        last_alpha = alpha;
    }

    // Fade started a moment after t0; allow for it
    animator.tick_at(t0 + duration + Duration::from_millis(50));
    leds.update();
    assert_eq!(leds.current_color(1).unwrap().a, 0);
    assert!(animator.is_empty());
}

#[test]
fn restarting_fade_resets_multiplier() {
    let (leds, animator, _log) = controller();
    leds.start_fade_with(0, Duration::from_millis(100));
    animator.tick_at(Instant::now() + Duration::from_secs(1));
    assert_eq!(leds.fade_value(0), Some(0.0));

    leds.start_fade(0);
    assert_eq!(leds.fade_value(0), Some(1.0));
    assert_eq!(animator.len(), 1);
}

// ── Sync worker end to end ───────────────────────────────────────────

#[test]
fn encoded_command_matches_linearized_premultiplied_color() {
    let (mut leds, _animator, log) = controller();
    leds.start().unwrap();

    for a in [1u8, 51, 128, 200, 254, 255] {
        for c in [0u8, 1, 15, 16, 64, 100, 128, 192, 250, 255] {
            leds.set_color(0, Color::rgba(c, 15, 255 - c, a));
            leds.update();
            assert!(wait_until(|| leds.is_synced()));

            let cmd = *log.writes().last().unwrap();
            assert_eq!(cmd.led, 1);
            assert_eq!(
                cmd.color,
                Rgb::new(wire_byte(c, a), wire_byte(15, a), wire_byte(255 - c, a)),
                "color ({c}, 15, {}) alpha {a}",
                255 - c
            );
        }
    }
}

#[test]
fn dim_channel_at_half_alpha_rounds_to_zero() {
    let (mut leds, _animator, log) = controller();
    leds.start().unwrap();

    leds.set_color(1, Color::rgba(15, 15, 15, 128));
    leds.update();
    assert!(wait_until(|| log.write_count() == 1));
    assert_eq!(log.writes()[0].color, Rgb::BLACK);
}

#[test]
fn unchanged_colors_are_not_resent() {
    let (mut leds, _animator, log) = controller();
    leds.start().unwrap();

    leds.set_color(0, Color::GREEN);
    leds.set_color(1, Color::BLUE);
    leds.update();
    assert!(wait_until(|| log.write_count() == 2));

    for _ in 0..10 {
        leds.update();
    }
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(log.write_count(), 2);
    assert!(leds.is_synced());
}

#[test]
fn last_set_color_wins() {
    let (mut leds, _animator, log) = controller();
    leds.start().unwrap();

    leds.set_color(0, Color::RED);
    leds.set_color(0, Color::BLUE);
    leds.update();
    assert!(wait_until(|| leds.is_synced()));

    let writes = log.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].key_index(), Some(0));
    assert_eq!(writes[0].color, Rgb::new(0, 0, 255));
}

#[test]
fn failed_writes_are_retried() {
    let (mut leds, _animator, log) = controller();
    log.failures_left.store(3, Ordering::SeqCst);
    leds.start().unwrap();

    leds.set_color(1, Color::RED);
    leds.update();
    assert!(wait_until(|| leds.is_synced()));
    assert!(leds.is_running());

    let writes = log.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].color, Rgb::new(255, 0, 0));
    assert_eq!(log.failures_left.load(Ordering::SeqCst), 0);
}

#[test]
fn colors_set_while_stopped_are_sent_after_start() {
    let (mut leds, _animator, log) = controller();
    leds.set_color(0, Color::rgb(255, 255, 0));
    leds.update();
    assert_eq!(log.write_count(), 0);

    leds.start().unwrap();
    assert!(wait_until(|| log.write_count() == 1));
    assert_eq!(log.writes()[0].color, Rgb::new(255, 255, 0));
}

#[test]
fn fade_out_ends_dark() {
    let (mut leds, animator, log) = controller();
    leds.start().unwrap();

    leds.set_color(0, Color::WHITE);
    leds.start_fade_with(0, Duration::from_millis(10));
    animator.tick_at(Instant::now() + Duration::from_secs(1));
    leds.update();

    assert!(wait_until(|| leds.is_synced()));
    let last = *log.writes().last().unwrap();
    assert_eq!(last.color, Rgb::BLACK);
}

#[test]
fn custom_animator_is_used() {
    #[derive(Default)]
    struct CountingAnimator {
        cancels: AtomicUsize,
        animations: AtomicUsize,
    }

    impl Animator for CountingAnimator {
        fn cancel(&self, _target: &simpad_led::AnimatedValue) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }

        fn animate_linear(
            &self,
            target: &simpad_led::AnimatedValue,
            end: f32,
            _duration: Duration,
            use_easing: bool,
        ) {
            assert!(!use_easing);
            target.set(end);
            self.animations.fetch_add(1, Ordering::SeqCst);
        }
    }

    let animator = Arc::new(CountingAnimator::default());
    let backend = MockBackend {
        enumeration: Enumeration::Devices(simpad()),
        open_fails: false,
        log: DeviceLog::default(),
    };
    let mut leds =
        LedController::with_backend(Box::new(backend), animator.clone(), LedConfig::default());

    leds.set_color(0, Color::RED);
    leds.start_fade(0);
    leds.update();

    assert_eq!(animator.cancels.load(Ordering::SeqCst), 1);
    assert_eq!(animator.animations.load(Ordering::SeqCst), 1);
    assert_eq!(leds.current_color(0).unwrap().a, 0);
}
