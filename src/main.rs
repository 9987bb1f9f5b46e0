//! SimPad LED command-line tool
//!
//! Diagnostic front-end for the `simpad_led` library: lists the keypad's HID
//! interfaces and drives its LEDs by hand.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use simpad_transport::device_registry;
use tracing::{info, warn};

use simpad_led::{Color, LedConfig, LedController, LinearAnimator, KEYS};

mod cli;
use cli::{Cli, Commands};

/// Colors cycled by the demo
const DEMO_COLORS: &[Color] = &[
    Color::RED,
    Color::rgb(255, 165, 0),
    Color::GREEN,
    Color::rgb(0, 255, 255),
    Color::BLUE,
    Color::rgb(255, 0, 255),
];

/// Upper bound on waiting for the worker to flush before exiting
const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load config
    let config_path = cli.config.clone().unwrap_or_else(LedConfig::default_path);
    info!("Loading config from {:?}", config_path);
    let config = LedConfig::load(&config_path)?;

    match cli.command {
        Commands::List { json } => list(&config, json),
        Commands::Set {
            key,
            color,
            hold_ms,
        } => set(config, key, color, Duration::from_millis(hold_ms)),
        Commands::Fade { key, color, ms } => {
            fade(config, key, color, ms.map(Duration::from_millis))
        }
        Commands::Demo { fps } => demo(config, fps),
    }
}

fn list(config: &LedConfig, json: bool) -> Result<()> {
    let animator = Arc::new(LinearAnimator::new());
    let leds = LedController::with_config(animator, config.clone());
    let devices = leds.list_interfaces().context("HID enumeration failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
        return Ok(());
    }

    if !device_registry::is_supported(config.vendor_id, config.product_id) {
        warn!(
            "{:04X}:{:04X} is not a known SimPad; LED commands may be ignored",
            config.vendor_id, config.product_id
        );
    }

    if devices.is_empty() {
        println!(
            "No devices found for {:04X}:{:04X}",
            config.vendor_id, config.product_id
        );
        return Ok(());
    }

    for d in &devices {
        let marker = if d.is_interface(config.led_interface) {
            " [LED]"
        } else {
            ""
        };
        println!(
            "{:04X}:{:04X}  if={}  {}  {}{}",
            d.vid,
            d.pid,
            d.interface_number,
            d.product_name.as_deref().unwrap_or("?"),
            d.path,
            marker
        );
    }
    Ok(())
}

fn check_key(key: usize) -> Result<()> {
    anyhow::ensure!(key < KEYS, "key must be 0..{}, got {}", KEYS, key);
    Ok(())
}

/// Open the controller, returning it together with its animator
fn open(config: LedConfig) -> Result<(LedController, Arc<LinearAnimator>)> {
    let animator = Arc::new(LinearAnimator::new());
    let mut leds = LedController::with_config(animator.clone(), config);
    leds.start().context("Could not start SimPad LEDs")?;
    Ok((leds, animator))
}

/// Tick animations and update the LEDs at `fps` until `until` returns true
fn run_frames(
    leds: &LedController,
    animator: &LinearAnimator,
    fps: u32,
    mut until: impl FnMut() -> bool,
) {
    let frame = Duration::from_secs_f64(1.0 / fps.clamp(1, 240) as f64);
    while !until() {
        let started = Instant::now();
        animator.tick();
        leds.update();
        if let Some(rest) = frame.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }
}

/// Wait until the worker has sent everything `update` published
fn flush(leds: &LedController) {
    let deadline = Instant::now() + FLUSH_TIMEOUT;
    while !leds.is_synced() {
        if Instant::now() >= deadline {
            warn!("Timed out waiting for LED writes");
            return;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn set(config: LedConfig, key: usize, color: Color, hold: Duration) -> Result<()> {
    check_key(key)?;
    let (mut leds, _animator) = open(config)?;

    leds.set_color(key, color);
    leds.update();
    flush(&leds);
    std::thread::sleep(hold);

    leds.stop();
    Ok(())
}

fn fade(config: LedConfig, key: usize, color: Color, duration: Option<Duration>) -> Result<()> {
    check_key(key)?;
    let (mut leds, animator) = open(config)?;

    leds.set_color(key, color);
    match duration {
        Some(d) => leds.start_fade_with(key, d),
        None => leds.start_fade(key),
    }

    run_frames(&leds, &animator, 60, || animator.is_empty());
    leds.update();
    flush(&leds);

    leds.stop();
    Ok(())
}

fn demo(config: LedConfig, fps: u32) -> Result<()> {
    let (mut leds, animator) = open(config)?;

    // Set up Ctrl-C handler
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .context("Failed to install Ctrl-C handler")?;

    println!("Flashing keys. Ctrl+C to stop.");

    let mut step = 0usize;
    while running.load(Ordering::SeqCst) {
        let key = step % KEYS;
        leds.set_color(key, DEMO_COLORS[step % DEMO_COLORS.len()]);
        leds.start_fade(key);
        step += 1;

        let beat = Instant::now() + Duration::from_millis(400);
        run_frames(&leds, &animator, fps, || {
            Instant::now() >= beat || !running.load(Ordering::SeqCst)
        });
    }

    // Leave the keys dark on exit
    for key in 0..KEYS {
        leds.set_color(key, Color::BLACK);
    }
    leds.update();
    flush(&leds);

    leds.stop();
    println!("Done.");
    Ok(())
}
