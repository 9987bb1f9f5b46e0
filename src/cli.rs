// CLI definitions using clap

use clap::{Parser, Subcommand};
use simpad_led::Color;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "simpad-led")]
#[command(author, version, about = "Drive the illuminated keys of a SimPad keypad")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/simpad-led/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List HID interfaces of the configured device
    #[command(visible_alias = "ls")]
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set a key to a color and hold it
    Set {
        /// Key index (0-based)
        key: usize,
        /// Color: #RRGGBB, #RRGGBBAA or a name (red, blue, ...)
        #[arg(value_parser = parse_color)]
        color: Color,
        /// How long to hold the color before exiting (ms)
        #[arg(long, default_value = "1000")]
        hold_ms: u64,
    },

    /// Light a key and fade it out
    Fade {
        /// Key index (0-based)
        key: usize,
        /// Color: #RRGGBB, #RRGGBBAA or a name (red, blue, ...)
        #[arg(value_parser = parse_color)]
        color: Color,
        /// Fade duration (ms, default from config)
        #[arg(long)]
        ms: Option<u64>,
    },

    /// Flash both keys alternately until Ctrl+C
    Demo {
        /// Frames per second for the update loop
        #[arg(long, default_value = "60")]
        fps: u32,
    },
}

fn parse_color(s: &str) -> Result<Color, String> {
    Color::parse(s).ok_or_else(|| format!("invalid color: {s}"))
}
