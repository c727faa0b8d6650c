//! scale-keys - turn your computer keyboard into a MIDI controller

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossbeam_channel::RecvTimeoutError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use scale_keys::{
    keyboard::{KeyBinding, KeyEventTranslator, KeyLayout},
    midi::{output_port_names, MidirOutput},
    scale::{Scale, ScaleSequencer},
    session::DeviceSession,
};

#[derive(Parser)]
#[command(name = "scale-keys")]
#[command(author, version, about = "Turn your computer keyboard into a MIDI controller", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Starting note of the scale (A, A#, B, C, ...)
    #[arg(short = 'n', long, default_value = "C")]
    start_note: String,

    /// Scale to walk: NONE, MAJOR, MINOR, HARMONIC_MINOR, MELODIC_MINOR_ASC,
    /// BLUES or PENTATONIC_MAJOR
    #[arg(short, long, default_value = "NONE", value_parser = parse_scale)]
    scale: Scale,

    /// Starting octave
    #[arg(short, long, default_value_t = 4)]
    octave: i32,

    /// Keyboard layout: middle, full or upper
    #[arg(short, long, default_value = "middle", value_parser = parse_layout)]
    layout: KeyLayout,

    /// Verbosity level: 0 (silent), 1 (normal), 2 (print every message)
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=2))]
    verbosity: u8,

    /// Default velocity for MIDI notes (0-127)
    #[arg(short = 'd', long, default_value_t = 64, value_parser = clap::value_parser!(u8).range(0..=127))]
    velocity: u8,

    /// MIDI output port name (the virtual port's name, or the output to
    /// attach to)
    #[arg(short, long)]
    port: Option<String>,

    /// Attach to an existing MIDI output instead of creating a virtual port
    #[arg(long)]
    attach: bool,

    /// MIDI channel (0-15)
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=15))]
    channel: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List available MIDI output ports
    ListPorts,
}

fn parse_scale(s: &str) -> std::result::Result<Scale, String> {
    Scale::from_name(s).map_err(|e| e.to_string())
}

fn parse_layout(s: &str) -> std::result::Result<KeyLayout, String> {
    KeyLayout::from_name(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if let Some(Commands::ListPorts) = cli.command {
        let ports = output_port_names()?;
        if ports.is_empty() {
            println!("No MIDI output ports found");
        } else {
            println!("Available MIDI output ports:");
            for port in ports {
                println!("  {}", port);
            }
        }
        return Ok(());
    }

    // Invalid note/scale input fails here, before any port or hook exists.
    let sequencer = ScaleSequencer::new(&cli.start_note, cli.scale, cli.octave)?;
    let binding = KeyBinding::new(cli.layout.keys(), sequencer);
    let translator = KeyEventTranslator::new(binding, cli.velocity, cli.channel);

    let output = MidirOutput::open("scale-keys", cli.port.as_deref(), !cli.attach)?;
    let mut session = DeviceSession::start(translator, Box::new(output))?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::Relaxed);
    })?;

    if cli.verbosity >= 1 {
        println!(
            "MIDI controller '{}' is running. Press keys on your keyboard to play notes. Press Ctrl+C to stop.",
            session.port_name()
        );
    }

    while !interrupted.load(Ordering::Relaxed) {
        match session.observer().recv_timeout(Duration::from_millis(100)) {
            Ok(message) => {
                if cli.verbosity >= 2 {
                    println!("{}", message);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    session.shutdown();

    if cli.verbosity >= 1 {
        println!("MIDI controller stopped.");
    }

    Ok(())
}
