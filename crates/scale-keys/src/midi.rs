//! MIDI messages and output backends
//!
//! The output seam is the [`MidiOutput`] trait. The shipping backend is
//! [`MidirOutput`], which either creates a virtual port or attaches to an
//! existing output enumerated by the system. [`NullOutput`] logs instead of
//! sending, for running without a transport.

use crate::error::{Error, Result};
use std::fmt;

/// Default name for the virtual output port
pub const DEFAULT_PORT_NAME: &str = "midi_out";

/// A MIDI channel-voice message, as produced by the key event translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note on: channel, note, velocity
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note off: channel, note, velocity
    NoteOff { channel: u8, note: u8, velocity: u8 },
}

impl MidiMessage {
    /// Convert to raw MIDI bytes. Data bytes are masked to 7 bits.
    pub fn to_bytes(&self) -> [u8; 3] {
        match *self {
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => [0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
            MidiMessage::NoteOff {
                channel,
                note,
                velocity,
            } => [0x80 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
        }
    }

    /// The channel this message is addressed to
    pub fn channel(&self) -> u8 {
        match *self {
            MidiMessage::NoteOn { channel, .. } | MidiMessage::NoteOff { channel, .. } => channel,
        }
    }

    /// The note this message carries
    pub fn note(&self) -> u8 {
        match *self {
            MidiMessage::NoteOn { note, .. } | MidiMessage::NoteOff { note, .. } => note,
        }
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => write!(
                f,
                "note_on channel={} note={} velocity={}",
                channel, note, velocity
            ),
            MidiMessage::NoteOff {
                channel,
                note,
                velocity,
            } => write!(
                f,
                "note_off channel={} note={} velocity={}",
                channel, note, velocity
            ),
        }
    }
}

/// MIDI output trait
pub trait MidiOutput: Send {
    /// Transmit one message. Errors are reported to the caller; the port
    /// stays usable for subsequent messages.
    fn send(&mut self, message: &MidiMessage) -> Result<()>;

    /// The port name, for display
    fn port_name(&self) -> &str;
}

/// midir-backed MIDI output.
///
/// One constructor covers both port variants: a freshly created virtual
/// port, or a connection to an existing output selected by name.
pub struct MidirOutput {
    conn: midir::MidiOutputConnection,
    port_name: String,
}

impl MidirOutput {
    /// Open a MIDI output.
    ///
    /// With `virtual_port` set, a virtual port named `port_name` (default
    /// "midi_out") is created under `client_name`. Otherwise the connection
    /// attaches to the first enumerated output whose name contains
    /// `port_name` (case-insensitive), or simply the first output when no
    /// name is given.
    pub fn open(client_name: &str, port_name: Option<&str>, virtual_port: bool) -> Result<Self> {
        let out =
            midir::MidiOutput::new(client_name).map_err(|e| Error::PortOpen(e.to_string()))?;
        if virtual_port {
            Self::create_virtual(out, client_name, port_name.unwrap_or(DEFAULT_PORT_NAME))
        } else {
            Self::attach(out, port_name)
        }
    }

    #[cfg(unix)]
    fn create_virtual(out: midir::MidiOutput, client_name: &str, name: &str) -> Result<Self> {
        use midir::os::unix::VirtualOutput;
        let conn = out
            .create_virtual(name)
            .map_err(|e| Error::PortOpen(e.to_string()))?;
        Ok(Self {
            conn,
            port_name: format!("{}:{}", client_name, name),
        })
    }

    #[cfg(not(unix))]
    fn create_virtual(_out: midir::MidiOutput, _client_name: &str, _name: &str) -> Result<Self> {
        Err(Error::PortOpen(
            "virtual ports are not supported on this platform".to_string(),
        ))
    }

    fn attach(out: midir::MidiOutput, name: Option<&str>) -> Result<Self> {
        let ports = out.ports();
        if ports.is_empty() {
            return Err(Error::PortOpen("no MIDI output ports available".to_string()));
        }
        let port = match name {
            Some(wanted) => {
                let wanted_lower = wanted.to_lowercase();
                ports
                    .iter()
                    .find(|p| {
                        out.port_name(p)
                            .map(|n| n.to_lowercase().contains(&wanted_lower))
                            .unwrap_or(false)
                    })
                    .ok_or_else(|| {
                        Error::PortOpen(format!("no MIDI output matches '{}'", wanted))
                    })?
            }
            None => &ports[0],
        };
        let display_name = out
            .port_name(port)
            .map_err(|e| Error::PortOpen(e.to_string()))?;
        let conn = out
            .connect(port, "scale-keys")
            .map_err(|e| Error::PortOpen(e.to_string()))?;
        Ok(Self {
            conn,
            port_name: display_name,
        })
    }
}

impl MidiOutput for MidirOutput {
    fn send(&mut self, message: &MidiMessage) -> Result<()> {
        self.conn.send(&message.to_bytes())?;
        Ok(())
    }

    fn port_name(&self) -> &str {
        &self.port_name
    }
}

/// Output that logs instead of transmitting, for running without a transport.
pub struct NullOutput;

impl MidiOutput for NullOutput {
    fn send(&mut self, message: &MidiMessage) -> Result<()> {
        log::debug!("dropped: {}", message);
        Ok(())
    }

    fn port_name(&self) -> &str {
        "null"
    }
}

/// Enumerate the names of the available MIDI output ports.
pub fn output_port_names() -> Result<Vec<String>> {
    let out =
        midir::MidiOutput::new("scale-keys-list").map_err(|e| Error::PortOpen(e.to_string()))?;
    Ok(out
        .ports()
        .iter()
        .filter_map(|p| out.port_name(p).ok())
        .collect())
}
