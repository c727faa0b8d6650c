//! scale-keys - play MIDI from your computer keyboard, one scale at a time
//!
//! Maps an ordered set of physical keys onto the notes of a musical scale
//! and turns OS-level key presses and releases into MIDI note-on/note-off
//! messages on a virtual or existing output port. Features include:
//!
//! - Seven scale patterns, from chromatic to blues
//! - Three keyboard layouts (middle row, full, upper row)
//! - Virtual MIDI output, or attach to any existing output port
//! - OS-level key detection for reliable key release handling
//!
//! # Usage as a Library
//!
//! ```no_run
//! use scale_keys::{KeyBinding, KeyEventTranslator, KeyLayout, Scale, ScaleSequencer};
//!
//! let sequencer = ScaleSequencer::new("C", Scale::Major, 4)?;
//! let binding = KeyBinding::new(KeyLayout::Middle.keys(), sequencer);
//! let translator = KeyEventTranslator::new(binding, 64, 0);
//!
//! if let Some(message) = translator.key_down('a') {
//!     println!("{}", message);
//! }
//! # Ok::<(), scale_keys::Error>(())
//! ```

pub mod error;
pub mod hooks;
pub mod keyboard;
pub mod midi;
pub mod scale;
pub mod session;
pub mod sink;

// Re-export main types
pub use error::{Error, Result};
pub use hooks::{is_available as hooks_available, KeyListener, KeySignal};
pub use keyboard::{KeyBinding, KeyEventTranslator, KeyLayout};
pub use midi::{output_port_names, MidiMessage, MidiOutput, MidirOutput, NullOutput};
pub use scale::{pitch_class_index, Scale, ScaleSequencer, PITCH_CLASSES};
pub use session::DeviceSession;
pub use sink::MessageSink;
