//! Key layouts, the key-to-note binding, and the event translator
//!
//! The binding is built once at startup by zipping a layout's keys with a
//! note sequence and never changes afterwards, so it can be read from any
//! thread without synchronization.

use crate::error::{Error, Result};
use crate::midi::MidiMessage;

/// A named set of physical keys, ordered by ascending scale position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLayout {
    /// Home row plus the two keys to its right
    Middle,
    /// Home row interleaved with the row above it
    Full,
    /// Top letter row
    Upper,
}

impl KeyLayout {
    /// All layouts, in the order they appear in `--help`.
    pub const ALL: [KeyLayout; 3] = [KeyLayout::Middle, KeyLayout::Full, KeyLayout::Upper];

    /// The canonical name, as matched on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            KeyLayout::Middle => "middle",
            KeyLayout::Full => "full",
            KeyLayout::Upper => "upper",
        }
    }

    /// Look up a layout by name.
    pub fn from_name(name: &str) -> Result<KeyLayout> {
        KeyLayout::ALL
            .iter()
            .copied()
            .find(|l| l.name() == name)
            .ok_or_else(|| Error::InvalidInput(format!("unknown layout '{}'", name)))
    }

    /// The physical keys, lowest scale position first.
    pub fn keys(&self) -> &'static [char] {
        match self {
            KeyLayout::Middle => &['a', 's', 'd', 'f', 'g', 'h', 'j', 'k', 'l', ';', '\''],
            KeyLayout::Full => &[
                'a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'y', 'h', 'u', 'j', 'k', 'o', 'l', 'p',
                ';', '\'',
            ],
            KeyLayout::Upper => &[
                'q', 'w', 'e', 'r', 't', 'y', 'u', 'i', 'o', 'p', '[', ']', '\\',
            ],
        }
    }
}

/// Immutable key-to-note mapping, built once at startup.
///
/// Constructed by zipping a key list with a note sequence. The zip consumes
/// exactly one note per key, so every key gets a distinct note and key
/// order matches ascending scale position.
#[derive(Debug, Clone)]
pub struct KeyBinding {
    entries: Vec<(char, i32)>,
}

impl KeyBinding {
    /// Bind each key to the next note of `notes`, in key order.
    pub fn new(keys: &[char], notes: impl Iterator<Item = i32>) -> Self {
        Self {
            entries: keys.iter().copied().zip(notes).collect(),
        }
    }

    /// The note bound to `key`, if any. Keys compare case-insensitively.
    pub fn note_for(&self, key: char) -> Option<i32> {
        let key = key.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|&&(k, _)| k == key)
            .map(|&(_, note)| note)
    }

    /// Number of bound keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, note)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (char, i32)> + '_ {
        self.entries.iter().copied()
    }
}

/// Translates raw key press/release signals into MIDI messages.
///
/// Every press signal yields a note-on, including OS key-repeat presses;
/// press/release pairing is the signal source's concern, not this
/// component's. Unbound keys produce nothing.
#[derive(Debug, Clone)]
pub struct KeyEventTranslator {
    binding: KeyBinding,
    velocity: u8,
    channel: u8,
}

impl KeyEventTranslator {
    /// Create a translator with the session's velocity and channel.
    pub fn new(binding: KeyBinding, velocity: u8, channel: u8) -> Self {
        Self {
            binding,
            velocity: velocity.min(127),
            channel: channel.min(15),
        }
    }

    /// Handle a press signal.
    pub fn key_down(&self, key: char) -> Option<MidiMessage> {
        self.binding.note_for(key).map(|note| MidiMessage::NoteOn {
            channel: self.channel,
            note: clamp_to_midi(note),
            velocity: self.velocity,
        })
    }

    /// Handle a release signal.
    pub fn key_up(&self, key: char) -> Option<MidiMessage> {
        self.binding.note_for(key).map(|note| MidiMessage::NoteOff {
            channel: self.channel,
            note: clamp_to_midi(note),
            velocity: self.velocity,
        })
    }

    /// The binding this translator looks keys up in
    pub fn binding(&self) -> &KeyBinding {
        &self.binding
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }
}

// Note offsets are unconstrained until they reach the wire; the 0-127
// range is enforced only here.
fn clamp_to_midi(note: i32) -> u8 {
    note.clamp(0, 127) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::{Scale, ScaleSequencer};
    use std::collections::HashSet;

    #[test]
    fn test_layout_sizes() {
        assert_eq!(KeyLayout::Middle.keys().len(), 11);
        assert_eq!(KeyLayout::Full.keys().len(), 18);
        assert_eq!(KeyLayout::Upper.keys().len(), 13);
    }

    #[test]
    fn test_layouts_have_no_duplicate_keys() {
        for &layout in &KeyLayout::ALL {
            let unique: HashSet<char> = layout.keys().iter().copied().collect();
            assert_eq!(unique.len(), layout.keys().len(), "{}", layout.name());
        }
    }

    #[test]
    fn test_layout_from_name() {
        assert_eq!(KeyLayout::from_name("upper").unwrap(), KeyLayout::Upper);
        assert!(KeyLayout::from_name("bottom").is_err());
    }

    #[test]
    fn test_binding_is_bijective_and_ascending() {
        for &layout in &KeyLayout::ALL {
            for &scale in &Scale::ALL {
                let seq = ScaleSequencer::new("A", scale, 3).unwrap();
                let binding = KeyBinding::new(layout.keys(), seq);
                assert_eq!(binding.len(), layout.keys().len());
                let notes: Vec<i32> = binding.iter().map(|(_, n)| n).collect();
                assert!(
                    notes.windows(2).all(|w| w[0] < w[1]),
                    "{} / {}",
                    layout.name(),
                    scale.name()
                );
            }
        }
    }

    #[test]
    fn test_binding_is_deterministic() {
        let make = || {
            let seq = ScaleSequencer::new("F#", Scale::Blues, 2).unwrap();
            KeyBinding::new(KeyLayout::Middle.keys(), seq)
        };
        let a: Vec<_> = make().iter().collect();
        let b: Vec<_> = make().iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_c_major_scenario() {
        // C major, octave 4: a/s/d play C4, D4, E4
        let seq = ScaleSequencer::new("C", Scale::Major, 4).unwrap();
        let binding = KeyBinding::new(&['a', 's', 'd'], seq);
        let translator = KeyEventTranslator::new(binding, 64, 0);

        let events = vec![
            translator.key_down('a').unwrap(),
            translator.key_down('d').unwrap(),
            translator.key_up('a').unwrap(),
        ];

        assert_eq!(
            events,
            vec![
                MidiMessage::NoteOn { channel: 0, note: 51, velocity: 64 },
                MidiMessage::NoteOn { channel: 0, note: 55, velocity: 64 },
                MidiMessage::NoteOff { channel: 0, note: 51, velocity: 64 },
            ]
        );
    }

    #[test]
    fn test_press_release_pairing() {
        let seq = ScaleSequencer::new("A", Scale::None, 4).unwrap();
        let binding = KeyBinding::new(KeyLayout::Middle.keys(), seq);
        let translator = KeyEventTranslator::new(binding, 100, 5);

        let on = translator.key_down(';').unwrap();
        let off = translator.key_up(';').unwrap();
        assert_eq!(on.note(), off.note());
        assert_eq!(on.channel(), 5);
        assert_eq!(off.channel(), 5);
    }

    #[test]
    fn test_unbound_keys_are_ignored() {
        let seq = ScaleSequencer::new("C", Scale::Major, 4).unwrap();
        let binding = KeyBinding::new(KeyLayout::Middle.keys(), seq);
        let translator = KeyEventTranslator::new(binding, 64, 0);

        assert!(translator.key_down('q').is_none());
        assert!(translator.key_up('q').is_none());
        assert!(translator.key_down('3').is_none());
    }

    #[test]
    fn test_repeated_presses_are_not_deduplicated() {
        // OS key-repeat fires the press hook again; every signal becomes an
        // on-event.
        let seq = ScaleSequencer::new("C", Scale::None, 4).unwrap();
        let binding = KeyBinding::new(&['a'], seq);
        let translator = KeyEventTranslator::new(binding, 64, 0);

        let first = translator.key_down('a');
        let second = translator.key_down('a');
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_keys_compare_case_insensitively() {
        let seq = ScaleSequencer::new("C", Scale::Major, 4).unwrap();
        let binding = KeyBinding::new(&['a'], seq);
        assert_eq!(binding.note_for('A'), binding.note_for('a'));
    }

    #[test]
    fn test_notes_clamp_at_the_wire() {
        // G#10 starts at 11 + 120 = 131, past the MIDI range
        let seq = ScaleSequencer::new("G#", Scale::None, 10).unwrap();
        let binding = KeyBinding::new(&['a'], seq);
        assert_eq!(binding.note_for('a'), Some(131));

        let translator = KeyEventTranslator::new(binding, 64, 0);
        match translator.key_down('a').unwrap() {
            MidiMessage::NoteOn { note, .. } => assert_eq!(note, 127),
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_velocity_and_channel_are_clamped() {
        let seq = ScaleSequencer::new("C", Scale::None, 4).unwrap();
        let binding = KeyBinding::new(&['a'], seq);
        let translator = KeyEventTranslator::new(binding, 200, 99);
        assert_eq!(translator.velocity(), 127);
        assert_eq!(translator.channel(), 15);
    }
}
