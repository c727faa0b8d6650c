//! Musical scales and the note sequences they generate
//!
//! A scale is an ordered pattern of semitone steps that repeats forever.
//! [`ScaleSequencer`] walks that pattern from a starting pitch class and
//! octave, yielding an infinite ascending run of MIDI note numbers. The
//! sequence is bounded externally by zipping it with a finite key list
//! (see [`crate::keyboard::KeyBinding`]).

use crate::error::{Error, Result};

/// The twelve pitch class names, ordered from A.
///
/// A note number is an offset into this cycle: `index + octave * 12`.
pub const PITCH_CLASSES: [&str; 12] = [
    "A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#",
];

/// Resolve a pitch class name to its index 0-11. Names match
/// case-insensitively, so `c#` and `C#` are the same pitch class.
pub fn pitch_class_index(name: &str) -> Result<i32> {
    let upper = name.to_ascii_uppercase();
    PITCH_CLASSES
        .iter()
        .position(|&p| p == upper)
        .map(|i| i as i32)
        .ok_or_else(|| Error::InvalidInput(format!("unknown pitch class '{}'", name)))
}

/// A named scale pattern: the semitone steps between consecutive degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    /// Chromatic run, one semitone per key
    None,
    Major,
    Minor,
    HarmonicMinor,
    MelodicMinorAsc,
    Blues,
    PentatonicMajor,
}

impl Scale {
    /// All supported scales, in the order they appear in `--help`.
    pub const ALL: [Scale; 7] = [
        Scale::None,
        Scale::Major,
        Scale::Minor,
        Scale::HarmonicMinor,
        Scale::MelodicMinorAsc,
        Scale::Blues,
        Scale::PentatonicMajor,
    ];

    /// The canonical name, as matched (case-sensitively) on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Scale::None => "NONE",
            Scale::Major => "MAJOR",
            Scale::Minor => "MINOR",
            Scale::HarmonicMinor => "HARMONIC_MINOR",
            Scale::MelodicMinorAsc => "MELODIC_MINOR_ASC",
            Scale::Blues => "BLUES",
            Scale::PentatonicMajor => "PENTATONIC_MAJOR",
        }
    }

    /// Semitone step sizes, cyclically repeated by the sequencer.
    pub fn steps(&self) -> &'static [i32] {
        match self {
            Scale::None => &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            Scale::Major => &[2, 2, 1, 2, 2, 2, 1],
            Scale::Minor => &[2, 1, 2, 2, 1, 2, 2],
            Scale::HarmonicMinor => &[2, 1, 2, 2, 1, 3, 1],
            Scale::MelodicMinorAsc => &[2, 1, 2, 2, 2, 2, 1],
            Scale::Blues => &[3, 1, 1, 3, 2],
            Scale::PentatonicMajor => &[2, 2, 3, 2, 3],
        }
    }

    /// Look up a scale by its canonical name. The match is case-sensitive.
    pub fn from_name(name: &str) -> Result<Scale> {
        Scale::ALL
            .iter()
            .copied()
            .find(|s| s.name() == name)
            .ok_or_else(|| Error::InvalidInput(format!("unknown scale '{}'", name)))
    }
}

/// Infinite ascending iterator of MIDI note numbers.
///
/// The running index starts at the pitch class of the start note and
/// advances by the scale's steps. The octave offset is added once, at
/// sequence start, so every yielded value is `running_index + octave * 12`.
#[derive(Debug, Clone)]
pub struct ScaleSequencer {
    index: i32,
    octave_offset: i32,
    steps: &'static [i32],
    cursor: usize,
}

impl ScaleSequencer {
    /// Build a sequencer for `start_note` in `scale`, transposed by `octave`.
    ///
    /// Fails with [`Error::InvalidInput`] on an unknown pitch class or a
    /// pattern containing a non-positive step, before any value is produced.
    pub fn new(start_note: &str, scale: Scale, octave: i32) -> Result<Self> {
        let index = pitch_class_index(start_note)?;
        let steps = scale.steps();
        if steps.iter().any(|&s| s <= 0) {
            return Err(Error::InvalidInput(format!(
                "scale {} contains a non-positive step",
                scale.name()
            )));
        }
        Ok(Self {
            index,
            octave_offset: octave * 12,
            steps,
            cursor: 0,
        })
    }
}

impl Iterator for ScaleSequencer {
    type Item = i32;

    // Never returns None; consumers bound the sequence externally.
    fn next(&mut self) -> Option<i32> {
        let value = self.index + self.octave_offset;
        self.index += self.steps[self.cursor];
        self.cursor = (self.cursor + 1) % self.steps.len();
        Some(value)
    }
}
