//! OS-level keyboard hooks using rdev
//!
//! Press and release signals are intercepted at the OS level and forwarded
//! over a channel. One global hook serves every key; the receiving side
//! performs the key-to-note lookup, so no per-key state is captured here.

use crate::error::{Error, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use rdev::{listen, Event, EventType, Key};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Raw key signals from the OS-level listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySignal {
    /// A key was pressed
    Press(char),
    /// A key was released
    Release(char),
}

/// Global keyboard listener forwarding press/release signals
pub struct KeyListener {
    /// Channel receiver for key signals
    signal_rx: Receiver<KeySignal>,
    /// Shutdown flag
    shutdown: Arc<AtomicBool>,
    /// Listener thread handle
    _thread: JoinHandle<()>,
}

impl KeyListener {
    /// Start the OS keyboard listener.
    ///
    /// Fails with [`Error::Hook`] when the hook subsystem is unavailable
    /// (e.g. no X11/Wayland display on Linux).
    pub fn spawn() -> Result<Self> {
        if !is_available() {
            return Err(Error::Hook(
                "no display server available for keyboard hooks".to_string(),
            ));
        }

        let (tx, rx) = unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = shutdown.clone();

        let thread = thread::spawn(move || run_listener(tx, shutdown_flag));

        // Give the hook a moment to register before key events matter.
        thread::sleep(std::time::Duration::from_millis(100));

        Ok(Self {
            signal_rx: rx,
            shutdown,
            _thread: thread,
        })
    }

    /// The signal receiver, for use with select/timeout patterns
    pub fn receiver(&self) -> &Receiver<KeySignal> {
        &self.signal_rx
    }

    /// Silence the hook. Idempotent; also called on drop.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl Drop for KeyListener {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Map an rdev key to its key identifier.
///
/// Covers every character the layouts can bind: the letter keys plus the
/// punctuation at the right edge of each row. Everything else is dropped at
/// the hook.
pub fn key_to_char(key: Key) -> Option<char> {
    match key {
        Key::KeyA => Some('a'),
        Key::KeyB => Some('b'),
        Key::KeyC => Some('c'),
        Key::KeyD => Some('d'),
        Key::KeyE => Some('e'),
        Key::KeyF => Some('f'),
        Key::KeyG => Some('g'),
        Key::KeyH => Some('h'),
        Key::KeyI => Some('i'),
        Key::KeyJ => Some('j'),
        Key::KeyK => Some('k'),
        Key::KeyL => Some('l'),
        Key::KeyM => Some('m'),
        Key::KeyN => Some('n'),
        Key::KeyO => Some('o'),
        Key::KeyP => Some('p'),
        Key::KeyQ => Some('q'),
        Key::KeyR => Some('r'),
        Key::KeyS => Some('s'),
        Key::KeyT => Some('t'),
        Key::KeyU => Some('u'),
        Key::KeyV => Some('v'),
        Key::KeyW => Some('w'),
        Key::KeyX => Some('x'),
        Key::KeyY => Some('y'),
        Key::KeyZ => Some('z'),
        Key::SemiColon => Some(';'),
        Key::Quote => Some('\''),
        Key::LeftBracket => Some('['),
        Key::RightBracket => Some(']'),
        Key::BackSlash => Some('\\'),
        _ => None,
    }
}

/// Run the rdev listener (blocking - runs in its own thread)
fn run_listener(tx: Sender<KeySignal>, shutdown: Arc<AtomicBool>) {
    let callback = move |event: Event| {
        if shutdown.load(Ordering::Relaxed) {
            return;
        }

        match event.event_type {
            EventType::KeyPress(key) => {
                if let Some(c) = key_to_char(key) {
                    let _ = tx.send(KeySignal::Press(c));
                }
            }
            EventType::KeyRelease(key) => {
                if let Some(c) = key_to_char(key) {
                    let _ = tx.send(KeySignal::Release(c));
                }
            }
            _ => {}
        }
    };

    // This blocks until an error occurs
    if let Err(e) = listen(callback) {
        log::error!("OS keyboard listener error: {:?}", e);
    }
}

/// Check if the OS keyboard listener is likely to work on this system.
pub fn is_available() -> bool {
    // On Linux, rdev requires X11 or Wayland
    #[cfg(target_os = "linux")]
    {
        std::env::var("DISPLAY").is_ok() || std::env::var("WAYLAND_DISPLAY").is_ok()
    }

    #[cfg(not(target_os = "linux"))]
    {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping_covers_layout_punctuation() {
        assert_eq!(key_to_char(Key::SemiColon), Some(';'));
        assert_eq!(key_to_char(Key::Quote), Some('\''));
        assert_eq!(key_to_char(Key::LeftBracket), Some('['));
        assert_eq!(key_to_char(Key::RightBracket), Some(']'));
        assert_eq!(key_to_char(Key::BackSlash), Some('\\'));
    }

    #[test]
    fn test_key_mapping_letters() {
        assert_eq!(key_to_char(Key::KeyA), Some('a'));
        assert_eq!(key_to_char(Key::KeyQ), Some('q'));
        assert_eq!(key_to_char(Key::KeyZ), Some('z'));
    }

    #[test]
    fn test_unrelated_keys_are_dropped() {
        assert_eq!(key_to_char(Key::Escape), None);
        assert_eq!(key_to_char(Key::Space), None);
        assert_eq!(key_to_char(Key::ShiftLeft), None);
    }
}
