//! Session lifecycle: hooks, port, and the dispatch thread between them

use crate::error::Result;
use crate::hooks::{KeyListener, KeySignal};
use crate::keyboard::KeyEventTranslator;
use crate::midi::{MidiMessage, MidiOutput};
use crate::sink::MessageSink;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often the dispatcher re-checks the stop flag while idle
const SIGNAL_POLL: Duration = Duration::from_millis(50);

/// A running keyboard-to-MIDI session.
///
/// Owns the keyboard hook, the MIDI output and the dispatch thread between
/// them. Hooks and port are acquired together and released together:
/// [`DeviceSession::shutdown`] is the single teardown path, has effect at
/// most once, and also runs on drop.
pub struct DeviceSession {
    listener: KeyListener,
    dispatcher: Option<JoinHandle<()>>,
    observer_rx: Receiver<MidiMessage>,
    port_name: String,
    stop_flag: Arc<AtomicBool>,
}

impl DeviceSession {
    /// Register the keyboard hook and start dispatching into `output`.
    ///
    /// The port is expected to be open already. If hook registration fails,
    /// the output is dropped (closing the port) before the error returns,
    /// so a failed startup never leaks a half-acquired session.
    pub fn start(translator: KeyEventTranslator, output: Box<dyn MidiOutput>) -> Result<Self> {
        let (mut sink, observer_rx) = MessageSink::new(output);
        let port_name = sink.port_name().to_string();

        let listener = KeyListener::spawn()?;

        let stop_flag = Arc::new(AtomicBool::new(false));
        let dispatcher_stop = stop_flag.clone();
        let signals = listener.receiver().clone();

        let dispatcher = thread::spawn(move || {
            while !dispatcher_stop.load(Ordering::Relaxed) {
                let signal = match signals.recv_timeout(SIGNAL_POLL) {
                    Ok(signal) => signal,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                };
                let message = match signal {
                    KeySignal::Press(key) => translator.key_down(key),
                    KeySignal::Release(key) => translator.key_up(key),
                };
                if let Some(message) = message {
                    if let Err(e) = sink.dispatch(message) {
                        // Transmission failures don't end the session.
                        log::warn!("{}", e);
                    }
                }
            }
        });

        Ok(Self {
            listener,
            dispatcher: Some(dispatcher),
            observer_rx,
            port_name,
            stop_flag,
        })
    }

    /// Observation queue carrying a copy of every dispatched message
    pub fn observer(&self) -> &Receiver<MidiMessage> {
        &self.observer_rx
    }

    /// Name of the MIDI output port this session plays into
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Tear the session down: silence the hook, stop the dispatcher and
    /// close the port. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        self.listener.stop();
        if let Some(handle) = self.dispatcher.take() {
            let _ = handle.join();
        }
        // The sink, and with it the port connection, died with the
        // dispatcher thread.
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
