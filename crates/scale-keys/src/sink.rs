//! Message dispatch: the MIDI port plus an observation queue

use crate::error::Result;
use crate::midi::{MidiMessage, MidiOutput};
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Hands messages to the MIDI output and republishes them for observers.
///
/// The observation channel is unbounded and purely diagnostic: transmission
/// happens first, and a transmission failure still leaves the message
/// observable. If nothing drains the channel it simply grows.
pub struct MessageSink {
    output: Box<dyn MidiOutput>,
    observer_tx: Sender<MidiMessage>,
}

impl MessageSink {
    /// Wrap `output`, returning the sink and its observation receiver.
    pub fn new(output: Box<dyn MidiOutput>) -> (Self, Receiver<MidiMessage>) {
        let (observer_tx, observer_rx) = unbounded();
        (
            Self {
                output,
                observer_tx,
            },
            observer_rx,
        )
    }

    /// Transmit one message and enqueue it for observers.
    ///
    /// A transmission failure is returned to the caller; later messages are
    /// still attempted on the same port.
    pub fn dispatch(&mut self, message: MidiMessage) -> Result<()> {
        let sent = self.output.send(&message);
        let _ = self.observer_tx.send(message);
        sent
    }

    /// Name of the underlying output port
    pub fn port_name(&self) -> &str {
        self.output.port_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::{Arc, Mutex};

    struct RecordingOutput {
        sent: Arc<Mutex<Vec<MidiMessage>>>,
    }

    impl MidiOutput for RecordingOutput {
        fn send(&mut self, message: &MidiMessage) -> Result<()> {
            self.sent.lock().unwrap().push(*message);
            Ok(())
        }

        fn port_name(&self) -> &str {
            "recording"
        }
    }

    struct BrokenOutput;

    impl MidiOutput for BrokenOutput {
        fn send(&mut self, _message: &MidiMessage) -> Result<()> {
            Err(Error::PortWrite(midir::SendError::Other("port gone")))
        }

        fn port_name(&self) -> &str {
            "broken"
        }
    }

    fn note_on(note: u8) -> MidiMessage {
        MidiMessage::NoteOn {
            channel: 0,
            note,
            velocity: 64,
        }
    }

    #[test]
    fn test_dispatch_reaches_port_and_observers() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let (mut sink, observer) = MessageSink::new(Box::new(RecordingOutput {
            sent: sent.clone(),
        }));

        sink.dispatch(note_on(51)).unwrap();
        sink.dispatch(note_on(55)).unwrap();

        assert_eq!(sent.lock().unwrap().len(), 2);
        assert_eq!(observer.try_recv().unwrap(), note_on(51));
        assert_eq!(observer.try_recv().unwrap(), note_on(55));
        assert!(observer.try_recv().is_err());
    }

    #[test]
    fn test_port_failure_is_reported_but_still_observed() {
        let (mut sink, observer) = MessageSink::new(Box::new(BrokenOutput));

        let result = sink.dispatch(note_on(51));
        assert!(matches!(result, Err(Error::PortWrite(_))));
        assert_eq!(observer.try_recv().unwrap(), note_on(51));

        // The next message is still attempted
        assert!(sink.dispatch(note_on(53)).is_err());
        assert_eq!(observer.try_recv().unwrap(), note_on(53));
    }
}
