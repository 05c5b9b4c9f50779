//! Streaming of execution output.
//!
//! A stream carries zero or more [`StreamEvent::Chunk`] events followed by
//! exactly one [`StreamEvent::End`]. [`StreamGuard`] sends the `End` when it
//! is dropped, so every return path of an execution closes the stream.

use tokio::sync::mpsc;

/// An event on an execution stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Chunk(String),
    End,
}

pub type StreamSender = mpsc::UnboundedSender<StreamEvent>;
pub type StreamReceiver = mpsc::UnboundedReceiver<StreamEvent>;

/// Creates a stream channel.
pub fn stream_channel() -> (StreamSender, StreamReceiver) {
    mpsc::unbounded_channel()
}

/// Owns the sending half of an optional stream and closes it on drop.
#[derive(Debug)]
pub struct StreamGuard {
    sender: Option<StreamSender>,
}

impl StreamGuard {
    pub fn new(sender: Option<StreamSender>) -> Self {
        Self { sender }
    }

    /// A guard that discards everything.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    pub fn is_streaming(&self) -> bool {
        self.sender.is_some()
    }

    /// Sends a chunk. Empty chunks and closed receivers are ignored.
    pub fn chunk(&self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        if let Some(sender) = &self.sender {
            let _ = sender.send(StreamEvent::Chunk(text));
        }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(StreamEvent::End);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn drain(rx: &mut StreamReceiver) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_end_sent_once_on_drop() {
        let (tx, mut rx) = stream_channel();
        {
            let guard = StreamGuard::new(Some(tx));
            guard.chunk("a");
            guard.chunk("");
            guard.chunk("b");
        }

        assert_eq!(
            drain(&mut rx),
            vec![
                StreamEvent::Chunk("a".to_string()),
                StreamEvent::Chunk("b".to_string()),
                StreamEvent::End,
            ]
        );
    }

    #[test]
    fn test_early_return_still_ends() {
        fn early(guard: StreamGuard, fail: bool) -> Result<(), ()> {
            if fail {
                return Err(());
            }
            guard.chunk("never");
            Ok(())
        }

        let (tx, mut rx) = stream_channel();
        assert!(early(StreamGuard::new(Some(tx)), true).is_err());
        assert_eq!(drain(&mut rx), vec![StreamEvent::End]);
    }

    #[test]
    fn test_disabled_guard() {
        let guard = StreamGuard::disabled();
        assert!(!guard.is_streaming());
        guard.chunk("dropped");
    }
}
