//! Normalizes run-loop and tool events into the XML tag event stream
//! consumed by hosts that want to render a conversation live.
//!
//! The wire shape and `format_event` rendering live in the `stream-event`
//! crate; this module owns the channel the run loop and tools actually write
//! to during a run.

pub use stream_event::{format_event, StreamEvent};
use tokio::sync::mpsc;

/// Sender half a run loop or tool call holds to emit [`StreamEvent`]s.
/// Cloning shares the same underlying channel.
pub type StreamHandle = mpsc::UnboundedSender<StreamEvent>;

/// Receiver half; typically drained by the host into its own transport.
pub type StreamReceiver = mpsc::UnboundedReceiver<StreamEvent>;

/// Creates a connected `(StreamHandle, StreamReceiver)` pair for one run.
pub fn channel() -> (StreamHandle, StreamReceiver) {
    mpsc::unbounded_channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_delivers_events_in_order() {
        let (tx, mut rx) = channel();
        tx.send(StreamEvent::ContentBlockText {
            text: "one".to_string(),
        })
        .unwrap();
        tx.send(StreamEvent::ContentBlockText {
            text: "two".to_string(),
        })
        .unwrap();
        drop(tx);
        let first = rx.recv().await.unwrap();
        match first {
            StreamEvent::ContentBlockText { text } => assert_eq!(text, "one"),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn format_event_renders_meta_init_tag() {
        let event = StreamEvent::MetaInit {
            session_id: "abc".to_string(),
            user_query: "hi".to_string(),
            model: "stub".to_string(),
        };
        assert!(format_event(&event).starts_with("<meta_init data=\""));
    }
}
