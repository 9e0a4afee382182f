//! Stream event protocol: the wire shape of one run-loop event, rendered as
//! an XML tag (see `event::format_event`).
//!
//! This crate defines the wire shape only; the runtime crate owns the
//! channel, the queue, and when to emit each event.

pub mod event;

pub use event::{format_event, StreamEvent};
