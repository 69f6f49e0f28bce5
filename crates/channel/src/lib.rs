//! Learnpulse telemetry channel.
//!
//! Owns the outbound side of the pipeline: a session identifier, a bounded
//! FIFO queue flushed to a remote record store with bounded retry, and the
//! durable key-value slots that make learning units resumable.

#![warn(missing_docs)]

mod channel;
mod queue;
mod state;
mod store;

pub use channel::{ChannelConfig, ChannelStats, TelemetryChannel};
pub use queue::{OutboundEntry, OutboundQueue};
pub use state::{JsonStateStore, MemoryStateStore, StateKey, StateStore, StateStoreError};
pub use store::{HttpRecordStore, MemoryRecordStore, RecordStore, StoreError};
