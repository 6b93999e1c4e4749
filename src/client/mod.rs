//! Client core
//!
//! The connection manager owns the socket lifecycle: connect, detect loss,
//! reconnect after a fixed delay, forever. The dispatcher decodes every
//! inbound frame and routes it by tag. Everything user-visible happens
//! through the [`crate::ui::UiSink`] boundary.

pub mod connection;
pub mod dispatcher;

pub use connection::{ClientHandle, ConnectionManager};
pub use dispatcher::Dispatcher;

/// Maximum number of outbound frames buffered per connection
pub const OUTBOUND_BUFFER_SIZE: usize = 256;
