//! Session state
//!
//! One [`Session`] per process run, owned by the connection manager and
//! injected into the dispatcher. All mutable client-side state lives here;
//! handlers never reach for ambient globals.

pub mod progress;
pub mod state;
pub mod waiting;

pub use progress::LayerProgress;
pub use state::{ConnectionState, Session};
pub use waiting::spawn_countdown;
