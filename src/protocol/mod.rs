//! Wire protocol between the client and the analysis backend
//!
//! Every frame is UTF-8 JSON text wrapped in the `{type, message}` envelope.
//! For some tags the `message` field is itself a JSON-encoded string and
//! needs a second decode step.

pub mod envelope;
pub mod inbound;
pub mod outbound;

pub use envelope::{Envelope, ServerMessage};
pub use inbound::{BaReport, FinalStats, ProgressStart, ReportEntry};
pub use outbound::{AnalysisRequest, ClientRequest};
