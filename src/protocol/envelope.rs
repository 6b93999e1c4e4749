use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ChainwatchError, Result};
use crate::protocol::inbound::{BaReport, FinalStats, ProgressStart};

/// The `{type, message}` wrapper common to every frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub tag: String,
    #[serde(default)]
    pub message: Value,
}

/// A decoded inbound frame, classified by its discriminant tag
///
/// The set is closed over the backend's message catalog; tags outside it
/// fall through to [`ServerMessage::Info`] so new server-emitted
/// informational tags need no client change.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// Server confirms the session greeting
    ConnectionEstablished { greeting: String },
    /// Final render bundle ready, addressed by file name
    SvgFile { file_name: String },
    /// Intermediate layer render ready
    PartialSvgFile { file_name: String },
    /// Request/validation failure reported by the backend
    Error { message: String },
    /// A new layer begins reporting progress
    ProgressBarStart(ProgressStart),
    /// Units of work completed in the current layer
    ProgressBarUpdate { units: f64 },
    /// Rate-limit cooldown of the given duration is in effect
    WaitingBar { seconds: u64 },
    /// Analysis complete, summary statistics
    FinalStats(FinalStats),
    /// The backend needs disambiguation input; payload goes to the side channel
    ManualTx { payload: Value },
    /// Answer to an address-report query
    BaReport(Box<BaReport>),
    /// Pre-rendered fragment for the auxiliary scraping panel
    ScrapingResults { fragment: String },
    /// Tag-closeness statistics answering `get_stats`
    DisplayStats { stats: String },
    /// Any unmatched tag: generic informational text
    Info { text: String },
}

impl ServerMessage {
    /// Decode one raw text frame into a classified message
    pub fn decode(frame: &str) -> Result<Self> {
        let envelope: Envelope = serde_json::from_str(frame)
            .map_err(|e| ChainwatchError::MalformedFrame(format!("invalid envelope: {}", e)))?;
        Self::classify(envelope)
    }

    /// Classify a decoded envelope by its tag
    pub fn classify(envelope: Envelope) -> Result<Self> {
        let Envelope { tag, message } = envelope;

        let decoded = match tag.as_str() {
            "connection_established" => ServerMessage::ConnectionEstablished {
                greeting: text_payload(&message),
            },
            "svg_file" => ServerMessage::SvgFile {
                file_name: string_payload(&tag, &message)?,
            },
            "partial_svg_file" => ServerMessage::PartialSvgFile {
                file_name: string_payload(&tag, &message)?,
            },
            "error" => ServerMessage::Error {
                message: text_payload(&message),
            },
            "progress_bar_start" => ServerMessage::ProgressBarStart(nested_payload(&tag, message)?),
            "progress_bar_update" => ServerMessage::ProgressBarUpdate {
                units: numeric_payload(&tag, &message)?,
            },
            "waiting_bar" => {
                let seconds = numeric_payload(&tag, &message)?;
                ServerMessage::WaitingBar {
                    seconds: seconds.max(0.0).round() as u64,
                }
            }
            "final_stats" => ServerMessage::FinalStats(nested_payload(&tag, message)?),
            "manual_tx" => ServerMessage::ManualTx { payload: message },
            "ba_report" => ServerMessage::BaReport(Box::new(nested_payload(&tag, message)?)),
            "scraping_results" => ServerMessage::ScrapingResults {
                fragment: string_payload(&tag, &message)?,
            },
            "display_stats" => ServerMessage::DisplayStats {
                stats: text_payload(&message),
            },
            _ => ServerMessage::Info {
                text: text_payload(&message),
            },
        };

        Ok(decoded)
    }
}

/// Best-effort text rendering of a `message` payload.
///
/// Informational tags carry strings; anything else is re-serialized so the
/// content still reaches the output log instead of being dropped.
fn text_payload(message: &Value) -> String {
    match message {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A payload that must be a plain string (file names, fragments)
fn string_payload(tag: &str, message: &Value) -> Result<String> {
    message.as_str().map(str::to_string).ok_or_else(|| {
        ChainwatchError::MalformedFrame(format!("{}: message must be a string", tag))
    })
}

/// A payload that must be a finite number; numeric strings are accepted
fn numeric_payload(tag: &str, message: &Value) -> Result<f64> {
    let value = match message {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(ChainwatchError::MalformedFrame(format!(
            "{}: message must be a finite number",
            tag
        ))),
    }
}

/// Second decode step: a payload that is either a JSON-encoded string or,
/// from servers that skip the double encoding, the object itself
fn nested_payload<T: DeserializeOwned>(tag: &str, message: Value) -> Result<T> {
    let result = match message {
        Value::String(raw) => serde_json::from_str(&raw),
        other => serde_json::from_value(other),
    };

    result.map_err(|e| ChainwatchError::MalformedFrame(format!("{}: {}", tag, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_connection_established() {
        let msg = ServerMessage::decode(r#"{"type":"connection_established","message":"."}"#)
            .unwrap();
        assert_eq!(
            msg,
            ServerMessage::ConnectionEstablished {
                greeting: ".".to_string()
            }
        );
    }

    #[test]
    fn test_decode_svg_file() {
        let msg = ServerMessage::decode(
            r#"{"type":"svg_file","message":"transaction-graph-15.gv.svg"}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ServerMessage::SvgFile {
                file_name: "transaction-graph-15.gv.svg".to_string()
            }
        );
    }

    #[test]
    fn test_decode_svg_file_rejects_non_string() {
        let err = ServerMessage::decode(r#"{"type":"svg_file","message":17}"#).unwrap_err();
        assert!(matches!(err, ChainwatchError::MalformedFrame(_)));
    }

    #[test]
    fn test_decode_progress_start_double_encoded() {
        // The backend JSON-encodes the payload into the message string.
        let msg = ServerMessage::decode(
            r#"{"type":"progress_bar_start","message":"{\"layer\":1,\"total\":4}"}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ServerMessage::ProgressBarStart(ProgressStart { layer: 1, total: 4 })
        );
    }

    #[test]
    fn test_decode_progress_start_plain_object() {
        let msg = ServerMessage::decode(
            r#"{"type":"progress_bar_start","message":{"layer":2,"total":10}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ServerMessage::ProgressBarStart(ProgressStart { layer: 2, total: 10 })
        );
    }

    #[test]
    fn test_decode_progress_update_number_and_string() {
        let msg =
            ServerMessage::decode(r#"{"type":"progress_bar_update","message":1}"#).unwrap();
        assert_eq!(msg, ServerMessage::ProgressBarUpdate { units: 1.0 });

        let msg =
            ServerMessage::decode(r#"{"type":"progress_bar_update","message":"2.5"}"#).unwrap();
        assert_eq!(msg, ServerMessage::ProgressBarUpdate { units: 2.5 });
    }

    #[test]
    fn test_decode_progress_update_rejects_non_numeric() {
        let err = ServerMessage::decode(r#"{"type":"progress_bar_update","message":"soon"}"#)
            .unwrap_err();
        assert!(matches!(err, ChainwatchError::MalformedFrame(_)));
    }

    #[test]
    fn test_decode_waiting_bar() {
        let msg = ServerMessage::decode(r#"{"type":"waiting_bar","message":5}"#).unwrap();
        assert_eq!(msg, ServerMessage::WaitingBar { seconds: 5 });
    }

    #[test]
    fn test_decode_final_stats() {
        let msg = ServerMessage::decode(
            r#"{"type":"final_stats","message":"{\"total_txs\":100,\"total_time\":9.5,\"rto_threshold\":0.1}"}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ServerMessage::FinalStats(FinalStats {
                total_txs: 100,
                total_time: 9.5,
                rto_threshold: 0.1,
            })
        );
    }

    #[test]
    fn test_decode_ba_report() {
        let msg = ServerMessage::decode(
            r#"{"type":"ba_report","message":"{\"found\":false,\"address\":\"1abc\"}"}"#,
        )
        .unwrap();
        match msg {
            ServerMessage::BaReport(report) => {
                assert!(!report.found);
                assert_eq!(report.address, "1abc");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_decode_unknown_tag_falls_through_to_info() {
        let msg = ServerMessage::decode(r#"{"type":"chat_message","message":"Process started..."}"#)
            .unwrap();
        assert_eq!(
            msg,
            ServerMessage::Info {
                text: "Process started...".to_string()
            }
        );
    }

    #[test]
    fn test_decode_info_renders_non_string_payload() {
        let msg = ServerMessage::decode(r#"{"type":"something_new","message":{"k":1}}"#).unwrap();
        assert_eq!(
            msg,
            ServerMessage::Info {
                text: r#"{"k":1}"#.to_string()
            }
        );
    }

    #[test]
    fn test_decode_missing_message_defaults_to_null() {
        let msg = ServerMessage::decode(r#"{"type":"note"}"#).unwrap();
        assert_eq!(
            msg,
            ServerMessage::Info {
                text: "null".to_string()
            }
        );
    }

    #[test]
    fn test_decode_invalid_envelope() {
        let err = ServerMessage::decode("not json at all").unwrap_err();
        assert!(matches!(err, ChainwatchError::MalformedFrame(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_decode_manual_tx_keeps_raw_payload() {
        let msg = ServerMessage::decode(
            r#"{"type":"manual_tx","message":{"layer":2,"transactions":["a","b"]}}"#,
        )
        .unwrap();
        match msg {
            ServerMessage::ManualTx { payload } => {
                assert_eq!(payload["layer"], 2);
                assert_eq!(payload["transactions"][0], "a");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
