use serde_json::{json, Value};

/// Parameters of an analysis submission
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    /// Root address to analyze
    pub address: String,
    /// Number of layers to expand
    pub layers: u32,
    /// RTO threshold passed through to the backend
    pub rto_threshold: f64,
    /// Whether the backend should pause for manual disambiguation
    pub manual: bool,
}

/// Outbound message catalog
#[derive(Debug, Clone, PartialEq)]
pub enum ClientRequest {
    /// Begin a new analysis
    StartParsing(AnalysisRequest),
    /// Complete a manual-mode disambiguation with the excluded transactions
    ResumeParsing { tx_to_remove: Vec<String> },
    /// Look up abuse reports for a clicked address
    BaReport { address: String },
    /// Request tag-closeness statistics for the analyzed root address
    GetStats,
    /// Diagnostic no-op
    JsonConversion { message: String },
}

impl ClientRequest {
    /// The discriminant tag carried in the envelope
    pub fn tag(&self) -> &'static str {
        match self {
            ClientRequest::StartParsing(_) => "start_parsing",
            ClientRequest::ResumeParsing { .. } => "resume_parsing",
            ClientRequest::BaReport { .. } => "ba_report",
            ClientRequest::GetStats => "get_stats",
            ClientRequest::JsonConversion { .. } => "json_conversion",
        }
    }

    /// Serialize to the wire frame.
    ///
    /// `start_parsing` carries its parameters in a separate `data` block;
    /// `resume_parsing` JSON-encodes its payload into the message string,
    /// mirroring the double-encoding the backend expects.
    pub fn to_frame(&self) -> String {
        let value: Value = match self {
            ClientRequest::StartParsing(req) => {
                let mut data = json!({
                    "address_input": req.address,
                    "layer_input": req.layers,
                    "rto_input": req.rto_threshold,
                });
                if req.manual {
                    data["manual_input"] = json!("on");
                }
                json!({"type": self.tag(), "message": "", "data": data})
            }
            ClientRequest::ResumeParsing { tx_to_remove } => {
                let payload = json!({ "tx_to_remove": tx_to_remove }).to_string();
                json!({"type": self.tag(), "message": payload})
            }
            ClientRequest::BaReport { address } => {
                json!({"type": self.tag(), "message": address})
            }
            ClientRequest::GetStats => json!({"type": self.tag(), "message": ""}),
            ClientRequest::JsonConversion { message } => {
                json!({"type": self.tag(), "message": message})
            }
        };

        value.to_string()
    }
}
