use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Payload of `progress_bar_start`: a new analysis layer begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressStart {
    /// Position of the layer in the traversal (1-based)
    pub layer: u32,
    /// Number of work units the backend expects to report for this layer
    pub total: u32,
}

/// Payload of `final_stats`: summary of a completed analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalStats {
    /// Transactions visited across all layers
    pub total_txs: u64,
    /// Wall-clock analysis time in seconds
    pub total_time: f64,
    /// RTO threshold the analysis ran with
    pub rto_threshold: f64,
}

impl FinalStats {
    /// Render the summary block appended to the output log
    pub fn summary(&self) -> String {
        format!(
            "--- Analysis complete ---\n\
             Transactions parsed: {}\n\
             Elapsed time: {:.2}s\n\
             RTO threshold: {}",
            self.total_txs, self.total_time, self.rto_threshold
        )
    }
}

/// One scraped abuse report entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    #[serde(default)]
    pub abuse_type_id: Option<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Payload of `ba_report`: the answer to an address-report query
///
/// An address that was never reported comes back with `found = false` and
/// only the address populated; all other fields default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaReport {
    pub found: bool,
    pub address: String,
    #[serde(default)]
    pub total_report_count: u64,
    #[serde(default)]
    pub last_reported: Option<String>,
    #[serde(default)]
    pub genuine_recent_count: u64,
    #[serde(default)]
    pub genuine_report: Vec<ReportEntry>,
    #[serde(default)]
    pub report_types: BTreeMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_stats_summary() {
        let stats = FinalStats {
            total_txs: 1520,
            total_time: 42.5,
            rto_threshold: 0.05,
        };

        let summary = stats.summary();
        assert!(summary.contains("1520"));
        assert!(summary.contains("42.50s"));
        assert!(summary.contains("0.05"));
    }

    #[test]
    fn test_ba_report_not_found_defaults() {
        let report: BaReport =
            serde_json::from_str(r#"{"found": false, "address": "1BoatSLRHtKNngkdXEeobR76b53LETtpyT"}"#)
                .unwrap();

        assert!(!report.found);
        assert_eq!(report.total_report_count, 0);
        assert!(report.last_reported.is_none());
        assert!(report.genuine_report.is_empty());
        assert!(report.report_types.is_empty());
    }

    #[test]
    fn test_ba_report_full() {
        let raw = r#"{
            "found": true,
            "address": "1BoatSLRHtKNngkdXEeobR76b53LETtpyT",
            "total_report_count": 12,
            "last_reported": "2022-03-01",
            "genuine_recent_count": 2,
            "genuine_report": [
                {"abuse_type_id": 4, "description": "sextortion email"},
                {"abuse_type_id": 1, "description": "ransomware payment"}
            ],
            "report_types": {"ransomware": 1, "sextortion": 1}
        }"#;

        let report: BaReport = serde_json::from_str(raw).unwrap();
        assert!(report.found);
        assert_eq!(report.total_report_count, 12);
        assert_eq!(report.genuine_report.len(), 2);
        assert_eq!(report.genuine_report[0].abuse_type_id, Some(4));
        assert_eq!(report.report_types.get("ransomware"), Some(&1));
    }
}
