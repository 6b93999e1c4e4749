//! Terminal rendering of the UI sink callbacks
//!
//! Fragments are markup blobs produced server-side; the console does not
//! interpret them, it reports their arrival and keeps the textual panels
//! (log, progress, banners, reports) readable.

use chrono::Local;

use super::{BannerKind, UiSink};
use crate::protocol::BaReport;

/// Console implementation of [`UiSink`] used by the chainwatch binary
#[derive(Debug, Default)]
pub struct TerminalUi;

impl TerminalUi {
    pub fn new() -> Self {
        Self
    }

    fn line(&self, text: &str) {
        println!("[{}] {}", Local::now().format("%H:%M:%S"), text);
    }
}

impl UiSink for TerminalUi {
    fn render_graph(&self, fragment: &str) {
        self.line(&format!("graph updated ({} bytes of markup)", fragment.len()));
    }

    fn render_charts(&self, fragment: &str) {
        self.line(&format!("charts updated ({} bytes of markup)", fragment.len()));
    }

    fn render_stats(&self, stats: &str) {
        self.line(&format!("tag-closeness statistics: {}", stats));
    }

    fn render_report(&self, report: &BaReport) {
        if !report.found {
            self.line(&format!("{}: no abuse reports on record", report.address));
            return;
        }

        self.line(&format!(
            "{}: reported {} time(s), last on {}",
            report.address,
            report.total_report_count,
            report.last_reported.as_deref().unwrap_or("unknown date"),
        ));
        for entry in &report.genuine_report {
            self.line(&format!("  - {}", entry.description));
        }
    }

    fn render_scraping_results(&self, fragment: &str) {
        self.line(&format!("scraping results updated ({} bytes)", fragment.len()));
    }

    fn show_modal(&self, fragment: &str) {
        self.line("--- manual disambiguation required ---");
        self.line(fragment);
    }

    fn append_log(&self, text: &str) {
        self.line(text);
    }

    fn set_progress(&self, percent: u8, layer_label: &str) {
        self.line(&format!("{} {:>3}%", layer_label, percent));
    }

    fn hide_progress(&self) {}

    fn set_waiting(&self, remaining_secs: u64, total_secs: u64) {
        self.line(&format!(
            "rate-limit cooldown: {}s remaining of {}s",
            remaining_secs, total_secs
        ));
    }

    fn hide_waiting(&self) {
        self.line("rate-limit cooldown over");
    }

    fn set_banner(&self, text: &str, kind: BannerKind) {
        match kind {
            BannerKind::Success => self.line(&format!("*** {}", text)),
            BannerKind::Error => self.line(&format!("!!! {}", text)),
        }
    }

    fn clear_banner(&self) {}

    fn set_submit_enabled(&self, enabled: bool) {
        if enabled {
            self.line("ready for a new analysis");
        }
    }
}
