//! UI sink boundary
//!
//! The dispatcher's obligation ends at calling these callbacks with
//! correctly-shaped data; everything behind them (layout, styling, panels)
//! is the embedding UI's concern.

pub mod terminal;

pub use terminal::TerminalUi;

use crate::protocol::BaReport;

/// Visual class of a status banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    /// Transient positive status; dismissed by the connection manager
    Success,
    /// Persistent negative status; stays up until replaced
    Error,
}

/// Render callbacks the session core drives
///
/// Implementations must be cheap and non-blocking: callbacks run on the
/// connection's event loop and a slow sink delays frame handling.
pub trait UiSink: Send + Sync {
    /// Replace the graph panel with a rendered fragment
    fn render_graph(&self, fragment: &str);
    /// Replace the charts panel with rendered markup
    fn render_charts(&self, fragment: &str);
    /// Show tag-closeness statistics for the analyzed root address
    fn render_stats(&self, stats: &str);
    /// Append an abuse report block after the output anchor
    fn render_report(&self, report: &BaReport);
    /// Hand a pre-rendered fragment to the auxiliary scraping panel
    fn render_scraping_results(&self, fragment: &str);
    /// Surface a disambiguation modal
    fn show_modal(&self, fragment: &str);

    /// Append one line to the output log
    fn append_log(&self, text: &str);

    /// Update the layer progress bar
    fn set_progress(&self, percent: u8, layer_label: &str);
    fn hide_progress(&self);

    /// Update the rate-limit countdown display
    fn set_waiting(&self, remaining_secs: u64, total_secs: u64);
    fn hide_waiting(&self);

    /// Show a status banner
    fn set_banner(&self, text: &str, kind: BannerKind);
    fn clear_banner(&self);

    /// Gate the submit affordance
    fn set_submit_enabled(&self, enabled: bool);
}
