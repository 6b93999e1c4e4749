//! Message dispatcher
//!
//! Every inbound frame is decoded, classified by its tag, and routed to the
//! UI sink. Dispatch is total: unknown tags fall through to the output log,
//! and a malformed frame is warned about and dropped. No fault escapes past
//! the dispatcher - every path ends in a UI update, never in a dropped
//! connection.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::connection::ClientHandle;
use crate::error::ChainwatchError;
use crate::fetch::FragmentFetcher;
use crate::protocol::{ClientRequest, ServerMessage};
use crate::session::{spawn_countdown, Session};
use crate::ui::UiSink;

/// Routes decoded frames to the UI sink and tracks session state
pub struct Dispatcher {
    session: Arc<Mutex<Session>>,
    ui: Arc<dyn UiSink>,
    fetcher: Arc<dyn FragmentFetcher>,
    handle: ClientHandle,
}

impl Dispatcher {
    pub(crate) fn new(
        session: Arc<Mutex<Session>>,
        ui: Arc<dyn UiSink>,
        fetcher: Arc<dyn FragmentFetcher>,
        handle: ClientHandle,
    ) -> Self {
        Self {
            session,
            ui,
            fetcher,
            handle,
        }
    }

    /// Handle one raw text frame from the transport
    pub async fn handle_frame(&self, frame: &str) {
        let message = match ServerMessage::decode(frame) {
            Ok(message) => message,
            Err(e) => {
                warn!("Dropping inbound frame: {}", e);
                return;
            }
        };

        self.dispatch(message).await;
    }

    async fn dispatch(&self, message: ServerMessage) {
        match message {
            ServerMessage::ConnectionEstablished { greeting } => {
                // Suppress the greeting on a transparent reconnect: a page
                // that already has history keeps it, without duplicates.
                let log_empty = !self.session.lock().log_has_content;
                if log_empty {
                    self.append_log(&greeting);
                }
            }

            ServerMessage::SvgFile { file_name } => {
                let was_waiting = {
                    let mut session = self.session.lock();
                    session.clear_progress();
                    session.stop_waiting()
                };
                self.ui.hide_progress();
                if was_waiting {
                    self.ui.hide_waiting();
                }

                match self.fetcher.fetch_graph(&file_name).await {
                    Ok(fragment) => self.ui.render_graph(&fragment),
                    Err(e) => self.fault("Failed to fetch graph fragment", &e),
                }
                match self.fetcher.fetch_charts().await {
                    Ok(markup) => self.ui.render_charts(&markup),
                    Err(e) => self.fault("Failed to fetch chart markup", &e),
                }

                self.enable_submit();
                self.handle.send(&ClientRequest::GetStats);
            }

            ServerMessage::PartialSvgFile { file_name } => {
                match self.fetcher.fetch_graph(&file_name).await {
                    Ok(fragment) => self.ui.render_graph(&fragment),
                    Err(e) => self.fault("Failed to fetch partial graph fragment", &e),
                }
            }

            ServerMessage::Error { message } => {
                self.enable_submit();
                self.append_log(&message);
            }

            ServerMessage::ProgressBarStart(start) => {
                let label = self.session.lock().start_layer(start);
                self.ui.set_progress(0, &label);
            }

            ServerMessage::ProgressBarUpdate { units } => {
                let update = self.session.lock().apply_progress(units);
                match update {
                    Some((percent, label)) => self.ui.set_progress(percent, &label),
                    None => debug!("Progress update outside any layer, ignored"),
                }
            }

            ServerMessage::WaitingBar { seconds } => {
                let countdown = spawn_countdown(seconds, self.ui.clone());
                self.session.lock().begin_waiting(countdown);
            }

            ServerMessage::FinalStats(stats) => {
                self.append_log(&stats.summary());
            }

            ServerMessage::ManualTx { payload } => {
                match self.fetcher.submit_manual_selection(&payload).await {
                    Ok(markup) => self.ui.show_modal(&markup),
                    Err(e) => self.fault("Failed to fetch disambiguation dialog", &e),
                }
            }

            ServerMessage::BaReport(report) => {
                self.ui.render_report(&report);
            }

            ServerMessage::ScrapingResults { fragment } => {
                self.ui.render_scraping_results(&fragment);
            }

            ServerMessage::DisplayStats { stats } => {
                self.ui.render_stats(&stats);
            }

            ServerMessage::Info { text } => {
                self.append_log(&text);
            }
        }
    }

    fn append_log(&self, text: &str) {
        self.session.lock().log_has_content = true;
        self.ui.append_log(text);
    }

    fn enable_submit(&self) {
        self.session.lock().submit_enabled = true;
        self.ui.set_submit_enabled(true);
    }

    fn fault(&self, context: &str, error: &ChainwatchError) {
        warn!("{}: {}", context, error);
        self.append_log(&format!("{}: {}", context, error));
    }
}
