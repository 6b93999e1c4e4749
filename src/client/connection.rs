//! Connection manager
//!
//! One supervisor loop owns the only socket: connect, drive until the
//! connection drops, wait the fixed reconnect delay, connect again. Retry is
//! unconditional and unbounded; there is no backoff growth and no
//! distinction between a server restart and a network blip. Because the
//! loop is the sole place a socket is created, two live sockets cannot
//! exist and a pending reconnect delay cannot race a newer close.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

use super::dispatcher::Dispatcher;
use super::OUTBOUND_BUFFER_SIZE;
use crate::config::{Config, SessionConfig};
use crate::fetch::FragmentFetcher;
use crate::protocol::{AnalysisRequest, ClientRequest};
use crate::session::{ConnectionState, Session};
use crate::ui::{BannerKind, UiSink};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Why a driven connection ended
enum DriveEnd {
    Closed,
    Shutdown,
}

/// Cloneable handle for talking to the backend through the current socket
///
/// `send` serializes and transmits; while no socket is open it silently
/// drops the request (debug-logged) and never errors to the caller.
#[derive(Clone)]
pub struct ClientHandle {
    pub(crate) session: Arc<Mutex<Session>>,
    pub(crate) outbound: Arc<ArcSwapOption<mpsc::Sender<String>>>,
    pub(crate) ui: Arc<dyn UiSink>,
}

impl ClientHandle {
    /// Transmit a request over the current connection, if any
    pub fn send(&self, request: &ClientRequest) {
        let Some(tx) = self.outbound.load_full() else {
            debug!("No open connection, dropping {} request", request.tag());
            return;
        };

        if tx.try_send(request.to_frame()).is_err() {
            debug!("Outbound queue unavailable, dropping {} request", request.tag());
        }
    }

    /// Submit a new analysis.
    ///
    /// Gated by the submit flag: returns false (and sends nothing) while an
    /// analysis is in flight or the connection is down. On acceptance the
    /// flag is cleared until the backend reports completion or an error.
    pub fn start_analysis(&self, request: AnalysisRequest) -> bool {
        {
            let mut session = self.session.lock();
            if !session.submit_enabled {
                return false;
            }
            session.submit_enabled = false;
            session.total_layers = request.layers;
        }

        self.ui.set_submit_enabled(false);
        self.send(&ClientRequest::StartParsing(request));
        true
    }

    /// Complete a manual-mode disambiguation with the excluded transactions
    pub fn resume_parsing(&self, tx_to_remove: Vec<String>) {
        self.send(&ClientRequest::ResumeParsing { tx_to_remove });
    }

    /// Look up abuse reports for a clicked address
    pub fn report_lookup(&self, address: String) {
        self.send(&ClientRequest::BaReport { address });
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.session.lock().connection_state
    }

    pub fn submit_enabled(&self) -> bool {
        self.session.lock().submit_enabled
    }
}

/// Owner of the socket lifecycle
pub struct ConnectionManager {
    ws_url: Url,
    timing: SessionConfig,
    session: Arc<Mutex<Session>>,
    ui: Arc<dyn UiSink>,
    dispatcher: Dispatcher,
    outbound: Arc<ArcSwapOption<mpsc::Sender<String>>>,
}

impl ConnectionManager {
    /// Create a manager and its client handle
    pub fn new(
        config: &Config,
        ui: Arc<dyn UiSink>,
        fetcher: Arc<dyn FragmentFetcher>,
    ) -> (Self, ClientHandle) {
        let session = Arc::new(Mutex::new(Session::new()));
        let outbound = Arc::new(ArcSwapOption::empty());

        let handle = ClientHandle {
            session: session.clone(),
            outbound: outbound.clone(),
            ui: ui.clone(),
        };
        let dispatcher = Dispatcher::new(session.clone(), ui.clone(), fetcher, handle.clone());

        let manager = Self {
            ws_url: config.server.ws_url.clone(),
            timing: config.session.clone(),
            session,
            ui,
            dispatcher,
            outbound,
        };

        (manager, handle)
    }

    /// Run the supervisor loop until shutdown is signalled
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("Starting connection manager for {}", self.ws_url);

        // Tracks whether the loss banner is already up, so repeated failed
        // attempts against a dead server do not raise a banner storm.
        let mut loss_bannered = false;

        loop {
            self.session.lock().connection_state = ConnectionState::Connecting;

            match self.connect().await {
                Ok(stream) => {
                    self.on_open(&mut loss_bannered);
                    let end = self.drive(stream, &mut shutdown).await;
                    if matches!(end, DriveEnd::Shutdown) {
                        break;
                    }
                    self.on_close(&mut loss_bannered);
                }
                Err(e) => {
                    warn!("Connection attempt to {} failed: {}", self.ws_url, e);
                    self.on_close(&mut loss_bannered);
                }
            }

            let delay = Duration::from_millis(self.timing.reconnect_delay_ms);
            tokio::select! {
                _ = sleep(delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Connection manager stopped");
    }

    async fn connect(&self) -> crate::error::Result<WsStream> {
        let (stream, _) = connect_async(self.ws_url.as_str()).await?;
        Ok(stream)
    }

    fn on_open(&self, loss_bannered: &mut bool) {
        self.session.lock().connection_state = ConnectionState::Open;
        *loss_bannered = false;

        info!("Connected to {}", self.ws_url);
        self.ui
            .set_banner("Connected to analysis server", BannerKind::Success);
    }

    fn on_close(&self, loss_bannered: &mut bool) {
        {
            let mut session = self.session.lock();
            session.connection_state = ConnectionState::Closed;
            session.submit_enabled = false;
        }
        self.outbound.store(None);
        self.ui.set_submit_enabled(false);

        if !*loss_bannered {
            *loss_bannered = true;
            warn!(
                "Connection lost, retrying every {}ms",
                self.timing.reconnect_delay_ms
            );
            self.ui.set_banner(
                "Connection to analysis server lost - reconnecting",
                BannerKind::Error,
            );
        }
    }

    /// Drive one live connection until it drops or shutdown is signalled.
    ///
    /// The submit grace delay and the success-banner dismissal are select
    /// branches of this loop, so both die with the connection they belong
    /// to: a drop inside the grace window never enables submit, and the
    /// loss banner raised afterwards is never cleared by a stale timer.
    async fn drive(&self, stream: WsStream, shutdown: &mut watch::Receiver<bool>) -> DriveEnd {
        let (mut ws_tx, mut ws_rx) = stream.split();

        let (out_tx, mut out_rx) = mpsc::channel::<String>(OUTBOUND_BUFFER_SIZE);
        self.outbound.store(Some(Arc::new(out_tx)));

        let grace = sleep(Duration::from_millis(self.timing.submit_grace_ms));
        tokio::pin!(grace);
        let mut grace_pending = true;

        let banner = sleep(Duration::from_secs(self.timing.banner_ttl_secs));
        tokio::pin!(banner);
        let mut banner_pending = true;

        let end = loop {
            tokio::select! {
                frame = ws_rx.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            self.dispatcher.handle_frame(text.as_str()).await;
                        }
                        Some(Ok(Message::Close(_))) | None => break DriveEnd::Closed,
                        // Ping/pong/binary frames are transport noise.
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            debug!("WebSocket read error: {}", e);
                            break DriveEnd::Closed;
                        }
                    }
                }
                outgoing = out_rx.recv() => {
                    match outgoing {
                        Some(frame) => {
                            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                                break DriveEnd::Closed;
                            }
                        }
                        None => break DriveEnd::Closed,
                    }
                }
                _ = &mut grace, if grace_pending => {
                    grace_pending = false;
                    self.session.lock().submit_enabled = true;
                    self.ui.set_submit_enabled(true);
                }
                _ = &mut banner, if banner_pending => {
                    banner_pending = false;
                    self.ui.clear_banner();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break DriveEnd::Shutdown;
                    }
                }
            }
        };

        self.outbound.store(None);
        end
    }
}
