//! Rate-limit countdown display
//!
//! The backend announces a cooldown with `waiting_bar`; the client drives an
//! independent one-second-tick countdown that reaches 100% exactly at expiry
//! and then hides the bar.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::ui::UiSink;

/// Spawn the countdown task for a cooldown of `seconds`.
///
/// The bar is shown immediately at 0%, advanced once per second, and hidden
/// after the tick that reaches 100%. The returned handle is stored in the
/// session so a newer cooldown can abort a stale one.
pub fn spawn_countdown(seconds: u64, ui: Arc<dyn UiSink>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if seconds == 0 {
            return;
        }

        ui.set_waiting(seconds, seconds);

        let mut ticker = interval(Duration::from_secs(1));
        ticker.tick().await; // consume the immediate tick

        for elapsed in 1..=seconds {
            ticker.tick().await;
            ui.set_waiting(seconds - elapsed, seconds);
        }

        ui.hide_waiting();
    })
}
